//! Type resolution boundary.
//!
//! This module provides the [`TypeResolver`] trait consulted whenever a
//! [`TypeDesc::Named`] reference has to be looked through.

use crate::error::{ResolveError, Result};
use crate::types::{NamedType, QualifiedName, TypeDesc};
use std::ops::Deref;
use std::sync::Arc;

/// Maximum number of chained named types followed before giving up.
const MAX_NAMED_CHAIN: usize = 32;

/// Looks up named types by package path and name.
pub trait TypeResolver {
    /// Resolves `name` declared in `package`.
    ///
    /// # Errors
    /// Returns a not-found error when the package or type does not exist and
    /// [`ResolveError::Malformed`] when the declaration cannot be understood.
    fn resolve(&self, package: &str, name: &str) -> Result<Arc<NamedType>>;

    /// Resolves a qualified name.
    ///
    /// # Errors
    /// Same as [`Self::resolve`].
    fn resolve_qualified(&self, name: &QualifiedName) -> Result<Arc<NamedType>> {
        self.resolve(&name.package, &name.name)
    }

    /// Resolves a combined `path/to/pkg.Name` string.
    ///
    /// # Errors
    /// Returns [`ResolveError::InvalidPath`] if the path cannot be split, or
    /// any error of [`Self::resolve`].
    fn resolve_path(&self, full_path: &str) -> Result<Arc<NamedType>> {
        let name = QualifiedName::parse(full_path).ok_or_else(|| ResolveError::InvalidPath {
            path: full_path.to_string(),
        })?;
        self.resolve_qualified(&name)
    }
}

impl<T: TypeResolver + ?Sized> TypeResolver for &T {
    fn resolve(&self, package: &str, name: &str) -> Result<Arc<NamedType>> {
        (**self).resolve(package, name)
    }
}

impl<T: TypeResolver + ?Sized> TypeResolver for Arc<T> {
    fn resolve(&self, package: &str, name: &str) -> Result<Arc<NamedType>> {
        (**self).resolve(package, name)
    }
}

/// A type with every leading named wrapper looked through.
#[derive(Debug, Clone)]
pub enum Underlying<'a> {
    /// The type was not named to begin with.
    Direct(&'a TypeDesc),
    /// The last named type of the chain; derefs to its underlying shape.
    Named(Arc<NamedType>),
}

impl Underlying<'_> {
    /// Returns the named type the shape came from, if any.
    #[must_use]
    pub fn named(&self) -> Option<&NamedType> {
        match self {
            Self::Direct(_) => None,
            Self::Named(named) => Some(named.as_ref()),
        }
    }
}

impl Deref for Underlying<'_> {
    type Target = TypeDesc;

    fn deref(&self) -> &TypeDesc {
        match self {
            Self::Direct(ty) => *ty,
            Self::Named(named) => &named.underlying,
        }
    }
}

/// Follows named references until a non-named shape is reached.
///
/// # Errors
/// Propagates resolver errors and returns
/// [`ResolveError::CircularReference`] for chains of named types that never
/// reach a concrete shape.
pub fn resolve_underlying<'a, R>(resolver: &R, ty: &'a TypeDesc) -> Result<Underlying<'a>>
where
    R: TypeResolver + ?Sized,
{
    let TypeDesc::Named(first) = ty else {
        return Ok(Underlying::Direct(ty));
    };

    let mut chain = vec![first.to_string()];
    let mut current = resolver.resolve_qualified(first)?;
    while let TypeDesc::Named(next) = &current.underlying {
        if chain.len() >= MAX_NAMED_CHAIN || chain.contains(&next.to_string()) {
            chain.push(next.to_string());
            return Err(ResolveError::CircularReference {
                path: chain.join(" -> "),
            });
        }
        chain.push(next.to_string());
        let next = next.clone();
        current = resolver.resolve_qualified(&next)?;
    }
    Ok(Underlying::Named(current))
}

/// Resolves `named` and checks that it is (or wraps) a struct.
///
/// # Errors
/// Returns [`ResolveError::NotAStruct`] for any other shape.
pub fn resolve_struct<R>(resolver: &R, named: &Arc<NamedType>) -> Result<Arc<NamedType>>
where
    R: TypeResolver + ?Sized,
{
    let resolved = match &named.underlying {
        TypeDesc::Named(_) => match resolve_underlying(resolver, &named.underlying)? {
            Underlying::Named(inner) => inner,
            Underlying::Direct(_) => Arc::clone(named),
        },
        _ => Arc::clone(named),
    };
    match &resolved.underlying {
        TypeDesc::Struct(_) => Ok(resolved),
        other => Err(ResolveError::NotAStruct {
            type_name: named.name.to_string(),
            found: other.kind_name(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BasicKind, Field, StructDesc};
    use std::collections::HashMap;

    struct MapResolver {
        types: HashMap<String, Arc<NamedType>>,
    }

    impl MapResolver {
        fn new(types: Vec<NamedType>) -> Self {
            Self {
                types: types
                    .into_iter()
                    .map(|t| (t.name.to_string(), Arc::new(t)))
                    .collect(),
            }
        }
    }

    impl TypeResolver for MapResolver {
        fn resolve(&self, package: &str, name: &str) -> Result<Arc<NamedType>> {
            self.types
                .get(&format!("{package}.{name}"))
                .cloned()
                .ok_or_else(|| ResolveError::type_not_found(package, name))
        }
    }

    fn named(package: &str, name: &str, underlying: TypeDesc) -> NamedType {
        NamedType::new(QualifiedName::new(package, name), underlying)
    }

    #[test]
    fn test_resolve_path() {
        let resolver = MapResolver::new(vec![named(
            "example.com/storage",
            "Bucket",
            TypeDesc::Struct(StructDesc::new()),
        )]);
        let bucket = resolver
            .resolve_path("example.com/storage.Bucket")
            .expect("resolves");
        assert_eq!(bucket.name.name, "Bucket");

        let err = resolver.resolve_path("Bucket").unwrap_err();
        assert!(matches!(err, ResolveError::InvalidPath { .. }));
    }

    #[test]
    fn test_resolve_underlying_chain() {
        let resolver = MapResolver::new(vec![
            named("p", "Region", TypeDesc::named("p", "Location")),
            named("p", "Location", TypeDesc::Basic(BasicKind::String)),
        ]);
        let ty = TypeDesc::named("p", "Region");
        let under = resolve_underlying(&resolver, &ty).expect("resolves");
        assert_eq!(*under, TypeDesc::Basic(BasicKind::String));
        assert_eq!(under.named().map(|n| n.name.name.as_str()), Some("Location"));

        let direct = TypeDesc::Basic(BasicKind::Bool);
        let under = resolve_underlying(&resolver, &direct).expect("resolves");
        assert!(under.named().is_none());
    }

    #[test]
    fn test_resolve_underlying_cycle() {
        let resolver = MapResolver::new(vec![
            named("p", "A", TypeDesc::named("p", "B")),
            named("p", "B", TypeDesc::named("p", "A")),
        ]);
        let ty = TypeDesc::named("p", "A");
        let err = resolve_underlying(&resolver, &ty).unwrap_err();
        assert!(matches!(err, ResolveError::CircularReference { .. }));
    }

    #[test]
    fn test_resolve_struct() {
        let resolver = MapResolver::new(vec![
            named(
                "p",
                "Spec",
                TypeDesc::Struct(
                    StructDesc::new()
                        .with_field(Field::new("Name", TypeDesc::Basic(BasicKind::String))),
                ),
            ),
            named("p", "SpecAlias", TypeDesc::named("p", "Spec")),
            named("p", "Region", TypeDesc::Basic(BasicKind::String)),
        ]);

        let alias = resolver.resolve("p", "SpecAlias").expect("resolves");
        let resolved = resolve_struct(&resolver, &alias).expect("struct");
        assert_eq!(resolved.name.name, "Spec");
        assert_eq!(resolved.as_struct().map(StructDesc::len), Some(1));

        let region = resolver.resolve("p", "Region").expect("resolves");
        let err = resolve_struct(&resolver, &region).unwrap_err();
        assert_eq!(
            err,
            ResolveError::NotAStruct {
                type_name: "p.Region".to_string(),
                found: "basic",
            }
        );
    }
}
