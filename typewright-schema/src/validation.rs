//! Package validation utilities.
//!
//! Resolution parses type expressions lazily; these checks parse them all up
//! front so that a broken package document is reported before generation.

use crate::error::SchemaError;
use crate::expr::parse_type_expr;
use crate::registry::SchemaRegistry;
use crate::types::{PackageDef, TypeDecl};
use typewright_core::{QualifiedName, TypeDesc};

/// Validates a single package in isolation.
///
/// Every type expression must parse and every reference into the same
/// package must name a declared type.
///
/// # Errors
/// Returns `SchemaError` describing the first problem found.
pub fn validate_package(package: &PackageDef) -> Result<(), SchemaError> {
    for_each_reference(package, |name, field| {
        if name.package == package.path && !package.has_type(&name.name) {
            return Err(SchemaError::UnknownReference {
                type_name: name.to_string(),
                field: field.to_string(),
            });
        }
        Ok(())
    })
}

/// Validates every package of a registry, including cross-package references.
///
/// # Errors
/// Returns `SchemaError` describing the first problem found.
pub fn validate_registry(registry: &SchemaRegistry) -> Result<(), SchemaError> {
    let mut paths: Vec<&str> = registry.packages().map(|p| p.path.as_str()).collect();
    paths.sort_unstable();

    for path in paths {
        let Some(package) = registry.package(path) else {
            continue;
        };
        for_each_reference(package, |name, field| {
            let known = registry
                .package(&name.package)
                .is_some_and(|p| p.has_type(&name.name));
            if !known {
                return Err(SchemaError::UnknownReference {
                    type_name: name.to_string(),
                    field: field.to_string(),
                });
            }
            Ok(())
        })?;
    }
    Ok(())
}

/// Parses every expression of `package` and calls `check` for each named
/// reference with the `Type.Field` that holds it.
fn for_each_reference<F>(package: &PackageDef, mut check: F) -> Result<(), SchemaError>
where
    F: FnMut(&QualifiedName, &str) -> Result<(), SchemaError>,
{
    for decl in &package.types {
        let exprs: Vec<(String, &str)> = match decl {
            TypeDecl::Struct(s) => s
                .fields
                .iter()
                .map(|f| (format!("{}.{}", s.name, f.name), f.type_expr.as_str()))
                .collect(),
            TypeDecl::Alias(a) => vec![(a.name.clone(), a.type_expr.as_str())],
        };

        for (holder, expr) in exprs {
            let ty: TypeDesc = parse_type_expr(expr, &package.path)?;
            let mut refs = Vec::new();
            ty.for_each_named(&mut |name| refs.push(name.clone()));
            for name in &refs {
                check(name, &holder)?;
            }
        }
    }
    Ok(())
}
