//! Package registry.
//!
//! [`SchemaRegistry`] owns parsed package declarations and turns them into
//! [`NamedType`] descriptions on request. It does not cache; wrap it in a
//! [`crate::TypeCache`] to share resolved types.

use crate::error::ParseError;
use crate::expr::parse_type_expr;
use crate::parser::parse_packages;
use crate::types::{PackageDef, TypeDecl};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use typewright_core::{
    Field, NamedType, QualifiedName, ResolveError, StructDesc, TypeDesc, TypeResolver,
};

/// Registry of package declarations, addressed by package path.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    packages: HashMap<String, PackageDef>,
}

impl SchemaRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a package.
    ///
    /// # Errors
    /// Returns [`ParseError::DuplicateDefinition`] if the path is registered.
    pub fn add_package(&mut self, package: PackageDef) -> Result<(), ParseError> {
        if self.packages.contains_key(&package.path) {
            return Err(ParseError::duplicate("package", package.path));
        }
        tracing::debug!("Registered package {}", package.path);
        self.packages.insert(package.path.clone(), package);
        Ok(())
    }

    /// Parses an XML document and registers every package it declares.
    ///
    /// # Errors
    /// Returns `ParseError` if parsing fails or a package is registered twice.
    pub fn load_xml(&mut self, xml: &str) -> Result<(), ParseError> {
        for package in parse_packages(xml)? {
            self.add_package(package)?;
        }
        Ok(())
    }

    /// Reads and registers a package document from disk.
    ///
    /// # Errors
    /// Returns `ParseError` if reading or parsing fails.
    pub fn load_file(&mut self, path: &Path) -> Result<(), ParseError> {
        let xml = std::fs::read_to_string(path)?;
        self.load_xml(&xml)
    }

    /// Builds a registry from several XML documents.
    ///
    /// # Errors
    /// Returns `ParseError` if any document fails to load.
    pub fn from_documents<'a, I>(documents: I) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut registry = Self::new();
        for xml in documents {
            registry.load_xml(xml)?;
        }
        Ok(registry)
    }

    /// Looks up a package by path.
    #[must_use]
    pub fn package(&self, path: &str) -> Option<&PackageDef> {
        self.packages.get(path)
    }

    /// Iterates over registered packages in no particular order.
    pub fn packages(&self) -> impl Iterator<Item = &PackageDef> {
        self.packages.values()
    }

    /// Returns the number of registered packages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// Returns true if no package is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    fn build(&self, package: &PackageDef, decl: &TypeDecl) -> Result<NamedType, ResolveError> {
        let name = QualifiedName::new(&package.path, decl.name());
        let malformed = |err: ParseError| ResolveError::malformed(name.to_string(), err.to_string());

        let underlying = match decl {
            TypeDecl::Struct(s) => {
                let mut desc = StructDesc::new();
                for field in &s.fields {
                    let ty = parse_type_expr(&field.type_expr, &package.path).map_err(malformed)?;
                    let mut built = Field::new(&field.name, ty);
                    built.tag = field.tag.clone().unwrap_or_default();
                    built.markers = field.markers.clone();
                    desc.push_field(built);
                }
                TypeDesc::Struct(desc)
            }
            TypeDecl::Alias(a) => parse_type_expr(&a.type_expr, &package.path).map_err(malformed)?,
        };

        if underlying == TypeDesc::Named(name.clone()) {
            return Err(ResolveError::CircularReference {
                path: format!("{name} -> {name}"),
            });
        }
        Ok(NamedType::new(name, underlying))
    }
}

impl TypeResolver for SchemaRegistry {
    fn resolve(&self, package: &str, name: &str) -> Result<Arc<NamedType>, ResolveError> {
        let def = self
            .packages
            .get(package)
            .ok_or_else(|| ResolveError::PackageNotFound {
                package: package.to_string(),
            })?;
        let decl = def
            .get_type(name)
            .ok_or_else(|| ResolveError::type_not_found(package, name))?;
        self.build(def, decl).map(Arc::new)
    }
}
