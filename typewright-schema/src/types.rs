//! Package declaration types.
//!
//! This module contains the raw declarations read from a package document.
//! Type expressions are kept as text and parsed when a type is resolved.

use crate::error::ParseError;
use std::collections::HashMap;

/// Declarations of one package.
#[derive(Debug, Clone)]
pub struct PackageDef {
    /// Package path, e.g. `github.com/acme/apis/storage/v1alpha1`.
    pub path: String,
    /// Package name used in source files.
    pub name: String,
    /// Package description.
    pub description: Option<String>,
    /// Type declarations in document order.
    pub types: Vec<TypeDecl>,
    /// Type lookup map (built while adding types).
    type_map: HashMap<String, usize>,
}

impl PackageDef {
    /// Creates a new empty package.
    #[must_use]
    pub fn new(path: String, name: String) -> Self {
        Self {
            path,
            name,
            description: None,
            types: Vec::new(),
            type_map: HashMap::new(),
        }
    }

    /// Adds a type declaration to the package.
    ///
    /// # Errors
    /// Returns [`ParseError::DuplicateDefinition`] if the name is taken.
    pub fn add_type(&mut self, decl: TypeDecl) -> Result<(), ParseError> {
        let name = decl.name().to_string();
        if self.type_map.contains_key(&name) {
            return Err(ParseError::duplicate("type", name));
        }
        let index = self.types.len();
        self.types.push(decl);
        self.type_map.insert(name, index);
        Ok(())
    }

    /// Looks up a type by name.
    #[must_use]
    pub fn get_type(&self, name: &str) -> Option<&TypeDecl> {
        self.type_map.get(name).map(|&idx| &self.types[idx])
    }

    /// Returns true if a type with the given name exists.
    #[must_use]
    pub fn has_type(&self, name: &str) -> bool {
        self.type_map.contains_key(name)
    }
}

/// Type declaration variants.
#[derive(Debug, Clone)]
pub enum TypeDecl {
    /// Struct declaration.
    Struct(StructDecl),
    /// Named type over any other type expression.
    Alias(AliasDecl),
}

impl TypeDecl {
    /// Returns the name of the type.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Struct(s) => &s.name,
            Self::Alias(a) => &a.name,
        }
    }

    /// Returns true if this is a struct declaration.
    #[must_use]
    pub const fn is_struct(&self) -> bool {
        matches!(self, Self::Struct(_))
    }
}

/// Struct declaration.
#[derive(Debug, Clone)]
pub struct StructDecl {
    /// Type name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Fields in declaration order.
    pub fields: Vec<FieldDecl>,
}

impl StructDecl {
    /// Creates a new struct declaration.
    #[must_use]
    pub fn new(name: String) -> Self {
        Self {
            name,
            description: None,
            fields: Vec::new(),
        }
    }

    /// Adds a field unless the name is already declared.
    ///
    /// Returns false when the field was dropped.
    pub fn add_field(&mut self, field: FieldDecl) -> bool {
        if self.fields.iter().any(|f| f.name == field.name) {
            return false;
        }
        self.fields.push(field);
        true
    }
}

/// Field declaration within a struct.
#[derive(Debug, Clone)]
pub struct FieldDecl {
    /// Field name.
    pub name: String,
    /// Type expression.
    pub type_expr: String,
    /// Tag text, reproduced verbatim.
    pub tag: Option<String>,
    /// Marker lines.
    pub markers: Vec<String>,
}

impl FieldDecl {
    /// Creates a new field declaration.
    #[must_use]
    pub fn new(name: String, type_expr: String) -> Self {
        Self {
            name,
            type_expr,
            tag: None,
            markers: Vec::new(),
        }
    }
}

/// Named type declared over a type expression.
#[derive(Debug, Clone)]
pub struct AliasDecl {
    /// Type name.
    pub name: String,
    /// Underlying type expression.
    pub type_expr: String,
    /// Description.
    pub description: Option<String>,
}

impl AliasDecl {
    /// Creates a new alias declaration.
    #[must_use]
    pub fn new(name: String, type_expr: String) -> Self {
        Self {
            name,
            type_expr,
            description: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_add_and_lookup() {
        let mut package = PackageDef::new("example.com/storage".to_string(), "storage".to_string());
        package
            .add_type(TypeDecl::Struct(StructDecl::new("Bucket".to_string())))
            .expect("first add");
        package
            .add_type(TypeDecl::Alias(AliasDecl::new(
                "Region".to_string(),
                "string".to_string(),
            )))
            .expect("second add");

        assert!(package.has_type("Bucket"));
        assert!(package.get_type("Bucket").is_some_and(TypeDecl::is_struct));
        assert!(!package.get_type("Region").is_some_and(TypeDecl::is_struct));
        assert!(package.get_type("Missing").is_none());
    }

    #[test]
    fn test_package_duplicate_type() {
        let mut package = PackageDef::new("p".to_string(), "p".to_string());
        package
            .add_type(TypeDecl::Struct(StructDecl::new("Bucket".to_string())))
            .expect("first add");
        let err = package
            .add_type(TypeDecl::Struct(StructDecl::new("Bucket".to_string())))
            .unwrap_err();
        assert!(matches!(err, ParseError::DuplicateDefinition { .. }));
    }

    #[test]
    fn test_struct_first_field_wins() {
        let mut decl = StructDecl::new("Bucket".to_string());
        assert!(decl.add_field(FieldDecl::new("Name".to_string(), "string".to_string())));
        assert!(!decl.add_field(FieldDecl::new("Name".to_string(), "int64".to_string())));
        assert_eq!(decl.fields.len(), 1);
        assert_eq!(decl.fields[0].type_expr, "string");
    }
}
