//! # Typewright Schema
//!
//! Type resolution for the typewright generators.
//!
//! This crate provides:
//! - XML package document parsing into declarations
//! - A type-expression parser (`*T`, `[]T`, `map[K]V`, qualified names)
//! - [`SchemaRegistry`], a [`typewright_core::TypeResolver`] over parsed packages
//! - [`TypeCache`], a memoizing resolver safe for concurrent population
//! - Package validation

pub mod cache;
pub mod error;
pub mod expr;
pub mod parser;
pub mod registry;
pub mod types;
pub mod validation;

pub use cache::{CacheStats, TypeCache};
pub use error::{ParseError, SchemaError};
pub use expr::parse_type_expr;
pub use parser::{parse_package, parse_packages};
pub use registry::SchemaRegistry;
pub use types::{AliasDecl, FieldDecl, PackageDef, StructDecl, TypeDecl};
pub use validation::{validate_package, validate_registry};
