//! # Typewright Core
//!
//! Core data model shared by every typewright crate.
//!
//! This crate provides:
//! - Structural type descriptions (basic, pointer, slice, map, struct, named)
//! - Qualified names addressing a type inside a package
//! - The [`TypeResolver`] boundary used to look named types up
//! - Error types for resolution

pub mod error;
pub mod resolver;
pub mod types;

pub use error::{ResolveError, Result};
pub use resolver::{TypeResolver, Underlying, resolve_underlying, resolve_struct};
pub use types::{BasicKind, Field, NamedType, QualifiedName, ScalarClass, StructDesc, TypeDesc};
