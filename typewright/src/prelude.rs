//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types and traits.
//!
//! ```ignore
//! use typewright::prelude::*;
//! ```

// Type model
pub use typewright_core::{
    BasicKind, Field, NamedType, QualifiedName, ResolveError, ScalarClass, StructDesc, TypeDesc,
    TypeResolver,
};

// Resolution
pub use typewright_schema::{ParseError, SchemaError, SchemaRegistry, TypeCache};

// Generation
pub use typewright_codegen::{
    BatchReport, CodegenError, CommandFormatter, DirectorySink, EquivalenceChecker, FieldFilter,
    Generator, GeneratorConfig, LateInitializer, MemorySink, Merger, OmitemptyAdder, OutputSink,
    PassthroughFormatter, Producer, ResourceTarget, SourceFormatter, Strategy, Traverser,
    UnmatchedFieldPolicy,
};
