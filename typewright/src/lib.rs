//! # Typewright
//!
//! Generates conversion and comparison code between two independently
//! defined type graphs: the local types of a managed resource and the remote
//! types of the API it manages.
//!
//! ## Features
//!
//! - **Lock-step traversal** - Walks both type trees together, correlating fields by name
//! - **Template-driven output** - One code snippet per leaf shape (scalar, pointer, slice, map, struct)
//! - **Three generators** - Late-initializer, equivalence checker and producer
//! - **Type merging** - Builds spec and status structs from remote types
//! - **Memoized resolution** - Shared, thread-safe type cache
//!
//! ## Quick Start
//!
//! ```ignore
//! use typewright::prelude::*;
//!
//! let registry = SchemaRegistry::from_documents([xml])?;
//! let cache = TypeCache::new(registry);
//! let config = GeneratorConfig::builder()
//!     .local_package("example.com/apis/storage/v1alpha1")
//!     .build();
//!
//! let generator = Generator::new(&cache, config);
//! let report = generator.run_batch(
//!     &[ResourceTarget::new("Bucket", "example.com/sdk/storage.Bucket")],
//!     &mut DirectorySink::new("apis/storage/v1alpha1"),
//! );
//! ```
//!
//! ## Crate Organization
//!
//! - [`core`] - Type descriptions and the resolver boundary
//! - [`schema`] - Package documents, type expressions, registry and cache
//! - [`codegen`] - Merger, traverser, strategies, printer and file output

pub mod prelude;

/// Type descriptions and the resolver boundary.
pub mod core {
    pub use typewright_core::*;
}

/// Package documents and type resolution.
pub mod schema {
    pub use typewright_schema::*;
}

/// Code generation.
pub mod codegen {
    pub use typewright_codegen::*;
}

// Re-export commonly used items at the crate root
pub use typewright_codegen::{
    CodegenError, Generator, GeneratorConfig, ResourceTarget, generate_from_files,
    generate_from_xml,
};
pub use typewright_core::{NamedType, QualifiedName, TypeDesc, TypeResolver};
pub use typewright_schema::{SchemaRegistry, TypeCache};
