//! # Typewright Codegen
//!
//! Structural code generation between two type graphs.
//!
//! This crate provides:
//! - The [`Merger`] building one struct from several source structs
//! - The dual-tree [`Traverser`] emitting template-driven code per leaf shape
//! - Three strategies: late-initializer, equivalence checker and producer
//! - The [`Printer`] wrapping bodies into complete Go functions
//! - Go type rendering, import management and file assembly
//! - The [`Generator`] facade with formatter and output sinks

pub mod config;
pub mod error;
pub mod filters;
pub mod generator;
pub mod go;
pub mod imports;
pub mod merge;
pub mod output;
pub mod printer;
pub mod strategies;
pub mod template;
pub mod traverser;

pub use config::{DEFAULT_HEADER, GeneratorConfig, GeneratorConfigBuilder};
pub use error::{CodegenError, TemplateError};
pub use filters::{FieldFilter, OmitemptyAdder};
pub use generator::{BatchReport, Generator, ResourceTarget};
pub use go::{GoFile, Rendered, reindent, render_name, render_struct_decl, render_type};
pub use imports::{ImportScope, ImportSet, alias_for};
pub use merge::{FieldMarkers, MarkerSet, MergedType, Merger, OPTIONAL_MARKER};
pub use output::{
    CommandFormatter, DirectorySink, MemorySink, OutputSink, PassthroughFormatter,
    SourceFormatter,
};
pub use printer::{GeneratedFunction, PrintedFunction, Printer};
pub use strategies::{Context, EquivalenceChecker, LateInitializer, Producer, Strategy};
pub use template::{Bindings, Template};
pub use traverser::{
    Fragment, ScalarTemplates, TemplateSet, Traverser, TraverserBuilder, UnmatchedFieldPolicy,
};

use typewright_schema::{SchemaRegistry, TypeCache};

/// Generates the types and conversions files of `targets` from XML package
/// documents.
///
/// # Arguments
/// * `documents` - XML package documents declaring every referenced type
/// * `config` - Generator configuration
/// * `targets` - Resources to generate
///
/// # Returns
/// The generated files, keyed by file name.
///
/// # Errors
/// Returns `CodegenError` if a document cannot be parsed or any target fails.
pub fn generate_from_xml(
    documents: &[&str],
    config: GeneratorConfig,
    targets: &[ResourceTarget],
) -> Result<MemorySink, CodegenError> {
    let registry = SchemaRegistry::from_documents(documents.iter().copied())?;
    let cache = TypeCache::new(registry);
    let generator = Generator::new(&cache, config);

    let mut sink = MemorySink::new();
    let report = generator.run_batch(targets, &mut sink);
    if let Some((_, err)) = report.failures.into_iter().next() {
        return Err(err);
    }
    Ok(sink)
}

/// Generates the types and conversions files of `targets` from XML package
/// files.
///
/// # Errors
/// Returns `CodegenError` if reading, parsing or generation fails.
pub fn generate_from_files(
    paths: &[&std::path::Path],
    config: GeneratorConfig,
    targets: &[ResourceTarget],
) -> Result<MemorySink, CodegenError> {
    let documents = paths
        .iter()
        .map(std::fs::read_to_string)
        .collect::<Result<Vec<_>, _>>()?;
    let documents: Vec<&str> = documents.iter().map(String::as_str).collect();
    generate_from_xml(&documents, config, targets)
}
