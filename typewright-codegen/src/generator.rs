//! Generation orchestration.
//!
//! The [`Generator`] resolves type references, runs the merger and the three
//! strategies, assembles Go files and hands them to an [`OutputSink`].

use crate::config::GeneratorConfig;
use crate::error::CodegenError;
use crate::filters::OmitemptyAdder;
use crate::go::{GoFile, render_struct_decl};
use crate::imports::ImportScope;
use crate::merge::{MergedType, Merger};
use crate::output::{OutputSink, PassthroughFormatter, SourceFormatter};
use crate::printer::PrintedFunction;
use crate::strategies::{self, EquivalenceChecker, LateInitializer, Producer, Strategy};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use typewright_core::{NamedType, QualifiedName, ResolveError, TypeResolver};

/// Suffix of the merged spec type.
pub const PARAMETERS_SUFFIX: &str = "Parameters";
/// Suffix of the merged status type.
pub const OBSERVATION_SUFFIX: &str = "Observation";

/// One resource processed by [`Generator::run_batch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceTarget {
    /// Resource name, e.g. `Bucket`.
    pub resource: String,
    /// Qualified path of the remote type, e.g. `example.com/sdk/storage.Bucket`.
    pub remote: String,
}

impl ResourceTarget {
    /// Creates a target.
    #[must_use]
    pub fn new(resource: impl Into<String>, remote: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            remote: remote.into(),
        }
    }

    /// File name of the generated types file.
    #[must_use]
    pub fn types_file(&self) -> PathBuf {
        PathBuf::from(format!("zz_{}_types.go", self.resource.to_lowercase()))
    }

    /// File name of the generated conversions file.
    #[must_use]
    pub fn conversions_file(&self) -> PathBuf {
        PathBuf::from(format!("zz_{}_conversions.go", self.resource.to_lowercase()))
    }
}

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Files written, in generation order.
    pub written: Vec<PathBuf>,
    /// Targets that failed, with their error.
    pub failures: Vec<(String, CodegenError)>,
}

impl BatchReport {
    /// Returns true if every target succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Drives generation for one local package.
pub struct Generator<'r> {
    resolver: &'r dyn TypeResolver,
    config: GeneratorConfig,
    scope: ImportScope,
    formatter: Box<dyn SourceFormatter + 'r>,
}

impl<'r> Generator<'r> {
    /// Creates a generator resolving types through `resolver`.
    #[must_use]
    pub fn new(resolver: &'r dyn TypeResolver, config: GeneratorConfig) -> Self {
        let scope = ImportScope::new(config.local_package.as_str());
        Self {
            resolver,
            config,
            scope,
            formatter: Box::new(PassthroughFormatter),
        }
    }

    /// Replaces the formatter applied to whole files.
    #[must_use]
    pub fn with_formatter(mut self, formatter: impl SourceFormatter + 'r) -> Self {
        self.formatter = Box::new(formatter);
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Merges the types at `source_refs` into a struct named `target_name`.
    ///
    /// # Errors
    /// Returns [`CodegenError::Resolve`] if a reference cannot be resolved or
    /// is not a struct.
    pub fn generate_merged_type(
        &self,
        target_name: &str,
        source_refs: &[&str],
    ) -> Result<MergedType, CodegenError> {
        let sources = source_refs
            .iter()
            .map(|path| resolve_ref(self.resolver, path))
            .collect::<Result<Vec<_>, _>>()?;
        Merger::new(self.resolver)
            .with_filter(OmitemptyAdder)
            .merge(target_name, &sources)
    }

    /// Generates `lateInitialize` filling `local_ref` from `remote_ref`.
    ///
    /// # Errors
    /// Returns any resolution, traversal or printing error.
    pub fn generate_late_initializer(
        &self,
        local_ref: &str,
        remote_ref: &str,
    ) -> Result<PrintedFunction, CodegenError> {
        let strategy = LateInitializer::new(self.config.runtime_package.as_str());
        self.run_strategy(self.resolver, &strategy, local_ref, remote_ref)
    }

    /// Generates `isUpToDate` comparing `local_ref` with `remote_ref`.
    ///
    /// # Errors
    /// Returns any resolution, traversal or printing error.
    pub fn generate_equivalence_checker(
        &self,
        local_ref: &str,
        remote_ref: &str,
    ) -> Result<PrintedFunction, CodegenError> {
        let strategy = EquivalenceChecker::new(self.config.clients_package.as_str());
        self.run_strategy(self.resolver, &strategy, local_ref, remote_ref)
    }

    /// Generates a function producing `target_ref` from `source_ref`.
    ///
    /// # Errors
    /// Returns any resolution, traversal or printing error.
    pub fn generate_producer(
        &self,
        source_ref: &str,
        target_ref: &str,
    ) -> Result<PrintedFunction, CodegenError> {
        self.run_strategy(self.resolver, &Producer, source_ref, target_ref)
    }

    /// Generates the types file of `resource`: its `Parameters` and
    /// `Observation` structs merged from `remote_ref`.
    ///
    /// # Errors
    /// Returns any resolution, rendering or formatting error.
    pub fn generate_resource_types(
        &self,
        resource: &str,
        remote_ref: &str,
    ) -> Result<String, CodegenError> {
        let (file, _) = self.resource_types(resource, remote_ref)?;
        self.finish(&file)
    }

    /// Generates the conversions file: late-initializer and equivalence
    /// checker between spec and remote, and producers spec to remote and
    /// remote to status.
    ///
    /// # Errors
    /// Returns any resolution, traversal, printing or formatting error.
    pub fn generate_conversions_file(
        &self,
        spec_ref: &str,
        status_ref: &str,
        remote_ref: &str,
    ) -> Result<String, CodegenError> {
        let file = self.conversions(self.resolver, spec_ref, status_ref, remote_ref)?;
        self.finish(&file)
    }

    /// Generates both files for every target and writes them to `sink`.
    ///
    /// Targets are processed in order. A failing target is logged and
    /// recorded; the remaining targets are still attempted.
    pub fn run_batch(&self, targets: &[ResourceTarget], sink: &mut dyn OutputSink) -> BatchReport {
        let mut report = BatchReport::default();
        for target in targets {
            match self.run_target(target, sink) {
                Ok(written) => {
                    tracing::info!("Generated {} ({} files)", target.resource, written.len());
                    report.written.extend(written);
                }
                Err(e) => {
                    tracing::error!("Generation of {} failed: {}", target.resource, e);
                    report.failures.push((target.resource.clone(), e));
                }
            }
        }
        report
    }

    fn run_target(
        &self,
        target: &ResourceTarget,
        sink: &mut dyn OutputSink,
    ) -> Result<Vec<PathBuf>, CodegenError> {
        let (types, merged) = self.resource_types(&target.resource, &target.remote)?;
        let types = self.finish(&types)?;

        // Conversions refer to the merged types, which exist only in memory.
        let overlay = Overlay::new(self.resolver, merged, self.scope.local_package());
        let spec_ref = self.local_ref(&format!("{}{PARAMETERS_SUFFIX}", target.resource));
        let status_ref = self.local_ref(&format!("{}{OBSERVATION_SUFFIX}", target.resource));
        let conversions = self.conversions(&overlay, &spec_ref, &status_ref, &target.remote)?;
        let conversions = self.finish(&conversions)?;

        let types_file = target.types_file();
        let conversions_file = target.conversions_file();
        sink.write(&types_file, &types)?;
        sink.write(&conversions_file, &conversions)?;
        Ok(vec![types_file, conversions_file])
    }

    fn resource_types(
        &self,
        resource: &str,
        remote_ref: &str,
    ) -> Result<(GoFile, Vec<MergedType>), CodegenError> {
        let mut file = self.new_file()?;
        let mut merged = Vec::with_capacity(2);
        for suffix in [PARAMETERS_SUFFIX, OBSERVATION_SUFFIX] {
            let ty = self.generate_merged_type(&format!("{resource}{suffix}"), &[remote_ref])?;
            file.push_rendered(&render_struct_decl(&ty, &self.scope)?)?;
            merged.push(ty);
        }
        Ok((file, merged))
    }

    fn conversions(
        &self,
        resolver: &dyn TypeResolver,
        spec_ref: &str,
        status_ref: &str,
        remote_ref: &str,
    ) -> Result<GoFile, CodegenError> {
        let late_init = LateInitializer::new(self.config.runtime_package.as_str());
        let checker = EquivalenceChecker::new(self.config.clients_package.as_str());

        let mut file = self.new_file()?;
        file.push_function(&self.run_strategy(resolver, &late_init, spec_ref, remote_ref)?)?;
        file.push_function(&self.run_strategy(resolver, &checker, spec_ref, remote_ref)?)?;
        file.push_function(&self.run_strategy(resolver, &Producer, spec_ref, remote_ref)?)?;
        file.push_function(&self.run_strategy(resolver, &Producer, remote_ref, status_ref)?)?;
        Ok(file)
    }

    fn run_strategy(
        &self,
        resolver: &dyn TypeResolver,
        strategy: &dyn Strategy,
        source_ref: &str,
        target_ref: &str,
    ) -> Result<PrintedFunction, CodegenError> {
        let source = resolve_ref(resolver, source_ref)?;
        let target = resolve_ref(resolver, target_ref)?;
        strategies::generate(
            strategy,
            resolver,
            &self.scope,
            self.config.unmatched_policy,
            &source,
            &target,
        )
    }

    fn new_file(&self) -> Result<GoFile, CodegenError> {
        let package = self.config.package_name();
        if package.is_empty() {
            return Err(CodegenError::generation("local package is not configured"));
        }
        Ok(GoFile::new(package).with_header(self.config.header.as_str()))
    }

    fn finish(&self, file: &GoFile) -> Result<String, CodegenError> {
        let text = file.render();
        if self.config.format_output {
            self.formatter.format(&text)
        } else {
            Ok(text)
        }
    }

    fn local_ref(&self, name: &str) -> String {
        format!("{}.{name}", self.scope.local_package())
    }
}

fn resolve_ref(
    resolver: &dyn TypeResolver,
    path: &str,
) -> Result<Arc<NamedType>, CodegenError> {
    resolver
        .resolve_path(path)
        .map_err(|e| CodegenError::resolve(path, e))
}

/// Resolver answering for merged types before falling back to another one.
struct Overlay<'a> {
    base: &'a dyn TypeResolver,
    types: HashMap<QualifiedName, Arc<NamedType>>,
}

impl<'a> Overlay<'a> {
    fn new(base: &'a dyn TypeResolver, merged: Vec<MergedType>, package: &str) -> Self {
        let types = merged
            .into_iter()
            .map(|ty| {
                let named = ty.into_named(package);
                (named.name.clone(), Arc::new(named))
            })
            .collect();
        Self { base, types }
    }
}

impl TypeResolver for Overlay<'_> {
    fn resolve(&self, package: &str, name: &str) -> Result<Arc<NamedType>, ResolveError> {
        match self.types.get(&QualifiedName::new(package, name)) {
            Some(ty) => Ok(Arc::clone(ty)),
            None => self.base.resolve(package, name),
        }
    }
}
