//! Generation strategies.
//!
//! A strategy is a set of templates plugged into the shared [`Traverser`]
//! together with a function template for the [`Printer`]. The traversal
//! algorithm is the same for all of them.

pub mod is_up_to_date;
pub mod late_init;
pub mod producer;

pub use is_up_to_date::EquivalenceChecker;
pub use late_init::LateInitializer;
pub use producer::Producer;

use crate::error::{CodegenError, TemplateError};
use crate::imports::{ImportScope, ImportSet};
use crate::printer::{GeneratedFunction, PrintedFunction, Printer};
use crate::template::{Bindings, Template};
use crate::traverser::{TemplateSet, Traverser, UnmatchedFieldPolicy};
use std::sync::Arc;
use typewright_core::{NamedType, TypeResolver};

/// Extra bindings a strategy makes available to every template.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Template bindings.
    pub bindings: Bindings,
    /// Imports behind the bindings; only those actually referenced by the
    /// printed function are kept.
    pub imports: ImportSet,
}

impl Context {
    /// Binds `key` to the selector prefix of `package` as seen from `scope`.
    ///
    /// # Errors
    /// Returns [`CodegenError::ImportAliasConflict`] on alias collisions.
    pub fn bind_package(
        &mut self,
        scope: &ImportScope,
        key: &str,
        package: &str,
    ) -> Result<(), CodegenError> {
        let prefix = scope.qualifier(package, &mut self.imports)?;
        self.bindings.set(key, prefix);
        Ok(())
    }
}

/// A configuration of the traverser and printer.
pub trait Strategy {
    /// Short label used in logs.
    fn label(&self) -> &'static str;

    /// Name of the generated function.
    fn function_name(&self, source: &NamedType, target: &NamedType) -> String;

    /// Per-shape templates.
    ///
    /// # Errors
    /// Returns an error if a template cannot be parsed.
    fn templates(&self) -> Result<TemplateSet, TemplateError>;

    /// Template wrapping the body into a function.
    ///
    /// # Errors
    /// Returns an error if the template cannot be parsed.
    fn function_template(&self) -> Result<Template, TemplateError>;

    /// Extra bindings shared by every template.
    ///
    /// # Errors
    /// Returns an error if the bindings need conflicting imports.
    fn context(&self, _scope: &ImportScope) -> Result<Context, CodegenError> {
        Ok(Context::default())
    }
}

/// Generates one function correlating `source` with `target`.
///
/// # Errors
/// Returns any traversal or printing error; no text is produced on failure.
pub fn generate<S>(
    strategy: &S,
    resolver: &dyn TypeResolver,
    scope: &ImportScope,
    policy: UnmatchedFieldPolicy,
    source: &Arc<NamedType>,
    target: &Arc<NamedType>,
) -> Result<PrintedFunction, CodegenError>
where
    S: Strategy + ?Sized,
{
    let traverser = Traverser::builder(resolver)
        .templates(strategy.templates()?)
        .scope(scope.clone())
        .policy(policy)
        .build()?;
    let context = strategy.context(scope)?;
    let name = strategy.function_name(source, target);

    let body = traverser.traverse(&name, source, target, &context.bindings)?;
    let function = GeneratedFunction {
        name,
        a_type_name: source.name.clone(),
        b_type_name: target.name.clone(),
        body,
        context: context.bindings,
    };
    let mut printed = Printer::new(strategy.function_template()?, scope.clone()).print(&function)?;

    for (path, alias) in context.imports.iter() {
        if references_alias(&printed.text, alias) {
            printed.imports.insert(path, alias)?;
        }
    }

    tracing::debug!(
        "Generated {} function {} for {} and {}",
        strategy.label(),
        printed.name,
        source.name,
        target.name
    );
    Ok(printed)
}

/// Returns true if `text` selects a symbol through `alias`, i.e. `alias.`
/// appears as a whole identifier rather than as the tail of a longer name or
/// selector.
fn references_alias(text: &str, alias: &str) -> bool {
    let selector = format!("{alias}.");
    text.match_indices(&selector).any(|(at, _)| {
        !text[..at]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '.')
    })
}

/// Uppercases the first character of `name`.
pub(crate) fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("bucket"), "Bucket");
        assert_eq!(capitalize("Bucket"), "Bucket");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_references_alias() {
        assert!(references_alias("pkgclients.X", "pkgclients"));
        assert!(references_alias("f(pkgclients.X)", "pkgclients"));
        assert!(references_alias("xpkgclients.X\n\tpkgclients.Y", "pkgclients"));
        assert!(!references_alias("xpkgclients.X", "pkgclients"));
        assert!(!references_alias("my_pkgclients.X", "pkgclients"));
        assert!(!references_alias("a.pkgclients.X", "pkgclients"));
        assert!(!references_alias("pkgclients := 1", "pkgclients"));
    }
}
