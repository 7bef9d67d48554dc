//! Function printing.

use crate::error::CodegenError;
use crate::go::file::reindent;
use crate::go::types::render_name;
use crate::imports::{ImportScope, ImportSet};
use crate::template::{Bindings, Template};
use crate::traverser::Fragment;
use typewright_core::QualifiedName;

/// A function body produced by a strategy, ready to be printed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFunction {
    /// Function name.
    pub name: String,
    /// Type of the first parameter.
    pub a_type_name: QualifiedName,
    /// Type of the second parameter.
    pub b_type_name: QualifiedName,
    /// Rendered statements.
    pub body: Fragment,
    /// Extra bindings for the function template.
    pub context: Bindings,
}

/// A complete function definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintedFunction {
    /// Function name.
    pub name: String,
    /// Function source text.
    pub text: String,
    /// Packages referenced by the text.
    pub imports: ImportSet,
}

impl PrintedFunction {
    /// Returns the sorted import block the function needs.
    #[must_use]
    pub fn preamble(&self) -> String {
        self.imports.render()
    }
}

/// Wraps generated bodies into function definitions.
///
/// The function template sees `fn_name`, `a_type`, `b_type` and `body`, plus
/// the function's context bindings.
#[derive(Debug, Clone)]
pub struct Printer {
    template: Template,
    scope: ImportScope,
}

impl Printer {
    /// Creates a printer using `template` for code in `scope`.
    #[must_use]
    pub fn new(template: Template, scope: ImportScope) -> Self {
        Self { template, scope }
    }

    /// Prints `function`.
    ///
    /// # Errors
    /// Returns [`CodegenError::Template`] if the function template fails to
    /// render, or [`CodegenError::ImportAliasConflict`] on alias collisions.
    pub fn print(&self, function: &GeneratedFunction) -> Result<PrintedFunction, CodegenError> {
        let a_type = render_name(&function.a_type_name, &self.scope)?;
        let b_type = render_name(&function.b_type_name, &self.scope)?;

        let mut imports = function.body.imports.clone();
        imports.merge(&a_type.imports)?;
        imports.merge(&b_type.imports)?;

        let mut bindings = function.context.clone();
        bindings
            .set("fn_name", function.name.as_str())
            .set("a_type", a_type.text)
            .set("b_type", b_type.text)
            .set("body", function.body.text.as_str());

        let text = self
            .template
            .render(&bindings)
            .map_err(|source| CodegenError::Template {
                function: function.name.clone(),
                path: self.template.name().to_string(),
                source,
            })?;

        Ok(PrintedFunction {
            name: function.name.clone(),
            text: reindent(text.trim_matches('\n')),
            imports,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn function(body: &str) -> GeneratedFunction {
        let mut imports = ImportSet::new();
        imports
            .insert("example.com/sdk/clients", "sdkclients")
            .expect("insert");
        GeneratedFunction {
            name: "isUpToDate".to_string(),
            a_type_name: QualifiedName::new("example.com/apis/v1", "BucketParameters"),
            b_type_name: QualifiedName::new("example.com/sdk/storage", "Bucket"),
            body: Fragment::new(body, imports),
            context: Bindings::new(),
        }
    }

    #[test]
    fn test_print_function() {
        let template = Template::parse(
            "function",
            "func {{fn_name}}(a *{{a_type}}, b *{{b_type}}) bool {\n{{body}}\nreturn true\n}",
        )
        .expect("parse");
        let printer = Printer::new(template, ImportScope::new("example.com/apis/v1"));

        let printed = printer
            .print(&function("if a.Name != b.Name {\nreturn false\n}"))
            .expect("print");

        assert_eq!(printed.name, "isUpToDate");
        assert_eq!(
            printed.text,
            "func isUpToDate(a *BucketParameters, b *sdkstorage.Bucket) bool {\n\
             \tif a.Name != b.Name {\n\
             \t\treturn false\n\
             \t}\n\
             \treturn true\n\
             }\n"
        );
        assert_eq!(
            printed.preamble(),
            "import (\n\tsdkclients \"example.com/sdk/clients\"\n\tsdkstorage \"example.com/sdk/storage\"\n)\n"
        );
    }

    #[test]
    fn test_print_missing_context() {
        let template = Template::parse("late_init", "li := {{runtime}}New()\n{{body}}").expect("parse");
        let printer = Printer::new(template, ImportScope::new("example.com/apis/v1"));

        let err = printer.print(&function("")).unwrap_err();
        assert!(matches!(
            err,
            CodegenError::Template { ref function, ref path, .. }
                if function == "isUpToDate" && path == "late_init"
        ));
    }
}
