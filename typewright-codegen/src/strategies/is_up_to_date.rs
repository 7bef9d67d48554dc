//! Equivalence checker: reports whether correlated fields are equal.
//!
//! Collections are compared by length before any element is inspected and
//! pointers by nil-ness before they are dereferenced. Fields without a
//! counterpart are governed by the traverser's correlation policy, so with
//! the default policy they never make two values differ.

use super::{Context, Strategy};
use crate::error::{CodegenError, TemplateError};
use crate::imports::ImportScope;
use crate::template::Template;
use crate::traverser::{ScalarTemplates, TemplateSet};
use typewright_core::NamedType;

/// Package providing `BoolValue`, `StringValue` and `Int64Value`.
pub const DEFAULT_CLIENTS_PACKAGE: &str = "github.com/crossplane/provider-gcp/pkg/clients";

/// Name of the generated function.
pub const FUNCTION_NAME: &str = "isUpToDate";

const FUNCTION: &str = "\
// {{fn_name}} compares the given {{a_type}} with {{b_type}} and
// reports whether all correlated fields are equal.
func {{fn_name}}(a *{{a_type}}, b *{{b_type}}) bool {
{{body}}
return true
}";

const BASIC: &str = "\
if {{a_as_b}} != {{b_path}} {
return false
}";

const BOOL_POINTER: &str = "\
if {{clients}}BoolValue({{a_path}}) != {{clients}}BoolValue({{b_path}}) {
return false
}";

const STRING_POINTER: &str = "\
if {{clients}}StringValue({{a_path}}) != {{clients}}StringValue({{b_path}}) {
return false
}";

const INT64_POINTER: &str = "\
if {{clients}}Int64Value({{a_path}}) != {{clients}}Int64Value({{b_path}}) {
return false
}";

const OTHER_POINTER: &str = "\
if ({{a_path}} == nil) != ({{b_path}} == nil) {
return false
}
if {{a_path}} != nil && {{a_as_b}} != {{b_value}} {
return false
}";

const POINTER: &str = "\
if ({{a_path}} == nil) != ({{b_path}} == nil) {
return false
}
if {{a_path}} != nil && {{b_path}} != nil {
{{body}}
}";

const SLICE: &str = "\
if len({{a_path}}) != len({{b_path}}) {
return false
}
for {{index}} := range {{b_path}} {
{{body}}
}";

const MAP: &str = "\
if len({{a_path}}) != len({{b_path}}) {
return false
}
for {{key}} := range {{b_path}} {
if _, ok := {{a_path}}[{{key}}]; !ok {
return false
}
{{body}}
}";

/// Generates the `isUpToDate` function.
#[derive(Debug, Clone)]
pub struct EquivalenceChecker {
    clients_package: String,
}

impl EquivalenceChecker {
    /// Creates a checker using `clients_package` for pointer value helpers.
    #[must_use]
    pub fn new(clients_package: impl Into<String>) -> Self {
        Self {
            clients_package: clients_package.into(),
        }
    }

    /// Returns the helper package path.
    #[must_use]
    pub fn clients_package(&self) -> &str {
        &self.clients_package
    }
}

impl Default for EquivalenceChecker {
    fn default() -> Self {
        Self::new(DEFAULT_CLIENTS_PACKAGE)
    }
}

impl Strategy for EquivalenceChecker {
    fn label(&self) -> &'static str {
        "equivalence-checker"
    }

    fn function_name(&self, _source: &NamedType, _target: &NamedType) -> String {
        FUNCTION_NAME.to_string()
    }

    fn templates(&self) -> Result<TemplateSet, TemplateError> {
        Ok(TemplateSet {
            basic: Template::parse("is_up_to_date.basic", BASIC)?,
            scalar_pointer: ScalarTemplates {
                bool: Template::parse("is_up_to_date.bool_pointer", BOOL_POINTER)?,
                string: Template::parse("is_up_to_date.string_pointer", STRING_POINTER)?,
                int64: Template::parse("is_up_to_date.int64_pointer", INT64_POINTER)?,
                other: Template::parse("is_up_to_date.other_pointer", OTHER_POINTER)?,
            },
            pointer: Template::parse("is_up_to_date.pointer", POINTER)?,
            slice: Template::parse("is_up_to_date.slice", SLICE)?,
            map: Template::parse("is_up_to_date.map", MAP)?,
        })
    }

    fn function_template(&self) -> Result<Template, TemplateError> {
        Template::parse("is_up_to_date.function", FUNCTION)
    }

    fn context(&self, scope: &ImportScope) -> Result<Context, CodegenError> {
        let mut context = Context::default();
        context.bind_package(scope, "clients", &self.clients_package)?;
        Ok(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printer::PrintedFunction;
    use crate::strategies::fixtures::{LOCAL, REMOTE, registry};
    use crate::strategies::generate;
    use crate::traverser::UnmatchedFieldPolicy;
    use typewright_core::TypeResolver;

    fn check(a: (&str, &str), b: (&str, &str), policy: UnmatchedFieldPolicy) -> Result<PrintedFunction, CodegenError> {
        let registry = registry();
        let a = registry.resolve(a.0, a.1).expect("a");
        let b = registry.resolve(b.0, b.1).expect("b");
        generate(
            &EquivalenceChecker::default(),
            &registry,
            &ImportScope::new(LOCAL),
            policy,
            &a,
            &b,
        )
    }

    #[test]
    fn test_map_length_checked_before_elements() {
        let printed = check(
            (LOCAL, "Tagged"),
            (REMOTE, "Tagged"),
            UnmatchedFieldPolicy::Skip,
        )
        .expect("Failed to generate");

        assert_eq!(
            printed.text,
            "// isUpToDate compares the given Tagged with sdkstorage.Tagged and
// reports whether all correlated fields are equal.
func isUpToDate(a *Tagged, b *sdkstorage.Tagged) bool {
\tif len(a.Tags) != len(b.Tags) {
\t\treturn false
\t}
\tfor k0 := range b.Tags {
\t\tif _, ok := a.Tags[k0]; !ok {
\t\t\treturn false
\t\t}
\t\tif a.Tags[k0] != b.Tags[k0] {
\t\t\treturn false
\t\t}
\t}
\treturn true
}
"
        );
        // No pointer helpers are used, so the helper package is not imported.
        assert!(!printed.imports.contains(DEFAULT_CLIENTS_PACKAGE));
        assert_eq!(printed.imports.len(), 1);
    }

    #[test]
    fn test_full_checker() {
        let printed = check(
            (LOCAL, "BucketParameters"),
            (REMOTE, "Bucket"),
            UnmatchedFieldPolicy::Skip,
        )
        .expect("Failed to generate");
        let text = &printed.text;

        assert!(text.contains("\tif a.Name != b.Name {\n\t\treturn false\n\t}\n"));
        assert!(text.contains("\tif pkgclients.Int64Value(a.Size) != pkgclients.Int64Value(b.Size) {\n"));
        assert!(text.contains("\tif pkgclients.BoolValue(a.Versioned) != pkgclients.BoolValue(b.Versioned) {\n"));
        assert!(text.contains(
            "\tif (a.Lifecycle == nil) != (b.Lifecycle == nil) {\n\t\treturn false\n\t}\n\
             \tif a.Lifecycle != nil && b.Lifecycle != nil {\n\
             \t\tif a.Lifecycle.Age != b.Lifecycle.Age {\n"
        ));

        let length = text.find("if len(a.Zones) != len(b.Zones)").expect("length check");
        let range = text.find("for i0 := range b.Zones").expect("loop");
        assert!(length < range);

        assert!(printed.imports.contains(DEFAULT_CLIENTS_PACKAGE));
        assert!(!text.contains("Region"));
        assert!(!text.contains("Created"));
    }

    #[test]
    fn test_checker_strict_policy() {
        let err = check(
            (REMOTE, "Bucket"),
            (LOCAL, "BucketParameters"),
            UnmatchedFieldPolicy::Error,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CodegenError::UnmatchedField { ref function, ref path }
                if function == "isUpToDate" && path == "a.Created"
        ));
    }
}
