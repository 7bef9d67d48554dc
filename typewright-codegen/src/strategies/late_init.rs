//! Late-initializer: fills empty fields of `a` from `b`.
//!
//! A field of `a` is only written when it is still at its zero value, so
//! running the generated function twice reports no change the second time.

use super::{Context, Strategy};
use crate::error::{CodegenError, TemplateError};
use crate::imports::ImportScope;
use crate::template::Template;
use crate::traverser::{ScalarTemplates, TemplateSet};
use typewright_core::NamedType;

/// Package providing `NewLateInitializer` in generated code.
pub const DEFAULT_RUNTIME_PACKAGE: &str = "github.com/crossplane/crossplane-runtime/pkg/resource";

/// Name of the generated function.
pub const FUNCTION_NAME: &str = "lateInitialize";

const FUNCTION: &str = "\
// {{fn_name}} late initializes the given {{a_type}} with the information
// from given {{b_type}} and reports whether any change has been made.
func {{fn_name}}(a *{{a_type}}, b *{{b_type}}) bool {
li := {{runtime}}NewLateInitializer()
{{body}}
return li.IsChanged()
}";

const BASIC: &str = "\
if {{a_path}} == {{a_zero}} && {{b_path}} != {{b_zero}} {
{{a_path}} = {{b_as_a}}
li.SetChanged()
}";

const BOOL_POINTER: &str = "{{a_path}} = li.LateInitializeBoolPtr({{a_path}}, {{b_path}})";
const STRING_POINTER: &str = "{{a_path}} = li.LateInitializeStringPtr({{a_path}}, {{b_path}})";
const INT64_POINTER: &str = "{{a_path}} = li.LateInitializeInt64Ptr({{a_path}}, {{b_path}})";

const OTHER_POINTER: &str = "\
if {{a_path}} == nil && {{b_path}} != nil {
{{a_path}} = new({{a_elem_type}})
*{{a_path}} = {{b_as_a}}
li.SetChanged()
}";

const POINTER: &str = "\
if {{b_path}} != nil {
if {{a_path}} == nil {
{{a_path}} = new({{a_elem_type}})
li.SetChanged()
}
{{body}}
}";

const SLICE: &str = "\
if len({{a_path}}) == 0 && len({{b_path}}) != 0 {
{{a_path}} = make({{a_type}}, len({{b_path}}))
li.SetChanged()
for {{index}} := range {{b_path}} {
{{body}}
}
}";

const MAP: &str = "\
if len({{a_path}}) == 0 && len({{b_path}}) != 0 {
{{a_path}} = make({{a_type}}, len({{b_path}}))
li.SetChanged()
for {{key}} := range {{b_path}} {
{{body}}
}
}";

/// Generates the `lateInitialize` function.
#[derive(Debug, Clone)]
pub struct LateInitializer {
    runtime_package: String,
}

impl LateInitializer {
    /// Creates a late-initializer using `runtime_package` for its helper.
    #[must_use]
    pub fn new(runtime_package: impl Into<String>) -> Self {
        Self {
            runtime_package: runtime_package.into(),
        }
    }

    /// Returns the runtime package path.
    #[must_use]
    pub fn runtime_package(&self) -> &str {
        &self.runtime_package
    }
}

impl Default for LateInitializer {
    fn default() -> Self {
        Self::new(DEFAULT_RUNTIME_PACKAGE)
    }
}

impl Strategy for LateInitializer {
    fn label(&self) -> &'static str {
        "late-initializer"
    }

    fn function_name(&self, _source: &NamedType, _target: &NamedType) -> String {
        FUNCTION_NAME.to_string()
    }

    fn templates(&self) -> Result<TemplateSet, TemplateError> {
        Ok(TemplateSet {
            basic: Template::parse("late_init.basic", BASIC)?,
            scalar_pointer: ScalarTemplates {
                bool: Template::parse("late_init.bool_pointer", BOOL_POINTER)?,
                string: Template::parse("late_init.string_pointer", STRING_POINTER)?,
                int64: Template::parse("late_init.int64_pointer", INT64_POINTER)?,
                other: Template::parse("late_init.other_pointer", OTHER_POINTER)?,
            },
            pointer: Template::parse("late_init.pointer", POINTER)?,
            slice: Template::parse("late_init.slice", SLICE)?,
            map: Template::parse("late_init.map", MAP)?,
        })
    }

    fn function_template(&self) -> Result<Template, TemplateError> {
        Template::parse("late_init.function", FUNCTION)
    }

    fn context(&self, scope: &ImportScope) -> Result<Context, CodegenError> {
        let mut context = Context::default();
        context.bind_package(scope, "runtime", &self.runtime_package)?;
        Ok(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::fixtures::{LOCAL, REMOTE, registry};
    use crate::strategies::generate;
    use crate::traverser::UnmatchedFieldPolicy;
    use typewright_core::TypeResolver;

    #[test]
    fn test_late_initializer() {
        let registry = registry();
        let spec = registry.resolve(LOCAL, "BucketParameters").expect("spec");
        let remote = registry.resolve(REMOTE, "Bucket").expect("remote");

        let printed = generate(
            &LateInitializer::default(),
            &registry,
            &ImportScope::new(LOCAL),
            UnmatchedFieldPolicy::Skip,
            &spec,
            &remote,
        )
        .expect("Failed to generate");

        assert_eq!(printed.name, "lateInitialize");
        assert_eq!(
            printed.text,
            "// lateInitialize late initializes the given BucketParameters with the information
// from given sdkstorage.Bucket and reports whether any change has been made.
func lateInitialize(a *BucketParameters, b *sdkstorage.Bucket) bool {
\tli := pkgresource.NewLateInitializer()
\tif a.Name == \"\" && b.Name != \"\" {
\t\ta.Name = b.Name
\t\tli.SetChanged()
\t}
\ta.Size = li.LateInitializeInt64Ptr(a.Size, b.Size)
\ta.Versioned = li.LateInitializeBoolPtr(a.Versioned, b.Versioned)
\tif len(a.Tags) == 0 && len(b.Tags) != 0 {
\t\ta.Tags = make(map[string]string, len(b.Tags))
\t\tli.SetChanged()
\t\tfor k0 := range b.Tags {
\t\t\tif a.Tags[k0] == \"\" && b.Tags[k0] != \"\" {
\t\t\t\ta.Tags[k0] = b.Tags[k0]
\t\t\t\tli.SetChanged()
\t\t\t}
\t\t}
\t}
\tif len(a.Zones) == 0 && len(b.Zones) != 0 {
\t\ta.Zones = make([]string, len(b.Zones))
\t\tli.SetChanged()
\t\tfor i0 := range b.Zones {
\t\t\tif a.Zones[i0] == \"\" && b.Zones[i0] != \"\" {
\t\t\t\ta.Zones[i0] = b.Zones[i0]
\t\t\t\tli.SetChanged()
\t\t\t}
\t\t}
\t}
\tif b.Lifecycle != nil {
\t\tif a.Lifecycle == nil {
\t\t\ta.Lifecycle = new(Lifecycle)
\t\t\tli.SetChanged()
\t\t}
\t\tif a.Lifecycle.Age == 0 && b.Lifecycle.Age != 0 {
\t\t\ta.Lifecycle.Age = b.Lifecycle.Age
\t\t\tli.SetChanged()
\t\t}
\t}
\treturn li.IsChanged()
}
"
        );
        assert_eq!(
            printed.preamble(),
            "import (\n\tsdkstorage \"example.com/sdk/storage\"\n\tpkgresource \"github.com/crossplane/crossplane-runtime/pkg/resource\"\n)\n"
        );
    }

    #[test]
    fn test_late_initializer_skips_unmatched_target_fields() {
        let registry = registry();
        let source = registry.resolve(LOCAL, "Source").expect("source");
        let target = registry.resolve(REMOTE, "Target").expect("target");

        let printed = generate(
            &LateInitializer::new("example.com/runtime/resource"),
            &registry,
            &ImportScope::new(LOCAL),
            UnmatchedFieldPolicy::Skip,
            &source,
            &target,
        )
        .expect("Failed to generate");

        assert!(printed.text.contains("a.Name = b.Name"));
        assert!(printed.text.contains("a.Size = li.LateInitializeInt64Ptr(a.Size, b.Size)"));
        assert!(!printed.text.contains("Region"));
        assert!(printed.text.contains("li := runtimeresource.NewLateInitializer()"));
    }

    #[test]
    fn test_late_initializer_guards_every_write() {
        let registry = registry();
        let spec = registry.resolve(LOCAL, "BucketParameters").expect("spec");
        let remote = registry.resolve(REMOTE, "Bucket").expect("remote");

        let printed = generate(
            &LateInitializer::default(),
            &registry,
            &ImportScope::new(LOCAL),
            UnmatchedFieldPolicy::Skip,
            &spec,
            &remote,
        )
        .expect("Failed to generate");

        // Every plain assignment to `a` sits behind a zero-value or nil guard.
        let lines: Vec<&str> = printed.text.lines().map(str::trim).collect();
        for (idx, line) in lines.iter().enumerate() {
            if line.starts_with("a.") && line.contains(" = ") && !line.contains("li.LateInitialize") {
                let guard = lines[..idx]
                    .iter()
                    .rev()
                    .find(|l| l.starts_with("if "))
                    .expect("assignment without guard");
                assert!(
                    guard.contains("== \"\"")
                        || guard.contains("== 0")
                        || guard.contains("== nil")
                        || guard.contains("len(a."),
                    "unguarded assignment: {line}"
                );
            }
        }
    }
}
