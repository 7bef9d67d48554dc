//! Producer: builds a target value from a source value.
//!
//! Every correlated field is assigned unconditionally; pointers, slices and
//! maps of the target are allocated whenever the source has them.

use super::{Strategy, capitalize};
use crate::error::TemplateError;
use crate::template::Template;
use crate::traverser::{ScalarTemplates, TemplateSet};
use typewright_core::NamedType;

const FUNCTION: &str = "\
// {{fn_name}} produces a {{b_type}} from the given {{a_type}}.
func {{fn_name}}(a *{{a_type}}) *{{b_type}} {
b := &{{b_type}}{}
{{body}}
return b
}";

const BASIC: &str = "{{b_path}} = {{a_as_b}}";

const SCALAR_POINTER: &str = "\
if {{a_path}} != nil {
{{b_path}} = new({{b_elem_type}})
*{{b_path}} = {{a_as_b}}
}";

const POINTER: &str = "\
if {{a_path}} != nil {
{{b_path}} = new({{b_elem_type}})
{{body}}
}";

const SLICE: &str = "\
if {{a_path}} != nil {
{{b_path}} = make({{b_type}}, len({{a_path}}))
for {{index}} := range {{a_path}} {
{{body}}
}
}";

const MAP: &str = "\
if {{a_path}} != nil {
{{b_path}} = make({{b_type}}, len({{a_path}}))
for {{key}} := range {{a_path}} {
{{body}}
}
}";

/// Returns the producer templates.
///
/// These are also the fallback templates of [`crate::TraverserBuilder`].
///
/// # Errors
/// Returns an error if a template cannot be parsed.
pub fn template_set() -> Result<TemplateSet, TemplateError> {
    Ok(TemplateSet {
        basic: Template::parse("producer.basic", BASIC)?,
        scalar_pointer: ScalarTemplates::uniform(Template::parse(
            "producer.scalar_pointer",
            SCALAR_POINTER,
        )?),
        pointer: Template::parse("producer.pointer", POINTER)?,
        slice: Template::parse("producer.slice", SLICE)?,
        map: Template::parse("producer.map", MAP)?,
    })
}

/// Generates `generate<Target>` functions.
#[derive(Debug, Clone, Copy, Default)]
pub struct Producer;

impl Strategy for Producer {
    fn label(&self) -> &'static str {
        "producer"
    }

    fn function_name(&self, _source: &NamedType, target: &NamedType) -> String {
        format!("generate{}", capitalize(&target.name.name))
    }

    fn templates(&self) -> Result<TemplateSet, TemplateError> {
        template_set()
    }

    fn function_template(&self) -> Result<Template, TemplateError> {
        Template::parse("producer.function", FUNCTION)
    }
}
