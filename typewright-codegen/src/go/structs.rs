//! Struct declarations for merged types.

use crate::error::CodegenError;
use crate::go::types::{Rendered, render_type};
use crate::imports::{ImportScope, ImportSet};
use crate::merge::MergedType;

/// Renders a merged type as a `type Name struct { ... }` declaration.
///
/// Each field is preceded by its markers as `// ` comment lines.
///
/// # Errors
/// Returns [`CodegenError::ImportAliasConflict`] on alias collisions.
pub fn render_struct_decl(
    merged: &MergedType,
    scope: &ImportScope,
) -> Result<Rendered, CodegenError> {
    let mut imports = ImportSet::new();
    let mut output = String::new();

    output.push_str(&format!("type {} struct {{\n", merged.name));
    for field in &merged.fields.fields {
        for marker in merged.markers.get(&field.name) {
            output.push_str(&format!("// {marker}\n"));
        }
        let ty = render_type(&field.ty, scope)?;
        imports.merge(&ty.imports)?;
        output.push_str(&format!("{} {}", field.name, ty.text));
        if !field.tag.is_empty() {
            output.push_str(&format!(" `{}`", field.tag));
        }
        output.push('\n');
    }
    output.push_str("}\n");

    Ok(Rendered {
        text: output,
        imports,
    })
}
