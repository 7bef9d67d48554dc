//! Go type expressions.

use crate::error::CodegenError;
use crate::imports::{ImportScope, ImportSet};
use typewright_core::{QualifiedName, StructDesc, TypeDesc};

/// Rendered source text together with the imports it needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rendered {
    /// Source text.
    pub text: String,
    /// Packages referenced by the text.
    pub imports: ImportSet,
}

/// Renders a type expression as seen from `scope`.
///
/// Named types from other packages are qualified with their import alias and
/// registered in the returned import set.
///
/// # Errors
/// Returns [`CodegenError::ImportAliasConflict`] on alias collisions.
pub fn render_type(ty: &TypeDesc, scope: &ImportScope) -> Result<Rendered, CodegenError> {
    let mut imports = ImportSet::new();
    let text = write_type(ty, scope, &mut imports)?;
    Ok(Rendered { text, imports })
}

/// Renders a reference to a named type as seen from `scope`.
///
/// # Errors
/// Returns [`CodegenError::ImportAliasConflict`] on alias collisions.
pub fn render_name(name: &QualifiedName, scope: &ImportScope) -> Result<Rendered, CodegenError> {
    let mut imports = ImportSet::new();
    let qualifier = scope.qualifier(&name.package, &mut imports)?;
    Ok(Rendered {
        text: format!("{qualifier}{}", name.name),
        imports,
    })
}

fn write_type(
    ty: &TypeDesc,
    scope: &ImportScope,
    imports: &mut ImportSet,
) -> Result<String, CodegenError> {
    let text = match ty {
        TypeDesc::Basic(kind) => kind.name().to_string(),
        TypeDesc::Pointer(elem) => format!("*{}", write_type(elem, scope, imports)?),
        TypeDesc::Slice(elem) => format!("[]{}", write_type(elem, scope, imports)?),
        TypeDesc::Map { key, elem } => format!(
            "map[{}]{}",
            write_type(key, scope, imports)?,
            write_type(elem, scope, imports)?
        ),
        TypeDesc::Struct(desc) => write_struct_literal(desc, scope, imports)?,
        TypeDesc::Named(name) => {
            let qualifier = scope.qualifier(&name.package, imports)?;
            format!("{qualifier}{}", name.name)
        }
    };
    Ok(text)
}

fn write_struct_literal(
    desc: &StructDesc,
    scope: &ImportScope,
    imports: &mut ImportSet,
) -> Result<String, CodegenError> {
    if desc.is_empty() {
        return Ok("struct{}".to_string());
    }
    let mut output = String::from("struct {\n");
    for field in &desc.fields {
        output.push_str(&format!(
            "{} {}",
            field.name,
            write_type(&field.ty, scope, imports)?
        ));
        if !field.tag.is_empty() {
            output.push_str(&format!(" `{}`", field.tag));
        }
        output.push('\n');
    }
    output.push('}');
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use typewright_core::{BasicKind, Field};

    const LOCAL: &str = "example.com/apis/storage/v1alpha1";

    fn render(ty: &TypeDesc) -> Rendered {
        render_type(ty, &ImportScope::new(LOCAL)).expect("Failed to render")
    }

    #[test]
    fn test_render_composites() {
        let ty = TypeDesc::map(
            TypeDesc::Basic(BasicKind::String),
            TypeDesc::slice(TypeDesc::pointer(TypeDesc::Basic(BasicKind::Int64))),
        );
        let rendered = render(&ty);
        assert_eq!(rendered.text, "map[string][]*int64");
        assert!(rendered.imports.is_empty());
    }

    #[test]
    fn test_render_named() {
        let local = render(&TypeDesc::pointer(TypeDesc::named(LOCAL, "BucketParameters")));
        assert_eq!(local.text, "*BucketParameters");
        assert!(local.imports.is_empty());

        let remote = render(&TypeDesc::slice(TypeDesc::named(
            "example.com/sdk/storage",
            "LifecycleRule",
        )));
        assert_eq!(remote.text, "[]sdkstorage.LifecycleRule");
        assert_eq!(remote.imports.alias("example.com/sdk/storage"), Some("sdkstorage"));
    }

    #[test]
    fn test_render_struct_literal() {
        let desc = StructDesc::new()
            .with_field(
                Field::new("Name", TypeDesc::Basic(BasicKind::String)).with_tag(r#"json:"name""#),
            )
            .with_field(Field::new("Age", TypeDesc::Basic(BasicKind::Int)));
        let rendered = render(&TypeDesc::Struct(desc));
        assert_eq!(rendered.text, "struct {\nName string `json:\"name\"`\nAge int\n}");
        assert_eq!(render(&TypeDesc::Struct(StructDesc::new())).text, "struct{}");
    }

    #[test]
    fn test_render_name() {
        let scope = ImportScope::new(LOCAL);
        let rendered = render_name(
            &QualifiedName::new("example.com/sdk/storage", "Bucket"),
            &scope,
        )
        .expect("Failed to render");
        assert_eq!(rendered.text, "sdkstorage.Bucket");
        assert_eq!(rendered.imports.len(), 1);
    }
}
