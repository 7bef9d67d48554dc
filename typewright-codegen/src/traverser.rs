//! Dual-tree structural traversal.
//!
//! The [`Traverser`] walks two struct types in lock-step. Fields of the
//! source side are correlated with fields of the target side by exact name,
//! and every correlated pair is rendered with the template matching the
//! target's shape:
//!
//! | target shape        | template                                   |
//! |---------------------|--------------------------------------------|
//! | basic               | [`TemplateSet::basic`]                     |
//! | pointer to basic    | [`ScalarTemplates`] keyed by scalar class  |
//! | pointer to anything | [`TemplateSet::pointer`], body recursed    |
//! | slice               | [`TemplateSet::slice`], body recursed      |
//! | map                 | [`TemplateSet::map`], body recursed        |
//! | struct              | no template, fields recursed               |
//!
//! Templates see the keys `a_path`, `b_path`, `a_type`, `b_type`,
//! `a_elem_type`, `b_elem_type`, `a_value`, `b_value`, `a_as_b`, `b_as_a`,
//! plus `a_zero`/`b_zero` for scalars, `index`/`key` for loops and `body`
//! for containers. Extra bindings given to [`Traverser::traverse`] are
//! visible to every template.

use crate::error::CodegenError;
use crate::go::types::render_type;
use crate::imports::{ImportScope, ImportSet};
use crate::template::{Bindings, Template};
use std::sync::Arc;
use typewright_core::{
    NamedType, ScalarClass, StructDesc, TypeDesc, TypeResolver, Underlying, resolve_struct,
    resolve_underlying,
};

/// Name of the source-side root parameter in generated functions.
pub const ROOT_A: &str = "a";
/// Name of the target-side root parameter in generated functions.
pub const ROOT_B: &str = "b";

/// What to do with a field that cannot be correlated.
///
/// Applies to source fields without a same-named target field and to
/// correlated fields whose shapes differ.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnmatchedFieldPolicy {
    /// Emit nothing for the field and log it at debug level.
    #[default]
    Skip,
    /// Fail the traversal.
    Error,
}

/// Rendered statements plus the imports they reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    /// Statement text.
    pub text: String,
    /// Packages referenced by the text.
    pub imports: ImportSet,
}

impl Fragment {
    /// Creates a fragment.
    #[must_use]
    pub fn new(text: impl Into<String>, imports: ImportSet) -> Self {
        Self {
            text: text.into(),
            imports,
        }
    }

    /// Returns true if the fragment contains no statements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Appends `other` on a new line and merges its imports.
    ///
    /// # Errors
    /// Returns [`CodegenError::ImportAliasConflict`] on alias collisions.
    pub fn append(&mut self, other: Fragment) -> Result<(), CodegenError> {
        self.imports.merge(&other.imports)?;
        let text = other.text.trim_matches('\n');
        if text.is_empty() {
            return Ok(());
        }
        if !self.text.is_empty() {
            self.text.push('\n');
        }
        self.text.push_str(text);
        Ok(())
    }
}

/// Templates for pointers to basic types, one per [`ScalarClass`].
#[derive(Debug, Clone)]
pub struct ScalarTemplates {
    /// `*bool`.
    pub bool: Template,
    /// `*string`.
    pub string: Template,
    /// `*int64`.
    pub int64: Template,
    /// Every other scalar.
    pub other: Template,
}

impl ScalarTemplates {
    /// Uses the same template for every class.
    #[must_use]
    pub fn uniform(template: Template) -> Self {
        Self {
            bool: template.clone(),
            string: template.clone(),
            int64: template.clone(),
            other: template,
        }
    }

    /// Returns the template for `class`.
    #[must_use]
    pub fn select(&self, class: ScalarClass) -> &Template {
        match class {
            ScalarClass::Bool => &self.bool,
            ScalarClass::String => &self.string,
            ScalarClass::Int64 => &self.int64,
            ScalarClass::Other => &self.other,
        }
    }
}

/// Per-shape templates used by a traverser.
#[derive(Debug, Clone)]
pub struct TemplateSet {
    /// Basic values.
    pub basic: Template,
    /// Pointers to basic values.
    pub scalar_pointer: ScalarTemplates,
    /// Pointers to composites; has a `body` placeholder.
    pub pointer: Template,
    /// Slices; has `index` and `body` placeholders.
    pub slice: Template,
    /// Maps; has `key` and `body` placeholders.
    pub map: Template,
}

/// Walks two struct types in parallel and renders correlated fields.
pub struct Traverser<'r> {
    resolver: &'r dyn TypeResolver,
    templates: TemplateSet,
    scope: ImportScope,
    policy: UnmatchedFieldPolicy,
}

/// Builder for [`Traverser`].
///
/// Templates that are not set fall back to the producer templates.
pub struct TraverserBuilder<'r> {
    resolver: &'r dyn TypeResolver,
    basic: Option<Template>,
    scalar_pointer: Option<ScalarTemplates>,
    pointer: Option<Template>,
    slice: Option<Template>,
    map: Option<Template>,
    scope: ImportScope,
    policy: UnmatchedFieldPolicy,
}

impl<'r> TraverserBuilder<'r> {
    /// Creates a builder resolving types through `resolver`.
    #[must_use]
    pub fn new(resolver: &'r dyn TypeResolver) -> Self {
        Self {
            resolver,
            basic: None,
            scalar_pointer: None,
            pointer: None,
            slice: None,
            map: None,
            scope: ImportScope::default(),
            policy: UnmatchedFieldPolicy::default(),
        }
    }

    /// Sets every template at once.
    #[must_use]
    pub fn templates(mut self, templates: TemplateSet) -> Self {
        self.basic = Some(templates.basic);
        self.scalar_pointer = Some(templates.scalar_pointer);
        self.pointer = Some(templates.pointer);
        self.slice = Some(templates.slice);
        self.map = Some(templates.map);
        self
    }

    /// Sets the basic template.
    #[must_use]
    pub fn basic(mut self, template: Template) -> Self {
        self.basic = Some(template);
        self
    }

    /// Sets the pointer-to-basic templates.
    #[must_use]
    pub fn scalar_pointer(mut self, templates: ScalarTemplates) -> Self {
        self.scalar_pointer = Some(templates);
        self
    }

    /// Sets the pointer template.
    #[must_use]
    pub fn pointer(mut self, template: Template) -> Self {
        self.pointer = Some(template);
        self
    }

    /// Sets the slice template.
    #[must_use]
    pub fn slice(mut self, template: Template) -> Self {
        self.slice = Some(template);
        self
    }

    /// Sets the map template.
    #[must_use]
    pub fn map(mut self, template: Template) -> Self {
        self.map = Some(template);
        self
    }

    /// Sets the package generated code lives in.
    #[must_use]
    pub fn scope(mut self, scope: ImportScope) -> Self {
        self.scope = scope;
        self
    }

    /// Sets the policy for fields without a counterpart.
    #[must_use]
    pub fn policy(mut self, policy: UnmatchedFieldPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Builds the traverser.
    ///
    /// # Errors
    /// Returns [`CodegenError::InvalidTemplate`] if a fallback template
    /// cannot be parsed.
    pub fn build(self) -> Result<Traverser<'r>, CodegenError> {
        let defaults = crate::strategies::producer::template_set()?;
        Ok(Traverser {
            resolver: self.resolver,
            templates: TemplateSet {
                basic: self.basic.unwrap_or(defaults.basic),
                scalar_pointer: self.scalar_pointer.unwrap_or(defaults.scalar_pointer),
                pointer: self.pointer.unwrap_or(defaults.pointer),
                slice: self.slice.unwrap_or(defaults.slice),
                map: self.map.unwrap_or(defaults.map),
            },
            scope: self.scope,
            policy: self.policy,
        })
    }
}

struct Walk<'w> {
    function: &'w str,
    extra: &'w Bindings,
}

struct SlotSide<'t> {
    path: &'t str,
    ty: &'t TypeDesc,
    elem: &'t TypeDesc,
    value: String,
}

#[derive(Default)]
struct Slot {
    bindings: Bindings,
    imports: ImportSet,
}

impl<'r> Traverser<'r> {
    /// Returns a builder.
    #[must_use]
    pub fn builder(resolver: &'r dyn TypeResolver) -> TraverserBuilder<'r> {
        TraverserBuilder::new(resolver)
    }

    /// Returns the correlation policy.
    #[must_use]
    pub fn policy(&self) -> UnmatchedFieldPolicy {
        self.policy
    }

    /// Returns the scope types are rendered in.
    #[must_use]
    pub fn scope(&self) -> &ImportScope {
        &self.scope
    }

    /// Renders the body of `function` correlating `a` with `b`.
    ///
    /// Fragments appear in the field order of `a`.
    ///
    /// # Errors
    /// Returns [`CodegenError::Resolve`] if either root is not a struct or a
    /// nested type cannot be resolved, [`CodegenError::Template`] if a
    /// template fails to render, and correlation errors under
    /// [`UnmatchedFieldPolicy::Error`].
    pub fn traverse(
        &self,
        function: &str,
        a: &Arc<NamedType>,
        b: &Arc<NamedType>,
        extra: &Bindings,
    ) -> Result<Fragment, CodegenError> {
        let a_root = resolve_struct(self.resolver, a)
            .map_err(|err| CodegenError::resolve(a.name.to_string(), err))?;
        let b_root = resolve_struct(self.resolver, b)
            .map_err(|err| CodegenError::resolve(b.name.to_string(), err))?;
        let (Some(a_fields), Some(b_fields)) = (a_root.as_struct(), b_root.as_struct()) else {
            return Err(CodegenError::generation(format!(
                "{} and {} must both be structs",
                a.name, b.name
            )));
        };

        let walk = Walk { function, extra };
        self.visit_fields(&walk, a_fields, b_fields, ROOT_A, ROOT_B, 0)
    }

    fn visit_fields(
        &self,
        walk: &Walk<'_>,
        a: &StructDesc,
        b: &StructDesc,
        a_path: &str,
        b_path: &str,
        depth: usize,
    ) -> Result<Fragment, CodegenError> {
        let mut out = Fragment::default();
        for a_field in &a.fields {
            let a_field_path = format!("{a_path}.{}", a_field.name);
            let Some(b_field) = b.field(&a_field.name) else {
                out.append(self.gap(CodegenError::UnmatchedField {
                    function: walk.function.to_string(),
                    path: a_field_path,
                })?)?;
                continue;
            };
            let b_field_path = format!("{b_path}.{}", b_field.name);
            let fragment = self.visit(
                walk,
                &a_field.ty,
                &b_field.ty,
                &a_field_path,
                &b_field_path,
                depth,
            )?;
            out.append(fragment)?;
        }
        Ok(out)
    }

    fn visit(
        &self,
        walk: &Walk<'_>,
        a: &TypeDesc,
        b: &TypeDesc,
        a_path: &str,
        b_path: &str,
        depth: usize,
    ) -> Result<Fragment, CodegenError> {
        let a_shape = self.underlying(a, a_path)?;
        let b_shape = self.underlying(b, b_path)?;

        match &*b_shape {
            TypeDesc::Basic(b_kind) => {
                let TypeDesc::Basic(a_kind) = &*a_shape else {
                    return self.mismatch(walk, a_path, &b_shape, &a_shape);
                };
                let mut slot = self.slot(
                    SlotSide {
                        path: a_path,
                        ty: a,
                        elem: a,
                        value: a_path.to_string(),
                    },
                    SlotSide {
                        path: b_path,
                        ty: b,
                        elem: b,
                        value: b_path.to_string(),
                    },
                )?;
                slot.bindings.set("a_zero", a_kind.zero_literal());
                slot.bindings.set("b_zero", b_kind.zero_literal());
                self.render(walk, &self.templates.basic, slot, a_path)
            }
            TypeDesc::Pointer(b_elem) => {
                let TypeDesc::Pointer(a_elem) = &*a_shape else {
                    return self.mismatch(walk, a_path, &b_shape, &a_shape);
                };
                self.visit_pointer(walk, (a, a_elem), (b, b_elem), a_path, b_path, depth)
            }
            TypeDesc::Slice(b_elem) => {
                let TypeDesc::Slice(a_elem) = &*a_shape else {
                    return self.mismatch(walk, a_path, &b_shape, &a_shape);
                };
                let index = format!("i{depth}");
                let body = self.visit(
                    walk,
                    a_elem,
                    b_elem,
                    &format!("{a_path}[{index}]"),
                    &format!("{b_path}[{index}]"),
                    depth + 1,
                )?;
                let mut slot = self.container_slot((a, a_elem), (b, b_elem), a_path, b_path)?;
                slot.bindings.set("index", index);
                self.render_container(walk, &self.templates.slice, slot, body, a_path)
            }
            TypeDesc::Map { elem: b_elem, .. } => {
                let TypeDesc::Map { elem: a_elem, .. } = &*a_shape else {
                    return self.mismatch(walk, a_path, &b_shape, &a_shape);
                };
                let key = format!("k{depth}");
                let body = self.visit(
                    walk,
                    a_elem,
                    b_elem,
                    &format!("{a_path}[{key}]"),
                    &format!("{b_path}[{key}]"),
                    depth + 1,
                )?;
                let mut slot = self.container_slot((a, a_elem), (b, b_elem), a_path, b_path)?;
                slot.bindings.set("key", key);
                self.render_container(walk, &self.templates.map, slot, body, a_path)
            }
            TypeDesc::Struct(b_fields) => {
                let TypeDesc::Struct(a_fields) = &*a_shape else {
                    return self.mismatch(walk, a_path, &b_shape, &a_shape);
                };
                self.visit_fields(walk, a_fields, b_fields, a_path, b_path, depth)
            }
            TypeDesc::Named(name) => Err(CodegenError::generation(format!(
                "type {name} at '{b_path}' was not looked through"
            ))),
        }
    }

    fn visit_pointer(
        &self,
        walk: &Walk<'_>,
        (a, a_elem): (&TypeDesc, &TypeDesc),
        (b, b_elem): (&TypeDesc, &TypeDesc),
        a_path: &str,
        b_path: &str,
        depth: usize,
    ) -> Result<Fragment, CodegenError> {
        let a_inner = self.underlying(a_elem, a_path)?;
        let b_inner = self.underlying(b_elem, b_path)?;
        if a_inner.kind_name() != b_inner.kind_name() {
            return self.mismatch(walk, a_path, &b_inner, &a_inner);
        }

        let mut slot = self.slot(
            SlotSide {
                path: a_path,
                ty: a,
                elem: a_elem,
                value: format!("*{a_path}"),
            },
            SlotSide {
                path: b_path,
                ty: b,
                elem: b_elem,
                value: format!("*{b_path}"),
            },
        )?;

        match (&*a_inner, &*b_inner) {
            (TypeDesc::Basic(a_kind), TypeDesc::Basic(b_kind)) => {
                slot.bindings.set("a_zero", a_kind.zero_literal());
                slot.bindings.set("b_zero", b_kind.zero_literal());
                let template = self.templates.scalar_pointer.select(b_kind.scalar_class());
                self.render(walk, template, slot, a_path)
            }
            (TypeDesc::Struct(_), TypeDesc::Struct(_)) => {
                let body = self.visit(walk, a_elem, b_elem, a_path, b_path, depth)?;
                self.render_container(walk, &self.templates.pointer, slot, body, a_path)
            }
            _ => {
                let body = self.visit(
                    walk,
                    a_elem,
                    b_elem,
                    &format!("(*{a_path})"),
                    &format!("(*{b_path})"),
                    depth,
                )?;
                self.render_container(walk, &self.templates.pointer, slot, body, a_path)
            }
        }
    }

    fn underlying<'t>(
        &self,
        ty: &'t TypeDesc,
        path: &str,
    ) -> Result<Underlying<'t>, CodegenError> {
        resolve_underlying(self.resolver, ty).map_err(|err| CodegenError::resolve(path, err))
    }

    fn container_slot(
        &self,
        (a, a_elem): (&TypeDesc, &TypeDesc),
        (b, b_elem): (&TypeDesc, &TypeDesc),
        a_path: &str,
        b_path: &str,
    ) -> Result<Slot, CodegenError> {
        self.slot(
            SlotSide {
                path: a_path,
                ty: a,
                elem: a_elem,
                value: a_path.to_string(),
            },
            SlotSide {
                path: b_path,
                ty: b,
                elem: b_elem,
                value: b_path.to_string(),
            },
        )
    }

    fn slot(&self, a: SlotSide<'_>, b: SlotSide<'_>) -> Result<Slot, CodegenError> {
        let mut slot = Slot::default();
        let a_elem = self.bind_side(&mut slot, "a", &a)?;
        let b_elem = self.bind_side(&mut slot, "b", &b)?;
        slot.bindings.set("a_as_b", convert(&a.value, &a_elem, &b_elem));
        slot.bindings.set("b_as_a", convert(&b.value, &b_elem, &a_elem));
        Ok(slot)
    }

    fn bind_side(
        &self,
        slot: &mut Slot,
        prefix: &str,
        side: &SlotSide<'_>,
    ) -> Result<String, CodegenError> {
        let ty = render_type(side.ty, &self.scope)?;
        let elem = render_type(side.elem, &self.scope)?;
        slot.imports.merge(&ty.imports)?;
        slot.imports.merge(&elem.imports)?;
        slot.bindings
            .set(format!("{prefix}_path"), side.path)
            .set(format!("{prefix}_type"), ty.text)
            .set(format!("{prefix}_elem_type"), elem.text.clone())
            .set(format!("{prefix}_value"), side.value.clone());
        Ok(elem.text)
    }

    fn render_container(
        &self,
        walk: &Walk<'_>,
        template: &Template,
        mut slot: Slot,
        body: Fragment,
        path: &str,
    ) -> Result<Fragment, CodegenError> {
        slot.imports.merge(&body.imports)?;
        slot.bindings.set("body", body.text);
        self.render(walk, template, slot, path)
    }

    fn render(
        &self,
        walk: &Walk<'_>,
        template: &Template,
        slot: Slot,
        path: &str,
    ) -> Result<Fragment, CodegenError> {
        let mut bindings = walk.extra.clone();
        bindings.extend(&slot.bindings);
        let text = template
            .render(&bindings)
            .map_err(|source| CodegenError::Template {
                function: walk.function.to_string(),
                path: path.to_string(),
                source,
            })?;
        Ok(Fragment::new(text, slot.imports))
    }

    fn mismatch(
        &self,
        walk: &Walk<'_>,
        path: &str,
        expected: &TypeDesc,
        found: &TypeDesc,
    ) -> Result<Fragment, CodegenError> {
        self.gap(CodegenError::ShapeMismatch {
            function: walk.function.to_string(),
            path: path.to_string(),
            expected: expected.kind_name(),
            found: found.kind_name(),
        })
    }

    fn gap(&self, error: CodegenError) -> Result<Fragment, CodegenError> {
        match self.policy {
            UnmatchedFieldPolicy::Skip => {
                tracing::debug!("Skipping uncorrelated field: {}", error);
                Ok(Fragment::default())
            }
            UnmatchedFieldPolicy::Error => Err(error),
        }
    }
}

/// Wraps `value` in a conversion to `to` when the rendered types differ.
fn convert(value: &str, from: &str, to: &str) -> String {
    if from == to {
        value.to_string()
    } else {
        format!("{to}({value})")
    }
}
