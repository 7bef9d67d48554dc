//! Field-union merging of struct types.

use crate::error::CodegenError;
use crate::filters::FieldFilter;
use std::sync::Arc;
use typewright_core::{
    Field, NamedType, QualifiedName, StructDesc, TypeDesc, TypeResolver, resolve_struct,
};

/// Marker emitted for fields that may be left unset.
pub const OPTIONAL_MARKER: &str = "+optional";

/// Annotation lines collected for one merged field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMarkers {
    /// Field name.
    pub field: String,
    /// Marker lines, without comment syntax.
    pub markers: Vec<String>,
}

/// Markers of every merged field, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkerSet {
    entries: Vec<FieldMarkers>,
}

impl MarkerSet {
    /// Returns the markers of `field`, empty if it is unknown.
    #[must_use]
    pub fn get(&self, field: &str) -> &[String] {
        self.entries
            .iter()
            .find(|entry| entry.field == field)
            .map(|entry| entry.markers.as_slice())
            .unwrap_or_default()
    }

    /// Iterates over entries in field order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldMarkers> {
        self.entries.iter()
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Result of a merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedType {
    /// Name of the synthetic struct.
    pub name: String,
    /// Field union.
    pub fields: StructDesc,
    /// One marker entry per field.
    pub markers: MarkerSet,
}

impl MergedType {
    /// Turns the merge result into a named type declared in `package`.
    #[must_use]
    pub fn into_named(self, package: &str) -> NamedType {
        NamedType::new(
            QualifiedName::new(package, self.name),
            TypeDesc::Struct(self.fields),
        )
    }
}

/// Builds one struct out of several source structs.
pub struct Merger<'r> {
    resolver: &'r dyn TypeResolver,
    filters: Vec<Box<dyn FieldFilter + 'r>>,
}

impl<'r> Merger<'r> {
    /// Creates a merger without filters.
    #[must_use]
    pub fn new(resolver: &'r dyn TypeResolver) -> Self {
        Self {
            resolver,
            filters: Vec::new(),
        }
    }

    /// Appends a filter; filters run in registration order.
    #[must_use]
    pub fn with_filter(mut self, filter: impl FieldFilter + 'r) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Returns the number of registered filters.
    #[must_use]
    pub fn filter_count(&self) -> usize {
        self.filters.len()
    }

    /// Merges `sources` into a struct called `target_name`.
    ///
    /// Fields are taken in source order; when two sources declare the same
    /// field name the first one wins and no compatibility check is made.
    ///
    /// # Errors
    /// Returns [`CodegenError::Resolve`] if a source is not a struct.
    pub fn merge(
        &self,
        target_name: &str,
        sources: &[Arc<NamedType>],
    ) -> Result<MergedType, CodegenError> {
        let mut union = StructDesc::new();
        for source in sources {
            let resolved = resolve_struct(self.resolver, source)
                .map_err(|err| CodegenError::resolve(source.name.to_string(), err))?;
            let Some(desc) = resolved.as_struct() else {
                continue;
            };
            for field in &desc.fields {
                if !union.push_field(field.clone()) {
                    tracing::trace!(
                        "Dropping field {} of {} already present in {}",
                        field.name,
                        source.name,
                        target_name
                    );
                }
            }
        }

        let mut fields = StructDesc::new();
        let mut markers = MarkerSet::default();
        for field in union.fields {
            let field = self.apply_filters(field);
            let entry = FieldMarkers {
                field: field.name.clone(),
                markers: markers_for(&field),
            };
            if !fields.push_field(field) {
                tracing::trace!(
                    "Dropping filtered field {} already present in {}",
                    entry.field,
                    target_name
                );
                continue;
            }
            markers.entries.push(entry);
        }

        Ok(MergedType {
            name: target_name.to_string(),
            fields,
            markers,
        })
    }

    fn apply_filters(&self, field: Field) -> Field {
        self.filters.iter().fold(field, |field, filter| {
            let tag = field.tag.clone();
            let (mut field, tag) = filter.filter(field, tag);
            field.tag = tag;
            field
        })
    }
}

fn markers_for(field: &Field) -> Vec<String> {
    let mut markers = field.markers.clone();
    let optional = field.ty.is_nilable() || field.tag.contains("omitempty");
    if optional && !markers.iter().any(|m| m == OPTIONAL_MARKER) {
        markers.push(OPTIONAL_MARKER.to_string());
    }
    markers
}
