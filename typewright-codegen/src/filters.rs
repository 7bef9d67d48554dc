//! Field filters applied by the merger.

use typewright_core::Field;

/// Post-processing hook applied to every field of a merged struct.
///
/// Filters see one field at a time and must not fail.
pub trait FieldFilter {
    /// Returns the possibly modified field and tag.
    fn filter(&self, field: Field, tag: String) -> (Field, String);
}

impl<F> FieldFilter for F
where
    F: Fn(Field, String) -> (Field, String),
{
    fn filter(&self, field: Field, tag: String) -> (Field, String) {
        self(field, tag)
    }
}

/// Adds `omitempty` to the `json` key of a field tag.
///
/// Tags without a `json` key, skipped fields (`json:"-"`) and tags already
/// carrying the option are left alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct OmitemptyAdder;

impl FieldFilter for OmitemptyAdder {
    fn filter(&self, field: Field, tag: String) -> (Field, String) {
        let tag = add_omitempty(&tag).unwrap_or(tag);
        (field, tag)
    }
}

fn add_omitempty(tag: &str) -> Option<String> {
    const KEY: &str = "json:\"";

    let start = tag.find(KEY)? + KEY.len();
    let end = start + tag[start..].find('"')?;
    let value = &tag[start..end];
    if value == "-" || value.split(',').skip(1).any(|opt| opt == "omitempty") {
        return None;
    }
    Some(format!("{},omitempty{}", &tag[..end], &tag[end..]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use typewright_core::{BasicKind, TypeDesc};

    fn apply(tag: &str) -> String {
        let field = Field::new("Name", TypeDesc::Basic(BasicKind::String));
        OmitemptyAdder.filter(field, tag.to_string()).1
    }

    #[test]
    fn test_omitempty_added() {
        assert_eq!(apply(r#"json:"name""#), r#"json:"name,omitempty""#);
        assert_eq!(
            apply(r#"json:"name,string" yaml:"name""#),
            r#"json:"name,string,omitempty" yaml:"name""#
        );
    }

    #[test]
    fn test_omitempty_untouched() {
        assert_eq!(apply(""), "");
        assert_eq!(apply(r#"yaml:"name""#), r#"yaml:"name""#);
        assert_eq!(apply(r#"json:"-""#), r#"json:"-""#);
        assert_eq!(apply(r#"json:"name,omitempty""#), r#"json:"name,omitempty""#);
        assert_eq!(apply(r#"json:"name"#), r#"json:"name"#);
    }

    #[test]
    fn test_closure_filter() {
        let rename = |mut field: Field, tag: String| {
            field.name = field.name.to_uppercase();
            (field, tag)
        };
        let field = Field::new("id", TypeDesc::Basic(BasicKind::Int64));
        let (field, tag) = rename.filter(field, String::new());
        assert_eq!(field.name, "ID");
        assert!(tag.is_empty());
    }
}
