//! Placeholder templates.
//!
//! Templates are plain text with `{{key}}` placeholders. They are parsed once
//! into segments and rendered against a set of [`Bindings`]; a placeholder
//! without a binding is an error rather than an empty substitution.

use crate::error::TemplateError;
use std::collections::BTreeMap;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Key(String),
}

/// A parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    name: String,
    segments: Vec<Segment>,
}

impl Template {
    /// Parses `text` into a template called `name`.
    ///
    /// # Errors
    /// Returns [`TemplateError::Unterminated`] or [`TemplateError::EmptyKey`]
    /// for malformed placeholders.
    pub fn parse(name: impl Into<String>, text: &str) -> Result<Self, TemplateError> {
        let name = name.into();
        let mut segments = Vec::new();
        let mut rest = text;
        let mut offset = 0;

        while let Some(start) = rest.find(OPEN) {
            if start > 0 {
                segments.push(Segment::Text(rest[..start].to_string()));
            }
            let after = &rest[start + OPEN.len()..];
            let Some(end) = after.find(CLOSE) else {
                return Err(TemplateError::Unterminated {
                    template: name,
                    offset: offset + start,
                });
            };
            let key = after[..end].trim();
            if key.is_empty() {
                return Err(TemplateError::EmptyKey {
                    template: name,
                    offset: offset + start,
                });
            }
            segments.push(Segment::Key(key.to_string()));

            let consumed = start + OPEN.len() + end + CLOSE.len();
            offset += consumed;
            rest = &rest[consumed..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Text(rest.to_string()));
        }

        Ok(Self { name, segments })
    }

    /// Returns the template name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Iterates over the placeholder keys in order of appearance.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Key(key) => Some(key.as_str()),
            Segment::Text(_) => None,
        })
    }

    /// Renders the template.
    ///
    /// # Errors
    /// Returns [`TemplateError::MissingKey`] for the first unbound key.
    pub fn render(&self, bindings: &Bindings) -> Result<String, TemplateError> {
        let mut output = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => output.push_str(text),
                Segment::Key(key) => {
                    let value = bindings.get(key).ok_or_else(|| TemplateError::MissingKey {
                        template: self.name.clone(),
                        key: key.clone(),
                    })?;
                    output.push_str(value);
                }
            }
        }
        Ok(output)
    }
}

/// Values substituted into templates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings {
    values: BTreeMap<String, String>,
}

impl Bindings {
    /// Creates empty bindings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `key` to `value`, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Builder form of [`Self::set`].
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Returns the value bound to `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Copies every binding of `other` into `self`; `other` wins on conflict.
    pub fn extend(&mut self, other: &Bindings) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }

    /// Returns the number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
