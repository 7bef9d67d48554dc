//! Error types for code generation.

use thiserror::Error;
use typewright_core::ResolveError;

/// Error raised while parsing or rendering a template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// A placeholder names a key that was not bound.
    #[error("template '{template}' references missing key '{key}'")]
    MissingKey {
        /// Template name.
        template: String,
        /// Missing key.
        key: String,
    },

    /// A `{{` was never closed.
    #[error("template '{template}' has an unterminated placeholder at offset {offset}")]
    Unterminated {
        /// Template name.
        template: String,
        /// Byte offset of the opening braces.
        offset: usize,
    },

    /// A placeholder has no key between its braces.
    #[error("template '{template}' has an empty placeholder at offset {offset}")]
    EmptyKey {
        /// Template name.
        template: String,
        /// Byte offset of the opening braces.
        offset: usize,
    },
}

/// Error type for code generation operations.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// A type could not be resolved while generating.
    #[error("cannot resolve type at '{path}': {source}")]
    Resolve {
        /// Field path or type reference being resolved.
        path: String,
        /// Underlying resolution error.
        source: ResolveError,
    },

    /// A template failed to render.
    #[error("template error in function '{function}' at '{path}': {source}")]
    Template {
        /// Function being generated.
        function: String,
        /// Field path where rendering failed.
        path: String,
        /// Underlying template error.
        source: TemplateError,
    },

    /// A template could not be parsed.
    #[error("invalid template: {0}")]
    InvalidTemplate(#[from] TemplateError),

    /// A field has no counterpart on the other side.
    #[error("field '{path}' has no counterpart in function '{function}'")]
    UnmatchedField {
        /// Function being generated.
        function: String,
        /// Field path on the source side.
        path: String,
    },

    /// Two correlated fields have different shapes.
    #[error("field '{path}' in function '{function}' is a {found}, expected a {expected}")]
    ShapeMismatch {
        /// Function being generated.
        function: String,
        /// Field path on the source side.
        path: String,
        /// Shape of the target field.
        expected: &'static str,
        /// Shape of the source field.
        found: &'static str,
    },

    /// Two different packages map to the same import alias.
    #[error("import alias '{alias}' is used by both '{first}' and '{second}'")]
    ImportAliasConflict {
        /// Conflicting alias.
        alias: String,
        /// Package already using the alias.
        first: String,
        /// Package that would reuse it.
        second: String,
    },

    /// Package document parsing error.
    #[error("schema parse error: {0}")]
    Parse(#[from] typewright_schema::ParseError),

    /// Package validation error.
    #[error("schema error: {0}")]
    Schema(#[from] typewright_schema::SchemaError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The external formatter failed.
    #[error("format error: {message}")]
    Format {
        /// Error message.
        message: String,
    },

    /// Code generation error.
    #[error("generation error: {message}")]
    Generation {
        /// Error message.
        message: String,
    },
}

impl CodegenError {
    /// Creates a resolution error for the given path.
    pub fn resolve(path: impl Into<String>, source: ResolveError) -> Self {
        Self::Resolve {
            path: path.into(),
            source,
        }
    }

    /// Creates a generation error with the given message.
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation {
            message: message.into(),
        }
    }

    /// Creates a formatter error with the given message.
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
        }
    }

    /// Returns true for errors caused by a correlation gap between the two
    /// sides of a traversal.
    #[must_use]
    pub const fn is_correlation_gap(&self) -> bool {
        matches!(
            self,
            Self::UnmatchedField { .. } | Self::ShapeMismatch { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CodegenError::resolve(
            "a.Lifecycle",
            ResolveError::type_not_found("example.com/storage", "Lifecycle"),
        );
        assert_eq!(
            err.to_string(),
            "cannot resolve type at 'a.Lifecycle': type 'Lifecycle' not found in package 'example.com/storage'"
        );

        let err = CodegenError::Template {
            function: "isUpToDate".to_string(),
            path: "a.Name".to_string(),
            source: TemplateError::MissingKey {
                template: "basic".to_string(),
                key: "zero".to_string(),
            },
        };
        assert!(err.to_string().contains("isUpToDate"));
        assert!(err.to_string().contains("a.Name"));
    }

    #[test]
    fn test_correlation_gap() {
        let gap = CodegenError::UnmatchedField {
            function: "f".to_string(),
            path: "a.Region".to_string(),
        };
        assert!(gap.is_correlation_gap());
        assert!(!CodegenError::generation("boom").is_correlation_gap());
    }
}
