//! Error types for type resolution.

use thiserror::Error;

/// Error returned when a type cannot be resolved into a usable description.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The requested package is not known to the resolver.
    #[error("package '{package}' not found")]
    PackageNotFound {
        /// Package path.
        package: String,
    },

    /// The package exists but does not declare the requested type.
    #[error("type '{name}' not found in package '{package}'")]
    TypeNotFound {
        /// Package path.
        package: String,
        /// Type name.
        name: String,
    },

    /// The type is declared but its definition cannot be understood.
    #[error("malformed type '{type_name}': {reason}")]
    Malformed {
        /// Qualified type name.
        type_name: String,
        /// What is wrong with the definition.
        reason: String,
    },

    /// A combined `package.Name` path could not be split.
    #[error("invalid qualified type path '{path}'")]
    InvalidPath {
        /// The offending path.
        path: String,
    },

    /// A struct was required but the type has another shape.
    #[error("type '{type_name}' is a {found}, expected a struct")]
    NotAStruct {
        /// Qualified type name.
        type_name: String,
        /// Shape that was found instead.
        found: &'static str,
    },

    /// Named types refer to each other without ever reaching a definition.
    #[error("circular type reference detected: {path}")]
    CircularReference {
        /// Chain of names involved.
        path: String,
    },
}

impl ResolveError {
    /// Creates a type-not-found error.
    pub fn type_not_found(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self::TypeNotFound {
            package: package.into(),
            name: name.into(),
        }
    }

    /// Creates a malformed-type error.
    pub fn malformed(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }

    /// Returns true for the not-found family of errors.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::PackageNotFound { .. } | Self::TypeNotFound { .. })
    }
}

/// Result type alias for resolution operations.
pub type Result<T> = std::result::Result<T, ResolveError>;
