//! Generator configuration.

use crate::strategies::is_up_to_date::DEFAULT_CLIENTS_PACKAGE;
use crate::strategies::late_init::DEFAULT_RUNTIME_PACKAGE;
use crate::traverser::UnmatchedFieldPolicy;

/// Header emitted at the top of every generated file.
pub const DEFAULT_HEADER: &str = "// Code generated by typewright. DO NOT EDIT.";

/// Settings shared by every generated artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Package path generated code is written into.
    pub local_package: String,
    /// Header text placed above the package clause.
    pub header: String,
    /// Package providing the late-initializer helper.
    pub runtime_package: String,
    /// Package providing pointer value helpers for equivalence checks.
    pub clients_package: String,
    /// Policy for fields without a counterpart.
    pub unmatched_policy: UnmatchedFieldPolicy,
    /// Whether output is passed through the configured formatter.
    pub format_output: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            local_package: String::new(),
            header: DEFAULT_HEADER.to_string(),
            runtime_package: DEFAULT_RUNTIME_PACKAGE.to_string(),
            clients_package: DEFAULT_CLIENTS_PACKAGE.to_string(),
            unmatched_policy: UnmatchedFieldPolicy::Skip,
            format_output: true,
        }
    }
}

impl GeneratorConfig {
    /// Returns a builder starting from the defaults.
    #[must_use]
    pub fn builder() -> GeneratorConfigBuilder {
        GeneratorConfigBuilder::new()
    }

    /// Returns the package name used in the `package` clause: the last
    /// segment of the local package path.
    #[must_use]
    pub fn package_name(&self) -> &str {
        self.local_package
            .rsplit('/')
            .next()
            .unwrap_or(&self.local_package)
    }
}

/// Builder for [`GeneratorConfig`].
#[derive(Debug, Clone, Default)]
pub struct GeneratorConfigBuilder {
    config: GeneratorConfig,
}

impl GeneratorConfigBuilder {
    /// Creates a builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the local package path.
    #[must_use]
    pub fn local_package(mut self, path: impl Into<String>) -> Self {
        self.config.local_package = path.into();
        self
    }

    /// Sets the file header.
    #[must_use]
    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.config.header = header.into();
        self
    }

    /// Sets the late-initializer runtime package.
    #[must_use]
    pub fn runtime_package(mut self, path: impl Into<String>) -> Self {
        self.config.runtime_package = path.into();
        self
    }

    /// Sets the pointer value helper package.
    #[must_use]
    pub fn clients_package(mut self, path: impl Into<String>) -> Self {
        self.config.clients_package = path.into();
        self
    }

    /// Sets the correlation policy.
    #[must_use]
    pub fn unmatched_policy(mut self, policy: UnmatchedFieldPolicy) -> Self {
        self.config.unmatched_policy = policy;
        self
    }

    /// Enables or disables the output formatter.
    #[must_use]
    pub fn format_output(mut self, enabled: bool) -> Self {
        self.config.format_output = enabled;
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> GeneratorConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GeneratorConfig::default();
        assert_eq!(config.header, DEFAULT_HEADER);
        assert_eq!(config.unmatched_policy, UnmatchedFieldPolicy::Skip);
        assert!(config.format_output);
    }

    #[test]
    fn test_builder() {
        let config = GeneratorConfig::builder()
            .local_package("example.com/apis/storage/v1alpha1")
            .header("// header")
            .runtime_package("example.com/runtime")
            .clients_package("example.com/clients")
            .unmatched_policy(UnmatchedFieldPolicy::Error)
            .format_output(false)
            .build();

        assert_eq!(config.package_name(), "v1alpha1");
        assert_eq!(config.header, "// header");
        assert_eq!(config.runtime_package, "example.com/runtime");
        assert_eq!(config.clients_package, "example.com/clients");
        assert_eq!(config.unmatched_policy, UnmatchedFieldPolicy::Error);
        assert!(!config.format_output);
    }
}
