//! Cross-package import tracking.
//!
//! Aliases are handed out by the [`ImportScope`]: every clone of a scope
//! shares one alias table, so a package keeps the same alias for as long as
//! the scope lives no matter which fragment referenced it first. Fragments
//! carry their own [`ImportSet`] and sets are merged when fragments are
//! composed.

use crate::error::CodegenError;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

/// Returns the preferred import alias of `path`.
///
/// The alias is the concatenation of the last two path segments, lowercased,
/// with everything but ASCII letters and digits removed.
#[must_use]
pub fn alias_for(path: &str) -> String {
    let segments = segments(path);
    join_alias(&segments[segments.len().saturating_sub(2)..])
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn join_alias(tail: &[&str]) -> String {
    let mut alias: String = tail
        .iter()
        .flat_map(|segment| segment.chars())
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect();
    if alias.is_empty() || alias.starts_with(|c: char| c.is_ascii_digit()) {
        alias.insert_str(0, "pkg");
    }
    alias
}

/// Aliases assigned so far, first come first served.
#[derive(Debug, Default)]
struct AliasTable {
    by_path: HashMap<String, String>,
    taken: HashSet<String>,
}

impl AliasTable {
    /// Returns the alias of `path`, assigning one if absent.
    ///
    /// A taken alias is extended with leading path segments, then with a
    /// numeric suffix.
    fn assign(&mut self, path: &str) -> String {
        if let Some(alias) = self.by_path.get(path) {
            return alias.clone();
        }

        let segments = segments(path);
        let mut alias = alias_for(path);
        for take in 3..=segments.len() {
            if !self.taken.contains(&alias) {
                break;
            }
            alias = join_alias(&segments[segments.len() - take..]);
        }
        if self.taken.contains(&alias) {
            let base = alias.clone();
            let mut suffix = 2;
            while self.taken.contains(&alias) {
                alias = format!("{base}{suffix}");
                suffix += 1;
            }
        }

        tracing::trace!("Assigned import alias {} to {}", alias, path);
        self.taken.insert(alias.clone());
        self.by_path.insert(path.to_string(), alias.clone());
        alias
    }
}

/// The package code is being generated into, plus the aliases of every
/// package referenced from it.
#[derive(Debug, Clone, Default)]
pub struct ImportScope {
    local_package: String,
    aliases: Arc<RwLock<AliasTable>>,
}

impl ImportScope {
    /// Creates a scope for code living in `local_package`.
    #[must_use]
    pub fn new(local_package: impl Into<String>) -> Self {
        Self {
            local_package: local_package.into(),
            aliases: Arc::default(),
        }
    }

    /// Returns the local package path.
    #[must_use]
    pub fn local_package(&self) -> &str {
        &self.local_package
    }

    /// Returns true if `package` is the local package.
    #[must_use]
    pub fn is_local(&self, package: &str) -> bool {
        self.local_package == package
    }

    /// Returns the alias of `package`, unique within this scope.
    #[must_use]
    pub fn alias(&self, package: &str) -> String {
        if let Some(alias) = self.aliases.read().by_path.get(package) {
            return alias.clone();
        }
        self.aliases.write().assign(package)
    }

    /// Returns the selector prefix (`alias.` or empty) for symbols of
    /// `package`, registering the import in `imports`.
    ///
    /// # Errors
    /// Returns [`CodegenError::ImportAliasConflict`] if `imports` already
    /// holds the alias for another path, which only happens when sets from
    /// different scopes are mixed.
    pub fn qualifier(&self, package: &str, imports: &mut ImportSet) -> Result<String, CodegenError> {
        if self.is_local(package) {
            return Ok(String::new());
        }
        let alias = self.alias(package);
        imports.insert(package, &alias)?;
        Ok(format!("{alias}."))
    }
}

/// Set of imported packages keyed by path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSet {
    by_path: BTreeMap<String, String>,
    by_alias: BTreeMap<String, String>,
}

impl ImportSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `path` under `alias` if the path is absent.
    ///
    /// # Errors
    /// Returns [`CodegenError::ImportAliasConflict`] if another path already
    /// uses the same alias.
    pub fn insert(&mut self, path: &str, alias: &str) -> Result<(), CodegenError> {
        if self.by_path.contains_key(path) {
            return Ok(());
        }
        if let Some(first) = self.by_alias.get(alias) {
            return Err(CodegenError::ImportAliasConflict {
                alias: alias.to_string(),
                first: first.clone(),
                second: path.to_string(),
            });
        }
        self.by_path.insert(path.to_string(), alias.to_string());
        self.by_alias.insert(alias.to_string(), path.to_string());
        Ok(())
    }

    /// Adds every import of `other`.
    ///
    /// # Errors
    /// Returns [`CodegenError::ImportAliasConflict`] on alias collisions.
    pub fn merge(&mut self, other: &ImportSet) -> Result<(), CodegenError> {
        for (path, alias) in other.iter() {
            self.insert(path, alias)?;
        }
        Ok(())
    }

    /// Returns the alias of `path` if it is imported.
    #[must_use]
    pub fn alias(&self, path: &str) -> Option<&str> {
        self.by_path.get(path).map(String::as_str)
    }

    /// Returns true if `path` is imported.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.by_path.contains_key(path)
    }

    /// Returns the number of imports.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    /// Returns true if nothing is imported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }

    /// Iterates over `(path, alias)` pairs sorted by path.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.by_path.iter().map(|(p, a)| (p.as_str(), a.as_str()))
    }

    /// Renders the import block, sorted by path. Empty sets render nothing.
    #[must_use]
    pub fn render(&self) -> String {
        if self.by_path.is_empty() {
            return String::new();
        }
        let mut output = String::from("import (\n");
        for (path, alias) in self.iter() {
            output.push_str(&format!("\t{alias} \"{path}\"\n"));
        }
        output.push_str(")\n");
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_for() {
        assert_eq!(
            alias_for("github.com/crossplane/crossplane-runtime/pkg/resource"),
            "pkgresource"
        );
        assert_eq!(alias_for("k8s.io/apimachinery/pkg/apis/meta/v1"), "metav1");
        assert_eq!(alias_for("example.com/sdk/storage"), "sdkstorage");
        assert_eq!(alias_for("fmt"), "fmt");
        assert_eq!(alias_for("example.com/1/2"), "pkg12");
    }

    #[test]
    fn test_insert_if_absent() {
        let mut imports = ImportSet::new();
        imports.insert("example.com/sdk/storage", "sdkstorage").expect("insert");
        imports.insert("example.com/sdk/storage", "other").expect("insert");

        assert_eq!(imports.len(), 1);
        assert_eq!(imports.alias("example.com/sdk/storage"), Some("sdkstorage"));
    }

    #[test]
    fn test_sets_from_different_scopes_conflict() {
        let mut imports = ImportSet::new();
        ImportScope::new("example.com/apis/v1")
            .qualifier("example.com/sdk/storage", &mut imports)
            .expect("qualifier");

        let mut other = ImportSet::new();
        ImportScope::new("example.com/apis/v1")
            .qualifier("other.org/sdk/storage", &mut other)
            .expect("qualifier");

        let err = imports.merge(&other).unwrap_err();
        assert!(matches!(err, CodegenError::ImportAliasConflict { ref alias, .. } if alias == "sdkstorage"));
    }

    #[test]
    fn test_shared_tail_gets_distinct_aliases() {
        let scope = ImportScope::new("example.com/apis/v1alpha1");
        let mut imports = ImportSet::new();

        let google = scope
            .qualifier("cloud.google.com/go/storage/v1", &mut imports)
            .expect("first");
        let legacy = scope
            .qualifier("example.com/legacy/storage/v1", &mut imports)
            .expect("second");
        let again = scope
            .qualifier("cloud.google.com/go/storage/v1", &mut imports)
            .expect("repeat");

        assert_eq!(google, "storagev1.");
        assert_eq!(legacy, "legacystoragev1.");
        assert_eq!(again, google);
        assert_eq!(imports.len(), 2);

        // Clones share the table, so other fragments render the same alias.
        let mut fragment = ImportSet::new();
        assert_eq!(
            scope
                .clone()
                .qualifier("example.com/legacy/storage/v1", &mut fragment)
                .expect("clone"),
            "legacystoragev1."
        );
        imports.merge(&fragment).expect("merge");
    }

    #[test]
    fn test_exhausted_segments_get_suffix() {
        let scope = ImportScope::new("example.com/apis/v1");
        assert_eq!(scope.alias("a/b"), "ab");
        assert_eq!(scope.alias("a-b"), "ab2");
        assert_eq!(scope.alias("ab"), "ab3");
        assert_eq!(scope.alias("a-b"), "ab2");
    }

    #[test]
    fn test_render_sorted() {
        let scope = ImportScope::new("example.com/apis/v1");
        let mut imports = ImportSet::new();
        scope
            .qualifier("k8s.io/apimachinery/pkg/apis/meta/v1", &mut imports)
            .expect("qualifier");
        scope
            .qualifier("example.com/sdk/storage", &mut imports)
            .expect("qualifier");

        assert_eq!(
            imports.render(),
            "import (\n\tsdkstorage \"example.com/sdk/storage\"\n\tmetav1 \"k8s.io/apimachinery/pkg/apis/meta/v1\"\n)\n"
        );
        assert_eq!(ImportSet::new().render(), "");
    }

    #[test]
    fn test_scope_qualifier() {
        let scope = ImportScope::new("example.com/apis/storage/v1alpha1");
        let mut imports = ImportSet::new();

        assert_eq!(
            scope
                .qualifier("example.com/apis/storage/v1alpha1", &mut imports)
                .expect("local"),
            ""
        );
        assert!(imports.is_empty());
        assert_eq!(
            scope
                .qualifier("example.com/sdk/storage", &mut imports)
                .expect("remote"),
            "sdkstorage."
        );
        assert!(imports.contains("example.com/sdk/storage"));
    }
}
