//! Memoizing type resolver.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use typewright_core::{NamedType, QualifiedName, ResolveError, TypeResolver};

/// Cache hit/miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that populated a new entry.
    pub misses: u64,
}

/// Resolver that memoizes another resolver by qualified name.
///
/// Entries live as long as the cache; failed lookups are not cached. The
/// cache is passed explicitly to every component that resolves types and is
/// safe to share between threads.
pub struct TypeCache<R> {
    source: R,
    entries: RwLock<HashMap<QualifiedName, Arc<NamedType>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<R: TypeResolver> TypeCache<R> {
    /// Creates an empty cache in front of `source`.
    #[must_use]
    pub fn new(source: R) -> Self {
        Self {
            source,
            entries: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Returns the wrapped resolver.
    #[must_use]
    pub fn source(&self) -> &R {
        &self.source
    }

    /// Returns true if the type is cached.
    #[must_use]
    pub fn contains(&self, name: &QualifiedName) -> bool {
        self.entries.read().contains_key(name)
    }

    /// Returns the number of cached types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Returns the hit/miss counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl<R: TypeResolver> TypeResolver for TypeCache<R> {
    fn resolve(&self, package: &str, name: &str) -> Result<Arc<NamedType>, ResolveError> {
        let key = QualifiedName::new(package, name);
        if let Some(found) = self.entries.read().get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Arc::clone(found));
        }

        let resolved = self.source.resolve(package, name)?;

        // Another thread may have populated the entry while we resolved; the
        // first insertion is kept.
        let mut entries = self.entries.write();
        let entry = entries.entry(key).or_insert_with(|| {
            self.misses.fetch_add(1, Ordering::Relaxed);
            tracing::debug!("Cached type {}", resolved.name);
            resolved
        });
        Ok(Arc::clone(entry))
    }
}
