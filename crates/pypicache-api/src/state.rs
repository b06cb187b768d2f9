//! # Application State
//!
//! Shared handles injected into every handler. Built once at startup and
//! cloned per request; all members are reference counted.

use std::sync::Arc;

use pypicache_cache::PackageCache;
use pypicache_pypi::PackageIndex;
use pypicache_store::ArtifactStore;

#[derive(Clone)]
pub struct AppState {
    /// Local artifact store.
    pub store: Arc<dyn ArtifactStore>,
    /// Upstream package index.
    pub index: Arc<dyn PackageIndex>,
    /// Coordinator over `store` and `index`.
    pub cache: PackageCache,
}

impl AppState {
    pub fn new(store: Arc<dyn ArtifactStore>, index: Arc<dyn PackageIndex>) -> Self {
        let cache = PackageCache::new(store.clone(), index.clone());
        Self {
            store,
            index,
            cache,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
