use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::models::{PreferenceInstance, SolveResponse};

/// In-memory cache of solved instances.
///
/// Keyed by the full instance, so two requests share an entry only when
/// every preference list is identical. Verbose solves are never cached since
/// their traces are large and rarely repeated.
pub struct SolutionCache {
    l1_cache: moka::future::Cache<PreferenceInstance, Arc<SolveResponse>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl SolutionCache {
    /// Create a new cache holding at most `l1_size` solutions for `ttl_secs` each
    pub fn new(l1_size: u64, ttl_secs: u64) -> Self {
        let l1_cache = moka::future::CacheBuilder::new(l1_size)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self {
            l1_cache,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Look up a previous solution
    pub async fn get(&self, instance: &PreferenceInstance) -> Option<Arc<SolveResponse>> {
        match self.l1_cache.get(instance).await {
            Some(response) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::trace!("Solution cache hit ({} proposers)", instance.size());
                Some(response)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                tracing::trace!("Solution cache miss ({} proposers)", instance.size());
                None
            }
        }
    }

    /// Store a solution
    pub async fn set(&self, instance: PreferenceInstance, response: SolveResponse) {
        self.l1_cache.insert(instance, Arc::new(response)).await;
    }

    /// Drop every cached solution
    pub fn invalidate_all(&self) {
        self.l1_cache.invalidate_all();
        tracing::debug!("Solution cache cleared");
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let lookups = hits + misses;

        CacheStats {
            l1_size: self.l1_cache.entry_count(),
            l1_hit_count: hits,
            l1_miss_count: misses,
            l1_hit_rate: if lookups > 0 {
                hits as f64 / lookups as f64
            } else {
                0.0
            },
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub l1_size: u64,
    pub l1_hit_count: u64,
    pub l1_miss_count: u64,
    pub l1_hit_rate: f64,
}
