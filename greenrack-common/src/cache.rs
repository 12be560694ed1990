//! In-process key/value cache with per-key TTL
//!
//! Backs the POS passthrough endpoints so repeated dashboard loads don't
//! hammer the vendor API. Entries are stored as JSON values and expire
//! lazily on read. The cache is a shared collaborator injected into the
//! service state rather than a process-global.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Cache key invalidated after any operation that mutates product images
pub const PRODUCTS_ALL_KEY: &str = "products:all";

/// TTL for the cached full product list
pub const PRODUCTS_TTL: Duration = Duration::from_secs(30 * 60);
/// TTL for the cached category list
pub const CATEGORIES_TTL: Duration = Duration::from_secs(60 * 60);
/// TTL for the cached strain list
pub const STRAINS_TTL: Duration = Duration::from_secs(60 * 60);

struct CacheEntry {
    value: serde_json::Value,
    expires_at: Instant,
}

/// Cloneable, thread-safe TTL cache
#[derive(Clone, Default)]
pub struct TtlCache {
    store: Arc<Mutex<HashMap<String, CacheEntry>>>,
}

impl TtlCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a value by key, removing it if expired.
    ///
    /// Returns `None` on miss, expiry, or if the stored JSON does not
    /// deserialize into `T`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let mut store = self.store.lock().expect("cache mutex poisoned");
        match store.get(key) {
            None => None,
            Some(entry) if Instant::now() > entry.expires_at => {
                debug!(key = %key, "Cache entry expired");
                store.remove(key);
                None
            }
            Some(entry) => serde_json::from_value(entry.value.clone()).ok(),
        }
    }

    /// Store a value under `key` for `ttl`.
    pub fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        let value = match serde_json::to_value(value) {
            Ok(v) => v,
            Err(e) => {
                warn!(key = %key, "Failed to serialize cache value: {}", e);
                return;
            }
        };

        let mut store = self.store.lock().expect("cache mutex poisoned");
        store.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    /// Remove a key. No-op if absent.
    pub fn delete(&self, key: &str) {
        let mut store = self.store.lock().expect("cache mutex poisoned");
        if store.remove(key).is_some() {
            debug!(key = %key, "Cache entry invalidated");
        }
    }
}
