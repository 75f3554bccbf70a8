//! In-process generation cache.
//!
//! A best-effort optimisation for the AI pipeline: identical prompts within
//! the TTL window skip every provider call. Entries expire on read and the
//! cache is lost on restart, which is acceptable for generated drafts.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::domain::generation::{GeneratedBanner, GenerationResult};
use crate::domain::ports::GenerationCache;

/// Default entry lifetime, matching the hour-long reuse window drafts stay
/// useful for.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

struct Entry<T> {
    value: T,
    stored_at: Instant,
}

/// Mutex-guarded map cache with read-side expiry.
pub struct InMemoryGenerationCache {
    ttl: Duration,
    results: Mutex<HashMap<String, Entry<GenerationResult>>>,
    banners: Mutex<HashMap<String, Entry<GeneratedBanner>>>,
}

impl InMemoryGenerationCache {
    /// Cache with the default one-hour TTL.
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    /// Cache with an explicit TTL.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            results: Mutex::new(HashMap::new()),
            banners: Mutex::new(HashMap::new()),
        }
    }

    fn fetch<T: Clone>(&self, map: &Mutex<HashMap<String, Entry<T>>>, key: &str) -> Option<T> {
        let mut guard = map.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        match guard.get(key) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => Some(entry.value.clone()),
            Some(_) => {
                guard.remove(key);
                None
            }
            None => None,
        }
    }

    fn store<T>(&self, map: &Mutex<HashMap<String, Entry<T>>>, key: &str, value: T) {
        let mut guard = map.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.insert(
            key.to_owned(),
            Entry {
                value,
                stored_at: Instant::now(),
            },
        );
    }
}

impl Default for InMemoryGenerationCache {
    fn default() -> Self {
        Self::new()
    }
}

impl GenerationCache for InMemoryGenerationCache {
    fn get_result(&self, key: &str) -> Option<GenerationResult> {
        self.fetch(&self.results, key)
    }

    fn put_result(&self, key: &str, result: GenerationResult) {
        self.store(&self.results, key, result);
    }

    fn get_banner(&self, key: &str) -> Option<GeneratedBanner> {
        self.fetch(&self.banners, key)
    }

    fn put_banner(&self, key: &str, banner: GeneratedBanner) {
        self.store(&self.banners, key, banner);
    }
}
