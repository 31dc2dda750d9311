//! Per-key debouncing of search input.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Mutex;
use std::time::Duration;

use crate::sync::lock;

/// Debounces keystrokes independently per key.
///
/// Each call to [`settle`](Self::settle) bumps the key's generation, waits
/// for the debounce delay and reports whether it is still the latest call for
/// that key. Keys never delay each other.
pub struct SearchDebouncer<K> {
    delay: Duration,
    generations: Mutex<HashMap<K, u64>>,
}

impl<K: Eq + Hash + Clone> SearchDebouncer<K> {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generations: Mutex::new(HashMap::new()),
        }
    }

    /// Waits out the debounce delay for `key`.
    ///
    /// Returns `true` if no newer call for `key` started while waiting.
    pub async fn settle(&self, key: &K) -> bool {
        let generation = {
            let mut generations = lock(&self.generations);
            let generation = generations.entry(key.clone()).or_insert(0);
            *generation += 1;
            *generation
        };

        tokio::time::sleep(self.delay).await;

        lock(&self.generations).get(key).copied() == Some(generation)
    }

    /// Drops the generation counter of `key`.
    pub fn forget(&self, key: &K) {
        lock(&self.generations).remove(key);
    }
}
