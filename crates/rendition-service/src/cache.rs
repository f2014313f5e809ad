//! Compile-once cache of compiled templates.
//!
//! Each template name is compiled at most once for the lifetime of the cache.
//! Concurrent first requests for the same name serialize on a per-name slot:
//! one caller compiles, the others wait and then receive the same handle.
//! Hits only take the shared read lock. Entries are never invalidated
//! individually; [`TemplateCache::clear`] drops everything at teardown.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use crate::lock;

/// Concurrent map from template file name to compiled handle.
#[derive(Debug)]
pub struct TemplateCache<T> {
    ready: RwLock<HashMap<String, Arc<T>>>,
    slots: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl<T> TemplateCache<T> {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ready: RwLock::new(HashMap::new()),
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached handle for `name`, if compiled.
    pub fn get(&self, name: &str) -> Option<Arc<T>> {
        lock::read(&self.ready, "cache.get").get(name).cloned()
    }

    /// Returns the cached handle for `name`, running `compile` if there is none.
    ///
    /// `compile` runs at most once per name even under concurrent first access.
    /// A failed compile stores nothing, so a later call tries again.
    ///
    /// # Errors
    ///
    /// Returns whatever `compile` returns on failure.
    pub fn get_or_compile<E>(
        &self,
        name: &str,
        compile: impl FnOnce() -> Result<T, E>,
    ) -> Result<Arc<T>, E> {
        if let Some(handle) = self.get(name) {
            return Ok(handle);
        }

        let slot = {
            let mut slots = lock::lock(&self.slots, "cache.slot");
            Arc::clone(slots.entry(name.to_string()).or_default())
        };
        let _compiling = lock::lock(&slot, "cache.compile");

        // Another caller may have finished while we waited for the slot.
        if let Some(handle) = self.get(name) {
            return Ok(handle);
        }

        let outcome = compile().map(Arc::new);
        if let Ok(handle) = &outcome {
            let _ = lock::write(&self.ready, "cache.insert")
                .insert(name.to_string(), Arc::clone(handle));
            tracing::debug!(template = name, "template compiled and cached");
        }
        let _ = lock::lock(&self.slots, "cache.slot").remove(name);
        outcome
    }

    /// Returns whether `name` has been compiled.
    pub fn contains(&self, name: &str) -> bool {
        lock::read(&self.ready, "cache.contains").contains_key(name)
    }

    /// Number of compiled templates.
    pub fn len(&self) -> usize {
        lock::read(&self.ready, "cache.len").len()
    }

    /// Returns whether nothing has been compiled.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every cached handle.
    pub fn clear(&self) {
        lock::write(&self.ready, "cache.clear").clear();
        lock::lock(&self.slots, "cache.clear").clear();
    }
}

impl<T> Default for TemplateCache<T> {
    fn default() -> Self {
        Self::new()
    }
}
