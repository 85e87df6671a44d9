use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Identity of a piece of loaded content: a normalized path plus a variant
/// slot (shader permutation, texture sampler variant, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentKey {
    path: String,
    variant: u32,
}

impl ContentKey {
    pub fn new(path: &str, variant: u32) -> Self {
        Self {
            path: normalize_path(path),
            variant,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn variant(&self) -> u32 {
        self.variant
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.path, self.variant)
    }
}

fn normalize_path(path: &str) -> String {
    let unified = path.replace('\\', "/");
    let parts: Vec<&str> = unified
        .split('/')
        .filter(|part| !part.is_empty() && *part != ".")
        .collect();

    let mut normalized = String::with_capacity(unified.len());
    if unified.starts_with('/') {
        normalized.push('/');
    }
    normalized.push_str(&parts.join("/"));
    normalized.to_lowercase()
}

/// Shared get-or-create cache for loaded content.
///
/// The mutex only guards the map. Creation runs unlocked so two unrelated
/// loads never serialize on each other; when two callers race on the same
/// key the first insertion wins and both receive the same `Arc`.
pub struct ContentCache<T> {
    entries: Mutex<HashMap<ContentKey, Arc<T>>>,
}

impl<T> ContentCache<T> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &ContentKey) -> Option<Arc<T>> {
        self.entries.lock().get(key).cloned()
    }

    pub fn get_or_create<E, F>(&self, key: &ContentKey, create: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        if let Some(existing) = self.get(key) {
            return Ok(existing);
        }

        let created = Arc::new(create()?);

        let mut entries = self.entries.lock();
        let entry = entries
            .entry(key.clone())
            .or_insert_with(|| Arc::clone(&created));
        if !Arc::ptr_eq(entry, &created) {
            log::debug!("Discarding duplicate load of {}", key);
        }
        Ok(Arc::clone(entry))
    }

    /// Replaces whatever is cached under `key`.
    pub fn insert(&self, key: ContentKey, value: T) -> Arc<T> {
        let value = Arc::new(value);
        self.entries.lock().insert(key, Arc::clone(&value));
        value
    }

    /// Snapshot of every entry, ordered by key.
    pub fn entries(&self) -> Vec<(ContentKey, Arc<T>)> {
        let mut entries: Vec<_> = self
            .entries
            .lock()
            .iter()
            .map(|(key, value)| (key.clone(), Arc::clone(value)))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl<T> Default for ContentCache<T> {
    fn default() -> Self {
        Self::new()
    }
}
