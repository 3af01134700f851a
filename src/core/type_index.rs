//! Cross-reference of declaration titles to their output locations.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Maps a declaration title to `category/fileName`.
///
/// Entries are only ever inserted or overwritten. Iteration follows first
/// insertion order; overwriting keeps the original position.
#[derive(Debug, Clone, Default)]
pub struct TypeReferenceIndex {
    entries: Vec<(String, String)>,
    positions: HashMap<String, usize>,
}

impl TypeReferenceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite. Returns the previous path when one existed.
    pub fn register(&mut self, title: &str, path: &str) -> Option<String> {
        match self.positions.get(title) {
            Some(&pos) => Some(std::mem::replace(&mut self.entries[pos].1, path.to_string())),
            None => {
                self.positions.insert(title.to_string(), self.entries.len());
                self.entries.push((title.to_string(), path.to_string()));
                None
            }
        }
    }

    pub fn get(&self, title: &str) -> Option<&str> {
        self.positions
            .get(title)
            .map(|&pos| self.entries[pos].1.as_str())
    }

    /// Every `(title, path)` pair in insertion order.
    ///
    /// This enumerates the index for inspection. Rendering does not walk it;
    /// hyperlinking looks up each identifier through [`get`](Self::get).
    pub fn resolve(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(t, p)| (t.as_str(), p.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Index handle shared between concurrent watch triggers.
///
/// Locks are held only for a single registration or snapshot, never across a
/// whole file pass.
#[derive(Debug, Clone, Default)]
pub struct SharedTypeIndex(Arc<RwLock<TypeReferenceIndex>>);

impl SharedTypeIndex {
    pub fn new(index: TypeReferenceIndex) -> Self {
        Self(Arc::new(RwLock::new(index)))
    }

    pub fn read(&self) -> RwLockReadGuard<'_, TypeReferenceIndex> {
        // A panic mid-registration leaves the map consistent, so poisoning is ignored
        self.0.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, TypeReferenceIndex> {
        self.0.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Copy of the current index for rendering
    pub fn snapshot(&self) -> TypeReferenceIndex {
        self.read().clone()
    }
}
