use std::collections::HashSet;
use tokio::sync::{RwLock, RwLockReadGuard};

/// Recently returned ids. Reaching capacity clears the whole set.
#[derive(Debug, Clone)]
pub struct UsedIdSet {
    ids: HashSet<u64>,
    capacity: usize,
}

impl UsedIdSet {
    pub fn new(capacity: usize) -> Self {
        Self {
            ids: HashSet::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn contains(&self, id: u64) -> bool {
        self.ids.contains(&id)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Insert `id`, clearing the set first if it is full.
    /// Returns true when the set was reset.
    pub fn insert(&mut self, id: u64) -> bool {
        let reset = self.ids.len() >= self.capacity;
        if reset {
            self.ids.clear();
        }
        self.ids.insert(id);
        reset
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Add `ids` without the capacity check. Only for filtering snapshots.
    pub fn with_reserved(mut self, ids: &[u64]) -> Self {
        self.ids.extend(ids);
        self
    }
}

/// Ids the detail endpoint answered 404 for. Never cleared.
#[derive(Debug, Default)]
pub struct Blacklist {
    ids: RwLock<HashSet<u64>>,
}

impl Blacklist {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn contains(&self, id: u64) -> bool {
        self.ids.read().await.contains(&id)
    }

    /// Returns true if the id was not blacklisted before.
    pub async fn insert(&self, id: u64) -> bool {
        self.ids.write().await.insert(id)
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.ids.read().await.len()
    }

    /// Read access for filtering a whole page at once. Do not hold across upstream calls.
    pub async fn ids(&self) -> RwLockReadGuard<'_, HashSet<u64>> {
        self.ids.read().await
    }
}
