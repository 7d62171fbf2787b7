use std::collections::HashMap;

use indexmap::IndexSet;

use crate::session::tuple::TupleId;
use crate::value::IndexKey;

/// Tuples of one input side, indexed by their equality-joiner key.
///
/// Buckets are ordered by the sequence of inserts and removals, never by
/// hash, so identical operation sequences yield identical match orders.
#[derive(Debug, Default)]
pub(crate) struct TupleIndex {
    keys: HashMap<TupleId, IndexKey>,
    buckets: HashMap<IndexKey, IndexSet<TupleId>>,
}

impl TupleIndex {
    pub(crate) fn insert(&mut self, id: TupleId, key: IndexKey) {
        self.buckets.entry(key.clone()).or_default().insert(id);
        self.keys.insert(id, key);
    }

    pub(crate) fn remove(&mut self, id: TupleId) -> Option<IndexKey> {
        let key = self.keys.remove(&id)?;
        if let Some(bucket) = self.buckets.get_mut(&key) {
            bucket.swap_remove(&id);
            if bucket.is_empty() {
                self.buckets.remove(&key);
            }
        }
        Some(key)
    }

    pub(crate) fn key_of(&self, id: TupleId) -> Option<&IndexKey> {
        self.keys.get(&id)
    }

    /// Tuples whose key equals `key`.
    pub(crate) fn matching(&self, key: &IndexKey) -> Vec<TupleId> {
        self.buckets
            .get(key)
            .map(|bucket| bucket.iter().copied().collect())
            .unwrap_or_default()
    }
}
