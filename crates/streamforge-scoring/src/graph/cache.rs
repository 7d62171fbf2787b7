//! Canonical declaration lookup.

use std::collections::HashMap;

use streamforge_core::{Result, StreamForgeError};

use super::declaration::{DeclId, DeclarationKey};

/// Maps each structural key to the one declaration that owns it.
///
/// Entries are only ever added; a key never changes owner.
#[derive(Debug, Default)]
pub(crate) struct SharingCache {
    canonical: HashMap<DeclarationKey, DeclId>,
}

impl SharingCache {
    pub(crate) fn get(&self, key: &DeclarationKey) -> Option<DeclId> {
        self.canonical.get(key).copied()
    }

    pub(crate) fn install(&mut self, key: DeclarationKey, id: DeclId) -> Result<()> {
        if let Some(existing) = self.canonical.get(&key) {
            return Err(StreamForgeError::SharingViolation(format!(
                "{} key is already owned by declaration {}",
                key.kind().label(),
                existing.index()
            )));
        }
        self.canonical.insert(key, id);
        Ok(())
    }

    pub(crate) fn is_canonical(&self, key: &DeclarationKey, id: DeclId) -> bool {
        self.canonical.get(key) == Some(&id)
    }

    pub(crate) fn len(&self) -> usize {
        self.canonical.len()
    }
}
