//! Per-engine registry of open vault stores.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use super::backend::Backend;
use super::db::{IndexStore, StoreError};
use super::types::VaultState;

/// One open vault: its store plus indexing lifecycle state.
pub struct VaultEntry {
    pub store: IndexStore,
    pub state: VaultState,
}

/// Lookup-or-create map from vault id to open store, owned by one engine
/// instance. Stores stay open until the registry is dropped at shutdown.
pub struct StoreRegistry {
    backend: Backend,
    stores: HashMap<String, VaultEntry>,
}

impl StoreRegistry {
    pub fn new(backend: Backend) -> Self {
        Self { backend, stores: HashMap::new() }
    }

    /// Identity of the adopted storage backend.
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Open (or return the already-open) store for a vault. The boolean is
    /// true when this call performed the open.
    pub fn open(&mut self, vault_id: &str) -> Result<(&mut VaultEntry, bool), StoreError> {
        match self.stores.entry(vault_id.to_string()) {
            Entry::Occupied(entry) => Ok((entry.into_mut(), false)),
            Entry::Vacant(slot) => {
                let store = IndexStore::open(&self.backend, vault_id)?;
                tracing::info!("opened vault store '{vault_id}'");
                let entry = slot.insert(VaultEntry {
                    store,
                    state: VaultState::default(),
                });
                Ok((entry, true))
            }
        }
    }

    /// Number of open vault stores.
    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_is_memoized() {
        let mut registry = StoreRegistry::new(Backend::Memory);

        let (_, first) = registry.open("vault-a").unwrap();
        assert!(first);
        let (_, second) = registry.open("vault-a").unwrap();
        assert!(!second);

        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_vaults_are_independent() {
        let mut registry = StoreRegistry::new(Backend::Memory);

        {
            let (entry, _) = registry.open("vault-a").unwrap();
            entry
                .store
                .replace_links("a.md", &["b.md".to_string()])
                .unwrap();
        }

        let (entry, _) = registry.open("vault-b").unwrap();
        assert!(entry.store.outlinks("a.md").unwrap().is_empty());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_new_vault_starts_uninitialized() {
        let mut registry = StoreRegistry::new(Backend::Memory);
        let (entry, _) = registry.open("vault-a").unwrap();
        assert_eq!(entry.state, VaultState::Uninitialized);
    }
}
