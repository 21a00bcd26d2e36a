//! Indexing operations: bulk rebuild and incremental upsert/remove.

use std::time::Instant;

use thiserror::Error;

use super::db::{IndexStore, StoreError};
use super::types::{LinkEdge, NoteDocument, RebuildStats, VaultState};
use crate::graph::{KeyMap, extract_link_tokens};

#[derive(Debug, Error)]
pub enum OpsError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("vault is rebuilding; incremental operations require a ready index")]
    NotReady,
}

/// Orchestrates index writes against one vault's store. Holds no state of
/// its own beyond the batch size.
pub struct Indexer {
    batch_size: usize,
}

impl Indexer {
    pub fn new(batch_size: usize) -> Self {
        Self { batch_size: batch_size.max(1) }
    }

    /// Clear and repopulate all three record sets for a vault.
    ///
    /// Documents are committed in fixed-size batches, each in its own
    /// transaction; `progress` is called once before any batch with
    /// `indexed = 0` and again after every committed batch. A failing batch
    /// rolls back only itself: earlier batches stay committed and later
    /// batches never run, leaving the vault partially rebuilt. Recovery is
    /// a retried rebuild, which clears state first.
    pub fn full_rebuild(
        &self,
        store: &IndexStore,
        state: &mut VaultState,
        docs: &[NoteDocument],
        mut progress: impl FnMut(usize, usize),
    ) -> Result<RebuildStats, OpsError> {
        let start = Instant::now();
        *state = VaultState::Rebuilding;

        let result = self.rebuild_inner(store, docs, &mut progress);

        // Even after a failed batch the store is structurally sound, so
        // incremental operations and queries stay available.
        *state = VaultState::Ready;

        let mut stats = result?;
        stats.duration_ms = start.elapsed().as_millis() as u64;

        tracing::info!(
            "rebuilt index: {} notes, {} edges in {}ms",
            stats.notes,
            stats.edges,
            stats.duration_ms
        );
        Ok(stats)
    }

    fn rebuild_inner(
        &self,
        store: &IndexStore,
        docs: &[NoteDocument],
        progress: &mut impl FnMut(usize, usize),
    ) -> Result<RebuildStats, OpsError> {
        store.clear_all()?;

        let total = docs.len();
        progress(0, total);

        let mut indexed = 0;
        for batch in docs.chunks(self.batch_size) {
            store.index_batch(batch)?;
            indexed += batch.len();
            progress(indexed, total);
            tracing::debug!("rebuild batch committed ({indexed}/{total})");
        }

        // Edge pass: resolve every document's tokens against the final note
        // set, so links between notes in different batches land too.
        let key_map = KeyMap::build(&store.all_notes()?);
        let mut edges = Vec::new();
        for doc in docs {
            let tokens = extract_link_tokens(&doc.body);
            if tokens.is_empty() {
                continue;
            }
            for target in key_map.resolve_targets(&doc.path, &tokens) {
                edges.push(LinkEdge {
                    source_path: doc.path.clone(),
                    target_path: target,
                });
            }
        }
        let edge_count = store.insert_edges(&edges)?;

        Ok(RebuildStats { notes: total, edges: edge_count, duration_ms: 0 })
    }

    /// Replace one note's metadata and full-text rows, then re-resolve and
    /// replace its outlink edges against a fresh snapshot. A new note is
    /// immediately resolvable as a link target for itself.
    pub fn upsert_note(
        &self,
        store: &IndexStore,
        state: &mut VaultState,
        doc: &NoteDocument,
    ) -> Result<(), OpsError> {
        if *state == VaultState::Rebuilding {
            return Err(OpsError::NotReady);
        }

        store.index_batch(std::slice::from_ref(doc))?;

        let key_map = KeyMap::build(&store.all_notes()?);
        let targets = key_map.resolve_targets(&doc.path, &extract_link_tokens(&doc.body));
        store.replace_links(&doc.path, &targets)?;

        // First incremental use of a fresh vault passes through an empty
        // ready index.
        *state = VaultState::Ready;

        tracing::debug!("upserted note '{}' ({} outlinks)", doc.path, targets.len());
        Ok(())
    }

    /// Delete a note's rows and the edges it is the source of. Edges held by
    /// other notes that point at it stay until those notes are reindexed.
    pub fn remove_note(
        &self,
        store: &IndexStore,
        state: &mut VaultState,
        note_id: &str,
    ) -> Result<bool, OpsError> {
        if *state == VaultState::Rebuilding {
            return Err(OpsError::NotReady);
        }

        let removed = store.remove_note(note_id)?;
        *state = VaultState::Ready;

        tracing::debug!("removed note '{note_id}' (existed: {removed})");
        Ok(removed)
    }
}
