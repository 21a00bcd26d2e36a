//! The engine task: one consumer draining requests in arrival order.
//!
//! In-order processing gives per-vault serialization for free; operations
//! against different vaults simply queue behind each other. A query issued
//! while a rebuild for the same vault is in flight observes whatever its
//! committed batches left behind - an accepted consistency window.

use serde_json::Value as JsonValue;
use thiserror::Error;
use tokio::sync::mpsc;

use super::protocol::{LinksPayload, Operation, Request, Response};
use crate::config::EngineConfig;
use crate::index::backend::{default_candidates, select_backend};
use crate::index::db::StoreError;
use crate::index::ops::{Indexer, OpsError};
use crate::index::registry::StoreRegistry;
use crate::index::search::SearchEngine;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Indexing error: {0}")]
    Ops(#[from] OpsError),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("engine initialization failed: {0}")]
    Fatal(String),
}

/// The engine has shut down (or was never running).
#[derive(Debug, Error)]
#[error("engine is not running")]
pub struct EngineClosed;

/// Cloneable host-side handle for enqueueing requests.
#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<Request>,
}

impl EngineHandle {
    /// Enqueue a request. Requests are processed strictly in arrival order
    /// and cannot be cancelled once dispatched.
    pub async fn send(&self, request: Request) -> Result<(), EngineClosed> {
        self.tx.send(request).await.map_err(|_| EngineClosed)
    }
}

/// One engine instance: owns the store registry and processes requests on a
/// dedicated task.
pub struct Engine {
    config: EngineConfig,
    registry: Option<StoreRegistry>,
    fatal: Option<String>,
    events: mpsc::UnboundedSender<Response>,
}

impl Engine {
    /// Spawn the engine task and return the host's ends of both channels.
    ///
    /// Must be called inside a tokio runtime; the loop runs on a blocking
    /// thread because the store is synchronous. After `shutdown` the task
    /// ends and `send` fails; a fresh `spawn` is required to continue.
    pub fn spawn(
        config: EngineConfig,
    ) -> (EngineHandle, mpsc::UnboundedReceiver<Response>) {
        let (req_tx, mut req_rx) = mpsc::channel::<Request>(64);
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let mut engine =
            Engine { config, registry: None, fatal: None, events: event_tx };

        tokio::task::spawn_blocking(move || {
            while let Some(request) = req_rx.blocking_recv() {
                let stop = matches!(request.op, Operation::Shutdown);
                engine.dispatch(request);
                if stop {
                    break;
                }
            }
            tracing::debug!("engine task stopped");
        });

        (EngineHandle { tx: req_tx }, event_rx)
    }

    fn dispatch(&mut self, request: Request) {
        let Request { id, vault_id, op } = request;

        if matches!(op, Operation::Shutdown) {
            // Dropping the registry closes every store.
            self.registry = None;
            tracing::info!("engine shut down");
            self.emit(Response::Result { id, vault_id, payload: JsonValue::Null });
            return;
        }

        // Errors are recovered here into structured responses; a bad
        // request never takes the engine down.
        match self.handle(id, &vault_id, op) {
            Ok(payload) => self.emit(Response::Result { id, vault_id, payload }),
            Err(e) => {
                tracing::warn!("request {id} on vault '{vault_id}' failed: {e}");
                self.emit(Response::Error { id, vault_id, message: e.to_string() });
            }
        }
    }

    fn handle(
        &mut self,
        id: u64,
        vault_id: &str,
        op: Operation,
    ) -> Result<JsonValue, EngineError> {
        let indexer = Indexer::new(self.config.batch_size);
        let events = self.events.clone();

        let registry = self.registry_mut()?;
        let backend = registry.backend_name();

        let (entry, newly_opened) = registry.open(vault_id)?;
        if newly_opened {
            let _ = events.send(Response::Ready {
                vault_id: vault_id.to_string(),
                backend: backend.to_string(),
            });
        }

        match op {
            Operation::Init => Ok(JsonValue::Null),

            Operation::RebuildIndex { documents } => {
                let stats = indexer.full_rebuild(
                    &entry.store,
                    &mut entry.state,
                    &documents,
                    |indexed, total| {
                        let _ = events.send(Response::Progress {
                            id,
                            vault_id: vault_id.to_string(),
                            indexed,
                            total,
                        });
                    },
                )?;
                Ok(serde_json::to_value(stats)?)
            }

            Operation::UpsertNote { document } => {
                indexer.upsert_note(&entry.store, &mut entry.state, &document)?;
                Ok(JsonValue::Null)
            }

            Operation::RemoveNote { note_id } => {
                let removed =
                    indexer.remove_note(&entry.store, &mut entry.state, &note_id)?;
                Ok(serde_json::json!({ "removed": removed }))
            }

            Operation::Search { query } => {
                let hits = SearchEngine::new(&entry.store).search(
                    &query.text,
                    query.scope,
                    query.limit,
                )?;
                Ok(serde_json::to_value(hits)?)
            }

            Operation::Suggest { query } => {
                let hits =
                    SearchEngine::new(&entry.store).suggest(&query.text, query.limit)?;
                Ok(serde_json::to_value(hits)?)
            }

            Operation::Links { note_id } => {
                let payload = LinksPayload {
                    outlinks: entry.store.outlinks(&note_id)?,
                    backlinks: entry.store.backlinks(&note_id)?,
                    path: note_id,
                };
                Ok(serde_json::to_value(payload)?)
            }

            Operation::Exec { statement, params } => {
                let outcome = entry.store.exec(&statement, &params)?;
                Ok(serde_json::to_value(outcome)?)
            }

            // Handled in dispatch before reaching here
            Operation::Shutdown => Ok(JsonValue::Null),
        }
    }

    /// Lazily select the storage backend and build the registry. A selector
    /// failure is fatal: it is recorded once and every subsequent request is
    /// answered with the same error.
    fn registry_mut(&mut self) -> Result<&mut StoreRegistry, EngineError> {
        if let Some(message) = &self.fatal {
            return Err(EngineError::Fatal(message.clone()));
        }

        if self.registry.is_none() {
            let candidates = default_candidates(self.config.resolved_data_dir());
            match select_backend(&candidates) {
                Ok(backend) => self.registry = Some(StoreRegistry::new(backend)),
                Err(e) => {
                    let message = e.to_string();
                    tracing::error!("storage backend selection failed: {message}");
                    self.fatal = Some(message.clone());
                    return Err(EngineError::Fatal(message));
                }
            }
        }

        match self.registry.as_mut() {
            Some(registry) => Ok(registry),
            None => Err(EngineError::Fatal("storage backend unavailable".to_string())),
        }
    }

    fn emit(&self, response: Response) {
        // The host may have dropped its receiver; nothing useful to do then
        let _ = self.events.send(response);
    }
}
