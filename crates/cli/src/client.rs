//! Thin driver for the engine's request/response boundary.

use serde_json::Value as JsonValue;
use tokio::sync::mpsc::UnboundedReceiver;

use notedex_core::config::EngineConfig;
use notedex_core::engine::{Engine, EngineHandle, Operation, Request, Response};

/// One spawned engine plus the bookkeeping to correlate its responses.
pub struct EngineClient {
    handle: EngineHandle,
    events: UnboundedReceiver<Response>,
    next_id: u64,
}

impl EngineClient {
    pub fn spawn(config: EngineConfig) -> Self {
        let (handle, events) = Engine::spawn(config);
        Self { handle, events, next_id: 0 }
    }

    /// Issue one request and wait for its terminal response. `Err` carries
    /// the engine's error message (or a transport failure).
    pub async fn call(
        &mut self,
        vault_id: &str,
        op: Operation,
    ) -> Result<JsonValue, String> {
        self.call_with(vault_id, op, |_| {}).await
    }

    /// Like [`call`](Self::call), invoking `on_event` for every
    /// notification (ready, progress) seen before the terminal response.
    pub async fn call_with(
        &mut self,
        vault_id: &str,
        op: Operation,
        mut on_event: impl FnMut(&Response),
    ) -> Result<JsonValue, String> {
        self.next_id += 1;
        let id = self.next_id;

        self.handle
            .send(Request { id, vault_id: vault_id.to_string(), op })
            .await
            .map_err(|e| e.to_string())?;

        loop {
            let Some(response) = self.events.recv().await else {
                return Err("engine stopped before responding".to_string());
            };

            match response {
                Response::Result { id: rid, payload, .. } if rid == id => {
                    return Ok(payload);
                }
                Response::Error { id: rid, message, .. } if rid == id => {
                    return Err(message);
                }
                other => on_event(&other),
            }
        }
    }
}
