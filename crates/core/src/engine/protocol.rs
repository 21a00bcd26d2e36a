//! Request/response envelopes for the engine boundary.
//!
//! The host and engine share no memory; everything crosses as one of these
//! messages. Every request carries a correlation id that is echoed on each
//! response it produces, since several requests (including for different
//! vaults) may be outstanding at once.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::index::{NoteDocument, SearchScope};

/// A host request, scoped to one vault.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub id: u64,
    pub vault_id: String,
    #[serde(flatten)]
    pub op: Operation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Operation {
    /// Open the vault's store, selecting a storage backend on first use.
    Init,
    /// Clear and repopulate the vault from the full document set.
    RebuildIndex { documents: Vec<NoteDocument> },
    /// Replace one note's rows and outlink edges.
    UpsertNote { document: NoteDocument },
    /// Delete one note's rows and outgoing edges.
    RemoveNote { note_id: String },
    /// Ranked full-text search.
    Search { query: SearchQuery },
    /// Typeahead suggestion.
    Suggest { query: SuggestQuery },
    /// Outlinks and backlinks for one note.
    Links { note_id: String },
    /// Diagnostic escape hatch: run a raw statement against the store.
    Exec {
        statement: String,
        #[serde(default)]
        params: Vec<JsonValue>,
    },
    /// Close all stores and stop the engine task.
    Shutdown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    pub text: String,
    #[serde(default)]
    pub scope: SearchScope,
    /// Result cap; non-finite or non-positive values fall back to the
    /// engine default.
    #[serde(default)]
    pub limit: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestQuery {
    pub text: String,
    #[serde(default)]
    pub limit: Option<f64>,
}

/// Engine-to-host messages. Every request eventually yields exactly one
/// terminal `Result` or `Error`; `Ready` and `Progress` are notifications
/// interleaved before the terminal message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Emitted once per vault on the first successful store open; carries
    /// the adopted backend's identity.
    Ready { vault_id: String, backend: String },
    /// Rebuild progress for the correlated request.
    Progress {
        id: u64,
        vault_id: String,
        indexed: usize,
        total: usize,
    },
    /// Terminal success. Payload shape depends on the operation; `null`
    /// when the operation has nothing to report.
    Result {
        id: u64,
        vault_id: String,
        payload: JsonValue,
    },
    /// Terminal failure, mutually exclusive with `Result`.
    Error {
        id: u64,
        vault_id: String,
        message: String,
    },
}

impl Response {
    /// Correlation id, when the message is tied to a request.
    pub fn request_id(&self) -> Option<u64> {
        match self {
            Self::Ready { .. } => None,
            Self::Progress { id, .. } | Self::Result { id, .. } | Self::Error { id, .. } => {
                Some(*id)
            }
        }
    }

    /// Whether this message terminates its request.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Result { .. } | Self::Error { .. })
    }
}

/// Payload of a `links` result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinksPayload {
    pub path: String,
    pub outlinks: Vec<String>,
    pub backlinks: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_envelope_shape() {
        let json = r#"{
            "id": 7,
            "vault_id": "v1",
            "type": "search",
            "query": { "text": "alpha", "scope": "title", "limit": 10 }
        }"#;

        let request: Request = serde_json::from_str(json).unwrap();
        assert_eq!(request.id, 7);
        match request.op {
            Operation::Search { query } => {
                assert_eq!(query.text, "alpha");
                assert_eq!(query.scope, SearchScope::Title);
                assert_eq!(query.limit, Some(10.0));
            }
            other => panic!("unexpected op: {other:?}"),
        }
    }

    #[test]
    fn test_query_defaults() {
        let json = r#"{"id": 1, "vault_id": "v", "type": "search", "query": {"text": "x"}}"#;
        let request: Request = serde_json::from_str(json).unwrap();

        match request.op {
            Operation::Search { query } => {
                assert_eq!(query.scope, SearchScope::Full);
                assert_eq!(query.limit, None);
            }
            other => panic!("unexpected op: {other:?}"),
        }
    }

    #[test]
    fn test_response_tagging() {
        let response = Response::Progress {
            id: 3,
            vault_id: "v1".to_string(),
            indexed: 100,
            total: 250,
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["type"], "progress");
        assert_eq!(json["indexed"], 100);
        assert!(!response.is_terminal());
        assert_eq!(response.request_id(), Some(3));
    }

    #[test]
    fn test_ready_has_no_request_id() {
        let response = Response::Ready {
            vault_id: "v1".to_string(),
            backend: "sqlite-file".to_string(),
        };
        assert_eq!(response.request_id(), None);
        assert!(!response.is_terminal());
    }
}
