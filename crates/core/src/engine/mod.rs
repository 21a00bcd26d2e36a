//! Asynchronous request/response boundary around the index.
//!
//! The host talks to one [`Engine`] task over channels: requests go in
//! through an [`EngineHandle`], responses come back on a single event
//! stream correlated by request id. Requests are processed strictly in
//! arrival order; every request yields exactly one terminal `result` or
//! `error`, with `ready` and `progress` notifications interleaved.

pub mod dispatch;
pub mod protocol;

pub use dispatch::{Engine, EngineClosed, EngineError, EngineHandle};
pub use protocol::{
    LinksPayload, Operation, Request, Response, SearchQuery, SuggestQuery,
};
