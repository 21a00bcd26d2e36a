//! Note link graph: token extraction from markdown and resolution of
//! human-typed references to canonical note paths.
//!
//! Resolution is keyed on an ephemeral [`KeyMap`] built from a snapshot of
//! the current note set; it is never persisted and is rebuilt whenever
//! resolution is needed.

pub mod extract;
pub mod keymap;

pub use extract::extract_link_tokens;
pub use keymap::{KeyMap, normalize_key};
