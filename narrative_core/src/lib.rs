//! # Narrative Core
//!
//! Keeps an LLM-driven story coherent within a bounded input window. This
//! crate stores the conversation, decides which messages survive when the log
//! overflows, and picks the slice of history the model sees on each turn.
//!
//! ## Core Components
//!
//! - **message**: Messages and their per-message metadata
//! - **context_store**: Bounded log with relevance and retention scoring
//! - **config**: Store bounds and injectable scoring tables, loadable from TOML
//! - **session**: Glue between the store and `game_rules`' state machine
//!
//! ## Design Philosophy
//!
//! - **Pure**: No network or disk I/O on the hot path; the model client lives elsewhere
//! - **Content-agnostic**: Important entities, quest terms and map adjacency are injected
//! - **Typed outcomes**: Illegal or invalid transitions are values, never panics

pub mod config;
pub mod context_store;
pub mod message;
pub mod session;

pub use config::*;
pub use context_store::*;
pub use message::*;
pub use session::*;
