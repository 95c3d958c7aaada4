//! # Game Rules
//!
//! The rules side of a narrative session: the world snapshot and the guarded
//! state machine that decides which game mode changes are legal. Free-text
//! player input never reaches this crate directly; it only sees opaque action
//! names produced by an external classifier. This crate contains no AI logic.

pub mod entities;
pub mod error;
pub mod state_machine;
pub mod world_state;

pub use entities::*;
pub use error::*;
pub use state_machine::*;
pub use world_state::*;
