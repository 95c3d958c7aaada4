//! Entity definitions for the session snapshot.

mod character;

pub use character::*;
