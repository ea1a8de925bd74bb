//! Persistence: named JSON save documents for the aggregate game state.
//!
//! # Invariants
//! - A load either returns a complete, consistent State or an error.
//! - The spatial index is rebuilt by replaying insertions, so a document
//!   with two players on one tile is rejected.
//! - Schema version mismatches fail closed.

pub mod snapshot;
pub mod store;

pub use snapshot::{PlayerRecord, SaveDocument};
pub use store::{SaveStore, StoreError};
