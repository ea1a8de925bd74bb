//! Shared vocabulary for the gridturn engine: positions, players, tiles,
//! distance metrics and game configuration.
//!
//! # Invariants
//! - Every type here is plain data; no type in this crate owns world state.
//! - Serialized field names are stable; they form part of the save format.

pub mod config;
pub mod distance;
pub mod types;

pub use config::{ConfigError, GameConfig};
pub use distance::DistanceMetric;
pub use types::{MAX_VIEW_RADIUS, Player, PlayerId, Position, ResourceKind, Stat, StatField, Tile, TileKind};
