//! Grid Kernel: authoritative game state, turn scheduling, action execution
//! and the effect log.
//!
//! # Invariants
//! - After initialization, state changes only by applying [`Effect`]s carried
//!   by events appended to the log.
//! - At most one player occupies a position; the index's id and position
//!   maps always agree.
//! - Turn-group shuffles depend only on the world seed and the turn number.
//! - Failed events carry no effects.

pub mod actions;
pub mod engine;
pub mod event;
pub mod grid;
pub mod index;
pub mod rng;
pub mod setup;
pub mod state;
pub mod turns;

pub use actions::{Action, ActionDefinition, ActionKind, MoveAction, MoveParams, ParamSchema, ParamType};
pub use engine::{BatchError, BatchReport, Engine, ExecutionConfig, PlayerAction, parse_batch, parse_batch_value};
pub use event::{Effect, EventKind, EventStamp, GameEvent, QueueOp, SystemOperation};
pub use grid::WorldGrid;
pub use index::{IndexError, SpatialIndex};
pub use rng::Lcg;
pub use setup::{DefaultGenerator, WorldGenerator, init_state};
pub use state::{Metadata, SCHEMA_VERSION, State, StateError};
pub use turns::{TurnGroups, TurnOrdering};
