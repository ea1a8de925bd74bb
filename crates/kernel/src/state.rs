use crate::event::{Effect, GameEvent, QueueOp};
use crate::grid::WorldGrid;
use crate::index::{IndexError, SpatialIndex};
use crate::turns::TurnGroups;
use gridturn_common::{GameConfig, MAX_VIEW_RADIUS, Player, PlayerId, Position, ResourceKind};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Version of the persisted state layout.
pub const SCHEMA_VERSION: u32 = 1;

/// Errors raised while mutating state.
///
/// Effects come from vetted executors, so any of these during effect
/// application means the state and the event disagree.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error(transparent)]
    Index(#[from] IndexError),
    #[error("unknown entity {0}")]
    UnknownEntity(PlayerId),
    #[error("entity {entity} has no {resource} pool")]
    MissingResource {
        entity: PlayerId,
        resource: ResourceKind,
    },
    #[error("spatial index rejected moving {entity} to {to}")]
    MoveRejected { entity: PlayerId, to: Position },
    #[error("turn group {queue_index} does not contain {player}")]
    NotQueued { queue_index: usize, player: PlayerId },
    #[error("entity {entity} at {at} lies outside the world")]
    OffGrid { entity: PlayerId, at: Position },
    #[error("entity {entity} has view radius {radius}, limit is {MAX_VIEW_RADIUS}")]
    ViewRadius { entity: PlayerId, radius: u32 },
}

/// Descriptive data fixed when the world is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub schema_version: u32,
    pub world_size: u32,
    /// Unix milliseconds at creation.
    pub created: String,
    /// Seed for the turn-order shuffle.
    pub seed: u32,
}

/// The aggregate root: everything that makes up one game.
///
/// A `State` is owned by exactly one execution context at a time and is
/// passed explicitly into every operation. After initialization it changes
/// only through [`State::apply`].
#[derive(Debug, Clone)]
pub struct State {
    pub metadata: Metadata,
    pub turn: u64,
    pub turn_groups: TurnGroups,
    pub grid: WorldGrid,
    pub players: SpatialIndex<Player>,
    pub event_log: Vec<GameEvent>,
}

impl State {
    /// An empty world: no tiles, no players, turn 0.
    pub fn new(config: &GameConfig) -> Self {
        let created = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default()
            .to_string();
        Self {
            metadata: Metadata {
                schema_version: SCHEMA_VERSION,
                world_size: config.world_size,
                created,
                seed: config.seed,
            },
            turn: 0,
            turn_groups: TurnGroups::new(),
            grid: WorldGrid::empty(),
            players: SpatialIndex::new(),
            event_log: Vec::new(),
        }
    }

    /// Ids of every player, in index order.
    pub fn player_ids(&self) -> Vec<PlayerId> {
        self.players.ids().cloned().collect()
    }

    /// Apply one effect.
    pub fn apply(&mut self, effect: &Effect) -> Result<(), StateError> {
        match effect {
            Effect::MoveEntity { entity_id, to, .. } => {
                if !self.players.contains(entity_id) {
                    return Err(StateError::UnknownEntity(entity_id.clone()));
                }
                if !self.players.move_to(entity_id, *to) {
                    return Err(StateError::MoveRejected {
                        entity: entity_id.clone(),
                        to: *to,
                    });
                }
            }
            Effect::AlterResource {
                entity_id,
                resource,
                field,
                delta,
            } => {
                let player = self
                    .players
                    .get_mut(entity_id)
                    .ok_or_else(|| StateError::UnknownEntity(entity_id.clone()))?;
                let stat = player
                    .resource_mut(*resource)
                    .ok_or_else(|| StateError::MissingResource {
                        entity: entity_id.clone(),
                        resource: *resource,
                    })?;
                *stat.field_mut(*field) += delta;
            }
            Effect::UpdateQueue {
                queue_index,
                operation,
                player_id,
            } => match operation {
                QueueOp::Append => self.turn_groups.append(*queue_index, player_id.clone()),
                QueueOp::Remove => {
                    if !self.turn_groups.remove(*queue_index, player_id) {
                        return Err(StateError::NotQueued {
                            queue_index: *queue_index,
                            player: player_id.clone(),
                        });
                    }
                }
            },
            Effect::SetTurn { turn } => self.turn = *turn,
        }
        Ok(())
    }

    /// Apply an event's effects in order, then append it to the log.
    ///
    /// All or nothing: if any effect fails, the parts effects touch are
    /// rolled back and the event is not logged.
    pub fn commit(&mut self, event: GameEvent) -> Result<&GameEvent, StateError> {
        let players = self.players.clone();
        let turn_groups = self.turn_groups.clone();
        let turn = self.turn;
        for effect in &event.effects {
            tracing::trace!(%effect, "applying effect");
            if let Err(e) = self.apply(effect) {
                self.players = players;
                self.turn_groups = turn_groups;
                self.turn = turn;
                return Err(e);
            }
        }
        self.event_log.push(event);
        Ok(&self.event_log[self.event_log.len() - 1])
    }

    /// Check every player against the grid bounds and the view radius limit.
    pub fn check_placement(&self) -> Result<(), StateError> {
        for (id, player, position) in self.players.entries() {
            if !self.grid.contains(position) {
                return Err(StateError::OffGrid {
                    entity: id.clone(),
                    at: position,
                });
            }
            if player.view_radius > MAX_VIEW_RADIUS {
                return Err(StateError::ViewRadius {
                    entity: id.clone(),
                    radius: player.view_radius,
                });
            }
        }
        Ok(())
    }
}
