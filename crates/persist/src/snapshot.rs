use crate::store::StoreError;
use gridturn_common::{MAX_VIEW_RADIUS, Player, Position, Tile};
use gridturn_kernel::{GameEvent, Metadata, SpatialIndex, State, TurnGroups, WorldGrid};
use serde::{Deserialize, Serialize};

/// A player flattened out of the spatial index together with its position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    #[serde(flatten)]
    pub player: Player,
    pub position: Position,
}

/// On-disk layout of one named save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveDocument {
    pub metadata: Metadata,
    pub turn: u64,
    pub turn_groups: TurnGroups,
    pub tiles: Vec<Vec<Tile>>,
    pub players: Vec<PlayerRecord>,
    pub event_log: Vec<GameEvent>,
}

impl SaveDocument {
    /// Capture the full state. Players are written in index order.
    pub fn capture(state: &State) -> Self {
        let players = state
            .players
            .entries()
            .map(|(_, player, position)| PlayerRecord {
                player: player.clone(),
                position,
            })
            .collect();
        Self {
            metadata: state.metadata.clone(),
            turn: state.turn,
            turn_groups: state.turn_groups.clone(),
            tiles: state.grid.rows().to_vec(),
            players,
            event_log: state.event_log.clone(),
        }
    }

    /// Rebuild a State, replaying every player into a fresh index.
    pub fn restore(self) -> Result<State, StoreError> {
        let grid = WorldGrid::from_rows(self.tiles)
            .ok_or_else(|| StoreError::Corrupt("tile grid is not square".into()))?;
        if grid.size() != self.metadata.world_size {
            return Err(StoreError::Corrupt(format!(
                "tile grid has size {}, metadata says {}",
                grid.size(),
                self.metadata.world_size
            )));
        }

        let mut players = SpatialIndex::new();
        for PlayerRecord { player, position } in self.players {
            if !grid.contains(position) {
                return Err(StoreError::Corrupt(format!(
                    "player {} at {position} lies outside the world",
                    player.id
                )));
            }
            if player.view_radius > MAX_VIEW_RADIUS {
                return Err(StoreError::Corrupt(format!(
                    "player {} has view radius {}, limit is {MAX_VIEW_RADIUS}",
                    player.id, player.view_radius
                )));
            }
            if players.contains(&player.id) {
                return Err(StoreError::Corrupt(format!("duplicate player id {}", player.id)));
            }
            players
                .set(player.id.clone(), player, position)
                .map_err(|e| StoreError::Corrupt(e.to_string()))?;
        }

        if let Some((_, id)) = self.turn_groups.queued().find(|(_, id)| !players.contains(id)) {
            return Err(StoreError::Corrupt(format!("turn groups reference unknown player {id}")));
        }

        Ok(State {
            metadata: self.metadata,
            turn: self.turn,
            turn_groups: self.turn_groups,
            grid,
            players,
            event_log: self.event_log,
        })
    }
}
