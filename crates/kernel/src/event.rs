use crate::actions::Action;
use gridturn_common::{PlayerId, Position, ResourceKind, StatField};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Queue edit carried by [`Effect::UpdateQueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueOp {
    Append,
    Remove,
}

/// An atomic state mutation. Effects are produced by action executors and
/// the turn scheduler, and are the only way the engine changes a [`State`].
///
/// [`State`]: crate::State
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Effect {
    /// Relocate an entity in the spatial index.
    #[serde(rename_all = "camelCase")]
    MoveEntity {
        entity_id: PlayerId,
        from: Position,
        to: Position,
    },
    /// Add a signed delta to one field of a resource pool. Never clamped.
    #[serde(rename_all = "camelCase")]
    AlterResource {
        entity_id: PlayerId,
        resource: ResourceKind,
        field: StatField,
        delta: f64,
    },
    /// Append a player to, or remove a player from, one turn group.
    #[serde(rename_all = "camelCase")]
    UpdateQueue {
        queue_index: usize,
        operation: QueueOp,
        player_id: PlayerId,
    },
    /// Set the turn counter to an absolute value.
    SetTurn { turn: u64 },
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::MoveEntity { entity_id, from, to } => {
                write!(f, "move {entity_id} {from} -> {to}")
            }
            Effect::AlterResource {
                entity_id,
                resource,
                field,
                delta,
            } => {
                let field = match field {
                    StatField::Current => "current",
                    StatField::Max => "max",
                };
                write!(f, "{entity_id} {}.{field} {delta:+}", resource.name())
            }
            Effect::UpdateQueue {
                queue_index,
                operation,
                player_id,
            } => match operation {
                QueueOp::Append => write!(f, "append {player_id} to queue {queue_index}"),
                QueueOp::Remove => write!(f, "remove {player_id} from queue {queue_index}"),
            },
            Effect::SetTurn { turn } => write!(f, "set turn {turn}"),
        }
    }
}

/// Operation tag of a system event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SystemOperation {
    AdvanceTurn,
    AssignTurnGroups,
    RemoveFromQueue,
    MoveToBackOfQueue,
}

/// What produced an event: a player's action or the engine itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    #[serde(rename_all = "camelCase")]
    PlayerAction { player_id: PlayerId, action: Action },
    System {
        operation: SystemOperation,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        details: Option<serde_json::Value>,
    },
}

/// Identity of an event: id, turn and wall-clock time of creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventStamp {
    pub id: String,
    pub turn: u64,
    pub timestamp: String,
}

impl EventStamp {
    /// Stamp a new event for the given turn with a fresh id and the current time.
    pub fn now(turn: u64) -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            turn,
            timestamp: millis.to_string(),
        }
    }
}

/// An immutable record in the append-only event log.
///
/// Failed events always carry zero effects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameEvent {
    pub id: String,
    pub turn: u64,
    pub timestamp: String,
    pub effects: Vec<Effect>,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl GameEvent {
    /// A successful player action carrying the effects that realize it.
    pub fn action_succeeded(
        stamp: EventStamp,
        player_id: PlayerId,
        action: Action,
        effects: Vec<Effect>,
    ) -> Self {
        Self {
            id: stamp.id,
            turn: stamp.turn,
            timestamp: stamp.timestamp,
            effects,
            success: true,
            error: None,
            kind: EventKind::PlayerAction { player_id, action },
        }
    }

    /// A rejected player action. Carries no effects.
    pub fn action_failed(
        stamp: EventStamp,
        player_id: PlayerId,
        action: Action,
        error: impl Into<String>,
    ) -> Self {
        Self {
            id: stamp.id,
            turn: stamp.turn,
            timestamp: stamp.timestamp,
            effects: Vec::new(),
            success: false,
            error: Some(error.into()),
            kind: EventKind::PlayerAction { player_id, action },
        }
    }

    /// An engine-issued event.
    pub fn system(
        stamp: EventStamp,
        operation: SystemOperation,
        effects: Vec<Effect>,
        details: Option<serde_json::Value>,
    ) -> Self {
        Self {
            id: stamp.id,
            turn: stamp.turn,
            timestamp: stamp.timestamp,
            effects,
            success: true,
            error: None,
            kind: EventKind::System { operation, details },
        }
    }

    pub fn is_player_action(&self) -> bool {
        matches!(self.kind, EventKind::PlayerAction { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::MoveParams;

    fn stamp() -> EventStamp {
        EventStamp {
            id: "evt-1".into(),
            turn: 3,
            timestamp: "0".into(),
        }
    }

    #[test]
    fn failed_event_has_no_effects() {
        let e = GameEvent::action_failed(
            stamp(),
            PlayerId::from("p"),
            Action::Move(MoveParams { x: 1, y: 0 }),
            "nope",
        );
        assert!(!e.success);
        assert!(e.effects.is_empty());
        assert_eq!(e.error.as_deref(), Some("nope"));
    }

    #[test]
    fn player_action_event_json_shape() {
        let e = GameEvent::action_succeeded(
            stamp(),
            PlayerId::from("p"),
            Action::Move(MoveParams { x: 1, y: 0 }),
            vec![Effect::MoveEntity {
                entity_id: PlayerId::from("p"),
                from: Position::new(0, 0),
                to: Position::new(1, 0),
            }],
        );
        let v = serde_json::to_value(&e).unwrap();
        assert_eq!(v["type"], "PLAYER_ACTION");
        assert_eq!(v["playerId"], "p");
        assert_eq!(v["action"]["type"], "move");
        assert_eq!(v["action"]["params"]["x"], 1);
        assert_eq!(v["effects"][0]["type"], "MOVE_ENTITY");
        assert_eq!(v["effects"][0]["entityId"], "p");
        assert!(v.get("error").is_none());

        let back: GameEvent = serde_json::from_value(v).unwrap();
        assert_eq!(back, e);
    }

    #[test]
    fn system_event_json_shape() {
        let e = GameEvent::system(
            stamp(),
            SystemOperation::AdvanceTurn,
            vec![Effect::SetTurn { turn: 4 }],
            None,
        );
        let v = serde_json::to_value(&e).unwrap();
        assert_eq!(v["type"], "SYSTEM");
        assert_eq!(v["operation"], "ADVANCE_TURN");
        assert_eq!(v["effects"][0]["turn"], 4);
        let back: GameEvent = serde_json::from_value(v).unwrap();
        assert_eq!(back, e);
    }

    #[test]
    fn effect_display_is_readable() {
        let e = Effect::AlterResource {
            entity_id: PlayerId::from("p"),
            resource: ResourceKind::Movement,
            field: StatField::Current,
            delta: -3.0,
        };
        assert_eq!(e.to_string(), "p movement.current -3");
    }

    #[test]
    fn stamps_are_unique() {
        assert_ne!(EventStamp::now(0).id, EventStamp::now(0).id);
    }
}
