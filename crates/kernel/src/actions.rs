//! Action registry: parameter schemas, dry-run previews and validating
//! executors.
//!
//! Every action kind is a variant of the closed [`Action`] union with a
//! typed payload. Untyped JSON parameter maps are accepted only by
//! [`Action::from_params`], which converts them immediately after schema
//! validation. Executors read the [`State`] and return a complete
//! [`GameEvent`]; they never mutate anything.

use crate::event::{Effect, EventStamp, GameEvent};
use crate::state::State;
use gridturn_common::{DistanceMetric, PlayerId, Position, ResourceKind, StatField};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Primitive type of an action parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Number,
    Boolean,
}

impl ParamType {
    pub fn name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
        }
    }

    fn matches(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
        }
    }
}

/// Declared parameter of an action kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSchema {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: ParamType,
    pub required: bool,
}

/// Registered action kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Move,
}

impl ActionKind {
    pub const ALL: [ActionKind; 1] = [ActionKind::Move];

    /// Wire name used in action batches.
    pub fn name(self) -> &'static str {
        match self {
            Self::Move => "move",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Move => MoveAction.description(),
        }
    }

    pub fn params(self) -> &'static [ParamSchema] {
        match self {
            Self::Move => MoveAction.params(),
        }
    }

    /// Check a raw parameter map against this kind's schema.
    pub fn validate_params(self, params: &Map<String, Value>) -> Result<(), String> {
        for schema in self.params() {
            match params.get(schema.name) {
                None | Some(Value::Null) if schema.required => {
                    return Err(format!("missing required parameter '{}'", schema.name));
                }
                None | Some(Value::Null) => {}
                Some(value) if !schema.kind.matches(value) => {
                    return Err(format!(
                        "parameter '{}' must be a {}, got {value}",
                        schema.name,
                        schema.kind.name()
                    ));
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveParams {
    pub x: i32,
    pub y: i32,
}

impl MoveParams {
    pub fn target(self) -> Position {
        Position::new(self.x, self.y)
    }
}

/// A validated action with its typed payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "params", rename_all = "lowercase")]
pub enum Action {
    Move(MoveParams),
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Move(_) => ActionKind::Move,
        }
    }

    /// Validate a raw parameter map against the schema and convert it.
    pub fn from_params(kind: ActionKind, params: &Map<String, Value>) -> Result<Self, String> {
        kind.validate_params(params)?;
        match kind {
            ActionKind::Move => Ok(Action::Move(MoveParams {
                x: coordinate(params, "x")?,
                y: coordinate(params, "y")?,
            })),
        }
    }

    /// Human-readable preview of what executing this action would do.
    pub fn anticipated_effects(&self, state: &State, actor: &PlayerId, metric: DistanceMetric) -> String {
        match self {
            Action::Move(params) => MoveAction.anticipated_effects(state, actor, params, metric),
        }
    }

    /// Validate domain preconditions and build the resulting event.
    pub fn execute(
        &self,
        state: &State,
        actor: &PlayerId,
        metric: DistanceMetric,
        stamp: EventStamp,
    ) -> GameEvent {
        match self {
            Action::Move(params) => MoveAction.execute(state, actor, params, metric, stamp),
        }
    }
}

/// Integral number parameter that fits a world coordinate.
fn coordinate(params: &Map<String, Value>, name: &str) -> Result<i32, String> {
    let value = params
        .get(name)
        .ok_or_else(|| format!("missing required parameter '{name}'"))?;
    let whole = match value.as_i64() {
        Some(n) => n,
        None => match value.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() <= i32::MAX as f64 => f as i64,
            _ => return Err(format!("parameter '{name}' must be an integer, got {value}")),
        },
    };
    i32::try_from(whole).map_err(|_| format!("parameter '{name}' out of range: {whole}"))
}

/// Behaviour shared by every registered action kind.
pub trait ActionDefinition {
    type Params;

    fn description(&self) -> &'static str;

    fn params(&self) -> &'static [ParamSchema];

    /// Non-mutating preview for dry runs and explanations.
    fn anticipated_effects(
        &self,
        state: &State,
        actor: &PlayerId,
        params: &Self::Params,
        metric: DistanceMetric,
    ) -> String;

    /// Re-validate domain preconditions and return a fully formed event:
    /// zero effects on failure, the complete ordered effect list on success.
    fn execute(
        &self,
        state: &State,
        actor: &PlayerId,
        params: &Self::Params,
        metric: DistanceMetric,
        stamp: EventStamp,
    ) -> GameEvent;
}

/// Move to an unoccupied tile in absolute world coordinates, paying the
/// distance in movement points.
#[derive(Debug, Clone, Copy, Default)]
pub struct MoveAction;

const MOVE_PARAMS: &[ParamSchema] = &[
    ParamSchema {
        name: "x",
        description: "target x coordinate",
        kind: ParamType::Number,
        required: true,
    },
    ParamSchema {
        name: "y",
        description: "target y coordinate",
        kind: ParamType::Number,
        required: true,
    },
];

impl ActionDefinition for MoveAction {
    type Params = MoveParams;

    fn description(&self) -> &'static str {
        "move to an (unoccupied) tile in absolute world coordinates, consuming movement points"
    }

    fn params(&self) -> &'static [ParamSchema] {
        MOVE_PARAMS
    }

    fn anticipated_effects(
        &self,
        state: &State,
        actor: &PlayerId,
        params: &MoveParams,
        metric: DistanceMetric,
    ) -> String {
        let Some(start) = state.players.position(actor) else {
            return format!("{actor} is not in the world; nothing would happen");
        };
        let target = params.target();
        let cost = metric.distance(start, target);
        format!("Move from {start} to {target} - distance: {cost}")
    }

    fn execute(
        &self,
        state: &State,
        actor: &PlayerId,
        params: &MoveParams,
        metric: DistanceMetric,
        stamp: EventStamp,
    ) -> GameEvent {
        let action = Action::Move(*params);
        let target = params.target();

        let (Some(player), Some(start)) = (state.players.get(actor), state.players.position(actor))
        else {
            return GameEvent::action_failed(stamp, actor.clone(), action, format!("unknown player {actor}"));
        };

        let cost = metric.distance(start, target);
        let available = player.balance(ResourceKind::Movement);
        if cost > available {
            return GameEvent::action_failed(
                stamp,
                actor.clone(),
                action,
                format!("insufficient movement points: need {cost}, have {available}"),
            );
        }

        if let Some(occupant) = state.players.id_at(target) {
            if occupant != actor {
                return GameEvent::action_failed(
                    stamp,
                    actor.clone(),
                    action,
                    format!("target tile {target} is occupied by {occupant}"),
                );
            }
        }

        if !state.grid.contains(target) {
            return GameEvent::action_failed(
                stamp,
                actor.clone(),
                action,
                format!("target tile {target} is outside the world"),
            );
        }

        let effects = vec![
            Effect::MoveEntity {
                entity_id: actor.clone(),
                from: start,
                to: target,
            },
            Effect::AlterResource {
                entity_id: actor.clone(),
                resource: ResourceKind::Movement,
                field: StatField::Current,
                delta: -cost,
            },
        ];
        GameEvent::action_succeeded(stamp, actor.clone(), action, effects)
    }
}
