//! Event engine: turn legality, executor invocation, logging and effect
//! application for batches of player actions.
//!
//! Actions resolve one at a time in submission order. The effects of action
//! N are applied before legality for action N+1 is checked.

use crate::actions::{Action, ActionKind};
use crate::event::{Effect, EventStamp, GameEvent, SystemOperation};
use crate::state::{State, StateError};
use crate::turns::{self, TurnOrdering};
use gridturn_common::{DistanceMetric, GameConfig, PlayerId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Errors that abort a batch.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("malformed action batch: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("action batch must be a JSON array")]
    NotAnArray,
    #[error("action {index} rejected: {reason}")]
    Structural { index: usize, reason: String },
    #[error("batch aborted at action {index}: {reason}")]
    Aborted { index: usize, reason: String },
    #[error(transparent)]
    State(#[from] StateError),
}

/// Per-batch execution options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExecutionConfig {
    /// Stop at the first failed player action. Earlier effects stay applied.
    pub atomic: bool,
    pub ordering: TurnOrdering,
    /// Save to persist to once the batch finishes.
    pub save_name: Option<String>,
}

/// One validated entry of an action batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerAction {
    pub player_id: PlayerId,
    pub action: Action,
}

impl PlayerAction {
    pub fn new(player_id: impl Into<String>, action: Action) -> Self {
        Self {
            player_id: PlayerId::new(player_id),
            action,
        }
    }
}

/// Parse and validate a JSON action batch.
///
/// Every element is checked before any is returned; one bad element rejects
/// the whole batch.
pub fn parse_batch(json: &str) -> Result<Vec<PlayerAction>, BatchError> {
    let value: Value = serde_json::from_str(json)?;
    parse_batch_value(&value)
}

pub fn parse_batch_value(value: &Value) -> Result<Vec<PlayerAction>, BatchError> {
    let Value::Array(items) = value else {
        return Err(BatchError::NotAnArray);
    };
    items
        .iter()
        .enumerate()
        .map(|(index, item)| parse_entry(item).map_err(|reason| BatchError::Structural { index, reason }))
        .collect()
}

fn parse_entry(item: &Value) -> Result<PlayerAction, String> {
    let entry = item.as_object().ok_or("expected an object")?;

    let kind_name = entry
        .get("type")
        .and_then(Value::as_str)
        .ok_or("missing string field 'type'")?;
    let kind = ActionKind::from_name(kind_name).ok_or_else(|| format!("unknown action type '{kind_name}'"))?;

    let player_id = match entry.get("playerId").and_then(Value::as_str) {
        Some(id) if !id.is_empty() => id,
        _ => return Err("missing string field 'playerId'".into()),
    };

    let empty = Map::new();
    let params = match entry.get("params") {
        Some(Value::Object(params)) => params,
        None | Some(Value::Null) => &empty,
        Some(_) => return Err("field 'params' must be an object".into()),
    };

    let action = Action::from_params(kind, params)?;
    Ok(PlayerAction::new(player_id, action))
}

/// Outcome of a completed batch: one player-action event per submitted
/// action, in submission order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub events: Vec<GameEvent>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.events.iter().filter(|e| e.success).count()
    }

    pub fn failed(&self) -> usize {
        self.events.len() - self.succeeded()
    }
}

/// Deal fresh turn groups and record the assignment in the log.
pub(crate) fn assign_turn_groups(state: &mut State) -> Result<(), StateError> {
    let effects = turns::assignment_effects(state);
    let event = GameEvent::system(
        EventStamp::now(state.turn),
        SystemOperation::AssignTurnGroups,
        effects,
        None,
    );
    state.commit(event)?;
    tracing::debug!(turn = state.turn, groups = ?state.turn_groups, "turn groups assigned");
    Ok(())
}

/// Drives [`State`] transitions. Holds only the rules; the state is passed
/// into every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct Engine {
    metric: DistanceMetric,
}

impl Engine {
    pub fn new(metric: DistanceMetric) -> Self {
        Self { metric }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(config.distance_function)
    }

    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// Start the next turn if every turn group is empty. Returns whether the
    /// turn advanced.
    ///
    /// The advance event sets the turn counter and carries the world tick's
    /// effects; a second system event deals new turn groups.
    pub fn advance_turn_if_exhausted(&self, state: &mut State) -> Result<bool, StateError> {
        if !state.turn_groups.is_exhausted() {
            return Ok(false);
        }
        let next = state.turn + 1;
        let mut effects = vec![Effect::SetTurn { turn: next }];
        effects.extend(turns::world_tick_effects(state));
        state.commit(GameEvent::system(
            EventStamp::now(next),
            SystemOperation::AdvanceTurn,
            effects,
            None,
        ))?;
        tracing::info!(turn = next, "turn advanced");
        assign_turn_groups(state)?;
        Ok(true)
    }

    /// Resolve a single action and return its player-action event.
    ///
    /// Rejections (out of turn, failed preconditions) come back as failed
    /// events. `Err` means an effect could not be applied.
    pub fn submit(
        &self,
        state: &mut State,
        submitted: &PlayerAction,
        ordering: TurnOrdering,
    ) -> Result<GameEvent, StateError> {
        self.advance_turn_if_exhausted(state)?;

        let actor = &submitted.player_id;
        if !state.turn_groups.is_turn_of(actor, ordering) {
            let event = GameEvent::action_failed(
                EventStamp::now(state.turn),
                actor.clone(),
                submitted.action.clone(),
                format!("out of turn: {actor} may not act now under {ordering} ordering"),
            );
            tracing::warn!(player = %actor, "action out of turn");
            return Ok(state.commit(event)?.clone());
        }

        let event = submitted
            .action
            .execute(state, actor, self.metric, EventStamp::now(state.turn));
        let succeeded = event.success;
        match &event.error {
            Some(error) => tracing::warn!(player = %actor, kind = %submitted.action.kind(), %error, "action failed"),
            None => tracing::debug!(
                player = %actor,
                kind = %submitted.action.kind(),
                effects = event.effects.len(),
                "action succeeded"
            ),
        }
        let event = state.commit(event)?.clone();

        if let Some((operation, effects)) = turns::bookkeeping_effects(state, actor, succeeded) {
            state.commit(GameEvent::system(
                EventStamp::now(state.turn),
                operation,
                effects,
                Some(json!({ "playerId": actor })),
            ))?;
        }
        Ok(event)
    }

    /// Resolve a batch in order.
    ///
    /// In atomic mode the first failed action stops the batch with
    /// [`BatchError::Aborted`]; effects already applied are kept.
    pub fn run_batch(
        &self,
        state: &mut State,
        actions: &[PlayerAction],
        exec: &ExecutionConfig,
    ) -> Result<BatchReport, BatchError> {
        let _span = tracing::info_span!(
            "batch",
            actions = actions.len(),
            atomic = exec.atomic,
            ordering = %exec.ordering
        )
        .entered();

        let mut report = BatchReport::default();
        for (index, submitted) in actions.iter().enumerate() {
            let event = self.submit(state, submitted, exec.ordering)?;
            if exec.atomic && !event.success {
                let reason = event.error.unwrap_or_default();
                tracing::warn!(index, %reason, "atomic batch aborted");
                return Err(BatchError::Aborted { index, reason });
            }
            report.events.push(event);
        }

        tracing::info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            turn = state.turn,
            "batch complete"
        );
        Ok(report)
    }

    /// Preview each action against the current state without changing it.
    pub fn explain(&self, state: &State, actions: &[PlayerAction]) -> Vec<String> {
        actions
            .iter()
            .map(|a| {
                format!(
                    "{}: {}",
                    a.player_id,
                    a.action.anticipated_effects(state, &a.player_id, self.metric)
                )
            })
            .collect()
    }
}
