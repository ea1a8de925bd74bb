//! Turn scheduling: who may act, in which order, and when a turn ends.
//!
//! A turn is active while any turn group still holds a player id and is
//! exhausted once every group is empty. On exhaustion the engine bumps the
//! turn counter, runs the world tick and deals out new turn groups.

use crate::event::{Effect, QueueOp, SystemOperation};
use crate::rng::Lcg;
use crate::state::State;
use gridturn_common::PlayerId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How strictly turn order is enforced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnOrdering {
    /// Only the player at the front of a group may act.
    #[default]
    Strict,
    /// Any player still queued in any group may act.
    Lenient,
}

impl fmt::Display for TurnOrdering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Strict => "strict",
            Self::Lenient => "lenient",
        })
    }
}

/// Ordered FIFO buckets of player ids eligible to act this turn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TurnGroups(Vec<Vec<PlayerId>>);

impl TurnGroups {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_buckets(buckets: Vec<Vec<PlayerId>>) -> Self {
        Self(buckets)
    }

    pub fn buckets(&self) -> &[Vec<PlayerId>] {
        &self.0
    }

    /// True once every bucket is empty.
    pub fn is_exhausted(&self) -> bool {
        self.0.iter().all(Vec::is_empty)
    }

    /// Index of the bucket holding `id`.
    pub fn bucket_of(&self, id: &PlayerId) -> Option<usize> {
        self.0.iter().position(|q| q.contains(id))
    }

    pub fn contains(&self, id: &PlayerId) -> bool {
        self.bucket_of(id).is_some()
    }

    pub fn is_at_front(&self, id: &PlayerId) -> bool {
        self.0.iter().any(|q| q.first() == Some(id))
    }

    /// Whether `id` may act now under the given ordering.
    pub fn is_turn_of(&self, id: &PlayerId, ordering: TurnOrdering) -> bool {
        match ordering {
            TurnOrdering::Strict => self.is_at_front(id),
            TurnOrdering::Lenient => self.contains(id),
        }
    }

    /// All queued ids, bucket by bucket.
    pub fn queued(&self) -> impl Iterator<Item = (usize, &PlayerId)> {
        self.0
            .iter()
            .enumerate()
            .flat_map(|(i, q)| q.iter().map(move |id| (i, id)))
    }

    /// Append to a bucket, creating empty buckets up to `index` as needed.
    pub(crate) fn append(&mut self, index: usize, id: PlayerId) {
        if self.0.len() <= index {
            self.0.resize_with(index + 1, Vec::new);
        }
        self.0[index].push(id);
    }

    /// Remove the first occurrence of `id` from a bucket.
    pub(crate) fn remove(&mut self, index: usize, id: &PlayerId) -> bool {
        let Some(queue) = self.0.get_mut(index) else {
            return false;
        };
        match queue.iter().position(|q| q == id) {
            Some(at) => {
                queue.remove(at);
                true
            }
            None => false,
        }
    }
}

/// Shuffle `ids` with the LCG seeded for this turn.
pub fn shuffled(mut ids: Vec<PlayerId>, world_seed: u32, turn: u64) -> Vec<PlayerId> {
    Lcg::for_turn(world_seed, turn).shuffle(&mut ids);
    ids
}

/// Effects that deal out fresh turn groups: every player, shuffled, in a
/// single bucket.
///
/// Anything still queued is removed first. Partitioning players across
/// several buckets is not implemented; bucket 0 is the only one ever filled.
pub fn assignment_effects(state: &State) -> Vec<Effect> {
    let mut effects: Vec<Effect> = state
        .turn_groups
        .queued()
        .map(|(queue_index, id)| Effect::UpdateQueue {
            queue_index,
            operation: QueueOp::Remove,
            player_id: id.clone(),
        })
        .collect();

    let ids: Vec<PlayerId> = state.players.ids().cloned().collect();
    let order = shuffled(ids, state.metadata.seed, state.turn);
    effects.extend(order.into_iter().map(|player_id| Effect::UpdateQueue {
        queue_index: 0,
        operation: QueueOp::Append,
        player_id,
    }));
    effects
}

/// Per-turn world update run between turns. Structure upkeep and similar
/// world-tick logic would emit its effects here; there is none yet.
pub fn world_tick_effects(_state: &State) -> Vec<Effect> {
    Vec::new()
}

/// Queue bookkeeping after a player action resolves.
///
/// A successful actor with movement or action left goes to the back of its
/// bucket; a depleted or failed actor leaves the queue for the rest of the
/// turn. Returns `None` if the actor is not queued.
pub fn bookkeeping_effects(
    state: &State,
    actor: &PlayerId,
    succeeded: bool,
) -> Option<(SystemOperation, Vec<Effect>)> {
    let queue_index = state.turn_groups.bucket_of(actor)?;
    let remove = Effect::UpdateQueue {
        queue_index,
        operation: QueueOp::Remove,
        player_id: actor.clone(),
    };
    let retains = state
        .players
        .get(actor)
        .is_some_and(|p| p.has_remaining());

    if succeeded && retains {
        let append = Effect::UpdateQueue {
            queue_index,
            operation: QueueOp::Append,
            player_id: actor.clone(),
        };
        Some((SystemOperation::MoveToBackOfQueue, vec![remove, append]))
    } else {
        Some((SystemOperation::RemoveFromQueue, vec![remove]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<PlayerId> {
        names.iter().map(|n| PlayerId::from(*n)).collect()
    }

    #[test]
    fn empty_groups_are_exhausted() {
        assert!(TurnGroups::new().is_exhausted());
        assert!(TurnGroups::from_buckets(vec![vec![], vec![]]).is_exhausted());
        assert!(!TurnGroups::from_buckets(vec![vec![], ids(&["a"])]).is_exhausted());
    }

    #[test]
    fn strict_requires_front_of_queue() {
        let g = TurnGroups::from_buckets(vec![ids(&["a", "b"])]);
        assert!(g.is_turn_of(&"a".into(), TurnOrdering::Strict));
        assert!(!g.is_turn_of(&"b".into(), TurnOrdering::Strict));
        assert!(!g.is_turn_of(&"zed".into(), TurnOrdering::Strict));
    }

    #[test]
    fn lenient_accepts_anyone_queued() {
        let g = TurnGroups::from_buckets(vec![ids(&["a"]), ids(&["b", "c"])]);
        assert!(g.is_turn_of(&"c".into(), TurnOrdering::Lenient));
        assert!(g.is_turn_of(&"a".into(), TurnOrdering::Lenient));
        assert!(!g.is_turn_of(&"zed".into(), TurnOrdering::Lenient));
    }

    #[test]
    fn append_grows_buckets() {
        let mut g = TurnGroups::new();
        g.append(2, "a".into());
        assert_eq!(g.buckets().len(), 3);
        assert_eq!(g.bucket_of(&"a".into()), Some(2));
    }

    #[test]
    fn remove_reports_absence() {
        let mut g = TurnGroups::from_buckets(vec![ids(&["a", "b"])]);
        assert!(g.remove(0, &"a".into()));
        assert!(!g.remove(0, &"a".into()));
        assert!(!g.remove(5, &"b".into()));
        assert_eq!(g.buckets()[0], ids(&["b"]));
    }

    #[test]
    fn shuffle_for_seed_12345_is_stable() {
        let first = shuffled(ids(&["a", "b", "c"]), 12345, 0);
        for _ in 0..10 {
            assert_eq!(shuffled(ids(&["a", "b", "c"]), 12345, 0), first);
        }
        assert_eq!(first, ids(&["b", "c", "a"]));
    }

    #[test]
    fn shuffle_varies_with_turn() {
        let names: Vec<String> = (0..16).map(|i| format!("p{i}")).collect();
        let all: Vec<PlayerId> = names.iter().map(|n| PlayerId::from(n.as_str())).collect();
        let orders: std::collections::HashSet<Vec<PlayerId>> =
            (0..5).map(|t| shuffled(all.clone(), 1, t)).collect();
        assert!(orders.len() > 1);
    }
}
