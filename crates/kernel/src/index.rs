use gridturn_common::{PlayerId, Position};
use std::collections::{BTreeMap, HashMap};

/// Errors from spatial index insertion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IndexError {
    #[error("position {pos} is already occupied by {occupant}")]
    Occupied { pos: Position, occupant: PlayerId },
}

/// Bidirectional entity-id ↔ position map enforcing single occupancy.
///
/// Id-keyed maps are BTreeMaps so [`SpatialIndex::entries`] has a canonical
/// order on every platform; the reverse map is a HashMap for constant-time
/// occupancy checks.
///
/// # Invariants
/// - At most one id per position.
/// - `entities`, `positions` and `occupants` always describe the same id set,
///   and `occupants` is the exact inverse of `positions`.
#[derive(Debug, Clone)]
pub struct SpatialIndex<T> {
    entities: BTreeMap<PlayerId, T>,
    positions: BTreeMap<PlayerId, Position>,
    occupants: HashMap<Position, PlayerId>,
}

impl<T> Default for SpatialIndex<T> {
    fn default() -> Self {
        Self {
            entities: BTreeMap::new(),
            positions: BTreeMap::new(),
            occupants: HashMap::new(),
        }
    }
}

impl<T> SpatialIndex<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entity, or replace and relocate an existing one.
    ///
    /// The id's stale position mapping is evicted first. Fails without
    /// mutation if `pos` is held by a different id.
    pub fn set(&mut self, id: PlayerId, entity: T, pos: Position) -> Result<(), IndexError> {
        if let Some(occupant) = self.occupants.get(&pos) {
            if *occupant != id {
                return Err(IndexError::Occupied {
                    pos,
                    occupant: occupant.clone(),
                });
            }
        }
        if let Some(old) = self.positions.get(&id) {
            self.occupants.remove(old);
        }
        self.occupants.insert(pos, id.clone());
        self.positions.insert(id.clone(), pos);
        self.entities.insert(id, entity);
        Ok(())
    }

    /// Relocate an existing entity. Returns false, with no mutation, if the
    /// id is unknown or `new_pos` is occupied by a different id.
    pub fn move_to(&mut self, id: &PlayerId, new_pos: Position) -> bool {
        let Some(old) = self.positions.get(id).copied() else {
            return false;
        };
        match self.occupants.get(&new_pos) {
            Some(occupant) if occupant == id => return true,
            Some(_) => return false,
            None => {}
        }
        self.occupants.remove(&old);
        self.occupants.insert(new_pos, id.clone());
        self.positions.insert(id.clone(), new_pos);
        true
    }

    /// Entity standing at a position.
    pub fn get_at(&self, pos: Position) -> Option<&T> {
        self.occupants.get(&pos).and_then(|id| self.entities.get(id))
    }

    /// Id of the entity standing at a position.
    pub fn id_at(&self, pos: Position) -> Option<&PlayerId> {
        self.occupants.get(&pos)
    }

    pub fn get(&self, id: &PlayerId) -> Option<&T> {
        self.entities.get(id)
    }

    /// Mutable access to the entity. Position cannot be changed through this.
    pub fn get_mut(&mut self, id: &PlayerId) -> Option<&mut T> {
        self.entities.get_mut(id)
    }

    pub fn position(&self, id: &PlayerId) -> Option<Position> {
        self.positions.get(id).copied()
    }

    /// Remove an entity. Returns it together with its last position.
    pub fn remove(&mut self, id: &PlayerId) -> Option<(T, Position)> {
        let pos = self.positions.remove(id)?;
        self.occupants.remove(&pos);
        let entity = self.entities.remove(id)?;
        Some((entity, pos))
    }

    pub fn is_occupied(&self, pos: Position) -> bool {
        self.occupants.contains_key(&pos)
    }

    pub fn contains(&self, id: &PlayerId) -> bool {
        self.entities.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Ids in index order.
    pub fn ids(&self) -> impl Iterator<Item = &PlayerId> {
        self.entities.keys()
    }

    /// All (id, entity, position) triples in index order.
    ///
    /// The returned iterator borrows the index, so it cannot be mutated
    /// while the sequence is consumed.
    pub fn entries(&self) -> impl Iterator<Item = (&PlayerId, &T, Position)> {
        self.entities.iter().filter_map(|(id, entity)| {
            self.positions.get(id).map(|pos| (id, entity, *pos))
        })
    }

    /// Verify that the three maps form a bijection over occupied ids.
    pub fn check_consistency(&self) -> Result<(), String> {
        if self.entities.len() != self.positions.len() {
            return Err(format!(
                "{} entities but {} positions",
                self.entities.len(),
                self.positions.len()
            ));
        }
        if self.positions.len() != self.occupants.len() {
            return Err(format!(
                "{} positions but {} occupied cells",
                self.positions.len(),
                self.occupants.len()
            ));
        }
        for (id, pos) in &self.positions {
            if !self.entities.contains_key(id) {
                return Err(format!("{id} has a position but no entity"));
            }
            match self.occupants.get(pos) {
                Some(occupant) if occupant == id => {}
                Some(occupant) => {
                    return Err(format!("{id} at {pos} but cell records {occupant}"));
                }
                None => return Err(format!("{id} at {pos} but cell is empty")),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> PlayerId {
        PlayerId::from(s)
    }

    #[test]
    fn set_and_lookup_both_ways() {
        let mut idx = SpatialIndex::new();
        idx.set(id("a"), 1, Position::new(2, 3)).unwrap();
        assert_eq!(idx.get(&id("a")), Some(&1));
        assert_eq!(idx.get_at(Position::new(2, 3)), Some(&1));
        assert_eq!(idx.position(&id("a")), Some(Position::new(2, 3)));
        assert!(idx.is_occupied(Position::new(2, 3)));
        idx.check_consistency().unwrap();
    }

    #[test]
    fn set_relocates_and_evicts_stale_cell() {
        let mut idx = SpatialIndex::new();
        idx.set(id("a"), 1, Position::new(0, 0)).unwrap();
        idx.set(id("a"), 2, Position::new(5, 5)).unwrap();
        assert!(!idx.is_occupied(Position::new(0, 0)));
        assert_eq!(idx.get_at(Position::new(5, 5)), Some(&2));
        assert_eq!(idx.len(), 1);
        idx.check_consistency().unwrap();
    }

    #[test]
    fn set_refuses_cell_held_by_other_id() {
        let mut idx = SpatialIndex::new();
        idx.set(id("a"), 1, Position::new(0, 0)).unwrap();
        let err = idx.set(id("b"), 2, Position::new(0, 0)).unwrap_err();
        assert_eq!(
            err,
            IndexError::Occupied {
                pos: Position::new(0, 0),
                occupant: id("a")
            }
        );
        assert!(!idx.contains(&id("b")));
        idx.check_consistency().unwrap();
    }

    #[test]
    fn move_into_occupied_cell_fails_without_mutation() {
        let mut idx = SpatialIndex::new();
        idx.set(id("a"), 1, Position::new(0, 0)).unwrap();
        idx.set(id("b"), 2, Position::new(1, 0)).unwrap();
        assert!(!idx.move_to(&id("b"), Position::new(0, 0)));
        assert_eq!(idx.position(&id("b")), Some(Position::new(1, 0)));
        assert_eq!(idx.id_at(Position::new(0, 0)), Some(&id("a")));
        idx.check_consistency().unwrap();
    }

    #[test]
    fn move_unknown_id_fails() {
        let mut idx: SpatialIndex<u8> = SpatialIndex::new();
        assert!(!idx.move_to(&id("ghost"), Position::new(0, 0)));
        assert!(idx.is_empty());
    }

    #[test]
    fn move_onto_own_cell_is_noop_success() {
        let mut idx = SpatialIndex::new();
        idx.set(id("a"), 1, Position::new(4, 4)).unwrap();
        assert!(idx.move_to(&id("a"), Position::new(4, 4)));
        idx.check_consistency().unwrap();
    }

    #[test]
    fn move_frees_old_cell() {
        let mut idx = SpatialIndex::new();
        idx.set(id("a"), 1, Position::new(0, 0)).unwrap();
        assert!(idx.move_to(&id("a"), Position::new(0, 1)));
        assert!(!idx.is_occupied(Position::new(0, 0)));
        assert_eq!(idx.get_at(Position::new(0, 1)), Some(&1));
        idx.check_consistency().unwrap();
    }

    #[test]
    fn remove_clears_all_maps() {
        let mut idx = SpatialIndex::new();
        idx.set(id("a"), 1, Position::new(0, 0)).unwrap();
        assert_eq!(idx.remove(&id("a")), Some((1, Position::new(0, 0))));
        assert!(idx.remove(&id("a")).is_none());
        assert!(!idx.is_occupied(Position::new(0, 0)));
        idx.check_consistency().unwrap();
    }

    #[test]
    fn entries_are_in_id_order() {
        let mut idx = SpatialIndex::new();
        for (i, name) in ["c", "a", "b"].iter().enumerate() {
            idx.set(id(name), i, Position::new(i as i32, 0)).unwrap();
        }
        let order: Vec<&str> = idx.entries().map(|(id, _, _)| id.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn bijection_survives_mixed_operations() {
        let mut idx = SpatialIndex::new();
        for i in 0..20 {
            idx.set(id(&format!("p{i}")), i, Position::new(i, -i)).unwrap();
        }
        for i in 0..20 {
            // half of these collide with a neighbour's cell and must fail
            let target = Position::new((i + 1) % 20, -((i + 1) % 20));
            let _ = idx.move_to(&id(&format!("p{i}")), target);
            let _ = idx.move_to(&id(&format!("p{i}")), Position::new(i, 100 + i));
            idx.check_consistency().unwrap();
        }
        for i in (0..20).step_by(3) {
            idx.remove(&id(&format!("p{i}")));
            idx.check_consistency().unwrap();
        }
        let mut seen = std::collections::HashSet::new();
        for (_, _, pos) in idx.entries() {
            assert!(seen.insert(pos), "duplicate position {pos}");
        }
    }
}
