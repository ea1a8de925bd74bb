use crate::engine;
use crate::grid::WorldGrid;
use crate::state::{State, StateError};
use gridturn_common::{GameConfig, Player, Position, ResourceKind, Tile, TileKind};

/// Populates an empty [`State`] with its initial tiles and players.
///
/// Implemented for plain closures so tests can inject fixtures:
///
/// ```
/// use gridturn_common::{GameConfig, Player, Position, Tile, TileKind};
/// use gridturn_kernel::{State, StateError, WorldGrid, init_state};
///
/// let config = GameConfig { world_size: 5, ..GameConfig::default() };
/// let state = init_state(&config, &|s: &mut State, _: &GameConfig| -> Result<(), StateError> {
///     s.grid = WorldGrid::filled(5, Tile::new(TileKind::Water, 0.0));
///     let p = Player::new("solo", "solo", 's', 2);
///     s.players.set(p.id.clone(), p, Position::ORIGIN)?;
///     Ok(())
/// })
/// .unwrap();
/// assert_eq!(state.players.len(), 1);
/// ```
pub trait WorldGenerator {
    fn populate(&self, state: &mut State, config: &GameConfig) -> Result<(), StateError>;
}

impl<F> WorldGenerator for F
where
    F: Fn(&mut State, &GameConfig) -> Result<(), StateError>,
{
    fn populate(&self, state: &mut State, config: &GameConfig) -> Result<(), StateError> {
        self(state, config)
    }
}

/// Stock world: grassland everywhere, one forest at (2, 2), and a single
/// player `player-0` at the origin with the configured default pools.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultGenerator;

impl WorldGenerator for DefaultGenerator {
    fn populate(&self, state: &mut State, config: &GameConfig) -> Result<(), StateError> {
        state.grid = WorldGrid::filled(config.world_size, Tile::new(TileKind::Grassland, 1.0));
        state
            .grid
            .set(Position::new(2, 2), Tile::new(TileKind::Forest, 1.0));

        let player = Player::new("player-0", "player 0", '@', config.default_view_distance)
            .with_resource(ResourceKind::Action, config.default_action_points)
            .with_resource(ResourceKind::Movement, config.default_movement_points);
        state
            .players
            .set(player.id.clone(), player, Position::ORIGIN)?;
        Ok(())
    }
}

/// Create a world: run the generator, then deal the first turn groups.
///
/// A generator that leaves the grid unassigned gets a grid of null tiles
/// sized from the config. Players placed off the grid, or with a view
/// radius over the limit, are an error.
pub fn init_state(config: &GameConfig, generator: &dyn WorldGenerator) -> Result<State, StateError> {
    let mut state = State::new(config);
    generator.populate(&mut state, config)?;
    if state.grid.size() == 0 {
        state.grid = WorldGrid::filled(config.world_size, Tile::new(TileKind::Null, 0.0));
    }
    state.metadata.world_size = state.grid.size();
    state.check_placement()?;
    engine::assign_turn_groups(&mut state)?;
    tracing::info!(
        world_size = state.metadata.world_size,
        players = state.players.len(),
        "world initialized"
    );
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(state: &State, pos: Position) -> TileKind {
        state.grid.get(pos).map(|t| t.kind).unwrap()
    }

    #[test]
    fn default_world_layout() {
        let config = GameConfig::default();
        let state = init_state(&config, &DefaultGenerator).unwrap();
        assert_eq!(state.grid.size(), 100);
        assert_eq!(kind(&state, Position::new(2, 2)), TileKind::Forest);
        assert_eq!(kind(&state, Position::new(1, 1)), TileKind::Grassland);

        let p = state.players.get(&"player-0".into()).unwrap();
        assert_eq!(p.glyph, '@');
        assert_eq!(p.view_radius, 20);
        assert_eq!(p.balance(ResourceKind::Movement), 20.0);
        assert_eq!(p.balance(ResourceKind::Action), 1.0);
        assert_eq!(state.players.position(&p.id), Some(Position::ORIGIN));
    }

    #[test]
    fn init_deals_one_bucket_with_everyone() {
        let config = GameConfig {
            world_size: 9,
            ..GameConfig::default()
        };
        let generator = |s: &mut State, _: &GameConfig| -> Result<(), StateError> {
            for i in 0..4 {
                let p = Player::new(format!("p{i}"), "p", 'p', 1);
                s.players.set(p.id.clone(), p, Position::new(i, 0))?;
            }
            Ok(())
        };
        let state = init_state(&config, &generator).unwrap();
        assert_eq!(state.turn_groups.buckets().len(), 1);
        assert_eq!(state.turn_groups.buckets()[0].len(), 4);
        assert_eq!(state.event_log.len(), 1);
        // no grid from the generator: null tiles of configured size
        assert_eq!(state.grid.size(), 9);
        assert_eq!(kind(&state, Position::ORIGIN), TileKind::Null);
    }

    #[test]
    fn generator_errors_propagate() {
        let config = GameConfig::default();
        let generator = |s: &mut State, _: &GameConfig| -> Result<(), StateError> {
            let a = Player::new("a", "a", 'a', 1);
            let b = Player::new("b", "b", 'b', 1);
            s.players.set(a.id.clone(), a, Position::ORIGIN)?;
            s.players.set(b.id.clone(), b, Position::ORIGIN)?;
            Ok(())
        };
        assert!(matches!(
            init_state(&config, &generator),
            Err(StateError::Index(_))
        ));
    }

    #[test]
    fn player_off_the_grid_is_rejected() {
        let config = GameConfig::default();
        let generator = |s: &mut State, c: &GameConfig| -> Result<(), StateError> {
            s.grid = WorldGrid::filled(c.world_size, Tile::new(TileKind::Grassland, 1.0));
            let p = Player::new("far", "far", 'f', 1);
            s.players.set(p.id.clone(), p, Position::new(500, 500))?;
            Ok(())
        };
        assert!(matches!(
            init_state(&config, &generator),
            Err(StateError::OffGrid { .. })
        ));
    }

    #[test]
    fn oversized_view_radius_is_rejected() {
        let config = GameConfig::default();
        let generator = |s: &mut State, _: &GameConfig| -> Result<(), StateError> {
            let p = Player::new("eye", "eye", 'e', u32::MAX);
            s.players.set(p.id.clone(), p, Position::ORIGIN)?;
            Ok(())
        };
        assert!(matches!(
            init_state(&config, &generator),
            Err(StateError::ViewRadius { .. })
        ));
    }
}
