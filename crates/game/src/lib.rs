//! Front-end entry points over the gridturn engine.
//!
//! # Invariants
//! - Every entry point takes the State it works on explicitly, or loads it
//!   by save name; nothing is held between calls.
//! - Structural batch errors are raised before any action runs.
//! - A batch with a save name is persisted even when an atomic batch aborts,
//!   so effects applied before the failure are not lost.

use gridturn_common::{ConfigError, GameConfig, Position};
use gridturn_kernel::{
    ActionKind, BatchError, BatchReport, DefaultGenerator, Engine, ExecutionConfig, PlayerAction, State,
    StateError, WorldGenerator, init_state, parse_batch,
};
use gridturn_persist::{SaveStore, StoreError};
use gridturn_render::{GlyphTable, RenderError, Renderer, TextViewRenderer, TileCatalog, Viewer};
use std::fmt::Write;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Batch(#[from] BatchError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    State(#[from] StateError),
}

/// The engine with its configuration, save directory and glyph table.
#[derive(Debug, Clone)]
pub struct Game<G = TileCatalog> {
    config: GameConfig,
    store: SaveStore,
    engine: Engine,
    renderer: TextViewRenderer<G>,
}

impl Game {
    /// Game with the built-in glyph table.
    pub fn new(config: GameConfig) -> Result<Self, GameError> {
        Self::with_glyphs(config, TileCatalog::default())
    }
}

impl<G: GlyphTable> Game<G> {
    pub fn with_glyphs(config: GameConfig, glyphs: G) -> Result<Self, GameError> {
        config.validate()?;
        Ok(Self {
            store: SaveStore::new(&config.save_dir),
            engine: Engine::from_config(&config),
            renderer: TextViewRenderer::new(glyphs, config.distance_function),
            config,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn store(&self) -> &SaveStore {
        &self.store
    }

    /// New world from the default generator.
    pub fn init(&self) -> Result<State, GameError> {
        self.init_with(&DefaultGenerator)
    }

    pub fn init_with(&self, generator: &dyn WorldGenerator) -> Result<State, GameError> {
        Ok(init_state(&self.config, generator)?)
    }

    pub fn save(&self, state: &State, name: &str) -> Result<PathBuf, GameError> {
        Ok(self.store.save(state, name)?)
    }

    pub fn load(&self, name: &str) -> Result<State, GameError> {
        Ok(self.store.load(name)?)
    }

    /// Run parsed actions against `state`, then save it if `exec` names a
    /// save. An aborted atomic batch is saved before its error is returned.
    pub fn execute_batch(
        &self,
        state: &mut State,
        actions: &[PlayerAction],
        exec: &ExecutionConfig,
    ) -> Result<BatchReport, GameError> {
        let outcome = self.engine.run_batch(state, actions, exec);
        if let Some(name) = &exec.save_name {
            match &outcome {
                Ok(_) => {
                    self.store.save(state, name)?;
                }
                Err(BatchError::Aborted { index, .. }) => {
                    tracing::warn!(save = %name, index, "saving state of aborted batch");
                    self.store.save(state, name)?;
                }
                Err(_) => {}
            }
        }
        Ok(outcome?)
    }

    /// Load `save_name`, run a JSON batch against it and return the new
    /// state with the report.
    ///
    /// The batch is parsed in full before the save is touched.
    pub fn execute_json(
        &self,
        save_name: &str,
        actions_json: &str,
        exec: &ExecutionConfig,
    ) -> Result<(State, BatchReport), GameError> {
        let actions = parse_batch(actions_json)?;
        let mut state = self.load(save_name)?;
        let report = self.execute_batch(&mut state, &actions, exec)?;
        Ok((state, report))
    }

    /// Render the view of `player_id` in a saved game. `None` or the
    /// spectator id renders every player.
    pub fn render_view(&self, save_name: &str, player_id: Option<&str>) -> Result<String, GameError> {
        let state = self.load(save_name)?;
        self.render_state(&state, player_id)
    }

    pub fn render_state(&self, state: &State, player_id: Option<&str>) -> Result<String, GameError> {
        Ok(self.renderer.render(state, &Viewer::from_arg(player_id))?)
    }

    /// Describe the tile at `pos` in a saved game, and who stands on it.
    pub fn inspect(&self, save_name: &str, pos: Position) -> Result<String, GameError> {
        let state = self.load(save_name)?;
        let mut out = match state.grid.get(pos) {
            Some(tile) => format!("{pos}: {}", self.renderer.glyphs().describe(tile)),
            None => format!("{pos}: outside the world"),
        };
        if let Some(player) = state.players.get_at(pos) {
            let _ = write!(out, "\noccupied by {} ({})", player.name, player.id);
        }
        Ok(out)
    }

    /// Dry-run previews of a JSON batch against a saved game.
    pub fn explain(&self, save_name: &str, actions_json: &str) -> Result<Vec<String>, GameError> {
        let actions = parse_batch(actions_json)?;
        let state = self.load(save_name)?;
        Ok(self.engine.explain(&state, &actions))
    }

    /// Human-readable list of action kinds and their parameters.
    pub fn describe_actions(&self) -> String {
        let mut out = String::new();
        for kind in ActionKind::ALL {
            let _ = writeln!(out, "{kind}: {}", kind.description());
            for param in kind.params() {
                let required = if param.required { "required" } else { "optional" };
                let _ = writeln!(
                    out,
                    "  {} ({}, {required}): {}",
                    param.name,
                    param.kind.name(),
                    param.description
                );
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_config_is_rejected() {
        let config = GameConfig {
            world_size: 0,
            ..GameConfig::default()
        };
        assert!(matches!(Game::new(config), Err(GameError::Config(_))));
    }

    #[test]
    fn describe_actions_lists_move() {
        let game = Game::new(GameConfig::default()).unwrap();
        let text = game.describe_actions();
        assert!(text.starts_with("move: "));
        assert!(text.contains("  x (number, required): target x coordinate"));
        assert!(text.contains("  y (number, required)"));
    }
}
