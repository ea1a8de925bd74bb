use crate::glyphs::{GlyphTable, TileCatalog};
use gridturn_common::{DistanceMetric, MAX_VIEW_RADIUS, PlayerId, Position};
use gridturn_kernel::State;
use std::fmt::Write;
use std::path::PathBuf;

/// Viewer id that selects the all-players view.
pub const SPECTATOR: &str = "spectator";

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("no player with id {0}")]
    UnknownPlayer(PlayerId),
    #[error("player {player} has view radius {radius}, limit is {MAX_VIEW_RADIUS}")]
    ViewRadius { player: PlayerId, radius: u32 },
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("glyph table YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Who a view is rendered for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Viewer {
    Player(PlayerId),
    /// Every player's view, in index order.
    Spectator,
}

impl Viewer {
    /// `None` and the spectator sentinel both select the spectator view.
    pub fn from_arg(id: Option<&str>) -> Self {
        match id {
            None | Some(SPECTATOR) => Viewer::Spectator,
            Some(id) => Viewer::Player(PlayerId::new(id)),
        }
    }
}

/// Renderer-agnostic interface.
///
/// The renderer reads game state and a viewer, then produces output. It never
/// mutates the state.
pub trait Renderer {
    type Output;

    fn render(&self, state: &State, viewer: &Viewer) -> Result<Self::Output, RenderError>;
}

/// ASCII map of what a player can see.
///
/// Each view is a header line `Player: <id>`, a blank line, then
/// `2r+1` rows of `2r+1` glyphs centered on the player, north at the top.
#[derive(Debug, Clone, Default)]
pub struct TextViewRenderer<G = TileCatalog> {
    glyphs: G,
    metric: DistanceMetric,
}

impl<G: GlyphTable> TextViewRenderer<G> {
    pub fn new(glyphs: G, metric: DistanceMetric) -> Self {
        Self { glyphs, metric }
    }

    pub fn glyphs(&self) -> &G {
        &self.glyphs
    }

    /// Glyph at one visible cell: player, then structure, then tile.
    fn glyph_at(&self, state: &State, pos: Position) -> char {
        if let Some(player) = state.players.get_at(pos) {
            return player.glyph;
        }
        // TODO: consult structure_glyph once State tracks structures.
        match state.grid.get(pos) {
            Some(tile) => self.glyphs.tile_glyph(tile.kind),
            None => ' ',
        }
    }

    fn map_for(&self, state: &State, center: Position, radius: u32) -> String {
        let r = radius.min(MAX_VIEW_RADIUS) as i32;
        let mut out = String::new();
        for dy in (-r..=r).rev() {
            for dx in -r..=r {
                match center.offset(dx, dy) {
                    Some(pos) if self.metric.within(center, pos, f64::from(radius)) => {
                        out.push(self.glyph_at(state, pos));
                    }
                    _ => out.push(' '),
                }
            }
            if dy > -r {
                out.push('\n');
            }
        }
        out
    }

    fn player_view(&self, state: &State, id: &PlayerId) -> Result<String, RenderError> {
        let (Some(player), Some(center)) = (state.players.get(id), state.players.position(id)) else {
            return Err(RenderError::UnknownPlayer(id.clone()));
        };
        if player.view_radius > MAX_VIEW_RADIUS {
            return Err(RenderError::ViewRadius {
                player: id.clone(),
                radius: player.view_radius,
            });
        }
        let mut out = String::new();
        let _ = write!(out, "Player: {id}\n\n");
        out.push_str(&self.map_for(state, center, player.view_radius));
        Ok(out)
    }
}

impl<G: GlyphTable> Renderer for TextViewRenderer<G> {
    type Output = String;

    fn render(&self, state: &State, viewer: &Viewer) -> Result<String, RenderError> {
        match viewer {
            Viewer::Player(id) => self.player_view(state, id),
            Viewer::Spectator => {
                let views = state
                    .players
                    .ids()
                    .map(|id| self.player_view(state, id))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(views.join("\n\n"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridturn_common::{GameConfig, Player, Tile, TileKind};
    use gridturn_kernel::{StateError, WorldGrid, init_state};

    fn state(players: &[(&str, Position, u32)]) -> State {
        let config = GameConfig {
            world_size: 15,
            ..GameConfig::default()
        };
        let players: Vec<(String, Position, u32)> =
            players.iter().map(|(id, p, r)| (id.to_string(), *p, *r)).collect();
        init_state(&config, &move |s: &mut State, c: &GameConfig| -> Result<(), StateError> {
            s.grid = WorldGrid::filled(c.world_size, Tile::new(TileKind::Grassland, 1.0));
            s.grid.set(Position::new(1, 1), Tile::new(TileKind::Forest, 1.0));
            for (i, (id, pos, r)) in players.iter().enumerate() {
                let glyph = char::from(b'A' + i as u8);
                let p = Player::new(id.as_str(), id.as_str(), glyph, *r);
                s.players.set(p.id.clone(), p, *pos)?;
            }
            Ok(())
        })
        .unwrap()
    }

    fn renderer(metric: DistanceMetric) -> TextViewRenderer {
        TextViewRenderer::new(TileCatalog::default(), metric)
    }

    #[test]
    fn taxicab_view_is_a_diamond() {
        let s = state(&[("a", Position::ORIGIN, 2)]);
        let out = renderer(DistanceMetric::Taxicab)
            .render(&s, &Viewer::Player("a".into()))
            .unwrap();
        assert_eq!(out, "Player: a\n\n  .  \n ..T \n..A..\n ... \n  .  ");
    }

    #[test]
    fn euclidean_view_is_a_disc() {
        let s = state(&[("a", Position::ORIGIN, 2)]);
        let out = renderer(DistanceMetric::Euclidean)
            .render(&s, &Viewer::Player("a".into()))
            .unwrap();
        // at radius 2 the disc and the diamond cover the same cells
        assert_eq!(out, "Player: a\n\n  .  \n ..T \n..A..\n ... \n  .  ");
        let s = state(&[("a", Position::ORIGIN, 3)]);
        let out = renderer(DistanceMetric::Euclidean)
            .render(&s, &Viewer::Player("a".into()))
            .unwrap();
        let rows: Vec<&str> = out.lines().skip(2).collect();
        assert_eq!(rows[1], " ..... ");
        let out = renderer(DistanceMetric::Taxicab)
            .render(&s, &Viewer::Player("a".into()))
            .unwrap();
        let rows: Vec<&str> = out.lines().skip(2).collect();
        assert_eq!(rows[1], "  ...  ");
    }

    #[test]
    fn view_follows_the_player_and_blanks_off_world() {
        let s = state(&[("a", Position::new(7, 0), 1)]);
        let out = renderer(DistanceMetric::Taxicab)
            .render(&s, &Viewer::Player("a".into()))
            .unwrap();
        // x = 8 lies past the east edge of a 15-wide world
        assert_eq!(out, "Player: a\n\n . \n.A \n . ");
    }

    #[test]
    fn players_drawn_over_tiles() {
        let s = state(&[("a", Position::ORIGIN, 1), ("b", Position::new(0, 1), 1)]);
        let out = renderer(DistanceMetric::Taxicab)
            .render(&s, &Viewer::Player("a".into()))
            .unwrap();
        assert_eq!(out, "Player: a\n\n B \n.A.\n . ");
    }

    #[test]
    fn spectator_renders_everyone_in_index_order() {
        let s = state(&[("b", Position::new(3, 3), 0), ("a", Position::ORIGIN, 0)]);
        let r = renderer(DistanceMetric::Taxicab);
        let out = r.render(&s, &Viewer::Spectator).unwrap();
        assert_eq!(out, "Player: a\n\nB\n\nPlayer: b\n\nA");
        assert_eq!(Viewer::from_arg(None), Viewer::Spectator);
        assert_eq!(Viewer::from_arg(Some(SPECTATOR)), Viewer::Spectator);
    }

    #[test]
    fn unknown_player_is_an_error() {
        let s = state(&[("a", Position::ORIGIN, 1)]);
        let err = renderer(DistanceMetric::Taxicab)
            .render(&s, &Viewer::from_arg(Some("zed")))
            .unwrap_err();
        assert!(matches!(err, RenderError::UnknownPlayer(_)));
    }

    #[test]
    fn rendering_is_pure() {
        let s = state(&[("a", Position::ORIGIN, 4), ("b", Position::new(2, -1), 4)]);
        let r = renderer(DistanceMetric::Euclidean);
        let first = r.render(&s, &Viewer::Spectator).unwrap();
        let second = r.render(&s, &Viewer::Spectator).unwrap();
        assert_eq!(first, second);
        assert_eq!(s.event_log.len(), 1);
    }

    #[test]
    fn view_at_coordinate_limit_blanks_overflowing_cells() {
        let mut s = state(&[("a", Position::ORIGIN, 1)]);
        assert!(s.players.move_to(&"a".into(), Position::new(i32::MAX, 0)));
        let out = renderer(DistanceMetric::Taxicab)
            .render(&s, &Viewer::Player("a".into()))
            .unwrap();
        assert_eq!(out, "Player: a

   
 A 
   ");
    }

    #[test]
    fn oversized_view_radius_is_an_error() {
        let mut s = state(&[("a", Position::ORIGIN, 1)]);
        s.players.get_mut(&"a".into()).unwrap().view_radius = u32::MAX;
        let err = renderer(DistanceMetric::Taxicab)
            .render(&s, &Viewer::Player("a".into()))
            .unwrap_err();
        assert!(matches!(err, RenderError::ViewRadius { .. }));
    }
}
