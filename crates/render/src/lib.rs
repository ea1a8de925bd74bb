//! Rendering Adapter: text views derived from game state.
//!
//! # Invariants
//! - Renderers read state and never mutate it.
//! - The same state and viewer always render to identical output.
//! - A player's visible area has the shape of the configured distance
//!   metric: a diamond under taxicab, a disc under Euclidean.

mod glyphs;
mod view;

pub use glyphs::{GlyphTable, TileCatalog, TileInfo};
pub use view::{RenderError, Renderer, SPECTATOR, TextViewRenderer, Viewer};
