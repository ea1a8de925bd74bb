use crate::view::RenderError;
use gridturn_common::{Tile, TileKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Display lookup for tiles and structures.
pub trait GlyphTable {
    fn tile_glyph(&self, kind: TileKind) -> char;

    /// Glyph for a structure type, if the table knows it.
    fn structure_glyph(&self, _structure: &str) -> Option<char> {
        None
    }

    /// One-line description of a tile, e.g. for an inspect command.
    fn describe(&self, tile: &Tile) -> String;
}

/// Display attributes of one tile or structure type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileInfo {
    pub glyph: char,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// What a tile's numeric value means, or `None` when it means nothing.
    #[serde(default)]
    pub value_label: Option<String>,
}

impl TileInfo {
    fn new(glyph: char, name: &str, description: &str, value_label: Option<&str>) -> Self {
        Self {
            glyph,
            name: name.to_string(),
            description: description.to_string(),
            value_label: value_label.map(str::to_string),
        }
    }
}

/// Table of tile and structure display data.
///
/// The built-in table covers every [`TileKind`]. A YAML file may override
/// any subset of it:
///
/// ```yaml
/// tiles:
///   water: { glyph: "=", name: lake }
/// structures:
///   farm: { glyph: "F", name: farm, description: grows food }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileCatalog {
    pub tiles: BTreeMap<TileKind, TileInfo>,
    pub structures: BTreeMap<String, TileInfo>,
}

impl Default for TileCatalog {
    fn default() -> Self {
        let richness = Some("richness");
        let tiles = BTreeMap::from([
            (
                TileKind::Grassland,
                TileInfo::new(
                    '.',
                    "grassland",
                    "can be foraged for food equal to the tile's richness, or turned into a farm",
                    richness,
                ),
            ),
            (
                TileKind::Desert,
                TileInfo::new(':', "desert", "dry and barren; slow to cross", None),
            ),
            (
                TileKind::Mountain,
                TileInfo::new('^', "mountain", "high ground that can be mined", richness),
            ),
            (
                TileKind::Water,
                TileInfo::new('~', "water", "open water", None),
            ),
            (
                TileKind::Forest,
                TileInfo::new(
                    'T',
                    "forest",
                    "can be harvested for timber equal to the tile's richness",
                    richness,
                ),
            ),
            (
                TileKind::Ore,
                TileInfo::new('*', "ore", "a vein of ore", richness),
            ),
            (
                TileKind::Null,
                TileInfo::new(
                    ' ',
                    "null",
                    "this tile exists off the edge of the earth, and is inaccessible",
                    None,
                ),
            ),
        ]);
        Self {
            tiles,
            structures: BTreeMap::new(),
        }
    }
}

impl TileCatalog {
    /// Built-in table with the entries from `text` layered on top.
    pub fn from_yaml_str(text: &str) -> Result<Self, RenderError> {
        let overrides: TileCatalog = serde_yaml::from_str(text)?;
        let mut catalog = Self::default();
        catalog.tiles.extend(overrides.tiles);
        catalog.structures.extend(overrides.structures);
        Ok(catalog)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, RenderError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| RenderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_yaml_str(&text)?;
        tracing::debug!(path = %path.display(), structures = catalog.structures.len(), "glyph table loaded");
        Ok(catalog)
    }

    pub fn info(&self, kind: TileKind) -> Option<&TileInfo> {
        self.tiles.get(&kind)
    }
}

impl GlyphTable for TileCatalog {
    fn tile_glyph(&self, kind: TileKind) -> char {
        self.info(kind).map_or(' ', |info| info.glyph)
    }

    fn structure_glyph(&self, structure: &str) -> Option<char> {
        self.structures.get(structure).map(|info| info.glyph)
    }

    fn describe(&self, tile: &Tile) -> String {
        let Some(info) = self.info(tile.kind) else {
            return format!("{:?}", tile.kind).to_lowercase();
        };
        match &info.value_label {
            Some(label) => format!("{} ({label} {}): {}", info.name, tile.value, info.description),
            None => format!("{}: {}", info.name, info.description),
        }
    }
}
