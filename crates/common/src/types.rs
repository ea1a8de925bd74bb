use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Unique identifier for a player in the world.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

/// World-space integer coordinate. (0, 0) is the center of the world and
/// Y increases upward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Offset this position by a delta. `None` if either axis overflows.
    pub fn offset(self, dx: i32, dy: i32) -> Option<Self> {
        Some(Self {
            x: self.x.checked_add(dx)?,
            y: self.y.checked_add(dy)?,
        })
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Named resource pools carried by every player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Movement,
    Action,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 2] = [ResourceKind::Movement, ResourceKind::Action];

    pub fn name(self) -> &'static str {
        match self {
            Self::Movement => "movement",
            Self::Action => "action",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which half of a [`Stat`] an alteration targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatField {
    Current,
    Max,
}

/// A resource pool: current balance and its nominal maximum.
///
/// Neither field is clamped; deltas may push `current` below zero or above `max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stat {
    pub current: f64,
    pub max: f64,
}

impl Stat {
    /// A full pool.
    pub fn full(max: f64) -> Self {
        Self { current: max, max }
    }

    pub fn field_mut(&mut self, field: StatField) -> &mut f64 {
        match field {
            StatField::Current => &mut self.current,
            StatField::Max => &mut self.max,
        }
    }
}

/// Largest view radius a player or config may carry.
pub const MAX_VIEW_RADIUS: u32 = 1024;

/// A player entity. Position is not stored here; the spatial index owns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub glyph: char,
    pub view_radius: u32,
    pub resources: BTreeMap<ResourceKind, Stat>,
}

impl Player {
    /// Create a player with empty resource pools.
    pub fn new(id: impl Into<String>, name: impl Into<String>, glyph: char, view_radius: u32) -> Self {
        Self {
            id: PlayerId::new(id),
            name: name.into(),
            glyph,
            view_radius,
            resources: BTreeMap::new(),
        }
    }

    /// Builder: attach a full resource pool of the given size.
    pub fn with_resource(mut self, kind: ResourceKind, max: f64) -> Self {
        self.resources.insert(kind, Stat::full(max));
        self
    }

    pub fn resource(&self, kind: ResourceKind) -> Option<&Stat> {
        self.resources.get(&kind)
    }

    pub fn resource_mut(&mut self, kind: ResourceKind) -> Option<&mut Stat> {
        self.resources.get_mut(&kind)
    }

    /// Current balance of a pool, zero if the player has no such pool.
    pub fn balance(&self, kind: ResourceKind) -> f64 {
        self.resource(kind).map_or(0.0, |s| s.current)
    }

    /// Whether the player can still move or act this turn.
    pub fn has_remaining(&self) -> bool {
        self.balance(ResourceKind::Movement) > 0.0 || self.balance(ResourceKind::Action) > 0.0
    }
}

/// Tile variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileKind {
    #[default]
    Grassland,
    Desert,
    Mountain,
    Water,
    Forest,
    Ore,
    Null,
}

impl TileKind {
    pub const ALL: [TileKind; 7] = [
        TileKind::Grassland,
        TileKind::Desert,
        TileKind::Mountain,
        TileKind::Water,
        TileKind::Forest,
        TileKind::Ore,
        TileKind::Null,
    ];
}

/// A single grid cell: its variant plus a variant-specific value (richness, speed, ...).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    #[serde(rename = "type")]
    pub kind: TileKind,
    pub value: f64,
}

impl Tile {
    pub fn new(kind: TileKind, value: f64) -> Self {
        Self { kind, value }
    }
}
