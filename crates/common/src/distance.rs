use crate::types::Position;
use serde::{Deserialize, Serialize};

/// Distance metric used for both movement cost and view masking.
///
/// Switching the metric changes gameplay cost and the shape of every
/// player's visible area together: a diamond under taxicab, a disc under
/// Euclidean.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// `|dx| + |dy|`
    #[default]
    #[serde(rename = "manhattan", alias = "taxicab")]
    Taxicab,
    /// `sqrt(dx² + dy²)`
    Euclidean,
}

impl DistanceMetric {
    /// Distance between two positions. Symmetric and non-negative.
    pub fn distance(self, a: Position, b: Position) -> f64 {
        let dx = (i64::from(a.x) - i64::from(b.x)) as f64;
        let dy = (i64::from(a.y) - i64::from(b.y)) as f64;
        match self {
            Self::Taxicab => dx.abs() + dy.abs(),
            Self::Euclidean => (dx * dx + dy * dy).sqrt(),
        }
    }

    /// Whether `b` lies within `range` of `a` (inclusive).
    pub fn within(self, a: Position, b: Position, range: f64) -> bool {
        self.distance(a, b) <= range
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Taxicab => "manhattan",
            Self::Euclidean => "euclidean",
        }
    }
}
