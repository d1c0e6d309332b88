use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Collision behaviour of a wall.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// Always blocks.
    Solid,
    /// No collision; only exists to cancel a `OneWay` of a neighbouring tile.
    Weak,
    /// Blocks unless the body moves along the normal.
    OneWay,
    Ladder,
    /// Top of a ladder: walkable, but can be climbed through.
    LadderTop,
    Water,
}

impl EdgeKind {
    /// Kinds that make a resolution pass irregular.
    pub fn is_conditional(self) -> bool {
        matches!(self, EdgeKind::OneWay | EdgeKind::LadderTop)
    }

    /// Whether an edge of kind `self` and a stored wall of kind `other` annihilate
    /// when they overlap with opposite normals.
    pub fn cancels(self, other: EdgeKind) -> bool {
        use EdgeKind::*;
        self == other
            || matches!(
                (self, other),
                (OneWay, Weak) | (Weak, OneWay) | (LadderTop, Ladder) | (Ladder, LadderTop)
            )
    }
}

/// Stable handle of a wall inside [`crate::walls::Walls`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WallId(pub u32);

/// Handle of a region built for a map.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegionId(pub u32);

/// Relationship between a region and a circle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RegionIntersect {
    Disjoint,
    Intersect,
    Contain,
}

/// Mode chosen for one call of the resolver.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ResolveMode {
    /// Only unconditional walls nearby; shunts are applied as walls are visited.
    Regular,
    /// A `OneWay` or `LadderTop` wall is nearby; blocking walls are re-merged and
    /// pruned before shunting.
    Irregular,
}

/// Summary of one resolver call.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub mode: ResolveMode,
    /// Walls gathered around the body.
    pub gathered: usize,
    /// Shunts actually applied to the position.
    pub shunts: usize,
}

/// Configuration for map build.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Map width in tiles.
    pub grid_width: u32,
    /// Map height in tiles.
    pub grid_height: u32,
    /// Tile width in world units.
    pub tile_width: f32,
    /// Tile height in world units.
    pub tile_height: f32,
    /// Record wall-merge and region-build durations.
    pub enable_timing: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            grid_width: 80,
            grid_height: 60,
            tile_width: 8.0,
            tile_height: 8.0,
            enable_timing: false,
        }
    }
}

impl WorldConfig {
    /// Parse a JSON config; missing fields take their defaults.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Tile sizes must be finite and positive, grid sizes non-zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, v) in [("tile_width", self.tile_width), ("tile_height", self.tile_height)] {
            if !v.is_finite() || v <= 0.0 {
                return Err(ConfigError::Invalid { reason: format!("{name} must be positive, got {v}") });
            }
        }
        for (name, v) in [("grid_width", self.grid_width), ("grid_height", self.grid_height)] {
            if v == 0 {
                return Err(ConfigError::Invalid { reason: format!("{name} must be non-zero") });
            }
        }
        Ok(())
    }

    /// Number of cells on the map.
    pub fn cells(&self) -> usize {
        self.grid_width as usize * self.grid_height as usize
    }
}

/// Counters for a built map.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub tiles: usize,
    pub walls: usize,
    pub regions: usize,
    /// Collinear end-to-end joins.
    pub merges: usize,
    /// Shared boundaries removed.
    pub cancellations: usize,
}

/// Timing breakdown of the last map build.
#[derive(Copy, Clone, Debug, Default)]
pub struct BuildTiming {
    pub build_ms: f64,
    pub walls_ms: f64,
    pub regions_ms: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancellation_pairs() {
        use EdgeKind::*;
        assert!(Solid.cancels(Solid));
        assert!(OneWay.cancels(Weak));
        assert!(Weak.cancels(OneWay));
        assert!(Ladder.cancels(LadderTop));
        assert!(!Solid.cancels(Water));
        assert!(!OneWay.cancels(Solid));
        assert!(!LadderTop.cancels(Weak));
    }

    #[test]
    fn test_config_json_defaults() {
        let cfg = WorldConfig::from_json_str(r#"{ "grid_width": 4, "enable_timing": true }"#).unwrap();
        assert_eq!(cfg.grid_width, 4);
        assert_eq!(cfg.grid_height, 60);
        assert!(cfg.enable_timing);
        assert_eq!(cfg.cells(), 240);
        assert!(WorldConfig::from_json_str("{ nope").is_err());
    }

    #[test]
    fn test_config_rejects_degenerate_sizes() {
        for text in [
            r#"{ "grid_width": 4, "grid_height": 4, "tile_width": 0 }"#,
            r#"{ "tile_height": -8 }"#,
            r#"{ "grid_width": 0 }"#,
            r#"{ "grid_height": 0 }"#,
        ] {
            let err = WorldConfig::from_json_str(text).err();
            assert!(matches!(err, Some(ConfigError::Invalid { .. })), "{text}: {err:?}");
        }
        let nan = WorldConfig { tile_width: f32::NAN, ..WorldConfig::default() };
        assert!(nan.validate().is_err());
        let inf = WorldConfig { tile_height: f32::INFINITY, ..WorldConfig::default() };
        assert!(inf.validate().is_err());
        assert!(WorldConfig::default().validate().is_ok());
    }
}
