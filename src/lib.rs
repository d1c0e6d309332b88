//! tilewall: tile-map 2D physics (merged walls, fluid/ladder regions, circle resolution)

pub mod types;
pub mod error;
pub mod geometry;
pub mod tiles;
pub mod tilemap;
pub mod walls;
pub mod region;
pub mod body;
pub mod resolve;
pub mod api;
pub mod world;
pub mod player;
pub mod particles;
pub mod simulation;

pub use crate::types::*;
pub use crate::api::*;
pub use crate::error::{ConfigError, MapLoadError};
pub use crate::geometry::{Circle, Intersection, Segment};
pub use crate::tiles::{TileCatalog, TileType};
pub use crate::tilemap::{TileEntry, TileGrid, TileMap};
pub use crate::walls::{Wall, Walls};
pub use crate::region::Region;
pub use crate::body::Body;
pub use crate::world::TileWorld;
pub use crate::player::{InputFlags, Player, PlayerFlags};
pub use crate::particles::{Particle, ParticleKind, Particles};
pub use crate::simulation::Simulation;
