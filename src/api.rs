use std::collections::BTreeSet;

use glam::Vec2;

use crate::body::Body;
use crate::geometry::Circle;
use crate::region::Region;
use crate::tilemap::TileEntry;
use crate::types::*;
use crate::walls::{Wall, Walls};

/// Public contract of a built tile world.
pub trait TileWorldApi {
    /// Construct an empty world (all cells empty) with the given configuration.
    fn new(cfg: WorldConfig) -> Self
    where
        Self: Sized;

    // --- Lookups -----------------------------------------------------------

    /// Cell record at grid position `(i, j)`; `None` outside the map.
    fn lookup(&self, i: i32, j: i32) -> Option<&TileEntry>;

    /// Cell record under a world-space point.
    fn tile_at(&self, p: Vec2) -> Option<&TileEntry>;

    /// Region the entry belongs to, if any.
    fn region_at(&self, entry: &TileEntry) -> Option<&Region>;

    fn region(&self, id: RegionId) -> Option<&Region>;

    fn regions(&self) -> &[Region];

    fn walls(&self) -> &Walls;

    // --- Queries -----------------------------------------------------------

    /// Walls referenced by the cells covering the circle's bounding box.
    fn gather_walls(&self, c: &Circle) -> BTreeSet<WallId>;

    /// Regions of the cells covering the circle's bounding box.
    fn gather_regions(&self, c: &Circle) -> BTreeSet<RegionId>;

    /// Size of the map in world units.
    fn extent(&self) -> Vec2;

    /// Keep a body of half-size `half` inside the map.
    fn clamp_to_extent(&self, pos: Vec2, half: Vec2) -> Vec2;

    // --- Collision ---------------------------------------------------------

    /// Gather the walls around `obj` and push it out of the blocking ones.
    fn resolve(&self, obj: &mut dyn Collidable, effects: &mut dyn EffectSink) -> Resolution;
}

/// A body the resolver can move, with per-kind wall policy.
pub trait Collidable {
    fn body(&self) -> &Body;
    fn body_mut(&mut self) -> &mut Body;

    /// Called for every gathered wall, ignored or not, before [`Collidable::process_wall`].
    fn pre_process_wall(&mut self, _id: WallId, _wall: &Wall, _effects: &mut dyn EffectSink) {}

    /// Whether `wall` blocks this body right now.
    fn process_wall(&mut self, id: WallId, wall: &Wall, _effects: &mut dyn EffectSink) -> bool {
        self.body_mut().process_wall_base(id, wall)
    }
}

/// Receiver for visual side effects raised during an update.
pub trait EffectSink {
    fn water_splash(&mut self, _at: Vec2, _vel: Vec2) {}
    fn skid_dust(&mut self, _at: Vec2, _vel: Vec2) {}
    /// A falling drop hit a wall with normal `normal`.
    fn drop_burst(&mut self, _at: Vec2, _normal: Vec2, _scale: f32) {}
}

/// Discards every effect.
impl EffectSink for () {}
