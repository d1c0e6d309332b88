use glam::Vec2;
use log::debug;

use std::collections::BTreeSet;
use std::path::Path;
use std::time::Instant;

use crate::api::{Collidable, EffectSink, TileWorldApi};
use crate::error::MapLoadError;
use crate::geometry::Circle;
use crate::region::{Region, build_regions};
use crate::resolve::resolve_against;
use crate::tilemap::{TileEntry, TileGrid, TileMap};
use crate::tiles::TileCatalog;
use crate::types::*;
use crate::walls::Walls;

/// Walls and regions built from one tile grid. Read-only once built.
pub struct TileWorld {
    pub cfg: WorldConfig,

    map: TileMap,
    walls: Walls,
    regions: Vec<Region>,

    stats: BuildStats,
    // Timing for the last build (optional)
    last_timing: Option<BuildTiming>,
}

impl TileWorldApi for TileWorld {
    fn new(cfg: WorldConfig) -> Self {
        let grid = TileGrid::new(cfg.grid_width, cfg.grid_height);
        let catalog = TileCatalog::new(cfg.tile_width, cfg.tile_height);
        Self::build(&grid, &catalog, cfg)
    }

    fn lookup(&self, i: i32, j: i32) -> Option<&TileEntry> {
        self.map.lookup(i, j)
    }

    fn tile_at(&self, p: Vec2) -> Option<&TileEntry> {
        let (i, j) = self.world_to_cell(p);
        self.map.lookup(i, j)
    }

    fn region_at(&self, entry: &TileEntry) -> Option<&Region> {
        entry.region.and_then(|id| self.region(id))
    }

    fn region(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(id.0 as usize)
    }

    fn regions(&self) -> &[Region] {
        &self.regions
    }

    fn walls(&self) -> &Walls {
        &self.walls
    }

    fn gather_walls(&self, c: &Circle) -> BTreeSet<WallId> {
        let mut set = BTreeSet::new();
        self.for_each_cell(c, |e| set.extend(e.walls.iter().copied()));
        set
    }

    fn gather_regions(&self, c: &Circle) -> BTreeSet<RegionId> {
        let mut set = BTreeSet::new();
        self.for_each_cell(c, |e| set.extend(e.region));
        set
    }

    fn extent(&self) -> Vec2 {
        Vec2::new(self.map.width() as f32, self.map.height() as f32) * self.tile_size()
    }

    fn clamp_to_extent(&self, pos: Vec2, half: Vec2) -> Vec2 {
        let max = self.extent() - half;
        // a body wider than the map sits against the low edge
        Vec2::new(pos.x.min(max.x).max(half.x), pos.y.min(max.y).max(half.y))
    }

    fn resolve(&self, obj: &mut dyn Collidable, effects: &mut dyn EffectSink) -> Resolution {
        let gathered = self.gather_walls(&obj.body().circle());
        resolve_against(obj, &self.walls, &gathered, effects)
    }
}

impl TileWorld {
    /// Merge walls and map regions for `grid`.
    pub fn build(grid: &TileGrid, catalog: &TileCatalog, cfg: WorldConfig) -> Self {
        let t_all = if cfg.enable_timing { Some(Instant::now()) } else { None };

        let mut map = TileMap::new(grid, catalog.tile_size());
        let t0 = if cfg.enable_timing { Some(Instant::now()) } else { None };
        let walls = Walls::build(&mut map, catalog);
        let walls_ms = t0.map(|t| t.elapsed().as_secs_f64() * 1000.0).unwrap_or(0.0);

        let t1 = if cfg.enable_timing { Some(Instant::now()) } else { None };
        let regions = build_regions(&mut map);
        let regions_ms = t1.map(|t| t.elapsed().as_secs_f64() * 1000.0).unwrap_or(0.0);

        let stats = BuildStats {
            tiles: map.len(),
            walls: walls.len(),
            regions: regions.len(),
            merges: walls.merges(),
            cancellations: walls.cancellations(),
        };
        debug!(
            "built {}x{} map: {} walls, {} regions, {} merges, {} cancellations",
            grid.width(),
            grid.height(),
            stats.walls,
            stats.regions,
            stats.merges,
            stats.cancellations
        );

        let last_timing = t_all.map(|t| BuildTiming {
            build_ms: t.elapsed().as_secs_f64() * 1000.0,
            walls_ms,
            regions_ms,
        });

        Self { cfg, map, walls, regions, stats, last_timing }
    }

    /// Read a map file of the configured size and build it.
    pub fn load_map(path: impl AsRef<Path>, cfg: WorldConfig) -> Result<Self, MapLoadError> {
        let grid = TileGrid::load(path, cfg.grid_width, cfg.grid_height)?;
        let catalog = TileCatalog::new(cfg.tile_width, cfg.tile_height);
        Ok(Self::build(&grid, &catalog, cfg))
    }

    pub fn map(&self) -> &TileMap {
        &self.map
    }

    pub fn tile_size(&self) -> Vec2 {
        Vec2::new(self.cfg.tile_width, self.cfg.tile_height)
    }

    /// Counters for the built map.
    pub fn stats(&self) -> BuildStats {
        self.stats
    }

    /// Timing breakdown of the build, when `enable_timing` was set.
    pub fn timing(&self) -> Option<BuildTiming> {
        self.last_timing
    }

    fn world_to_cell(&self, p: Vec2) -> (i32, i32) {
        let cell = (p / self.tile_size()).floor();
        (cell.x as i32, cell.y as i32)
    }

    /// Visit the entries covering the circle's bounding box, clipped to the map.
    fn for_each_cell<'a>(&'a self, c: &Circle, mut f: impl FnMut(&'a TileEntry)) {
        let (i0, j0) = self.world_to_cell(c.center - Vec2::splat(c.radius));
        let (i1, j1) = self.world_to_cell(c.center + Vec2::splat(c.radius));
        let (i0, j0) = (i0.max(0), j0.max(0));
        let i1 = i1.min(self.map.width() as i32 - 1);
        let j1 = j1.min(self.map.height() as i32 - 1);
        for j in j0..=j1 {
            for i in i0..=i1 {
                if let Some(e) = self.map.lookup(i, j) {
                    f(e);
                }
            }
        }
    }
}
