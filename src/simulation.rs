use std::path::Path;

use glam::Vec2;
use log::debug;

use crate::api::TileWorldApi;
use crate::error::MapLoadError;
use crate::particles::Particles;
use crate::player::{InputFlags, Player};
use crate::tilemap::TileGrid;
use crate::tiles::TileCatalog;
use crate::types::WorldConfig;
use crate::world::TileWorld;

/// Owns the world and everything moving in it.
pub struct Simulation {
    /// As configured; map files are read at this size.
    cfg: WorldConfig,
    world: TileWorld,
    catalog: TileCatalog,
    player: Player,
    particles: Particles,
    ticks: u64,
}

impl Simulation {
    /// Empty world of the configured size, player at the origin.
    pub fn new(cfg: WorldConfig, seed: u64) -> Self {
        let catalog = TileCatalog::new(cfg.tile_width, cfg.tile_height);
        Self {
            world: TileWorld::new(cfg.clone()),
            cfg,
            catalog,
            player: Player::new(Vec2::ZERO, seed),
            particles: Particles::new(seed.wrapping_add(1)),
            ticks: 0,
        }
    }

    /// Rebuild the world from `grid` and put the player at `spawn`.
    pub fn load_map(&mut self, grid: &TileGrid, spawn: Vec2) {
        let cfg = WorldConfig { grid_width: grid.width(), grid_height: grid.height(), ..self.cfg.clone() };
        self.world = TileWorld::build(grid, &self.catalog, cfg);
        self.particles.clear();
        self.player.spawn(self.world.clamp_to_extent(spawn, self.player.body.size));
        self.ticks = 0;
        debug!("map loaded, player at {:?}", self.player.body.pos);
    }

    pub fn load_map_file(&mut self, path: impl AsRef<Path>, spawn: Vec2) -> Result<(), MapLoadError> {
        let grid = TileGrid::load(path, self.cfg.grid_width, self.cfg.grid_height)?;
        self.load_map(&grid, spawn);
        Ok(())
    }

    /// One tick: player first, then the particles it spawned.
    pub fn step(&mut self, input: InputFlags) {
        self.player.set_input(input);
        self.player.update(&self.world, &mut self.particles);
        self.particles.update(&self.world);
        self.ticks += 1;
    }

    pub fn world(&self) -> &TileWorld {
        &self.world
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn particles(&self) -> &Particles {
        &self.particles
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> TileGrid {
        TileGrid::from_rows(&[
            "0000000000000000",
            "0000000000000000",
            "0000000000000000",
            "0000000000000000",
            "0000000000000000",
            "0000000000000000",
            "0000000000000000",
            "0000000000000000",
            "1111111111111111",
            "1111111111111111",
        ])
        .unwrap()
    }

    #[test]
    fn test_new_is_empty_world() {
        let sim = Simulation::new(WorldConfig::default(), 7);
        assert!(sim.world().walls().is_empty());
        assert_eq!(sim.ticks(), 0);
        assert!(sim.particles().is_empty());
    }

    #[test]
    fn test_load_map_and_step() {
        let mut sim = Simulation::new(WorldConfig::default(), 7);
        sim.load_map(&grid(), Vec2::new(64.0, 20.0));
        assert_eq!(sim.world().extent(), Vec2::new(128.0, 80.0));
        assert_eq!(sim.player().body.pos, Vec2::new(64.0, 20.0));
        for _ in 0..100 {
            sim.step(InputFlags::empty());
        }
        assert_eq!(sim.ticks(), 100);
        assert!((sim.player().body.pos.y - 48.0).abs() < 0.5);
        assert!(!sim.player().is_airborne());
    }

    #[test]
    fn test_skid_spawns_dust() {
        let mut sim = Simulation::new(WorldConfig::default(), 7);
        sim.load_map(&grid(), Vec2::new(40.0, 40.0));
        for _ in 0..60 {
            sim.step(InputFlags::empty());
        }
        for _ in 0..20 {
            sim.step(InputFlags::RIGHT);
        }
        sim.step(InputFlags::LEFT);
        assert!(sim.player().is_skidding());
        assert!(!sim.particles().is_empty());
    }

    #[test]
    fn test_map_file_uses_configured_size() {
        let cfg = WorldConfig { grid_width: 4, grid_height: 2, ..WorldConfig::default() };
        let mut sim = Simulation::new(cfg, 7);
        sim.load_map(&grid(), Vec2::new(64.0, 20.0));
        assert_eq!(sim.world().extent(), Vec2::new(128.0, 80.0));

        let path = std::env::temp_dir().join(format!("tilewall-sim-{}.txt", std::process::id()));
        std::fs::write(&path, "0110\n0770\n").unwrap();
        let loaded = sim.load_map_file(&path, Vec2::new(16.0, 8.0));
        std::fs::remove_file(&path).ok();
        assert!(loaded.is_ok(), "{loaded:?}");
        assert_eq!(sim.world().extent(), Vec2::new(32.0, 16.0));
        assert_eq!(sim.world().regions().len(), 1);
    }

    #[test]
    fn test_spawn_is_clamped_and_file_errors_surface() {
        let mut sim = Simulation::new(WorldConfig::default(), 7);
        sim.load_map(&grid(), Vec2::new(-50.0, -50.0));
        assert_eq!(sim.player().body.pos, Vec2::new(12.0, 16.0));
        assert!(sim.load_map_file("/no/such/map.txt", Vec2::ZERO).is_err());
    }
}
