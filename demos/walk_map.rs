use glam::Vec2;
use log::info;

use tilewall::{InputFlags, Simulation, TileGrid, TileWorldApi, WorldConfig};

const MAP: &[&str] = &[
    "1000000000000000000000001",
    "1000000000000000000000001",
    "1000000000000000000000001",
    "1000000002222000000000001",
    "1000000000000000000600001",
    "1000000000000000000600001",
    "1000000000000000000600001",
    "1000000000000000000600001",
    "1001100000000000000600001",
    "1111100000000077777777701",
    "1111111100000077777777711",
    "1111111111111111111111111",
];

fn main() {
    env_logger::init();

    let grid = match TileGrid::from_rows(MAP) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("bad map: {e}");
            return;
        }
    };

    let cfg = WorldConfig { enable_timing: true, ..WorldConfig::default() };
    let mut sim = Simulation::new(cfg, 42);
    sim.load_map(&grid, Vec2::new(60.0, 16.0));

    let world = sim.world();
    let stats = world.stats();
    info!(
        "{} tiles, {} walls, {} regions ({} merges, {} cancellations)",
        stats.tiles, stats.walls, stats.regions, stats.merges, stats.cancellations
    );
    if let Some(t) = world.timing() {
        info!("build {:.3} ms (walls {:.3} ms, regions {:.3} ms)", t.build_ms, t.walls_ms, t.regions_ms);
    }

    // fall, walk right into the water, then jump
    for tick in 0..180 {
        let input = match tick {
            0..=39 => InputFlags::empty(),
            40..=149 => InputFlags::RIGHT,
            150 => InputFlags::RIGHT | InputFlags::JUMP,
            _ => InputFlags::RIGHT,
        };
        sim.step(input);
        if tick % 10 == 0 {
            let p = sim.player();
            println!(
                "tick {:3}: pos ({:6.2}, {:6.2}) angle {:6.2} flags {:?} particles {}",
                tick,
                p.body.pos.x,
                p.body.pos.y,
                p.angle,
                p.flags,
                sim.particles().len()
            );
        }
    }
    println!("extent {:?}", sim.world().extent());
}
