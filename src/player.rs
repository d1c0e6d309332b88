//! The player character: a walking, jumping, climbing, swimming circle.

use bitflags::bitflags;
use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::api::{Collidable, EffectSink, TileWorldApi};
use crate::body::Body;
use crate::geometry::perp;
use crate::region::Region;
use crate::tiles::TileType;
use crate::types::{EdgeKind, RegionIntersect, WallId};
use crate::walls::Wall;
use crate::world::TileWorld;

const DRAG: f32 = 0.99;
const GRAVITY: f32 = 0.15;
const AIRBORNE_GRAVITY: f32 = 0.35;
const WATER_GRAVITY: f32 = -0.14;
const JUMP_GRAVITY: f32 = 0.12;
const DRIP_GRAVITY: f32 = 2.0;
const ACCEL: f32 = 0.20;
const AIR_ACCEL: f32 = 0.10;
const SKID_ACCEL: f32 = 0.08;
const WATER_ACCEL: f32 = 0.10;
const WATER_THRUST: f32 = 3.0;
const SKID_MULTIPLIER: f32 = 6.0;
const SKID_MAX_ANGLE: f32 = 20.0;
const SKID_FRICTION: f32 = 0.90;
const CLIMB_FRICTION_X: f32 = 0.3;
const CLIMB_FRICTION_Y: f32 = 0.5;
const JUMP_VEL_SCALE: f32 = 0.3;
const JUMP_THRUST: f32 = 4.5;
const JUMP_Y_BIAS: f32 = 1.2;
const AIRBORNE_JUMP_THRUST: f32 = 5.4;
const VEL_MAX_X: f32 = 3.0;
const VEL_MAX_Y: f32 = 6.0;
const VEL_MIN: f32 = 1e-3;
const MAX_ROT: f32 = 5.0;
const MAX_JUMP_TIME: u32 = 20;
const TICKS_PER_DRIP: u32 = 30;
const JUMP_MAX_AIRBORNE_TIME: u32 = 6;
const WET_TIME: u32 = 60 * 20;
/// Minimum speed into a water surface that splashes.
const SPLASH_SPEED: f32 = 0.15;

pub const PLAYER_SIZE: Vec2 = Vec2::new(12.0, 16.0);
pub const PLAYER_RADIUS: f32 = 16.0;

bitflags! {
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct PlayerFlags: u32 {
        const AIRBORNE = 1 << 0;
        const JUMPING = 1 << 1;
        const SKIDDING = 1 << 2;
        const CLIMBING = 1 << 3;
        const ON_LADDER = 1 << 4;
        const IN_WATER = 1 << 5;
        const UNDER_WATER = 1 << 6;
    }
}

bitflags! {
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct InputFlags: u8 {
        const LEFT = 1;
        const RIGHT = 2;
        const UP = 4;
        const DOWN = 8;
        const JUMP = 16;
    }
}

pub struct Player {
    pub body: Body,
    /// Tilt in degrees.
    pub angle: f32,
    pub skid_angle: f32,
    pub flags: PlayerFlags,
    jump_time: u32,
    airborne_time: u32,
    wet_time: u32,
    input: InputFlags,
    new_input: InputFlags,
    rng: StdRng,
}

impl Player {
    pub fn new(pos: Vec2, seed: u64) -> Self {
        Self {
            body: Body::new(pos, PLAYER_SIZE, PLAYER_RADIUS),
            angle: 0.0,
            skid_angle: 0.0,
            flags: PlayerFlags::empty(),
            jump_time: 0,
            airborne_time: 0,
            wet_time: 0,
            input: InputFlags::empty(),
            new_input: InputFlags::empty(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Latch this update's buttons; `new_input` holds the ones pressed since last time.
    pub fn set_input(&mut self, input: InputFlags) {
        let old = self.input;
        self.input = input;
        self.new_input = (old ^ input) & input;
    }

    /// Put the player at rest at `pos`.
    pub fn spawn(&mut self, pos: Vec2) {
        self.body.pos = pos;
        self.body.old_pos = pos;
        self.body.ignore.clear();
    }

    pub fn input(&self) -> InputFlags {
        self.input
    }

    pub fn new_input(&self) -> InputFlags {
        self.new_input
    }

    pub fn is_airborne(&self) -> bool {
        self.flags.contains(PlayerFlags::AIRBORNE)
    }

    pub fn is_jumping(&self) -> bool {
        self.flags.contains(PlayerFlags::JUMPING)
    }

    pub fn is_skidding(&self) -> bool {
        self.flags.contains(PlayerFlags::SKIDDING)
    }

    pub fn is_climbing(&self) -> bool {
        self.flags.contains(PlayerFlags::CLIMBING)
    }

    pub fn on_ladder(&self) -> bool {
        self.flags.contains(PlayerFlags::ON_LADDER)
    }

    pub fn in_water(&self) -> bool {
        self.flags.contains(PlayerFlags::IN_WATER)
    }

    pub fn under_water(&self) -> bool {
        self.flags.contains(PlayerFlags::UNDER_WATER)
    }

    pub fn is_wet(&self) -> bool {
        self.wet_time > 0
    }

    /// Recently left the ground, so a jump still counts as a ground jump.
    pub fn in_jump_bias(&self) -> bool {
        self.airborne_time < JUMP_MAX_AIRBORNE_TIME
    }

    fn frand_signed(&mut self) -> f32 {
        self.rng.gen_range(-1.0..1.0)
    }

    /// Advance one tick: movement, collision, tilt.
    pub fn update(&mut self, world: &TileWorld, effects: &mut dyn EffectSink) {
        let mut acc = Vec2::ZERO;
        let mut vel = self.body.velocity();
        let mut gravity = Vec2::new(0.0, GRAVITY);
        let normal = self.body.normal;

        if self.input.contains(InputFlags::LEFT) {
            acc.x -= 1.0;
        }
        if self.input.contains(InputFlags::RIGHT) {
            acc.x += 1.0;
        }

        if self.on_ladder() {
            if self.input.contains(InputFlags::UP) {
                acc.y -= 1.0;
            }
            if self.input.contains(InputFlags::DOWN) {
                acc.y += 1.0;
            }
        }

        if self.is_climbing() {
            // falling off the ladder or touching the ground ends a climb
            if !(self.on_ladder() && self.is_airborne()) {
                self.flags.remove(PlayerFlags::CLIMBING);
            }
        } else if acc.y != 0.0 {
            self.flags.insert(PlayerFlags::CLIMBING);
        }

        if self.in_water() {
            if self.new_input.contains(InputFlags::DOWN) {
                acc.y += WATER_THRUST;
            }
            if self.under_water() {
                gravity = Vec2::new(0.0, WATER_GRAVITY);
            }
            acc.x *= WATER_ACCEL;
        } else if self.is_climbing() {
            gravity = Vec2::ZERO;
            vel.x *= CLIMB_FRICTION_X;
            vel.y *= CLIMB_FRICTION_Y;
        } else if self.is_airborne() {
            acc.x *= AIR_ACCEL;
            gravity = Vec2::new(0.0, AIRBORNE_GRAVITY);
            self.airborne_time += 1;
        } else if acc.x * vel.x <= 0.0 && vel.x != 0.0 {
            // pushing against the motion, or letting go
            self.flags.insert(PlayerFlags::SKIDDING);
            self.skid_angle = (SKID_MULTIPLIER * -vel.x).clamp(-SKID_MAX_ANGLE, SKID_MAX_ANGLE);
            acc.x *= SKID_ACCEL;
            vel.x *= SKID_FRICTION;

            let r = perp(normal) * self.frand_signed();
            let at = self.body.pos - normal * self.body.radius - r * self.body.size.x;
            effects.skid_dust(at, vel);
        } else {
            self.flags.remove(PlayerFlags::SKIDDING);
            self.skid_angle = 0.0;
            acc.x *= ACCEL;
        }

        if self.is_wet() && !(self.in_water() || self.under_water()) {
            if self.wet_time % TICKS_PER_DRIP == 0 {
                let rx = self.frand_signed();
                let ry = self.frand_signed();
                let at = self.body.pos + normal * ry * self.body.size.y + perp(normal) * rx * self.body.size.x;
                effects.water_splash(at, Vec2::new(0.0, DRIP_GRAVITY));
            }
            self.wet_time -= 1;
        }

        if self.new_input.contains(InputFlags::JUMP) {
            let can_jump = self.is_climbing() || self.in_water() || self.in_jump_bias();
            if !self.is_jumping() && can_jump {
                vel.y *= JUMP_VEL_SCALE;
                if self.is_airborne() {
                    acc.y = -AIRBORNE_JUMP_THRUST;
                } else {
                    acc.x += JUMP_THRUST * normal.x;
                    acc.y = JUMP_THRUST * JUMP_Y_BIAS * normal.y;
                }
                self.flags.insert(PlayerFlags::JUMPING);
                self.flags.remove(PlayerFlags::CLIMBING);
                self.jump_time = 0;
                self.angle = 0.0;
            }
        } else if self.is_jumping() {
            gravity = Vec2::new(0.0, JUMP_GRAVITY);
            self.jump_time += 1;
            let held = self.input.contains(InputFlags::JUMP) && self.jump_time <= MAX_JUMP_TIME;
            if !(held && self.is_airborne()) {
                self.flags.remove(PlayerFlags::JUMPING);
            }
        }

        vel.x = vel.x.clamp(-VEL_MAX_X, VEL_MAX_X);
        // no endless creeping
        if vel.x.abs() < VEL_MIN {
            vel.x = 0.0;
        }
        vel.y = vel.y.clamp(-VEL_MAX_Y, VEL_MAX_Y);

        self.body.old_pos = self.body.pos;
        vel += acc;
        self.body.pos += vel * DRAG + gravity;
        self.body.pos = world.clamp_to_extent(self.body.pos, self.body.size);

        self.do_collision(world, effects);

        self.angle *= 0.90;
        if self.body.normal_count > 0 {
            let n = self.body.normal;
            let to_angle = n.x.atan2(-n.y).to_degrees() + self.skid_angle;
            self.angle += (to_angle - self.angle).clamp(-MAX_ROT, MAX_ROT);
            self.body.normal_count = 0;
            self.flags.remove(PlayerFlags::AIRBORNE);
            self.airborne_time = 0;
        } else {
            self.flags.insert(PlayerFlags::AIRBORNE);
        }
    }

    /// Wall resolution, then ladder and water flags from the nearby regions.
    pub fn do_collision(&mut self, world: &TileWorld, effects: &mut dyn EffectSink) {
        self.flags.remove(PlayerFlags::ON_LADDER | PlayerFlags::IN_WATER | PlayerFlags::UNDER_WATER);

        world.resolve(self, effects);

        let circle = self.body.circle();
        for id in world.gather_regions(&circle) {
            let Some(region) = world.region(id) else { continue };
            self.apply_region(world, region);
        }
    }

    fn apply_region(&mut self, world: &TileWorld, region: &Region) {
        let walls = world.walls();
        match region.kind {
            TileType::Ladder => {
                if region.contains(walls, self.body.pos) {
                    self.flags.insert(PlayerFlags::ON_LADDER);
                }
            }
            TileType::Water => {
                if region.intersect(walls, &self.body.circle()) != RegionIntersect::Disjoint {
                    self.flags.insert(PlayerFlags::IN_WATER);
                }
                if region.contains(walls, self.body.pos) {
                    self.flags.insert(PlayerFlags::UNDER_WATER);
                    self.wet_time = WET_TIME;
                }
            }
            _ => {}
        }
    }
}

impl Collidable for Player {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn pre_process_wall(&mut self, _id: WallId, wall: &Wall, _effects: &mut dyn EffectSink) {
        if wall.kind == EdgeKind::LadderTop && wall.segment.intersects_circle(&self.body.circle()) {
            self.flags.insert(PlayerFlags::ON_LADDER);
        }
    }

    fn process_wall(&mut self, id: WallId, wall: &Wall, effects: &mut dyn EffectSink) -> bool {
        let s = &wall.segment;
        match wall.kind {
            // walkable, but climbable through
            EdgeKind::LadderTop => {
                if self.body.velocity().dot(s.normal) > 0.0 || self.is_climbing() {
                    self.body.ignore.insert(id);
                    false
                } else {
                    true
                }
            }
            EdgeKind::OneWay if self.is_climbing() => {
                self.body.ignore.insert(id);
                false
            }
            EdgeKind::Water => {
                let proj = self.body.velocity().dot(s.normal).abs();
                if proj > SPLASH_SPEED {
                    let p = s.closest_point(self.body.pos);
                    let v = s.normal * proj;
                    let r = perp(s.normal) * self.frand_signed();
                    effects.water_splash(p + v + r * self.body.radius, v + r * 2.0);
                }
                false
            }
            _ => self.body.process_wall_base(id, wall),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tilemap::TileGrid;
    use crate::tiles::TileCatalog;
    use crate::types::WorldConfig;

    #[derive(Default)]
    struct Recorder {
        splashes: Vec<(Vec2, Vec2)>,
        dust: usize,
    }

    impl EffectSink for Recorder {
        fn water_splash(&mut self, at: Vec2, vel: Vec2) {
            self.splashes.push((at, vel));
        }

        fn skid_dust(&mut self, _at: Vec2, _vel: Vec2) {
            self.dust += 1;
        }
    }

    fn world(rows: &[&str]) -> TileWorld {
        let grid = TileGrid::from_rows(rows).unwrap();
        let cfg = WorldConfig { grid_width: grid.width(), grid_height: grid.height(), ..WorldConfig::default() };
        TileWorld::build(&grid, &TileCatalog::new(8.0, 8.0), cfg)
    }

    fn ground() -> TileWorld {
        // 12 x 10 with a floor at y = 64
        world(&[
            "000000000000",
            "000000000000",
            "000000000000",
            "000000000000",
            "000000000000",
            "000000000000",
            "000000000000",
            "000000000000",
            "111111111111",
            "111111111111",
        ])
    }

    fn settle(p: &mut Player, w: &TileWorld, ticks: usize) {
        for _ in 0..ticks {
            p.set_input(InputFlags::empty());
            p.update(w, &mut ());
        }
    }

    #[test]
    fn test_new_input_is_edge_triggered() {
        let mut p = Player::new(Vec2::new(40.0, 40.0), 1);
        p.set_input(InputFlags::JUMP | InputFlags::LEFT);
        assert_eq!(p.new_input(), InputFlags::JUMP | InputFlags::LEFT);
        p.set_input(InputFlags::JUMP | InputFlags::RIGHT);
        assert_eq!(p.new_input(), InputFlags::RIGHT);
        p.set_input(InputFlags::empty());
        assert!(p.new_input().is_empty());
    }

    #[test]
    fn test_falls_and_lands() {
        let w = ground();
        let mut p = Player::new(Vec2::new(48.0, 20.0), 1);
        settle(&mut p, &w, 120);
        assert!(!p.is_airborne());
        assert!((p.body.pos.y - 48.0).abs() < 0.5, "y = {}", p.body.pos.y);
        assert!(p.angle.abs() < 1.0);
        assert_eq!(p.body.normal_count, 0);
    }

    #[test]
    fn test_jump_leaves_ground() {
        let w = ground();
        let mut p = Player::new(Vec2::new(48.0, 20.0), 1);
        settle(&mut p, &w, 120);
        let rest = p.body.pos.y;
        p.set_input(InputFlags::JUMP);
        p.update(&w, &mut ());
        assert!(p.is_jumping());
        for _ in 0..5 {
            p.set_input(InputFlags::JUMP);
            p.update(&w, &mut ());
        }
        assert!(p.is_airborne());
        assert!(p.body.pos.y < rest - 5.0);
    }

    #[test]
    fn test_walk_right_then_skid() {
        let w = ground();
        let mut p = Player::new(Vec2::new(30.0, 20.0), 1);
        settle(&mut p, &w, 120);
        let start = p.body.pos.x;
        for _ in 0..10 {
            p.set_input(InputFlags::RIGHT);
            p.update(&w, &mut ());
        }
        assert!(p.body.pos.x > start);
        let mut fx = Recorder::default();
        p.set_input(InputFlags::empty());
        p.update(&w, &mut fx);
        assert!(p.is_skidding());
        assert_eq!(fx.dust, 1);
    }

    #[test]
    fn test_stays_inside_world() {
        let w = ground();
        let mut p = Player::new(Vec2::new(20.0, 20.0), 1);
        for _ in 0..200 {
            p.set_input(InputFlags::LEFT);
            p.update(&w, &mut ());
            assert!(p.body.pos.x >= PLAYER_SIZE.x - 1e-3);
        }
    }

    #[test]
    fn test_water_sets_flags_and_wets() {
        let mut rows = vec!["000000000000"; 3];
        rows.extend(["777777777777"; 5]);
        rows.extend(["111111111111"; 2]);
        let w = world(&rows);
        let mut p = Player::new(Vec2::new(48.0, 44.0), 1);
        p.update(&w, &mut ());
        assert!(p.in_water());
        assert!(p.under_water());
        assert!(p.is_wet());
    }

    #[test]
    fn test_fast_entry_splashes() {
        let mut rows = vec!["000000000000"; 3];
        rows.extend(["777777777777"; 5]);
        rows.extend(["111111111111"; 2]);
        let w = world(&rows);
        let mut p = Player::new(Vec2::new(48.0, 12.0), 1);
        p.body.old_pos = Vec2::new(48.0, 8.0);
        let mut fx = Recorder::default();
        p.update(&w, &mut fx);
        assert!(!fx.splashes.is_empty());
        assert!(p.in_water());
    }

    #[test]
    fn test_ladder_top_is_standable_and_climbable() {
        let rows = [
            "000000000000",
            "000000000000",
            "000000000000",
            "000000000000",
            "000006000000",
            "000006000000",
            "000006000000",
            "000006000000",
            "111111111111",
            "111111111111",
        ];
        let w = world(&rows);
        // stand on the ladder top at y = 32
        let mut p = Player::new(Vec2::new(44.0, 10.0), 1);
        settle(&mut p, &w, 120);
        assert!((p.body.pos.y - 16.0).abs() < 0.5, "y = {}", p.body.pos.y);
        assert!(p.on_ladder());

        // holding down climbs through it
        for _ in 0..60 {
            p.set_input(InputFlags::DOWN);
            p.update(&w, &mut ());
        }
        assert!(p.body.pos.y > 20.0, "y = {}", p.body.pos.y);
    }

    #[test]
    fn test_one_way_platform_from_below() {
        let mut rows = vec!["000000000000"; 6];
        rows.push("000022220000");
        rows.extend(["000000000000"; 5]);
        rows.extend(["111111111111"; 2]);
        let w = world(&rows);
        // launched upward from under the platform top at y = 48
        let mut p = Player::new(Vec2::new(48.0, 72.0), 1);
        p.body.old_pos = Vec2::new(48.0, 78.0);
        for _ in 0..6 {
            p.set_input(InputFlags::empty());
            p.update(&w, &mut ());
        }
        assert!(p.body.pos.y < 48.0, "y = {}", p.body.pos.y);
        settle(&mut p, &w, 120);
        assert!((p.body.pos.y - 32.0).abs() < 0.5, "y = {}", p.body.pos.y);
    }
}
