//! Short-lived dust and water particles that collide with the world.

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::api::{Collidable, EffectSink, TileWorldApi};
use crate::body::Body;
use crate::tiles::TileType;
use crate::types::WallId;
use crate::walls::Wall;
use crate::world::TileWorld;

const DRAG: f32 = 0.99;
const DUST_GRAVITY: f32 = -0.1;
const DROP_GRAVITY: f32 = 0.15;
const VEL_MAX: f32 = 4.5;
pub const PARTICLE_SIZE: Vec2 = Vec2::new(4.0, 4.0);
pub const PARTICLE_RADIUS: f32 = 4.0;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Blend from `b` (s = 0) to `a` (s = 1).
    pub fn random_range(a: Rgba, b: Rgba, s: f32) -> Rgba {
        let mix = |x: u8, y: u8| ((x as f32 - y as f32) * s + y as f32).round().clamp(0.0, 255.0) as u8;
        Rgba::new(mix(a.r, b.r), mix(a.g, b.g), mix(a.b, b.b), mix(a.a, b.a))
    }
}

pub const DUST_1: Rgba = Rgba::new(128, 128, 128, 48);
pub const DUST_2: Rgba = Rgba::new(192, 192, 192, 64);
pub const WATER_1: Rgba = Rgba::new(0, 119, 130, 64);
pub const WATER_2: Rgba = Rgba::new(0, 0, 128, 128);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ParticleKind {
    /// Rises and fades.
    Dust,
    /// Falls; bursts into small drops on impact.
    Drop,
    /// Falls and vanishes on impact.
    SmallDrop,
}

#[derive(Clone, Debug)]
pub struct Particle {
    pub body: Body,
    pub kind: ParticleKind,
    pub color: Rgba,
    /// Updates left; dead at zero.
    pub lifetime: u32,
}

impl Particle {
    pub fn new(kind: ParticleKind, pos: Vec2, vel: Vec2, color: Rgba, scale: f32, lifetime: u32) -> Self {
        let mut body = Body::new(pos, PARTICLE_SIZE * scale, PARTICLE_RADIUS * scale);
        body.old_pos = pos - vel;
        body.scale = Vec2::splat(scale);
        Self { body, kind, color, lifetime }
    }

    pub fn is_alive(&self) -> bool {
        self.lifetime > 0
    }

    fn update(&mut self, world: &TileWorld, effects: &mut dyn EffectSink) {
        self.lifetime = self.lifetime.saturating_sub(1);

        let gravity = match self.kind {
            ParticleKind::Dust => DUST_GRAVITY,
            ParticleKind::Drop | ParticleKind::SmallDrop => DROP_GRAVITY,
        };
        let vel = self.body.velocity().clamp_length_max(VEL_MAX);
        self.body.old_pos = self.body.pos;
        self.body.pos += vel * DRAG + Vec2::new(0.0, gravity);
        self.body.pos = world.clamp_to_extent(self.body.pos, self.body.size);

        if self.kind == ParticleKind::Dust {
            return;
        }
        // drops die inside anything wet or solid
        if let Some(e) = world.tile_at(self.body.pos) {
            if matches!(e.tile, TileType::Solid | TileType::Water) {
                self.lifetime = 0;
            }
        }
        world.resolve(self, effects);
    }
}

impl Collidable for Particle {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    /// Any wall that gets this far ends the particle.
    fn process_wall(&mut self, _id: WallId, wall: &Wall, effects: &mut dyn EffectSink) -> bool {
        if self.is_alive() && self.kind == ParticleKind::Drop {
            effects.drop_burst(self.body.pos, wall.segment.normal, self.body.scale.x);
        }
        self.lifetime = 0;
        false
    }
}

/// Spawns raised while particles update; applied after the pass.
#[derive(Default)]
struct Bursts(Vec<(Vec2, Vec2, f32)>);

impl EffectSink for Bursts {
    fn drop_burst(&mut self, at: Vec2, normal: Vec2, scale: f32) {
        self.0.push((at, normal, scale));
    }
}

/// Particle pool.
pub struct Particles {
    list: Vec<Particle>,
    rng: StdRng,
}

impl Particles {
    pub fn new(seed: u64) -> Self {
        Self { list: Vec::new(), rng: StdRng::seed_from_u64(seed) }
    }

    pub fn add(&mut self, p: Particle) {
        self.list.push(p);
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.list.iter()
    }

    pub fn clear(&mut self) {
        self.list.clear();
    }

    fn frand(&mut self) -> f32 {
        self.rng.gen_range(0.0..1.0)
    }

    fn frand_signed(&mut self) -> f32 {
        self.rng.gen_range(-1.0..1.0)
    }

    fn lifetime(&mut self, max: f32) -> u32 {
        (self.frand() * max).floor() as u32
    }

    /// Advance every particle, drop the dead, then add impact bursts.
    pub fn update(&mut self, world: &TileWorld) {
        let mut bursts = Bursts::default();
        for p in &mut self.list {
            p.update(world, &mut bursts);
        }
        self.list.retain(Particle::is_alive);
        for (at, normal, scale) in bursts.0 {
            self.burst(at, normal, scale);
        }
    }

    /// Two small drops bouncing off a wall with normal `normal`.
    pub fn burst(&mut self, at: Vec2, normal: Vec2, scale: f32) {
        for _ in 0..2 {
            let r = Vec2::new(self.frand(), self.frand());
            let vel = (r + normal * 2.0) * 0.8;
            let lifetime = self.lifetime(80.0);
            let color = Rgba::random_range(WATER_1, WATER_2, self.frand());
            self.add(Particle::new(ParticleKind::SmallDrop, at, vel, color, scale * 0.5, lifetime));
        }
    }
}

impl EffectSink for Particles {
    fn water_splash(&mut self, at: Vec2, vel: Vec2) {
        let count = (vel.length() * 2.5).floor() as usize;
        for _ in 0..count {
            let r = Vec2::new(self.frand(), self.frand());
            let v = (r + vel) * 0.8;
            let lifetime = self.lifetime(80.0);
            let color = Rgba::random_range(WATER_1, WATER_2, self.frand());
            let scale = self.frand();
            self.add(Particle::new(ParticleKind::Drop, at, v, color, scale, lifetime));
        }
    }

    fn skid_dust(&mut self, at: Vec2, vel: Vec2) {
        let count = (vel.length() * 4.0).floor() as usize;
        for _ in 0..count {
            let r = Vec2::new(self.frand_signed(), self.frand_signed());
            let v = (r + vel) * 0.5;
            let lifetime = self.lifetime(15.0);
            let color = Rgba::random_range(DUST_1, DUST_2, self.frand());
            let scale = self.frand();
            self.add(Particle::new(ParticleKind::Dust, at, v, color, scale, lifetime));
        }
    }

    fn drop_burst(&mut self, at: Vec2, normal: Vec2, scale: f32) {
        self.burst(at, normal, scale);
    }
}
