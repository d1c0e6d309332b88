use std::collections::HashSet;

use glam::Vec2;

use crate::api::Collidable;
use crate::geometry::{Circle, Segment};
use crate::types::{EdgeKind, WallId};
use crate::walls::Wall;

/// Contact normals averaged per update before further ones are dropped.
pub const MAX_NORMALS: u32 = 3;

/// Circular body moved by position correction.
#[derive(Clone, Debug, PartialEq)]
pub struct Body {
    pub pos: Vec2,
    /// Position one update ago; `pos - old_pos` is the velocity.
    pub old_pos: Vec2,
    pub scale: Vec2,
    /// Half extents.
    pub size: Vec2,
    pub radius: f32,
    /// Running average of floor-like contact normals.
    pub normal: Vec2,
    pub normal_count: u32,
    /// Walls passed through until the body stops touching them.
    pub ignore: HashSet<WallId>,
}

impl Default for Body {
    fn default() -> Self {
        Self {
            pos: Vec2::ZERO,
            old_pos: Vec2::ZERO,
            scale: Vec2::ONE,
            size: Vec2::ZERO,
            radius: 0.0,
            normal: Vec2::ZERO,
            normal_count: 0,
            ignore: HashSet::new(),
        }
    }
}

impl Body {
    /// Body at rest at `pos`.
    pub fn new(pos: Vec2, size: Vec2, radius: f32) -> Self {
        Self { pos, old_pos: pos, size, radius, ..Default::default() }
    }

    pub fn velocity(&self) -> Vec2 {
        self.pos - self.old_pos
    }

    pub fn circle(&self) -> Circle {
        Circle::new(self.pos, self.radius)
    }

    /// Place the body, keeping the current velocity.
    pub fn teleport(&mut self, pos: Vec2) {
        let vel = self.velocity();
        self.pos = pos;
        self.old_pos = pos - vel;
    }

    /// Fold `n` into the averaged normal; ignored once [`MAX_NORMALS`] have been taken.
    pub fn add_normal(&mut self, n: Vec2) {
        if self.normal_count >= MAX_NORMALS {
            return;
        }
        let k = self.normal_count as f32;
        self.normal = ((self.normal * k + n) / (k + 1.0)).normalize_or_zero();
        self.normal_count += 1;
    }

    /// Shunt out of `s` if it faces the center. Returns whether it moved.
    pub fn collide_wall(&mut self, s: &Segment) -> bool {
        if !s.faces(self.pos) {
            return false;
        }
        let p = s.closest_point(self.pos);
        let d = self.pos - p;
        let dlen = d.length();
        let dir = d.normalize_or_zero();
        self.pos += dir * (self.radius - dlen);

        // floor-like
        if s.normal.y < 0.0 {
            self.add_normal(dir);
        }
        true
    }

    /// Base blocking policy shared by every body kind.
    pub fn process_wall_base(&mut self, id: WallId, wall: &Wall) -> bool {
        match wall.kind {
            EdgeKind::OneWay => {
                if self.velocity().dot(wall.segment.normal) > 0.0 {
                    self.ignore.insert(id);
                    false
                } else {
                    true
                }
            }
            EdgeKind::Solid | EdgeKind::LadderTop => true,
            EdgeKind::Water | EdgeKind::Ladder | EdgeKind::Weak => false,
        }
    }
}

impl Collidable for Body {
    fn body(&self) -> &Body {
        self
    }

    fn body_mut(&mut self) -> &mut Body {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall(kind: EdgeKind) -> Wall {
        Wall { segment: Segment::new(Vec2::new(0.0, 50.0), Vec2::new(80.0, 50.0)), kind, tiles: Vec::new() }
    }

    #[test]
    fn test_add_normal_averages_and_caps() {
        let mut b = Body::default();
        b.add_normal(Vec2::new(0.0, -1.0));
        assert!((b.normal - Vec2::new(0.0, -1.0)).length() < 1e-5);
        b.add_normal(Vec2::new(1.0, 0.0));
        let expected = Vec2::new(0.5, -0.5).normalize();
        assert!((b.normal - expected).length() < 1e-5);
        b.add_normal(Vec2::new(0.0, -1.0));
        assert_eq!(b.normal_count, 3);
        let before = b.normal;
        b.add_normal(Vec2::new(1.0, 0.0));
        assert_eq!(b.normal_count, 3);
        assert_eq!(b.normal, before);
    }

    #[test]
    fn test_collide_wall_only_from_normal_side() {
        let s = Segment::new(Vec2::new(0.0, 50.0), Vec2::new(80.0, 50.0));
        let mut b = Body::new(Vec2::new(40.0, 40.0), Vec2::splat(4.0), 16.0);
        assert!(b.collide_wall(&s));
        assert!((b.pos.y - 34.0).abs() < 1e-4);
        assert_eq!(b.normal_count, 1);

        let mut under = Body::new(Vec2::new(40.0, 60.0), Vec2::splat(4.0), 16.0);
        assert!(!under.collide_wall(&s));
        assert_eq!(under.pos, Vec2::new(40.0, 60.0));
    }

    #[test]
    fn test_ceiling_contact_adds_no_normal() {
        let ceiling = Segment::new(Vec2::new(80.0, 50.0), Vec2::new(0.0, 50.0));
        let mut b = Body::new(Vec2::new(40.0, 60.0), Vec2::splat(4.0), 16.0);
        assert!(b.collide_wall(&ceiling));
        assert!((b.pos.y - 66.0).abs() < 1e-4);
        assert_eq!(b.normal_count, 0);
    }

    #[test]
    fn test_base_policy() {
        let mut b = Body::new(Vec2::new(40.0, 40.0), Vec2::splat(4.0), 16.0);
        assert!(b.process_wall_base(WallId(0), &wall(EdgeKind::Solid)));
        assert!(b.process_wall_base(WallId(0), &wall(EdgeKind::LadderTop)));
        assert!(!b.process_wall_base(WallId(0), &wall(EdgeKind::Water)));
        assert!(!b.process_wall_base(WallId(0), &wall(EdgeKind::Ladder)));
        assert!(!b.process_wall_base(WallId(0), &wall(EdgeKind::Weak)));

        // at rest a one-way blocks
        assert!(b.process_wall_base(WallId(3), &wall(EdgeKind::OneWay)));
        // moving up through it does not, and it is remembered
        b.old_pos = Vec2::new(40.0, 44.0);
        assert!(!b.process_wall_base(WallId(3), &wall(EdgeKind::OneWay)));
        assert!(b.ignore.contains(&WallId(3)));
    }

    #[test]
    fn test_teleport_keeps_velocity() {
        let mut b = Body::new(Vec2::new(10.0, 10.0), Vec2::ZERO, 2.0);
        b.pos = Vec2::new(11.0, 12.0);
        b.teleport(Vec2::new(100.0, 100.0));
        assert_eq!(b.velocity(), Vec2::new(1.0, 2.0));
    }
}
