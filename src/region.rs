//! Connected water and ladder areas.

use std::collections::BTreeSet;

use glam::Vec2;
use log::trace;

use crate::geometry::Circle;
use crate::tilemap::TileMap;
use crate::tiles::TileType;
use crate::types::{RegionId, RegionIntersect, WallId};
use crate::walls::Walls;

/// A 4-connected set of cells of one region-forming tile type, bounded by the
/// walls of its member cells.
#[derive(Clone, Debug, PartialEq)]
pub struct Region {
    pub kind: TileType,
    pub walls: BTreeSet<WallId>,
    /// Row-major indices of the member cells, in paint order.
    pub cells: Vec<usize>,
}

impl Region {
    pub fn new(kind: TileType) -> Self {
        Self { kind, walls: BTreeSet::new(), cells: Vec::new() }
    }

    /// Even-odd test of a leftward ray from `p` against the border walls. Each wall
    /// counts over the half-open y interval `[min, max)`.
    pub fn contains(&self, walls: &Walls, p: Vec2) -> bool {
        let mut inside = false;
        for w in self.walls.iter().filter_map(|id| walls.get(*id)) {
            let (a, b) = (w.segment.p0, w.segment.p1);
            if (p.y >= a.y && p.y < b.y) || (p.y >= b.y && p.y < a.y) {
                let x = (p.y - a.y) * (b.x - a.x) / (b.y - a.y) + a.x;
                if p.x > x {
                    inside = !inside;
                }
            }
        }
        inside
    }

    /// `Intersect` as soon as any border wall is within reach of the circle,
    /// otherwise `Contain` or `Disjoint` by the center.
    pub fn intersect(&self, walls: &Walls, c: &Circle) -> RegionIntersect {
        let verdict = if self.contains(walls, c.center) { RegionIntersect::Contain } else { RegionIntersect::Disjoint };
        for w in self.walls.iter().filter_map(|id| walls.get(*id)) {
            if w.segment.intersects_circle(c) {
                return RegionIntersect::Intersect;
            }
        }
        verdict
    }
}

#[derive(Copy, Clone, Debug)]
struct Strip {
    xl: i32,
    xr: i32,
    y: i32,
    dy: i32,
}

struct Filler<'a> {
    map: &'a mut TileMap,
    painted: Vec<bool>,
}

impl Filler<'_> {
    fn inside(&self, x: i32, y: i32, kind: TileType) -> bool {
        match self.map.index_of(x, y) {
            Some(o) => !self.painted[o] && self.map.entry(o).tile == kind,
            None => false,
        }
    }

    fn paint(&mut self, region: &mut Region, id: RegionId, x: i32, y: i32) {
        let Some(o) = self.map.index_of(x, y) else { return };
        self.painted[o] = true;
        let entry = self.map.entry_mut(o);
        entry.region = Some(id);
        region.walls.extend(entry.walls.iter().copied());
        region.cells.push(o);
    }

    /// Heckbert's scanline seed fill from `(x, y)`.
    fn fill(&mut self, region: &mut Region, id: RegionId, x: i32, y: i32) {
        let kind = region.kind;
        let height = self.map.height() as i32;
        let width = self.map.width() as i32;

        // the second push is the seed line and pops first
        let mut stack = vec![Strip { xl: x, xr: x, y, dy: 1 }, Strip { xl: x, xr: x, y: y + 1, dy: -1 }];

        while let Some(s) = stack.pop() {
            let y = s.y + s.dy;
            if y < 0 || y >= height {
                continue;
            }

            let mut x = s.xl;
            while x >= 0 && self.inside(x, y, kind) {
                self.paint(region, id, x, y);
                x -= 1;
            }

            let mut skip = x >= s.xl;
            let mut l = x + 1;
            if !skip {
                if l < s.xl {
                    stack.push(Strip { xl: l, xr: s.xl - 1, y, dy: -s.dy });
                }
                x = s.xl + 1;
            }

            loop {
                if !skip {
                    while x < width && self.inside(x, y, kind) {
                        self.paint(region, id, x, y);
                        x += 1;
                    }
                    stack.push(Strip { xl: l, xr: x - 1, y, dy: s.dy });
                    if x > s.xr + 1 {
                        stack.push(Strip { xl: s.xr + 1, xr: x - 1, y, dy: -s.dy });
                    }
                }
                skip = false;

                x += 1;
                while x <= s.xr && !self.inside(x, y, kind) {
                    x += 1;
                }
                l = x;
                if x > s.xr {
                    break;
                }
            }
        }
    }
}

/// Scan `map` row-major and flood every unassigned water or ladder cell into a
/// new region, setting each member entry's back-reference.
pub fn build_regions(map: &mut TileMap) -> Vec<Region> {
    let mut regions = Vec::new();
    let (width, height) = (map.width() as i32, map.height() as i32);
    let painted = vec![false; map.len()];
    let mut filler = Filler { map, painted };

    for j in 0..height {
        for i in 0..width {
            let Some(o) = filler.map.index_of(i, j) else { continue };
            let kind = filler.map.entry(o).tile;
            if filler.painted[o] || !kind.is_region_kind() {
                continue;
            }
            let id = RegionId(regions.len() as u32);
            let mut region = Region::new(kind);
            filler.fill(&mut region, id, i, j);
            trace!("region {:?} {:?}: {} cells, {} walls", id, kind, region.cells.len(), region.walls.len());
            regions.push(region);
        }
    }
    regions
}
