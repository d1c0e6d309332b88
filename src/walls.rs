//! Merged wall set built from a tile grid.
//!
//! Tiles are visited row-major. Each template edge is tested against the walls
//! already recorded on the up-left, up, up-right and left neighbours: collinear
//! end-to-end edges of the same kind are joined, and opposite overlapping edges
//! of compatible kinds cancel, leaving only the uncovered parts.

use std::collections::BTreeSet;

use glam::Vec2;
use log::trace;

use crate::geometry::{Intersection, Segment, approx_eq};
use crate::tilemap::TileMap;
use crate::tiles::{Edge, TileCatalog};
use crate::types::{EdgeKind, WallId};

/// World-space wall with the tile entries that border it.
#[derive(Clone, Debug, PartialEq)]
pub struct Wall {
    pub segment: Segment,
    pub kind: EdgeKind,
    /// Row-major indices of the [`crate::tilemap::TileEntry`] records referencing this wall.
    pub tiles: Vec<usize>,
}

impl Wall {
    fn new(segment: Segment, kind: EdgeKind) -> Self {
        Self { segment, kind, tiles: Vec::new() }
    }

    fn add_tile(&mut self, index: usize) {
        if !self.tiles.contains(&index) {
            self.tiles.push(index);
        }
    }
}

/// Arena of walls addressed by stable [`WallId`]s. Removed slots are never reused.
#[derive(Clone, Debug, Default)]
pub struct Walls {
    slots: Vec<Option<Wall>>,
    live: usize,
    merges: usize,
    cancellations: usize,
}

impl Walls {
    /// Run the merger over every cell of `map`, linking entries to their walls.
    pub fn build(map: &mut TileMap, catalog: &TileCatalog) -> Self {
        let mut walls = Self::default();
        for index in 0..map.len() {
            let tile = map.entry(index).tile;
            for edge in &catalog.template(tile).edges {
                walls.add_edge(map, catalog, index, edge);
            }
        }
        walls
    }

    /// Walls that belong to no tile, in the given order.
    pub fn from_edges(edges: impl IntoIterator<Item = (Segment, EdgeKind)>) -> Self {
        let mut walls = Self::default();
        for (segment, kind) in edges {
            walls.insert(Wall::new(segment, kind));
        }
        walls
    }

    pub fn get(&self, id: WallId) -> Option<&Wall> {
        self.slots.get(id.0 as usize).and_then(Option::as_ref)
    }

    /// Live walls in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (WallId, &Wall)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, w)| w.as_ref().map(|w| (WallId(i as u32), w)))
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Collinear joins performed while building.
    pub fn merges(&self) -> usize {
        self.merges
    }

    /// Shared boundaries removed while building.
    pub fn cancellations(&self) -> usize {
        self.cancellations
    }

    fn insert(&mut self, wall: Wall) -> WallId {
        let id = WallId(self.slots.len() as u32);
        self.slots.push(Some(wall));
        self.live += 1;
        id
    }

    fn remove(&mut self, id: WallId) -> Option<Wall> {
        let wall = self.slots.get_mut(id.0 as usize).and_then(Option::take);
        if wall.is_some() {
            self.live -= 1;
        }
        wall
    }

    fn link(&mut self, map: &mut TileMap, id: WallId, tile: usize) {
        if let Some(w) = self.slots.get_mut(id.0 as usize).and_then(Option::as_mut) {
            w.add_tile(tile);
            map.entry_mut(tile).add_wall(id);
        }
    }

    fn candidates(&self, map: &TileMap, tile: usize) -> BTreeSet<WallId> {
        let (i, j) = {
            let e = map.entry(tile);
            (e.i, e.j)
        };
        let mut set = BTreeSet::new();
        for (di, dj) in [(-1, -1), (0, -1), (1, -1), (-1, 0)] {
            if let Some(e) = map.lookup(i + di, j + dj) {
                set.extend(e.walls.iter().copied());
            }
        }
        set
    }

    fn add_edge(&mut self, map: &mut TileMap, catalog: &TileCatalog, tile: usize, edge: &Edge) {
        let s = edge.segment.translated(map.entry(tile).corner);
        let mut pending = None;

        for id in self.candidates(map, tile) {
            let Some(cand) = self.get(id) else { continue };
            let t = cand.segment;

            match s.intersect(&t) {
                Intersection::Disjoint | Intersection::Point(_) => continue,
                Intersection::CollinearPoint(p0) => {
                    if !approx_eq(s.normal, t.normal) || edge.kind != cand.kind {
                        continue;
                    }
                    let segment = if approx_eq(p0, t.p0) { Segment::new(s.p0, t.p1) } else { Segment::new(t.p0, s.p1) };
                    // a later candidate may still replace this one
                    pending = Some((segment, id));
                }
                Intersection::Segment(p0, p1) => {
                    assert!(
                        approx_eq(s.normal, -t.normal),
                        "overlapping walls with matching normals at {:?} and {:?}",
                        s,
                        t
                    );
                    if !edge.kind.cancels(cand.kind) {
                        continue;
                    }
                    self.cancel(map, catalog, tile, &s, id, p0, p1);
                    return;
                }
            }
        }

        match pending {
            Some((segment, remove)) => {
                trace!("merge {:?} into {:?} at tile {}", s, segment, tile);
                let new_id = self.insert(Wall::new(segment, edge.kind));
                self.link(map, new_id, tile);
                self.remap(map, remove, new_id);
                self.merges += 1;
            }
            None => {
                let new_id = self.insert(Wall::new(s, edge.kind));
                self.link(map, new_id, tile);
            }
        }
    }

    /// Move every tile of `old` onto `new` and drop `old`.
    fn remap(&mut self, map: &mut TileMap, old: WallId, new: WallId) {
        let Some(old_wall) = self.remove(old) else { return };
        for tile in old_wall.tiles {
            map.entry_mut(tile).remove_wall(old);
            self.link(map, new, tile);
        }
    }

    /// Cancel the overlap of `s` and stored wall `old`, keeping the uncovered
    /// parts of both as walls of the stored wall's kind.
    #[allow(clippy::too_many_arguments)]
    fn cancel(
        &mut self,
        map: &mut TileMap,
        catalog: &TileCatalog,
        tile: usize,
        s: &Segment,
        old: WallId,
        p0: Vec2,
        p1: Vec2,
    ) {
        let Some(old_wall) = self.remove(old) else { return };
        let t = old_wall.segment;
        let kind = old_wall.kind;

        let mut residuals = Vec::with_capacity(2);
        // end nearest t.p0
        if !approx_eq(p0, t.p0) {
            assert!(approx_eq(p0, s.p1), "overlap {:?}-{:?} does not end on {:?}", p0, p1, s);
            residuals.push(Segment::new(t.p0, p0));
        } else if !approx_eq(p0, s.p1) {
            residuals.push(Segment::new(p0, s.p1));
        }
        // end nearest t.p1
        if !approx_eq(p1, t.p1) {
            assert!(approx_eq(p1, s.p0), "overlap {:?}-{:?} does not end on {:?}", p0, p1, s);
            residuals.push(Segment::new(p1, t.p1));
        } else if !approx_eq(s.p0, p1) {
            residuals.push(Segment::new(s.p0, p1));
        }

        trace!("cancel {:?} against {:?} at tile {}, {} left", s, t, tile, residuals.len());

        let ids: Vec<WallId> = residuals.into_iter().map(|r| self.insert(Wall::new(r, kind))).collect();

        let mut affected = old_wall.tiles;
        if !affected.contains(&tile) {
            affected.push(tile);
        }
        for index in affected {
            map.entry_mut(index).remove_wall(old);
            let entry = map.entry(index);
            let corner = entry.corner;
            let edges = &catalog.template(entry.tile).edges;
            for &id in &ids {
                let Some(r) = self.get(id) else { continue };
                let covers = edges.iter().any(|e| e.segment.translated(corner).overlaps(&r.segment));
                if covers {
                    self.link(map, id, index);
                }
            }
        }
        self.cancellations += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tilemap::TileGrid;

    fn build(rows: &[&str]) -> (TileMap, Walls) {
        let grid = TileGrid::from_rows(rows).unwrap();
        let catalog = TileCatalog::new(8.0, 8.0);
        let mut map = TileMap::new(&grid, catalog.tile_size());
        let walls = Walls::build(&mut map, &catalog);
        (map, walls)
    }

    fn v(x: f32, y: f32) -> Vec2 {
        Vec2::new(x, y)
    }

    fn find(walls: &Walls, p0: Vec2, p1: Vec2) -> Option<(WallId, &Wall)> {
        walls.iter().find(|(_, w)| approx_eq(w.segment.p0, p0) && approx_eq(w.segment.p1, p1))
    }

    fn on_line_x(walls: &Walls, x: f32) -> usize {
        walls
            .iter()
            .filter(|(_, w)| (w.segment.p0.x - x).abs() < 1e-4 && (w.segment.p1.x - x).abs() < 1e-4)
            .count()
    }

    #[test]
    fn test_adjacent_solids_cancel_shared_edge() {
        let (_, walls) = build(&["11"]);
        assert_eq!(walls.len(), 4);
        assert_eq!(on_line_x(&walls, 8.0), 0);
        assert_eq!(walls.cancellations(), 1);
        assert_eq!(walls.merges(), 2);
    }

    #[test]
    fn test_solid_run_top_is_one_wall() {
        let (map, walls) = build(&["11111"]);
        assert_eq!(walls.len(), 4);
        let (id, top) = find(&walls, v(0.0, 0.0), v(40.0, 0.0)).expect("merged top");
        assert_eq!(top.kind, EdgeKind::Solid);
        assert!((top.segment.normal.y + 1.0).abs() < 1e-5);
        assert!(find(&walls, v(40.0, 8.0), v(0.0, 8.0)).is_some());
        // every cell of the run still points at the merged top
        for i in 0..5 {
            assert!(map.lookup(i, 0).unwrap().walls.contains(&id));
            assert!(top.tiles.contains(&(i as usize)));
        }
    }

    #[test]
    fn test_stacked_solids_cancel_and_merge_sides() {
        let (_, walls) = build(&["1", "1"]);
        assert_eq!(walls.len(), 4);
        assert!(find(&walls, v(8.0, 0.0), v(8.0, 16.0)).is_some());
        assert!(find(&walls, v(0.0, 16.0), v(0.0, 0.0)).is_some());
    }

    #[test]
    fn test_one_way_and_weak_cancel() {
        // upper bottom WEAK against lower top ONE_WAY
        let (_, walls) = build(&["2", "2"]);
        assert_eq!(walls.len(), 2);
        let kinds: Vec<EdgeKind> = walls.iter().map(|(_, w)| w.kind).collect();
        assert!(kinds.contains(&EdgeKind::OneWay));
        assert!(kinds.contains(&EdgeKind::Weak));
        assert!(walls.iter().all(|(_, w)| (w.segment.p0.y - 8.0).abs() > 1e-4));

        let (_, walls) = build(&["22"]);
        assert_eq!(walls.len(), 2);
        assert!(find(&walls, v(0.0, 0.0), v(16.0, 0.0)).is_some());
    }

    #[test]
    fn test_weak_cancels_stored_one_way() {
        // upper bottom ONE_WAY against lower top WEAK
        let (_, walls) = build(&["3", "3"]);
        assert_eq!(walls.len(), 2);
        assert!(walls.iter().all(|(_, w)| (w.segment.p0.y - 8.0).abs() > 1e-4));
        assert_eq!(walls.cancellations(), 1);

        // left ONE_WAY on the right side against the next tile's WEAK left side
        let (_, walls) = build(&["55"]);
        assert_eq!(walls.len(), 2);
        assert_eq!(on_line_x(&walls, 8.0), 0);
        let kinds: Vec<EdgeKind> = walls.iter().map(|(_, w)| w.kind).collect();
        assert!(kinds.contains(&EdgeKind::OneWay));
        assert!(kinds.contains(&EdgeKind::Weak));
    }

    #[test]
    fn test_ladder_top_cancels_against_ladder() {
        let (_, walls) = build(&["6", "6"]);
        assert_eq!(walls.len(), 4);
        let tops = walls.iter().filter(|(_, w)| w.kind == EdgeKind::LadderTop).count();
        assert_eq!(tops, 1);
        assert!(find(&walls, v(0.0, 0.0), v(8.0, 0.0)).is_some());
    }

    #[test]
    fn test_water_beside_solid_keeps_both_faces() {
        let (_, walls) = build(&["71"]);
        assert_eq!(walls.len(), 8);
        assert_eq!(on_line_x(&walls, 8.0), 2);
        assert_eq!(walls.cancellations(), 0);
        assert_eq!(walls.merges(), 0);
    }

    #[test]
    fn test_half_edge_leaves_exposed_remainder() {
        // DR 26 low has a half-height right side; the solid's upper left half stays
        let (map, walls) = build(&["f1"]);
        let (id, w) = find(&walls, v(8.0, 4.0), v(8.0, 0.0)).expect("residual");
        assert!(approx_eq(w.segment.normal, v(-1.0, 0.0)));
        assert_eq!(w.tiles, vec![1]);
        assert!(map.lookup(1, 0).unwrap().walls.contains(&id));
        assert!(!map.lookup(0, 0).unwrap().walls.contains(&id));
        assert_eq!(on_line_x(&walls, 8.0), 1);
    }

    #[test]
    fn test_partial_overlap_splits_between_tiles() {
        // DL 63 low beside a solid, both on a solid floor
        let (map, walls) = build(&["1l", "11"]);
        assert_eq!(walls.len(), 6);
        assert!(find(&walls, v(0.0, 0.0), v(8.0, 0.0)).is_some());
        assert!(find(&walls, v(8.0, 0.0), v(12.0, 8.0)).is_some());
        assert!(find(&walls, v(16.0, 8.0), v(16.0, 16.0)).is_some());
        assert!(find(&walls, v(16.0, 16.0), v(0.0, 16.0)).is_some());
        assert!(find(&walls, v(0.0, 16.0), v(0.0, 0.0)).is_some());
        let (id, ledge) = find(&walls, v(12.0, 8.0), v(16.0, 8.0)).expect("exposed ledge");
        assert!(approx_eq(ledge.segment.normal, v(0.0, -1.0)));
        assert_eq!(ledge.tiles, vec![3]);
        assert!(map.lookup(1, 1).unwrap().walls.contains(&id));
    }

    #[test]
    fn test_back_references_match() {
        let (map, walls) = build(&["0110", "1771", "1111"]);
        for (id, w) in walls.iter() {
            assert!(!w.tiles.is_empty(), "orphan wall {:?}", w);
            for &t in &w.tiles {
                assert!(map.entry(t).walls.contains(&id));
            }
        }
        for (index, e) in map.entries().iter().enumerate() {
            for id in &e.walls {
                assert!(walls.get(*id).unwrap().tiles.contains(&index));
            }
        }
    }

    #[test]
    fn test_empty_map_has_no_walls() {
        let (_, walls) = build(&["000", "000"]);
        assert!(walls.is_empty());
        assert!(walls.get(WallId(0)).is_none());
    }
}
