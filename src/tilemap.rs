use std::path::Path;

use glam::Vec2;

use crate::error::MapLoadError;
use crate::tiles::TileType;
use crate::types::{RegionId, WallId};

/// Raw width x height grid of tile types, as read from a map file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileGrid {
    width: u32,
    height: u32,
    cells: Vec<TileType>,
}

impl TileGrid {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, cells: vec![TileType::Empty; width as usize * height as usize] }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, i: i32, j: i32) -> Option<TileType> {
        self.offset(i, j).map(|o| self.cells[o])
    }

    pub fn set(&mut self, i: i32, j: i32, t: TileType) {
        if let Some(o) = self.offset(i, j) {
            self.cells[o] = t;
        }
    }

    fn offset(&self, i: i32, j: i32) -> Option<usize> {
        if i >= 0 && j >= 0 && (i as u32) < self.width && (j as u32) < self.height {
            Some(j as usize * self.width as usize + i as usize)
        } else {
            None
        }
    }

    /// Parse the map text format: one character per cell, row-major, `0`-`9` and
    /// `a`.. for tile indices, line breaks ignored. Characters after the last
    /// cell are not read.
    pub fn parse(text: &str, width: u32, height: u32) -> Result<Self, MapLoadError> {
        let expected = width as usize * height as usize;
        let mut cells = Vec::with_capacity(expected);
        for (offset, ch) in text.char_indices() {
            if cells.len() == expected {
                break;
            }
            if ch == '\n' || ch == '\r' {
                continue;
            }
            match TileType::from_map_char(ch) {
                Some(t) => cells.push(t),
                None => return Err(MapLoadError::InvalidChar { ch, offset }),
            }
        }
        if cells.len() < expected {
            return Err(MapLoadError::Truncated { expected, found: cells.len() });
        }
        Ok(Self { width, height, cells })
    }

    pub fn load(path: impl AsRef<Path>, width: u32, height: u32) -> Result<Self, MapLoadError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|source| MapLoadError::Io { path: path.to_path_buf(), source })?;
        Self::parse(&text, width, height)
    }

    /// Inverse of [`TileGrid::parse`], one row per line.
    pub fn to_map_text(&self) -> String {
        let mut out = String::with_capacity(self.cells.len() + self.height as usize);
        for row in self.cells.chunks(self.width.max(1) as usize) {
            out.extend(row.iter().map(|t| t.to_map_char()));
            out.push('\n');
        }
        out
    }

    /// Build a grid from rows of map characters; handy for small hand-made maps.
    pub fn from_rows(rows: &[&str]) -> Result<Self, MapLoadError> {
        let height = rows.len() as u32;
        let width = rows.first().map_or(0, |r| r.chars().count());
        if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.chars().count() != width) {
            return Err(MapLoadError::RaggedRow { row, expected: width, found: r.chars().count() });
        }
        Self::parse(&rows.concat(), width as u32, height)
    }
}

/// Run-time record of one grid cell.
#[derive(Clone, Debug, PartialEq)]
pub struct TileEntry {
    pub tile: TileType,
    /// Upper-left corner in world units.
    pub corner: Vec2,
    pub i: i32,
    pub j: i32,
    /// Walls currently bordering this cell.
    pub walls: Vec<WallId>,
    pub region: Option<RegionId>,
}

impl TileEntry {
    pub(crate) fn remove_wall(&mut self, id: WallId) {
        self.walls.retain(|w| *w != id);
    }

    pub(crate) fn add_wall(&mut self, id: WallId) {
        if !self.walls.contains(&id) {
            self.walls.push(id);
        }
    }
}

/// Arena of [`TileEntry`] records, row-major.
#[derive(Clone, Debug)]
pub struct TileMap {
    width: u32,
    height: u32,
    entries: Vec<TileEntry>,
}

impl TileMap {
    pub fn new(grid: &TileGrid, tile_size: Vec2) -> Self {
        let mut entries = Vec::with_capacity(grid.cells.len());
        for j in 0..grid.height as i32 {
            for i in 0..grid.width as i32 {
                entries.push(TileEntry {
                    tile: grid.get(i, j).unwrap_or_default(),
                    corner: Vec2::new(i as f32, j as f32) * tile_size,
                    i,
                    j,
                    walls: Vec::new(),
                    region: None,
                });
            }
        }
        Self { width: grid.width, height: grid.height, entries }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn index_of(&self, i: i32, j: i32) -> Option<usize> {
        if i >= 0 && j >= 0 && (i as u32) < self.width && (j as u32) < self.height {
            Some(j as usize * self.width as usize + i as usize)
        } else {
            None
        }
    }

    /// `None` outside the map.
    pub fn lookup(&self, i: i32, j: i32) -> Option<&TileEntry> {
        self.index_of(i, j).map(|o| &self.entries[o])
    }

    pub fn entry(&self, index: usize) -> &TileEntry {
        &self.entries[index]
    }

    pub(crate) fn entry_mut(&mut self, index: usize) -> &mut TileEntry {
        &mut self.entries[index]
    }

    pub fn entries(&self) -> &[TileEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ignores_line_breaks_and_case() {
        let g = TileGrid::parse("01\r\n7A\n", 2, 2).unwrap();
        assert_eq!(g.get(0, 0), Some(TileType::Empty));
        assert_eq!(g.get(1, 0), Some(TileType::Solid));
        assert_eq!(g.get(0, 1), Some(TileType::Water));
        assert_eq!(g.get(1, 1), Some(TileType::Ul45));
        assert_eq!(g.get(2, 1), None);
        assert_eq!(g.get(-1, 0), None);
    }

    #[test]
    fn test_parse_rejects_bad_char() {
        match TileGrid::parse("01\n0z", 2, 2) {
            Err(MapLoadError::InvalidChar { ch, offset }) => {
                assert_eq!(ch, 'z');
                assert_eq!(offset, 4);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(TileGrid::parse("0 1\n00", 2, 2), Err(MapLoadError::InvalidChar { ch: ' ', .. })));
    }

    #[test]
    fn test_parse_rejects_short_map() {
        match TileGrid::parse("0110\n", 3, 2) {
            Err(MapLoadError::Truncated { expected, found }) => {
                assert_eq!(expected, 6);
                assert_eq!(found, 4);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_trailing_garbage_after_full_grid_is_ignored() {
        let g = TileGrid::parse("11\n11\n??", 2, 2).unwrap();
        assert_eq!(g.get(1, 1), Some(TileType::Solid));
    }

    #[test]
    fn test_rows_of_different_lengths_are_rejected() {
        let err = TileGrid::from_rows(&["0110", "011", "01100"]).unwrap_err();
        assert!(matches!(err, MapLoadError::RaggedRow { row: 1, expected: 4, found: 3 }));
        assert!(TileGrid::from_rows(&["01", "10"]).is_ok());
    }

    #[test]
    fn test_text_round_trip() {
        let g = TileGrid::from_rows(&["0167", "9abr"]).unwrap();
        assert_eq!(g.width(), 4);
        assert_eq!(g.height(), 2);
        assert_eq!(TileGrid::parse(&g.to_map_text(), 4, 2).unwrap(), g);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = TileGrid::load("/definitely/not/here.txt", 2, 2).unwrap_err();
        assert!(matches!(err, MapLoadError::Io { .. }));
        assert!(err.to_string().contains("can't open map"));
    }

    #[test]
    fn test_tilemap_lookup_bounds() {
        let g = TileGrid::from_rows(&["01", "10"]).unwrap();
        let map = TileMap::new(&g, Vec2::splat(8.0));
        assert_eq!(map.len(), 4);
        let e = map.lookup(1, 1).unwrap();
        assert_eq!(e.tile, TileType::Empty);
        assert_eq!(e.corner, Vec2::new(8.0, 8.0));
        assert_eq!((e.i, e.j), (1, 1));
        assert!(map.lookup(2, 0).is_none());
        assert!(map.lookup(0, -1).is_none());
    }
}
