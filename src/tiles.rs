//! Tile types and their fixed edge templates.

use glam::Vec2;

use crate::geometry::Segment;
use crate::types::EdgeKind;

/// Terrain kind of one grid cell. Discriminants are the map-format indices.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TileType {
    #[default]
    Empty = 0,
    Solid,

    OneWayU,
    OneWayD,
    OneWayL,
    OneWayR,

    Ladder,
    Water,

    Dl45,
    Dr45,
    Ul45,
    Ur45,

    Dl26High,
    Dl26Low,
    Dr26High,
    Dr26Low,
    Ul26High,
    Ul26Low,
    Ur26High,
    Ur26Low,

    Dl63High,
    Dl63Low,
    Dr63High,
    Dr63Low,
    Ul63High,
    Ul63Low,
    Ur63High,
    Ur63Low,
}

impl TileType {
    pub const COUNT: usize = 28;

    pub const ALL: [TileType; Self::COUNT] = {
        use TileType::*;
        [
            Empty, Solid, OneWayU, OneWayD, OneWayL, OneWayR, Ladder, Water,
            Dl45, Dr45, Ul45, Ur45,
            Dl26High, Dl26Low, Dr26High, Dr26Low, Ul26High, Ul26Low, Ur26High, Ur26Low,
            Dl63High, Dl63Low, Dr63High, Dr63Low, Ul63High, Ul63Low, Ur63High, Ur63Low,
        ]
    };

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Map-format character: `0`-`9` then `a`.. (case-insensitive).
    pub fn from_map_char(c: char) -> Option<Self> {
        let c = c.to_ascii_lowercase();
        let index = match c {
            '0'..='9' => c as usize - '0' as usize,
            'a'..='z' => c as usize - 'a' as usize + 10,
            _ => return None,
        };
        Self::from_index(index)
    }

    pub fn to_map_char(self) -> char {
        let i = self.index() as u8;
        if i < 10 { (b'0' + i) as char } else { (b'a' + i - 10) as char }
    }

    /// Types that form regions.
    pub fn is_region_kind(self) -> bool {
        matches!(self, TileType::Water | TileType::Ladder)
    }
}

/// One template edge in tile-local space.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Edge {
    pub segment: Segment,
    pub kind: EdgeKind,
}

impl Edge {
    pub fn new(p0: Vec2, p1: Vec2, kind: EdgeKind) -> Self {
        Self { segment: Segment::new(p0, p1), kind }
    }
}

/// Mirror applied when deriving a template from another one.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Flip {
    pub horizontal: bool,
    pub vertical: bool,
}

impl Flip {
    pub const H: Flip = Flip { horizontal: true, vertical: false };
    pub const V: Flip = Flip { horizontal: false, vertical: true };
    pub const HV: Flip = Flip { horizontal: true, vertical: true };
}

/// Clockwise edge list of one tile type.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TileTemplate {
    pub edges: Vec<Edge>,
}

impl TileTemplate {
    fn with(edges: Vec<Edge>) -> Self {
        Self { edges }
    }

    /// Mirror across the tile midlines. Each mirror swaps endpoint order so the
    /// winding stays clockwise and normals keep facing out of solid space.
    pub fn flipped(&self, flip: Flip, size: Vec2) -> Self {
        let edges = self
            .edges
            .iter()
            .map(|e| {
                let (mut p0, mut p1) = (e.segment.p0, e.segment.p1);
                if flip.horizontal {
                    p0.x = size.x - p0.x;
                    p1.x = size.x - p1.x;
                    core::mem::swap(&mut p0, &mut p1);
                }
                if flip.vertical {
                    p0.y = size.y - p0.y;
                    p1.y = size.y - p1.y;
                    core::mem::swap(&mut p0, &mut p1);
                }
                Edge::new(p0, p1, e.kind)
            })
            .collect();
        Self { edges }
    }
}

/// Read-only table of templates for every [`TileType`], built once per tile size.
#[derive(Clone, Debug)]
pub struct TileCatalog {
    size: Vec2,
    tiles: Vec<TileTemplate>,
}

impl TileCatalog {
    pub fn new(tile_width: f32, tile_height: f32) -> Self {
        let size = Vec2::new(tile_width, tile_height);
        let mut cat = Self { size, tiles: vec![TileTemplate::default(); TileType::COUNT] };
        cat.make_tiles();
        cat
    }

    pub fn tile_size(&self) -> Vec2 {
        self.size
    }

    pub fn template(&self, t: TileType) -> &TileTemplate {
        &self.tiles[t.index()]
    }

    fn set(&mut self, t: TileType, template: TileTemplate) {
        self.tiles[t.index()] = template;
    }

    /// Store `base` under `types[0]` and its H, V and H+V mirrors under the rest.
    fn set_family(&mut self, types: [TileType; 4], base: TileTemplate) {
        let size = self.size;
        self.set(types[1], base.flipped(Flip::H, size));
        self.set(types[2], base.flipped(Flip::V, size));
        self.set(types[3], base.flipped(Flip::HV, size));
        self.set(types[0], base);
    }

    fn make_tiles(&mut self) {
        use EdgeKind as K;
        use TileType::*;

        let (w, h) = (self.size.x, self.size.y);
        let ul = Vec2::new(0.0, 0.0);
        let ur = Vec2::new(w, 0.0);
        let dr = Vec2::new(w, h);
        let dl = Vec2::new(0.0, h);

        self.set(Empty, TileTemplate::default());

        self.set(
            Ladder,
            TileTemplate::with(vec![
                Edge::new(ul, ur, K::LadderTop),
                Edge::new(ur, dr, K::Ladder),
                Edge::new(dr, dl, K::Ladder),
                Edge::new(dl, ul, K::Ladder),
            ]),
        );

        self.set(
            Water,
            TileTemplate::with(vec![
                Edge::new(ul, ur, K::Water),
                Edge::new(ur, dr, K::Water),
                Edge::new(dr, dl, K::Water),
                Edge::new(dl, ul, K::Water),
            ]),
        );

        self.set(
            Solid,
            TileTemplate::with(vec![
                Edge::new(ul, ur, K::Solid),
                Edge::new(ur, dr, K::Solid),
                Edge::new(dr, dl, K::Solid),
                Edge::new(dl, ul, K::Solid),
            ]),
        );

        let up = TileTemplate::with(vec![Edge::new(ul, ur, K::OneWay), Edge::new(dr, dl, K::Weak)]);
        self.set(OneWayD, up.flipped(Flip::V, self.size));
        self.set(OneWayU, up);

        let left = TileTemplate::with(vec![Edge::new(ur, dr, K::Weak), Edge::new(dl, ul, K::OneWay)]);
        self.set(OneWayR, left.flipped(Flip::H, self.size));
        self.set(OneWayL, left);

        self.set_family(
            [Dl45, Dr45, Ul45, Ur45],
            TileTemplate::with(vec![
                Edge::new(ul, dr, K::Solid),
                Edge::new(dr, dl, K::Solid),
                Edge::new(dl, ul, K::Solid),
            ]),
        );

        // 26 degrees: the high tile rises to mid-right, the low one starts at mid-left
        let mid_right = Vec2::new(w, h / 2.0);
        self.set_family(
            [Dl26High, Dr26High, Ul26High, Ur26High],
            TileTemplate::with(vec![
                Edge::new(ul, mid_right, K::Solid),
                Edge::new(mid_right, dr, K::Solid),
                Edge::new(dr, dl, K::Solid),
                Edge::new(dl, ul, K::Solid),
            ]),
        );
        let mid_left = Vec2::new(0.0, h / 2.0);
        self.set_family(
            [Dl26Low, Dr26Low, Ul26Low, Ur26Low],
            TileTemplate::with(vec![
                Edge::new(mid_left, dr, K::Solid),
                Edge::new(dr, dl, K::Solid),
                Edge::new(dl, mid_left, K::Solid),
            ]),
        );

        // 63 degrees: the low tile reaches mid-bottom, the high one continues from mid-top
        let mid_top = Vec2::new(w / 2.0, 0.0);
        self.set_family(
            [Dl63High, Dr63High, Ul63High, Ur63High],
            TileTemplate::with(vec![
                Edge::new(ul, mid_top, K::Solid),
                Edge::new(mid_top, dr, K::Solid),
                Edge::new(dr, dl, K::Solid),
                Edge::new(dl, ul, K::Solid),
            ]),
        );
        let mid_bottom = Vec2::new(w / 2.0, h);
        self.set_family(
            [Dl63Low, Dr63Low, Ul63Low, Ur63Low],
            TileTemplate::with(vec![
                Edge::new(ul, mid_bottom, K::Solid),
                Edge::new(mid_bottom, dl, K::Solid),
                Edge::new(dl, ul, K::Solid),
            ]),
        );
    }
}
