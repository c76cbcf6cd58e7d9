/// Collision layer: rectangles against the tile grid.
///
/// ## Model
///
/// Everything that moves is an axis-aligned rectangle in world pixels.
/// Only `Solid` tiles are rigid; every other class is sampled by point
/// (ladder, key, door, hazard) and never blocks movement.
///
/// ## Resolver contract
///
/// `query_map_collision` covers the tile range of the rectangle's bounding
/// box, clamped to the grid, and scans it row-major (x ascending inside y
/// ascending). The first overlapping solid tile wins, so the same input
/// always reports the same tile. Callers correct one axis per query and
/// retry, which is why the order matters.

use super::tile::TILE_SIZE;
use super::tilemap::Tilemap;

/// Axis-aligned rectangle in world pixels.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Rect { x, y, w, h }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        self.x + self.w / 2.0
    }

    #[inline]
    pub fn center_y(&self) -> f32 {
        self.y + self.h / 2.0
    }

    /// Overlap with non-zero measure on both axes. Touching edges do not
    /// count.
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }
}

/// World rectangle of the tile at grid cell (x, y).
#[inline]
pub fn tile_rect(x: usize, y: usize) -> Rect {
    Rect::new(x as f32 * TILE_SIZE, y as f32 * TILE_SIZE, TILE_SIZE, TILE_SIZE)
}

/// First solid tile overlapping `rect`, as that tile's rectangle.
pub fn query_map_collision(map: &Tilemap, rect: &Rect) -> Option<Rect> {
    if map.width() == 0 || map.height() == 0 {
        return None;
    }

    let cx = rect.center_x();
    let cy = rect.center_y();
    let half_w = rect.w / 2.0;
    let half_h = rect.h / 2.0;

    let start_x = (((cx - half_w) / TILE_SIZE).floor() as i64).max(0);
    let end_x = (((cx + half_w) / TILE_SIZE).floor() as i64).min(map.width() as i64 - 1);
    let start_y = (((cy - half_h) / TILE_SIZE).floor() as i64).max(0);
    let end_y = (((cy + half_h) / TILE_SIZE).floor() as i64).min(map.height() as i64 - 1);

    for y in start_y..=end_y {
        for x in start_x..=end_x {
            let (x, y) = (x as usize, y as usize);
            let solid = map.tile_at(x, y).is_some_and(|t| t.is_solid());
            if !solid {
                continue;
            }
            let tile = tile_rect(x, y);
            if rect.overlaps(&tile) {
                return Some(tile);
            }
        }
    }

    None
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tilemap::Tilemap;
    use proptest::prelude::*;

    fn map_from(rows: &[&str]) -> Tilemap {
        Tilemap::parse(rows).expect("valid fixture")
    }

    // ── Rect ──

    #[test]
    fn touching_edges_do_not_overlap() {
        let a = Rect::new(0.0, 0.0, 16.0, 16.0);
        let b = Rect::new(16.0, 0.0, 16.0, 16.0);
        let c = Rect::new(0.0, 16.0, 16.0, 16.0);
        assert!(!a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn partial_overlap_counts() {
        let a = Rect::new(0.0, 0.0, 16.0, 16.0);
        let b = Rect::new(15.5, 15.5, 16.0, 16.0);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    // ── query_map_collision ──

    #[test]
    fn standing_on_floor_is_not_a_hit() {
        let map = map_from(&[
            "   ",
            "   ",
            "GGG",
        ]);
        // bottom edge exactly on the floor's top
        let r = Rect::new(16.0, 0.0, 16.0, 32.0);
        assert_eq!(query_map_collision(&map, &r), None);
    }

    #[test]
    fn sinking_into_floor_hits_it() {
        let map = map_from(&[
            "   ",
            "   ",
            "GGG",
        ]);
        let r = Rect::new(16.0, 0.5, 16.0, 32.0);
        assert_eq!(query_map_collision(&map, &r), Some(tile_rect(1, 2)));
    }

    #[test]
    fn first_hit_is_row_major() {
        let map = map_from(&[
            " G ",
            "G G",
        ]);
        // covers (0..=2, 0..=1); (1,0) comes before (0,1) and (2,1)
        let r = Rect::new(8.0, 8.0, 32.0, 16.0);
        assert_eq!(query_map_collision(&map, &r), Some(tile_rect(1, 0)));
    }

    #[test]
    fn non_solid_tiles_never_collide() {
        let map = map_from(&[
            "LDOK",
            "^PM ",
        ]);
        let r = Rect::new(0.0, 0.0, 64.0, 32.0);
        assert_eq!(query_map_collision(&map, &r), None);
    }

    #[test]
    fn query_outside_grid_is_clamped() {
        let map = map_from(&[
            "G ",
            "  ",
        ]);
        // hangs off the top-left corner
        let r = Rect::new(-20.0, -20.0, 24.0, 24.0);
        assert_eq!(query_map_collision(&map, &r), Some(tile_rect(0, 0)));
        // entirely off-grid
        let far = Rect::new(500.0, 500.0, 16.0, 16.0);
        assert_eq!(query_map_collision(&map, &far), None);
    }

    fn open_room() -> Tilemap {
        map_from(&[
            "GGGGGGGGGG",
            "G        G",
            "G        G",
            "G        G",
            "G        G",
            "G        G",
            "GGGGGGGGGG",
        ])
    }

    proptest! {
        #[test]
        fn rect_inside_empty_region_never_hits(
            x in 16.0f32..128.0,
            y in 16.0f32..80.0,
            w in 0.5f32..16.0,
            h in 0.5f32..16.0,
        ) {
            let map = open_room();
            // interior spans [16, 144) x [16, 96)
            prop_assume!(x + w <= 144.0 && y + h <= 96.0);
            prop_assert_eq!(query_map_collision(&map, &Rect::new(x, y, w, h)), None);
        }

        #[test]
        fn rect_overlapping_wall_always_hits(
            y in 0.0f32..100.0,
            w in 0.5f32..40.0,
            h in 0.5f32..40.0,
            dx in 0.0f32..15.9,
        ) {
            let map = open_room();
            // left edge starts inside the left wall column [0, 16)
            let r = Rect::new(dx, y, w, h);
            prop_assert!(query_map_collision(&map, &r).is_some());
        }
    }
}
