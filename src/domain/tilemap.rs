/// Tilemap: one level's grid plus its pristine copy.
///
/// Two tile layers:
///   - `pristine`: the level as loaded. **Never mutated** after load.
///   - `tiles`: the working grid (pristine + runtime changes).
///
/// All mutations go through `set_tile()`, `open_all_doors()` and
/// `reset_to_initial()`. Dimensions are fixed at construction.

use super::tile::{Tile, TILE_SIZE};

#[derive(Clone, Debug, PartialEq)]
pub struct Tilemap {
    width: usize,
    height: usize,
    tiles: Vec<Vec<Tile>>,
    pristine: Vec<Vec<Tile>>,
}

/// A level row contained a character that is not a tile code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BadTile {
    pub line: usize,
    pub ch: char,
}

// ── Construction ──

impl Tilemap {
    /// Build from rows of tiles. Short rows are padded with `Empty` to the
    /// widest row.
    pub fn from_rows(mut rows: Vec<Vec<Tile>>) -> Self {
        let width = rows.iter().map(|r| r.len()).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(width, Tile::Empty);
        }
        Tilemap {
            width,
            height: rows.len(),
            pristine: rows.clone(),
            tiles: rows,
        }
    }

    /// Parse level text, one string per row.
    pub fn parse<S: AsRef<str>>(rows: &[S]) -> Result<Self, BadTile> {
        let mut grid = Vec::with_capacity(rows.len());
        for (line, row) in rows.iter().enumerate() {
            let mut out = Vec::with_capacity(row.as_ref().len());
            for ch in row.as_ref().chars() {
                match Tile::from_code(ch) {
                    Some(t) => out.push(t),
                    None => return Err(BadTile { line: line + 1, ch }),
                }
            }
            grid.push(out);
        }
        Ok(Tilemap::from_rows(grid))
    }
}

// ── Queries ──

impl Tilemap {
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Bounds-checked lookup.
    #[inline]
    pub fn tile_at(&self, x: usize, y: usize) -> Option<Tile> {
        self.tiles.get(y).and_then(|row| row.get(x)).copied()
    }

    /// Tile under a world-pixel point. The point is clamped into the grid
    /// first, so samples past an edge read the border tile.
    pub fn tile_at_point(&self, px: f32, py: f32) -> Tile {
        match self.cell_at_point(px, py) {
            Some((x, y)) => self.tiles[y][x],
            None => Tile::Empty,
        }
    }

    /// Grid cell under a world-pixel point, clamped into the grid.
    /// `None` only for a zero-sized map.
    pub fn cell_at_point(&self, px: f32, py: f32) -> Option<(usize, usize)> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        Some((clamp_index(px, self.width), clamp_index(py, self.height)))
    }

    /// First cell holding `tile`, row-major. `None` when absent.
    pub fn find_first(&self, tile: Tile) -> Option<(usize, usize)> {
        self.cells().find(|&(_, _, t)| t == tile).map(|(x, y, _)| (x, y))
    }

    /// Every cell holding `tile`, row-major.
    pub fn find_all(&self, tile: Tile) -> Vec<(usize, usize)> {
        self.cells().filter(|&(_, _, t)| t == tile).map(|(x, y, _)| (x, y)).collect()
    }

    pub fn count(&self, tile: Tile) -> usize {
        self.cells().filter(|&(_, _, t)| t == tile).count()
    }

    /// Cells whose working tile differs from the pristine snapshot.
    pub fn diff_from_pristine(&self) -> Vec<(usize, usize)> {
        self.cells()
            .filter(|&(x, y, t)| self.pristine[y][x] != t)
            .map(|(x, y, _)| (x, y))
            .collect()
    }

    /// Rows of the working grid, for renderers.
    pub fn rows(&self) -> &[Vec<Tile>] {
        &self.tiles
    }

    /// Level text: one line per row, newline-terminated.
    pub fn export(&self) -> String {
        let mut out = String::with_capacity((self.width + 1) * self.height);
        for row in &self.tiles {
            out.extend(row.iter().map(|t| t.code()));
            out.push('\n');
        }
        out
    }

    fn cells(&self) -> impl Iterator<Item = (usize, usize, Tile)> + '_ {
        self.tiles.iter().enumerate().flat_map(|(y, row)| {
            row.iter().enumerate().map(move |(x, &t)| (x, y, t))
        })
    }
}

// ── Mutation ──

impl Tilemap {
    /// Set a working tile. Out-of-range cells are ignored.
    #[inline]
    pub fn set_tile(&mut self, x: usize, y: usize, tile: Tile) {
        if x < self.width && y < self.height {
            self.tiles[y][x] = tile;
        }
    }

    /// Turn every closed door into an open one. Returns how many changed.
    pub fn open_all_doors(&mut self) -> usize {
        let mut opened = 0;
        for tile in self.tiles.iter_mut().flatten() {
            if *tile == Tile::DoorClosed {
                *tile = Tile::DoorOpen;
                opened += 1;
            }
        }
        opened
    }

    /// Restore the working grid from the pristine snapshot.
    pub fn reset_to_initial(&mut self) {
        self.tiles.clone_from(&self.pristine);
    }
}

#[inline]
fn clamp_index(p: f32, len: usize) -> usize {
    let i = (p / TILE_SIZE).floor();
    if i <= 0.0 {
        0
    } else {
        (i as usize).min(len - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn map_from(rows: &[&str]) -> Tilemap {
        Tilemap::parse(rows).expect("valid fixture")
    }

    #[test]
    fn parse_pads_short_rows() {
        let m = map_from(&["GGG", "G"]);
        assert_eq!((m.width(), m.height()), (3, 2));
        assert_eq!(m.tile_at(2, 1), Some(Tile::Empty));
    }

    #[test]
    fn parse_rejects_unknown_code() {
        let err = Tilemap::parse(&["GG", "G#"]).unwrap_err();
        assert_eq!(err, BadTile { line: 2, ch: '#' });
    }

    #[test]
    fn tile_at_out_of_range_is_none() {
        let m = map_from(&["G"]);
        assert_eq!(m.tile_at(1, 0), None);
        assert_eq!(m.tile_at(0, 1), None);
    }

    #[test]
    fn point_samples_are_clamped() {
        let m = map_from(&[
            "GL",
            "K^",
        ]);
        assert_eq!(m.tile_at_point(-50.0, -50.0), Tile::Ground);
        assert_eq!(m.tile_at_point(999.0, -1.0), Tile::Ladder);
        assert_eq!(m.tile_at_point(-1.0, 999.0), Tile::Key);
        assert_eq!(m.tile_at_point(16.0, 16.0), Tile::Spikes);
        assert_eq!(m.tile_at_point(f32::NAN, 0.0), Tile::Ground);
    }

    #[test]
    fn find_first_is_row_major() {
        let m = map_from(&[
            "  K",
            "K  ",
        ]);
        assert_eq!(m.find_first(Tile::Key), Some((2, 0)));
        assert_eq!(m.find_first(Tile::PlayerSpawn), None);
        assert_eq!(m.count(Tile::Key), 2);
    }

    #[test]
    fn open_all_doors_only_touches_closed_doors() {
        let mut m = map_from(&["DOD G"]);
        assert_eq!(m.open_all_doors(), 2);
        assert_eq!(m.export(), "OOO G\n");
        assert_eq!(m.open_all_doors(), 0);
    }

    #[test]
    fn export_is_one_line_per_row() {
        let m = map_from(&["G L", "PKM"]);
        assert_eq!(m.export(), "G L\nPKM\n");
    }

    #[test]
    fn set_tile_out_of_range_is_ignored() {
        let mut m = map_from(&["G"]);
        m.set_tile(4, 4, Tile::Key);
        assert!(m.diff_from_pristine().is_empty());
    }

    fn any_tile() -> impl Strategy<Value = Tile> {
        proptest::sample::select(crate::domain::tile::ALL_TILES.to_vec())
    }

    proptest! {
        #[test]
        fn reset_restores_pristine(
            edits in proptest::collection::vec((0usize..8, 0usize..5, any_tile()), 0..40),
            open_doors in any::<bool>(),
        ) {
            let mut m = map_from(&[
                "GGGGGGGG",
                "G K  D G",
                "G LMP  G",
                "G L ^^ G",
                "GGGGGGGG",
            ]);
            let before = m.export();
            for (x, y, t) in edits {
                m.set_tile(x, y, t);
            }
            if open_doors {
                m.open_all_doors();
            }
            m.reset_to_initial();
            prop_assert!(m.diff_from_pristine().is_empty());
            prop_assert_eq!(m.export(), before);
        }
    }
}
