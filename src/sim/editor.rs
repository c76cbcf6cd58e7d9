/// In-game tile editor: a brush, mouse painting, and export to text.
///
/// Painting touches only the working grid of the current level. The
/// pristine copy is left alone, so a level wrap or restart undoes edits.

use std::path::Path;

use crate::domain::tile::Tile;
use crate::domain::tilemap::Tilemap;
use crate::error::GameResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Brush {
    pub tile: Tile,
}

impl Default for Brush {
    fn default() -> Self {
        Brush { tile: Tile::Empty }
    }
}

impl Brush {
    /// Select the tile named by a key. Letters are case-insensitive, space
    /// selects Empty. Returns false for keys that name no tile.
    pub fn select(&mut self, key: char) -> bool {
        match Tile::from_code(key.to_ascii_uppercase()) {
            Some(tile) => {
                self.tile = tile;
                true
            }
            None => false,
        }
    }

    /// Paint at grid cell (x, y). Returns whether the cell existed.
    pub fn paint(&self, map: &mut Tilemap, x: usize, y: usize) -> bool {
        if x >= map.width() || y >= map.height() {
            return false;
        }
        map.set_tile(x, y, self.tile);
        true
    }
}

/// Write the working grid to `path` as level text.
pub fn save_tilemap(path: &Path, map: &Tilemap) -> GameResult<()> {
    std::fs::write(path, map.export())?;
    Ok(())
}
