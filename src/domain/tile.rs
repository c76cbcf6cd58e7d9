/// Tile types and their properties.
/// Properties are queried via methods, not stored as flags,
/// so tile semantics are centralized here.

/// Edge length of one tile in world pixels.
pub const TILE_SIZE: f32 = 16.0;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Tile {
    #[default]
    Empty,
    Ground,      // Solid
    Ladder,      // Climbable
    DoorClosed,  // Opens when the last key is taken
    DoorOpen,    // Touching it finishes the level
    Key,         // Pickup
    Spikes,      // Hazard
    PlayerSpawn, // Marker, not drawn in play
    EnemySpawn,  // Marker, not drawn in play
}

/// Semantic class of a tile.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TileClass {
    Empty,
    Solid,
    Ladder,
    Door { open: bool },
    Key,
    Hazard,
    SpawnMarker,
}

/// Every tile, in palette order.
pub const ALL_TILES: [Tile; 9] = [
    Tile::Empty,
    Tile::Ground,
    Tile::Ladder,
    Tile::DoorClosed,
    Tile::DoorOpen,
    Tile::Key,
    Tile::Spikes,
    Tile::PlayerSpawn,
    Tile::EnemySpawn,
];

impl Tile {
    /// Level-text character for this tile.
    pub fn code(self) -> char {
        match self {
            Tile::Empty => ' ',
            Tile::Ground => 'G',
            Tile::Ladder => 'L',
            Tile::DoorClosed => 'D',
            Tile::DoorOpen => 'O',
            Tile::Key => 'K',
            Tile::Spikes => '^',
            Tile::PlayerSpawn => 'P',
            Tile::EnemySpawn => 'M',
        }
    }

    /// Parse a level-text character. Unknown characters are `None`.
    pub fn from_code(ch: char) -> Option<Tile> {
        ALL_TILES.iter().copied().find(|t| t.code() == ch)
    }

    pub fn class(self) -> TileClass {
        match self {
            Tile::Empty => TileClass::Empty,
            Tile::Ground => TileClass::Solid,
            Tile::Ladder => TileClass::Ladder,
            Tile::DoorClosed => TileClass::Door { open: false },
            Tile::DoorOpen => TileClass::Door { open: true },
            Tile::Key => TileClass::Key,
            Tile::Spikes => TileClass::Hazard,
            Tile::PlayerSpawn | Tile::EnemySpawn => TileClass::SpawnMarker,
        }
    }

    /// Only solid tiles take part in rigid-body collision.
    pub fn is_solid(self) -> bool {
        self.class() == TileClass::Solid
    }

    pub fn is_ladder(self) -> bool {
        self.class() == TileClass::Ladder
    }

    pub fn is_hazard(self) -> bool {
        self.class() == TileClass::Hazard
    }

    /// Nothing visible: empty space or a spawn marker.
    pub fn is_blank(self) -> bool {
        matches!(self.class(), TileClass::Empty | TileClass::SpawnMarker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_unique() {
        for a in ALL_TILES {
            for b in ALL_TILES {
                if a != b {
                    assert_ne!(a.code(), b.code(), "{a:?} / {b:?}");
                }
            }
        }
    }

    #[test]
    fn from_code_inverts_code() {
        for t in ALL_TILES {
            assert_eq!(Tile::from_code(t.code()), Some(t));
        }
        assert_eq!(Tile::from_code('#'), None);
    }

    #[test]
    fn only_ground_is_solid() {
        let solid: Vec<Tile> = ALL_TILES.into_iter().filter(|t| t.is_solid()).collect();
        assert_eq!(solid, vec![Tile::Ground]);
    }
}
