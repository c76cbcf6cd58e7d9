/// Built-in levels.
///
/// Every level is a fixed 25 × 14 grid of tile codes, one string per row:
///
///   'G' = Ground (solid)         'L' = Ladder
///   'D' = Door (closed)          'O' = Door (open)
///   'K' = Key                    '^' = Spikes
///   'P' = Player spawn           'M' = Enemy spawn
///   ' ' = Empty
///
/// Spawn markers name the top tile of a two-tile-tall body, so the floor
/// sits two rows below them.

use crate::domain::tilemap::Tilemap;
use crate::error::{GameError, GameResult};

pub const LEVEL_WIDTH: usize = 25;
pub const LEVEL_HEIGHT: usize = 14;

/// One level as authored: display name plus map rows.
pub struct LevelDef {
    pub name: String,
    pub rows: Vec<String>,
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// Parse every level definition into a tilemap. Fails on the first bad
/// tile code or a level whose size differs from the built-in grid.
pub fn build_tilemaps(defs: &[LevelDef]) -> GameResult<Vec<Tilemap>> {
    if defs.is_empty() {
        return Err(GameError::NoLevels);
    }

    let mut maps = Vec::with_capacity(defs.len());
    for (level, def) in defs.iter().enumerate() {
        let map = Tilemap::parse(&def.rows)
            .map_err(|bad| GameError::LevelParse { level, line: bad.line, ch: bad.ch })?;

        let found = (map.width(), map.height());
        if found != (LEVEL_WIDTH, LEVEL_HEIGHT) {
            return Err(GameError::LevelSize {
                level,
                expected: (LEVEL_WIDTH, LEVEL_HEIGHT),
                found,
            });
        }
        log::debug!("level {} '{}' parsed", level + 1, def.name);
        maps.push(map);
    }
    Ok(maps)
}

/// Load the built-in level set.
pub fn load_levels() -> GameResult<(Vec<String>, Vec<Tilemap>)> {
    let defs = embedded_levels();
    let maps = build_tilemaps(&defs)?;
    let names = defs.into_iter().map(|d| d.name).collect();
    Ok((names, maps))
}

// ══════════════════════════════════════════════════════════════
// Embedded levels
// ══════════════════════════════════════════════════════════════

pub fn embedded_levels() -> Vec<LevelDef> {
    vec![
        make_embedded("Level 1 - First Steps", &[
            "GGGGGGGGGGGGGGGGGGGGGGGGG",
            "G                       G",
            "G                       G",
            "G                  K    G",
            "G                 GGGG  G",
            "G   K                   G",
            "G  GGGG    GGGG      D  G",
            "G                    D  G",
            "GGGGGGGLGGGGGGG   GGGGGGG",
            "G      L                G",
            "G P    L       M        G",
            "G      L   ^^           G",
            "GGGGGGGGGGGGGGGGGGGGGGGGG",
            "GGGGGGGGGGGGGGGGGGGGGGGGG",
        ]),
        make_embedded("Level 2 - Twin Shafts", &[
            "GGGGGGGGGGGGGGGGGGGGGGGGG",
            "G  K        D          KG",
            "G           D           G",
            "GGGGGL   GGGGGGGG   LGGGG",
            "G    L      M       L   G",
            "G    L              L   G",
            "G    L  GGGGGGGGGG  L   G",
            "G    L   M          L   G",
            "G    L         K    L   G",
            "GGGGGGGLGGGGGGGGGGGGGGGGG",
            "G P    L           M    G",
            "G      L     ^^^        G",
            "GGGGGGGGGGGGGGGGGGGGGGGGG",
            "GGGGGGGGGGGGGGGGGGGGGGGGG",
        ]),
        make_embedded("Level 3 - Spike Gallery", &[
            "GGGGGGGGGGGGGGGGGGGGGGGGG",
            "G K           M        DG",
            "G                      DG",
            "GGGG  GGGLG  GGGGLGG  GGG",
            "G        L       L      G",
            "G        L       L      G",
            "G  GGG   L ^^^^  L  GGG G",
            "G M      L GGGG  L   M  G",
            "G               KL      G",
            "GGGGG  GGGGGG  GGGGGGLGGG",
            "G P         M        L  G",
            "G    ^^           K  L  G",
            "GGGGGGGGGGGGGGGGGGGGGGGGG",
            "GGGGGGGGGGGGGGGGGGGGGGGGG",
        ]),
    ]
}

fn make_embedded(name: &str, map: &[&str]) -> LevelDef {
    LevelDef {
        name: name.to_string(),
        rows: map.iter().map(|s| s.to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tile::Tile;

    #[test]
    fn embedded_levels_parse() {
        let (names, maps) = load_levels().unwrap();
        assert_eq!(names.len(), maps.len());
        assert_eq!(names[0], "Level 1 - First Steps");
        for map in &maps {
            assert_eq!((map.width(), map.height()), (LEVEL_WIDTH, LEVEL_HEIGHT));
        }
    }

    #[test]
    fn embedded_levels_have_spawn_keys_and_doors() {
        let (_, maps) = load_levels().unwrap();
        for (i, map) in maps.iter().enumerate() {
            assert_eq!(map.count(Tile::PlayerSpawn), 1, "level {}", i + 1);
            assert!(map.count(Tile::Key) > 0, "level {}", i + 1);
            assert!(map.count(Tile::DoorClosed) > 0, "level {}", i + 1);
            assert_eq!(map.count(Tile::DoorOpen), 0, "level {}", i + 1);
        }
    }

    #[test]
    fn bad_code_reports_level_and_line() {
        let mut defs = embedded_levels();
        defs[1].rows[3].replace_range(2..3, "#");
        let err = build_tilemaps(&defs).err().unwrap();
        assert!(matches!(err, GameError::LevelParse { level: 1, line: 4, ch: '#' }));
    }

    #[test]
    fn wrong_size_is_rejected() {
        let defs = vec![make_embedded("tiny", &["GGG", "G G", "GGG"])];
        let err = build_tilemaps(&defs).err().unwrap();
        assert!(matches!(
            err,
            GameError::LevelSize { level: 0, expected: (25, 14), found: (3, 3) }
        ));
    }

    #[test]
    fn empty_level_set_is_rejected() {
        assert!(matches!(build_tilemaps(&[]).err().unwrap(), GameError::NoLevels));
    }
}
