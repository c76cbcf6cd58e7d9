/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Screen layout: HUD on row 0, the map from row 2 with every tile drawn
/// as 2 terminal columns × 1 row, then a message bar and a help line.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::entity::{Facing, PlayerMotion};
use crate::domain::physics::Rect;
use crate::domain::tile::{Tile, TILE_SIZE};
use crate::sim::editor::Brush;
use crate::sim::world::{GameState, Phase};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells, so the
    /// inter-row gap colour on VTE terminals matches the cells.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel cell used to invalidate the back buffer.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    #[inline]
    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        };
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y). Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width {
                break;
            }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', Color::White, bg));
        }
    }
}

// ── Tile atlas ──

/// Two glyphs plus colours for one tile.
#[derive(Clone, Copy)]
struct Glyph {
    left: char,
    right: char,
    fg: Color,
    bg: Color,
}

const fn glyph(left: char, right: char, fg: Color, bg: Color) -> Glyph {
    Glyph { left, right, fg, bg }
}

/// Drawable cell for every tile code. Spawn markers are not drawn in play.
fn atlas(tile: Tile) -> Glyph {
    match tile {
        Tile::Empty | Tile::PlayerSpawn | Tile::EnemySpawn => {
            glyph(' ', ' ', Color::Reset, Color::Reset)
        }
        Tile::Ground => glyph('▓', '▓', Color::Rgb { r: 150, g: 110, b: 60 }, Color::Rgb { r: 90, g: 60, b: 30 }),
        Tile::Ladder => glyph('╠', '╣', Color::Rgb { r: 100, g: 200, b: 255 }, Color::Reset),
        Tile::DoorClosed => glyph('▐', '▌', Color::Rgb { r: 200, g: 60, b: 60 }, Color::Rgb { r: 60, g: 20, b: 20 }),
        Tile::DoorOpen => glyph('░', '░', Color::Rgb { r: 80, g: 255, b: 80 }, Color::Rgb { r: 10, g: 60, b: 10 }),
        Tile::Key => glyph('o', '┐', Color::Rgb { r: 255, g: 220, b: 50 }, Color::Reset),
        Tile::Spikes => glyph('▲', '▲', Color::Rgb { r: 220, g: 220, b: 220 }, Color::Reset),
    }
}

/// Name shown next to the brush code in the HUD.
fn brush_label(tile: Tile) -> &'static str {
    match tile {
        Tile::Empty => "Empty",
        Tile::Ground => "Ground",
        Tile::Ladder => "Ladder",
        Tile::DoorClosed => "Door",
        Tile::DoorOpen => "Open door",
        Tile::Key => "Key",
        Tile::Spikes => "Spikes",
        Tile::PlayerSpawn => "Player spawn",
        Tile::EnemySpawn => "Enemy spawn",
    }
}

// ── Layout ──

/// Each game cell = 2 terminal columns.
const CELL_W: usize = 2;

const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const MSG_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };

/// Map a terminal cell to the tile cell under it, if it lies inside the
/// map area.
pub fn screen_to_tile(col: u16, row: u16, map_w: usize, map_h: usize) -> Option<(usize, usize)> {
    let row = (row as usize).checked_sub(MAP_ROW)?;
    let x = col as usize / CELL_W;
    (x < map_w && row < map_h).then_some((x, row))
}

/// Tile cell holding a world-pixel coordinate, for sprite placement.
#[inline]
fn cell_of(p: f32) -> i64 {
    (p / TILE_SIZE).round() as i64
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame.
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            DisableMouseCapture,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, world: &GameState, brush: Brush) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // Phase change → clear for clean transition
        if self.last_phase != Some(world.phase) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_phase = Some(world.phase);
        }

        self.front.clear();
        self.compose_game(world, brush);
        if world.hud().game_over {
            self.compose_game_over(world);
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);

        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        // Explicit base colours, never ResetColor: the terminal default may
        // differ from BASE_BG.
        queue!(self.writer, SetForegroundColor(Color::White), SetBackgroundColor(Cell::BASE_BG))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }

                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose_game(&mut self, w: &GameState, brush: Brush) {
        let hud = w.hud();
        let map = w.tilemap();

        // ── HUD row ──
        let line = format!(
            " Level {}/{}  Lives {}  Time {:>3}  Keys {}  │  Brush [{}] {}",
            hud.level,
            hud.level_count,
            hud.lives,
            hud.time_left.ceil() as u32,
            hud.keys_left,
            brush.tile.code(),
            brush_label(brush.tile),
        );
        self.front.fill_row(HUD_ROW, HUD_BG);
        self.front.put_str(0, HUD_ROW, &line, Color::White, HUD_BG);

        // ── Map ──
        for (gy, row) in map.rows().iter().enumerate() {
            for (gx, &tile) in row.iter().enumerate() {
                let g = atlas(tile);
                let (col, r) = (gx * CELL_W, MAP_ROW + gy);
                self.front.set(col, r, Cell::new(g.left, g.fg, g.bg));
                self.front.set(col + 1, r, Cell::new(g.right, g.fg, g.bg));
            }
        }

        // ── Sprites ──
        for enemy in w.enemies() {
            let (l, r) = match enemy.facing {
                Facing::Left => ('<', 'M'),
                Facing::Right => ('M', '>'),
            };
            self.compose_sprite(enemy.rect(), [('▛', '▜'), (l, r)], Color::Rgb { r: 255, g: 80, b: 80 });
        }

        let head = match w.player.facing {
            Facing::Left => ('◂', '●'),
            Facing::Right => ('●', '▸'),
        };
        let body = match w.player.motion {
            PlayerMotion::OnLadder | PlayerMotion::AboveLadderTop => ('╟', '╢'),
            PlayerMotion::Airborne => ('/', '\\'),
            PlayerMotion::Grounded => ('▌', '▐'),
        };
        self.compose_sprite(w.player_rect(), [head, body], Color::Rgb { r: 80, g: 255, b: 200 });

        // ── Message bar ──
        let msg_row = MAP_ROW + map.height() + 1;
        if !w.message.is_empty() {
            self.front.fill_row(msg_row, MSG_BG);
            self.front.put_str(0, msg_row, &format!(" ◈ {} ", w.message), Color::Black, MSG_BG);
        }

        // ── Help bar ──
        let help = " ←→ Move  ↑↓ Climb  ↑ Jump  │  Keys GLDOK^PM/Space: Brush  Click: Paint  Ctrl+S: Export  Esc: Quit";
        self.front.put_str(0, msg_row + 2, help, Color::DarkGrey, Color::Reset);
    }

    /// Draw a two-row sprite at the tile cells its rectangle occupies.
    fn compose_sprite(&mut self, rect: Rect, rows: [(char, char); 2], fg: Color) {
        let gx = cell_of(rect.x);
        let gy = cell_of(rect.y);
        for (i, (l, r)) in rows.iter().enumerate() {
            let row = gy + i as i64;
            if gx < 0 || row < 0 {
                continue;
            }
            let col = gx as usize * CELL_W;
            let row = MAP_ROW + row as usize;
            self.front.set(col, row, Cell::new(*l, fg, Color::Reset));
            self.front.set(col + 1, row, Cell::new(*r, fg, Color::Reset));
        }
    }

    fn compose_game_over(&mut self, w: &GameState) {
        let red = Color::Rgb { r: 255, g: 60, b: 60 };
        let dim = Color::Rgb { r: 40, g: 40, b: 40 };
        let box_art = [
            "╔══════════════════════════════╗",
            "║          GAME  OVER          ║",
            "╚══════════════════════════════╝",
        ];
        let map_w = w.tilemap().width() * CELL_W;
        let x = map_w.saturating_sub(box_art[0].chars().count()) / 2;
        let y = MAP_ROW + 3;
        for (i, l) in box_art.iter().enumerate() {
            self.front.put_str(x, y + i, l, red, dim);
        }
        let reached = format!("  Reached level {}            ", w.current_level + 1);
        self.front.put_str(x, y + 4, &reached, Color::White, dim);
        self.front.put_str(x, y + 5, "  R / Start: Restart  Esc: Quit ", Color::Rgb { r: 80, g: 255, b: 80 }, dim);
    }
}
