/// Entities: Player and Enemy, plus the per-frame input snapshot.

use super::physics::Rect;
use super::tile::TILE_SIZE;

pub const PLAYER_W: f32 = TILE_SIZE;
pub const PLAYER_H: f32 = TILE_SIZE * 2.0;
pub const ENEMY_W: f32 = TILE_SIZE;
pub const ENEMY_H: f32 = TILE_SIZE * 2.0;

/// Upper bound on live enemies per level.
pub const MAX_ENEMIES: usize = 16;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    /// -1 for left, +1 for right.
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    #[inline]
    pub fn flipped(self) -> Facing {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }
}

/// Player motion state, classified once per step in priority order:
/// `AboveLadderTop` > `OnLadder` > `Grounded` > `Airborne`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PlayerMotion {
    Grounded,
    Airborne,
    OnLadder,
    AboveLadderTop,
}

impl PlayerMotion {
    /// States that allow a jump on the up edge.
    pub fn can_jump(self) -> bool {
        matches!(self, PlayerMotion::Grounded | PlayerMotion::AboveLadderTop)
    }
}

// ── Input ──

/// Logical controls the simulation reads.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Control {
    Left,
    Right,
    Up,
    Down,
    Restart,
}

impl Control {
    #[inline]
    fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// Frame input: held controls, edge-triggered controls, mouse.
/// Held = continuous (movement), pressed = only on the frame the control
/// went down (jump, restart, painting).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameInput {
    held: u8,
    pressed: u8,
    pub mouse_left_pressed: bool,
    /// Mouse position in screen cells.
    pub mouse_position: (u16, u16),
}

impl FrameInput {
    pub fn is_down(&self, c: Control) -> bool {
        self.held & c.bit() != 0
    }

    pub fn is_pressed(&self, c: Control) -> bool {
        self.pressed & c.bit() != 0
    }

    pub fn set_down(&mut self, c: Control) {
        self.held |= c.bit();
    }

    /// Mark a fresh press. A pressed control is also held.
    pub fn set_pressed(&mut self, c: Control) {
        self.pressed |= c.bit();
        self.held |= c.bit();
    }

    /// Combine two input sources (keyboard + gamepad).
    pub fn merge(self, other: FrameInput) -> FrameInput {
        FrameInput {
            held: self.held | other.held,
            pressed: self.pressed | other.pressed,
            mouse_left_pressed: self.mouse_left_pressed || other.mouse_left_pressed,
            mouse_position: if self.mouse_left_pressed {
                self.mouse_position
            } else {
                other.mouse_position
            },
        }
    }
}

// ── Player ──

#[derive(Clone, Debug)]
pub struct Player {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    /// Resting on a solid tile after the last vertical pass.
    pub grounded: bool,
    pub motion: PlayerMotion,
    pub facing: Facing,
}

impl Player {
    pub fn new(x: f32, y: f32) -> Self {
        Player {
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            grounded: false,
            motion: PlayerMotion::Airborne,
            facing: Facing::Right,
        }
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, PLAYER_W, PLAYER_H)
    }

    #[inline]
    pub fn rect_at(&self, x: f32, y: f32) -> Rect {
        Rect::new(x, y, PLAYER_W, PLAYER_H)
    }
}

// ── Enemy ──

#[derive(Clone, Debug)]
pub struct Enemy {
    pub x: f32,
    pub y: f32,
    pub facing: Facing,
}

impl Enemy {
    pub fn new(x: f32, y: f32) -> Self {
        Enemy { x, y, facing: Facing::Right }
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, ENEMY_W, ENEMY_H)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pressed_implies_held() {
        let mut input = FrameInput::default();
        input.set_pressed(Control::Up);
        assert!(input.is_pressed(Control::Up));
        assert!(input.is_down(Control::Up));
        assert!(!input.is_down(Control::Down));
    }

    #[test]
    fn held_is_not_pressed() {
        let mut input = FrameInput::default();
        input.set_down(Control::Left);
        assert!(input.is_down(Control::Left));
        assert!(!input.is_pressed(Control::Left));
    }

    #[test]
    fn merge_unions_sources() {
        let mut kb = FrameInput::default();
        kb.set_down(Control::Right);
        let mut pad = FrameInput::default();
        pad.set_pressed(Control::Restart);
        let both = kb.merge(pad);
        assert!(both.is_down(Control::Right));
        assert!(both.is_pressed(Control::Restart));
        assert!(!both.is_pressed(Control::Right));
    }

    #[test]
    fn only_grounded_and_ladder_top_can_jump() {
        assert!(PlayerMotion::Grounded.can_jump());
        assert!(PlayerMotion::AboveLadderTop.can_jump());
        assert!(!PlayerMotion::OnLadder.can_jump());
        assert!(!PlayerMotion::Airborne.can_jump());
    }

    #[test]
    fn facing_flip_roundtrip() {
        assert_eq!(Facing::Left.flipped(), Facing::Right);
        assert_eq!(Facing::Right.sign(), 1.0);
        assert_eq!(Facing::Left.sign(), -1.0);
    }
}
