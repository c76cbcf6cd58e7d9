/// Gamepad input tracker using gilrs.
///
/// Button mapping for jump and restart comes from config.toml
/// (`[gamepad]`). Movement is fixed:
///   D-pad / Left Stick    →  Left / Right / Up / Down
///   A (default)           →  Jump
///   Start (default)       →  Restart
///
/// Without the `gamepad` feature the tracker is inert and always reports
/// an empty `FrameInput`.

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::config::GamepadConfig;
use crate::domain::entity::{Control, FrameInput};

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.25;

/// Logical button identifiers (one per physical button).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,       // South
    B,       // East
    X,       // West
    Y,       // North
    L1,      // LeftTrigger
    R1,      // RightTrigger
    L2,      // LeftTrigger2
    R2,      // RightTrigger2
    Start,
    Select,
}

const BTN_COUNT: usize = 10;

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH" => Some(Btn::A),
            "B" | "EAST" => Some(Btn::B),
            "X" | "WEST" => Some(Btn::X),
            "Y" | "NORTH" => Some(Btn::Y),
            "L1" | "LB" | "LEFTTRIGGER" => Some(Btn::L1),
            "R1" | "RB" | "RIGHTTRIGGER" => Some(Btn::R1),
            "L2" | "LT" | "LEFTTRIGGER2" => Some(Btn::L2),
            "R2" | "RT" | "RIGHTTRIGGER2" => Some(Btn::R2),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South => Some(Btn::A),
            Button::East => Some(Btn::B),
            Button::West => Some(Btn::X),
            Button::North => Some(Btn::Y),
            Button::LeftTrigger => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::LeftTrigger2 => Some(Btn::L2),
            Button::RightTrigger2 => Some(Btn::R2),
            Button::Start => Some(Btn::Start),
            Button::Select => Some(Btn::Select),
            _ => None,
        }
    }
}

/// Per-button state: held (continuous) and just_pressed (edge).
#[derive(Clone, Copy, Debug, Default)]
struct BtnState {
    held: bool,
    just_pressed: bool,
}

impl BtnState {
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn set(&mut self, held: bool) {
        if held && !self.held {
            self.just_pressed = true;
        }
        self.held = held;
    }
}

/// Action-to-button mapping (loaded from config).
#[derive(Debug, PartialEq)]
struct ActionMap {
    jump: Vec<Btn>,
    restart: Vec<Btn>,
}

impl Default for ActionMap {
    fn default() -> Self {
        ActionMap { jump: vec![Btn::A], restart: vec![Btn::Start] }
    }
}

impl ActionMap {
    /// Unknown names are dropped; an empty list keeps the default.
    fn from_config(cfg: &GamepadConfig) -> Self {
        fn parse_list(names: &[String]) -> Vec<Btn> {
            names
                .iter()
                .filter_map(|s| {
                    let btn = Btn::from_name(s);
                    if btn.is_none() {
                        log::warn!("unknown gamepad button '{s}' in config");
                    }
                    btn
                })
                .collect()
        }
        let mut map = ActionMap::default();
        let jump = parse_list(&cfg.jump);
        if !jump.is_empty() {
            map.jump = jump;
        }
        let restart = parse_list(&cfg.restart);
        if !restart.is_empty() {
            map.restart = restart;
        }
        map
    }
}

/// Movement directions, shared by D-pad and stick.
#[derive(Clone, Copy, Debug, Default)]
struct Dirs {
    up: BtnState,
    down: BtnState,
    left: BtnState,
    right: BtnState,
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    buttons: [BtnState; BTN_COUNT],
    dpad: Dirs,
    stick: Dirs,
    stick_x: f32,
    stick_y: f32,

    action_map: ActionMap,

    pub connected: bool,
}

impl GamepadState {
    pub fn new(cfg: &GamepadConfig) -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs_opt, connected) = match Gilrs::new() {
            Ok(g) => {
                let has_pad = g.gamepads().next().is_some();
                (Some(g), has_pad)
            }
            Err(e) => {
                log::warn!("gamepad support unavailable: {e}");
                (None, false)
            }
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: gilrs_opt,
            buttons: [BtnState::default(); BTN_COUNT],
            dpad: Dirs::default(),
            stick: Dirs::default(),
            stick_x: 0.0,
            stick_y: 0.0,
            action_map: ActionMap::from_config(cfg),
            connected,
        }
    }

    pub fn update(&mut self) {
        self.clear_just_pressed();

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, true);
                }
                EventType::ButtonReleased(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, false);
                }
                EventType::AxisChanged(axis, value, _) => {
                    self.connected = true;
                    match axis {
                        Axis::LeftStickX => self.stick_x = value,
                        Axis::LeftStickY => self.stick_y = value,
                        _ => {}
                    }
                }
                EventType::Connected => {
                    log::info!("gamepad connected");
                    self.connected = true;
                }
                EventType::Disconnected => {
                    log::info!("gamepad disconnected");
                    self.connected = false;
                    self.release_all();
                }
                _ => {}
            }
        }

        // Derive stick digital states
        self.stick.left.set(self.stick_x < -STICK_DEADZONE);
        self.stick.right.set(self.stick_x > STICK_DEADZONE);
        self.stick.up.set(self.stick_y > STICK_DEADZONE);
        self.stick.down.set(self.stick_y < -STICK_DEADZONE);
    }

    #[cfg(feature = "gamepad")]
    fn set_button(&mut self, gilrs_btn: Button, held: bool) {
        // D-pad handled separately (not in Btn enum)
        match gilrs_btn {
            Button::DPadUp => return self.dpad.up.set(held),
            Button::DPadDown => return self.dpad.down.set(held),
            Button::DPadLeft => return self.dpad.left.set(held),
            Button::DPadRight => return self.dpad.right.set(held),
            _ => {}
        }

        if let Some(btn) = Btn::from_gilrs(gilrs_btn) {
            self.buttons[btn as usize].set(held);
        }
    }

    // ── Snapshot ──

    /// Gamepad contribution to this frame's input.
    pub fn frame_input(&self) -> FrameInput {
        let mut input = FrameInput::default();
        let dirs = [
            (Control::Left, self.dpad.left, self.stick.left),
            (Control::Right, self.dpad.right, self.stick.right),
            (Control::Up, self.dpad.up, self.stick.up),
            (Control::Down, self.dpad.down, self.stick.down),
        ];
        for (control, pad, stick) in dirs {
            if pad.just_pressed || stick.just_pressed {
                input.set_pressed(control);
            } else if pad.held || stick.held {
                input.set_down(control);
            }
        }

        if self.any_just_pressed(&self.action_map.jump) {
            input.set_pressed(Control::Up);
        } else if self.any_held(&self.action_map.jump) {
            input.set_down(Control::Up);
        }
        if self.any_just_pressed(&self.action_map.restart) {
            input.set_pressed(Control::Restart);
        }
        input
    }

    // ── Internal ──

    fn any_just_pressed(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.buttons[b as usize].just_pressed)
    }

    fn any_held(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.buttons[b as usize].held)
    }

    fn clear_just_pressed(&mut self) {
        for b in &mut self.buttons {
            b.just_pressed = false;
        }
        for d in [&mut self.dpad, &mut self.stick] {
            d.up.just_pressed = false;
            d.down.just_pressed = false;
            d.left.just_pressed = false;
            d.right.just_pressed = false;
        }
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn release_all(&mut self) {
        self.buttons = [BtnState::default(); BTN_COUNT];
        self.dpad = Dirs::default();
        self.stick = Dirs::default();
        self.stick_x = 0.0;
        self.stick_y = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(jump: &[&str], restart: &[&str]) -> GamepadConfig {
        GamepadConfig {
            jump: jump.iter().map(|s| s.to_string()).collect(),
            restart: restart.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn button_names_are_case_insensitive() {
        assert_eq!(Btn::from_name("south"), Some(Btn::A));
        assert_eq!(Btn::from_name("Rb"), Some(Btn::R1));
        assert_eq!(Btn::from_name("back"), Some(Btn::Select));
        assert_eq!(Btn::from_name("turbo"), None);
    }

    #[test]
    fn config_overrides_default_mapping() {
        let map = ActionMap::from_config(&cfg(&["B", "X"], &["Select"]));
        assert_eq!(map.jump, vec![Btn::B, Btn::X]);
        assert_eq!(map.restart, vec![Btn::Select]);
    }

    #[test]
    fn unusable_config_keeps_defaults() {
        let map = ActionMap::from_config(&cfg(&["nope"], &[]));
        assert_eq!(map, ActionMap::default());
    }

    #[test]
    fn jump_button_edge_becomes_up_press() {
        let mut pad = GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: None,
            buttons: [BtnState::default(); BTN_COUNT],
            dpad: Dirs::default(),
            stick: Dirs::default(),
            stick_x: 0.0,
            stick_y: 0.0,
            action_map: ActionMap::default(),
            connected: true,
        };
        pad.buttons[Btn::A as usize].set(true);
        pad.dpad.left.set(true);
        let input = pad.frame_input();
        assert!(input.is_pressed(Control::Up));
        assert!(input.is_pressed(Control::Left));

        pad.update();
        let input = pad.frame_input();
        assert!(!input.is_pressed(Control::Up));
        assert!(input.is_down(Control::Up));
        assert!(input.is_down(Control::Left));
    }
}
