/// Input state tracker.
///
/// Tracks which keys are currently held down, enabling:
///   - Continuous movement while a key is held
///   - Edge-triggered jump and restart (only fire on initial press)
///   - Mouse clicks for the editor
///
/// Crossterm terminals rarely report key release, so a key counts as
/// released after `HOLD_TIMEOUT` without a Press/Repeat event. Auto-repeat
/// pauses longer than that before its first repeat, so a press only counts
/// as fresh after `REPEAT_DELAY` of silence or a reported release.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind,
};

use crate::domain::entity::{Control, FrameInput};

/// After this duration without a Press/Repeat event, consider the key released.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

/// Longest usual terminal delay before auto-repeat starts.
const REPEAT_DELAY: Duration = Duration::from_millis(700);

pub struct InputState {
    /// Timestamp of last Press/Repeat event for each key.
    last_active: HashMap<KeyCode, Instant>,

    /// Keys that transitioned from "not held" → "held" during the most
    /// recent `drain_events()` call.
    fresh_presses: Vec<KeyCode>,

    /// Raw key events collected during drain, for meta-key handling.
    raw_events: Vec<KeyEvent>,

    /// Left button went down this frame, at this terminal cell.
    click: Option<(u16, u16)>,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            click: None,
        }
    }

    /// Drain all pending terminal events and update key states.
    /// Call this once per frame, before the simulation step.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();
        self.click = None;

        while poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                Ok(Event::Key(key)) => self.record_key(key, Instant::now()),
                Ok(Event::Mouse(m)) => {
                    if m.kind == MouseEventKind::Down(MouseButton::Left) {
                        self.click = Some((m.column, m.row));
                    }
                }
                _ => {}
            }
        }

        let now = Instant::now();
        self.last_active.retain(|_, t| now.duration_since(*t) < REPEAT_DELAY);
    }

    fn record_key(&mut self, key: KeyEvent, now: Instant) {
        self.raw_events.push(key);
        if key.kind == KeyEventKind::Release {
            self.last_active.remove(&key.code);
            return;
        }
        let repeating = self
            .last_active
            .get(&key.code)
            .is_some_and(|t| now.duration_since(*t) < REPEAT_DELAY);
        self.last_active.insert(key.code, now);
        if key.kind == KeyEventKind::Press && !repeating {
            self.fresh_presses.push(key.code);
        }
    }

    /// Is this key currently held down?
    pub fn is_held(&self, code: KeyCode) -> bool {
        self.last_active
            .get(&code)
            .map(|t| t.elapsed() < HOLD_TIMEOUT)
            .unwrap_or(false)
    }

    pub fn any_held(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.is_held(*c))
    }

    /// Was this key freshly pressed this frame? (edge trigger)
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.fresh_presses.contains(&code)
    }

    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    /// Keyboard + mouse snapshot for the simulation.
    pub fn frame_input(&self) -> FrameInput {
        let mut input = FrameInput::default();
        for (control, keys) in BINDINGS {
            if self.any_pressed(keys) {
                input.set_pressed(*control);
            } else if self.any_held(keys) {
                input.set_down(*control);
            }
        }
        if let Some(pos) = self.click {
            input.mouse_left_pressed = true;
            input.mouse_position = pos;
        }
        input
    }

    // ── Meta keys ──

    pub fn quit_requested(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.kind != KeyEventKind::Release
                && match k.code {
                    KeyCode::Esc => true,
                    KeyCode::Char('c') | KeyCode::Char('C') => {
                        k.modifiers.contains(KeyModifiers::CONTROL)
                    }
                    KeyCode::Char('q') => k.modifiers.is_empty(),
                    _ => false,
                }
        })
    }

    pub fn export_requested(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.kind != KeyEventKind::Release
                && k.modifiers.contains(KeyModifiers::CONTROL)
                && matches!(k.code, KeyCode::Char('s') | KeyCode::Char('S'))
        })
    }

    /// Characters typed this frame without Ctrl, for brush selection.
    pub fn typed_chars(&self) -> impl Iterator<Item = char> + '_ {
        self.raw_events.iter().filter_map(|k| match k.code {
            KeyCode::Char(c)
                if k.kind == KeyEventKind::Press && !k.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                Some(c)
            }
            _ => None,
        })
    }
}

/// Keyboard bindings per control. Arrow keys only: letters select brushes.
const BINDINGS: &[(Control, &[KeyCode])] = &[
    (Control::Left, &[KeyCode::Left]),
    (Control::Right, &[KeyCode::Right]),
    (Control::Up, &[KeyCode::Up]),
    (Control::Down, &[KeyCode::Down]),
    (Control::Restart, &[KeyCode::Char('r'), KeyCode::Char('R'), KeyCode::Enter]),
];

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, kind: KeyEventKind) -> KeyEvent {
        KeyEvent::new_with_kind(code, KeyModifiers::NONE, kind)
    }

    fn press_at(input: &mut InputState, code: KeyCode, at: Instant) -> bool {
        input.fresh_presses.clear();
        input.record_key(key(code, KeyEventKind::Press), at);
        input.was_pressed(code)
    }

    #[test]
    fn auto_repeat_after_hold_timeout_is_not_a_new_press() {
        let mut input = InputState::new();
        let t0 = Instant::now();
        assert!(press_at(&mut input, KeyCode::Up, t0));
        // first repeat arrives after the hold timeout has lapsed
        assert!(!press_at(&mut input, KeyCode::Up, t0 + Duration::from_millis(400)));
        assert!(!press_at(&mut input, KeyCode::Up, t0 + Duration::from_millis(430)));
    }

    #[test]
    fn press_after_long_silence_is_fresh() {
        let mut input = InputState::new();
        let t0 = Instant::now();
        assert!(press_at(&mut input, KeyCode::Up, t0));
        assert!(press_at(&mut input, KeyCode::Up, t0 + Duration::from_millis(900)));
    }

    #[test]
    fn reported_release_rearms_the_edge() {
        let mut input = InputState::new();
        let t0 = Instant::now();
        assert!(press_at(&mut input, KeyCode::Up, t0));
        input.record_key(key(KeyCode::Up, KeyEventKind::Release), t0 + Duration::from_millis(50));
        assert!(press_at(&mut input, KeyCode::Up, t0 + Duration::from_millis(100)));
    }

    #[test]
    fn repeat_events_never_count_as_presses() {
        let mut input = InputState::new();
        input.record_key(key(KeyCode::Left, KeyEventKind::Repeat), Instant::now());
        assert!(!input.was_pressed(KeyCode::Left));
        assert!(input.is_held(KeyCode::Left));
    }
}
