/// Keyboard input via crossterm.
///
/// Every frame the pending terminal events are drained without blocking and
/// each Press/Repeat event is translated into an abstract `Key`. Arrow keys
/// are always bound; extra characters come from `[keys]` in config.toml.
/// Ctrl+C always means Quit, since raw mode swallows the signal.

use std::collections::HashMap;
use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::config::KeyConfig;
use crate::ui::surface::Key;

pub struct InputState {
    chars: HashMap<char, Key>,
    /// Keys pressed during the most recent `drain_events()` call, in order.
    pressed: Vec<Key>,
}

impl InputState {
    pub fn new(keys: &KeyConfig) -> Self {
        let mut chars = HashMap::with_capacity(16);
        let groups = [
            (Key::Up, &keys.up),
            (Key::Down, &keys.down),
            (Key::Left, &keys.left),
            (Key::Right, &keys.right),
            (Key::Quit, &keys.quit),
            (Key::PlaceObstacle, &keys.place),
        ];
        for (key, list) in groups {
            for &c in list.iter() {
                chars.insert(c, key);
            }
        }
        InputState { chars, pressed: Vec::with_capacity(8) }
    }

    /// Drain all pending terminal events and collect the pressed keys.
    /// Call this once per input tick.
    pub fn drain_events(&mut self) -> std::io::Result<&[Key]> {
        self.pressed.clear();

        while poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if let Some(k) = self.translate(&key) {
                    self.pressed.push(k);
                }
            }
        }

        Ok(&self.pressed)
    }

    /// Map one key event to an abstract key. Release events are ignored.
    pub fn translate(&self, key: &KeyEvent) -> Option<Key> {
        if key.kind == KeyEventKind::Release {
            return None;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
        {
            return Some(Key::Quit);
        }
        match key.code {
            KeyCode::Up => Some(Key::Up),
            KeyCode::Down => Some(Key::Down),
            KeyCode::Left => Some(Key::Left),
            KeyCode::Right => Some(Key::Right),
            KeyCode::Esc => Some(Key::Quit),
            KeyCode::Char(c) => self.chars.get(&c).copied(),
            _ => None,
        }
    }
}
