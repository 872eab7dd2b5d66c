/// Gamepad input tracker using gilrs (cargo feature `gamepad`).
///
/// Mapping:
///   D-pad / Left Stick   →  Up / Down / Left / Right
///   `[gamepad] place`    →  PlaceObstacle  (default: A)
///   `[gamepad] quit`     →  Quit           (default: Select)
///
/// Edge-triggered: a held button produces one key per press, matching how
/// the keyboard path reports presses.

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::config::GamepadConfig;
use crate::ui::surface::Key;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.25;

/// Logical button identifiers.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,       // South
    B,       // East
    X,       // West
    Y,       // North
    L1,
    R1,
    Start,
    Select,
}

impl Btn {
    pub fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH" => Some(Btn::A),
            "B" | "EAST" => Some(Btn::B),
            "X" | "WEST" => Some(Btn::X),
            "Y" | "NORTH" => Some(Btn::Y),
            "L1" | "LB" => Some(Btn::L1),
            "R1" | "RB" => Some(Btn::R1),
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
            Button::Start => Some(Btn::Start),
            Button::Select => Some(Btn::Select),
            _ => None,
        }
    }
}

/// Stick position as four digital directions.
#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct StickDirs {
    up: bool,
    down: bool,
    left: bool,
    right: bool,
}

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
impl StickDirs {
    fn from_axes(x: f32, y: f32) -> Self {
        StickDirs {
            up: y > STICK_DEADZONE,
            down: y < -STICK_DEADZONE,
            left: x < -STICK_DEADZONE,
            right: x > STICK_DEADZONE,
        }
    }

    /// Directions that became active going from `prev` to `self`.
    fn fresh_since(self, prev: StickDirs) -> impl Iterator<Item = Key> {
        [
            (self.up && !prev.up, Key::Up),
            (self.down && !prev.down, Key::Down),
            (self.left && !prev.left, Key::Left),
            (self.right && !prev.right, Key::Right),
        ]
        .into_iter()
        .filter_map(|(fresh, key)| fresh.then_some(key))
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    place: Vec<Btn>,
    quit: Vec<Btn>,

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    stick_x: f32,
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    stick_y: f32,
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    stick: StickDirs,

    pressed: Vec<Key>,
}

impl GamepadState {
    pub fn new(cfg: &GamepadConfig) -> Self {
        #[cfg(feature = "gamepad")]
        let gilrs_opt = match Gilrs::new() {
            Ok(g) => {
                if let Some((_, pad)) = g.gamepads().next() {
                    tracing::info!(name = pad.name(), "gamepad found");
                }
                Some(g)
            }
            Err(e) => {
                tracing::warn!(error = %e, "gamepad support unavailable");
                None
            }
        };

        fn parse_list(names: &[String]) -> Vec<Btn> {
            names.iter().filter_map(|s| Btn::from_name(s)).collect()
        }

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: gilrs_opt,
            place: parse_list(&cfg.place),
            quit: parse_list(&cfg.quit),
            stick_x: 0.0,
            stick_y: 0.0,
            stick: StickDirs::default(),
            pressed: Vec::with_capacity(4),
        }
    }

    /// Poll pending gamepad events and return the keys pressed since the
    /// previous call.
    pub fn update(&mut self) -> &[Key] {
        self.pressed.clear();

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();

        &self.pressed
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn button_key(&self, btn: Btn) -> Option<Key> {
        if self.quit.contains(&btn) {
            Some(Key::Quit)
        } else if self.place.contains(&btn) {
            Some(Key::PlaceObstacle)
        } else {
            None
        }
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
                    let key = match btn {
                        Button::DPadUp => Some(Key::Up),
                        Button::DPadDown => Some(Key::Down),
                        Button::DPadLeft => Some(Key::Left),
                        Button::DPadRight => Some(Key::Right),
                        other => Btn::from_gilrs(other).and_then(|b| self.button_key(b)),
                    };
                    if let Some(k) = key {
                        self.pressed.push(k);
                    }
                }
                EventType::AxisChanged(axis, value, _) => {
                    match axis {
                        Axis::LeftStickX => self.stick_x = value,
                        Axis::LeftStickY => self.stick_y = value,
                        _ => {}
                    }
                }
                EventType::Connected => tracing::info!(id = ?event.id, "gamepad connected"),
                EventType::Disconnected => {
                    tracing::info!(id = ?event.id, "gamepad disconnected");
                    self.stick_x = 0.0;
                    self.stick_y = 0.0;
                }
                _ => {}
            }
        }

        let now = StickDirs::from_axes(self.stick_x, self.stick_y);
        self.pressed.extend(now.fresh_since(self.stick));
        self.stick = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_names_are_case_insensitive() {
        assert_eq!(Btn::from_name("select"), Some(Btn::Select));
        assert_eq!(Btn::from_name("South"), Some(Btn::A));
        assert_eq!(Btn::from_name("turbo"), None);
    }

    #[test]
    fn configured_buttons_map_to_keys() {
        let cfg = GamepadConfig { place: vec!["B".into()], quit: vec!["Start".into()] };
        let pad = GamepadState::new(&cfg);
        assert_eq!(pad.button_key(Btn::B), Some(Key::PlaceObstacle));
        assert_eq!(pad.button_key(Btn::Start), Some(Key::Quit));
        assert_eq!(pad.button_key(Btn::A), None);
    }

    #[test]
    fn stick_reports_only_fresh_directions() {
        let centered = StickDirs::from_axes(0.0, 0.0);
        let up_left = StickDirs::from_axes(-0.8, 0.9);
        let fresh: Vec<Key> = up_left.fresh_since(centered).collect();
        assert_eq!(fresh, vec![Key::Up, Key::Left]);
        assert_eq!(up_left.fresh_since(up_left).count(), 0);
    }

    #[test]
    fn small_deflection_is_dead_zone() {
        assert_eq!(StickDirs::from_axes(0.1, -0.2), StickDirs::default());
    }
}
