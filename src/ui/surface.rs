/// The rendering/input boundary the game loop talks to.
///
/// A surface reports its size, holds key bindings, turns pending input into
/// bound commands, and draws entities. The terminal implementation lives in
/// `terminal.rs`; `scripted.rs` replays canned input for tests.

use std::collections::HashMap;

use crate::domain::entity::{Dir, Entity, EntityKind};
use crate::error::GameError;

/// Abstract key identifiers. Backends translate native key codes into these.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Quit,
    PlaceObstacle,
}

/// What a key press asks the game to do.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    MovePlayer(Dir),
    PlaceObstacle,
    Quit,
}

/// Key → commands table. A key may carry several commands; they are
/// returned in binding order.
#[derive(Clone, Debug, Default)]
pub struct KeyBindings {
    bound: HashMap<Key, Vec<Command>>,
}

impl KeyBindings {
    pub fn new() -> Self {
        KeyBindings { bound: HashMap::with_capacity(8) }
    }

    pub fn bind(&mut self, key: Key, command: Command) {
        self.bound.entry(key).or_default().push(command);
    }

    /// Commands for a batch of presses, in press order.
    pub fn resolve(&self, keys: &[Key]) -> Vec<Command> {
        keys.iter()
            .filter_map(|k| self.bound.get(k))
            .flat_map(|cmds| cmds.iter().copied())
            .collect()
    }
}

/// One glyph per entity kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GlyphMap {
    pub player: char,
    pub enemy: char,
    pub obstacle: char,
}

impl GlyphMap {
    pub fn glyph(&self, kind: EntityKind) -> char {
        match kind {
            EntityKind::Player => self.player,
            EntityKind::Enemy => self.enemy,
            EntityKind::Obstacle => self.obstacle,
        }
    }
}

impl Default for GlyphMap {
    fn default() -> Self {
        GlyphMap { player: 'P', enemy: 'E', obstacle: '#' }
    }
}

pub trait GridSurface {
    /// Acquire the backend (raw mode, alternate screen, ...).
    fn setup(&mut self) -> Result<(), GameError>;

    /// Release the backend. Must be safe to call more than once; only the
    /// first call after `setup` does anything.
    fn teardown(&mut self) -> Result<(), GameError>;

    /// Usable width and height in cells.
    fn size(&self) -> (u16, u16);

    fn on_key_down(&mut self, key: Key, command: Command);

    /// Drain pending input without blocking and return the commands bound
    /// to every key pressed since the last call.
    fn process_input(&mut self) -> Result<Vec<Command>, GameError>;

    /// Draw one frame. Later entities are drawn over earlier ones.
    fn render(&mut self, entities: &[&Entity], glyphs: &GlyphMap) -> Result<(), GameError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bindings_resolve_in_press_order() {
        let mut b = KeyBindings::new();
        b.bind(Key::Left, Command::MovePlayer(Dir::Left));
        b.bind(Key::Quit, Command::Quit);
        let cmds = b.resolve(&[Key::Quit, Key::Left, Key::Up]);
        assert_eq!(cmds, vec![Command::Quit, Command::MovePlayer(Dir::Left)]);
    }

    #[test]
    fn key_may_carry_several_commands() {
        let mut b = KeyBindings::new();
        b.bind(Key::PlaceObstacle, Command::PlaceObstacle);
        b.bind(Key::PlaceObstacle, Command::MovePlayer(Dir::Up));
        assert_eq!(
            b.resolve(&[Key::PlaceObstacle]),
            vec![Command::PlaceObstacle, Command::MovePlayer(Dir::Up)]
        );
    }

    #[test]
    fn default_glyphs() {
        let g = GlyphMap::default();
        assert_eq!(g.glyph(EntityKind::Player), 'P');
        assert_eq!(g.glyph(EntityKind::Enemy), 'E');
        assert_eq!(g.glyph(EntityKind::Obstacle), '#');
    }
}
