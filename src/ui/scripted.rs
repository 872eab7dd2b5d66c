/// A headless surface that replays scripted key presses.
///
/// Each call to `process_input` consumes one queued batch of keys (an empty
/// batch once the script runs out). Rendered frames are captured as glyph
/// lists so tests can assert on what would have been drawn.

use std::collections::VecDeque;

use crate::domain::entity::{Entity, Position};
use crate::error::GameError;
use crate::ui::surface::{Command, GlyphMap, GridSurface, Key, KeyBindings};

#[derive(Debug, Default)]
pub struct ScriptedSurface {
    width: u16,
    height: u16,
    bindings: KeyBindings,
    script: VecDeque<Vec<Key>>,
    frames: Vec<Vec<(Position, char)>>,
    active: bool,
    pub setup_calls: u32,
    pub teardown_calls: u32,
}

impl ScriptedSurface {
    pub fn new(width: u16, height: u16) -> Self {
        ScriptedSurface { width, height, ..Default::default() }
    }

    /// Queue the keys delivered by the next `process_input` call.
    pub fn push_keys(&mut self, keys: &[Key]) {
        self.script.push_back(keys.to_vec());
    }

    /// Queue `n` input polls that deliver nothing.
    pub fn push_idle(&mut self, n: usize) {
        for _ in 0..n {
            self.script.push_back(Vec::new());
        }
    }

    pub fn frames(&self) -> &[Vec<(Position, char)>] {
        &self.frames
    }

    pub fn last_frame(&self) -> Option<&[(Position, char)]> {
        self.frames.last().map(Vec::as_slice)
    }
}

impl GridSurface for ScriptedSurface {
    fn setup(&mut self) -> Result<(), GameError> {
        self.active = true;
        self.setup_calls += 1;
        Ok(())
    }

    fn teardown(&mut self) -> Result<(), GameError> {
        if self.active {
            self.active = false;
            self.teardown_calls += 1;
        }
        Ok(())
    }

    fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    fn on_key_down(&mut self, key: Key, command: Command) {
        self.bindings.bind(key, command);
    }

    fn process_input(&mut self) -> Result<Vec<Command>, GameError> {
        let keys = self.script.pop_front().unwrap_or_default();
        Ok(self.bindings.resolve(&keys))
    }

    fn render(&mut self, entities: &[&Entity], glyphs: &GlyphMap) -> Result<(), GameError> {
        self.frames.push(
            entities.iter().map(|e| (e.pos(), glyphs.glyph(e.kind()))).collect(),
        );
        Ok(())
    }
}
