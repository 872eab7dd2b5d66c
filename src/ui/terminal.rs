/// The production surface: crossterm renderer + keyboard + optional gamepad.

use crossterm::terminal;

use crate::config::GameConfig;
use crate::domain::entity::Entity;
use crate::error::GameError;
use crate::ui::gamepad::GamepadState;
use crate::ui::input::InputState;
use crate::ui::renderer::Renderer;
use crate::ui::surface::{Command, GlyphMap, GridSurface, Key, KeyBindings};

pub struct TerminalSurface {
    renderer: Renderer,
    kb: InputState,
    gp: GamepadState,
    bindings: KeyBindings,
    active: bool,
}

impl TerminalSurface {
    pub fn new(config: &GameConfig) -> Self {
        TerminalSurface {
            renderer: Renderer::new(),
            kb: InputState::new(&config.keys),
            gp: GamepadState::new(&config.gamepad),
            bindings: KeyBindings::new(),
            active: false,
        }
    }
}

impl GridSurface for TerminalSurface {
    fn setup(&mut self) -> Result<(), GameError> {
        if !self.active {
            // Mark active first so a half-finished init still gets undone
            self.active = true;
            self.renderer.init()?;
        }
        Ok(())
    }

    fn teardown(&mut self) -> Result<(), GameError> {
        if self.active {
            self.active = false;
            self.renderer.cleanup()?;
        }
        Ok(())
    }

    fn size(&self) -> (u16, u16) {
        terminal::size().unwrap_or((80, 24))
    }

    fn on_key_down(&mut self, key: Key, command: Command) {
        self.bindings.bind(key, command);
    }

    fn process_input(&mut self) -> Result<Vec<Command>, GameError> {
        let mut keys: Vec<Key> = self.kb.drain_events()?.to_vec();
        keys.extend_from_slice(self.gp.update());
        Ok(self.bindings.resolve(&keys))
    }

    fn render(&mut self, entities: &[&Entity], glyphs: &GlyphMap) -> Result<(), GameError> {
        self.renderer.render(entities, glyphs)?;
        Ok(())
    }
}

impl Drop for TerminalSurface {
    fn drop(&mut self) {
        // Restores the terminal on panic unwinding too.
        if let Err(e) = self.teardown() {
            tracing::error!(error = %e, "terminal cleanup failed");
        }
    }
}
