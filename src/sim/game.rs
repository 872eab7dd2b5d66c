/// The fixed-rate game loop.
///
/// Per frame:
///   1. Advance the wrapping tick counter
///   2. Render every entity
///   3. Fire due tickers in registration order
///      (input → enemy moves → spawning → death check)
///   4. Sleep whatever is left of the frame budget
///
/// The loop is `Running` until the quit key fires or an enemy lands on the
/// player; `Stopped` is terminal. Once stopped, no further ticker of the
/// current frame runs.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

use tracing::{debug, error, info};

use crate::config::LoopConfig;
use crate::domain::entity::{Dir, Position};
use crate::error::GameError;
use crate::sim::ticker::{Scheduler, TickAction};
use crate::sim::world::World;
use crate::ui::surface::{Command, GlyphMap, GridSurface, Key};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum StopCause {
    Quit,
    PlayerCaught { at: Position },
}

impl StopCause {
    /// What the player is told once the terminal is restored.
    pub fn message(self) -> &'static str {
        match self {
            StopCause::Quit => "Thanks for playing Threadless!",
            StopCause::PlayerCaught { .. } => "You were caught! Game over.",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LoopState {
    Running,
    Stopped(StopCause),
}

/// Sleeps out the rest of each frame. Late frames are not made up for.
#[derive(Debug)]
pub struct FramePacer {
    budget: Duration,
    frame_start: Instant,
}

impl FramePacer {
    pub fn new(budget: Duration) -> Self {
        FramePacer { budget, frame_start: Instant::now() }
    }

    /// Time left in the budget after `elapsed`, if any.
    pub fn remaining(budget: Duration, elapsed: Duration) -> Option<Duration> {
        budget.checked_sub(elapsed).filter(|d| !d.is_zero())
    }

    pub fn wait(&mut self) {
        if let Some(rest) = Self::remaining(self.budget, self.frame_start.elapsed()) {
            std::thread::sleep(rest);
        }
        self.frame_start = Instant::now();
    }
}

pub struct GameLoop<S: GridSurface> {
    surface: S,
    world: World,
    scheduler: Scheduler,
    glyphs: GlyphMap,
    config: LoopConfig,
    state: LoopState,
    frames: u64,
}

impl<S: GridSurface> GameLoop<S> {
    /// Build a fresh session sized to the surface.
    pub fn new(surface: S, config: LoopConfig) -> Result<Self, GameError> {
        config.validate()?;
        let (w, h) = surface.size();
        let world = World::new(i32::from(w), i32::from(h), config.max_enemies)?;
        Self::with_world(surface, config, world)
    }

    /// Build a loop around a prepared world.
    pub fn with_world(mut surface: S, config: LoopConfig, world: World) -> Result<Self, GameError> {
        config.validate()?;

        surface.on_key_down(Key::Quit, Command::Quit);
        surface.on_key_down(Key::Down, Command::MovePlayer(Dir::Down));
        surface.on_key_down(Key::Up, Command::MovePlayer(Dir::Up));
        surface.on_key_down(Key::Left, Command::MovePlayer(Dir::Left));
        surface.on_key_down(Key::Right, Command::MovePlayer(Dir::Right));
        surface.on_key_down(Key::PlaceObstacle, Command::PlaceObstacle);

        let mut scheduler = Scheduler::new(config.tick_wrap)?;
        scheduler.register(TickAction::PollInput, config.input_period)?;
        scheduler.register(TickAction::MoveEnemies, config.enemy_move_period)?;
        scheduler.register(TickAction::SpawnEnemy, config.spawn_period)?;
        scheduler.register(TickAction::CheckDeath, config.death_check_period)?;

        Ok(GameLoop {
            surface,
            world,
            scheduler,
            glyphs: GlyphMap::default(),
            config,
            state: LoopState::Running,
            frames: 0,
        })
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn tick(&self) -> u32 {
        self.scheduler.tick()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Acquire the surface, run until stopped, release the surface.
    /// Teardown happens on every path out, errors and panics included;
    /// a panic comes back as `GameError::Panicked` after the surface is
    /// released.
    pub fn run(&mut self) -> Result<StopCause, GameError> {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| -> Result<StopCause, GameError> {
            self.surface.setup()?;
            self.drive()
        }));
        let cleanup = self.surface.teardown();
        let cause = outcome.unwrap_or_else(|payload| {
            let message = panic_message(payload.as_ref());
            error!(%message, frames = self.frames, "session panicked");
            Err(GameError::Panicked(message))
        })?;
        cleanup?;
        Ok(cause)
    }

    fn drive(&mut self) -> Result<StopCause, GameError> {
        info!(
            width = self.world.authority().width(),
            height = self.world.authority().height(),
            fps = self.config.frame_rate,
            "session started"
        );
        let mut pacer = FramePacer::new(self.config.frame_budget());
        loop {
            self.step()?;
            if let LoopState::Stopped(cause) = self.state {
                info!(?cause, frames = self.frames, "session stopped");
                return Ok(cause);
            }
            pacer.wait();
        }
    }

    /// One frame without pacing. Does nothing once stopped.
    pub fn step(&mut self) -> Result<(), GameError> {
        if self.state != LoopState::Running {
            return Ok(());
        }
        self.frames += 1;
        let due = self.scheduler.advance();

        let entities = self.world.entities();
        self.surface.render(&entities, &self.glyphs)?;

        for action in due {
            if self.state != LoopState::Running {
                break;
            }
            self.fire(action)?;
        }
        Ok(())
    }

    fn fire(&mut self, action: TickAction) -> Result<(), GameError> {
        match action {
            TickAction::PollInput => {
                for command in self.surface.process_input()? {
                    self.apply(command);
                    if self.state != LoopState::Running {
                        break;
                    }
                }
            }
            TickAction::MoveEnemies => {
                self.world.move_enemies();
            }
            TickAction::SpawnEnemy => {
                self.world.spawn_enemy();
            }
            TickAction::CheckDeath => {
                if let Some(at) = self.world.caught() {
                    info!(x = at.x, y = at.y, tick = self.scheduler.tick(), "player caught");
                    self.state = LoopState::Stopped(StopCause::PlayerCaught { at });
                }
            }
        }
        Ok(())
    }

    fn apply(&mut self, command: Command) {
        debug!(?command, "input");
        match command {
            Command::MovePlayer(dir) => {
                self.world.move_player(dir);
            }
            Command::PlaceObstacle => {
                self.world.place_obstacle();
            }
            Command::Quit => {
                self.state = LoopState::Stopped(StopCause::Quit);
            }
        }
    }
}

/// Text of a panic payload, for `panic!` with a literal or a format string.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::scripted::ScriptedSurface;

    fn fast_config() -> LoopConfig {
        LoopConfig { frame_rate: 1000, ..LoopConfig::default() }
    }

    #[test]
    fn pacer_remaining_budget() {
        let budget = Duration::from_millis(16);
        assert_eq!(
            FramePacer::remaining(budget, Duration::from_millis(10)),
            Some(Duration::from_millis(6))
        );
        assert_eq!(FramePacer::remaining(budget, Duration::from_millis(16)), None);
        assert_eq!(FramePacer::remaining(budget, Duration::from_millis(40)), None);
    }

    #[test]
    fn quit_key_stops_the_loop() {
        let mut surface = ScriptedSurface::new(20, 10);
        surface.push_idle(3);
        surface.push_keys(&[Key::Quit, Key::Left]);
        let mut game = GameLoop::new(surface, fast_config()).unwrap();
        let start = game.world().player().pos();
        assert_eq!(game.run().unwrap(), StopCause::Quit);
        assert_eq!(game.frames(), 4);
        // Commands after Quit in the same batch are dropped
        assert_eq!(game.world().player().pos(), start);
        assert_eq!(game.surface().setup_calls, 1);
        assert_eq!(game.surface().teardown_calls, 1);
    }

    #[test]
    fn each_frame_renders_before_tickers() {
        let mut surface = ScriptedSurface::new(20, 10);
        surface.push_keys(&[Key::Up]);
        let mut game = GameLoop::new(surface, fast_config()).unwrap();
        game.step().unwrap();
        // Frame 1 was drawn before the move was applied
        let frame = &game.surface().frames()[0];
        let (p, ch) = frame[frame.len() - 1];
        assert_eq!(ch, 'P');
        assert_eq!(p, Position::new(10, 5));
        assert_eq!(game.world().player().pos(), Position::new(10, 4));
    }

    #[test]
    fn enemies_move_on_decision_ticks_only() {
        let surface = ScriptedSurface::new(20, 10);
        let mut game = GameLoop::new(surface, fast_config()).unwrap();
        for _ in 0..19 {
            game.step().unwrap();
        }
        assert_eq!(game.world().enemies()[0].pos(), Position::new(0, 0));
        game.step().unwrap();
        assert_eq!(game.tick(), 20);
        assert_eq!(game.world().enemies()[0].pos(), Position::new(1, 0));
    }

    #[test]
    fn spawn_fires_once_per_wrap() {
        let surface = ScriptedSurface::new(20, 10);
        let mut game = GameLoop::new(surface, fast_config()).unwrap();
        for _ in 0..59 {
            game.step().unwrap();
        }
        assert_eq!(game.world().enemies().len(), 1);
        game.step().unwrap();
        assert_eq!(game.tick(), 0);
        assert_eq!(game.world().enemies().len(), 2);
    }

    #[test]
    fn stopped_loop_ignores_further_steps() {
        let mut surface = ScriptedSurface::new(20, 10);
        surface.push_keys(&[Key::Quit]);
        let mut game = GameLoop::new(surface, fast_config()).unwrap();
        game.step().unwrap();
        assert_eq!(game.state(), LoopState::Stopped(StopCause::Quit));
        game.step().unwrap();
        assert_eq!(game.frames(), 1);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let surface = ScriptedSurface::new(20, 10);
        let config = LoopConfig { enemy_move_period: 0, ..LoopConfig::default() };
        assert!(matches!(GameLoop::new(surface, config), Err(GameError::Config(_))));
    }

    #[test]
    fn panic_payload_text() {
        let literal = panic::catch_unwind(|| panic!("boom")).unwrap_err();
        assert_eq!(panic_message(literal.as_ref()), "boom");
        let formatted = panic::catch_unwind(|| panic!("frame {}", 7)).unwrap_err();
        assert_eq!(panic_message(formatted.as_ref()), "frame 7");
    }

    #[test]
    fn messages_are_fixed() {
        assert_eq!(
            StopCause::PlayerCaught { at: Position::new(1, 1) }.message(),
            "You were caught! Game over."
        );
    }
}
