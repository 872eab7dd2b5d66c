/// Fixed-rate sub-scheduling.
///
/// The loop owns a tick counter that wraps at `wrap` (one second's worth of
/// frames). A ticker with period `P` fires on every tick where
/// `tick % P == 0`, so with a wrap of 60 a period-20 ticker fires three times
/// a second and a period-60 ticker once. Tickers fire in registration order.

use crate::error::GameError;

/// What a ticker does when it fires. Dispatched by the game loop.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TickAction {
    PollInput,
    MoveEnemies,
    SpawnEnemy,
    CheckDeath,
}

#[derive(Clone, Copy, Debug)]
struct Ticker {
    action: TickAction,
    period: u32,
}

#[derive(Clone, Debug)]
pub struct Scheduler {
    tick: u32,
    wrap: u32,
    tickers: Vec<Ticker>,
}

impl Scheduler {
    pub fn new(wrap: u32) -> Result<Self, GameError> {
        if wrap == 0 {
            return Err(GameError::Config("tick wrap must be at least 1".into()));
        }
        Ok(Scheduler { tick: 0, wrap, tickers: Vec::with_capacity(4) })
    }

    pub fn register(&mut self, action: TickAction, period: u32) -> Result<(), GameError> {
        if period == 0 {
            return Err(GameError::Config(format!("{action:?} period must be at least 1")));
        }
        self.tickers.push(Ticker { action, period });
        Ok(())
    }

    pub fn tick(&self) -> u32 {
        self.tick
    }

    /// Advance the counter by one and return the actions due on the new tick,
    /// in registration order.
    pub fn advance(&mut self) -> Vec<TickAction> {
        self.tick = (self.tick + 1) % self.wrap;
        let tick = self.tick;
        self.tickers
            .iter()
            .filter(|t| tick % t.period == 0)
            .map(|t| t.action)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_twenty_fires_three_times_per_wrap() {
        let mut s = Scheduler::new(60).unwrap();
        s.register(TickAction::MoveEnemies, 20).unwrap();
        let mut fired_on = Vec::new();
        for _ in 0..120 {
            if !s.advance().is_empty() {
                fired_on.push(s.tick());
            }
        }
        assert_eq!(fired_on, vec![20, 40, 0, 20, 40, 0]);
    }

    #[test]
    fn period_one_fires_every_tick() {
        let mut s = Scheduler::new(60).unwrap();
        s.register(TickAction::PollInput, 1).unwrap();
        for _ in 0..75 {
            assert_eq!(s.advance(), vec![TickAction::PollInput]);
        }
    }

    #[test]
    fn registration_order_is_kept() {
        let mut s = Scheduler::new(60).unwrap();
        s.register(TickAction::PollInput, 1).unwrap();
        s.register(TickAction::MoveEnemies, 20).unwrap();
        s.register(TickAction::SpawnEnemy, 60).unwrap();
        s.register(TickAction::CheckDeath, 1).unwrap();
        for _ in 0..59 {
            s.advance();
        }
        assert_eq!(
            s.advance(),
            vec![
                TickAction::PollInput,
                TickAction::MoveEnemies,
                TickAction::SpawnEnemy,
                TickAction::CheckDeath,
            ]
        );
        assert_eq!(s.tick(), 0);
    }

    #[test]
    fn first_advance_is_tick_one() {
        let mut s = Scheduler::new(60).unwrap();
        s.register(TickAction::SpawnEnemy, 60).unwrap();
        assert!(s.advance().is_empty());
        assert_eq!(s.tick(), 1);
    }

    #[test]
    fn zero_period_rejected() {
        let mut s = Scheduler::new(60).unwrap();
        assert!(matches!(s.register(TickAction::PollInput, 0), Err(GameError::Config(_))));
        assert!(matches!(Scheduler::new(0), Err(GameError::Config(_))));
    }
}
