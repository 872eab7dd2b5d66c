/// Enemy AI: one-shot scored step toward the player.
///
/// Each decision tick an enemy looks at its four neighbours, drops the ones
/// the movement authority refuses, and scores the rest:
///
///   score = distance(candidate, player)
///           - MOMENTUM_BONUS     if the step continues a straight line
///           + BACKTRACK_PENALTY  if the candidate is in the recent trail
///
/// Lowest score wins; ties go to the first candidate in `DIRS` order.
/// No global pathfinding, so an enemy can get stuck behind obstacles.

use std::collections::VecDeque;

use super::entity::{Entity, EntityKind, Position};
use super::movement::MovementAuthority;

const DIRS: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// How many past positions an enemy remembers.
pub const MEMORY_LEN: usize = 5;
pub const MOMENTUM_BONUS: f64 = 1.0;
pub const BACKTRACK_PENALTY: f64 = 5.0;

/// Bounded trail of recorded positions, oldest first.
#[derive(Clone, Debug, Default)]
pub struct EnemyMemory {
    trail: VecDeque<Position>,
}

impl EnemyMemory {
    pub fn new() -> Self {
        EnemyMemory { trail: VecDeque::with_capacity(MEMORY_LEN + 1) }
    }

    pub fn record(&mut self, pos: Position) {
        self.trail.push_back(pos);
        while self.trail.len() > MEMORY_LEN {
            self.trail.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.trail.len()
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.trail.contains(&pos)
    }

    /// The position recorded before the most recent one.
    pub fn previous(&self) -> Option<Position> {
        let n = self.trail.len();
        if n < 2 { None } else { self.trail.get(n - 2).copied() }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Position> {
        self.trail.iter()
    }
}

/// A legal step and its score.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    pub dx: i32,
    pub dy: i32,
    pub target: Position,
    pub score: f64,
}

/// Score a single target cell. Lower is better.
pub fn score_candidate(target: Position, player: Position, memory: &EnemyMemory) -> f64 {
    let mut score = target.distance(player);

    if let Some(prev) = memory.previous() {
        if (target.x - prev.x).abs() == 2 || (target.y - prev.y).abs() == 2 {
            score -= MOMENTUM_BONUS;
        }
    }

    if memory.contains(target) {
        score += BACKTRACK_PENALTY;
    }

    score
}

/// Pick the best legal step from `from`, or `None` when boxed in.
/// Does not record or move; see `Enemy::decide` for the full tick.
pub fn choose_move(
    from: Position,
    player: Position,
    memory: &EnemyMemory,
    authority: &MovementAuthority,
) -> Option<Candidate> {
    let mut best: Option<Candidate> = None;

    for &(dx, dy) in &DIRS {
        let target = from.offset(dx, dy);
        if !authority.permit_movement(EntityKind::Enemy, target.x, target.y) {
            continue;
        }
        let score = score_candidate(target, player, memory);
        // Strict comparison keeps the earliest candidate on ties
        if best.map_or(true, |b| score < b.score) {
            best = Some(Candidate { dx, dy, target, score });
        }
    }

    best
}

#[derive(Clone, Debug)]
pub struct Enemy {
    body: Entity,
    memory: EnemyMemory,
}

impl Enemy {
    pub fn spawn(pos: Position, authority: &MovementAuthority) -> Option<Self> {
        Entity::place(EntityKind::Enemy, pos, authority)
            .map(|body| Enemy { body, memory: EnemyMemory::new() })
    }

    pub fn pos(&self) -> Position {
        self.body.pos()
    }

    pub fn body(&self) -> &Entity {
        &self.body
    }

    pub fn memory(&self) -> &EnemyMemory {
        &self.memory
    }

    /// Run one decision tick: remember where we are, pick a step, take it.
    /// Returns the new position, or `None` if no neighbour was legal.
    pub fn decide(&mut self, player: Position, authority: &MovementAuthority) -> Option<Position> {
        self.memory.record(self.body.pos());

        let chosen = choose_move(self.body.pos(), player, &self.memory, authority)?;
        if self.body.move_rel(chosen.dx, chosen.dy, authority) {
            Some(self.body.pos())
        } else {
            None
        }
    }
}
