/// World: everything that exists during one session.
///
/// The world owns the entities and the movement authority side by side.
/// Entities borrow the authority for each move, and the authority only knows
/// bounds and obstacle cells, so neither refers back to the other.
///
/// Nothing is removed during a session: enemies and obstacles only
/// accumulate.

use tracing::{debug, info};

use crate::domain::ai::Enemy;
use crate::domain::entity::{Dir, Entity, EntityKind, Position};
use crate::domain::movement::MovementAuthority;
use crate::error::GameError;

pub struct World {
    authority: MovementAuthority,
    player: Entity,
    /// Direction of the player's last move attempt; obstacles go there.
    facing: Dir,
    enemies: Vec<Enemy>,
    obstacles: Vec<Entity>,
    max_enemies: usize,
    spawn_cursor: usize,
}

impl World {
    /// Fresh session: player in the centre, one enemy in the top-left corner.
    pub fn new(width: i32, height: i32, max_enemies: usize) -> Result<Self, GameError> {
        let mut world = Self::empty(width, height, Position::new(width / 2, height / 2), max_enemies)?;
        world.add_enemy(Position::new(0, 0));
        Ok(world)
    }

    /// A world with just the player, for building specific layouts.
    pub fn empty(width: i32, height: i32, player_at: Position, max_enemies: usize) -> Result<Self, GameError> {
        let authority = MovementAuthority::new(width, height);
        let too_small = || GameError::SurfaceTooSmall {
            width: u16::try_from(width).unwrap_or(0),
            height: u16::try_from(height).unwrap_or(0),
        };
        let player = Entity::place(EntityKind::Player, player_at, &authority).ok_or_else(too_small)?;

        Ok(World {
            authority,
            player,
            facing: Dir::Right,
            enemies: Vec::with_capacity(max_enemies),
            obstacles: Vec::new(),
            max_enemies,
            spawn_cursor: 0,
        })
    }

    pub fn authority(&self) -> &MovementAuthority {
        &self.authority
    }

    pub fn player(&self) -> &Entity {
        &self.player
    }

    pub fn facing(&self) -> Dir {
        self.facing
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn obstacles(&self) -> &[Entity] {
        &self.obstacles
    }

    /// Draw order: obstacles, then enemies, then the player on top.
    pub fn entities(&self) -> Vec<&Entity> {
        let mut out = Vec::with_capacity(self.obstacles.len() + self.enemies.len() + 1);
        out.extend(self.obstacles.iter());
        out.extend(self.enemies.iter().map(Enemy::body));
        out.push(&self.player);
        out
    }

    pub fn move_player(&mut self, dir: Dir) -> bool {
        self.facing = dir;
        let moved = self.player.move_dir(dir, &self.authority);
        if !moved {
            debug!(?dir, at = ?self.player.pos(), "player move refused");
        }
        moved
    }

    /// Put an obstacle next to the player in the facing direction.
    /// Refused outside the grid, on an existing obstacle, or on an enemy.
    pub fn place_obstacle(&mut self) -> Option<Position> {
        let (dx, dy) = self.facing.delta();
        let target = self.player.pos().offset(dx, dy);
        if self.enemies.iter().any(|e| e.pos() == target) {
            debug!(?target, "obstacle refused: enemy in the way");
            return None;
        }
        let block = Entity::place(EntityKind::Obstacle, target, &self.authority)?;
        self.authority.add_obstacle(target);
        self.obstacles.push(block);
        info!(x = target.x, y = target.y, total = self.obstacles.len(), "obstacle placed");
        Some(target)
    }

    /// Add an enemy at `pos` if the authority accepts the cell.
    pub fn add_enemy(&mut self, pos: Position) -> bool {
        match Enemy::spawn(pos, &self.authority) {
            Some(enemy) => {
                self.enemies.push(enemy);
                info!(x = pos.x, y = pos.y, count = self.enemies.len(), "enemy spawned");
                true
            }
            None => false,
        }
    }

    /// Periodic spawn: next usable corner in rotation, up to the cap.
    pub fn spawn_enemy(&mut self) -> Option<Position> {
        if self.enemies.len() >= self.max_enemies {
            return None;
        }
        let corners = self.spawn_corners();
        for step in 0..corners.len() {
            let idx = (self.spawn_cursor + step) % corners.len();
            let corner = corners[idx];
            if corner == self.player.pos() || self.enemies.iter().any(|e| e.pos() == corner) {
                continue;
            }
            if self.add_enemy(corner) {
                self.spawn_cursor = (idx + 1) % corners.len();
                return Some(corner);
            }
        }
        debug!("no free corner to spawn at");
        None
    }

    fn spawn_corners(&self) -> [Position; 4] {
        let right = self.authority.width() - 2;
        let bottom = self.authority.height() - 1;
        [
            Position::new(0, 0),
            Position::new(right, 0),
            Position::new(0, bottom),
            Position::new(right, bottom),
        ]
    }

    /// Run one decision tick for every enemy. Returns how many moved.
    pub fn move_enemies(&mut self) -> usize {
        let target = self.player.pos();
        let mut moved = 0;
        for (i, enemy) in self.enemies.iter_mut().enumerate() {
            match enemy.decide(target, &self.authority) {
                Some(to) => {
                    moved += 1;
                    debug!(enemy = i, x = to.x, y = to.y, "enemy moved");
                }
                None => debug!(enemy = i, "enemy has no legal move"),
            }
        }
        moved
    }

    /// The cell where an enemy has caught the player, if any.
    pub fn caught(&self) -> Option<Position> {
        let at = self.player.pos();
        self.enemies.iter().any(|e| e.pos() == at).then_some(at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(x: i32, y: i32) -> Position {
        Position::new(x, y)
    }

    #[test]
    fn new_world_layout() {
        let w = World::new(10, 10, 8).unwrap();
        assert_eq!(w.player().pos(), pos(5, 5));
        assert_eq!(w.enemies().len(), 1);
        assert_eq!(w.enemies()[0].pos(), pos(0, 0));
        assert_eq!(w.facing(), Dir::Right);
    }

    #[test]
    fn tiny_surface_is_rejected() {
        assert!(matches!(World::new(2, 5, 8), Err(GameError::SurfaceTooSmall { .. })));
        assert!(matches!(World::new(10, 0, 8), Err(GameError::SurfaceTooSmall { .. })));
    }

    #[test]
    fn obstacle_blocks_the_player() {
        let mut w = World::empty(10, 10, pos(5, 5), 0).unwrap();
        assert_eq!(w.place_obstacle(), Some(pos(6, 5)));
        assert!(!w.move_player(Dir::Right));
        assert_eq!(w.player().pos(), pos(5, 5));
        assert!(w.authority().is_obstacle(pos(6, 5)));
    }

    #[test]
    fn obstacle_follows_facing() {
        let mut w = World::empty(10, 10, pos(5, 5), 0).unwrap();
        w.move_player(Dir::Up);
        assert_eq!(w.player().pos(), pos(5, 4));
        assert_eq!(w.place_obstacle(), Some(pos(5, 3)));
    }

    #[test]
    fn refused_move_still_turns_player() {
        let mut w = World::empty(10, 10, pos(0, 5), 0).unwrap();
        assert!(!w.move_player(Dir::Left));
        assert_eq!(w.facing(), Dir::Left);
        assert_eq!(w.place_obstacle(), None); // would be off-grid
    }

    #[test]
    fn obstacle_not_placed_twice_or_on_enemy() {
        let mut w = World::empty(10, 10, pos(5, 5), 4).unwrap();
        assert!(w.place_obstacle().is_some());
        assert_eq!(w.place_obstacle(), None);
        w.move_player(Dir::Down);
        assert!(w.add_enemy(pos(6, 6)));
        w.move_player(Dir::Right); // enemy cells are enterable
        assert_eq!(w.player().pos(), pos(6, 6));
        assert!(w.add_enemy(pos(7, 6)));
        assert_eq!(w.place_obstacle(), None);
        assert_eq!(w.obstacles().len(), 1);
    }

    #[test]
    fn spawns_rotate_through_corners_up_to_cap() {
        let mut w = World::empty(10, 6, pos(4, 3), 3).unwrap();
        assert_eq!(w.spawn_enemy(), Some(pos(0, 0)));
        assert_eq!(w.spawn_enemy(), Some(pos(8, 0)));
        assert_eq!(w.spawn_enemy(), Some(pos(0, 5)));
        assert_eq!(w.spawn_enemy(), None);
        assert_eq!(w.enemies().len(), 3);
    }

    #[test]
    fn spawn_skips_occupied_corners() {
        let mut w = World::empty(10, 6, pos(0, 0), 4).unwrap();
        assert!(w.add_enemy(pos(8, 0)));
        assert_eq!(w.spawn_enemy(), Some(pos(0, 5)));
    }

    #[test]
    fn spawn_skips_obstacle_corner() {
        let mut w = World::empty(10, 6, pos(2, 0), 4).unwrap();
        assert!(w.move_player(Dir::Left));
        assert_eq!(w.player().pos(), pos(1, 0));
        assert_eq!(w.place_obstacle(), Some(pos(0, 0)));
        assert_eq!(w.spawn_enemy(), Some(pos(8, 0)));
    }

    #[test]
    fn enemy_decision_approaches_player() {
        let mut w = World::new(10, 10, 8).unwrap();
        assert_eq!(w.move_enemies(), 1);
        assert_eq!(w.enemies()[0].pos(), pos(1, 0));
    }

    #[test]
    fn caught_when_sharing_a_cell() {
        let mut w = World::empty(10, 10, pos(5, 5), 2).unwrap();
        assert_eq!(w.caught(), None);
        w.add_enemy(pos(5, 5));
        assert_eq!(w.caught(), Some(pos(5, 5)));
    }

    #[test]
    fn entities_draw_player_last() {
        let mut w = World::new(10, 10, 8).unwrap();
        w.place_obstacle();
        let kinds: Vec<EntityKind> = w.entities().iter().map(|e| e.kind()).collect();
        assert_eq!(kinds, vec![EntityKind::Obstacle, EntityKind::Enemy, EntityKind::Player]);
    }
}
