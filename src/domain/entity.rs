/// Entities: Player, Enemy, Obstacle.
///
/// An entity is nothing more than a grid position plus a kind. It never
/// writes its own coordinates without asking the `MovementAuthority` first;
/// the authority is borrowed per call, so entities hold no back-reference to
/// the world.

use super::movement::MovementAuthority;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Position { x: self.x + dx, y: self.y + dy }
    }

    /// Straight-line distance, used by the enemy scoring.
    pub fn distance(self, other: Position) -> f64 {
        let dx = f64::from(self.x - other.x);
        let dy = f64::from(self.y - other.y);
        (dx * dx + dy * dy).sqrt()
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum EntityKind {
    Player,
    Enemy,
    Obstacle,
}

/// Cardinal direction of a single-cell step.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Dir {
    Left,
    Right,
    Up,
    Down,
}

impl Dir {
    pub fn delta(self) -> (i32, i32) {
        match self {
            Dir::Left => (-1, 0),
            Dir::Right => (1, 0),
            Dir::Up => (0, -1),
            Dir::Down => (0, 1),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Entity {
    pos: Position,
    kind: EntityKind,
}

impl Entity {
    /// Create an entity at `pos`, provided the authority accepts the cell.
    /// This is the same commit path `move_rel` uses.
    pub fn place(kind: EntityKind, pos: Position, authority: &MovementAuthority) -> Option<Self> {
        if authority.permit_movement(kind, pos.x, pos.y) {
            Some(Entity { pos, kind })
        } else {
            None
        }
    }

    pub fn pos(&self) -> Position {
        self.pos
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Propose `(x + dx, y + dy)`. Commits and returns true on approval;
    /// a refused move leaves the entity where it is.
    pub fn move_rel(&mut self, dx: i32, dy: i32, authority: &MovementAuthority) -> bool {
        let target = self.pos.offset(dx, dy);
        if authority.permit_movement(self.kind, target.x, target.y) {
            self.pos = target;
            true
        } else {
            false
        }
    }

    pub fn move_dir(&mut self, dir: Dir, authority: &MovementAuthority) -> bool {
        let (dx, dy) = dir.delta();
        self.move_rel(dx, dy, authority)
    }

    pub fn move_up(&mut self, authority: &MovementAuthority) -> bool {
        self.move_dir(Dir::Up, authority)
    }

    pub fn move_down(&mut self, authority: &MovementAuthority) -> bool {
        self.move_dir(Dir::Down, authority)
    }

    pub fn move_left(&mut self, authority: &MovementAuthority) -> bool {
        self.move_dir(Dir::Left, authority)
    }

    pub fn move_right(&mut self, authority: &MovementAuthority) -> bool {
        self.move_dir(Dir::Right, authority)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_grid() -> MovementAuthority {
        MovementAuthority::new(10, 10)
    }

    #[test]
    fn cardinal_helpers_step_one_cell() {
        let auth = open_grid();
        let mut e = Entity::place(EntityKind::Player, Position::new(4, 4), &auth).unwrap();
        assert!(e.move_up(&auth));
        assert_eq!(e.pos(), Position::new(4, 3));
        assert!(e.move_right(&auth));
        assert_eq!(e.pos(), Position::new(5, 3));
        assert!(e.move_down(&auth));
        assert!(e.move_left(&auth));
        assert_eq!(e.pos(), Position::new(4, 4));
    }

    #[test]
    fn zero_move_is_idempotent() {
        let auth = open_grid();
        let mut e = Entity::place(EntityKind::Enemy, Position::new(0, 0), &auth).unwrap();
        for _ in 0..3 {
            assert!(e.move_rel(0, 0, &auth));
            assert_eq!(e.pos(), Position::new(0, 0));
        }
    }

    #[test]
    fn refused_move_stays_in_place() {
        let auth = open_grid();
        let mut e = Entity::place(EntityKind::Player, Position::new(0, 0), &auth).unwrap();
        assert!(!e.move_left(&auth));
        assert!(!e.move_up(&auth));
        assert_eq!(e.pos(), Position::new(0, 0));
    }

    #[test]
    fn right_edge_column_is_reserved() {
        let auth = open_grid();
        let mut e = Entity::place(EntityKind::Player, Position::new(8, 9), &auth).unwrap();
        assert!(!e.move_right(&auth)); // x = 9 == width - 1
        assert!(!e.move_down(&auth)); // y = 10 == height
        assert_eq!(e.pos(), Position::new(8, 9));
    }

    #[test]
    fn placement_goes_through_authority() {
        let mut auth = open_grid();
        auth.add_obstacle(Position::new(3, 3));
        assert!(Entity::place(EntityKind::Enemy, Position::new(3, 3), &auth).is_none());
        assert!(Entity::place(EntityKind::Enemy, Position::new(-1, 3), &auth).is_none());
        assert!(Entity::place(EntityKind::Enemy, Position::new(2, 3), &auth).is_some());
    }

    #[test]
    fn distance_is_euclidean() {
        let d = Position::new(0, 0).distance(Position::new(3, 4));
        assert!((d - 5.0).abs() < 1e-9);
    }
}
