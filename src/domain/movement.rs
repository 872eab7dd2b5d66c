/// Movement authority: the one place that decides whether a cell may be
/// entered.
///
/// It knows the grid bounds and where obstacles stand, nothing else. Every
/// coordinate change of every entity is checked here before it is committed.
/// Enemies may share a cell with each other or with the player; only bounds
/// and obstacles block.

use std::collections::HashSet;

use super::entity::{EntityKind, Position};

#[derive(Clone, Debug)]
pub struct MovementAuthority {
    width: i32,
    height: i32,
    obstacles: HashSet<Position>,
}

impl MovementAuthority {
    pub fn new(width: i32, height: i32) -> Self {
        MovementAuthority {
            width,
            height,
            obstacles: HashSet::with_capacity(32),
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Pure query: may an entity of `_kind` occupy `(x, y)`?
    ///
    /// The last column (`width - 1`) is never usable; the terminal cursor
    /// wraps when a glyph is written there.
    pub fn permit_movement(&self, _kind: EntityKind, x: i32, y: i32) -> bool {
        if x < 0 || x >= self.width - 1 {
            return false;
        }
        if y < 0 || y >= self.height {
            return false;
        }
        !self.obstacles.contains(&Position::new(x, y))
    }

    pub fn is_obstacle(&self, pos: Position) -> bool {
        self.obstacles.contains(&pos)
    }

    /// Register a committed obstacle. Callers place the obstacle entity
    /// through `permit_movement` first.
    pub fn add_obstacle(&mut self, pos: Position) {
        self.obstacles.insert(pos);
    }

    pub fn obstacle_count(&self) -> usize {
        self.obstacles.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const KINDS: [EntityKind; 3] = [EntityKind::Player, EntityKind::Enemy, EntityKind::Obstacle];

    #[test]
    fn corners_of_usable_area() {
        let auth = MovementAuthority::new(10, 10);
        assert!(auth.permit_movement(EntityKind::Player, 0, 0));
        assert!(auth.permit_movement(EntityKind::Player, 8, 9));
        assert!(!auth.permit_movement(EntityKind::Player, 9, 0));
        assert!(!auth.permit_movement(EntityKind::Player, 0, 10));
        assert!(!auth.permit_movement(EntityKind::Player, -1, 0));
        assert!(!auth.permit_movement(EntityKind::Player, 0, -1));
    }

    #[test]
    fn obstacle_blocks_every_kind() {
        let mut auth = MovementAuthority::new(10, 10);
        auth.add_obstacle(Position::new(4, 2));
        for kind in KINDS {
            assert!(!auth.permit_movement(kind, 4, 2));
            assert!(auth.permit_movement(kind, 4, 3));
        }
        assert!(auth.is_obstacle(Position::new(4, 2)));
        assert_eq!(auth.obstacle_count(), 1);
    }

    #[test]
    fn degenerate_grid_permits_nothing() {
        let auth = MovementAuthority::new(1, 5);
        assert!(!auth.permit_movement(EntityKind::Enemy, 0, 0));
    }

    proptest! {
        #[test]
        fn bounds_rule_matches_formula(
            w in 2i32..40, h in 1i32..40,
            x in -5i32..45, y in -5i32..45,
        ) {
            let auth = MovementAuthority::new(w, h);
            let expected = x >= 0 && x < w - 1 && y >= 0 && y < h;
            for kind in KINDS {
                prop_assert_eq!(auth.permit_movement(kind, x, y), expected);
            }
        }

        #[test]
        fn placed_obstacle_is_always_refused(
            obstacles in proptest::collection::vec((0i32..9, 0i32..10), 1..20),
        ) {
            let mut auth = MovementAuthority::new(10, 10);
            for &(x, y) in &obstacles {
                auth.add_obstacle(Position::new(x, y));
            }
            for &(x, y) in &obstacles {
                for kind in KINDS {
                    prop_assert!(!auth.permit_movement(kind, x, y));
                }
            }
        }
    }
}
