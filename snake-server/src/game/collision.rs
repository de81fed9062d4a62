//! Collision Detection
//!
//! Wall and self collisions for the snake head.

use serde::{Serialize, Deserialize};
use crate::core::grid::GridPos;

/// What the head ran into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Collision {
    /// Head left the board
    Wall,
    /// Head entered a cell occupied by the body
    SelfBite,
}

/// Check if `head` is outside a `cells_per_side` board.
///
/// The bound is in cells: column `cells_per_side` is already off the board.
#[inline]
pub fn hits_wall(head: GridPos, cells_per_side: u32) -> bool {
    !head.is_on_board(cells_per_side)
}

/// Check if `head` lands on any of `body`.
///
/// `body` is the snake before the move, so it includes the tail cell:
/// the tail has not moved yet when the head arrives.
#[inline]
pub fn hits_body<'a, I>(head: GridPos, body: I) -> bool
where
    I: IntoIterator<Item = &'a GridPos>,
{
    body.into_iter().any(|segment| *segment == head)
}

/// Full collision check for a new head against the current snake.
pub fn check_collision<'a, I>(head: GridPos, body: I, cells_per_side: u32) -> Option<Collision>
where
    I: IntoIterator<Item = &'a GridPos>,
{
    if hits_wall(head, cells_per_side) {
        return Some(Collision::Wall);
    }
    if hits_body(head, body) {
        return Some(Collision::SelfBite);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wall_edges() {
        assert!(hits_wall(GridPos::new(-1, 5), 20));
        assert!(hits_wall(GridPos::new(20, 5), 20));
        assert!(hits_wall(GridPos::new(5, -1), 20));
        assert!(hits_wall(GridPos::new(5, 20), 20));
        assert!(!hits_wall(GridPos::new(0, 0), 20));
        assert!(!hits_wall(GridPos::new(19, 19), 20));
    }

    #[test]
    fn test_self_bite_includes_tail() {
        let body = [GridPos::new(2, 2), GridPos::new(3, 2), GridPos::new(3, 3), GridPos::new(2, 3)];
        assert_eq!(check_collision(GridPos::new(2, 3), &body, 20), Some(Collision::SelfBite));
        assert_eq!(check_collision(GridPos::new(1, 2), &body, 20), None);
    }

    #[test]
    fn test_wall_wins_over_body() {
        let body = [GridPos::new(0, 0)];
        assert_eq!(check_collision(GridPos::new(-1, 0), &body, 20), Some(Collision::Wall));
    }
}
