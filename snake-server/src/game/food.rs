//! Food Placement
//!
//! Picks a uniformly random free cell. Rejection sampling is tried first
//! since the board is mostly empty; after `max_attempts` misses the free
//! cells are enumerated and one is drawn directly, so placement always
//! terminates.

use std::collections::BTreeSet;

use crate::core::grid::GridPos;
use crate::core::rng::DeterministicRng;

/// Choose a food cell not covered by `snake`.
///
/// Returns `None` only when the snake covers every cell of the board.
pub fn place_food<'a, I>(
    rng: &mut DeterministicRng,
    snake: I,
    cells_per_side: u32,
    max_attempts: u32,
) -> Option<GridPos>
where
    I: IntoIterator<Item = &'a GridPos>,
{
    // BTreeSet, not HashSet: iteration order feeds the RNG draw below
    let occupied: BTreeSet<GridPos> = snake.into_iter().copied().collect();
    let cell_count = cells_per_side as usize * cells_per_side as usize;

    if occupied.len() >= cell_count {
        return None;
    }

    for _ in 0..max_attempts {
        let candidate = rng.random_cell(cells_per_side);
        if !occupied.contains(&candidate) {
            return Some(candidate);
        }
    }

    let free = free_cells(&occupied, cells_per_side);
    rng.choose(&free).copied()
}

/// All cells not in `occupied`, in row-major order.
pub fn free_cells(occupied: &BTreeSet<GridPos>, cells_per_side: u32) -> Vec<GridPos> {
    let side = cells_per_side as i32;
    (0..side)
        .flat_map(|y| (0..side).map(move |x| GridPos::new(x, y)))
        .filter(|cell| !occupied.contains(cell))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_board_except(side: u32, hole: GridPos) -> Vec<GridPos> {
        let side = side as i32;
        (0..side)
            .flat_map(|y| (0..side).map(move |x| GridPos::new(x, y)))
            .filter(|c| *c != hole)
            .collect()
    }

    #[test]
    fn test_food_never_on_snake() {
        let mut rng = DeterministicRng::new(1);
        let snake: Vec<GridPos> = (0..10).map(|x| GridPos::new(x, 0)).collect();

        for _ in 0..500 {
            let food = place_food(&mut rng, &snake, 10, 64).unwrap();
            assert!(food.is_on_board(10));
            assert!(!snake.contains(&food));
        }
    }

    #[test]
    fn test_single_free_cell_found_without_retries() {
        let mut rng = DeterministicRng::new(2);
        let hole = GridPos::new(3, 4);
        let snake = full_board_except(5, hole);

        // Zero attempts forces the free-cell path
        assert_eq!(place_food(&mut rng, &snake, 5, 0), Some(hole));
        assert_eq!(place_food(&mut rng, &snake, 5, 64), Some(hole));
    }

    #[test]
    fn test_full_board_has_no_food() {
        let mut rng = DeterministicRng::new(3);
        let side = 4;
        let snake: Vec<GridPos> = (0..side)
            .flat_map(|y| (0..side).map(move |x| GridPos::new(x, y)))
            .collect();

        assert_eq!(place_food(&mut rng, &snake, side as u32, 64), None);
    }

    #[test]
    fn test_placement_is_deterministic() {
        let snake = [GridPos::new(10, 10)];
        let mut rng1 = DeterministicRng::new(77);
        let mut rng2 = DeterministicRng::new(77);

        for _ in 0..50 {
            assert_eq!(
                place_food(&mut rng1, &snake, 20, 64),
                place_food(&mut rng2, &snake, 20, 64),
            );
        }
    }

    #[test]
    fn test_free_cells_order() {
        let occupied: BTreeSet<GridPos> = [GridPos::new(0, 0)].into_iter().collect();
        let free = free_cells(&occupied, 2);
        assert_eq!(free, vec![GridPos::new(1, 0), GridPos::new(0, 1), GridPos::new(1, 1)]);
    }
}
