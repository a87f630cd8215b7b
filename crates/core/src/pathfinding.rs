//! Grid A* used to carve corridors between anchor points.
//!
//! All search bookkeeping (g-scores, parent links, closed set, open heap) is owned by the
//! call, so any number of searches may share a `&PathGrid`. Only [`carve_path`] writes back to
//! the grid, stamping the route it found as hallway.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::error::Result;
use crate::geometry::{STRAIGHT_COST, octile};
use crate::grid::PathGrid;
use crate::heap::IndexedHeap;
use crate::types::{Pos, Terrain};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AstarOptions {
    /// Add the neighbour's terrain surcharge to its heuristic.
    pub terrain_costs: bool,
    /// Give up (returning no path) after this many node expansions.
    pub max_iterations: Option<usize>,
}

impl Default for AstarOptions {
    fn default() -> Self {
        Self { terrain_costs: true, max_iterations: Some(100_000) }
    }
}

impl AstarOptions {
    pub fn uniform_cost() -> Self {
        Self { terrain_costs: false, ..Self::default() }
    }
}

/// Finds a 4-connected route from `start` to `target`, both included.
///
/// `Ok(None)` means no route exists (or the expansion cap was hit). Coordinates outside the
/// grid are a caller bug and fail with [`crate::MapgenError::OutOfBounds`].
pub fn find_path(
    grid: &PathGrid,
    start: Pos,
    target: Pos,
    options: &AstarOptions,
) -> Result<Option<Vec<Pos>>> {
    grid.node(start)?;
    let target_node = grid.node(target)?;
    if start == target {
        return Ok(Some(vec![start]));
    }
    if !target_node.walkable {
        return Ok(None);
    }

    let mut open: IndexedHeap<Pos, (u32, u32)> = IndexedHeap::new();
    let mut closed = HashSet::new();
    let mut g_score = HashMap::from([(start, 0_u32)]);
    let mut came_from = HashMap::new();

    let h = octile(start, target);
    open.push(start, (h, h));

    let mut expansions = 0_usize;
    while let Some((current, _)) = open.pop() {
        if current == target {
            let path = retrace(&came_from, start, target);
            debug!(?start, ?target, expansions, steps = path.len(), "path found");
            return Ok(Some(path));
        }
        closed.insert(current);

        expansions += 1;
        if options.max_iterations.is_some_and(|cap| expansions > cap) {
            warn!(?start, ?target, expansions, "path search hit its expansion cap");
            return Ok(None);
        }

        let current_g = g_score.get(&current).copied().unwrap_or(u32::MAX);
        for neighbor in grid.neighbours(current) {
            if !grid.is_walkable(neighbor) || closed.contains(&neighbor) {
                continue;
            }
            let tentative_g = current_g.saturating_add(STRAIGHT_COST);
            let known_g = g_score.get(&neighbor).copied().unwrap_or(u32::MAX);
            if tentative_g < known_g || !open.contains(&neighbor) {
                let h = heuristic(grid, neighbor, target, options);
                g_score.insert(neighbor, tentative_g);
                came_from.insert(neighbor, current);
                open.push(neighbor, (tentative_g + h, h));
            }
        }
    }

    debug!(?start, ?target, expansions, "no path");
    Ok(None)
}

/// Runs [`find_path`] and marks the route as hallway so later searches steer around it.
///
/// The start node keeps its terrain; nodes already tagged `Floor` stay `Floor`.
pub fn carve_path(
    grid: &mut PathGrid,
    start: Pos,
    target: Pos,
    options: &AstarOptions,
) -> Result<Option<Vec<Pos>>> {
    let Some(path) = find_path(grid, start, target, options)? else {
        return Ok(None);
    };
    for &pos in path.iter().skip(1) {
        let node = grid.node_mut(pos)?;
        if node.terrain != Terrain::Floor {
            node.terrain = Terrain::Hallway;
        }
    }
    Ok(Some(path))
}

/// Movement cost of a path returned by [`find_path`].
pub fn path_cost(path: &[Pos]) -> u32 {
    STRAIGHT_COST * path.len().saturating_sub(1) as u32
}

fn heuristic(grid: &PathGrid, pos: Pos, target: Pos, options: &AstarOptions) -> u32 {
    let distance = octile(pos, target);
    if options.terrain_costs { distance + grid.terrain(pos).surcharge() } else { distance }
}

fn retrace(came_from: &HashMap<Pos, Pos>, start: Pos, target: Pos) -> Vec<Pos> {
    let mut path = vec![target];
    let mut current = target;
    while current != start {
        let Some(&parent) = came_from.get(&current) else {
            break;
        };
        path.push(parent);
        current = parent;
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use proptest::collection;
    use proptest::prelude::*;

    use super::*;
    use crate::geometry::manhattan;

    /// Breadth-first step distance, used to cross-check A* on small grids.
    fn bfs_distance(grid: &PathGrid, start: Pos, target: Pos) -> Option<u32> {
        let mut distance = HashMap::from([(start, 0_u32)]);
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            if current == target {
                return distance.get(&current).copied();
            }
            let steps = distance[&current];
            for neighbor in grid.neighbours(current) {
                if grid.is_walkable(neighbor) && !distance.contains_key(&neighbor) {
                    distance.insert(neighbor, steps + 1);
                    queue.push_back(neighbor);
                }
            }
        }
        None
    }

    fn walled_grid() -> PathGrid {
        // 10x10 with a wall at x = 4 (gap at y = 8) and a wall at y = 3 (gap at x = 7).
        let mut grid = PathGrid::new(10, 10);
        for y in 0..10 {
            if y != 8 {
                grid.set_walkable(Pos::new(4, y), false).expect("in bounds");
            }
        }
        for x in 5..10 {
            if x != 7 {
                grid.set_walkable(Pos::new(x, 3), false).expect("in bounds");
            }
        }
        grid
    }

    fn assert_contiguous(path: &[Pos], start: Pos, target: Pos) {
        assert_eq!(path.first(), Some(&start));
        assert_eq!(path.last(), Some(&target));
        for pair in path.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            assert_eq!(manhattan(a, b), 1, "{a:?} -> {b:?} is not a step");
        }
    }

    #[test]
    fn open_five_by_five_corner_to_corner_takes_nine_cells() {
        let grid = PathGrid::new(5, 5);
        let path = find_path(&grid, Pos::new(0, 0), Pos::new(4, 4), &AstarOptions::uniform_cost())
            .expect("in bounds")
            .expect("open grid is connected");
        assert_eq!(path.len(), 9);
        assert_contiguous(&path, Pos::new(0, 0), Pos::new(4, 4));
    }

    #[test]
    fn uniform_cost_paths_match_breadth_first_distance_around_walls() {
        let grid = walled_grid();
        let options = AstarOptions::uniform_cost();
        let start = Pos::new(0, 0);
        for target in [Pos::new(9, 0), Pos::new(9, 9), Pos::new(6, 5), Pos::new(3, 9)] {
            let path = find_path(&grid, start, target, &options)
                .expect("in bounds")
                .expect("target is reachable");
            assert_contiguous(&path, start, target);
            let expected = bfs_distance(&grid, start, target).expect("reachable");
            assert_eq!(path_cost(&path), expected * STRAIGHT_COST, "target {target:?}");
        }
    }

    #[test]
    fn sealed_target_has_no_path() {
        let mut grid = PathGrid::new(6, 6);
        for pos in Pos::new(4, 4).orthogonal_neighbors() {
            grid.set_walkable(pos, false).expect("in bounds");
        }
        let path = find_path(&grid, Pos::new(0, 0), Pos::new(4, 4), &AstarOptions::default())
            .expect("in bounds");
        assert!(path.is_none());

        grid.set_walkable(Pos::new(2, 2), false).expect("in bounds");
        let path = find_path(&grid, Pos::new(0, 0), Pos::new(2, 2), &AstarOptions::default())
            .expect("in bounds");
        assert!(path.is_none(), "unwalkable target is unreachable");
    }

    #[test]
    fn out_of_bounds_endpoints_are_errors() {
        let grid = PathGrid::new(4, 4);
        let options = AstarOptions::default();
        assert!(find_path(&grid, Pos::new(-1, 0), Pos::new(2, 2), &options).is_err());
        assert!(find_path(&grid, Pos::new(0, 0), Pos::new(2, 4), &options).is_err());
    }

    #[test]
    fn same_start_and_target_is_a_single_cell_path() {
        let grid = PathGrid::new(3, 3);
        let path = find_path(&grid, Pos::new(1, 1), Pos::new(1, 1), &AstarOptions::default())
            .expect("in bounds");
        assert_eq!(path, Some(vec![Pos::new(1, 1)]));
    }

    #[test]
    fn expansion_cap_gives_up() {
        let grid = PathGrid::new(40, 40);
        let options = AstarOptions { terrain_costs: false, max_iterations: Some(5) };
        let path = find_path(&grid, Pos::new(0, 0), Pos::new(39, 39), &options).expect("in bounds");
        assert!(path.is_none());
    }

    #[test]
    fn carving_stamps_hallway_except_start_and_floor() {
        let mut grid = PathGrid::new(6, 1);
        grid.set_terrain(Pos::new(3, 0), Terrain::Floor).expect("in bounds");
        let path = carve_path(&mut grid, Pos::new(0, 0), Pos::new(5, 0), &AstarOptions::default())
            .expect("in bounds")
            .expect("corridor is open");
        assert_eq!(path.len(), 6);
        assert_eq!(grid.terrain(Pos::new(0, 0)), Terrain::None);
        assert_eq!(grid.terrain(Pos::new(3, 0)), Terrain::Floor);
        for x in [1, 2, 4, 5] {
            assert_eq!(grid.terrain(Pos::new(x, 0)), Terrain::Hallway);
        }
    }

    #[test]
    fn terrain_surcharge_steers_away_from_hallway_when_detour_is_free() {
        // Two equal-length lanes between (0,1) and (4,1): through row 0 or row 2.
        let mut grid = PathGrid::new(5, 3);
        for x in 1..4 {
            grid.set_walkable(Pos::new(x, 1), false).expect("in bounds");
        }
        for x in 0..5 {
            grid.set_terrain(Pos::new(x, 0), Terrain::Hallway).expect("in bounds");
        }
        let path = find_path(&grid, Pos::new(0, 1), Pos::new(4, 1), &AstarOptions::default())
            .expect("in bounds")
            .expect("both lanes are open");
        assert!(path.iter().all(|pos| pos.y != 0), "expected the untouched lane, got {path:?}");
    }

    proptest! {
        #[test]
        fn uniform_cost_search_is_optimal_on_random_obstacles(
            blocked in collection::vec(any::<bool>(), 100),
            start_index in 0_usize..100,
            target_index in 0_usize..100,
        ) {
            let mut grid = PathGrid::new(10, 10);
            for (index, &is_blocked) in blocked.iter().enumerate() {
                let pos = Pos::new((index % 10) as i32, (index / 10) as i32);
                if is_blocked && index % 3 == 0 {
                    grid.set_walkable(pos, false).expect("in bounds");
                }
            }
            let start = Pos::new((start_index % 10) as i32, (start_index / 10) as i32);
            let target = Pos::new((target_index % 10) as i32, (target_index / 10) as i32);
            grid.set_walkable(target, true).expect("in bounds");

            let found = find_path(&grid, start, target, &AstarOptions::uniform_cost())
                .expect("in bounds");
            match (found, bfs_distance(&grid, start, target)) {
                (Some(path), Some(steps)) => {
                    prop_assert_eq!(path_cost(&path), steps * STRAIGHT_COST);
                    prop_assert_eq!(path.first(), Some(&start));
                    prop_assert_eq!(path.last(), Some(&target));
                }
                (None, None) => {}
                (found, expected) => {
                    prop_assert!(false, "a* {found:?} disagrees with bfs {expected:?}");
                }
            }
        }
    }
}
