//! One-cell dilation of corridor tile sets.

use std::collections::BTreeSet;

use crate::types::Pos;

/// 8-neighbours of members that are not members themselves.
///
/// With `bounds = Some((width, height))`, cells outside `0..width × 0..height` are dropped.
pub fn boundary(set: &BTreeSet<Pos>, bounds: Option<(usize, usize)>) -> BTreeSet<Pos> {
    let inside = |pos: Pos| {
        bounds.is_none_or(|(width, height)| {
            pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < width && (pos.y as usize) < height
        })
    };
    set.iter()
        .flat_map(|pos| pos.surrounding_neighbors())
        .filter(|&neighbor| inside(neighbor) && !set.contains(&neighbor))
        .collect()
}

/// `set ∪ boundary(set)`.
pub fn widen(set: &BTreeSet<Pos>, bounds: Option<(usize, usize)>) -> BTreeSet<Pos> {
    let mut widened = boundary(set, bounds);
    widened.extend(set.iter().copied());
    widened
}

#[cfg(test)]
mod tests {
    use proptest::collection;
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn single_cell_grows_into_a_block() {
        let set = BTreeSet::from([Pos::new(5, 5)]);
        assert_eq!(boundary(&set, None).len(), 8);
        let widened = widen(&set, None);
        assert_eq!(widened.len(), 9);
        assert!(widened.contains(&Pos::new(4, 6)));
    }

    #[test]
    fn bounds_clip_the_boundary() {
        let set = BTreeSet::from([Pos::new(0, 0)]);
        let ring = boundary(&set, Some((3, 3)));
        assert_eq!(ring, BTreeSet::from([Pos::new(1, 0), Pos::new(0, 1), Pos::new(1, 1)]));
    }

    #[test]
    fn horizontal_corridor_becomes_three_wide() {
        let set: BTreeSet<Pos> = (2..8).map(|x| Pos::new(x, 4)).collect();
        let widened = widen(&set, Some((10, 10)));
        assert_eq!(widened.len(), 8 * 3);
        assert!(widened.iter().all(|pos| (3..=5).contains(&pos.y)));
    }

    proptest! {
        #[test]
        fn widening_twice_strictly_grows_while_space_remains(
            cells in collection::btree_set((0_i32..16, 0_i32..16), 1..20),
        ) {
            let bounds = Some((16, 16));
            let set: BTreeSet<Pos> = cells.into_iter().map(|(x, y)| Pos::new(x, y)).collect();
            let once = widen(&set, bounds);
            let twice = widen(&once, bounds);
            prop_assert!(set.is_subset(&once) && once.is_subset(&twice));
            if once.len() < 16 * 16 {
                prop_assert!(twice.len() > once.len());
            }
            prop_assert!(once.len() > set.len());
        }
    }
}
