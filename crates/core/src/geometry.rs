//! Distance metrics and rasterisation helpers over integer map coordinates.

use crate::types::Pos;

/// Orthogonal step cost used by the path search.
pub const STRAIGHT_COST: u32 = 10;
/// Diagonal step cost (≈ 10·√2) used by the octile heuristic.
pub const DIAGONAL_COST: u32 = 14;

pub fn euclidean(a: Pos, b: Pos) -> f64 {
    euclidean_squared(a, b).sqrt()
}

pub fn euclidean_squared(a: Pos, b: Pos) -> f64 {
    let dx = f64::from(a.x) - f64::from(b.x);
    let dy = f64::from(a.y) - f64::from(b.y);
    dx * dx + dy * dy
}

pub fn manhattan(a: Pos, b: Pos) -> u32 {
    a.x.abs_diff(b.x) + a.y.abs_diff(b.y)
}

pub fn chebyshev(a: Pos, b: Pos) -> u32 {
    a.x.abs_diff(b.x).max(a.y.abs_diff(b.y))
}

/// `14 * min(dx, dy) + 10 * |dx - dy|`.
pub fn octile(a: Pos, b: Pos) -> u32 {
    let dx = a.x.abs_diff(b.x);
    let dy = a.y.abs_diff(b.y);
    DIAGONAL_COST * dx.min(dy) + STRAIGHT_COST * dx.abs_diff(dy)
}

/// Bresenham line from `from` to `to`, both endpoints included.
pub fn line(from: Pos, to: Pos) -> Vec<Pos> {
    let dx = (to.x - from.x).abs();
    let dy = -(to.y - from.y).abs();
    let sx = if from.x < to.x { 1 } else { -1 };
    let sy = if from.y < to.y { 1 } else { -1 };
    let mut err = dx + dy;

    let mut points = Vec::with_capacity((dx - dy) as usize + 1);
    let mut x = from.x;
    let mut y = from.y;
    loop {
        points.push(Pos { y, x });
        if x == to.x && y == to.y {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
    points
}

/// Every cell within `radius` (Euclidean, inclusive) of `center`.
pub fn brush(center: Pos, radius: i32) -> Vec<Pos> {
    let radius = radius.max(0);
    let mut cells = Vec::new();
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius * radius {
                cells.push(center.offset(dx, dy));
            }
        }
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_metrics_agree_on_simple_offsets() {
        let a = Pos::new(1, 2);
        let b = Pos::new(4, 6);
        assert_eq!(manhattan(a, b), 7);
        assert_eq!(chebyshev(a, b), 4);
        assert!((euclidean(a, b) - 5.0).abs() < 1e-12);
        assert_eq!(octile(a, b), 14 * 3 + 10);
    }

    #[test]
    fn line_is_eight_connected_and_hits_both_endpoints() {
        let from = Pos::new(-2, 7);
        let to = Pos::new(9, 1);
        let points = line(from, to);
        assert_eq!(points.first(), Some(&from));
        assert_eq!(points.last(), Some(&to));
        for pair in points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            assert_eq!(chebyshev(a, b), 1, "gap between {a:?} and {b:?}");
        }
    }

    #[test]
    fn degenerate_line_is_single_point() {
        assert_eq!(line(Pos::new(3, 3), Pos::new(3, 3)), vec![Pos::new(3, 3)]);
    }

    #[test]
    fn brush_radius_one_is_a_plus_sign() {
        let mut cells = brush(Pos::new(0, 0), 1);
        cells.sort();
        assert_eq!(
            cells,
            vec![Pos::new(0, -1), Pos::new(-1, 0), Pos::new(0, 0), Pos::new(1, 0), Pos::new(0, 1)]
        );
        assert_eq!(brush(Pos::new(5, 5), 0), vec![Pos::new(5, 5)]);
    }
}
