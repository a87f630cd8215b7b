//! Bowyer-Watson Delaunay triangulation over integer points.
//!
//! Vertices sit on integer coordinates, so the in-circle predicate is evaluated exactly with
//! 128-bit integer arithmetic; the float circumcircle is kept only for inspection. A point on
//! a circumcircle counts as inside it.
//!
//! The super-triangle is finite (`SUPER_TRIANGLE_REACH` times the bounding box), so a sliver
//! triangle on the convex hull whose circumcircle reaches a super vertex can be discarded with
//! the super-triangle. The result then misses that hull edge and does not cover the whole hull.
//! Every input point still ends up on at least one edge; callers that need a connected graph
//! bridge it themselves.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};

use tracing::{debug, warn};

use crate::geometry::euclidean;
use crate::types::Pos;

/// Super-triangle vertices sit this many `delta_max` lengths away from the input midpoint.
const SUPER_TRIANGLE_REACH: i64 = 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Vertex(pub Pos);

impl From<Pos> for Vertex {
    fn from(pos: Pos) -> Self {
        Self(pos)
    }
}

/// Undirected edge; `Edge::new(a, b) == Edge::new(b, a)`.
#[derive(Clone, Copy, Debug)]
pub struct Edge {
    pub u: Vertex,
    pub v: Vertex,
    length: f64,
}

impl Edge {
    pub fn new(u: impl Into<Vertex>, v: impl Into<Vertex>) -> Self {
        let u = u.into();
        let v = v.into();
        Self { u, v, length: euclidean(u.0, v.0) }
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn touches(&self, vertex: Vertex) -> bool {
        self.u == vertex || self.v == vertex
    }

    /// The endpoint opposite `vertex`, if `vertex` is an endpoint.
    pub fn other(&self, vertex: Vertex) -> Option<Vertex> {
        if self.u == vertex {
            Some(self.v)
        } else if self.v == vertex {
            Some(self.u)
        } else {
            None
        }
    }

    fn key(&self) -> (Vertex, Vertex) {
        if self.u <= self.v { (self.u, self.v) } else { (self.v, self.u) }
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Edge {}

impl Hash for Edge {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CircleSide {
    Inside,
    On,
    Outside,
}

/// Non-degenerate triangle; equality ignores vertex order.
#[derive(Clone, Copy, Debug)]
pub struct Triangle {
    pub a: Vertex,
    pub b: Vertex,
    pub c: Vertex,
    circumcenter: (f64, f64),
    circumradius_squared: f64,
}

impl Triangle {
    /// Returns `None` when the three vertices are collinear.
    pub fn new(a: Vertex, b: Vertex, c: Vertex) -> Option<Self> {
        let orientation = orient(a.0, b.0, c.0);
        if orientation == 0 {
            return None;
        }

        let (ax, ay) = (f64::from(a.0.x), f64::from(a.0.y));
        let (bx, by) = (f64::from(b.0.x) - ax, f64::from(b.0.y) - ay);
        let (cx, cy) = (f64::from(c.0.x) - ax, f64::from(c.0.y) - ay);
        let d = 2.0 * (bx * cy - by * cx);
        let b_sq = bx * bx + by * by;
        let c_sq = cx * cx + cy * cy;
        let ux = (cy * b_sq - by * c_sq) / d;
        let uy = (bx * c_sq - cx * b_sq) / d;

        Some(Self {
            a,
            b,
            c,
            circumcenter: (ax + ux, ay + uy),
            circumradius_squared: ux * ux + uy * uy,
        })
    }

    pub fn vertices(&self) -> [Vertex; 3] {
        [self.a, self.b, self.c]
    }

    pub fn edges(&self) -> [Edge; 3] {
        [Edge::new(self.a, self.b), Edge::new(self.b, self.c), Edge::new(self.c, self.a)]
    }

    pub fn has_vertex(&self, vertex: Vertex) -> bool {
        self.a == vertex || self.b == vertex || self.c == vertex
    }

    pub fn circumcenter(&self) -> (f64, f64) {
        self.circumcenter
    }

    pub fn circumradius_squared(&self) -> f64 {
        self.circumradius_squared
    }

    pub fn circumcircle_side(&self, pos: Pos) -> CircleSide {
        let determinant = incircle(self.a.0, self.b.0, self.c.0, pos);
        let clockwise = orient(self.a.0, self.b.0, self.c.0) < 0;
        let oriented = if clockwise { -determinant } else { determinant };
        match oriented.cmp(&0) {
            Ordering::Greater => CircleSide::Inside,
            Ordering::Equal => CircleSide::On,
            Ordering::Less => CircleSide::Outside,
        }
    }

    /// Closed-disk containment: points on the circle count.
    pub fn circumcircle_contains(&self, pos: Pos) -> bool {
        self.circumcircle_side(pos) != CircleSide::Outside
    }

    fn key(&self) -> [Vertex; 3] {
        let mut key = self.vertices();
        key.sort();
        key
    }
}

impl PartialEq for Triangle {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Triangle {}

impl Hash for Triangle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

#[derive(Clone, Debug, Default)]
pub struct Triangulation {
    pub triangles: Vec<Triangle>,
    /// Unique edges in discovery order.
    pub edges: Vec<Edge>,
}

/// Edge set of the Delaunay triangulation of `points`; empty for degenerate input.
pub fn delaunay_edges(points: &[Pos]) -> Vec<Edge> {
    triangulate(points).edges
}

/// Triangulates `points` (duplicates ignored, first occurrence kept).
///
/// Fewer than three distinct points, or all points on one line, produce an empty result.
pub fn triangulate(points: &[Pos]) -> Triangulation {
    let vertices = distinct_vertices(points);
    if vertices.len() < 3 || all_collinear(&vertices) {
        debug!(points = vertices.len(), "degenerate triangulation input");
        return Triangulation::default();
    }

    let Some(super_vertices) = super_triangle(&vertices) else {
        warn!("triangulation input too large for the super-triangle");
        return Triangulation::default();
    };
    let [s1, s2, s3] = super_vertices;
    let mut triangles: Vec<Triangle> = Triangle::new(s1, s2, s3).into_iter().collect();

    for &vertex in &vertices {
        let mut polygon = Vec::new();
        triangles.retain(|triangle| {
            if triangle.circumcircle_contains(vertex.0) {
                polygon.extend(triangle.edges());
                false
            } else {
                true
            }
        });

        let mut occurrences: HashMap<Edge, usize> = HashMap::with_capacity(polygon.len());
        for edge in &polygon {
            *occurrences.entry(*edge).or_default() += 1;
        }
        for edge in polygon.iter().filter(|edge| occurrences[*edge] == 1) {
            match Triangle::new(edge.u, edge.v, vertex) {
                Some(triangle) => triangles.push(triangle),
                None => debug!(?edge, ?vertex, "skipped collinear fan triangle"),
            }
        }
    }

    triangles.retain(|triangle| !super_vertices.iter().any(|&s| triangle.has_vertex(s)));

    let mut seen = HashSet::new();
    let mut edges = Vec::new();
    for triangle in &triangles {
        for edge in triangle.edges() {
            if seen.insert(edge) {
                edges.push(edge);
            }
        }
    }

    debug!(
        vertices = vertices.len(),
        triangles = triangles.len(),
        edges = edges.len(),
        "triangulated"
    );
    Triangulation { triangles, edges }
}

fn distinct_vertices(points: &[Pos]) -> Vec<Vertex> {
    let mut seen = HashSet::with_capacity(points.len());
    points.iter().copied().filter(|pos| seen.insert(*pos)).map(Vertex).collect()
}

fn all_collinear(vertices: &[Vertex]) -> bool {
    let (first, second) = (vertices[0].0, vertices[1].0);
    vertices[2..].iter().all(|vertex| orient(first, second, vertex.0) == 0)
}

/// Integer super-triangle enclosing every vertex, `delta_max = 2 * max(width, height)`.
fn super_triangle(vertices: &[Vertex]) -> Option<[Vertex; 3]> {
    let min_x = vertices.iter().map(|v| i64::from(v.0.x)).min()?;
    let max_x = vertices.iter().map(|v| i64::from(v.0.x)).max()?;
    let min_y = vertices.iter().map(|v| i64::from(v.0.y)).min()?;
    let max_y = vertices.iter().map(|v| i64::from(v.0.y)).max()?;

    let delta_max = (2 * (max_x - min_x).max(max_y - min_y)).max(1);
    let mid_x = (min_x + max_x).div_euclid(2);
    let mid_y = (min_y + max_y).div_euclid(2);
    let reach = SUPER_TRIANGLE_REACH * delta_max;

    let vertex = |x: i64, y: i64| -> Option<Vertex> {
        Some(Vertex(Pos { y: i32::try_from(y).ok()?, x: i32::try_from(x).ok()? }))
    };
    Some([
        vertex(mid_x - reach, mid_y - delta_max)?,
        vertex(mid_x, mid_y + reach)?,
        vertex(mid_x + reach, mid_y - delta_max)?,
    ])
}

/// Twice the signed area of `abc`; positive when counter-clockwise in a y-up frame.
fn orient(a: Pos, b: Pos, c: Pos) -> i128 {
    let (ax, ay) = (i128::from(a.x), i128::from(a.y));
    let (bx, by) = (i128::from(b.x) - ax, i128::from(b.y) - ay);
    let (cx, cy) = (i128::from(c.x) - ax, i128::from(c.y) - ay);
    bx * cy - by * cx
}

/// Positive when `d` is inside the circumcircle of counter-clockwise `abc`.
fn incircle(a: Pos, b: Pos, c: Pos, d: Pos) -> i128 {
    let (dx, dy) = (i128::from(d.x), i128::from(d.y));
    let (adx, ady) = (i128::from(a.x) - dx, i128::from(a.y) - dy);
    let (bdx, bdy) = (i128::from(b.x) - dx, i128::from(b.y) - dy);
    let (cdx, cdy) = (i128::from(c.x) - dx, i128::from(c.y) - dy);
    (adx * adx + ady * ady) * (bdx * cdy - cdx * bdy)
        + (bdx * bdx + bdy * bdy) * (cdx * ady - adx * cdy)
        + (cdx * cdx + cdy * cdy) * (adx * bdy - bdx * ady)
}
