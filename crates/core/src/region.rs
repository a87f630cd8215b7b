//! Flood-fill regions and the passes that stitch them into one accessible cave.

use std::collections::VecDeque;

use slotmap::{SlotMap, new_key_type};
use tracing::{debug, info, warn};

use crate::geometry::{brush, euclidean_squared, line};
use crate::tilemap::TileMap;
use crate::types::{Pos, TileKind};

new_key_type! {
    /// Stable handle to a region stored in a [`RegionGraph`].
    pub struct RegionId;
}

/// How border tiles facing several walls are recorded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BorderMode {
    /// One entry per facing direction, so a corner tile appears twice.
    #[default]
    PerDirection,
    Unique,
}

/// Every maximal 4-connected component of `kind` tiles, in row-major discovery order.
pub fn regions_of_type(map: &TileMap, kind: TileKind) -> Vec<Vec<Pos>> {
    flood_regions(map, |tile| tile == kind)
}

/// Components of walkable tiles, floor and corridor alike.
pub fn open_regions(map: &TileMap) -> Vec<Vec<Pos>> {
    flood_regions(map, TileKind::is_open)
}

fn flood_regions(map: &TileMap, member: impl Fn(TileKind) -> bool) -> Vec<Vec<Pos>> {
    let mut visited = vec![false; map.width() * map.height()];
    let slot = |pos: Pos| (pos.y as usize) * map.width() + (pos.x as usize);
    let mut regions = Vec::new();

    for origin in map.positions() {
        if visited[slot(origin)] || !member(map.tile_at(origin)) {
            continue;
        }
        visited[slot(origin)] = true;
        let mut tiles = Vec::new();
        let mut queue = VecDeque::from([origin]);
        while let Some(current) = queue.pop_front() {
            tiles.push(current);
            for neighbor in current.orthogonal_neighbors() {
                if map.in_bounds(neighbor)
                    && !visited[slot(neighbor)]
                    && member(map.tile_at(neighbor))
                {
                    visited[slot(neighbor)] = true;
                    queue.push_back(neighbor);
                }
            }
        }
        regions.push(tiles);
    }
    regions
}

/// Replaces every `kind` component smaller than `threshold` tiles with `replacement`.
///
/// Returns how many components were removed.
pub fn remove_small_regions(
    map: &mut TileMap,
    kind: TileKind,
    threshold: usize,
    replacement: TileKind,
) -> usize {
    let mut removed = 0;
    for region in regions_of_type(map, kind) {
        if region.len() < threshold {
            for &pos in &region {
                map.set_clipped(pos, replacement);
            }
            removed += 1;
        }
    }
    debug!(?kind, threshold, removed, "removed small regions");
    removed
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Region {
    tiles: Vec<Pos>,
    border: Vec<Pos>,
    connected: Vec<RegionId>,
    pub is_main: bool,
    pub accessible_from_main: bool,
}

impl Region {
    /// Border tiles are members with an in-bounds 4-neighbour of the opposite openness.
    pub fn new(tiles: Vec<Pos>, map: &TileMap, border_mode: BorderMode) -> Self {
        let open = tiles.first().is_some_and(|&pos| map.tile_at(pos).is_open());
        let mut border = Vec::new();
        for &tile in &tiles {
            for neighbor in tile.orthogonal_neighbors() {
                if map.in_bounds(neighbor) && map.tile_at(neighbor).is_open() != open {
                    border.push(tile);
                    if border_mode == BorderMode::Unique {
                        break;
                    }
                }
            }
        }
        Self { tiles, border, connected: Vec::new(), is_main: false, accessible_from_main: false }
    }

    pub fn tiles(&self) -> &[Pos] {
        &self.tiles
    }

    pub fn border(&self) -> &[Pos] {
        &self.border
    }

    pub fn size(&self) -> usize {
        self.tiles.len()
    }

    pub fn connected(&self) -> &[RegionId] {
        &self.connected
    }

    pub fn is_connected(&self, other: RegionId) -> bool {
        self.connected.contains(&other)
    }
}

#[derive(Clone, Debug, Default)]
pub struct RegionGraph {
    regions: SlotMap<RegionId, Region>,
}

impl RegionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Regions of `kind` on `map`, with the largest (first on ties) marked as main.
    pub fn from_map(map: &TileMap, kind: TileKind, border_mode: BorderMode) -> Self {
        let mut graph = Self::new();
        let mut largest: Option<(RegionId, usize)> = None;
        for tiles in regions_of_type(map, kind) {
            let id = graph.insert(Region::new(tiles, map, border_mode));
            let size = graph.regions[id].size();
            if largest.is_none_or(|(_, best)| size > best) {
                largest = Some((id, size));
            }
        }
        if let Some((main, size)) = largest {
            graph.set_main(main);
            debug!(regions = graph.len(), main_size = size, "region graph built");
        }
        graph
    }

    pub fn insert(&mut self, region: Region) -> RegionId {
        self.regions.insert(region)
    }

    pub fn get(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(id)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Region ids in insertion order.
    pub fn ids(&self) -> Vec<RegionId> {
        self.regions.keys().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (RegionId, &Region)> {
        self.regions.iter()
    }

    pub fn main(&self) -> Option<RegionId> {
        self.regions.iter().find(|(_, region)| region.is_main).map(|(id, _)| id)
    }

    pub fn all_accessible(&self) -> bool {
        self.regions.values().all(|region| region.accessible_from_main)
    }

    /// Marks `id` as the main region; everything already linked to it becomes accessible.
    pub fn set_main(&mut self, id: RegionId) -> bool {
        let Some(region) = self.regions.get_mut(id) else {
            return false;
        };
        region.is_main = true;
        region.accessible_from_main = true;
        self.spread_access(vec![id]);
        true
    }

    /// Links `a` and `b` both ways and spreads main-region access across the link.
    pub fn connect(&mut self, a: RegionId, b: RegionId) -> bool {
        if a == b || !self.regions.contains_key(a) || !self.regions.contains_key(b) {
            return false;
        }
        for (from, to) in [(a, b), (b, a)] {
            let region = &mut self.regions[from];
            if !region.connected.contains(&to) {
                region.connected.push(to);
            }
        }
        if self.regions[a].accessible_from_main || self.regions[b].accessible_from_main {
            self.regions[a].accessible_from_main = true;
            self.regions[b].accessible_from_main = true;
            self.spread_access(vec![a, b]);
        }
        true
    }

    fn spread_access(&mut self, mut worklist: Vec<RegionId>) {
        while let Some(current) = worklist.pop() {
            let links = self.regions[current].connected.clone();
            for next in links {
                let region = &mut self.regions[next];
                if !region.accessible_from_main {
                    region.accessible_from_main = true;
                    worklist.push(next);
                }
            }
        }
    }
}

/// A straight passage carved between two region border tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Passage {
    pub from: RegionId,
    pub to: RegionId,
    pub start: Pos,
    pub end: Pos,
}

/// Carves passages until every region is reachable from the main region.
///
/// The first pass links each region that has no links yet to its closest neighbour (closest
/// border-tile pair). Forced passes then repeatedly join the globally closest pair of an
/// inaccessible and an accessible region; at most `max_rounds` of them run. Passages are
/// Bresenham lines stamped with a circular brush (radius at least 1, so they stay
/// 4-connected) as `Corridor`, never touching the outer ring of the map.
pub fn connect_closest_regions(
    map: &mut TileMap,
    graph: &mut RegionGraph,
    brush_radius: i32,
    max_rounds: usize,
) -> Vec<Passage> {
    let brush_radius = brush_radius.max(1);
    let ids = graph.ids();
    let mut passages = Vec::new();

    for &a in &ids {
        if !graph.regions[a].connected.is_empty() {
            continue;
        }
        let best = ids
            .iter()
            .filter(|&&b| b != a && !graph.regions[a].is_connected(b))
            .filter_map(|&b| {
                closest_pair(&graph.regions[a], &graph.regions[b]).map(|pair| (b, pair))
            })
            .min_by(|(_, x), (_, y)| x.0.total_cmp(&y.0));
        if let Some((b, (_, start, end))) = best {
            passages.push(carve_passage(map, graph, a, b, start, end, brush_radius));
        }
    }

    let mut rounds = 0;
    while !graph.all_accessible() {
        if rounds == max_rounds {
            warn!(rounds, "region connection hit its round cap");
            break;
        }
        rounds += 1;

        let mut best: Option<(f64, RegionId, RegionId, Pos, Pos)> = None;
        for &a in ids.iter().filter(|&&id| !graph.regions[id].accessible_from_main) {
            for &b in ids.iter().filter(|&&id| graph.regions[id].accessible_from_main) {
                if let Some((distance, start, end)) =
                    closest_pair(&graph.regions[a], &graph.regions[b])
                    && best.is_none_or(|(current, ..)| distance < current)
                {
                    best = Some((distance, a, b, start, end));
                }
            }
        }
        let Some((_, a, b, start, end)) = best else {
            warn!("no border tiles left to join inaccessible regions");
            break;
        };
        passages.push(carve_passage(map, graph, a, b, start, end, brush_radius));
    }

    info!(regions = ids.len(), passages = passages.len(), forced_rounds = rounds, "regions joined");
    passages
}

fn closest_pair(a: &Region, b: &Region) -> Option<(f64, Pos, Pos)> {
    let mut best: Option<(f64, Pos, Pos)> = None;
    for &from in &a.border {
        for &to in &b.border {
            let distance = euclidean_squared(from, to);
            if best.is_none_or(|(current, ..)| distance < current) {
                best = Some((distance, from, to));
            }
        }
    }
    best
}

fn carve_passage(
    map: &mut TileMap,
    graph: &mut RegionGraph,
    from: RegionId,
    to: RegionId,
    start: Pos,
    end: Pos,
    brush_radius: i32,
) -> Passage {
    graph.connect(from, to);
    for point in line(start, end) {
        for cell in brush(point, brush_radius) {
            if map.in_bounds(cell) && !map.is_edge(cell) && !map.tile_at(cell).is_open() {
                map.set_clipped(cell, TileKind::Corridor);
            }
        }
    }
    debug!(?start, ?end, "carved passage");
    Passage { from, to, start, end }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use proptest::collection;
    use proptest::prelude::*;

    use super::*;

    fn carve_rect(map: &mut TileMap, x0: i32, y0: i32, x1: i32, y1: i32) {
        for y in y0..y1 {
            for x in x0..x1 {
                map.set(Pos::new(x, y), TileKind::Floor).expect("in bounds");
            }
        }
    }

    fn three_rooms() -> TileMap {
        let mut map = TileMap::new(30, 12);
        carve_rect(&mut map, 1, 1, 8, 11);
        carve_rect(&mut map, 12, 2, 16, 6);
        carve_rect(&mut map, 22, 4, 29, 10);
        map
    }

    #[test]
    fn walled_three_by_three_floor_is_one_region() {
        let mut map = TileMap::new(5, 5);
        carve_rect(&mut map, 1, 1, 4, 4);
        let floors = regions_of_type(&map, TileKind::Floor);
        assert_eq!(floors.len(), 1);
        assert_eq!(floors[0].len(), 9);

        let walls = regions_of_type(&map, TileKind::Wall);
        assert_eq!(walls.len(), 1);
        assert_eq!(walls[0].len(), 16);
    }

    #[test]
    fn border_mode_controls_corner_duplicates() {
        let mut map = TileMap::new(5, 5);
        carve_rect(&mut map, 1, 1, 4, 4);
        let tiles = regions_of_type(&map, TileKind::Floor).remove(0);

        let per_direction = Region::new(tiles.clone(), &map, BorderMode::PerDirection);
        assert_eq!(per_direction.border().len(), 12);
        let unique = Region::new(tiles, &map, BorderMode::Unique);
        assert_eq!(unique.border().len(), 8);
        assert!(!unique.border().contains(&Pos::new(2, 2)));
    }

    #[test]
    fn wall_region_border_faces_open_tiles() {
        let mut map = TileMap::new(5, 5);
        carve_rect(&mut map, 1, 1, 4, 4);
        let walls = regions_of_type(&map, TileKind::Wall).remove(0);
        let region = Region::new(walls, &map, BorderMode::Unique);
        assert_eq!(region.border().len(), 12);
        assert!(region.border().iter().all(|pos| map.tile_at(*pos) == TileKind::Wall));
    }

    #[test]
    fn access_spreads_through_existing_links() {
        let map = three_rooms();
        let mut graph = RegionGraph::from_map(&map, TileKind::Floor, BorderMode::default());
        let ids = graph.ids();
        assert_eq!(ids.len(), 3);
        assert_eq!(graph.main(), Some(ids[0]), "the 7x10 room is largest");

        assert!(graph.connect(ids[1], ids[2]));
        assert!(!graph.get(ids[2]).is_some_and(|region| region.accessible_from_main));
        assert!(graph.connect(ids[0], ids[1]));
        assert!(graph.all_accessible());
        assert!(!graph.connect(ids[0], ids[0]));
    }

    #[test]
    fn closest_regions_are_joined_into_one_open_area() {
        let mut map = three_rooms();
        let mut graph = RegionGraph::from_map(&map, TileKind::Floor, BorderMode::default());
        let passages = connect_closest_regions(&mut map, &mut graph, 1, 16);

        assert!(!passages.is_empty());
        assert!(graph.all_accessible());
        assert_eq!(open_regions(&map).len(), 1);
        for pos in map.positions().filter(|&pos| map.is_edge(pos)) {
            assert_eq!(map.tile_at(pos), TileKind::Wall, "edge opened at {pos:?}");
        }
    }

    #[test]
    fn first_pass_only_links_regions_without_links() {
        let mut map = three_rooms();
        let mut graph = RegionGraph::from_map(&map, TileKind::Floor, BorderMode::default());
        let ids = graph.ids();
        let passages = connect_closest_regions(&mut map.clone(), &mut graph.clone(), 1, 0);
        let pairs: Vec<_> = passages.iter().map(|passage| (passage.from, passage.to)).collect();
        assert_eq!(pairs, vec![(ids[0], ids[1]), (ids[2], ids[1])]);

        // A recorded link without a carved passage: both ends are skipped by the first pass.
        assert!(graph.connect(ids[0], ids[1]));
        let passages = connect_closest_regions(&mut map, &mut graph, 1, 0);
        assert_eq!(passages.len(), 1);
        assert_eq!((passages[0].from, passages[0].to), (ids[2], ids[1]));
        assert!(graph.all_accessible());
        assert_eq!(open_regions(&map).len(), 2, "rooms 0 and 1 stay physically apart");
    }

    #[test]
    fn small_regions_are_filled() {
        let mut map = three_rooms();
        let removed = remove_small_regions(&mut map, TileKind::Floor, 20, TileKind::Wall);
        assert_eq!(removed, 1);
        assert_eq!(regions_of_type(&map, TileKind::Floor).len(), 2);
    }

    proptest! {
        #[test]
        fn flood_fill_is_complete_and_disjoint(cells in collection::vec(any::<bool>(), 144)) {
            let mut map = TileMap::new(12, 12);
            for (index, &open) in cells.iter().enumerate() {
                if open {
                    let pos = Pos::new((index % 12) as i32, (index / 12) as i32);
                    map.set(pos, TileKind::Floor).expect("in bounds");
                }
            }

            let regions = regions_of_type(&map, TileKind::Floor);
            let mut seen = HashSet::new();
            for (label, region) in regions.iter().enumerate() {
                for &pos in region {
                    prop_assert!(seen.insert(pos), "{:?} is in two regions", pos);
                    prop_assert_eq!(map.tile_at(pos), TileKind::Floor);
                    for neighbor in pos.orthogonal_neighbors() {
                        if map.tile_at(neighbor) == TileKind::Floor {
                            prop_assert!(
                                region.contains(&neighbor),
                                "region {} is not maximal at {:?}", label, neighbor
                            );
                        }
                    }
                }
            }
            prop_assert_eq!(seen.len(), map.count_open());
        }
    }
}
