//! Paths along the track network
//!
//! A [`SegmentPath`] follows the track from one arbitrary point to another, possibly
//! crossing several track nodes. Each node crossed contributes one [`PathSection`]
//! whose segments are whole, or trimmed where the path starts or ends mid-segment.
//! Segments are stored in travel order, reversed where the path runs against the
//! stored orientation of a node, so that the whole path forms one continuous line.

use crate::info::{InfoMap, InformationProvider};
use crate::records::{TrackItem, TrackItemKind};
use crate::segment::{SegmentKind, TrackSegment, segment_at};
use crate::tile::{Tile, TileCoordinate};
use crate::utils;
use geo::Point;
use smallvec::SmallVec;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::f64::consts::PI;

/// Segments of every track node, in node order
pub type NodeSegments = HashMap<usize, Vec<TrackSegment>>;

/// Squared distance (m²) under which two node ends are considered connected
pub const CONNECT_TOLERANCE: f64 = 1.0;

/// Largest heading change (radians) accepted when passing from one node into the next
const MAX_HEADING_CHANGE: f64 = 0.35;

/// Upper bound on the number of nodes a single path may cross
const MAX_PATH_NODES: usize = 64;

/// Pieces shorter than this (meters) are dropped from a path
const MIN_PIECE_LENGTH: f64 = 1e-6;

/// A contiguous run of segments within one track node
#[derive(Clone, Debug, PartialEq)]
pub struct PathSection {
    pub node_index: usize,
    pub segments: Vec<TrackSegment>,
}

impl PathSection {
    pub fn length(&self) -> f64 {
        self.segments.iter().map(TrackSegment::length).sum()
    }
}

/// An ordered, continuous sequence of (possibly partial) segments between two points
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentPath {
    sections: Vec<PathSection>,
    /// Requested start point, also used to anchor empty paths to a tile
    requested_start: Point<f64>,
}

impl SegmentPath {
    fn empty(requested_start: Point<f64>) -> Self {
        Self {
            sections: Vec::new(),
            requested_start,
        }
    }

    pub fn sections(&self) -> &[PathSection] {
        &self.sections
    }

    /// All segments of the path in travel order
    pub fn segments(&self) -> impl Iterator<Item = &TrackSegment> + '_ {
        self.sections.iter().flat_map(|section| section.segments.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn length(&self) -> f64 {
        self.sections.iter().map(PathSection::length).sum()
    }

    /// First point of the path, the requested start when the path is empty
    pub fn start(&self) -> Point<f64> {
        self.segments()
            .next()
            .map(TrackSegment::start)
            .unwrap_or(self.requested_start)
    }

    pub fn end(&self) -> Point<f64> {
        self.segments()
            .last()
            .map(TrackSegment::end)
            .unwrap_or(self.requested_start)
    }

    /// Point halfway along the path
    pub fn mid_point(&self) -> Point<f64> {
        let mut remaining = self.length() / 2.0;
        for segment in self.segments() {
            if remaining <= segment.length() {
                return segment.point_at(remaining);
            }
            remaining -= segment.length();
        }
        self.end()
    }
}

impl TileCoordinate for SegmentPath {
    fn tile(&self) -> Tile {
        Tile::from_world(self.start())
    }
}

/// Which end of a track node
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum NodeEnd {
    Start,
    End,
}

impl NodeEnd {
    fn opposite(self) -> Self {
        match self {
            NodeEnd::Start => NodeEnd::End,
            NodeEnd::End => NodeEnd::Start,
        }
    }
}

/// A position along a node: segment index plus distance into that segment
#[derive(Clone, Copy, Debug, PartialEq)]
struct NodePosition {
    segment: usize,
    along: f64,
}

impl NodePosition {
    fn precedes(&self, other: &NodePosition) -> bool {
        (self.segment, self.along) <= (other.segment, other.along)
    }
}

/// Geometry of a node's two ends
#[derive(Clone, Copy, Debug)]
struct NodeTerminals {
    start: Point<f64>,
    end: Point<f64>,
    /// Travel heading when entering at the start (and following the node forward)
    start_heading: f64,
    /// Travel heading when leaving at the end (following the node forward)
    end_heading: f64,
}

impl NodeTerminals {
    fn point(&self, end: NodeEnd) -> Point<f64> {
        match end {
            NodeEnd::Start => self.start,
            NodeEnd::End => self.end,
        }
    }

    /// Heading of travel when leaving the node through `end`
    fn exit_heading(&self, end: NodeEnd) -> f64 {
        match end {
            NodeEnd::Start => utils::wrap_angle(self.start_heading + PI),
            NodeEnd::End => self.end_heading,
        }
    }

    /// Heading of travel when entering the node through `end`
    fn entry_heading(&self, end: NodeEnd) -> f64 {
        match end {
            NodeEnd::Start => self.start_heading,
            NodeEnd::End => utils::wrap_angle(self.end_heading + PI),
        }
    }
}

type CellKey = (i64, i64);

fn cell_of(point: Point<f64>) -> CellKey {
    (point.x().floor() as i64, point.y().floor() as i64)
}

/// Builds [`SegmentPath`]s over a fixed set of per-node segments
///
/// Node connectivity is derived from geometry: two nodes connect where their end
/// points coincide and the track continues smoothly from one into the other.
#[derive(Debug)]
pub struct PathBuilder<'a> {
    node_segments: &'a NodeSegments,
    terminals: HashMap<usize, NodeTerminals>,
    /// Node ends bucketed by 1 m grid cell
    cells: HashMap<CellKey, SmallVec<[(usize, NodeEnd); 4]>>,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl<'a> PathBuilder<'a> {
    pub fn new(node_segments: &'a NodeSegments) -> Self {
        let mut terminals = HashMap::with_capacity(node_segments.len());
        let mut cells: HashMap<CellKey, SmallVec<[(usize, NodeEnd); 4]>> = HashMap::new();

        for (&node, segments) in node_segments {
            let Some(first) = segments.iter().find(|s| !s.is_degenerate()) else {
                continue;
            };
            let Some(last) = segments.iter().rev().find(|s| !s.is_degenerate()) else {
                continue;
            };
            let node_terminals = NodeTerminals {
                start: first.start(),
                end: last.end(),
                start_heading: first.heading(),
                end_heading: last.end_heading(),
            };
            cells
                .entry(cell_of(node_terminals.start))
                .or_default()
                .push((node, NodeEnd::Start));
            cells
                .entry(cell_of(node_terminals.end))
                .or_default()
                .push((node, NodeEnd::End));
            terminals.insert(node, node_terminals);
        }

        Self {
            node_segments,
            terminals,
            cells,
        }
    }

    /// Nodes that can be entered when leaving `node` through `exit`, sorted for determinism
    fn successors(&self, node: usize, exit: NodeEnd) -> Vec<(usize, NodeEnd)> {
        let Some(from) = self.terminals.get(&node) else {
            return Vec::new();
        };
        let point = from.point(exit);
        let exit_heading = from.exit_heading(exit);
        let (cx, cz) = cell_of(point);

        let mut result = Vec::new();
        for dx in -1..=1 {
            for dz in -1..=1 {
                let Some(bucket) = self.cells.get(&(cx + dx, cz + dz)) else {
                    continue;
                };
                for &(other, other_end) in bucket {
                    if other == node {
                        continue;
                    }
                    let Some(to) = self.terminals.get(&other) else {
                        continue;
                    };
                    if utils::distance_squared(point, to.point(other_end)) > CONNECT_TOLERANCE {
                        continue;
                    }
                    let turn = utils::wrap_angle(to.entry_heading(other_end) - exit_heading);
                    if turn.abs() <= MAX_HEADING_CHANGE {
                        result.push((other, other_end));
                    }
                }
            }
        }
        result.sort_by_key(|&(other, end)| (other, end == NodeEnd::End));
        result.dedup();
        result
    }

    /// On-track position of `point` within a node
    fn locate(&self, point: Point<f64>, node: usize) -> Option<NodePosition> {
        let segments = self.node_segments.get(&node)?;
        let found = segment_at(point, segments)?;
        let segment = segments.iter().position(|s| std::ptr::eq(s, found))?;
        Some(NodePosition {
            segment,
            along: found.distance_along(point),
        })
    }

    fn node_end_position(segments: &[TrackSegment]) -> NodePosition {
        let segment = segments.len().saturating_sub(1);
        NodePosition {
            segment,
            along: segments.get(segment).map_or(0.0, TrackSegment::length),
        }
    }

    fn usable(piece: &TrackSegment) -> bool {
        !piece.is_degenerate() && piece.length() > MIN_PIECE_LENGTH
    }

    /// Pieces of a node between two positions, following the node's own orientation
    ///
    /// Inner segments are taken whole; the segments holding `from` and `to` are trimmed.
    fn extract(segments: &[TrackSegment], from: NodePosition, to: NodePosition) -> Vec<TrackSegment> {
        let mut pieces = Vec::new();
        for (i, segment) in segments
            .iter()
            .enumerate()
            .take(to.segment + 1)
            .skip(from.segment)
        {
            let piece = match (i == from.segment, i == to.segment) {
                (true, true) => segment.trim(to.along - from.along, from.along, false),
                (true, false) => segment.trim(segment.length() - from.along, from.along, false),
                (false, true) => segment.trim(to.along, to.along, true),
                (false, false) => segment.clone(),
            };
            if Self::usable(&piece) {
                pieces.push(piece);
            }
        }
        pieces
    }

    fn travel_order(pieces: Vec<TrackSegment>, backwards: bool) -> Vec<TrackSegment> {
        if backwards {
            pieces.iter().rev().map(TrackSegment::reversed).collect()
        } else {
            pieces
        }
    }

    /// Pieces between two positions in travel order, reversed when `backwards`
    fn extract_travel(
        segments: &[TrackSegment],
        from: NodePosition,
        to: NodePosition,
        backwards: bool,
    ) -> Vec<TrackSegment> {
        Self::travel_order(Self::extract(segments, from, to), backwards)
    }

    /// Breadth-first search for the fewest-node chain from `start_node` to `end_node`
    ///
    /// Returns, for every node on the chain, the end it is entered through (`None` for
    /// the start node) and the end it is left through (`None` for the end node).
    fn find_chain(
        &self,
        start_node: usize,
        end_node: usize,
    ) -> Option<Vec<(usize, Option<NodeEnd>, Option<NodeEnd>)>> {
        type State = (usize, NodeEnd);
        // entered state -> (previous state, or the start node's exit end)
        let mut parents: HashMap<State, Result<State, NodeEnd>> = HashMap::new();
        let mut visited: HashSet<State> = HashSet::new();
        let mut queue: VecDeque<(State, usize)> = VecDeque::new();

        for start_exit in [NodeEnd::End, NodeEnd::Start] {
            for next in self.successors(start_node, start_exit) {
                if visited.insert(next) {
                    parents.insert(next, Err(start_exit));
                    queue.push_back((next, 2));
                }
            }
        }

        while let Some((state, depth)) = queue.pop_front() {
            let (node, entry) = state;
            if node == end_node {
                return Some(Self::unwind(start_node, state, &parents));
            }
            if depth >= MAX_PATH_NODES {
                continue;
            }
            for next in self.successors(node, entry.opposite()) {
                if next.0 == start_node || !visited.insert(next) {
                    continue;
                }
                parents.insert(next, Ok(state));
                queue.push_back((next, depth + 1));
            }
        }
        None
    }

    fn unwind(
        start_node: usize,
        last: (usize, NodeEnd),
        parents: &HashMap<(usize, NodeEnd), Result<(usize, NodeEnd), NodeEnd>>,
    ) -> Vec<(usize, Option<NodeEnd>, Option<NodeEnd>)> {
        let mut chain = vec![(last.0, Some(last.1), None)];
        let mut current = last;
        loop {
            match parents.get(&current) {
                Some(Ok(previous)) => {
                    chain.push((previous.0, Some(previous.1), Some(previous.1.opposite())));
                    current = *previous;
                }
                Some(Err(start_exit)) => {
                    chain.push((start_node, None, Some(*start_exit)));
                    break;
                }
                None => break,
            }
        }
        chain.reverse();
        chain
    }

    /// Build the path from `start` (on `start_node`) to `end` (on `end_node`)
    ///
    /// Unresolvable requests (unknown node, point not on its node, no connection between
    /// the nodes) are logged and produce an empty path.
    pub fn build(
        &self,
        start: Point<f64>,
        start_node: usize,
        end: Point<f64>,
        end_node: usize,
        kind: SegmentKind,
    ) -> SegmentPath {
        let (Some(start_segments), Some(end_segments)) = (
            self.node_segments.get(&start_node),
            self.node_segments.get(&end_node),
        ) else {
            tracing::warn!(
                "Path from node {} to node {} references a node without track segments",
                start_node,
                end_node
            );
            return SegmentPath::empty(start);
        };

        let (Some(from), Some(to)) = (self.locate(start, start_node), self.locate(end, end_node))
        else {
            tracing::warn!(
                "Path end points ({:.1}, {:.1}) / ({:.1}, {:.1}) are not on track nodes {} / {}",
                start.x(),
                start.y(),
                end.x(),
                end.y(),
                start_node,
                end_node
            );
            return SegmentPath::empty(start);
        };

        let mut sections = Vec::new();
        if start_node == end_node && from.segment == to.segment {
            let piece = start_segments[from.segment].clip(start, end);
            let pieces = if Self::usable(&piece) { vec![piece] } else { Vec::new() };
            sections.push(PathSection {
                node_index: start_node,
                segments: Self::travel_order(pieces, !from.precedes(&to)),
            });
        } else if start_node == end_node {
            let segments = if from.precedes(&to) {
                Self::extract_travel(start_segments, from, to, false)
            } else {
                Self::extract_travel(start_segments, to, from, true)
            };
            sections.push(PathSection {
                node_index: start_node,
                segments,
            });
        } else {
            let Some(chain) = self.find_chain(start_node, end_node) else {
                tracing::warn!(
                    "No track connection found from node {} to node {}",
                    start_node,
                    end_node
                );
                return SegmentPath::empty(start);
            };
            let origin = NodePosition {
                segment: 0,
                along: 0.0,
            };

            for (node, entry, exit) in chain {
                let Some(segments) = self.node_segments.get(&node) else {
                    continue;
                };
                let node_end = Self::node_end_position(segments);
                let pieces = match (entry, exit) {
                    (None, Some(NodeEnd::End)) => Self::extract_travel(segments, from, node_end, false),
                    (None, Some(NodeEnd::Start)) => Self::extract_travel(segments, origin, from, true),
                    (Some(NodeEnd::Start), None) => Self::extract_travel(end_segments, origin, to, false),
                    (Some(NodeEnd::End), None) => Self::extract_travel(end_segments, to, node_end, true),
                    (Some(entry), _) => {
                        Self::extract_travel(segments, origin, node_end, entry == NodeEnd::End)
                    }
                    (None, None) => Vec::new(),
                };
                sections.push(PathSection {
                    node_index: node,
                    segments: pieces,
                });
            }
        }

        for section in &mut sections {
            for segment in &mut section.segments {
                *segment = segment.clone().with_kind(kind);
            }
        }
        sections.retain(|section| !section.segments.is_empty());

        SegmentPath {
            sections,
            requested_start: start,
        }
    }
}

/// A platform: a named path between two linked platform items
#[derive(Clone, Debug, PartialEq)]
pub struct PlatformPath {
    pub platform_name: String,
    pub station_name: String,
    pub start_item: u32,
    pub end_item: u32,
    pub path: SegmentPath,
}

impl PlatformPath {
    /// Pair platform items through their links and build one path per pair
    ///
    /// Items whose partner is missing are reported and skipped; inconsistent
    /// back-links are reported but the pair is still built.
    pub fn create_platforms<'i, I>(platform_items: I, builder: &PathBuilder<'_>) -> Vec<PlatformPath>
    where
        I: IntoIterator<Item = &'i TrackItem>,
    {
        let mut pending: BTreeMap<u32, &TrackItem> = platform_items
            .into_iter()
            .filter(|item| matches!(item.kind, TrackItemKind::Platform { .. }))
            .map(|item| (item.id, item))
            .collect();

        let mut platforms = Vec::new();
        while let Some((_, start)) = pending.pop_first() {
            let TrackItemKind::Platform { linked_id, .. } = start.kind else {
                continue;
            };
            let Some(end) = pending.remove(&linked_id) else {
                tracing::warn!(
                    "Linked platform item {} for platform item {} not found",
                    linked_id,
                    start.id
                );
                continue;
            };
            if let TrackItemKind::Platform { linked_id: back, .. } = end.kind {
                if back != start.id {
                    tracing::warn!(
                        "Platform item pair has inconsistent linking from source {} to target {} vs target {} to source {}",
                        start.id,
                        linked_id,
                        end.id,
                        back
                    );
                }
            }
            platforms.push(Self::new(start, end, builder));
        }
        platforms
    }

    fn new(start: &TrackItem, end: &TrackItem, builder: &PathBuilder<'_>) -> Self {
        let names = |item: &TrackItem| match &item.kind {
            TrackItemKind::Platform {
                platform_name,
                station_name,
                ..
            } => (platform_name.clone(), station_name.clone()),
            _ => (String::new(), String::new()),
        };
        let (start_platform, start_station) = names(start);
        let (end_platform, end_station) = names(end);

        let mut platform_name = if start_platform.is_empty() {
            end_platform
        } else {
            start_platform
        };
        let station_name = if start_station.is_empty() {
            end_station
        } else {
            start_station
        };
        if !station_name.is_empty()
            && platform_name
                .get(..station_name.len())
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case(&station_name))
        {
            platform_name = platform_name[station_name.len()..].trim_start().to_string();
        }

        let path = builder.build(
            start.location.to_point(),
            start.node_index,
            end.location.to_point(),
            end.node_index,
            SegmentKind::Platform,
        );
        if path.is_empty() {
            tracing::warn!(
                "Platform {} ({} - {}) could not be traced along the track",
                platform_name,
                start.id,
                end.id
            );
        }

        Self {
            platform_name,
            station_name,
            start_item: start.id,
            end_item: end.id,
            path,
        }
    }
}

impl TileCoordinate for PlatformPath {
    fn tile(&self) -> Tile {
        self.path.tile()
    }
}

impl InformationProvider for PlatformPath {
    fn info(&self) -> InfoMap {
        let mut info = InfoMap::new();
        info.insert("Platform".to_string(), self.platform_name.clone());
        info.insert("Station".to_string(), self.station_name.clone());
        info.insert("Length".to_string(), format!("{:.1} m", self.path.length()));
        info
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::WorldLocation;
    use std::f64::consts::FRAC_PI_2;

    const EPS: f64 = 1e-6;

    fn straight(x0: f64, y0: f64, x1: f64, y1: f64, node: usize, section: usize) -> TrackSegment {
        TrackSegment::from_points(Point::new(x0, y0), Point::new(x1, y1), SegmentKind::Rail)
            .unwrap()
            .with_indices(node, section)
    }

    /// Node 1 runs north from (0,0) to (0,200) in two pieces, node 2 continues north
    /// to (0,300), node 3 runs from (0,300) curving east, node 4 is a dead-end spur
    /// reversing out of (0,200).
    fn network() -> NodeSegments {
        let mut nodes = NodeSegments::new();
        nodes.insert(
            1,
            vec![
                straight(0.0, 0.0, 0.0, 100.0, 1, 0),
                straight(0.0, 100.0, 0.0, 200.0, 1, 1),
            ],
        );
        nodes.insert(2, vec![straight(0.0, 200.0, 0.0, 300.0, 2, 0)]);
        nodes.insert(
            3,
            vec![
                TrackSegment::curved(Point::new(0.0, 300.0), 0.0, 100.0, FRAC_PI_2, SegmentKind::Rail)
                    .unwrap()
                    .with_indices(3, 0),
            ],
        );
        // Stored against travel direction: runs from (0,400) back south to (0,300)
        nodes.insert(4, vec![straight(0.0, 400.0, 0.0, 300.0, 4, 0)]);
        nodes
    }

    fn assert_continuous(path: &SegmentPath) {
        let segments: Vec<&TrackSegment> = path.segments().collect();
        for pair in segments.windows(2) {
            assert!(
                utils::distance_squared(pair[0].end(), pair[1].start()) < 1e-6,
                "gap between segments"
            );
        }
    }

    #[test]
    fn test_same_node_path() {
        let nodes = network();
        let builder = PathBuilder::new(&nodes);
        let path = builder.build(
            Point::new(0.0, 30.0),
            1,
            Point::new(0.5, 170.0),
            1,
            SegmentKind::Platform,
        );
        assert_eq!(path.sections().len(), 1);
        assert_eq!(path.sections()[0].segments.len(), 2);
        assert!((path.length() - 140.0).abs() < EPS);
        assert_continuous(&path);
        assert!(path.segments().all(|s| s.kind() == SegmentKind::Platform));
    }

    #[test]
    fn test_same_node_path_backwards() {
        let nodes = network();
        let builder = PathBuilder::new(&nodes);
        let path = builder.build(Point::new(0.0, 170.0), 1, Point::new(0.0, 30.0), 1, SegmentKind::Rail);
        assert!((path.length() - 140.0).abs() < EPS);
        assert!(utils::distance(path.start(), Point::new(0.0, 170.0)) < EPS);
        assert!(utils::distance(path.end(), Point::new(0.0, 30.0)) < EPS);
        assert_continuous(&path);
    }

    #[test]
    fn test_path_within_one_segment() {
        let nodes = network();
        let builder = PathBuilder::new(&nodes);
        let forward = builder.build(Point::new(0.3, 130.0), 1, Point::new(0.0, 180.0), 1, SegmentKind::Rail);
        let backward = builder.build(Point::new(0.0, 180.0), 1, Point::new(0.3, 130.0), 1, SegmentKind::Rail);
        for (path, start, end) in [(&forward, 130.0, 180.0), (&backward, 180.0, 130.0)] {
            assert_eq!(path.sections().len(), 1);
            assert_eq!(path.sections()[0].segments.len(), 1);
            assert!((path.length() - 50.0).abs() < EPS);
            assert!(utils::distance(path.start(), Point::new(0.0, start)) < EPS);
            assert!(utils::distance(path.end(), Point::new(0.0, end)) < EPS);
        }
    }

    #[test]
    fn test_path_ends_trimmed_at_requested_points() {
        let nodes = network();
        let builder = PathBuilder::new(&nodes);
        let path = builder.build(Point::new(0.0, 40.0), 1, Point::new(0.0, 230.0), 2, SegmentKind::Rail);
        let segments: Vec<&TrackSegment> = path.segments().collect();
        assert_eq!(segments.len(), 3);
        assert!(utils::distance(segments[0].start(), Point::new(0.0, 40.0)) < EPS);
        assert!((segments[0].length() - 60.0).abs() < EPS);
        assert_eq!(segments[1], &nodes[&1][1]);
        assert!(utils::distance(segments[2].end(), Point::new(0.0, 230.0)) < EPS);
        assert!((segments[2].length() - 30.0).abs() < EPS);
        assert_continuous(&path);
    }

    #[test]
    fn test_path_across_nodes() {
        let nodes = network();
        let builder = PathBuilder::new(&nodes);
        let path = builder.build(Point::new(0.0, 150.0), 1, Point::new(0.0, 250.0), 2, SegmentKind::Rail);
        assert_eq!(
            path.sections().iter().map(|s| s.node_index).collect::<Vec<_>>(),
            vec![1, 2]
        );
        assert!((path.length() - 100.0).abs() < EPS);
        assert_continuous(&path);
    }

    #[test]
    fn test_path_with_intermediate_node_and_curve() {
        let nodes = network();
        let builder = PathBuilder::new(&nodes);
        let curve_end = nodes[&3][0].end();
        let mid_curve = nodes[&3][0].mid_point();
        let path = builder.build(Point::new(0.0, 150.0), 1, mid_curve, 3, SegmentKind::Rail);
        assert_eq!(
            path.sections().iter().map(|s| s.node_index).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        let expected = 50.0 + 100.0 + 100.0 * FRAC_PI_2 / 2.0;
        assert!((path.length() - expected).abs() < 1e-4);
        assert!(utils::distance(path.end(), mid_curve) < 1e-4);
        assert!(utils::distance(path.end(), curve_end) > 1.0);
        assert_continuous(&path);
    }

    #[test]
    fn test_path_into_reversed_node() {
        let nodes = network();
        let builder = PathBuilder::new(&nodes);
        let path = builder.build(Point::new(0.0, 250.0), 2, Point::new(0.0, 350.0), 4, SegmentKind::Rail);
        assert_eq!(
            path.sections().iter().map(|s| s.node_index).collect::<Vec<_>>(),
            vec![2, 4]
        );
        assert!((path.length() - 100.0).abs() < EPS);
        assert!(utils::distance(path.end(), Point::new(0.0, 350.0)) < EPS);
        assert_continuous(&path);
    }

    #[test]
    fn test_no_path_between_diverging_branches() {
        let nodes = network();
        let builder = PathBuilder::new(&nodes);
        // Nodes 3 and 4 both leave (0,300) northwards; no train can pass between them
        let path = builder.build(nodes[&3][0].mid_point(), 3, Point::new(0.0, 350.0), 4, SegmentKind::Rail);
        assert!(path.is_empty());
        assert_eq!(path.length(), 0.0);
    }

    #[test]
    fn test_unknown_node_gives_empty_path() {
        let nodes = network();
        let builder = PathBuilder::new(&nodes);
        let path = builder.build(Point::new(0.0, 10.0), 1, Point::new(0.0, 20.0), 99, SegmentKind::Rail);
        assert!(path.is_empty());
        assert_eq!(path.tile(), Tile::new(0, 0));
    }

    #[test]
    fn test_point_off_track_gives_empty_path() {
        let nodes = network();
        let builder = PathBuilder::new(&nodes);
        let path = builder.build(Point::new(50.0, 10.0), 1, Point::new(0.0, 20.0), 1, SegmentKind::Rail);
        assert!(path.is_empty());
    }

    #[test]
    fn test_mid_point() {
        let nodes = network();
        let builder = PathBuilder::new(&nodes);
        let path = builder.build(Point::new(0.0, 0.0), 1, Point::new(0.0, 200.0), 1, SegmentKind::Rail);
        assert!(utils::distance(path.mid_point(), Point::new(0.0, 100.0)) < EPS);
    }

    fn platform_item(id: u32, linked_id: u32, node: usize, z: f64, name: &str) -> TrackItem {
        TrackItem {
            id,
            node_index: node,
            location: WorldLocation::new(0, 0, 0.0, 0.0, z),
            kind: TrackItemKind::Platform {
                linked_id,
                platform_name: name.to_string(),
                station_name: "Central".to_string(),
            },
        }
    }

    #[test]
    fn test_create_platforms() {
        let nodes = network();
        let builder = PathBuilder::new(&nodes);
        let items = vec![
            platform_item(1, 2, 1, 20.0, "Central Platform 1"),
            platform_item(2, 1, 1, 120.0, ""),
            // Partner missing
            platform_item(5, 6, 1, 50.0, "Lonely"),
        ];
        let platforms = PlatformPath::create_platforms(&items, &builder);
        assert_eq!(platforms.len(), 1);
        let platform = &platforms[0];
        assert_eq!(platform.platform_name, "Platform 1");
        assert_eq!(platform.station_name, "Central");
        assert!((platform.path.length() - 100.0).abs() < EPS);
        assert_eq!(platform.tile(), Tile::new(0, 0));
    }

    #[test]
    fn test_create_platforms_inconsistent_link_still_built() {
        let nodes = network();
        let builder = PathBuilder::new(&nodes);
        let items = vec![
            platform_item(1, 2, 1, 20.0, "A"),
            platform_item(2, 7, 2, 250.0, "A"),
        ];
        let platforms = PlatformPath::create_platforms(&items, &builder);
        assert_eq!(platforms.len(), 1);
        assert_eq!(platforms[0].path.sections().len(), 2);
    }
}
