//! TrackContent - Top-level map content built from a route, and nearest-item queries
//!
//! This module turns [`RouteData`] into tile-indexed segments and items, and answers
//! "what is under the pointer" for highlighting and status display. Content is
//! immutable once built; [`ContentHandle`] swaps in a rebuilt instance atomically.

use crate::info::{InfoMap, InformationProvider};
use crate::node_items::{EndSegment, GridTile, JunctionSegment, TrackItemMarker};
use crate::path::{NodeSegments, PathBuilder, PlatformPath};
use crate::records::{RouteData, TrackItemKind, TrackNode, TrackSections};
use crate::segment::{SegmentKind, TrackSegment};
use crate::tile::{Tile, TileCoordinate};
use crate::tile_index::TileIndexedList;
use crate::utils::{self, HALF_TILE_SIZE};
use geo::{Coord, Point, Rect};
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::ops::{BitOr, BitOrAssign};
use std::sync::{Arc, PoisonError, RwLock};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tuning for nearest-item queries
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// Squared distance (m²) under which an item counts as under the pointer.
    /// Default: 100
    pub nearest_distance_squared: f64,
    /// Squared distance (m²) under which a junction or end node takes the status
    /// display regardless of closer track segments. Default: 1
    pub priority_distance_squared: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            nearest_distance_squared: 100.0,
            priority_distance_squared: 1.0,
        }
    }
}

/// Item categories shown on the map
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MapViewItems(u16);

impl MapViewItems {
    pub const NONE: Self = Self(0);
    pub const TRACKS: Self = Self(1 << 0);
    pub const JUNCTION_NODES: Self = Self(1 << 1);
    pub const END_NODES: Self = Self(1 << 2);
    pub const ROADS: Self = Self(1 << 3);
    pub const ROAD_END_NODES: Self = Self(1 << 4);
    pub const PLATFORMS: Self = Self(1 << 5);
    pub const GRID: Self = Self(1 << 6);
    pub const TRACK_ITEMS: Self = Self(1 << 7);
    pub const ALL: Self = Self((1 << 8) - 1);

    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Parse a category name as used on the command line
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name.trim().to_ascii_lowercase().as_str() {
            "tracks" => Self::TRACKS,
            "junctions" => Self::JUNCTION_NODES,
            "ends" => Self::END_NODES,
            "roads" => Self::ROADS,
            "road-ends" => Self::ROAD_END_NODES,
            "platforms" => Self::PLATFORMS,
            "grid" => Self::GRID,
            "items" => Self::TRACK_ITEMS,
            "all" => Self::ALL,
            "none" => Self::NONE,
            _ => return None,
        })
    }
}

impl BitOr for MapViewItems {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for MapViewItems {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// The item currently shown in the status display
#[derive(Clone, Debug, PartialEq)]
pub enum NearestItem {
    TrackSegment(TrackSegment),
    Junction(JunctionSegment),
    TrackEnd(EndSegment),
}

impl InformationProvider for NearestItem {
    fn info(&self) -> InfoMap {
        match self {
            NearestItem::TrackSegment(segment) => segment.info(),
            NearestItem::Junction(junction) => junction.info(),
            NearestItem::TrackEnd(end) => end.info(),
        }
    }
}

/// Status record consumed by the on-screen info display
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NearestStatus {
    /// Squared distance from the pointer to `item`
    pub distance: Option<f64>,
    pub item: Option<NearestItem>,
}

impl NearestStatus {
    fn offer(&mut self, distance: f64, item: NearestItem) {
        self.distance = Some(distance);
        self.item = Some(item);
    }
}

impl InformationProvider for NearestStatus {
    fn info(&self) -> InfoMap {
        self.item.as_ref().map(InformationProvider::info).unwrap_or_default()
    }
}

/// Per-viewer highlight state, updated on every pointer move
#[derive(Clone, Debug, Default)]
pub struct NearestState {
    pub grid_tile: Option<Tile>,
    pub track_item: Option<TrackItemMarker>,
    pub track_segment: Option<TrackSegment>,
    pub junction: Option<JunctionSegment>,
    pub track_end: Option<EndSegment>,
    pub road_segment: Option<TrackSegment>,
    pub status: NearestStatus,
}

/// Counts describing the loaded content
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContentInfo {
    pub route_name: String,
    pub track_nodes: usize,
    pub track_segments: usize,
    pub track_end_segments: usize,
    pub junction_segments: usize,
    pub track_items: usize,
    pub platforms: usize,
    pub road_nodes: usize,
    pub road_segments: usize,
    pub road_end_segments: usize,
    pub tiles: usize,
}

impl InformationProvider for ContentInfo {
    fn info(&self) -> InfoMap {
        let mut info = InfoMap::new();
        info.insert("Route Name".to_string(), self.route_name.clone());
        info.insert("Track Nodes".to_string(), self.track_nodes.to_string());
        info.insert("Track Segments".to_string(), self.track_segments.to_string());
        info.insert(
            "Track End Segments".to_string(),
            self.track_end_segments.to_string(),
        );
        info.insert(
            "Junction Segments".to_string(),
            self.junction_segments.to_string(),
        );
        info.insert("Track Items".to_string(), self.track_items.to_string());
        info.insert("Platforms".to_string(), self.platforms.to_string());
        info.insert("Road Nodes".to_string(), self.road_nodes.to_string());
        info.insert("Road Segments".to_string(), self.road_segments.to_string());
        info.insert(
            "Road End Segments".to_string(),
            self.road_end_segments.to_string(),
        );
        info.insert("Tiles".to_string(), self.tiles.to_string());
        info
    }
}

/// Segments and point items of one node database (tracks or roads)
struct NetworkContent {
    segments: Vec<TrackSegment>,
    node_segments: NodeSegments,
    junctions: Vec<JunctionSegment>,
    ends: Vec<EndSegment>,
}

/// All map content of a route, tile-indexed for drawing and pointer queries
pub struct TrackContent {
    route_name: String,
    config: Config,
    track_segments: TileIndexedList<TrackSegment>,
    junction_segments: TileIndexedList<JunctionSegment>,
    track_end_segments: TileIndexedList<EndSegment>,
    road_segments: TileIndexedList<TrackSegment>,
    road_end_segments: TileIndexedList<EndSegment>,
    track_items: TileIndexedList<TrackItemMarker>,
    platforms: TileIndexedList<PlatformPath>,
    tiles: TileIndexedList<GridTile>,
    track_node_segments: NodeSegments,
    road_node_segments: NodeSegments,
    bounds: Option<Rect<f64>>,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl TrackContent {
    /// Build all indices for a route
    ///
    /// Segments of all vector nodes are constructed in parallel. Data problems in the
    /// route (missing section shapes, broken platform links) are logged and skipped.
    pub fn new(route: &RouteData, config: Config) -> Self {
        #[cfg(feature = "profiling")]
        profiling::scope!("content::new");

        let tracks = Self::build_network(&route.track_nodes, &route.sections, SegmentKind::Rail);
        let roads = Self::build_network(&route.road_nodes, &route.sections, SegmentKind::Road);

        let (platform_items, other_items): (Vec<_>, Vec<_>) = route
            .track_items
            .iter()
            .partition(|item| matches!(item.kind, TrackItemKind::Platform { .. }));
        let platforms = {
            let builder = PathBuilder::new(&tracks.node_segments);
            PlatformPath::create_platforms(platform_items, &builder)
        };
        let track_items: Vec<TrackItemMarker> = other_items
            .into_iter()
            .cloned()
            .map(TrackItemMarker::new)
            .collect();

        let occupied: BTreeSet<Tile> = tracks
            .segments
            .iter()
            .map(TileCoordinate::tile)
            .chain(tracks.ends.iter().map(TileCoordinate::tile))
            .chain(roads.segments.iter().map(TileCoordinate::tile))
            .chain(roads.ends.iter().map(TileCoordinate::tile))
            .collect();
        let bounds = Self::compute_bounds(&occupied, &tracks, &roads);

        tracing::debug!(
            "Built map content for route '{}': {} track segments, {} road segments, {} tiles",
            route.name,
            tracks.segments.len(),
            roads.segments.len(),
            occupied.len()
        );

        Self {
            route_name: route.name.clone(),
            config,
            track_segments: TileIndexedList::new(tracks.segments),
            junction_segments: TileIndexedList::new(tracks.junctions),
            track_end_segments: TileIndexedList::new(tracks.ends),
            road_segments: TileIndexedList::new(roads.segments),
            road_end_segments: TileIndexedList::new(roads.ends),
            track_items: TileIndexedList::new(track_items),
            platforms: TileIndexedList::new(platforms),
            tiles: TileIndexedList::new(occupied.into_iter().map(|tile| GridTile { tile })),
            track_node_segments: tracks.node_segments,
            road_node_segments: roads.node_segments,
            bounds,
        }
    }

    fn build_network(nodes: &[TrackNode], sections: &TrackSections, kind: SegmentKind) -> NetworkContent {
        let node_segments: NodeSegments = nodes
            .par_iter()
            .filter_map(|node| match node {
                TrackNode::Vector { index, sections: vector_sections } => Some((
                    *index,
                    vector_sections
                        .iter()
                        .enumerate()
                        .map(|(i, section)| TrackSegment::new(section, sections, *index, i, kind))
                        .collect::<Vec<_>>(),
                )),
                _ => None,
            })
            .collect();

        let mut node_indices: Vec<usize> = node_segments.keys().copied().collect();
        node_indices.sort_unstable();
        let segments: Vec<TrackSegment> = node_indices
            .iter()
            .flat_map(|index| node_segments[index].iter().cloned())
            .collect();

        let mut junctions = Vec::new();
        let mut ends = Vec::new();
        for node in nodes {
            match node {
                TrackNode::Junction { index, location } => {
                    junctions.push(JunctionSegment::new(location.to_point(), *index));
                }
                TrackNode::End {
                    index,
                    location,
                    connected_node,
                } => {
                    let connected = node_segments
                        .get(connected_node)
                        .map(Vec::as_slice)
                        .unwrap_or(&[]);
                    ends.push(EndSegment::new(location.to_point(), *index, *connected_node, connected));
                }
                TrackNode::Vector { .. } => {}
            }
        }

        NetworkContent {
            segments,
            node_segments,
            junctions,
            ends,
        }
    }

    /// World extent of the content
    ///
    /// With a single occupied tile, the extent of the segments themselves; otherwise the
    /// full extent of all occupied tiles.
    fn compute_bounds(
        occupied: &BTreeSet<Tile>,
        tracks: &NetworkContent,
        roads: &NetworkContent,
    ) -> Option<Rect<f64>> {
        let (min, max) = if occupied.len() <= 1 {
            let points = tracks
                .segments
                .iter()
                .chain(roads.segments.iter())
                .flat_map(|segment| [segment.start(), segment.end()])
                .chain(tracks.ends.iter().map(|end| end.location))
                .chain(roads.ends.iter().map(|end| end.location));
            Self::extent(points)?
        } else {
            let (min, max) = Self::extent(occupied.iter().map(Tile::center))?;
            (
                Coord {
                    x: min.x - HALF_TILE_SIZE,
                    y: min.y - HALF_TILE_SIZE,
                },
                Coord {
                    x: max.x + HALF_TILE_SIZE,
                    y: max.y + HALF_TILE_SIZE,
                },
            )
        };
        Some(Rect::new(min, max))
    }

    fn extent(points: impl Iterator<Item = Point<f64>>) -> Option<(Coord<f64>, Coord<f64>)> {
        points.fold(None, |acc, p| {
            let (min, max) = acc.unwrap_or((p.0, p.0));
            Some((
                Coord {
                    x: min.x.min(p.x()),
                    y: min.y.min(p.y()),
                },
                Coord {
                    x: max.x.max(p.x()),
                    y: max.y.max(p.y()),
                },
            ))
        })
    }

    /// Find what is under the pointer and update the highlight state
    ///
    /// Only the tile nearest to `position` within the view range is scanned. Track
    /// segments claim the status display when within range; junctions and end nodes take
    /// it over when closer, or when practically on top of the pointer.
    pub fn update_nearest(
        &self,
        state: &mut NearestState,
        position: Point<f64>,
        bottom_left: Tile,
        top_right: Tile,
        layers: MapViewItems,
    ) {
        state.status = NearestStatus::default();

        let Some((tile, _)) = self.tiles.find_nearest(position, bottom_left, top_right).next() else {
            *state = NearestState::default();
            return;
        };
        state.grid_tile = Some(tile);

        let threshold = self.config.nearest_distance_squared;
        let priority = self.config.priority_distance_squared;

        state.track_item = Self::closest(self.track_items.get(tile), |item| {
            Some(utils::distance_squared(item.location, position))
        })
        .map(|(item, _)| item.clone());

        state.track_segment = None;
        if layers.contains(MapViewItems::TRACKS) {
            if let Some((segment, distance)) = Self::closest(self.track_segments.get(tile), |segment| {
                segment.distance_squared(position)
            })
            .filter(|&(_, distance)| distance < threshold)
            {
                state.track_segment = Some(segment.clone());
                state
                    .status
                    .offer(distance, NearestItem::TrackSegment(segment.clone()));
            }
        }

        state.junction = None;
        if layers.contains(MapViewItems::JUNCTION_NODES) {
            if let Some((junction, distance)) = Self::closest(self.junction_segments.get(tile), |junction| {
                Some(utils::distance_squared(junction.location, position))
            })
            .filter(|&(_, distance)| distance < threshold)
            {
                state.junction = Some(junction.clone());
                if Self::takes_priority(&state.status, distance, priority) {
                    state.status.offer(distance, NearestItem::Junction(junction.clone()));
                }
            }
        }

        state.track_end = None;
        if layers.contains(MapViewItems::END_NODES) {
            if let Some((end, distance)) = Self::closest(self.track_end_segments.get(tile), |end| {
                Some(utils::distance_squared(end.location, position))
            })
            .filter(|&(_, distance)| distance < threshold)
            {
                state.track_end = Some(end.clone());
                if Self::takes_priority(&state.status, distance, priority) {
                    state.status.offer(distance, NearestItem::TrackEnd(end.clone()));
                }
            }
        }

        state.road_segment = None;
        if layers.contains(MapViewItems::ROADS) {
            state.road_segment = Self::closest(self.road_segments.get(tile), |segment| {
                segment.distance_squared(position)
            })
            .filter(|&(_, distance)| distance < threshold)
            .map(|(segment, _)| segment.clone());
        }
    }

    /// A point item replaces the current status when nearly on the pointer, or closer
    /// than the current candidate. Without a candidate only the first rule applies.
    fn takes_priority(status: &NearestStatus, distance: f64, priority: f64) -> bool {
        distance < priority || status.distance.is_some_and(|current| distance < current)
    }

    /// Item with the smallest distance; items the metric rejects are skipped
    fn closest<T>(items: &[T], metric: impl Fn(&T) -> Option<f64>) -> Option<(&T, f64)> {
        items
            .iter()
            .filter_map(|item| metric(item).map(|distance| (item, distance)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// Build a path between two points of the track network
    pub fn path_builder(&self) -> PathBuilder<'_> {
        PathBuilder::new(&self.track_node_segments)
    }

    /// All segments of the track node a segment belongs to, for highlighting
    pub fn track_node_segments(&self, node_index: usize) -> &[TrackSegment] {
        self.track_node_segments
            .get(&node_index)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn road_node_segments(&self, node_index: usize) -> &[TrackSegment] {
        self.road_node_segments
            .get(&node_index)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn track_segments(&self) -> &TileIndexedList<TrackSegment> {
        &self.track_segments
    }

    pub fn junction_segments(&self) -> &TileIndexedList<JunctionSegment> {
        &self.junction_segments
    }

    pub fn track_end_segments(&self) -> &TileIndexedList<EndSegment> {
        &self.track_end_segments
    }

    pub fn road_segments(&self) -> &TileIndexedList<TrackSegment> {
        &self.road_segments
    }

    pub fn road_end_segments(&self) -> &TileIndexedList<EndSegment> {
        &self.road_end_segments
    }

    pub fn track_items(&self) -> &TileIndexedList<TrackItemMarker> {
        &self.track_items
    }

    pub fn platforms(&self) -> &TileIndexedList<PlatformPath> {
        &self.platforms
    }

    pub fn tiles(&self) -> &TileIndexedList<GridTile> {
        &self.tiles
    }

    /// World extent of the content, `None` when the route has no geometry
    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.bounds
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn get_info(&self) -> ContentInfo {
        ContentInfo {
            route_name: self.route_name.clone(),
            track_nodes: self.track_node_segments.len(),
            track_segments: self.track_segments.item_count(),
            track_end_segments: self.track_end_segments.item_count(),
            junction_segments: self.junction_segments.item_count(),
            track_items: self.track_items.item_count(),
            platforms: self.platforms.item_count(),
            road_nodes: self.road_node_segments.len(),
            road_segments: self.road_segments.item_count(),
            road_end_segments: self.road_end_segments.item_count(),
            tiles: self.tiles.tile_count(),
        }
    }
}

/// Shared, swappable reference to the current map content
///
/// Readers take a cheap `Arc` clone; a rebuild replaces the whole content at once.
pub struct ContentHandle {
    current: RwLock<Arc<TrackContent>>,
}

impl ContentHandle {
    pub fn new(content: TrackContent) -> Self {
        Self {
            current: RwLock::new(Arc::new(content)),
        }
    }

    /// The currently published content
    pub fn load(&self) -> Arc<TrackContent> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Publish new content, returning the previous one
    pub fn replace(&self, content: TrackContent) -> Arc<TrackContent> {
        self.publish(Arc::new(content))
    }

    /// Rebuild from route data and publish the result
    ///
    /// Returns the content this call published, even if another rebuild has replaced it since.
    pub fn rebuild(&self, route: &RouteData, config: Config) -> Arc<TrackContent> {
        let content = Arc::new(TrackContent::new(route, config));
        self.publish(content.clone());
        content
    }

    fn publish(&self, content: Arc<TrackContent>) -> Arc<TrackContent> {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, content)
    }
}
