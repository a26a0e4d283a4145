//! Track Map Library - Core Data Structures for Railroad Route Maps
//!
//! This library turns the track database of a railroad route into tile-indexed map
//! content for real-time rendering: drawable track and road segments, junctions, track
//! ends, track items and platforms, plus "what is under the pointer" queries.
//!
//! # Architecture
//!
//! - **[`RouteData`]**: Parsed route records (section shapes, track nodes, track items)
//! - **[`TrackSegment`]**: One straight or curved piece of track with its geometry math
//! - **[`TileIndexedList`]**: Spatial index grouping items by 2048 m world tile
//! - **[`PathBuilder`]**: Ordered segment paths between two points of the network
//! - **[`TrackContent`]**: High-level content manager and nearest-item queries
//!
//! # Coordinates
//!
//! World points are [`geo::Point`] with `x` east and `y` north. Headings are radians,
//! 0 pointing north and increasing clockwise.
//!
//! # Performance Characteristics
//!
//! - **Build Time**: O(N log N) over all segments, node construction parallelized
//! - **Range Query**: O(log T + K) where T=occupied tiles, K=results
//! - **Nearest Query**: O(T log T + S) where S=items on the nearest tile

mod content;
mod info;
mod node_items;
mod path;
mod records;
mod segment;
mod tile;
mod tile_index;
pub mod utils;

// Public API exports
pub use content::{
    Config, ContentHandle, ContentInfo, MapViewItems, NearestItem, NearestState, NearestStatus,
    TrackContent,
};
pub use info::{InfoMap, InformationProvider};
pub use node_items::{EndSegment, GridTile, JunctionSegment, TrackItemMarker};
pub use path::{
    CONNECT_TOLERANCE, NodeSegments, PathBuilder, PathSection, PlatformPath, SegmentPath,
};
pub use records::{
    RouteData, TrackItem, TrackItemKind, TrackNode, TrackSection, TrackSections,
    TrackVectorSection, WorldLocation,
};
pub use segment::{Curve, Geometry, SegmentKind, TrackSegment, segment_at};
pub use tile::{Tile, TileCoordinate};
pub use tile_index::TileIndexedList;

/// Error types for the map library
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),
}

pub type Result<T> = std::result::Result<T, MapError>;
