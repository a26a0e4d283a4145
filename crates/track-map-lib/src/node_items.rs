//! Map items anchored at a single location: junctions, track ends, track items, grid tiles

use crate::info::{InfoMap, InformationProvider};
use crate::records::{TrackItem, TrackItemKind};
use crate::segment::TrackSegment;
use crate::tile::{Tile, TileCoordinate};
use crate::utils;
use geo::Point;
use std::f64::consts::PI;

/// A junction (switch) node
#[derive(Clone, Debug, PartialEq)]
pub struct JunctionSegment {
    pub location: Point<f64>,
    pub node_index: usize,
}

impl JunctionSegment {
    pub fn new(location: Point<f64>, node_index: usize) -> Self {
        Self {
            location,
            node_index,
        }
    }
}

impl TileCoordinate for JunctionSegment {
    fn tile(&self) -> Tile {
        Tile::from_world(self.location)
    }
}

impl InformationProvider for JunctionSegment {
    fn info(&self) -> InfoMap {
        let mut info = InfoMap::new();
        info.insert("Junction Node".to_string(), self.node_index.to_string());
        info
    }
}

/// An end-of-track node
#[derive(Clone, Debug, PartialEq)]
pub struct EndSegment {
    pub location: Point<f64>,
    pub node_index: usize,
    /// Vector node this end terminates
    pub connected_node: usize,
    /// Heading pointing off the end of the track, when the connected node is known
    pub heading: Option<f64>,
}

impl EndSegment {
    /// Create an end node, deriving its heading from the segments of the connected node
    pub fn new(
        location: Point<f64>,
        node_index: usize,
        connected_node: usize,
        connected_segments: &[TrackSegment],
    ) -> Self {
        let heading = match (connected_segments.first(), connected_segments.last()) {
            (Some(first), Some(last)) => {
                if utils::distance_squared(location, first.start())
                    <= utils::distance_squared(location, last.end())
                {
                    Some(utils::wrap_angle(first.heading() + PI))
                } else {
                    Some(last.end_heading())
                }
            }
            _ => {
                tracing::warn!(
                    "End node {} is connected to node {} which has no track segments",
                    node_index,
                    connected_node
                );
                None
            }
        };
        Self {
            location,
            node_index,
            connected_node,
            heading,
        }
    }
}

impl TileCoordinate for EndSegment {
    fn tile(&self) -> Tile {
        Tile::from_world(self.location)
    }
}

impl InformationProvider for EndSegment {
    fn info(&self) -> InfoMap {
        let mut info = InfoMap::new();
        info.insert("End Node".to_string(), self.node_index.to_string());
        info.insert("Connected Node".to_string(), self.connected_node.to_string());
        if let Some(heading) = self.heading {
            info.insert(
                "Direction".to_string(),
                format!("{:.1}°", heading.to_degrees()),
            );
        }
        info
    }
}

/// A track item (signal, crossing, siding marker...) drawn at its location
#[derive(Clone, Debug, PartialEq)]
pub struct TrackItemMarker {
    pub location: Point<f64>,
    pub item: TrackItem,
}

impl TrackItemMarker {
    pub fn new(item: TrackItem) -> Self {
        Self {
            location: item.location.to_point(),
            item,
        }
    }
}

impl TileCoordinate for TrackItemMarker {
    fn tile(&self) -> Tile {
        Tile::from_world(self.location)
    }
}

impl InformationProvider for TrackItemMarker {
    fn info(&self) -> InfoMap {
        let mut info = InfoMap::new();
        info.insert("Item".to_string(), self.item.id.to_string());
        info.insert("Type".to_string(), self.item.kind.label().to_string());
        info.insert("Track Node".to_string(), self.item.node_index.to_string());
        if let TrackItemKind::Platform {
            platform_name,
            station_name,
            ..
        } = &self.item.kind
        {
            info.insert("Platform".to_string(), platform_name.clone());
            info.insert("Station".to_string(), station_name.clone());
        }
        info
    }
}

/// An occupied world tile, used to drive nearest-tile lookups
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridTile {
    pub tile: Tile,
}

impl TileCoordinate for GridTile {
    fn tile(&self) -> Tile {
        self.tile
    }
}

impl InformationProvider for GridTile {
    fn info(&self) -> InfoMap {
        let mut info = InfoMap::new();
        info.insert("Tile".to_string(), self.tile.to_string());
        info
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::WorldLocation;
    use crate::segment::SegmentKind;

    #[test]
    fn test_end_segment_heading_points_off_track() {
        let segments = vec![
            TrackSegment::from_points(Point::new(0.0, 0.0), Point::new(0.0, 100.0), SegmentKind::Rail)
                .unwrap(),
        ];
        let at_start = EndSegment::new(Point::new(0.0, 0.0), 5, 1, &segments);
        assert!(utils::wrap_angle(at_start.heading.unwrap() - PI).abs() < 1e-9);

        let at_end = EndSegment::new(Point::new(0.0, 100.0), 6, 1, &segments);
        assert!(at_end.heading.unwrap().abs() < 1e-9);

        let orphan = EndSegment::new(Point::new(0.0, 0.0), 7, 2, &[]);
        assert!(orphan.heading.is_none());
    }

    #[test]
    fn test_marker_tile_and_info() {
        let marker = TrackItemMarker::new(TrackItem {
            id: 12,
            node_index: 3,
            location: WorldLocation::new(2, 0, 0.0, 0.0, 0.0),
            kind: TrackItemKind::Signal,
        });
        assert_eq!(marker.tile(), Tile::new(2, 0));
        let info = marker.info();
        assert_eq!(info.get("Type").map(String::as_str), Some("Signal"));
    }
}
