//! Raw route records consumed by the map content builder
//!
//! These mirror what the route file parser hands over: the shared track-section
//! table, the track and road node databases and the track items placed on them.
//! They carry no derived geometry; see [`TrackSegment`](crate::TrackSegment) for that.

use crate::utils;
use geo::Point;
use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A location given relative to its tile, as stored in route files
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WorldLocation {
    pub tile_x: i32,
    pub tile_z: i32,
    /// Local east offset inside the tile
    pub x: f64,
    /// Elevation, unused by the 2D map
    #[cfg_attr(feature = "serde", serde(default))]
    pub y: f64,
    /// Local north offset inside the tile
    pub z: f64,
}

impl WorldLocation {
    pub fn new(tile_x: i32, tile_z: i32, x: f64, y: f64, z: f64) -> Self {
        Self {
            tile_x,
            tile_z,
            x,
            y,
            z,
        }
    }

    /// Absolute 2D world position (x east, y north)
    #[inline]
    pub fn to_point(&self) -> Point<f64> {
        utils::world_point(self.tile_x, self.tile_z, self.x, self.z)
    }
}

/// Physical definition of a track section shape
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrackSection {
    pub index: u32,
    /// Gauge width in meters
    pub width: f64,
    pub curved: bool,
    /// Straight length in meters, ignored for curved sections
    #[cfg_attr(feature = "serde", serde(default))]
    pub length: f64,
    /// Curve radius in meters
    #[cfg_attr(feature = "serde", serde(default))]
    pub radius: f64,
    /// Curve angle in degrees, positive turning clockwise
    #[cfg_attr(feature = "serde", serde(default))]
    pub angle: f64,
}

impl TrackSection {
    pub fn straight(index: u32, width: f64, length: f64) -> Self {
        Self {
            index,
            width,
            curved: false,
            length,
            radius: 0.0,
            angle: 0.0,
        }
    }

    pub fn curved(index: u32, width: f64, radius: f64, angle_degrees: f64) -> Self {
        Self {
            index,
            width,
            curved: true,
            length: radius * angle_degrees.to_radians().abs(),
            radius,
            angle: angle_degrees,
        }
    }
}

/// Lookup table of track section shapes, keyed by section index
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "Vec<TrackSection>", into = "Vec<TrackSection>"))]
pub struct TrackSections {
    sections: HashMap<u32, TrackSection>,
}

impl TrackSections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, section: TrackSection) {
        self.sections.insert(section.index, section);
    }

    /// Look up a section; `None` means the route data references an unknown shape
    #[inline]
    pub fn try_get(&self, index: u32) -> Option<&TrackSection> {
        self.sections.get(&index)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

impl From<Vec<TrackSection>> for TrackSections {
    fn from(sections: Vec<TrackSection>) -> Self {
        Self {
            sections: sections.into_iter().map(|s| (s.index, s)).collect(),
        }
    }
}

impl From<TrackSections> for Vec<TrackSection> {
    fn from(table: TrackSections) -> Self {
        let mut sections: Vec<TrackSection> = table.sections.into_values().collect();
        sections.sort_by_key(|s| s.index);
        sections
    }
}

/// One physical piece of track inside a vector node
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrackVectorSection {
    /// Index into [`TrackSections`]
    pub section_index: u32,
    /// Start of the piece
    pub location: WorldLocation,
    /// Heading at the start in radians (0 = north, clockwise)
    pub heading: f64,
}

/// A node of the track (or road) network graph
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type"))]
pub enum TrackNode {
    /// A run of consecutive track vector sections
    Vector {
        index: usize,
        sections: Vec<TrackVectorSection>,
    },
    Junction {
        index: usize,
        location: WorldLocation,
    },
    /// End of track, linked to the vector node it terminates
    End {
        index: usize,
        location: WorldLocation,
        connected_node: usize,
    },
}

impl TrackNode {
    pub fn index(&self) -> usize {
        match self {
            TrackNode::Vector { index, .. }
            | TrackNode::Junction { index, .. }
            | TrackNode::End { index, .. } => *index,
        }
    }
}

/// Kind-specific data of a track item
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type"))]
pub enum TrackItemKind {
    /// One end of a platform; the other end is referenced by `linked_id`
    Platform {
        linked_id: u32,
        #[cfg_attr(feature = "serde", serde(default))]
        platform_name: String,
        #[cfg_attr(feature = "serde", serde(default))]
        station_name: String,
    },
    Signal,
    Siding,
    Crossover,
    LevelCrossing,
    Other {
        description: String,
    },
}

impl TrackItemKind {
    pub fn label(&self) -> &str {
        match self {
            TrackItemKind::Platform { .. } => "Platform",
            TrackItemKind::Signal => "Signal",
            TrackItemKind::Siding => "Siding",
            TrackItemKind::Crossover => "Crossover",
            TrackItemKind::LevelCrossing => "Level Crossing",
            TrackItemKind::Other { description } => description,
        }
    }
}

/// An item placed on a vector node (signals, platforms, crossings, ...)
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrackItem {
    pub id: u32,
    /// Vector node the item sits on
    pub node_index: usize,
    pub location: WorldLocation,
    pub kind: TrackItemKind,
}

/// Everything the map content needs from a parsed route
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RouteData {
    pub name: String,
    pub sections: TrackSections,
    pub track_nodes: Vec<TrackNode>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub road_nodes: Vec<TrackNode>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub track_items: Vec<TrackItem>,
}
