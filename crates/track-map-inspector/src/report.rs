//! Text and JSON rendering of inspection results

use crate::Result;
use geo::Point;
use serde::Serialize;
use std::fmt::Write;
use track_map_lib::{
    ContentInfo, InfoMap, InformationProvider, NearestState, PlatformPath, Tile, TrackContent,
};

/// Result of a nearest-item query
#[derive(Debug, Clone, Serialize)]
pub struct NearestReport {
    pub position: [f64; 2],
    pub tile: Option<Tile>,
    /// Squared distance to the status item
    pub distance: Option<f64>,
    pub status: InfoMap,
    pub track_item: Option<InfoMap>,
    pub road_segment: Option<InfoMap>,
}

impl NearestReport {
    pub fn new(position: Point<f64>, state: &NearestState) -> Self {
        Self {
            position: [position.x(), position.y()],
            tile: state.grid_tile,
            distance: state.status.distance,
            status: state.status.info(),
            track_item: state.track_item.as_ref().map(InformationProvider::info),
            road_segment: state.road_segment.as_ref().map(InformationProvider::info),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlatformReport {
    pub name: String,
    pub station: String,
    pub start_item: u32,
    pub end_item: u32,
    pub length: f64,
    pub sections: usize,
}

impl PlatformReport {
    pub fn new(platform: &PlatformPath) -> Self {
        Self {
            name: platform.platform_name.clone(),
            station: platform.station_name.clone(),
            start_item: platform.start_item,
            end_item: platform.end_item,
            length: platform.path.length(),
            sections: platform.path.sections().len(),
        }
    }
}

/// Everything the inspector prints
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub content: ContentInfo,
    /// `[min_x, min_z, max_x, max_z]`
    pub bounds: Option<[f64; 4]>,
    pub nearest: Option<NearestReport>,
    pub platforms: Vec<PlatformReport>,
}

impl Report {
    pub fn new(
        content: &TrackContent,
        nearest: Option<NearestReport>,
        platforms: Vec<PlatformReport>,
    ) -> Self {
        Self {
            content: content.get_info(),
            bounds: content
                .bounds()
                .map(|rect| [rect.min().x, rect.min().y, rect.max().x, rect.max().y]),
            nearest,
            platforms,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        write_info(&mut out, "", &self.content.info());
        if let Some([min_x, min_z, max_x, max_z]) = self.bounds {
            let _ = writeln!(
                out,
                "Bounds: ({min_x:.1}, {min_z:.1}) - ({max_x:.1}, {max_z:.1})"
            );
        }

        if let Some(nearest) = &self.nearest {
            let _ = writeln!(
                out,
                "\nNearest to ({:.1}, {:.1}):",
                nearest.position[0], nearest.position[1]
            );
            if let Some(tile) = nearest.tile {
                let _ = writeln!(out, "  Tile: {tile}");
            }
            match nearest.distance {
                Some(distance) => {
                    let _ = writeln!(out, "  Distance: {:.2} m", distance.sqrt());
                    write_info(&mut out, "  ", &nearest.status);
                }
                None => {
                    let _ = writeln!(out, "  Nothing within range");
                }
            }
            if let Some(item) = &nearest.track_item {
                let _ = writeln!(out, "  Nearest track item:");
                write_info(&mut out, "    ", item);
            }
            if let Some(road) = &nearest.road_segment {
                let _ = writeln!(out, "  Nearest road:");
                write_info(&mut out, "    ", road);
            }
        }

        if !self.platforms.is_empty() {
            let _ = writeln!(out, "\nPlatforms:");
            for platform in &self.platforms {
                let _ = writeln!(
                    out,
                    "  {} / {} (items {}-{}): {:.1} m over {} node(s)",
                    platform.station,
                    platform.name,
                    platform.start_item,
                    platform.end_item,
                    platform.length,
                    platform.sections
                );
            }
        }
        out
    }
}

fn write_info(out: &mut String, indent: &str, info: &InfoMap) {
    for (name, value) in info {
        let _ = writeln!(out, "{indent}{name}: {value}");
    }
}
