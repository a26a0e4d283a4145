//! Track Map Inspector - command-line front end for `track-map-lib`
//!
//! Loads a JSON route dump, builds the map content and reports statistics, the item
//! nearest to a point and the platforms of the route.

pub mod logging;
mod report;
mod settings;

pub use report::{NearestReport, PlatformReport, Report};
pub use settings::{Settings, TileRange, parse_args};

use std::path::Path;
use track_map_lib::{NearestState, RouteData, Tile, TrackContent};

/// Error types for the inspector
#[derive(Debug, thiserror::Error)]
pub enum InspectorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Route has no map content")]
    EmptyRoute,
}

pub type Result<T> = std::result::Result<T, InspectorError>;

/// Parse a route dump
pub fn parse_route(json: &str) -> Result<RouteData> {
    Ok(serde_json::from_str(json)?)
}

/// Read and parse a route dump from disk
pub fn load_route(path: &Path) -> Result<RouteData> {
    let json = std::fs::read_to_string(path)?;
    let route = parse_route(&json)?;
    tracing::info!(
        "Loaded route '{}' from {}: {} track nodes, {} road nodes, {} track items",
        route.name,
        path.display(),
        route.track_nodes.len(),
        route.road_nodes.len(),
        route.track_items.len()
    );
    Ok(route)
}

/// Build the content for a loaded route and collect the report the settings ask for
pub fn inspect(route: &RouteData, settings: &Settings) -> Result<Report> {
    let content = TrackContent::new(route, settings.config());
    if content.tiles().is_empty() {
        return Err(InspectorError::EmptyRoute);
    }

    let nearest = settings.at.map(|position| {
        let range = settings.range.unwrap_or_else(|| occupied_range(&content));
        let mut state = NearestState::default();
        content.update_nearest(
            &mut state,
            position,
            range.bottom_left,
            range.top_right,
            settings.view_items(),
        );
        NearestReport::new(position, &state)
    });

    let platforms = if settings.platforms {
        content.platforms().iter().map(PlatformReport::new).collect()
    } else {
        Vec::new()
    };

    Ok(Report::new(&content, nearest, platforms))
}

/// Run the inspector against the route file named in the settings
pub fn run(settings: &Settings) -> Result<Report> {
    let route = load_route(&settings.route)?;
    inspect(&route, settings)
}

/// Smallest tile range covering all occupied tiles
fn occupied_range(content: &TrackContent) -> TileRange {
    let mut tiles = content.tiles().tiles();
    let first = tiles.next().unwrap_or_default();
    let (bottom_left, top_right) = tiles.fold((first, first), |(min, max), tile| {
        (
            Tile::new(min.x.min(tile.x), min.z.min(tile.z)),
            Tile::new(max.x.max(tile.x), max.z.max(tile.z)),
        )
    });
    TileRange {
        bottom_left,
        top_right,
    }
}
