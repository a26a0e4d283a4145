use clap::Parser;
use geo::Point;
use std::path::PathBuf;
use track_map_lib::{Config, MapViewItems, Tile};

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// Track Map Inspector - Load a route dump and query its map content
pub struct Settings {
    /// Route JSON file to load
    #[clap(short, long, value_name = "FILE")]
    pub route: PathBuf,

    /// World position (east,north) to run a nearest-item query at
    #[clap(short, long, value_name = "X,Z", value_parser = parse_point, allow_hyphen_values = true)]
    pub at: Option<Point<f64>>,

    /// Tile range searched by the nearest query (defaults to all occupied tiles)
    #[clap(long, value_name = "X0,Z0,X1,Z1", value_parser = parse_range, allow_hyphen_values = true)]
    pub range: Option<TileRange>,

    /// Map layers considered by the nearest query
    /// (tracks, junctions, ends, roads, road-ends, platforms, grid, items, all, none)
    #[clap(short, long, value_delimiter = ',', default_value = "all", value_parser = parse_layer)]
    pub layers: Vec<MapViewItems>,

    /// List all platforms with their path lengths
    #[clap(long, default_value = "false")]
    pub platforms: bool,

    /// Squared distance (m²) under which an item counts as near
    #[clap(long, default_value = "100.0")]
    pub nearest_distance_squared: f64,

    /// Squared distance (m²) under which junctions and end nodes take priority
    #[clap(long, default_value = "1.0")]
    pub priority_distance_squared: f64,

    /// Print the report as JSON instead of text
    #[clap(long, default_value = "false")]
    pub json: bool,
}

/// Inclusive range of tiles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRange {
    pub bottom_left: Tile,
    pub top_right: Tile,
}

impl Settings {
    /// Parse settings from the command line, exiting with usage on error
    pub fn from_cli() -> Self {
        match parse_args::<Settings>() {
            Ok(args) => args,
            Err(e) => e.exit(),
        }
    }

    /// Query tuning derived from the command line
    pub fn config(&self) -> Config {
        Config {
            nearest_distance_squared: self.nearest_distance_squared,
            priority_distance_squared: self.priority_distance_squared,
        }
    }

    /// All requested layers combined
    pub fn view_items(&self) -> MapViewItems {
        self.layers
            .iter()
            .fold(MapViewItems::NONE, |acc, &layer| acc | layer)
    }
}

/// Parses from the command line arguments
pub fn parse_args<T: Parser>() -> Result<T, clap::Error> {
    T::try_parse()
}

fn parse_numbers<T: std::str::FromStr>(value: &str, expected: usize) -> Result<Vec<T>, String> {
    let numbers = value
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<T>()
                .map_err(|_| format!("'{}' is not a number", part.trim()))
        })
        .collect::<Result<Vec<T>, String>>()?;
    if numbers.len() != expected {
        return Err(format!(
            "expected {} comma-separated values, got {}",
            expected,
            numbers.len()
        ));
    }
    Ok(numbers)
}

fn parse_point(value: &str) -> Result<Point<f64>, String> {
    let numbers = parse_numbers::<f64>(value, 2)?;
    Ok(Point::new(numbers[0], numbers[1]))
}

fn parse_range(value: &str) -> Result<TileRange, String> {
    let numbers = parse_numbers::<i32>(value, 4)?;
    Ok(TileRange {
        bottom_left: Tile::new(numbers[0].min(numbers[2]), numbers[1].min(numbers[3])),
        top_right: Tile::new(numbers[0].max(numbers[2]), numbers[1].max(numbers[3])),
    })
}

fn parse_layer(value: &str) -> Result<MapViewItems, String> {
    MapViewItems::from_name(value).ok_or_else(|| format!("unknown layer '{value}'"))
}
