//! Performance benchmarks for track-map-lib
//!
//! Run with: cargo bench --package track-map-lib

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use geo::Point;
use track_map_lib::{
    Config, MapViewItems, NearestState, RouteData, Tile, TrackContent, TrackItem, TrackItemKind,
    TrackNode, TrackSection, TrackSections, TrackVectorSection, WorldLocation,
};

const SECTION_LENGTH: f64 = 50.0;

/// Generate a route of parallel lines running north, each crossing several tiles,
/// with a junction between consecutive line pieces and a pair of platform items on each.
fn generate_route(num_lines: usize, sections_per_line: usize) -> RouteData {
    let sections = TrackSections::from(vec![
        TrackSection::straight(1, 1.5, SECTION_LENGTH),
        TrackSection::curved(2, 1.5, 1000.0, 2.0),
    ]);
    let mut track_nodes = Vec::new();
    let mut track_items = Vec::new();
    let mut next_index = 0;

    for line in 0..num_lines {
        let x = line as f64 * 120.0 - 3000.0;
        let node_index = next_index + 1;
        track_nodes.push(TrackNode::End {
            index: next_index,
            location: world(x, -3000.0),
            connected_node: node_index,
        });
        track_nodes.push(TrackNode::Vector {
            index: node_index,
            sections: (0..sections_per_line)
                .map(|i| TrackVectorSection {
                    section_index: 1,
                    location: world(x, -3000.0 + i as f64 * SECTION_LENGTH),
                    heading: 0.0,
                })
                .collect(),
        });
        let end_z = -3000.0 + sections_per_line as f64 * SECTION_LENGTH;
        track_nodes.push(TrackNode::Junction {
            index: node_index + 1,
            location: world(x, end_z),
        });
        track_nodes.push(TrackNode::Vector {
            index: node_index + 2,
            sections: vec![TrackVectorSection {
                section_index: 2,
                location: world(x, end_z),
                heading: 0.0,
            }],
        });

        let id = (line * 2) as u32;
        for (offset, (own, linked)) in [(id, id + 1), (id + 1, id)].into_iter().enumerate() {
            track_items.push(TrackItem {
                id: own,
                node_index,
                location: world(x, -2900.0 + offset as f64 * 200.0),
                kind: TrackItemKind::Platform {
                    linked_id: linked,
                    platform_name: format!("Station {line} Platform"),
                    station_name: format!("Station {line}"),
                },
            });
        }
        next_index += 4;
    }

    RouteData {
        name: "Benchmark Route".to_string(),
        sections,
        track_nodes,
        road_nodes: Vec::new(),
        track_items,
    }
}

/// World location split into tile and tile-local coordinates
fn world(x: f64, z: f64) -> WorldLocation {
    let tile = Tile::from_world(Point::new(x, z));
    let center = tile.center();
    WorldLocation::new(tile.x, tile.z, x - center.x(), 0.0, z - center.y())
}

// ============================================================================
// Core Benchmarks - Key performance indicators
// ============================================================================

fn bench_query_performance(c: &mut Criterion) {
    let mut group = c.benchmark_group("query");

    let content = TrackContent::new(&generate_route(50, 200), Config::default());

    // Single tile (detailed view)
    group.bench_function("bounding_box_single_tile", |b| {
        b.iter(|| {
            content
                .track_segments()
                .bounding_box(Tile::new(0, 0), Tile::new(0, 0))
                .count()
        });
    });

    // Whole route (overview)
    group.bench_function("bounding_box_all_tiles", |b| {
        b.iter(|| {
            content
                .track_segments()
                .bounding_box(Tile::new(-5, -5), Tile::new(5, 5))
                .count()
        });
    });

    group.finish();
}

fn bench_nearest(c: &mut Criterion) {
    let mut group = c.benchmark_group("nearest");

    let content = TrackContent::new(&generate_route(50, 200), Config::default());
    let pointer = Point::new(-2998.0, 100.0);

    group.bench_function("update_nearest_all_layers", |b| {
        let mut state = NearestState::default();
        b.iter(|| {
            content.update_nearest(
                &mut state,
                pointer,
                Tile::new(-5, -5),
                Tile::new(5, 5),
                MapViewItems::ALL,
            )
        });
    });

    group.bench_function("find_nearest_tile", |b| {
        b.iter(|| {
            content
                .tiles()
                .find_nearest(pointer, Tile::new(-5, -5), Tile::new(5, 5))
                .next()
        });
    });

    group.finish();
}

fn bench_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("construction");
    group.sample_size(20);

    let route = generate_route(100, 200);
    let total_sections = 100 * 200;

    group.throughput(Throughput::Elements(total_sections as u64));
    group.bench_function("parallel_100x200", |b| {
        b.iter(|| TrackContent::new(&route, Config::default()));
    });

    group.finish();
}

fn bench_content_info(c: &mut Criterion) {
    let mut group = c.benchmark_group("info");

    let content = TrackContent::new(&generate_route(100, 200), Config::default());

    group.bench_function("get_info", |b| {
        b.iter(|| content.get_info());
    });

    group.bench_function("bounds", |b| {
        b.iter(|| content.bounds());
    });

    group.finish();
}

// ============================================================================
// Criterion Configuration
// ============================================================================

criterion_group!(
    benches,
    bench_query_performance,
    bench_nearest,
    bench_construction,
    bench_content_info,
);

criterion_main!(benches);
