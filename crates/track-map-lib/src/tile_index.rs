//! Tile-indexed spatial lookup
//!
//! [`TileIndexedList`] buckets items by the world tile they are anchored to and keeps
//! the buckets sorted by `(x, z)`. Range queries binary-search on `x` and filter on `z`;
//! nearest queries sort the occupied tiles of a range by distance of their centre to a
//! point up front, so their cost grows with the number of tiles in the range.
//! The list is immutable once built: when the underlying data changes it is rebuilt.

use crate::tile::{Tile, TileCoordinate};
use crate::utils;
use geo::Point;
use std::collections::BTreeMap;

#[derive(Clone, Debug)]
struct TileBucket<T> {
    tile: Tile,
    items: Vec<T>,
}

/// Items grouped by tile, sorted for range and nearest-tile queries
#[derive(Clone, Debug)]
pub struct TileIndexedList<T> {
    buckets: Vec<TileBucket<T>>,
    item_count: usize,
}

impl<T> Default for TileIndexedList<T> {
    fn default() -> Self {
        Self {
            buckets: Vec::new(),
            item_count: 0,
        }
    }
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl<T: TileCoordinate> TileIndexedList<T> {
    /// Group items by tile. Items keep their input order within a tile.
    pub fn new<I: IntoIterator<Item = T>>(items: I) -> Self {
        let mut grouped: BTreeMap<Tile, Vec<T>> = BTreeMap::new();
        let mut item_count = 0;
        for item in items {
            grouped.entry(item.tile()).or_default().push(item);
            item_count += 1;
        }
        Self {
            buckets: grouped
                .into_iter()
                .map(|(tile, items)| TileBucket { tile, items })
                .collect(),
            item_count,
        }
    }
}

impl<T> TileIndexedList<T> {
    /// Buckets whose tile lies in the inclusive range between the two corner tiles
    fn buckets_in_range(
        &self,
        bottom_left: Tile,
        top_right: Tile,
    ) -> impl Iterator<Item = &TileBucket<T>> + '_ {
        let first = self
            .buckets
            .partition_point(|bucket| bucket.tile.x < bottom_left.x);
        self.buckets[first..]
            .iter()
            .take_while(move |bucket| bucket.tile.x <= top_right.x)
            .filter(move |bucket| bucket.tile.within(bottom_left, top_right))
    }

    /// Items of all tiles in the inclusive range between the two corner tiles
    pub fn bounding_box(&self, bottom_left: Tile, top_right: Tile) -> impl Iterator<Item = &T> + '_ {
        self.buckets_in_range(bottom_left, top_right)
            .flat_map(|bucket| bucket.items.iter())
    }

    /// Tiles of the range ordered by distance from `point` to the tile centre
    ///
    /// The tile containing `point`, when it is part of the list and the range,
    /// always comes first. Equal distances keep `(x, z)` order. All tiles of the range
    /// are collected and sorted when this is called; the iterator only walks the result.
    pub fn find_nearest(
        &self,
        point: Point<f64>,
        bottom_left: Tile,
        top_right: Tile,
    ) -> impl Iterator<Item = (Tile, &[T])> + '_ {
        let mut candidates: Vec<(f64, &TileBucket<T>)> = self
            .buckets_in_range(bottom_left, top_right)
            .map(|bucket| (utils::distance_squared(point, bucket.tile.center()), bucket))
            .collect();
        // Stable sort: ties stay in tile order
        candidates.sort_by(|a, b| a.0.total_cmp(&b.0));
        candidates
            .into_iter()
            .map(|(_, bucket)| (bucket.tile, bucket.items.as_slice()))
    }

    /// Items on a single tile, empty when the tile holds nothing
    pub fn get(&self, tile: Tile) -> &[T] {
        self.buckets
            .binary_search_by(|bucket| bucket.tile.cmp(&tile))
            .map(|i| self.buckets[i].items.as_slice())
            .unwrap_or(&[])
    }

    /// All occupied tiles in `(x, z)` order
    pub fn tiles(&self) -> impl Iterator<Item = Tile> + '_ {
        self.buckets.iter().map(|bucket| bucket.tile)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.buckets.iter().flat_map(|bucket| bucket.items.iter())
    }

    #[inline]
    pub fn tile_count(&self) -> usize {
        self.buckets.len()
    }

    #[inline]
    pub fn item_count(&self) -> usize {
        self.item_count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.item_count == 0
    }
}
