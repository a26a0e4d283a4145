//! World tile coordinates

use crate::utils::{HALF_TILE_SIZE, TILE_SIZE};
use geo::{Coord, Point, Rect};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A fixed-size square region of the world, addressed by integer `(x, z)`
///
/// Ordering is by `x` first, then `z`, which is the order tiles are kept in
/// by [`TileIndexedList`](crate::TileIndexedList).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Tile {
    pub x: i32,
    pub z: i32,
}

impl Tile {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Tile containing the given world point
    ///
    /// A tile's centre sits at `(x, z) * TILE_SIZE`, so the lower half tile belongs
    /// to the tile and the upper edge belongs to the next one.
    #[inline]
    pub fn from_world(point: Point<f64>) -> Self {
        Self {
            x: (point.x() / TILE_SIZE + 0.5).floor() as i32,
            z: (point.y() / TILE_SIZE + 0.5).floor() as i32,
        }
    }

    /// World position of the tile centre
    #[inline]
    pub fn center(&self) -> Point<f64> {
        Point::new(self.x as f64 * TILE_SIZE, self.z as f64 * TILE_SIZE)
    }

    /// World-space extent of the tile
    pub fn bounds(&self) -> Rect<f64> {
        let center = self.center();
        Rect::new(
            Coord {
                x: center.x() - HALF_TILE_SIZE,
                y: center.y() - HALF_TILE_SIZE,
            },
            Coord {
                x: center.x() + HALF_TILE_SIZE,
                y: center.y() + HALF_TILE_SIZE,
            },
        )
    }

    /// Whether this tile lies inside the inclusive range spanned by two corner tiles
    #[inline]
    pub fn within(&self, bottom_left: Tile, top_right: Tile) -> bool {
        self.x >= bottom_left.x
            && self.x <= top_right.x
            && self.z >= bottom_left.z
            && self.z <= top_right.z
    }
}

impl std::fmt::Display for Tile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.x, self.z)
    }
}

/// Anything that is anchored to exactly one world tile
pub trait TileCoordinate {
    fn tile(&self) -> Tile;
}

impl TileCoordinate for Tile {
    fn tile(&self) -> Tile {
        *self
    }
}
