//! Coordinate types for world pixels and map cells.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Width and height of one map cell in world pixels.
pub const TILE_PIXEL_SIZE: i32 = 24;

/// World coordinate in pixels.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Pod, Zeroable,
)]
#[repr(C)]
pub struct WorldPoint {
    /// X coordinate in world space
    pub x: i32,
    /// Y coordinate in world space
    pub y: i32,
}

impl WorldPoint {
    /// Creates a new world point.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Converts to the cell containing this point.
    ///
    /// Uses floored division so that negative coordinates map to negative
    /// cells instead of collapsing onto cell zero.
    #[must_use]
    pub const fn to_cell(self, tile_size: i32) -> CellCoord {
        CellCoord {
            x: self.x.div_euclid(tile_size),
            y: self.y.div_euclid(tile_size),
        }
    }

    /// Offset from this point to `other`, widened so that any pair of
    /// coordinates is representable.
    #[must_use]
    pub fn delta_to(self, other: Self) -> (f64, f64) {
        let dx = i64::from(other.x) - i64::from(self.x);
        let dy = i64::from(other.y) - i64::from(self.y);
        (dx as f64, dy as f64)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance_to(self, other: Self) -> f32 {
        let (dx, dy) = self.delta_to(other);
        dx.hypot(dy) as f32
    }
}

/// Map cell coordinate (identifies one tile of the map grid).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Pod, Zeroable,
)]
#[repr(C)]
pub struct CellCoord {
    /// X coordinate in cell space
    pub x: i32,
    /// Y coordinate in cell space
    pub y: i32,
}

impl CellCoord {
    /// Creates a new cell coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// World point at the center of this cell.
    #[must_use]
    pub const fn center(self, tile_size: i32) -> WorldPoint {
        WorldPoint {
            x: self.x * tile_size + tile_size / 2,
            y: self.y * tile_size + tile_size / 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_points_floor() {
        let p = WorldPoint::new(-1, -24);
        assert_eq!(p.to_cell(TILE_PIXEL_SIZE), CellCoord::new(-1, -1));
        let p = WorldPoint::new(-25, 23);
        assert_eq!(p.to_cell(TILE_PIXEL_SIZE), CellCoord::new(-2, 0));
    }

    #[test]
    fn test_cell_center_maps_back() {
        let cell = CellCoord::new(3, 7);
        let center = cell.center(TILE_PIXEL_SIZE);
        assert_eq!(center, WorldPoint::new(84, 180));
        assert_eq!(center.to_cell(TILE_PIXEL_SIZE), cell);
    }

    #[test]
    fn test_distance() {
        let a = WorldPoint::new(0, 0);
        let b = WorldPoint::new(3, 4);
        assert!((a.distance_to(b) - 5.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_distance_at_coordinate_extremes() {
        let listener = WorldPoint::new(-1, 0);
        let far = WorldPoint::new(i32::MAX, 0);
        let expected = (i64::from(i32::MAX) + 1) as f32;
        assert_eq!(listener.distance_to(far), expected);
        assert_eq!(far.distance_to(listener), expected);

        let corner = WorldPoint::new(i32::MIN, i32::MIN);
        let opposite = WorldPoint::new(i32::MAX, i32::MAX);
        assert_eq!(corner.delta_to(opposite), (u32::MAX as f64, u32::MAX as f64));
        assert!(corner.distance_to(opposite).is_finite());
    }
}
