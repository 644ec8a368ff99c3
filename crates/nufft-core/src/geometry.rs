//! Cartesian grid geometry.
//!
//! A grid is described by a half-open integer range `[min, max)` per axis in
//! (oversampled) grid units. Local indices run from `0` at `min` to `n - 1`
//! at `max - 1`, and cells are linearised in row-major `(x, y, z)` order.

use crate::error::{NufftError, Result};
use crate::trajectory::Trajectory;

/// Per-axis integer range of the Cartesian grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridGeometry {
    min: [i64; 3],
    max: [i64; 3],
}

impl GridGeometry {
    /// Create a geometry from per-axis bounds.
    ///
    /// # Errors
    /// * `DegenerateGeometry` if `max <= min` on any axis
    /// * `InvalidConfiguration` if the cell count does not fit in `usize`
    pub fn new(min: [i64; 3], max: [i64; 3]) -> Result<Self> {
        let mut cells = 1usize;
        for axis in 0..3 {
            if max[axis] <= min[axis] {
                return Err(NufftError::degenerate_geometry(format!(
                    "axis {} has empty range [{}, {})",
                    axis, min[axis], max[axis]
                )));
            }
            cells = max[axis]
                .checked_sub(min[axis])
                .and_then(|extent| usize::try_from(extent).ok())
                .and_then(|extent| cells.checked_mul(extent))
                .ok_or_else(|| {
                    NufftError::invalid_configuration(format!(
                        "grid range [{:?}, {:?}) is too large",
                        min, max
                    ))
                })?;
        }
        Ok(Self { min, max })
    }

    /// Create a geometry from `(min, max)` pairs, one per axis.
    pub fn from_ranges(ranges: [(i64, i64); 3]) -> Result<Self> {
        Self::new(
            [ranges[0].0, ranges[1].0, ranges[2].0],
            [ranges[0].1, ranges[1].1, ranges[2].1],
        )
    }

    /// Estimate a symmetric grid `[-r, r)` enclosing the trajectory extent.
    ///
    /// Per axis, `r = max(|floor(min coord)|, |ceil(max coord)|)`.
    pub fn estimate(trajectory: &Trajectory) -> Result<Self> {
        let (lo, hi) = trajectory.bounds().ok_or_else(|| {
            NufftError::degenerate_geometry("cannot estimate a grid from an empty trajectory")
        })?;

        let mut min = [0i64; 3];
        let mut max = [0i64; 3];
        for axis in 0..3 {
            let r = (lo[axis].floor().abs()).max(hi[axis].ceil().abs()) as i64;
            min[axis] = -r;
            max[axis] = r;
        }

        let geometry = Self::new(min, max)?;
        tracing::info!(
            "Estimated grid range: x [{}, {}), y [{}, {}), z [{}, {}), shape {:?}",
            min[0], max[0], min[1], max[1], min[2], max[2], geometry.shape()
        );
        Ok(geometry)
    }

    /// Inclusive lower bound per axis.
    pub fn min(&self) -> [i64; 3] {
        self.min
    }

    /// Exclusive upper bound per axis.
    pub fn max(&self) -> [i64; 3] {
        self.max
    }

    /// Number of cells per axis.
    pub fn shape(&self) -> [usize; 3] {
        [
            (self.max[0] - self.min[0]) as usize,
            (self.max[1] - self.min[1]) as usize,
            (self.max[2] - self.min[2]) as usize,
        ]
    }

    /// Total number of cells.
    pub fn cells(&self) -> usize {
        self.shape().iter().product()
    }

    /// Row-major strides `[ny * nz, nz, 1]`.
    pub fn strides(&self) -> [usize; 3] {
        let [_, ny, nz] = self.shape();
        [ny * nz, nz, 1]
    }

    /// Local index of coordinate zero on each axis, wrapped into the grid.
    pub fn origin(&self) -> [usize; 3] {
        let shape = self.shape();
        let mut origin = [0usize; 3];
        for axis in 0..3 {
            origin[axis] = (-self.min[axis]).rem_euclid(shape[axis] as i64) as usize;
        }
        origin
    }

    /// Linear index of a local cell.
    #[inline]
    pub fn linear_index(&self, local: [usize; 3]) -> usize {
        let strides = self.strides();
        local[0] * strides[0] + local[1] * strides[1] + local[2] * strides[2]
    }

    /// Whether an integer grid coordinate lies inside the range.
    pub fn contains(&self, point: [i64; 3]) -> bool {
        (0..3).all(|axis| point[axis] >= self.min[axis] && point[axis] < self.max[axis])
    }

    /// Geometry with both bounds multiplied by `factor`.
    pub fn scaled(&self, factor: i64) -> Result<Self> {
        if factor <= 0 {
            return Err(NufftError::invalid_configuration(format!(
                "grid scale factor must be positive, got {}",
                factor
            )));
        }
        let mut min = [0i64; 3];
        let mut max = [0i64; 3];
        for axis in 0..3 {
            match (self.min[axis].checked_mul(factor), self.max[axis].checked_mul(factor)) {
                (Some(lo), Some(hi)) => {
                    min[axis] = lo;
                    max[axis] = hi;
                }
                _ => {
                    return Err(NufftError::invalid_configuration(format!(
                        "grid range on axis {} overflows when scaled by {}",
                        axis, factor
                    )))
                }
            }
        }
        Self::new(min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    #[test]
    fn test_shape_strides_and_origin() {
        let g = GridGeometry::new([-4, -2, 0], [4, 3, 1]).unwrap();
        assert_eq!(g.shape(), [8, 5, 1]);
        assert_eq!(g.cells(), 40);
        assert_eq!(g.strides(), [5, 1, 1]);
        assert_eq!(g.origin(), [4, 2, 0]);
        assert_eq!(g.linear_index([1, 2, 0]), 7);
    }

    #[test]
    fn test_origin_outside_range_wraps() {
        let g = GridGeometry::new([2, 0, 0], [6, 1, 1]).unwrap();
        // Coordinate 0 lies outside [2, 6); it aliases onto local index 2.
        assert_eq!(g.origin()[0], 2);
    }

    #[test]
    fn test_degenerate_geometry_rejected() {
        let err = GridGeometry::new([0, 0, 0], [4, 0, 4]).unwrap_err();
        assert!(matches!(err, NufftError::DegenerateGeometry(_)));
        assert!(GridGeometry::new([3, 0, 0], [2, 1, 1]).is_err());
    }

    #[test]
    fn test_scaled_doubles_bounds() {
        let g = GridGeometry::new([-3, -2, -1], [3, 2, 1]).unwrap();
        let g2 = g.scaled(2).unwrap();
        assert_eq!(g2.min(), [-6, -4, -2]);
        assert_eq!(g2.max(), [6, 4, 2]);
        assert!(g.scaled(0).is_err());
    }

    #[test]
    fn test_estimate_from_trajectory() {
        let mut coords = Array3::<f32>::zeros((3, 2, 1));
        coords[[0, 0, 0]] = -3.2;
        coords[[0, 1, 0]] = 2.1;
        coords[[1, 0, 0]] = 0.5;
        coords[[1, 1, 0]] = -0.5;
        coords[[2, 0, 0]] = 1.0;
        coords[[2, 1, 0]] = 4.0;
        let traj = Trajectory::new(coords).unwrap();

        let g = GridGeometry::estimate(&traj).unwrap();
        assert_eq!(g.min(), [-4, -1, -4]);
        assert_eq!(g.max(), [4, 1, 4]);
    }

    #[test]
    fn test_estimate_all_zero_is_degenerate() {
        let traj = Trajectory::new(Array3::<f32>::zeros((3, 4, 1))).unwrap();
        assert!(matches!(
            GridGeometry::estimate(&traj),
            Err(NufftError::DegenerateGeometry(_))
        ));
    }

    #[test]
    fn test_oversized_ranges_rejected() {
        assert!(matches!(
            GridGeometry::new([i64::MIN, 0, 0], [i64::MAX, 1, 1]),
            Err(NufftError::InvalidConfiguration(_))
        ));
        let wide = GridGeometry::new([-(1 << 30); 3], [1 << 30; 3]);
        assert!(wide.is_err());
        let g = GridGeometry::new([-(1 << 40), 0, 0], [1 << 40, 1, 1]).unwrap();
        assert!(g.scaled(1 << 30).is_err());
    }

    #[test]
    fn test_estimate_from_far_trajectory_is_an_error() {
        let traj = Trajectory::from_points(&[[1e30, 1.0, 1.0], [0.0, -1.0, -1.0]]).unwrap();
        assert!(matches!(
            GridGeometry::estimate(&traj),
            Err(NufftError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_contains() {
        let g = GridGeometry::new([-2, 0, 0], [3, 1, 1]).unwrap();
        assert!(g.contains([-2, 0, 0]));
        assert!(g.contains([2, 0, 0]));
        assert!(!g.contains([3, 0, 0]));
        assert!(!g.contains([0, 1, 0]));
    }
}
