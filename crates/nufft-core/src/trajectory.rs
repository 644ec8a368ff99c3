//! Non-uniform sample trajectory.
//!
//! Coordinates are stored as an `[3, samples, frames]` array in grid units,
//! already multiplied by any oversampling factor. They may fall outside the
//! grid; the resolver masks such taps instead of wrapping them.

use std::ops::Range;

use ndarray::{Array3, ArrayView1, Axis};

use crate::error::{NufftError, Result};
use crate::geometry::GridGeometry;

/// Immutable set of 3-D sample coordinates for one or more frames.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    coords: Array3<f32>,
}

impl Trajectory {
    /// Wrap a `[3, samples, frames]` coordinate array.
    ///
    /// # Errors
    /// * `ShapeMismatch` if the leading axis is not 3
    /// * `InvalidConfiguration` if any coordinate is NaN or infinite
    pub fn new(coords: Array3<f32>) -> Result<Self> {
        let (axes, samples, frames) = coords.dim();
        if axes != 3 {
            return Err(NufftError::shape_mismatch(&[3, samples, frames], &[axes, samples, frames]));
        }
        if frames == 0 {
            return Err(NufftError::invalid_configuration("trajectory has no frames"));
        }
        if coords.iter().any(|c| !c.is_finite()) {
            return Err(NufftError::invalid_configuration(
                "trajectory contains non-finite coordinates",
            ));
        }
        Ok(Self { coords })
    }

    /// Single-frame trajectory from a list of points.
    pub fn from_points(points: &[[f32; 3]]) -> Result<Self> {
        let coords = Array3::from_shape_fn((3, points.len(), 1), |(axis, s, _)| points[s][axis]);
        Self::new(coords)
    }

    /// One sample on every cell of `geometry`, in linear-index order.
    ///
    /// Sample `i` sits on the integer coordinate of the cell whose linear
    /// index is `i`.
    pub fn cartesian(geometry: &GridGeometry) -> Self {
        let [nx, ny, nz] = geometry.shape();
        let min = geometry.min();
        let total = nx * ny * nz;

        let mut coords = Array3::<f32>::zeros((3, total, 1));
        let mut i = 0;
        for x in 0..nx {
            for y in 0..ny {
                for z in 0..nz {
                    coords[[0, i, 0]] = (min[0] + x as i64) as f32;
                    coords[[1, i, 0]] = (min[1] + y as i64) as f32;
                    coords[[2, i, 0]] = (min[2] + z as i64) as f32;
                    i += 1;
                }
            }
        }
        Self { coords }
    }

    /// Raw `[3, samples, frames]` coordinates.
    pub fn coords(&self) -> &Array3<f32> {
        &self.coords
    }

    pub fn samples(&self) -> usize {
        self.coords.dim().1
    }

    pub fn frames(&self) -> usize {
        self.coords.dim().2
    }

    /// Trajectory with every coordinate multiplied by `factor`.
    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            coords: self.coords.mapv(|c| c * factor),
        }
    }

    /// Per-axis `(min, max)` over all samples and frames, `None` when empty.
    pub fn bounds(&self) -> Option<([f32; 3], [f32; 3])> {
        if self.samples() == 0 {
            return None;
        }
        let mut lo = [f32::INFINITY; 3];
        let mut hi = [f32::NEG_INFINITY; 3];
        for (axis, lane) in self.coords.axis_iter(Axis(0)).enumerate() {
            for &c in lane.iter() {
                lo[axis] = lo[axis].min(c);
                hi[axis] = hi[axis].max(c);
            }
        }
        Some((lo, hi))
    }

    /// Contiguous per-axis coordinates of one frame.
    pub fn frame(&self, frame: usize) -> FrameCoords {
        let column = |axis: usize| -> Vec<f32> {
            let lane: ArrayView1<f32> = self.coords.slice(ndarray::s![axis, .., frame]);
            lane.to_vec()
        };
        FrameCoords {
            axes: [column(0), column(1), column(2)],
        }
    }
}

/// Coordinates of a single frame, one contiguous buffer per axis.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameCoords {
    axes: [Vec<f32>; 3],
}

impl FrameCoords {
    pub fn len(&self) -> usize {
        self.axes[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.axes[0].is_empty()
    }

    /// All samples of the frame.
    pub fn all(&self) -> [&[f32]; 3] {
        [&self.axes[0], &self.axes[1], &self.axes[2]]
    }

    /// Sample range `range` of the frame.
    pub fn batch(&self, range: Range<usize>) -> [&[f32]; 3] {
        [
            &self.axes[0][range.clone()],
            &self.axes[1][range.clone()],
            &self.axes[2][range],
        ]
    }
}
