//! Array layouts exchanged with callers.

use ndarray::{Array2, Array3, Array5};
use num_complex::Complex32;

/// Cartesian data `[nx, ny, nz, coils, frames]`.
pub type CartesianData = Array5<Complex32>;

/// Non-uniform data `[samples, coils, frames]`.
pub type NonUniformData = Array3<Complex32>;

/// Density-compensation weights `[samples, frames]`.
pub type DensityPattern = Array2<f32>;

/// Expected Cartesian shape for a grid shape, coil and frame count.
pub fn cartesian_shape(grid: [usize; 3], coils: usize, frames: usize) -> [usize; 5] {
    [grid[0], grid[1], grid[2], coils, frames]
}

/// Expected non-uniform shape for a sample, coil and frame count.
pub fn non_uniform_shape(samples: usize, coils: usize, frames: usize) -> [usize; 3] {
    [samples, coils, frames]
}
