//! Apodization (roll-off) correction.
//!
//! Convolving with a finite kernel in the spectral domain multiplies the
//! image by the kernel's spectral response. The window built here is that
//! response sampled on the grid; dividing by it undoes the roll-off.

use ndarray::Array3;
use num_complex::Complex32;

use crate::error::{check_shape, Result};
use crate::geometry::GridGeometry;
use crate::kernel::{kernel_offsets, KernelTable};
use crate::spectral::SpectralTransform;

/// Threshold below which a window value is reported as near zero.
const NEAR_ZERO: f32 = 1e-6;

/// Real image-domain correction window, one value per grid cell.
#[derive(Debug, Clone, PartialEq)]
pub struct ApodizationWindow {
    values: Array3<f32>,
}

impl ApodizationWindow {
    /// Build the window for `geometry` and kernel half-width `width`.
    ///
    /// The compensation profile places `KernelWeight(|d|)` at every kernel
    /// offset `d` around the spectral origin, separably on each axis, and
    /// offsets falling outside the grid are dropped. The window is the real
    /// part of `sqrt(N) * inverse(profile)`.
    ///
    /// # Arguments
    /// * `geometry` - Target grid
    /// * `kernel` - Interpolation table used for gridding
    /// * `width` - Kernel half-width `W`
    /// * `transform` - Spectral transform planned for `geometry`
    pub fn build(
        geometry: &GridGeometry,
        kernel: &KernelTable,
        width: f32,
        transform: &dyn SpectralTransform,
    ) -> Result<Self> {
        let shape = geometry.shape();
        let origin = geometry.origin();
        let offsets = kernel_offsets(width);

        let axis_profile = |axis: usize| -> Vec<f32> {
            let n = shape[axis] as i64;
            let mut profile = vec![0f32; shape[axis]];
            for &d in &offsets {
                let idx = origin[axis] as i64 + d;
                if (0..n).contains(&idx) {
                    profile[idx as usize] = kernel.weight((d as f32).abs(), width);
                }
            }
            profile
        };
        let (px, py, pz) = (axis_profile(0), axis_profile(1), axis_profile(2));

        let profile = Array3::from_shape_fn((shape[0], shape[1], shape[2]), |(i, j, k)| {
            Complex32::new(px[i] * py[j] * pz[k], 0.0)
        });

        let scale = (geometry.cells() as f32).sqrt();
        let values = transform.inverse(&profile)?.mapv(|v| v.re * scale);

        let min = values.iter().copied().fold(f32::INFINITY, f32::min);
        if min <= NEAR_ZERO {
            tracing::warn!(
                "Apodization window has near-zero minimum {:.3e} on grid {:?} (width {})",
                min,
                shape,
                width
            );
        }

        Ok(Self { values })
    }

    pub fn values(&self) -> &Array3<f32> {
        &self.values
    }

    /// Smallest window value.
    pub fn min_value(&self) -> f32 {
        self.values.iter().copied().fold(f32::INFINITY, f32::min)
    }

    /// Divide a volume by the window in place.
    pub fn divide(&self, volume: &mut Array3<Complex32>) -> Result<()> {
        check_shape(self.values.shape(), volume.shape())?;
        volume.zip_mut_with(&self.values, |v, &w| *v /= w);
        Ok(())
    }
}
