//! Spectral transform service.
//!
//! The operators only need a unitary forward/inverse pair over the three
//! spatial axes of a volume. [`CenteredFft`] provides it with rustfft,
//! keeping the image origin at index `floor(n / 2)` and the spectral origin
//! (coordinate zero of the trajectory) at the grid's origin index.

use std::sync::Arc;

use ndarray::{Array3, Axis};
use num_complex::Complex32;
use rustfft::{Fft, FftDirection, FftPlanner};

use crate::error::{check_shape, Result};
use crate::geometry::GridGeometry;

/// Forward/inverse transform pair over 3-D complex volumes.
///
/// Implementations must be unitary so that `inverse` is the adjoint of
/// `forward` and `inverse(forward(x)) == x` up to rounding.
pub trait SpectralTransform: Send + Sync {
    /// Volume shape accepted by both directions.
    fn shape(&self) -> [usize; 3];

    /// Image domain to spectral domain.
    fn forward(&self, image: &Array3<Complex32>) -> Result<Array3<Complex32>>;

    /// Spectral domain to image domain.
    fn inverse(&self, spectrum: &Array3<Complex32>) -> Result<Array3<Complex32>>;
}

/// Orthonormal, origin-centred FFT on a fixed grid.
pub struct CenteredFft {
    shape: [usize; 3],
    image_origin: [usize; 3],
    spectral_origin: [usize; 3],
    forward_plans: [Arc<dyn Fft<f32>>; 3],
    inverse_plans: [Arc<dyn Fft<f32>>; 3],
}

impl std::fmt::Debug for CenteredFft {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CenteredFft")
            .field("shape", &self.shape)
            .field("image_origin", &self.image_origin)
            .field("spectral_origin", &self.spectral_origin)
            .finish()
    }
}

impl CenteredFft {
    /// Plan transforms for the grid described by `geometry`.
    pub fn new(geometry: &GridGeometry) -> Self {
        let shape = geometry.shape();
        let mut planner = FftPlanner::<f32>::new();
        let forward_plans = shape.map(|n| planner.plan_fft(n, FftDirection::Forward));
        let inverse_plans = shape.map(|n| planner.plan_fft(n, FftDirection::Inverse));

        Self {
            shape,
            image_origin: shape.map(|n| n / 2),
            spectral_origin: geometry.origin(),
            forward_plans,
            inverse_plans,
        }
    }

    /// Roll so that `from` lands on index zero, transform every axis, then
    /// roll index zero onto `to`.
    fn transform(
        &self,
        input: &Array3<Complex32>,
        from: [usize; 3],
        to: [usize; 3],
        plans: &[Arc<dyn Fft<f32>>; 3],
    ) -> Array3<Complex32> {
        let [n0, n1, n2] = self.shape;
        let mut data = Array3::from_shape_fn((n0, n1, n2), |(i, j, k)| {
            input[[(i + from[0]) % n0, (j + from[1]) % n1, (k + from[2]) % n2]]
        });

        for (axis, plan) in plans.iter().enumerate() {
            let n = self.shape[axis];
            let scale = 1.0 / (n as f32).sqrt();
            let mut buffer = vec![Complex32::new(0.0, 0.0); n];
            let mut scratch = vec![Complex32::new(0.0, 0.0); plan.get_inplace_scratch_len()];

            for mut lane in data.lanes_mut(Axis(axis)) {
                for (b, v) in buffer.iter_mut().zip(lane.iter()) {
                    *b = *v;
                }
                plan.process_with_scratch(&mut buffer, &mut scratch);
                for (v, b) in lane.iter_mut().zip(&buffer) {
                    *v = *b * scale;
                }
            }
        }

        let back = [(n0 - to[0]) % n0, (n1 - to[1]) % n1, (n2 - to[2]) % n2];
        Array3::from_shape_fn((n0, n1, n2), |(i, j, k)| {
            data[[(i + back[0]) % n0, (j + back[1]) % n1, (k + back[2]) % n2]]
        })
    }
}

impl SpectralTransform for CenteredFft {
    fn shape(&self) -> [usize; 3] {
        self.shape
    }

    fn forward(&self, image: &Array3<Complex32>) -> Result<Array3<Complex32>> {
        check_shape(&self.shape, image.shape())?;
        Ok(self.transform(image, self.image_origin, self.spectral_origin, &self.forward_plans))
    }

    fn inverse(&self, spectrum: &Array3<Complex32>) -> Result<Array3<Complex32>> {
        check_shape(&self.shape, spectrum.shape())?;
        Ok(self.transform(spectrum, self.spectral_origin, self.image_origin, &self.inverse_plans))
    }
}
