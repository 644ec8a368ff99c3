//! Toeplitz point-spread function for the normal operator.
//!
//! The composition `adjoint(forward(x))` is a convolution of `x` with the
//! sampling pattern's point-spread function. Gridding the (weighted) unit
//! samples once on a grid of twice the size yields that function; after
//! that, each normal-operator call is a pad, two spectral transforms, a
//! pointwise product and a crop.

use std::time::Instant;

use ndarray::{s, Array3};
use nufft_core::apodization::ApodizationWindow;
use nufft_core::data::{CartesianData, DensityPattern};
use nufft_core::error::{check_shape, Result};
use nufft_core::geometry::GridGeometry;
use nufft_core::kernel::KernelTable;
use nufft_core::padding::{crop, zero_pad};
use nufft_core::spectral::{CenteredFft, SpectralTransform};
use nufft_core::trajectory::Trajectory;
use num_complex::Complex32;

use crate::backend::{select_backend, BackendKind, GriddingContext};
use crate::gridding::Gridder;

/// Spectral-domain PSF on the doubled grid, one volume per frame.
#[derive(Debug)]
pub struct ToeplitzPsf {
    inner: [usize; 3],
    outer: [usize; 3],
    transform: CenteredFft,
    spectra: Vec<Array3<Complex32>>,
}

impl ToeplitzPsf {
    /// Grid the weighted unit samples of `trajectory` on `geometry.scaled(2)`.
    ///
    /// # Arguments
    /// * `trajectory` - Sample coordinates in units of `geometry`
    /// * `geometry` - Grid of the operator the PSF stands in for
    /// * `kernel` - Interpolation table
    /// * `width` - Kernel half-width
    /// * `density` - Per-sample weights (already non-negative); unit weights when `None`
    /// * `backend` - Backend used for the one-off gridding pass
    /// * `segment_size` - Samples per gridding batch
    #[allow(clippy::too_many_arguments)]
    pub fn build(
        trajectory: &Trajectory,
        geometry: &GridGeometry,
        kernel: &KernelTable,
        width: f32,
        density: Option<&DensityPattern>,
        backend: BackendKind,
        segment_size: usize,
    ) -> Result<Self> {
        let start = Instant::now();
        let doubled = geometry.scaled(2)?;
        let trajectory = trajectory.scaled(2.0);
        let transform = CenteredFft::new(&doubled);
        let window = ApodizationWindow::build(&doubled, kernel, width, &transform)?;
        let gridder = Gridder::new(select_backend(backend)?, segment_size)?;

        let ctx = GriddingContext {
            geometry: &doubled,
            kernel,
            width,
            coils: 1,
        };
        let outer = doubled.shape();
        let scale = doubled.cells() as f32 / geometry.cells() as f32;
        let samples = trajectory.samples();

        let mut spectra = Vec::with_capacity(trajectory.frames());
        for f in 0..trajectory.frames() {
            let weights: Vec<Complex32> = match density {
                Some(d) => d.slice(s![.., f]).iter().map(|&w| Complex32::new(w, 0.0)).collect(),
                None => vec![Complex32::new(1.0, 0.0); samples],
            };

            let mut grid = vec![Complex32::new(0.0, 0.0); doubled.cells()];
            gridder.scatter_frame(&trajectory.frame(f), &ctx, &weights, &mut grid)?;

            let spread = Array3::from_shape_vec((outer[0], outer[1], outer[2]), grid)?;
            let mut image = transform.inverse(&spread)?;
            window.divide(&mut image)?;
            spectra.push(transform.forward(&image)?.mapv(|v| v * scale));
        }

        tracing::info!(
            "Built Toeplitz PSF on {:?} for {} frame(s) in {:.3} s",
            outer,
            spectra.len(),
            start.elapsed().as_secs_f64()
        );

        Ok(Self {
            inner: geometry.shape(),
            outer,
            transform,
            spectra,
        })
    }

    /// Shape of the doubled grid.
    pub fn outer_shape(&self) -> [usize; 3] {
        self.outer
    }

    /// PSF spectrum of one frame.
    pub fn spectrum(&self, frame: usize) -> Option<&Array3<Complex32>> {
        self.spectra.get(frame)
    }

    /// Apply `crop(inverse(PSF * forward(zero_pad(x))))` to every coil and frame.
    pub fn apply(&self, image: &CartesianData) -> Result<CartesianData> {
        let (nx, ny, nz, coils, frames) = image.dim();
        check_shape(
            &[self.inner[0], self.inner[1], self.inner[2], coils, self.spectra.len()],
            &[nx, ny, nz, coils, frames],
        )?;

        let mut out = CartesianData::zeros(image.raw_dim());
        for (f, psf) in self.spectra.iter().enumerate() {
            for c in 0..coils {
                let volume = image.slice(s![.., .., .., c, f]).to_owned();
                let mut spectrum = self.transform.forward(&zero_pad(&volume, self.outer)?)?;
                spectrum.zip_mut_with(psf, |v, &p| *v *= p);
                let result = crop(&self.transform.inverse(&spectrum)?, self.inner)?;
                out.slice_mut(s![.., .., .., c, f]).assign(&result);
            }
        }
        Ok(out)
    }
}
