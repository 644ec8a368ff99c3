//! NUFFT operator: forward, adjoint and normal.
//!
//! Everything that depends only on the trajectory and geometry (the frame
//! coordinates, the spectral plans, the apodization window and optionally
//! the Toeplitz PSF) is computed once in [`NufftOperator::new`]. The
//! operator calls themselves allocate fresh outputs and never mutate their
//! inputs, so a failed call leaves nothing half-written behind.

use std::time::Instant;

use ndarray::{s, Array3, ArrayView2};
use nufft_core::apodization::ApodizationWindow;
use nufft_core::data::{cartesian_shape, non_uniform_shape, CartesianData, DensityPattern, NonUniformData};
use nufft_core::error::{check_shape, NufftError, Result};
use nufft_core::geometry::GridGeometry;
use nufft_core::kernel::KernelTable;
use nufft_core::spectral::{CenteredFft, SpectralTransform};
use nufft_core::trajectory::{FrameCoords, Trajectory};
use num_complex::Complex32;

use crate::backend::{select_backend, BackendKind, GriddingContext};
use crate::config::NufftConfig;
use crate::gridding::Gridder;
use crate::toeplitz::ToeplitzPsf;

/// Convolutional-gridding NUFFT over a fixed trajectory and grid.
#[derive(Debug)]
pub struct NufftOperator {
    trajectory: Trajectory,
    frames: Vec<FrameCoords>,
    geometry: GridGeometry,
    kernel: &'static KernelTable,
    width: f32,
    coils: usize,
    density: Option<DensityPattern>,
    transform: CenteredFft,
    window: ApodizationWindow,
    gridder: Gridder,
    psf: Option<ToeplitzPsf>,
}

impl NufftOperator {
    /// Configure an operator for `trajectory`.
    ///
    /// The trajectory is multiplied by the oversampling factor; the grid is
    /// taken from the configuration or estimated from the scaled trajectory.
    ///
    /// # Errors
    /// * `InvalidConfiguration` for invalid scalar parameters
    /// * `DegenerateGeometry` if the grid is empty on any axis
    /// * `ShapeMismatch` if the density pattern is not `[samples, frames]`
    /// * `Unsupported` if the requested backend is unavailable
    pub fn new(trajectory: Trajectory, config: NufftConfig) -> Result<Self> {
        config.validate()?;
        let start = Instant::now();

        let trajectory = if config.oversampling != 1.0 {
            trajectory.scaled(config.oversampling)
        } else {
            trajectory
        };
        let geometry = match config.grid {
            Some(grid) => grid,
            None => GridGeometry::estimate(&trajectory)?,
        };

        let density = match config.density {
            Some(pattern) => {
                check_shape(&[trajectory.samples(), trajectory.frames()], pattern.shape())?;
                Some(pattern.mapv(f32::abs))
            }
            None => None,
        };

        let kernel = KernelTable::kaiser_bessel();
        let transform = CenteredFft::new(&geometry);
        let window = ApodizationWindow::build(&geometry, kernel, config.width, &transform)?;
        let gridder = Gridder::new(select_backend(config.backend)?, config.segment_size)?;

        let psf = if config.toeplitz {
            Some(ToeplitzPsf::build(
                &trajectory,
                &geometry,
                kernel,
                config.width,
                density.as_ref(),
                config.backend,
                config.segment_size,
            )?)
        } else {
            None
        };

        let frames = (0..trajectory.frames()).map(|f| trajectory.frame(f)).collect();

        tracing::info!(
            "NUFFT operator ready: grid {:?}, {} samples x {} frame(s), {} coil(s), width {}, backend {}, toeplitz {} ({:.3} s)",
            geometry.shape(),
            trajectory.samples(),
            trajectory.frames(),
            config.coils,
            config.width,
            config.backend,
            psf.is_some(),
            start.elapsed().as_secs_f64()
        );

        Ok(Self {
            trajectory,
            frames,
            geometry,
            kernel,
            width: config.width,
            coils: config.coils,
            density,
            transform,
            window,
            gridder,
            psf,
        })
    }

    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    /// Trajectory in grid units (oversampling applied).
    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn coils(&self) -> usize {
        self.coils
    }

    pub fn samples(&self) -> usize {
        self.trajectory.samples()
    }

    pub fn frames(&self) -> usize {
        self.trajectory.frames()
    }

    pub fn window(&self) -> &ApodizationWindow {
        &self.window
    }

    pub fn psf(&self) -> Option<&ToeplitzPsf> {
        self.psf.as_ref()
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.gridder.backend_kind()
    }

    /// Expected shape of Cartesian data.
    pub fn cartesian_shape(&self) -> [usize; 5] {
        cartesian_shape(self.geometry.shape(), self.coils, self.frames())
    }

    /// Expected shape of non-uniform data.
    pub fn non_uniform_shape(&self) -> [usize; 3] {
        non_uniform_shape(self.samples(), self.coils, self.frames())
    }

    fn context(&self) -> GriddingContext<'_> {
        GriddingContext {
            geometry: &self.geometry,
            kernel: self.kernel,
            width: self.width,
            coils: self.coils,
        }
    }

    /// Image to non-uniform samples.
    ///
    /// Each coil image is divided by the apodization window and transformed;
    /// the spectra are then interpolated onto the samples.
    pub fn forward(&self, image: &CartesianData) -> Result<NonUniformData> {
        check_shape(&self.cartesian_shape(), image.shape())?;
        let ctx = self.context();
        let (samples, coils) = (self.samples(), self.coils);

        let mut out = NonUniformData::zeros((samples, coils, self.frames()));
        let mut grid = vec![Complex32::new(0.0, 0.0); self.geometry.cells() * coils];
        let mut buffer = vec![Complex32::new(0.0, 0.0); samples * coils];

        for (f, frame) in self.frames.iter().enumerate() {
            for c in 0..coils {
                let mut volume = image.slice(s![.., .., .., c, f]).to_owned();
                self.window.divide(&mut volume)?;
                let spectrum = self.transform.forward(&volume)?;
                for (cell, v) in spectrum.iter().enumerate() {
                    grid[cell * coils + c] = *v;
                }
            }

            self.gridder.gather_frame(frame, &ctx, &grid, &mut buffer)?;
            let gathered = ArrayView2::from_shape((samples, coils), &buffer)?;
            out.slice_mut(s![.., .., f]).assign(&gathered);
        }
        Ok(out)
    }

    /// Non-uniform samples to image.
    ///
    /// Samples are weighted by the density pattern when one is configured,
    /// scatter-added onto a zeroed grid, transformed back and divided by the
    /// apodization window.
    pub fn adjoint(&self, data: &NonUniformData) -> Result<CartesianData> {
        check_shape(&self.non_uniform_shape(), data.shape())?;
        let ctx = self.context();
        let [nx, ny, nz] = self.geometry.shape();
        let coils = self.coils;

        let mut out = CartesianData::zeros((nx, ny, nz, coils, self.frames()));
        for (f, frame) in self.frames.iter().enumerate() {
            let mut values: Vec<Complex32> = data.slice(s![.., .., f]).iter().copied().collect();
            if let Some(density) = &self.density {
                for (s, chunk) in values.chunks_mut(coils).enumerate() {
                    let w = density[[s, f]];
                    chunk.iter_mut().for_each(|v| *v *= w);
                }
            }

            let mut grid = vec![Complex32::new(0.0, 0.0); self.geometry.cells() * coils];
            self.gridder.scatter_frame(frame, &ctx, &values, &mut grid)?;

            for c in 0..coils {
                let spread = Array3::from_shape_fn((nx, ny, nz), |(i, j, k)| {
                    grid[self.geometry.linear_index([i, j, k]) * coils + c]
                });
                let mut image = self.transform.inverse(&spread)?;
                self.window.divide(&mut image)?;
                out.slice_mut(s![.., .., .., c, f]).assign(&image);
            }
        }
        Ok(out)
    }

    /// `adjoint(forward(image))`, through the Toeplitz PSF when one was built.
    pub fn normal(&self, image: &CartesianData) -> Result<CartesianData> {
        match &self.psf {
            Some(psf) => {
                check_shape(&self.cartesian_shape(), image.shape())?;
                psf.apply(image)
            }
            None => self.adjoint(&self.forward(image)?),
        }
    }

    /// Density estimation from the trajectory is not provided.
    pub fn density_estimate(&self) -> Result<DensityPattern> {
        Err(NufftError::unsupported(
            "density estimation from the trajectory is not available",
        ))
    }
}
