//! Execution backends for gridding.
//!
//! A backend implements the two batch kernels of the operator: gathering
//! weighted grid values into samples and scatter-adding weighted samples
//! into the grid. The choice of backend is made once, at operator
//! construction, through [`BackendKind`].
//!
//! Cartesian buffers handed to a backend are flat `[cells, coils]` arrays
//! with the coil index fastest; sample buffers are flat `[samples, coils]`.

pub mod host;
pub mod tensor;

use std::fmt;

use nufft_core::error::{NufftError, Result};
use nufft_core::geometry::GridGeometry;
use nufft_core::kernel::KernelTable;
use num_complex::Complex32;

pub use host::HostBackend;
pub use tensor::TensorBackend;

/// Available execution backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BackendKind {
    /// Rayon data-parallel host path.
    #[default]
    HostParallel,
    /// Burn tensor path on the ndarray device.
    Tensor,
    /// Burn tensor path on the wgpu device.
    Accelerated,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::HostParallel => write!(f, "host-parallel"),
            BackendKind::Tensor => write!(f, "tensor"),
            BackendKind::Accelerated => write!(f, "accelerated"),
        }
    }
}

/// Everything a backend needs besides the per-batch data.
#[derive(Debug, Clone, Copy)]
pub struct GriddingContext<'a> {
    pub geometry: &'a GridGeometry,
    pub kernel: &'a KernelTable,
    pub width: f32,
    pub coils: usize,
}

impl GriddingContext<'_> {
    /// Length of a flat Cartesian buffer.
    pub fn grid_len(&self) -> usize {
        self.geometry.cells() * self.coils
    }

    /// Check the flat buffer lengths of one batch.
    pub(crate) fn check_batch(&self, coords: [&[f32]; 3], grid: usize, samples: usize) -> Result<usize> {
        let n = coords[0].len();
        if coords[1].len() != n || coords[2].len() != n {
            return Err(NufftError::shape_mismatch(
                &[n, n, n],
                &[coords[0].len(), coords[1].len(), coords[2].len()],
            ));
        }
        if grid != self.grid_len() {
            return Err(NufftError::shape_mismatch(&[self.grid_len()], &[grid]));
        }
        if samples != n * self.coils {
            return Err(NufftError::shape_mismatch(&[n * self.coils], &[samples]));
        }
        Ok(n)
    }
}

/// Batch gather/scatter kernels.
pub trait GriddingBackend: Send + Sync {
    /// Which backend this is.
    fn kind(&self) -> BackendKind;

    /// Interpolate the grid onto a batch of samples.
    ///
    /// `out[s * coils + c] = sum_taps weight * grid[index * coils + c]`;
    /// `out` is overwritten.
    fn gather(
        &self,
        coords: [&[f32]; 3],
        ctx: &GriddingContext<'_>,
        grid: &[Complex32],
        out: &mut [Complex32],
    ) -> Result<()>;

    /// Accumulate a batch of samples into the grid.
    ///
    /// `grid[index * coils + c] += weight * values[s * coils + c]` for every
    /// tap; colliding taps are summed, never overwritten.
    fn scatter(
        &self,
        coords: [&[f32]; 3],
        ctx: &GriddingContext<'_>,
        values: &[Complex32],
        grid: &mut [Complex32],
    ) -> Result<()>;
}

/// Instantiate the backend for `kind`.
///
/// # Errors
/// `Unsupported` when `Accelerated` is requested in a build without the
/// `wgpu` feature.
pub fn select_backend(kind: BackendKind) -> Result<Box<dyn GriddingBackend>> {
    match kind {
        BackendKind::HostParallel => Ok(Box::new(HostBackend::new())),
        BackendKind::Tensor => Ok(Box::new(TensorBackend::<burn_ndarray::NdArray<f32>>::new(
            Default::default(),
            BackendKind::Tensor,
        ))),
        BackendKind::Accelerated => accelerated(),
    }
}

#[cfg(feature = "wgpu")]
fn accelerated() -> Result<Box<dyn GriddingBackend>> {
    Ok(Box::new(TensorBackend::<burn::backend::Wgpu>::new(
        Default::default(),
        BackendKind::Accelerated,
    )))
}

#[cfg(not(feature = "wgpu"))]
fn accelerated() -> Result<Box<dyn GriddingBackend>> {
    Err(NufftError::unsupported(
        "accelerated gridding requires the `wgpu` feature",
    ))
}
