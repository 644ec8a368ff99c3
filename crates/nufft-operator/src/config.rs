//! Operator configuration.

use nufft_core::data::DensityPattern;
use nufft_core::error::{NufftError, Result};
use nufft_core::geometry::GridGeometry;

use crate::backend::BackendKind;

/// Default number of samples gridded per batch.
pub const DEFAULT_SEGMENT_SIZE: usize = 500_000;

/// Construction parameters of a [`crate::NufftOperator`].
#[derive(Debug, Clone)]
pub struct NufftConfig {
    /// Explicit grid range in oversampled units; estimated from the trajectory when `None`.
    pub grid: Option<GridGeometry>,
    /// Factor applied to the trajectory before gridding.
    pub oversampling: f32,
    /// Density-compensation weights `[samples, frames]`.
    pub density: Option<DensityPattern>,
    /// Kernel half-width in grid units.
    pub width: f32,
    /// Samples per gridding batch.
    pub segment_size: usize,
    /// Precompute the Toeplitz PSF for the normal operator.
    pub toeplitz: bool,
    /// Number of coils (parallel channels) in the data.
    pub coils: usize,
    /// Execution backend.
    pub backend: BackendKind,
}

impl Default for NufftConfig {
    fn default() -> Self {
        Self {
            grid: None,
            oversampling: 1.0,
            density: None,
            width: 3.0,
            segment_size: DEFAULT_SEGMENT_SIZE,
            toeplitz: false,
            coils: 1,
            backend: BackendKind::default(),
        }
    }
}

impl NufftConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an explicit grid instead of estimating one.
    pub fn with_grid(mut self, grid: GridGeometry) -> Self {
        self.grid = Some(grid);
        self
    }

    pub fn with_oversampling(mut self, oversampling: f32) -> Self {
        self.oversampling = oversampling;
        self
    }

    /// Apply density compensation on the adjoint path.
    pub fn with_density(mut self, density: DensityPattern) -> Self {
        self.density = Some(density);
        self
    }

    pub fn with_width(mut self, width: f32) -> Self {
        self.width = width;
        self
    }

    pub fn with_segment_size(mut self, segment_size: usize) -> Self {
        self.segment_size = segment_size;
        self
    }

    pub fn with_toeplitz(mut self, enabled: bool) -> Self {
        self.toeplitz = enabled;
        self
    }

    pub fn with_coils(mut self, coils: usize) -> Self {
        self.coils = coils;
        self
    }

    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    /// Validate the scalar parameters.
    pub fn validate(&self) -> Result<()> {
        if !self.width.is_finite() || self.width <= 0.0 {
            return Err(NufftError::invalid_configuration(format!(
                "kernel width must be positive, got {}",
                self.width
            )));
        }
        if !self.oversampling.is_finite() || self.oversampling <= 0.0 {
            return Err(NufftError::invalid_configuration(format!(
                "oversampling factor must be positive, got {}",
                self.oversampling
            )));
        }
        if self.segment_size == 0 {
            return Err(NufftError::invalid_configuration("segment size must be positive"));
        }
        if self.coils == 0 {
            return Err(NufftError::invalid_configuration("coil count must be positive"));
        }
        if let Some(density) = &self.density {
            if density.iter().any(|d| !d.is_finite()) {
                return Err(NufftError::invalid_configuration(
                    "density pattern contains non-finite weights",
                ));
            }
        }
        Ok(())
    }
}
