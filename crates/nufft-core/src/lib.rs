//! Core building blocks for convolutional NUFFT gridding.
//!
//! This crate holds everything the operators share: the grid geometry and
//! trajectory model, the Kaiser-Bessel table, the per-batch index/weight
//! resolver, the spectral transform service and the apodization window.

pub mod apodization;
pub mod data;
pub mod error;
pub mod geometry;
pub mod kernel;
pub mod padding;
pub mod resolver;
pub mod spectral;
pub mod trajectory;

pub use apodization::ApodizationWindow;
pub use data::{CartesianData, DensityPattern, NonUniformData};
pub use error::{NufftError, Result};
pub use geometry::GridGeometry;
pub use kernel::{kernel_offsets, KernelTable};
pub use resolver::{resolve_taps, TapSet};
pub use spectral::{CenteredFft, SpectralTransform};
pub use trajectory::{FrameCoords, Trajectory};
