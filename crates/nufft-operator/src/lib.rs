//! Forward, adjoint and normal NUFFT operators.
//!
//! [`NufftOperator`] wires the primitives from `nufft-core` into the three
//! operator calls used by iterative reconstruction. Gridding runs on a
//! [`backend::GriddingBackend`] chosen at construction, driven batch by
//! batch through the [`gridding::Gridder`] scheduler.

pub mod backend;
pub mod config;
pub mod gridding;
pub mod operator;
pub mod toeplitz;

pub use backend::{select_backend, BackendKind, GriddingBackend, GriddingContext, HostBackend, TensorBackend};
pub use config::NufftConfig;
pub use gridding::{Gridder, Segments};
pub use operator::NufftOperator;
pub use toeplitz::ToeplitzPsf;

pub use nufft_core::{
    CartesianData, DensityPattern, GridGeometry, KernelTable, NonUniformData, NufftError, Result, Trajectory,
};
