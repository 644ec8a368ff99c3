//! Gridding kernel.
//!
//! A shared lookup table plus the helpers that turn a kernel half-width into
//! the integer tap offsets visited around every sample.

pub mod table;
pub mod weight;

pub use table::{KernelTable, KAISER_BESSEL_BETA, TABLE_SIZE};
pub use weight::{kernel_offsets, taps_per_axis};
