//! Kaiser-Bessel lookup table.
//!
//! The gridding kernel is never evaluated analytically on the hot path. A
//! fixed table over the normalised distance `u = d / W` is built once and
//! shared by every operator in the process; weights are read back through
//! [`KernelTable::weight`] with linear interpolation between entries.

use std::sync::OnceLock;

use crate::error::{NufftError, Result};

/// Number of entries in the shared Kaiser-Bessel table.
pub const TABLE_SIZE: usize = 128;

/// Shape parameter of the shared table (Beatty et al., 6-cell kernel at 2x oversampling).
pub const KAISER_BESSEL_BETA: f64 = 13.9086;

static KAISER_BESSEL: OnceLock<KernelTable> = OnceLock::new();

/// Read-only interpolation table for a symmetric gridding kernel.
///
/// Entry `i` holds the kernel value at normalised distance `i / (len - 1)`.
/// The paired view stores `[t[i], t[i + 1]]` per row, with the successor of
/// the last entry clamped to itself, so interpolation never reads past the end.
#[derive(Debug, Clone, PartialEq)]
pub struct KernelTable {
    entries: Vec<f32>,
    pairs: Vec<[f32; 2]>,
}

impl KernelTable {
    /// Process-wide Kaiser-Bessel table, built on first use.
    pub fn kaiser_bessel() -> &'static KernelTable {
        KAISER_BESSEL.get_or_init(|| {
            let last = (TABLE_SIZE - 1) as f64;
            let norm = bessel_i0(KAISER_BESSEL_BETA);
            let entries = (0..TABLE_SIZE)
                .map(|i| {
                    let u = i as f64 / last;
                    let arg = KAISER_BESSEL_BETA * (1.0 - u * u).max(0.0).sqrt();
                    (bessel_i0(arg) / norm) as f32
                })
                .collect();
            Self::build(entries)
        })
    }

    /// Create a table from caller-supplied entries.
    ///
    /// # Errors
    /// Returns `InvalidConfiguration` if fewer than two entries are given or
    /// any entry is not finite.
    pub fn from_entries(entries: Vec<f32>) -> Result<Self> {
        if entries.len() < 2 {
            return Err(NufftError::invalid_configuration(format!(
                "kernel table needs at least 2 entries, got {}",
                entries.len()
            )));
        }
        if entries.iter().any(|v| !v.is_finite()) {
            return Err(NufftError::invalid_configuration(
                "kernel table contains non-finite entries",
            ));
        }
        Ok(Self::build(entries))
    }

    fn build(entries: Vec<f32>) -> Self {
        let last = entries.len() - 1;
        let pairs = (0..entries.len())
            .map(|i| [entries[i], entries[(i + 1).min(last)]])
            .collect();
        Self { entries, pairs }
    }

    /// Number of table entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; construction rejects empty tables.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Raw table entries.
    pub fn entries(&self) -> &[f32] {
        &self.entries
    }

    /// Two-column view used for interpolation.
    pub fn pairs(&self) -> &[[f32; 2]] {
        &self.pairs
    }

    /// Largest table value, the upper bound of every interpolated weight.
    pub fn max_value(&self) -> f32 {
        self.entries.iter().copied().fold(f32::NEG_INFINITY, f32::max)
    }

    /// Interpolated kernel weight at an absolute distance from the kernel centre.
    ///
    /// Distances beyond `width` saturate at the last entry.
    ///
    /// # Arguments
    /// * `distance` - Absolute distance in grid units (must be >= 0)
    /// * `width` - Kernel half-width `W` in grid units
    #[inline]
    pub fn weight(&self, distance: f32, width: f32) -> f32 {
        let last = self.entries.len() - 1;
        let scale = width / last as f32;
        let pos = (distance / scale).min(last as f32);
        let base = pos.floor();
        let frac = pos - base;
        let [lo, hi] = self.pairs[base as usize];
        (1.0 - frac) * lo + frac * hi
    }
}

/// Modified Bessel function of the first kind, order zero (power series).
fn bessel_i0(x: f64) -> f64 {
    let quarter_sq = 0.25 * x * x;
    let mut term = 1.0;
    let mut sum = 1.0;
    let mut k = 1.0;
    while term > sum * 1e-17 {
        term *= quarter_sq / (k * k);
        sum += term;
        k += 1.0;
    }
    sum
}
