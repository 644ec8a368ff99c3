//! Index/weight resolution for a batch of samples.
//!
//! Every sample touches the Cartesian product of its per-axis kernel taps.
//! Per axis, a tap sits at `round(coord) + offset`; its weight is the kernel
//! evaluated at the distance to the coordinate. Taps outside the grid are
//! clamped onto the border and detected by comparing the clamped index with
//! the raw one; such taps keep a valid linear index but carry zero weight.

use rayon::prelude::*;

use crate::geometry::GridGeometry;
use crate::kernel::{kernel_offsets, KernelTable};

/// Linear grid indices and separable weights for a batch of samples.
///
/// Tap `t` of sample `s` lives at position `s * taps_per_sample + t`.
#[derive(Debug, Clone, PartialEq)]
pub struct TapSet {
    taps_per_sample: usize,
    indices: Vec<usize>,
    weights: Vec<f32>,
}

impl TapSet {
    pub fn samples(&self) -> usize {
        if self.taps_per_sample == 0 {
            0
        } else {
            self.indices.len() / self.taps_per_sample
        }
    }

    pub fn taps_per_sample(&self) -> usize {
        self.taps_per_sample
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Taps of a single sample.
    pub fn sample(&self, s: usize) -> (&[usize], &[f32]) {
        let range = s * self.taps_per_sample..(s + 1) * self.taps_per_sample;
        (&self.indices[range.clone()], &self.weights[range])
    }

    /// Sum of all tap weights of a sample.
    pub fn total_weight(&self, s: usize) -> f32 {
        self.sample(s).1.iter().sum()
    }
}

/// Per-axis local indices and masked weights, `len = samples * k`.
struct AxisTaps {
    local: Vec<usize>,
    weight: Vec<f32>,
}

fn resolve_axis(
    coords: &[f32],
    offsets: &[i64],
    lo: i64,
    hi: i64,
    kernel: &KernelTable,
    width: f32,
) -> AxisTaps {
    let k = offsets.len();
    let mut local = vec![0usize; coords.len() * k];
    let mut weight = vec![0f32; coords.len() * k];

    for (s, &c) in coords.iter().enumerate() {
        let centre = c.round_ties_even() as i64;
        for (j, &offset) in offsets.iter().enumerate() {
            let raw = centre.saturating_add(offset);
            let clipped = raw.clamp(lo, hi - 1);
            local[s * k + j] = (clipped - lo) as usize;
            weight[s * k + j] = if clipped == raw {
                kernel.weight((raw as f32 - c).abs(), width)
            } else {
                0.0
            };
        }
    }

    AxisTaps { local, weight }
}

/// Resolve the full 3-D tap set of a batch of samples.
///
/// # Arguments
/// * `coords` - Per-axis coordinates, all three slices of equal length
/// * `geometry` - Target grid
/// * `kernel` - Interpolation table
/// * `width` - Kernel half-width `W`
pub fn resolve_taps(
    coords: [&[f32]; 3],
    geometry: &GridGeometry,
    kernel: &KernelTable,
    width: f32,
) -> TapSet {
    let n = coords[0].len();
    let offsets = kernel_offsets(width);
    let k = offsets.len();
    let taps_per_sample = k * k * k;

    let min = geometry.min();
    let max = geometry.max();
    let [sx, sy, _] = geometry.strides();

    let ax = resolve_axis(coords[0], &offsets, min[0], max[0], kernel, width);
    let ay = resolve_axis(coords[1], &offsets, min[1], max[1], kernel, width);
    let az = resolve_axis(coords[2], &offsets, min[2], max[2], kernel, width);

    let mut indices = vec![0usize; n * taps_per_sample];
    let mut weights = vec![0f32; n * taps_per_sample];

    if taps_per_sample > 0 {
        indices
            .par_chunks_mut(taps_per_sample)
            .zip(weights.par_chunks_mut(taps_per_sample))
            .enumerate()
            .for_each(|(s, (idx, w))| {
                let base = s * k;
                let mut t = 0;
                for a in 0..k {
                    let (xi, xw) = (ax.local[base + a], ax.weight[base + a]);
                    for b in 0..k {
                        let (yi, yw) = (ay.local[base + b], ay.weight[base + b]);
                        let xy = xw * yw;
                        for c in 0..k {
                            idx[t] = xi * sx + yi * sy + az.local[base + c];
                            w[t] = xy * az.weight[base + c];
                            t += 1;
                        }
                    }
                }
            });
    }

    TapSet {
        taps_per_sample,
        indices,
        weights,
    }
}
