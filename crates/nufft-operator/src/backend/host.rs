//! Rayon data-parallel host backend.
//!
//! Gather is embarrassingly parallel: every sample owns its output slots.
//! Scatter is a sort-and-segment reduction. Live taps are stably sorted by
//! grid cell, each run of equal cells is summed in parallel in tap order,
//! and the per-cell sums are committed serially. The result is independent
//! of the thread count.

use nufft_core::error::Result;
use nufft_core::resolver::resolve_taps;
use num_complex::Complex32;
use rayon::prelude::*;

use super::{BackendKind, GriddingBackend, GriddingContext};

/// Host backend on the global rayon pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostBackend;

impl HostBackend {
    pub fn new() -> Self {
        Self
    }
}

impl GriddingBackend for HostBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::HostParallel
    }

    fn gather(
        &self,
        coords: [&[f32]; 3],
        ctx: &GriddingContext<'_>,
        grid: &[Complex32],
        out: &mut [Complex32],
    ) -> Result<()> {
        let n = ctx.check_batch(coords, grid.len(), out.len())?;
        if n == 0 {
            return Ok(());
        }
        let coils = ctx.coils;
        let taps = resolve_taps(coords, ctx.geometry, ctx.kernel, ctx.width);

        out.par_chunks_mut(coils).enumerate().for_each(|(s, sample)| {
            let (indices, weights) = taps.sample(s);
            for (c, value) in sample.iter_mut().enumerate() {
                let mut acc = Complex32::new(0.0, 0.0);
                for (&cell, &w) in indices.iter().zip(weights) {
                    acc += grid[cell * coils + c] * w;
                }
                *value = acc;
            }
        });
        Ok(())
    }

    fn scatter(
        &self,
        coords: [&[f32]; 3],
        ctx: &GriddingContext<'_>,
        values: &[Complex32],
        grid: &mut [Complex32],
    ) -> Result<()> {
        let n = ctx.check_batch(coords, grid.len(), values.len())?;
        if n == 0 {
            return Ok(());
        }
        let coils = ctx.coils;
        let taps = resolve_taps(coords, ctx.geometry, ctx.kernel, ctx.width);
        let per_sample = taps.taps_per_sample();
        let weights = taps.weights();

        // (cell, tap position) for every tap that carries weight.
        let mut live: Vec<(usize, usize)> = taps
            .indices()
            .iter()
            .zip(weights)
            .enumerate()
            .filter(|(_, (_, &w))| w != 0.0)
            .map(|(t, (&cell, _))| (cell, t))
            .collect();
        if live.is_empty() {
            return Ok(());
        }
        live.par_sort_by_key(|&(cell, _)| cell);

        let mut bounds: Vec<usize> = (0..live.len())
            .filter(|&i| i == 0 || live[i].0 != live[i - 1].0)
            .collect();
        bounds.push(live.len());

        let mut sums = vec![Complex32::new(0.0, 0.0); (bounds.len() - 1) * coils];
        sums.par_chunks_mut(coils)
            .zip(bounds.par_windows(2))
            .for_each(|(acc, run)| {
                for &(_, t) in &live[run[0]..run[1]] {
                    let s = t / per_sample;
                    let w = weights[t];
                    for (c, a) in acc.iter_mut().enumerate() {
                        *a += values[s * coils + c] * w;
                    }
                }
            });

        for (run, acc) in bounds.windows(2).zip(sums.chunks(coils)) {
            let cell = live[run[0]].0;
            for (c, a) in acc.iter().enumerate() {
                grid[cell * coils + c] += *a;
            }
        }
        Ok(())
    }
}
