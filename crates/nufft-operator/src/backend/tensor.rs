//! Burn tensor backend.
//!
//! Tap resolution, gather and scatter are expressed as whole-batch tensor
//! operations so the same code runs on any burn device. Complex values are
//! carried as separate real and imaginary planes.

use std::marker::PhantomData;

use burn::tensor::backend::Backend;
use burn::tensor::{Int, Shape, Tensor, TensorData};
use nufft_core::error::{NufftError, Result};
use nufft_core::kernel::{kernel_offsets, KernelTable};
use num_complex::Complex32;

use super::{BackendKind, GriddingBackend, GriddingContext};

/// Gridding on a burn backend `B`.
#[derive(Debug, Clone)]
pub struct TensorBackend<B: Backend> {
    device: B::Device,
    kind: BackendKind,
    _b: PhantomData<B>,
}

/// Resolved taps of one batch, flattened to `n * taps` entries.
struct BatchTaps<B: Backend> {
    indices: Tensor<B, 1, Int>,
    weights: Tensor<B, 2>,
    taps: usize,
}

impl<B: Backend> TensorBackend<B> {
    /// Create a backend on `device`, reporting itself as `kind`.
    pub fn new(device: B::Device, kind: BackendKind) -> Self {
        Self {
            device,
            kind,
            _b: PhantomData,
        }
    }

    fn upload(&self, values: &[f32]) -> Tensor<B, 1> {
        Tensor::<B, 1>::from_data(TensorData::new(values.to_vec(), Shape::new([values.len()])), &self.device)
    }

    fn download<const D: usize>(tensor: Tensor<B, D>) -> Result<Vec<f32>> {
        tensor
            .into_data()
            .convert::<f32>()
            .to_vec::<f32>()
            .map_err(|e| NufftError::backend(format!("tensor download failed: {:?}", e)))
    }

    /// Per-axis local indices `[n, k]` and masked weights `[n, k]`.
    #[allow(clippy::too_many_arguments)]
    fn resolve_axis(
        &self,
        coords: &[f32],
        offsets: &Tensor<B, 2>,
        table: &Tensor<B, 2>,
        table_len: usize,
        lo: i64,
        hi: i64,
        width: f32,
    ) -> (Tensor<B, 2, Int>, Tensor<B, 2>) {
        let n = coords.len();
        let k = offsets.dims()[1];
        let shape = [n, k];

        let coord = self.upload(coords).reshape([n, 1]);
        let raw = coord.clone().round().expand(shape) + offsets.clone().expand(shape);

        // Table lookup with linear interpolation between paired entries.
        let last = (table_len - 1) as f32;
        let scale = width / last;
        let pos = (raw.clone() - coord.expand(shape)).abs().div_scalar(scale).clamp_max(last);
        let base = pos.clone().floor();
        let frac = (pos - base.clone()).reshape([n * k, 1]);
        let rows = table.clone().select(0, base.int().reshape([n * k]));
        let blend = Tensor::cat(vec![frac.clone().neg().add_scalar(1.0), frac], 1);
        let weight = (rows * blend).sum_dim(1).reshape([n, k]);

        // Clamp onto the grid, then compare with the raw index.
        let clipped = raw.clone().clamp(lo as f64, (hi - 1) as f64);
        let valid = clipped.clone().equal(raw).float();
        let local = clipped.sub_scalar(lo as f64).int();

        (local, weight * valid)
    }

    fn resolve(&self, coords: [&[f32]; 3], ctx: &GriddingContext<'_>) -> BatchTaps<B> {
        let n = coords[0].len();
        let offsets: Vec<f32> = kernel_offsets(ctx.width).iter().map(|&o| o as f32).collect();
        let k = offsets.len();
        let offsets = self.upload(&offsets).reshape([1, k]);
        let table = paired_table::<B>(ctx.kernel, &self.device);

        let min = ctx.geometry.min();
        let max = ctx.geometry.max();
        let [sx, sy, _] = ctx.geometry.strides();

        let (lx, wx) = self.resolve_axis(coords[0], &offsets, &table, ctx.kernel.len(), min[0], max[0], ctx.width);
        let (ly, wy) = self.resolve_axis(coords[1], &offsets, &table, ctx.kernel.len(), min[1], max[1], ctx.width);
        let (lz, wz) = self.resolve_axis(coords[2], &offsets, &table, ctx.kernel.len(), min[2], max[2], ctx.width);

        // Separable outer products over the three tap axes.
        let full = [n, k, k, k];
        let weights = wx.reshape([n, k, 1, 1]).expand(full)
            * wy.reshape([n, 1, k, 1]).expand(full)
            * wz.reshape([n, 1, 1, k]).expand(full);
        let indices = lx.mul_scalar(sx as i64).reshape([n, k, 1, 1]).expand(full)
            + ly.mul_scalar(sy as i64).reshape([n, 1, k, 1]).expand(full)
            + lz.reshape([n, 1, 1, k]).expand(full);

        let taps = k * k * k;
        BatchTaps {
            indices: indices.reshape([n * taps]),
            weights: weights.reshape([n, taps]),
            taps,
        }
    }

    fn planes(&self, values: &[Complex32], rows: usize, cols: usize) -> (Tensor<B, 2>, Tensor<B, 2>) {
        let re: Vec<f32> = values.iter().map(|v| v.re).collect();
        let im: Vec<f32> = values.iter().map(|v| v.im).collect();
        (
            self.upload(&re).reshape([rows, cols]),
            self.upload(&im).reshape([rows, cols]),
        )
    }
}

/// Two-column `[len, 2]` interpolation table on `device`.
fn paired_table<B: Backend>(kernel: &KernelTable, device: &B::Device) -> Tensor<B, 2> {
    let flat: Vec<f32> = kernel.pairs().iter().flat_map(|p| p.iter().copied()).collect();
    Tensor::<B, 1>::from_data(TensorData::new(flat, Shape::new([kernel.len() * 2])), device)
        .reshape([kernel.len(), 2])
}

impl<B: Backend> GriddingBackend for TensorBackend<B> {
    fn kind(&self) -> BackendKind {
        self.kind
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
        let batch = self.resolve(coords, ctx);
        let rows = n * batch.taps;

        let (grid_re, grid_im) = self.planes(grid, ctx.geometry.cells(), coils);
        let weights = batch.weights.reshape([rows, 1]).expand([rows, coils]);

        let sum = |plane: Tensor<B, 2>| -> Tensor<B, 1> {
            (plane.select(0, batch.indices.clone()) * weights.clone())
                .reshape([n, batch.taps, coils])
                .sum_dim(1)
                .reshape([n * coils])
        };
        let re = Self::download(sum(grid_re))?;
        let im = Self::download(sum(grid_im))?;

        for ((o, r), i) in out.iter_mut().zip(re).zip(im) {
            *o = Complex32::new(r, i);
        }
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
        let cells = ctx.geometry.cells();
        let batch = self.resolve(coords, ctx);
        let full = [n, batch.taps, coils];

        let (val_re, val_im) = self.planes(values, n, coils);
        let weights = batch.weights.reshape([n, batch.taps, 1]).expand(full);

        let accumulate = |plane: Tensor<B, 2>| -> Tensor<B, 2> {
            let contrib = (plane.reshape([n, 1, coils]).expand(full) * weights.clone())
                .reshape([n * batch.taps, coils]);
            Tensor::<B, 2>::zeros([cells, coils], &self.device).select_assign(0, batch.indices.clone(), contrib)
        };
        let re = Self::download(accumulate(val_re))?;
        let im = Self::download(accumulate(val_im))?;

        for ((g, r), i) in grid.iter_mut().zip(re).zip(im) {
            *g += Complex32::new(r, i);
        }
        Ok(())
    }
}
