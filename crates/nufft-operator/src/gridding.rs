//! Batch/phase scheduler.
//!
//! Frames are processed one at a time and the samples of a frame are cut
//! into fixed-size segments so the per-batch tap arrays stay bounded. The
//! segmentation never changes which taps contribute, only how many are
//! materialised at once.

use std::ops::Range;
use std::time::Instant;

use nufft_core::error::{NufftError, Result};
use nufft_core::trajectory::FrameCoords;
use num_complex::Complex32;

use crate::backend::{BackendKind, GriddingBackend, GriddingContext};

/// Iterator over `[i * segment, min((i + 1) * segment, samples))`.
///
/// Never yields an empty range.
#[derive(Debug, Clone)]
pub struct Segments {
    next: usize,
    samples: usize,
    segment: usize,
}

impl Segments {
    pub fn new(samples: usize, segment: usize) -> Self {
        Self {
            next: 0,
            samples,
            segment: segment.max(1),
        }
    }
}

impl Iterator for Segments {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Range<usize>> {
        if self.next >= self.samples {
            return None;
        }
        let start = self.next;
        let end = (start + self.segment).min(self.samples);
        self.next = end;
        Some(start..end)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.samples - self.next.min(self.samples)).div_ceil(self.segment);
        (left, Some(left))
    }
}

impl ExactSizeIterator for Segments {}

/// Drives a backend segment by segment over one frame.
pub struct Gridder {
    backend: Box<dyn GriddingBackend>,
    segment_size: usize,
}

impl Gridder {
    /// Create a scheduler around `backend`.
    ///
    /// # Errors
    /// `InvalidConfiguration` if `segment_size` is zero.
    pub fn new(backend: Box<dyn GriddingBackend>, segment_size: usize) -> Result<Self> {
        if segment_size == 0 {
            return Err(NufftError::invalid_configuration("segment size must be positive"));
        }
        Ok(Self {
            backend,
            segment_size,
        })
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    pub fn segment_size(&self) -> usize {
        self.segment_size
    }

    /// Gather a full frame: `out` is `[samples, coils]`, `grid` is `[cells, coils]`.
    pub fn gather_frame(
        &self,
        frame: &FrameCoords,
        ctx: &GriddingContext<'_>,
        grid: &[Complex32],
        out: &mut [Complex32],
    ) -> Result<()> {
        let samples = frame.len();
        if out.len() != samples * ctx.coils {
            return Err(NufftError::shape_mismatch(&[samples, ctx.coils], &[out.len()]));
        }
        let start = Instant::now();
        for (i, range) in Segments::new(samples, self.segment_size).enumerate() {
            let slots = range.start * ctx.coils..range.end * ctx.coils;
            self.backend.gather(frame.batch(range.clone()), ctx, grid, &mut out[slots])?;
            tracing::debug!(
                "Gather batch {} ({} samples): {:.3} ms",
                i,
                range.len(),
                start.elapsed().as_secs_f64() * 1e3
            );
        }
        Ok(())
    }

    /// Scatter-add a full frame: `values` is `[samples, coils]`, `grid` is `[cells, coils]`.
    pub fn scatter_frame(
        &self,
        frame: &FrameCoords,
        ctx: &GriddingContext<'_>,
        values: &[Complex32],
        grid: &mut [Complex32],
    ) -> Result<()> {
        let samples = frame.len();
        if values.len() != samples * ctx.coils {
            return Err(NufftError::shape_mismatch(&[samples, ctx.coils], &[values.len()]));
        }
        let start = Instant::now();
        for (i, range) in Segments::new(samples, self.segment_size).enumerate() {
            let slots = range.start * ctx.coils..range.end * ctx.coils;
            self.backend.scatter(frame.batch(range.clone()), ctx, &values[slots], grid)?;
            tracing::debug!(
                "Scatter batch {} ({} samples): {:.3} ms",
                i,
                range.len(),
                start.elapsed().as_secs_f64() * 1e3
            );
        }
        Ok(())
    }
}

impl std::fmt::Debug for Gridder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gridder")
            .field("backend", &self.backend.kind())
            .field("segment_size", &self.segment_size)
            .finish()
    }
}
