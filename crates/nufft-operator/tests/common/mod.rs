#![allow(dead_code)]

use ndarray::Array3;
use nufft_operator::{CartesianData, NonUniformData, Trajectory};
use num_complex::Complex32;

/// Deterministic values in `[-1, 1)`.
pub fn noise(n: usize, seed: u64) -> Vec<f32> {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    (0..n)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((state >> 40) as f32 / (1u64 << 24) as f32) * 2.0 - 1.0
        })
        .collect()
}

pub fn random_image(shape: [usize; 5], seed: u64) -> CartesianData {
    let n: usize = shape.iter().product();
    let re = noise(n, seed);
    let im = noise(n, seed ^ 0x9e37_79b9);
    let values: Vec<Complex32> = re.into_iter().zip(im).map(|(r, i)| Complex32::new(r, i)).collect();
    CartesianData::from_shape_vec(shape, values).unwrap()
}

pub fn random_samples(shape: [usize; 3], seed: u64) -> NonUniformData {
    let n: usize = shape.iter().product();
    let re = noise(n, seed);
    let im = noise(n, seed ^ 0x51ed_270b);
    let values: Vec<Complex32> = re.into_iter().zip(im).map(|(r, i)| Complex32::new(r, i)).collect();
    NonUniformData::from_shape_vec(shape, values).unwrap()
}

/// Trajectory of `samples` points per frame, each axis uniform in `[-extent, extent)`.
pub fn random_trajectory(samples: usize, frames: usize, extent: f32, seed: u64) -> Trajectory {
    let values: Vec<f32> = noise(3 * samples * frames, seed).into_iter().map(|v| v * extent).collect();
    Trajectory::new(Array3::from_shape_vec((3, samples, frames), values).unwrap()).unwrap()
}

/// Trajectory of integer points, each axis in `[lo, hi]`.
pub fn integer_trajectory(samples: usize, lo: i32, hi: i32, seed: u64) -> Trajectory {
    let span = (hi - lo + 1) as f32;
    let values: Vec<f32> = noise(3 * samples, seed)
        .into_iter()
        .map(|v| {
            let t = ((v + 1.0) * 0.5 * span).floor().min(span - 1.0);
            lo as f32 + t
        })
        .collect();
    Trajectory::new(Array3::from_shape_vec((3, samples, 1), values).unwrap()).unwrap()
}

/// `sum conj(a) * b` accumulated in double precision.
pub fn inner<'a>(
    a: impl IntoIterator<Item = &'a Complex32>,
    b: impl IntoIterator<Item = &'a Complex32>,
) -> (f64, f64) {
    a.into_iter().zip(b).fold((0.0, 0.0), |(re, im), (x, y)| {
        let p = x.conj() * y;
        (re + p.re as f64, im + p.im as f64)
    })
}

pub fn max_norm<'a>(a: impl IntoIterator<Item = &'a Complex32>) -> f32 {
    a.into_iter().map(|v| v.norm()).fold(0.0, f32::max)
}

pub fn max_diff<'a>(
    a: impl IntoIterator<Item = &'a Complex32>,
    b: impl IntoIterator<Item = &'a Complex32>,
) -> f32 {
    a.into_iter().zip(b).map(|(x, y)| (x - y).norm()).fold(0.0, f32::max)
}
