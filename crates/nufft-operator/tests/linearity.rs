mod common;

use num_complex::Complex32;
use nufft_operator::{GridGeometry, NufftConfig, NufftOperator};
use proptest::prelude::*;

use common::{inner, max_diff, max_norm, random_image, random_samples, random_trajectory};

fn operator(width: f32, coils: usize, frames: usize, seed: u64) -> NufftOperator {
    let geometry = GridGeometry::new([-5, -4, -3], [5, 4, 3]).unwrap();
    let traj = random_trajectory(60, frames, 4.5, seed);
    let config = NufftConfig::new()
        .with_grid(geometry)
        .with_width(width)
        .with_coils(coils)
        .with_segment_size(17);
    NufftOperator::new(traj, config).unwrap()
}

#[test]
fn test_forward_adjoint_are_adjoint() {
    let op = operator(3.0, 2, 2, 3);
    let x = random_image(op.cartesian_shape(), 21);
    let y = random_samples(op.non_uniform_shape(), 22);

    let ax = op.forward(&x).unwrap();
    let ahy = op.adjoint(&y).unwrap();

    let lhs = inner(ax.iter(), y.iter());
    let rhs = inner(x.iter(), ahy.iter());
    let scale = lhs.0.hypot(lhs.1).max(1e-3);
    assert!(((lhs.0 - rhs.0).hypot(lhs.1 - rhs.1)) / scale < 1e-4, "{:?} vs {:?}", lhs, rhs);
}

#[test]
fn test_normal_without_psf_is_adjoint_of_forward() {
    let op = operator(2.0, 1, 1, 5);
    let x = random_image(op.cartesian_shape(), 9);
    let direct = op.adjoint(&op.forward(&x).unwrap()).unwrap();
    let normal = op.normal(&x).unwrap();
    assert_eq!(direct, normal);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn test_forward_is_linear(
        ar in -2.0f32..2.0, ai in -2.0f32..2.0,
        br in -2.0f32..2.0, bi in -2.0f32..2.0,
        seed in 0u64..1000,
    ) {
        let op = operator(2.5, 2, 1, 17);
        let (a, b) = (Complex32::new(ar, ai), Complex32::new(br, bi));
        let x = random_image(op.cartesian_shape(), seed);
        let y = random_image(op.cartesian_shape(), seed + 1);

        let combined = op.forward(&(x.mapv(|v| v * a) + y.mapv(|v| v * b))).unwrap();
        let separate = op.forward(&x).unwrap().mapv(|v| v * a) + op.forward(&y).unwrap().mapv(|v| v * b);

        let tol = 1e-4 * max_norm(separate.iter()).max(1.0);
        prop_assert!(max_diff(combined.iter(), separate.iter()) < tol);
    }

    #[test]
    fn test_adjoint_is_linear(a in -3.0f32..3.0, seed in 0u64..1000) {
        let op = operator(3.0, 1, 2, 29);
        let y = random_samples(op.non_uniform_shape(), seed);
        let z = random_samples(op.non_uniform_shape(), seed + 7);

        let combined = op.adjoint(&(y.mapv(|v| v * a) + &z)).unwrap();
        let separate = op.adjoint(&y).unwrap().mapv(|v| v * a) + op.adjoint(&z).unwrap();

        let tol = 1e-4 * max_norm(separate.iter()).max(1.0);
        prop_assert!(max_diff(combined.iter(), separate.iter()) < tol);
    }
}
