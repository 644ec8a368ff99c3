mod common;

use nufft_core::kernel::KernelTable;
use nufft_operator::{
    GridGeometry, GriddingContext, Gridder, HostBackend, NonUniformData, NufftConfig, NufftOperator, Trajectory,
};
use num_complex::Complex32;

#[test]
fn test_sample_beyond_support_contributes_nothing() {
    let geometry = GridGeometry::new([-4, -4, -4], [4, 4, 4]).unwrap();
    let width = 3.0;
    // Last cell on x is 3; this sample sits width + 1 cells beyond it.
    let traj = Trajectory::from_points(&[[3.0 + width + 1.0, 0.0, 0.0]]).unwrap();

    let ctx = GriddingContext {
        geometry: &geometry,
        kernel: KernelTable::kaiser_bessel(),
        width,
        coils: 1,
    };
    let gridder = Gridder::new(Box::new(HostBackend::new()), 8).unwrap();
    let mut grid = vec![Complex32::new(0.0, 0.0); geometry.cells()];
    gridder
        .scatter_frame(&traj.frame(0), &ctx, &[Complex32::new(1.0, 1.0)], &mut grid)
        .unwrap();
    assert!(grid.iter().all(|v| *v == Complex32::new(0.0, 0.0)));

    let op = NufftOperator::new(traj, NufftConfig::new().with_grid(geometry).with_width(width)).unwrap();
    let image = op.adjoint(&NonUniformData::from_elem((1, 1, 1), Complex32::new(1.0, 0.0))).unwrap();
    assert!(image.iter().all(|v| v.norm() == 0.0));
}

#[test]
fn test_sample_near_edge_keeps_inner_taps() {
    let geometry = GridGeometry::new([-4, -4, -4], [4, 4, 4]).unwrap();
    let traj = Trajectory::from_points(&[[3.4, 0.0, 0.0]]).unwrap();
    let ctx = GriddingContext {
        geometry: &geometry,
        kernel: KernelTable::kaiser_bessel(),
        width: 2.0,
        coils: 1,
    };
    let gridder = Gridder::new(Box::new(HostBackend::new()), 8).unwrap();
    let mut grid = vec![Complex32::new(0.0, 0.0); geometry.cells()];
    gridder
        .scatter_frame(&traj.frame(0), &ctx, &[Complex32::new(1.0, 0.0)], &mut grid)
        .unwrap();

    // Taps at x = 1, 2, 3 land inside; x = 4, 5 are clipped away, never wrapped.
    let [ox, oy, oz] = geometry.origin();
    let table = KernelTable::kaiser_bessel();
    for x in 0..8usize {
        let value = grid[geometry.linear_index([x, oy, oz])].re;
        let coord = x as f32 - ox as f32;
        if (1.0..=3.0).contains(&coord) {
            let expected = table.weight((coord - 3.4).abs(), 2.0) * table.weight(0.0, 2.0).powi(2);
            assert!((value - expected).abs() < 1e-6, "x {} got {}", coord, value);
        } else {
            assert_eq!(value, 0.0, "x {} should be empty", coord);
        }
    }
}

#[test]
fn test_far_sample_is_clipped_on_every_path() {
    let geometry = GridGeometry::new([-4, -4, -4], [4, 4, 4]).unwrap();
    let traj = Trajectory::from_points(&[[1e30, 0.0, 0.0], [0.0, -1e20, 0.0], [0.0, 0.0, 0.0]]).unwrap();
    let op = NufftOperator::new(traj, NufftConfig::new().with_grid(geometry).with_width(3.0)).unwrap();

    let forward = op.forward(&common::random_image(op.cartesian_shape(), 4)).unwrap();
    assert_eq!(forward[[0, 0, 0]], Complex32::new(0.0, 0.0));
    assert_eq!(forward[[1, 0, 0]], Complex32::new(0.0, 0.0));
    assert!(forward[[2, 0, 0]].norm() > 0.0);

    let mut data = NonUniformData::zeros((3, 1, 1));
    data[[0, 0, 0]] = Complex32::new(1.0, 0.0);
    data[[1, 0, 0]] = Complex32::new(0.0, 1.0);
    let image = op.adjoint(&data).unwrap();
    assert!(image.iter().all(|v| v.norm() == 0.0));
}
