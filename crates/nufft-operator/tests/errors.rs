use ndarray::Array3;
use nufft_operator::{
    BackendKind, CartesianData, GridGeometry, NonUniformData, NufftConfig, NufftError, NufftOperator, Trajectory,
};

fn trajectory() -> Trajectory {
    Trajectory::from_points(&[[0.5, -1.0, 2.0], [1.5, 0.0, -2.0]]).unwrap()
}

#[test]
fn test_degenerate_explicit_grid() {
    let err = GridGeometry::new([-4, 2, -4], [4, 2, 4]).unwrap_err();
    assert!(matches!(err, NufftError::DegenerateGeometry(_)));
}

#[test]
fn test_degenerate_estimated_grid() {
    let traj = Trajectory::new(Array3::zeros((3, 5, 1))).unwrap();
    let err = NufftOperator::new(traj, NufftConfig::new()).unwrap_err();
    assert!(matches!(err, NufftError::DegenerateGeometry(_)));
}

#[test]
fn test_invalid_configuration() {
    let err = NufftOperator::new(trajectory(), NufftConfig::new().with_width(-1.0)).unwrap_err();
    assert!(matches!(err, NufftError::InvalidConfiguration(_)));
}

#[cfg(not(feature = "wgpu"))]
#[test]
fn test_accelerated_backend_unavailable() {
    let config = NufftConfig::new().with_backend(BackendKind::Accelerated);
    let err = NufftOperator::new(trajectory(), config).unwrap_err();
    assert!(matches!(err, NufftError::Unsupported(_)));
}

#[test]
fn test_shape_mismatch_reports_shapes() {
    let op = NufftOperator::new(trajectory(), NufftConfig::new().with_coils(2)).unwrap();
    let [nx, ny, nz, _, _] = op.cartesian_shape();
    let err = op.forward(&CartesianData::zeros((nx, ny, nz, 1, 1))).unwrap_err();
    match err {
        NufftError::ShapeMismatch { expected, actual } => {
            assert_eq!(expected, vec![nx, ny, nz, 2, 1]);
            assert_eq!(actual, vec![nx, ny, nz, 1, 1]);
        }
        other => panic!("unexpected error: {}", other),
    }

    assert!(op.adjoint(&NonUniformData::zeros((2, 1, 1))).is_err());
    assert!(op.normal(&CartesianData::zeros((nx, ny, nz, 1, 1))).is_err());
}

#[test]
fn test_density_estimation_not_provided() {
    let op = NufftOperator::new(trajectory(), NufftConfig::new()).unwrap();
    assert!(matches!(op.density_estimate(), Err(NufftError::Unsupported(_))));
}
