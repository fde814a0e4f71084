//! Configuration and call-time failures reported by the solver
use abl_pressure_core::{
    create_pressure_solver, Decomposition, Field3d, FlowState, Grid, GridConfig, PressureConfig,
    PressureError, ProjectionFields, SerialCommunicator, SpatialOrder,
};
use std::sync::Arc;

#[test]
fn test_fourth_order_needs_four_levels() {
    let config = GridConfig {
        ktot: 3,
        ..GridConfig::default()
    };
    let err = Grid::new(&config, SpatialOrder::Fourth).unwrap_err();
    assert!(matches!(err, PressureError::InvalidConfig { parameter: "ktot", .. }));
    assert!(Grid::new(&config, SpatialOrder::Second).is_ok());
}

#[test]
fn test_non_positive_timestep_is_rejected() {
    let grid = Grid::new(&GridConfig::default(), SpatialOrder::Second).unwrap();
    let comm = Arc::new(SerialCommunicator::new(&grid));
    let mut solver = create_pressure_solver(grid.clone(), PressureConfig::default(), comm).unwrap();
    let mut state = FlowState::new(&grid);
    for dt in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        let err = solver.solve(&mut state.projection_fields(), dt).unwrap_err();
        assert!(matches!(err, PressureError::InvalidConfig { parameter: "dt", .. }));
    }
}

#[test]
fn test_mismatched_field_is_rejected() {
    let grid = Grid::new(&GridConfig::default(), SpatialOrder::Fourth).unwrap();
    let other = Grid::new(&GridConfig::default(), SpatialOrder::Second).unwrap();
    let comm = Arc::new(SerialCommunicator::new(&grid));
    let mut solver = create_pressure_solver(grid.clone(), PressureConfig::default(), comm).unwrap();

    let mut state = FlowState::new(&grid);
    let mut p = Field3d::new(&other);
    let mut fields = ProjectionFields {
        p: &mut p,
        ..state.projection_fields()
    };
    let err = solver.solve(&mut fields, 1.0).unwrap_err();
    assert!(matches!(err, PressureError::FieldShape { field: "p", .. }));
}

#[test]
fn test_zero_tile_width_is_rejected() {
    let grid = Grid::new(&GridConfig::default(), SpatialOrder::Second).unwrap();
    let comm = Arc::new(SerialCommunicator::new(&grid));
    let config = PressureConfig {
        tile_width: 0,
        ..PressureConfig::default()
    };
    let err = create_pressure_solver(grid, config, comm).err().unwrap();
    assert!(matches!(err, PressureError::InvalidConfig { parameter: "tile_width", .. }));
}

#[test]
fn test_communicator_must_match_grid() {
    let grid = Grid::new(&GridConfig::default(), SpatialOrder::Second).unwrap();
    let config = GridConfig {
        itot: 16,
        ..GridConfig::default()
    };
    let wider = Grid::new(&config, SpatialOrder::Second).unwrap();
    let comm = Arc::new(SerialCommunicator::new(&wider));
    let err = create_pressure_solver(grid, PressureConfig::default(), comm).err().unwrap();
    assert!(matches!(err, PressureError::InvalidConfig { parameter: "communicator", .. }));
}

#[test]
fn test_reinitialize_follows_new_geometry() {
    let grid = Grid::new(&GridConfig::default(), SpatialOrder::Second).unwrap();
    let comm = Arc::new(SerialCommunicator::new(&grid));
    let mut solver = create_pressure_solver(grid, PressureConfig::default(), comm).unwrap();

    // Same extents, taller domain
    let taller = GridConfig {
        zsize: 4.0,
        ..GridConfig::default()
    };
    let grid = Grid::new(&taller, SpatialOrder::Second).unwrap();
    solver.reinitialize(grid.clone()).unwrap();
    assert_eq!(solver.grid().zsize, 4.0);
    assert_eq!(solver.spatial_order(), SpatialOrder::Second);

    let mut state = FlowState::new(&grid);
    state.wt.fill_interior_with(|i, _, k| if k == 0 { 0.0 } else { i as f64 });
    solver.solve(&mut state.projection_fields(), 1.0).unwrap();

    let fourth = Grid::new(&taller, SpatialOrder::Fourth).unwrap();
    assert!(solver.reinitialize(fourth).is_err());
}

#[test]
fn test_decomposition_must_divide_extents() {
    let err = Decomposition::new((8, 8, 8), (3, 1), (0, 0)).unwrap_err();
    assert!(matches!(err, PressureError::InvalidConfig { .. }));

    let decomposition = Decomposition::new((8, 8, 8), (2, 2), (1, 0)).unwrap();
    let grid =
        Grid::decomposed(&GridConfig::default(), SpatialOrder::Second, &decomposition).unwrap();
    assert_eq!((grid.imax, grid.jmax), (4, 4));
    assert_eq!(grid.cells(), (6, 6, 10));
}
