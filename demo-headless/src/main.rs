use abl_pressure_core::{
    create_pressure_solver, Field3d, FlowState, Grid, GridConfig, PressureConfig, PressureError,
    PressureResult, ProfilerScope, SerialCommunicator, SpatialOrder,
};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

/// Pressure projection demo with configurable grid and stencil
#[derive(Parser, Debug)]
#[command(name = "abl-pressure-demo")]
#[command(about = "Repeated pressure projections of random tendency fields", long_about = None)]
struct Args {
    /// Cells in x
    #[arg(long, default_value_t = 32)]
    itot: usize,

    /// Cells in y (1 runs the 2-D solver)
    #[arg(long, default_value_t = 32)]
    jtot: usize,

    /// Cells in z
    #[arg(long, default_value_t = 32)]
    ktot: usize,

    /// Domain length in x (m)
    #[arg(long, default_value_t = 3200.0)]
    xsize: f64,

    /// Domain length in y (m)
    #[arg(long, default_value_t = 3200.0)]
    ysize: f64,

    /// Domain height (m)
    #[arg(long, default_value_t = 1600.0)]
    zsize: f64,

    /// Vertical grid stretching factor between neighbouring cells (1 = uniform)
    #[arg(long, default_value_t = 1.0)]
    stretch: f64,

    /// Spatial order of the stencils (2 or 4)
    #[arg(short, long, default_value_t = 2)]
    order: u8,

    /// Timestep in seconds
    #[arg(long, default_value_t = 1.0)]
    dt: f64,

    /// Number of projections to run
    #[arg(short, long, default_value_t = 10)]
    steps: usize,

    /// Seed for the random tendencies
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Spectral columns per vertical-solve tile
    #[arg(long, default_value_t = 8)]
    tile_width: usize,

    /// Log the divergence from inside the solver after every solve
    #[arg(long)]
    report: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("Projection failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> PressureResult<()> {
    let order = match args.order {
        2 => SpatialOrder::Second,
        4 => SpatialOrder::Fourth,
        other => {
            return Err(PressureError::invalid_config(
                "order",
                other,
                "only 2nd and 4th order stencils are available",
            ))
        }
    };

    let config = GridConfig {
        itot: args.itot,
        jtot: args.jtot,
        ktot: args.ktot,
        xsize: args.xsize,
        ysize: args.ysize,
        zsize: args.zsize,
        z: stretched_heights(args.ktot, args.zsize, args.stretch),
    };
    let grid = Grid::new(&config, order)?;
    let comm = Arc::new(SerialCommunicator::new(&grid));
    let solver_config = PressureConfig {
        tile_width: args.tile_width,
        report_divergence: args.report,
    };
    let mut solver = create_pressure_solver(grid.clone(), solver_config, comm.clone())?;

    println!("=== Pressure Projection Demo ===\n");
    println!(
        "Grid: {}x{}x{} cells, {:.0}x{:.0}x{:.0} m, {}",
        grid.itot, grid.jtot, grid.ktot, grid.xsize, grid.ysize, grid.zsize, order
    );
    println!(
        "Vertical spacing: {:.2} m at the bottom, {:.2} m at the top\n",
        grid.dz[grid.kstart],
        grid.dz[grid.kend - 1]
    );

    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut state = FlowState::new(&grid);
    randomize(&mut state, &mut rng, true);
    state.refresh_ghosts(comm.as_ref(), order)?;
    let initial = solver.check_divergence(&state.velocity_fields())?;
    info!("Initial maximum divergence: {initial:.6e}");

    println!("Step | Div before (1/s) | Div after (1/s) | max |p|     | Time (ms)");
    println!("-----|------------------|-----------------|-------------|----------");

    let mut total_ms = 0.0;
    for step in 1..=args.steps {
        randomize(&mut state, &mut rng, false);

        // Divergence the tendencies alone would produce over one step
        let mut provisional = state.clone();
        provisional.advance(args.dt);
        provisional.refresh_ghosts(comm.as_ref(), order)?;
        let before = solver.check_divergence(&provisional.velocity_fields())?;

        let scope = ProfilerScope::new("demo step");
        solver.solve(&mut state.projection_fields(), args.dt)?;
        let elapsed = scope.elapsed_ms();
        total_ms += elapsed;

        state.advance(args.dt);
        state.refresh_ghosts(comm.as_ref(), order)?;
        let after = solver.check_divergence(&state.velocity_fields())?;

        println!(
            "{:4} | {:16.6e} | {:15.6e} | {:11.4e} | {:9.3}",
            step,
            before,
            after,
            state.p.interior_max_abs(),
            elapsed
        );
    }

    if args.steps > 0 {
        println!(
            "\nAverage solve time: {:.3} ms over {} steps",
            total_ms / args.steps as f64,
            args.steps
        );
    }
    Ok(())
}

/// Cell-centre heights growing by `stretch` per level, or `None` for a uniform grid
fn stretched_heights(ktot: usize, zsize: f64, stretch: f64) -> Option<Vec<f64>> {
    if (stretch - 1.0).abs() < f64::EPSILON || ktot == 0 {
        return None;
    }
    let mut faces = Vec::with_capacity(ktot + 1);
    faces.push(0.0);
    let mut dz = 1.0;
    for k in 0..ktot {
        faces.push(faces[k] + dz);
        dz *= stretch;
    }
    let scale = zsize / faces[ktot];
    Some(
        faces
            .windows(2)
            .map(|f| 0.5 * (f[0] + f[1]) * scale)
            .collect(),
    )
}

/// Fill the tendencies with noise, and the velocities too when `velocities` is set
///
/// The vertical components stay zero on the bottom wall.
fn randomize(state: &mut FlowState, rng: &mut StdRng, velocities: bool) {
    let mut noise = |field: &mut Field3d, wall: bool| {
        field.fill_interior_with(|_, _, k| {
            if wall && k == 0 {
                0.0
            } else {
                rng.random_range(-1.0..1.0)
            }
        });
    };
    noise(&mut state.ut, false);
    noise(&mut state.vt, false);
    noise(&mut state.wt, true);
    if velocities {
        noise(&mut state.u, false);
        noise(&mut state.v, false);
        noise(&mut state.w, true);
    }
}
