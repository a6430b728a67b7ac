//! Command-line entry point for the SPMD solver.
//!
//! Under the `mpi` feature the binary expects to be launched as a fixed-size
//! process group (`mpirun -n 4 parcg [SPLIT_FACTOR]`); otherwise it spins up
//! an in-process thread group of `--workers` ranks and runs the identical
//! SPMD code path over it.

use clap::Parser;
use log::{LevelFilter, error};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use parcg::config::{DEFAULT_EPSILON, DEFAULT_MATRIX_SIZE, SolverOptions};
use parcg::context::{RunReport, print_report, solve_distributed};
use parcg::error::SolverError;

#[derive(Parser, Debug)]
#[command(name = "parcg")]
#[command(about = "Distributed conjugate-gradient solver for dense SPD systems")]
#[command(version)]
struct Cli {
    /// Row-partition count; defaults to the process-group size.
    split_factor: Option<usize>,

    /// Matrix dimension n.
    #[arg(long, default_value_t = DEFAULT_MATRIX_SIZE)]
    matrix_size: usize,

    /// Relative residual tolerance.
    #[arg(long, default_value_t = DEFAULT_EPSILON)]
    epsilon: f64,

    /// Rank count for the in-process thread backend (ignored under MPI).
    #[arg(long, default_value_t = 4)]
    workers: usize,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    let level = if cli.verbose { LevelFilter::Debug } else { LevelFilter::Info };
    TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto).ok();

    let options = SolverOptions {
        matrix_size: cli.matrix_size,
        split_factor: cli.split_factor,
        epsilon: cli.epsilon,
        max_iters: None,
    };

    match run(&cli, &options) {
        Ok(Some(report)) => print_report(&report),
        Ok(None) => {} // non-coordinator rank, nothing to report
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    }
}

#[cfg(feature = "mpi")]
fn run(_cli: &Cli, options: &SolverOptions) -> Result<Option<RunReport>, SolverError> {
    use parcg::context::COORDINATOR;
    use parcg::parallel::{Comm, MpiComm};

    let comm = MpiComm::new();
    let report = solve_distributed(&comm, options)?;
    Ok((comm.rank() == COORDINATOR).then_some(report))
}

#[cfg(not(feature = "mpi"))]
fn run(cli: &Cli, options: &SolverOptions) -> Result<Option<RunReport>, SolverError> {
    use parcg::parallel::ThreadComm;

    if cli.workers == 0 {
        return Err(SolverError::Config("worker count must be positive".into()));
    }
    let mut comms = ThreadComm::group(cli.workers).into_iter();
    let coordinator = comms
        .next()
        .ok_or_else(|| SolverError::Config("empty process group".into()))?;
    let handles: Vec<_> = comms
        .map(|comm| {
            let options = options.clone();
            std::thread::spawn(move || solve_distributed(&comm, &options).map(drop))
        })
        .collect();

    let report = solve_distributed(&coordinator, options);
    for handle in handles {
        handle
            .join()
            .map_err(|_| SolverError::WorkerFailed("worker thread panicked".into()))??;
    }
    Ok(Some(report?))
}
