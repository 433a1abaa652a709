#[cfg(feature = "cli")]
pub mod cli;

#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use log::{Level, LevelFilter, Log, Metadata, Record};

/// Writes warnings and errors to stderr.
#[cfg(feature = "cli")]
struct StderrLogger;

#[cfg(feature = "cli")]
impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Warn
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("{}: {}", record.level().as_str().to_lowercase(), record.args());
        }
    }

    fn flush(&self) {}
}

#[cfg(feature = "cli")]
static LOGGER: StderrLogger = StderrLogger;

#[cfg(feature = "cli")]
pub fn run() -> Result<(), crate::error::AppError> {
    use crate::adapters::cli::{Args, parse_inputs, print_output};
    use crate::solver::CarbonateSolver;
    use crate::solver::system::solve_system;

    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Warn);
    }

    let args = Args::parse();
    let (input, options) = parse_inputs(&args)?;

    let conditions = input.conditions()?;
    let (par1, par2) = input.known()?;
    let solver = CarbonateSolver::new(&conditions).with_options(options);
    let system = solve_system(&solver, input.par1_type, &par1, input.par2_type, &par2)?;
    let components = if args.components {
        Some(solver.alkalinity_breakdown(&system.dic, &system.ph)?)
    } else {
        None
    };

    print_output(&system, components.as_ref(), &args)?;

    Ok(())
}
