//! CLI command implementations.
//!
//! Standard output is part of the file contract (`mult` and `gen`
//! print matrices), so diagnostics go to stderr or through `tracing`.

use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use polyflow_io::text;
use polyflow_math::SvdMode;
use polyflow_steps::{compare, decompose, descent, generate, recompose, Descent, FlowConfig};
use polyflow_telemetry::sinks::{JsonLinesSink, TracingSink};
use polyflow_telemetry::EventBus;
use polyflow_types::FlowResult;

/// Options shared by every subcommand.
pub struct GlobalOptions {
    pub workdir: PathBuf,
    pub config: Option<PathBuf>,
    pub events: Option<PathBuf>,
    pub verbose: bool,
}

impl GlobalOptions {
    fn load_config(&self) -> FlowResult<FlowConfig> {
        match &self.config {
            Some(path) => FlowConfig::load(path),
            None => Ok(FlowConfig::default()),
        }
    }

    fn event_bus(&self) -> FlowResult<EventBus> {
        let mut bus = EventBus::new();
        if self.verbose {
            bus.add_sink(Box::new(TracingSink::new(tracing::Level::INFO)));
        }
        if let Some(path) = &self.events {
            let sink = JsonLinesSink::open(path)
                .map_err(|e| polyflow_types::FlowError::file(path, e))?;
            bus.add_sink(Box::new(sink));
        }
        bus.set_enabled(bus.sink_count() > 0);
        Ok(bus)
    }
}

/// Runs `step` with a fresh bus and always drains the bus afterwards,
/// so failed steps still report what they saw.
fn with_bus<T>(
    opts: &GlobalOptions,
    step: impl FnOnce(&EventBus) -> FlowResult<T>,
) -> FlowResult<T> {
    let mut bus = opts.event_bus()?;
    let result = step(&bus);
    bus.finish();
    result
}

/// Decompose stdin into the factor files.
pub fn svd(opts: &GlobalOptions, thin: bool) -> FlowResult<()> {
    let config = opts.load_config()?;
    let ws = config.workspace(&opts.workdir);
    let mode = if thin { SvdMode::Thin } else { config.svd_mode };
    let stdin = io::stdin();
    with_bus(opts, |bus| decompose::run(stdin.lock(), &ws, mode, bus))?;
    Ok(())
}

/// Print the product of the factor files.
pub fn mult(opts: &GlobalOptions) -> FlowResult<()> {
    let config = opts.load_config()?;
    let ws = config.workspace(&opts.workdir);
    let stdout = io::stdout();
    with_bus(opts, |bus| recompose::run(&ws, BufWriter::new(stdout.lock()), bus))?;
    Ok(())
}

/// Compare `matrix_in` against `matrix_out`. Silent on success.
pub fn cmp(opts: &GlobalOptions) -> FlowResult<()> {
    let config = opts.load_config()?;
    let ws = config.workspace(&opts.workdir);
    let norm = with_bus(opts, |bus| compare::run(&ws, config.compare_tolerance, bus))?;
    tracing::debug!(norm, tolerance = config.compare_tolerance, "matrices match");
    Ok(())
}

/// One gradient-descent step.
pub fn subtract(opts: &GlobalOptions) -> FlowResult<()> {
    let config = opts.load_config()?;
    let ws = config.workspace(&opts.workdir);
    let step = with_bus(opts, |bus| {
        descent::run(&ws, config.grad_threshold, config.learning_rate, bus)
    })?;
    match step {
        Descent::Continue { old, new } => tracing::debug!(old, new, "descent continues"),
        Descent::Converged { value } => tracing::debug!(value, "descent converged"),
    }
    Ok(())
}

/// Print a random n×n matrix.
pub fn gen_matrix(opts: &GlobalOptions, n: usize, seed: Option<u64>) -> FlowResult<()> {
    let stdout = io::stdout();
    with_bus(opts, |bus| generate::run(n, seed, BufWriter::new(stdout.lock()), bus))?;
    Ok(())
}

/// Validate a config or matrix file.
pub fn validate(path: &Path) -> FlowResult<()> {
    println!("polyflow Validator");
    println!("──────────────────");
    println!();

    if path.extension().is_some_and(|ext| ext == "toml") {
        println!("Validating config: {}", path.display());
        let config = FlowConfig::load(path)?;
        println!(
            "✅ Config is valid (tolerance {:e}, threshold {:e}, learning rate {}).",
            config.compare_tolerance, config.grad_threshold, config.learning_rate
        );
    } else {
        println!("Validating matrix: {}", path.display());
        let content =
            std::fs::read_to_string(path).map_err(|e| polyflow_types::FlowError::file(path, e))?;
        let m = text::parse_matrix(&content)?;
        println!("✅ Matrix is valid ({}x{}).", m.rows(), m.cols());
    }
    Ok(())
}
