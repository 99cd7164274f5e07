//! Broad-phase Demo
//!
//! Runs a headless rigid-body simulation and reports how many candidate pairs
//! the quadtree proposes compared with testing every pair.
//!
//! Usage: `broadphase_demo [CONFIG_PATH]` where the optional path points to a
//! `.toml` or `.ron` simulation config. Set `RUST_LOG=debug` for per-step
//! output.

use std::path::PathBuf;
use std::time::Instant;

use log::{info, warn};
use rigid_engine::foundation::logging;
use rigid_engine::prelude::*;
use thiserror::Error;

/// Demo application errors
#[derive(Error, Debug)]
enum AppError {
    #[error("Failed to load configuration from {path:?}: {source}")]
    Config {
        path: PathBuf,
        source: ConfigError,
    },

    #[error(transparent)]
    Simulation(#[from] SimulationError),
}

/// Totals accumulated over the whole run
#[derive(Debug, Default)]
struct RunSummary {
    steps: u64,
    candidate_pairs: usize,
    contacts: usize,
    entered: usize,
    clamped: usize,
}

impl RunSummary {
    fn record(&mut self, report: &StepReport) {
        self.steps += 1;
        self.candidate_pairs += report.candidate_pairs;
        self.contacts += report.contacts;
        self.entered += report.entered;
        self.clamped += report.clamped;
    }
}

fn load_config() -> Result<SimulationConfig, AppError> {
    match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            SimulationConfig::load_from_file(&path).map_err(|source| AppError::Config { path, source })
        }
        None => {
            info!("No configuration given, using defaults");
            Ok(SimulationConfig::default())
        }
    }
}

fn run() -> Result<(), AppError> {
    let config = load_config()?;
    let steps = config.steps;
    let report_every = (steps / 10).max(1);

    info!(
        "World {:?}, {} bodies, {:?} motion, leaf capacity {}",
        config.world.bounds(),
        config.bodies.count,
        config.motion.model,
        config.quadtree.max_bodies_per_node
    );

    let mut simulation = Simulation::new(config)?;
    simulation.spawn_random();

    let started = Instant::now();
    let mut summary = RunSummary::default();
    for _ in 0..steps {
        let report = simulation.step_default()?;
        summary.record(&report);

        if report.step % u64::from(report_every) == 0 {
            info!("{}", report);
        }
    }
    let elapsed = started.elapsed();

    if summary.clamped > 0 {
        warn!("{} boxes had to be clamped to the world", summary.clamped);
    }

    let bodies = simulation.registry().len();
    let all_pairs = bodies * bodies.saturating_sub(1) / 2;
    let steps = summary.steps.max(1) as usize;
    info!(
        "Ran {} steps in {:.2?}: {} candidates/step vs {} all-pairs, {} contacts/step, {} new contacts",
        summary.steps,
        elapsed,
        summary.candidate_pairs / steps,
        all_pairs,
        summary.contacts / steps,
        summary.entered
    );

    if let Some(spatial) = simulation
        .collision_system()
        .spatial_query()
        .as_any()
        .downcast_ref::<QuadtreeSpatialQuery>()
    {
        info!("Final quadtree: {:?}", spatial.quadtree().stats());
    }

    Ok(())
}

fn main() {
    logging::init_with_level("info");

    if let Err(e) = run() {
        log::error!("Broad-phase demo failed: {}", e);
        std::process::exit(1);
    }
}
