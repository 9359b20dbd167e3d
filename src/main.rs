use anyhow::{bail, Context, Result};
use clap::{arg, Command};
use retroplan::config::{AppConfig, ConfigManager};
use retroplan::data::{export_pareto, CheckpointLog, FitnessCache, MonitoringLog};
use retroplan::engines::evaluation::{CatalogueCostModel, CommandSimulator, Evaluator, OptimizationContext};
use retroplan::engines::generation::{ConsoleProgressCallback, EvolutionEngine};
use std::path::PathBuf;
use std::sync::Arc;

fn cli() -> Command {
    Command::new("retroplan")
        .about("Searches for phased building-retrofit plans")
        .version(env!("CARGO_PKG_VERSION"))
        .arg_required_else_help(true)
        .arg(
            arg!([CONFIG] "Path to the TOML run configuration")
                .value_parser(clap::value_parser!(PathBuf))
                .required_unless_present("init"),
        )
        .arg(
            arg!(--init <PATH> "Write the default configuration to PATH and exit")
                .value_parser(clap::value_parser!(PathBuf))
                .conflicts_with("CONFIG"),
        )
}

fn main() -> Result<()> {
    env_logger::init();

    let matches = cli().get_matches();

    if let Some(path) = matches.get_one::<PathBuf>("init") {
        ConfigManager::new()
            .save_to_file(path)
            .with_context(|| format!("writing default configuration to {}", path.display()))?;
        log::info!("Default configuration written to {}", path.display());
        return Ok(());
    }

    let Some(path) = matches.get_one::<PathBuf>("CONFIG") else {
        bail!("a configuration file is required");
    };
    let manager = ConfigManager::new();
    manager
        .load_from_file(path)
        .with_context(|| format!("loading configuration from {}", path.display()))?;
    run(manager.get())
}

fn run(config: AppConfig) -> Result<()> {
    let persistence = &config.persistence;

    let simulator = CommandSimulator::from_command(&config.evaluation.simulator_command)
        .context("evaluation.simulator_command must name the simulator program")?;
    let cost_model = CatalogueCostModel::new(config.portfolio.catalogue.clone());

    let cache = if persistence.resume && persistence.cache_path.exists() {
        match FitnessCache::load(&persistence.cache_path) {
            Ok(cache) => {
                log::info!("Reloaded {} cached fitness values", cache.len());
                cache
            }
            Err(e) => {
                log::warn!("Ignoring fitness cache {}: {}", persistence.cache_path.display(), e);
                FitnessCache::new()
            }
        }
    } else {
        FitnessCache::new()
    };

    let context = Arc::new(OptimizationContext::from_config(&config.portfolio).with_cache(cache));
    let evaluator = Evaluator::new(context, Arc::new(simulator), Arc::new(cost_model))
        .with_timeout(config.evaluation.timeout());

    let checkpoint = CheckpointLog::open(&persistence.checkpoint_path)
        .with_context(|| format!("opening checkpoint log {}", persistence.checkpoint_path.display()))?;

    let monitoring = MonitoringLog::open(&persistence.export_dir)
        .with_context(|| format!("creating export directory {}", persistence.export_dir.display()))?;

    let mut engine = EvolutionEngine::new(config.evolution.clone(), evaluator, config.evaluation.workers)?
        .with_checkpoint(checkpoint, persistence.resume)
        .with_monitoring(monitoring)
        .with_cache_path(&persistence.cache_path);

    let summary = engine.run(ConsoleProgressCallback)?;

    let export = export_pareto(&persistence.export_dir, &summary.archive)
        .context("exporting the Pareto archive")?;
    log::info!(
        "Run finished: {} plans on the front, final hypervolume {:.6e}, fitnesses in {}",
        summary.archive.len(),
        summary.hypervolumes.last().copied().unwrap_or(0.0),
        export.fitnesses.display()
    );

    Ok(())
}
