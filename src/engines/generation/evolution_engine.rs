use crate::config::EvolutionConfig;
use crate::data::checkpoint::{load_last_population, CheckpointLog, LastPopulation};
use crate::data::export::MonitoringLog;
use crate::engines::evaluation::Evaluator;
use crate::engines::generation::{
    archive::ParetoArchive,
    genome::GenomeLayout,
    operators::{cross, mutate, pareto_tournament_selection},
    pareto::{select_survivors, MultiObjectiveIndividual},
};
use crate::engines::metrics::{ConvergenceMonitor, GenerationStats};
use crate::error::{Result, RetroplanError};
use crate::types::{Fitness, Genome, Individual};
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::path::PathBuf;

pub trait ProgressCallback: Send {
    fn on_generation_start(&mut self, generation: usize);
    fn on_generation_complete(&mut self, stats: &GenerationStats, hypervolume: f64, archive: &[Individual]);
    fn on_plan_evaluated(&mut self, plan_num: usize, total: usize);
}

impl<C: ProgressCallback + ?Sized> ProgressCallback for &mut C {
    fn on_generation_start(&mut self, generation: usize) {
        (**self).on_generation_start(generation);
    }

    fn on_generation_complete(&mut self, stats: &GenerationStats, hypervolume: f64, archive: &[Individual]) {
        (**self).on_generation_complete(stats, hypervolume, archive);
    }

    fn on_plan_evaluated(&mut self, plan_num: usize, total: usize) {
        (**self).on_plan_evaluated(plan_num, total);
    }
}

/// Outcome of a full run
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Survivors of the last generation
    pub population: Vec<Individual>,
    pub archive: Vec<Individual>,
    /// Archive hypervolume per generation, generation 0 first
    pub hypervolumes: Vec<f64>,
    pub statistics: Vec<GenerationStats>,
}

type Ranked = MultiObjectiveIndividual<Individual>;

pub struct EvolutionEngine {
    config: EvolutionConfig,
    evaluator: Evaluator,
    pool: ThreadPool,
    archive: ParetoArchive,
    monitor: ConvergenceMonitor,
    checkpoint: Option<CheckpointLog>,
    monitoring: Option<MonitoringLog>,
    cache_path: Option<PathBuf>,
    resume: bool,
    rng: StdRng,
}

impl EvolutionEngine {
    pub fn new(config: EvolutionConfig, evaluator: Evaluator, workers: usize) -> Result<Self> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let pool = ThreadPoolBuilder::new()
            .num_threads(workers.max(1))
            .thread_name(|i| format!("retroplan-eval-{}", i))
            .build()
            .map_err(|e| RetroplanError::Configuration(format!("cannot start evaluation pool: {}", e)))?;

        Ok(Self {
            config,
            evaluator,
            pool,
            archive: ParetoArchive::new(),
            monitor: ConvergenceMonitor::new(),
            checkpoint: None,
            monitoring: None,
            cache_path: None,
            resume: false,
            rng,
        })
    }

    /// Append every generation to `log`; with `resume`, start from its last population
    pub fn with_checkpoint(mut self, log: CheckpointLog, resume: bool) -> Self {
        self.checkpoint = Some(log);
        self.resume = resume;
        self
    }

    /// Append the archive front and its hypervolume to `log` after every generation
    pub fn with_monitoring(mut self, log: MonitoringLog) -> Self {
        self.monitoring = Some(log);
        self
    }

    /// Save the fitness cache here after every generation
    pub fn with_cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = Some(path.into());
        self
    }

    /// Run the evolution process.
    ///
    /// Generation numbers continue from the checkpoint when resuming.
    pub fn run<C: ProgressCallback>(&mut self, mut callback: C) -> Result<RunSummary> {
        let mu = self.config.population_size;
        let mut statistics = Vec::with_capacity(self.config.generations + 1);

        // First generation: evaluate and rank the initial population
        let (start, mut population) = self.initialize_population();
        callback.on_generation_start(start);
        let evaluations = self.evaluate_population(&mut population, &mut callback)?;
        let mut ranked = select_survivors(rank(population), mu);
        statistics.push(self.finish_generation(start, &ranked, evaluations, &mut callback)?);

        for generation in start + 1..=start + self.config.generations {
            callback.on_generation_start(generation);

            let mut offspring = self.create_offspring(&ranked);
            let evaluations = self.evaluate_population(&mut offspring, &mut callback)?;

            let union: Vec<Individual> = ranked
                .into_iter()
                .map(|r| r.data)
                .chain(offspring)
                .collect();
            ranked = select_survivors(rank(union), mu);

            statistics.push(self.finish_generation(generation, &ranked, evaluations, &mut callback)?);
        }

        Ok(RunSummary {
            population: ranked.into_iter().map(|r| r.data).collect(),
            archive: self.archive.get_all().to_vec(),
            hypervolumes: self.monitor.history().to_vec(),
            statistics,
        })
    }

    fn layout(&self) -> &GenomeLayout {
        &self.evaluator.context().layout
    }

    /// First generation number and its population
    fn initialize_population(&mut self) -> (usize, Vec<Individual>) {
        let mu = self.config.population_size;
        let (start, mut genomes) = match self.resumed_population() {
            Some(last) => (last.generation + 1, last.genomes),
            None => (0, Vec::new()),
        };

        let fresh = mu.saturating_sub(genomes.len());
        if !genomes.is_empty() && fresh > 0 {
            log::warn!("Checkpoint holds {} plans; adding {} random ones", genomes.len(), fresh);
        }
        let layout = self.layout().clone();
        genomes.extend((0..fresh).map(|_| layout.initialize(&mut self.rng)));

        (start, genomes.into_iter().map(Individual::new).collect())
    }

    fn resumed_population(&self) -> Option<LastPopulation> {
        let log = self.checkpoint.as_ref().filter(|_| self.resume)?;

        match load_last_population(log.path(), self.config.population_size) {
            Ok(None) => {
                log::info!("No previous population in {}, starting fresh", log.path().display());
                None
            }
            Ok(Some(last)) => {
                if let Some(bad) = last.genomes.iter().find(|g| !self.layout().is_valid(g)) {
                    log::warn!(
                        "Checkpoint genome {:?} does not fit the current portfolio, starting fresh",
                        bad
                    );
                    return None;
                }
                log::info!(
                    "Resuming after generation {} from {} plans in {}",
                    last.generation,
                    last.genomes.len(),
                    log.path().display()
                );
                Some(last)
            }
            Err(e) => {
                log::warn!("Unusable checkpoint {}: {}; starting fresh", log.path().display(), e);
                None
            }
        }
    }

    /// Evaluate every individual lacking a fitness; returns how many were evaluated
    fn evaluate_population<C: ProgressCallback>(
        &self,
        population: &mut [Individual],
        callback: &mut C,
    ) -> Result<usize> {
        let pending: Vec<usize> = (0..population.len())
            .filter(|&i| !population[i].is_valid())
            .collect();
        let genomes: Vec<Genome> = pending.iter().map(|&i| population[i].genome.clone()).collect();

        let fitnesses = self.evaluator.evaluate_all(&self.pool, &genomes)?;

        for (done, (&i, fitness)) in pending.iter().zip(fitnesses).enumerate() {
            population[i].fitness = Some(fitness);
            callback.on_plan_evaluated(done + 1, pending.len());
        }

        Ok(pending.len())
    }

    fn create_offspring(&mut self, ranked: &[Ranked]) -> Vec<Individual> {
        let mu = self.config.population_size;
        let population_pareto: Vec<(Genome, usize, f64)> = ranked
            .iter()
            .map(|r| (r.data.genome.clone(), r.rank, r.crowding_distance))
            .collect();

        let parents: Vec<Genome> = (0..mu)
            .map(|_| pareto_tournament_selection(&population_pareto, &mut self.rng))
            .collect();

        let layout = self.evaluator.context().layout.clone();
        let mut offspring = Vec::with_capacity(mu);

        for pair in parents.chunks(2) {
            let mut children = match pair {
                [a, b] if self.rng.gen::<f64>() < self.config.crossover_probability => {
                    let (c1, c2) = cross(&layout, a, b, &mut self.rng);
                    vec![c1, c2]
                }
                _ => pair.to_vec(),
            };

            for child in children.iter_mut() {
                if self.rng.gen::<f64>() < self.config.mutation_probability {
                    mutate(&layout, child, &mut self.rng);
                }
            }
            offspring.extend(children.into_iter().map(Individual::new));
        }

        offspring
    }

    fn finish_generation<C: ProgressCallback>(
        &mut self,
        generation: usize,
        ranked: &[Ranked],
        evaluations: usize,
        callback: &mut C,
    ) -> Result<GenerationStats> {
        let population: Vec<Individual> = ranked.iter().map(|r| r.data.clone()).collect();

        self.archive.update(&population);

        if let Some(log) = &self.checkpoint {
            log.append_generation(generation, &population)?;
        }
        if let Some(path) = &self.cache_path {
            if let Err(e) = self.evaluator.context().cache.save(path) {
                log::warn!("Could not persist fitness cache to {}: {}", path.display(), e);
            }
        }

        let stats = GenerationStats::calculate(generation, evaluations, &population);
        let hypervolume = self.monitor.record(&self.archive.fitnesses());
        if let Some(monitoring) = &self.monitoring {
            if let Err(e) = monitoring.append(generation, hypervolume, self.archive.get_all()) {
                log::warn!("Could not append monitoring for generation {}: {}", generation, e);
            }
        }
        callback.on_generation_complete(&stats, hypervolume, self.archive.get_all());

        Ok(stats)
    }
}

fn rank(population: Vec<Individual>) -> Vec<Ranked> {
    population
        .into_iter()
        .map(|ind| {
            let objectives = ind.fitness.unwrap_or(Fitness::SENTINEL).objectives().to_vec();
            MultiObjectiveIndividual::new(ind, objectives)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PortfolioConfig;
    use crate::engines::evaluation::{CatalogueCostModel, OptimizationContext, Simulator};
    use crate::engines::generation::progress::SilentProgressCallback;
    use crate::types::Building;
    use std::sync::Arc;

    struct Sum;

    impl Simulator for Sum {
        fn simulate(&self, _building: &Building, choices: &[u32]) -> Result<Fitness> {
            let s: u32 = choices.iter().sum();
            Ok(Fitness::new(s as f64, (160 - s) as f64, (s % 7) as f64))
        }
    }

    fn engine(seed: u64) -> EvolutionEngine {
        let portfolio = PortfolioConfig::default();
        let context = Arc::new(OptimizationContext::from_config(&portfolio));
        let evaluator = Evaluator::new(
            context,
            Arc::new(Sum),
            Arc::new(CatalogueCostModel::new(portfolio.catalogue.clone())),
        );
        let config = EvolutionConfig {
            generations: 3,
            population_size: 12,
            seed: Some(seed),
            ..EvolutionConfig::default()
        };
        EvolutionEngine::new(config, evaluator, 2).unwrap()
    }

    #[test]
    fn test_run_keeps_population_size() {
        let summary = engine(1).run(SilentProgressCallback).unwrap();

        assert_eq!(summary.population.len(), 12);
        assert!(summary.population.iter().all(|i| i.is_valid()));
        assert_eq!(summary.statistics.len(), 4);
        assert_eq!(summary.hypervolumes.len(), 4);
        assert_eq!(summary.statistics[0].evaluations, 12);
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let a = engine(42).run(SilentProgressCallback).unwrap();
        let b = engine(42).run(SilentProgressCallback).unwrap();
        assert_eq!(a.population, b.population);
        assert_eq!(a.hypervolumes, b.hypervolumes);
    }
}
