use crate::config::PortfolioConfig;
use crate::data::FitnessCache;
use crate::engines::evaluation::cost::{task_costs, CostModel};
use crate::engines::evaluation::phasing::{reconstruct, PhasePlan};
use crate::engines::evaluation::simulator::{simulate_with_timeout, Simulator};
use crate::engines::generation::genome::{feasible, GenomeLayout};
use crate::error::Result;
use crate::types::{Building, Fitness, Genome, TemporalMode};
use rayon::prelude::*;
use rayon::ThreadPool;
use std::sync::Arc;
use std::time::Duration;

/// Everything an evaluation needs besides the simulator and cost model.
///
/// Shared read-only between workers; the cache is the only interior-mutable part.
pub struct OptimizationContext {
    pub layout: GenomeLayout,
    pub buildings: Vec<Building>,
    /// Template ledger; each evaluation works on its own copy
    pub phase_budgets: Vec<f64>,
    pub temporal_mode: TemporalMode,
    pub constraint_enforcement: bool,
    pub horizon_years: usize,
    pub cache: FitnessCache,
}

impl OptimizationContext {
    pub fn from_config(portfolio: &PortfolioConfig) -> Self {
        Self {
            layout: GenomeLayout::new(
                portfolio.buildings.len(),
                portfolio.gene_bounds,
                portfolio.temporal_mode,
            ),
            buildings: portfolio.buildings.clone(),
            phase_budgets: portfolio.phase_budgets.clone(),
            temporal_mode: portfolio.temporal_mode,
            constraint_enforcement: portfolio.constraint_enforcement,
            horizon_years: portfolio.horizon_years,
            cache: FitnessCache::new(),
        }
    }

    pub fn with_cache(mut self, cache: FitnessCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn total_floor_area(&self) -> f64 {
        self.buildings.iter().map(|b| b.floor_area).sum()
    }
}

/// Turns genomes into fitness: cache probe, phasing, simulation, aggregation, penalty
pub struct Evaluator {
    context: Arc<OptimizationContext>,
    simulator: Arc<dyn Simulator>,
    cost_model: Arc<dyn CostModel>,
    timeout: Option<Duration>,
}

impl Evaluator {
    pub fn new(
        context: Arc<OptimizationContext>,
        simulator: Arc<dyn Simulator>,
        cost_model: Arc<dyn CostModel>,
    ) -> Self {
        Self {
            context,
            simulator,
            cost_model,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn context(&self) -> &OptimizationContext {
        &self.context
    }

    /// Fitness of one genome.
    ///
    /// Simulator failures come back as [`Fitness::SENTINEL`]; only fatal errors
    /// (budget overflow, cost model, misconfiguration) are returned as `Err`.
    pub fn evaluate(&self, genome: &[u32]) -> Result<Fitness> {
        let raw = match self.context.cache.get(genome) {
            Some(hit) => hit,
            None => match self.simulate_plan(genome) {
                Ok(fitness) => {
                    self.context.cache.insert(genome.to_vec(), fitness);
                    fitness
                }
                Err(e) if !e.is_fatal() => {
                    log::warn!("Simulation failed for genome {:?}: {}", genome, e);
                    return Ok(Fitness::SENTINEL);
                }
                Err(e) => return Err(e),
            },
        };

        Ok(self.apply_penalty(genome, raw))
    }

    /// Evaluate on `pool`; results stay aligned with `genomes`
    pub fn evaluate_all(&self, pool: &ThreadPool, genomes: &[Genome]) -> Result<Vec<Fitness>> {
        pool.install(|| genomes.par_iter().map(|g| self.evaluate(g)).collect())
    }

    /// Phase of every task for a temporal genome
    pub fn plan(&self, genome: &[u32]) -> Result<PhasePlan> {
        let (operational, order) = self.context.layout.split(genome);
        match self.context.temporal_mode {
            TemporalMode::Phased => {
                let costs = task_costs(self.cost_model.as_ref(), &self.context.buildings, operational)?;
                reconstruct(&self.context.phase_budgets, order, &costs)
            }
            TemporalMode::Sequenced | TemporalMode::Off => PhasePlan::sequenced(order),
        }
    }

    fn apply_penalty(&self, genome: &[u32], fitness: Fitness) -> Fitness {
        if !self.context.constraint_enforcement {
            return fitness;
        }
        let (operational, _) = self.context.layout.split(genome);
        if feasible(operational) {
            fitness
        } else {
            fitness * 2.0
        }
    }

    fn simulate_plan(&self, genome: &[u32]) -> Result<Fitness> {
        if !self.context.temporal_mode.is_temporal() {
            let (operational, _) = self.context.layout.split(genome);
            return self.simulate_portfolio(operational);
        }

        let (operational, _) = self.context.layout.split(genome);
        let plan = self.plan(genome)?;
        let max_phase = plan.max_phase();
        log::debug!("Genome {:?} spans phases 0..={}", genome, max_phase);

        let mut installed = vec![0u32; operational.len()];
        let mut total = Fitness::ZERO;
        let mut last = Fitness::ZERO;

        for phase in 0..=max_phase {
            let tasks = plan.tasks_in(phase);
            if tasks.is_empty() && phase > 0 {
                total += last;
                continue;
            }
            for task in tasks {
                installed[task] = operational[task];
            }
            last = self.simulate_portfolio(&installed)?;
            total += last;
        }

        let remaining_years = self.context.horizon_years.saturating_sub(max_phase);
        Ok(total + last * remaining_years as f64)
    }

    /// Floor-area weighted mean of the per-building results
    fn simulate_portfolio(&self, operational: &[u32]) -> Result<Fitness> {
        let mut weighted = Fitness::ZERO;
        for (index, building) in self.context.buildings.iter().enumerate() {
            let block = self.context.layout.building_block(operational, index);
            let result = simulate_with_timeout(&self.simulator, building, block, self.timeout)?;
            weighted += result * building.floor_area;
        }
        let area = self.context.total_floor_area();
        Ok(Fitness::new(
            weighted.heating / area,
            weighted.comfort / area,
            weighted.price / area,
        ))
    }
}
