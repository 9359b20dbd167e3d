use rand::rngs::StdRng;
use rand::SeedableRng;
use retroplan::config::PortfolioConfig;
use retroplan::engines::evaluation::{CatalogueCostModel, Evaluator, OptimizationContext, Simulator};
use retroplan::types::{Building, Fitness, Genome, MaterialCost, SurfaceAreas, TemporalMode};
use retroplan::{Result, RetroplanError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Deterministic stand-in: objectives are sum, 2*sum and 3*sum of the block
struct CountingSimulator {
    calls: AtomicUsize,
    jitter: bool,
}

impl CountingSimulator {
    fn new(jitter: bool) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            jitter,
        })
    }
}

impl Simulator for CountingSimulator {
    fn simulate(&self, _building: &Building, choices: &[u32]) -> Result<Fitness> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let sum: u32 = choices.iter().sum();
        if self.jitter {
            // completion order differs from submission order
            thread::sleep(Duration::from_millis((sum % 5) as u64));
        }
        let s = sum as f64;
        Ok(Fitness::new(s, 2.0 * s, 3.0 * s))
    }
}

/// Fails for one building only
struct FlakySimulator;

impl Simulator for FlakySimulator {
    fn simulate(&self, building: &Building, _choices: &[u32]) -> Result<Fitness> {
        if building.name == "TourMontreau" {
            return Err(RetroplanError::SimulatorTimeout {
                building: building.name.clone(),
                seconds: 1.0,
            });
        }
        Ok(Fitness::new(1.0, 1.0, 1.0))
    }
}

fn phased_portfolio() -> PortfolioConfig {
    let mut portfolio = PortfolioConfig::default();
    portfolio.temporal_mode = TemporalMode::Phased;
    for building in portfolio.buildings.iter_mut() {
        building.surfaces = SurfaceAreas {
            wall: 100.0,
            ceiling: 50.0,
            floor: 50.0,
            window: 10.0,
        };
    }
    let entry = MaterialCost {
        unit_price: 20.0,
        labor_hours: 0.5,
    };
    portfolio.catalogue.wall = vec![entry; 39];
    portfolio.catalogue.ceiling = vec![entry; 39];
    portfolio.catalogue.floor = vec![entry; 39];
    portfolio.catalogue.window = vec![entry; 3];
    portfolio.catalogue.labor_rate = 40.0;
    portfolio
}

fn evaluator_for(portfolio: &PortfolioConfig, simulator: Arc<dyn Simulator>) -> Evaluator {
    let context = Arc::new(OptimizationContext::from_config(portfolio));
    Evaluator::new(
        context,
        simulator,
        Arc::new(CatalogueCostModel::new(portfolio.catalogue.clone())),
    )
}

#[test]
fn test_cache_idempotence() {
    let portfolio = PortfolioConfig::default();
    let simulator = CountingSimulator::new(false);
    let evaluator = evaluator_for(&portfolio, simulator.clone());

    let genome: Genome = vec![1, 2, 3, 0, 4, 5, 6, 1, 7, 8, 9, 2];
    let first = evaluator.evaluate(&genome).unwrap();
    let calls = simulator.calls.load(Ordering::SeqCst);
    let second = evaluator.evaluate(&genome.clone()).unwrap();

    assert_eq!(first, second);
    assert_eq!(calls, 3);
    assert_eq!(simulator.calls.load(Ordering::SeqCst), calls);
}

#[test]
fn test_feasibility_penalty_doubles_fitness() {
    let mut portfolio = PortfolioConfig::default();
    // (20, 4) is a known-incompatible wall/window pair; window bound widened to reach it
    portfolio.gene_bounds.window.high = 5;
    let genome: Genome = vec![20, 1, 1, 4, 3, 3, 3, 1, 2, 2, 2, 1];

    portfolio.constraint_enforcement = false;
    let plain = evaluator_for(&portfolio, CountingSimulator::new(false))
        .evaluate(&genome)
        .unwrap();

    portfolio.constraint_enforcement = true;
    let penalized = evaluator_for(&portfolio, CountingSimulator::new(false))
        .evaluate(&genome)
        .unwrap();

    assert_eq!(penalized.heating, 2.0 * plain.heating);
    assert_eq!(penalized.comfort, 2.0 * plain.comfort);
    assert_eq!(penalized.price, 2.0 * plain.price);
}

#[test]
fn test_parallel_results_stay_with_their_genomes() {
    let portfolio = phased_portfolio();
    let layout = OptimizationContext::from_config(&portfolio).layout;
    let mut rng = StdRng::seed_from_u64(99);
    let genomes: Vec<Genome> = (0..24).map(|_| layout.initialize(&mut rng)).collect();

    let sequential = evaluator_for(&portfolio, CountingSimulator::new(false));
    let expected: Vec<Fitness> = genomes
        .iter()
        .map(|g| sequential.evaluate(g))
        .collect::<Result<_>>()
        .unwrap();

    let pool = rayon::ThreadPoolBuilder::new().num_threads(6).build().unwrap();
    let parallel = evaluator_for(&portfolio, CountingSimulator::new(true));
    let actual = parallel.evaluate_all(&pool, &genomes).unwrap();

    assert_eq!(actual, expected);
}

#[test]
fn test_simulator_failure_yields_sentinel() {
    let portfolio = PortfolioConfig::default();
    let evaluator = evaluator_for(&portfolio, Arc::new(FlakySimulator));

    let fitness = evaluator.evaluate(&[0; 12]).unwrap();
    assert!(fitness.is_sentinel());
    assert!(evaluator.context().cache.is_empty());
}

#[test]
fn test_budget_overflow_is_fatal() {
    let mut portfolio = phased_portfolio();
    portfolio.phase_budgets = vec![100.0, 100.0];
    let evaluator = evaluator_for(&portfolio, CountingSimulator::new(false));

    // every wall is replaced: 100 m2 * (20 + 0.5 * 40) = 4000 per building
    let genome: Genome = vec![
        1, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0,
        0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11,
    ];
    let err = evaluator.evaluate(&genome).unwrap_err();
    assert!(matches!(err, RetroplanError::BudgetOverflow { .. }));
}
