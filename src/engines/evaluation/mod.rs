pub mod cost;
pub mod evaluator;
pub mod phasing;
pub mod simulator;

pub use cost::{task_costs, CatalogueCostModel, CostModel};
pub use evaluator::{Evaluator, OptimizationContext};
pub use phasing::{reconstruct, PhasePlan};
pub use simulator::{simulate_with_timeout, CommandSimulator, Simulator};
