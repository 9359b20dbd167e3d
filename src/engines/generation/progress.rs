use super::evolution_engine::ProgressCallback;
use crate::engines::metrics::GenerationStats;
use crate::types::Individual;

/// Logs progress through the `log` facade
pub struct ConsoleProgressCallback;

impl ProgressCallback for ConsoleProgressCallback {
    fn on_generation_start(&mut self, generation: usize) {
        log::info!("Generation {} starting...", generation);
    }

    fn on_generation_complete(&mut self, stats: &GenerationStats, hypervolume: f64, archive: &[Individual]) {
        log::info!(
            "Generation {} complete. evals={} hypervolume={:.6e} archive={}",
            stats.generation, stats.evaluations, hypervolume, archive.len()
        );
        log::info!(
            "  heating min/avg/max {:.3}/{:.3}/{:.3}, comfort {:.3}/{:.3}/{:.3}, price {:.3}/{:.3}/{:.3}",
            stats.min[0], stats.avg[0], stats.max[0],
            stats.min[1], stats.avg[1], stats.max[1],
            stats.min[2], stats.avg[2], stats.max[2],
        );
    }

    fn on_plan_evaluated(&mut self, plan_num: usize, total: usize) {
        if plan_num % 10 == 0 || plan_num == total {
            log::debug!("  Evaluated {}/{} plans", plan_num, total);
        }
    }
}

/// Ignores every notification
pub struct SilentProgressCallback;

impl ProgressCallback for SilentProgressCallback {
    fn on_generation_start(&mut self, _generation: usize) {}

    fn on_generation_complete(&mut self, _stats: &GenerationStats, _hypervolume: f64, _archive: &[Individual]) {}

    fn on_plan_evaluated(&mut self, _plan_num: usize, _total: usize) {}
}
