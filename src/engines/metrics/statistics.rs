// src/engines/metrics/statistics.rs
use crate::types::Individual;
use serde::{Deserialize, Serialize};

/// Per-objective population summary, in (heating, comfort, price) order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub generation: usize,
    pub evaluations: usize,
    /// Survivors in the population, failed plans included
    pub population: usize,
    pub min: [f64; 3],
    pub avg: [f64; 3],
    pub std: [f64; 3],
    pub max: [f64; 3],
}

impl GenerationStats {
    /// Failed evaluations are excluded; an empty sample leaves every statistic at zero
    pub fn calculate(generation: usize, evaluations: usize, population: &[Individual]) -> Self {
        let samples: Vec<[f64; 3]> = population
            .iter()
            .filter_map(|ind| ind.fitness)
            .filter(|f| !f.is_sentinel())
            .map(|f| f.objectives())
            .collect();

        let mut stats = Self {
            generation,
            evaluations,
            population: population.len(),
            min: [0.0; 3],
            avg: [0.0; 3],
            std: [0.0; 3],
            max: [0.0; 3],
        };
        if samples.is_empty() {
            return stats;
        }

        let n = samples.len() as f64;
        for obj in 0..3 {
            let values = samples.iter().map(|s| s[obj]);
            let mean = values.clone().sum::<f64>() / n;
            let variance = values.clone().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

            stats.min[obj] = values.clone().fold(f64::INFINITY, f64::min);
            stats.max[obj] = values.fold(f64::NEG_INFINITY, f64::max);
            stats.avg[obj] = mean;
            stats.std[obj] = variance.sqrt();
        }

        stats
    }
}
