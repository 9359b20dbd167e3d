use super::traits::{check_probability, ConfigSection};
use crate::error::RetroplanError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    /// Variation rounds after the initial (generation 0) population
    pub generations: usize,
    pub population_size: usize,
    pub crossover_probability: f64,
    pub mutation_probability: f64,
    pub seed: Option<u64>,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            generations: 100,
            population_size: 96,
            crossover_probability: 0.8,
            mutation_probability: 0.2,
            seed: None,
        }
    }
}

impl ConfigSection for EvolutionConfig {
    fn section_name() -> &'static str {
        "evolution"
    }

    fn validate(&self) -> Result<(), RetroplanError> {
        if self.generations == 0 {
            return Err(RetroplanError::Configuration(
                "evolution.generations must be greater than 0".to_string()
            ));
        }
        if self.population_size == 0 || self.population_size % 2 != 0 {
            return Err(RetroplanError::Configuration(format!(
                "evolution.population_size must be a positive even number, got {}",
                self.population_size
            )));
        }
        check_probability(Self::section_name(), "crossover_probability", self.crossover_probability)?;
        check_probability(Self::section_name(), "mutation_probability", self.mutation_probability)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_odd_population_rejected() {
        let config = EvolutionConfig { population_size: 7, ..Default::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_probability_range() {
        let config = EvolutionConfig { crossover_probability: 1.2, ..Default::default() };
        assert!(config.validate().is_err());

        let config = EvolutionConfig { mutation_probability: -0.1, ..Default::default() };
        assert!(config.validate().is_err());

        assert!(EvolutionConfig::default().validate().is_ok());
    }
}
