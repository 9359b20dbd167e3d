use super::{
    evaluation::EvaluationConfig,
    evolution::EvolutionConfig,
    persistence::PersistenceConfig,
    portfolio::PortfolioConfig,
    traits::ConfigSection,
};
use crate::error::RetroplanError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, RwLock};

/// Prefix of environment overrides, e.g. `RETROPLAN__EVOLUTION__GENERATIONS=10`
pub const ENV_PREFIX: &str = "RETROPLAN";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub evolution: EvolutionConfig,
    pub portfolio: PortfolioConfig,
    pub evaluation: EvaluationConfig,
    pub persistence: PersistenceConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), RetroplanError> {
        self.evolution.validate()?;
        self.portfolio.validate()?;
        self.evaluation.validate()?;
        self.persistence.validate()?;
        Ok(())
    }
}

pub struct ConfigManager {
    config: Arc<RwLock<AppConfig>>,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config: Arc::new(RwLock::new(AppConfig::default())),
        }
    }

    /// Load a TOML or JSON file (by extension) layered with `RETROPLAN__*` environment overrides
    pub fn load_from_file<P: AsRef<Path>>(&self, path: P) -> Result<(), RetroplanError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(RetroplanError::Configuration(format!(
                "Config file {} does not exist",
                path.display()
            )));
        }

        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        log::info!("Loaded configuration from {}", path.display());

        *self.config.write().unwrap_or_else(|e| e.into_inner()) = config;
        Ok(())
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), RetroplanError> {
        let config = self.get();
        let toml_str = toml::to_string_pretty(&config)
            .map_err(|e| RetroplanError::Toml(format!("Failed to serialize: {}", e)))?;

        std::fs::write(path, toml_str)?;
        Ok(())
    }

    pub fn get(&self) -> AppConfig {
        self.config.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn update<F>(&self, f: F) -> Result<(), RetroplanError>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut config = self.config.write().unwrap_or_else(|e| e.into_inner());
        let mut candidate = config.clone();
        f(&mut candidate);
        candidate.validate()?;
        *config = candidate;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TemporalMode;

    #[test]
    fn test_round_trip_through_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("retroplan.toml");

        let manager = ConfigManager::new();
        manager
            .update(|c| {
                c.evolution.generations = 3;
                c.evolution.population_size = 8;
                c.portfolio.temporal_mode = TemporalMode::Sequenced;
            })
            .unwrap();
        manager.save_to_file(&path).unwrap();

        let reloaded = ConfigManager::new();
        reloaded.load_from_file(&path).unwrap();
        let config = reloaded.get();
        assert_eq!(config.evolution.generations, 3);
        assert_eq!(config.evolution.population_size, 8);
        assert_eq!(config.portfolio.temporal_mode, TemporalMode::Sequenced);
        assert_eq!(config.portfolio.buildings.len(), 3);
    }

    #[test]
    fn test_invalid_update_is_rejected_and_not_applied() {
        let manager = ConfigManager::new();
        let result = manager.update(|c| c.evolution.population_size = 5);
        assert!(result.is_err());
        assert_eq!(manager.get().evolution.population_size, 96);
    }

    #[test]
    fn test_missing_file_is_configuration_error() {
        let manager = ConfigManager::new();
        let err = manager.load_from_file("/nonexistent/retroplan.toml").unwrap_err();
        assert!(matches!(err, RetroplanError::Configuration(_)));
    }
}
