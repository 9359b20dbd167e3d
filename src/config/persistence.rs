use super::traits::ConfigSection;
use crate::error::RetroplanError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    /// Append-only per-generation population log
    pub checkpoint_path: PathBuf,
    pub cache_path: PathBuf,
    /// Directory receiving the Pareto export at the end of a run
    pub export_dir: PathBuf,
    /// Restart from the checkpoint log when one is present
    pub resume: bool,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            checkpoint_path: PathBuf::from("monitoring.jsonl"),
            cache_path: PathBuf::from("fitness_cache.json"),
            export_dir: PathBuf::from("results"),
            resume: true,
        }
    }
}

impl ConfigSection for PersistenceConfig {
    fn section_name() -> &'static str {
        "persistence"
    }

    fn validate(&self) -> Result<(), RetroplanError> {
        if self.checkpoint_path.as_os_str().is_empty() || self.cache_path.as_os_str().is_empty() {
            return Err(RetroplanError::Configuration(
                "persistence paths must not be empty".to_string()
            ));
        }
        if self.checkpoint_path == self.cache_path {
            return Err(RetroplanError::Configuration(
                "persistence.checkpoint_path and persistence.cache_path must differ".to_string()
            ));
        }
        Ok(())
    }
}
