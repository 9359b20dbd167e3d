use super::traits::ConfigSection;
use crate::error::RetroplanError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Simulator access and the evaluation worker pool
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Concurrent simulations; size this to the available simulator licences/cores
    pub workers: usize,
    /// Per-call simulator timeout
    pub timeout_secs: Option<f64>,
    /// External simulator program followed by its fixed arguments
    pub simulator_command: Vec<String>,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            timeout_secs: None,
            simulator_command: Vec::new(),
        }
    }
}

impl EvaluationConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs_f64)
    }
}

impl ConfigSection for EvaluationConfig {
    fn section_name() -> &'static str {
        "evaluation"
    }

    fn validate(&self) -> Result<(), RetroplanError> {
        if self.workers == 0 {
            return Err(RetroplanError::Configuration(
                "evaluation.workers must be greater than 0".to_string()
            ));
        }
        if let Some(secs) = self.timeout_secs {
            if secs <= 0.0 || !secs.is_finite() {
                return Err(RetroplanError::Configuration(format!(
                    "evaluation.timeout_secs must be positive, got {}",
                    secs
                )));
            }
        }
        Ok(())
    }
}
