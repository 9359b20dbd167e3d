use thiserror::Error;

#[derive(Error, Debug)]
pub enum RetroplanError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error(
        "Budget overflow: task {task} (cost {cost:.2}) does not fit in final phase {phase} \
         (remaining {remaining:.2}); total cost exceeds total budget"
    )]
    BudgetOverflow {
        phase: usize,
        task: usize,
        cost: f64,
        remaining: f64,
    },

    #[error("Simulator error for {building}: {message}")]
    Simulator { building: String, message: String },

    #[error("Simulator timed out for {building} after {seconds:.1}s")]
    SimulatorTimeout { building: String, seconds: f64 },

    #[error("Cost model error: {0}")]
    CostModel(String),

    #[error("Checkpoint error: {0}")]
    Checkpoint(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(String),

    #[error("Config source error: {0}")]
    ConfigSource(#[from] config::ConfigError),
}

impl RetroplanError {
    /// Simulator failures are absorbed into a sentinel fitness; everything else stops the run.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            RetroplanError::Simulator { .. } | RetroplanError::SimulatorTimeout { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, RetroplanError>;
