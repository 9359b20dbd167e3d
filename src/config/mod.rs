pub mod traits;
pub mod evolution;
pub mod portfolio;
pub mod evaluation;
pub mod persistence;
pub mod manager;

pub use manager::{ConfigManager, AppConfig};
pub use evolution::EvolutionConfig;
pub use portfolio::{CatalogueConfig, PortfolioConfig};
pub use evaluation::EvaluationConfig;
pub use persistence::PersistenceConfig;
pub use traits::ConfigSection;
