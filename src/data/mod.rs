pub mod cache;
pub mod checkpoint;
pub mod export;

pub use cache::FitnessCache;
pub use checkpoint::{CheckpointLog, CheckpointRecord, LastPopulation};
pub use export::{export_pareto, MonitoringLog, ParetoExport};
