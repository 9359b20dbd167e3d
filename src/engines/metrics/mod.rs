pub mod hypervolume;
pub mod statistics;

pub use hypervolume::{hypervolume, reference_point, ConvergenceMonitor, REFERENCE_SCALE};
pub use statistics::GenerationStats;
