pub mod archive;
pub mod evolution_engine;
pub mod genome;
pub mod operators;
pub mod pareto;
pub mod progress;

pub use archive::ParetoArchive;
pub use evolution_engine::{EvolutionEngine, ProgressCallback, RunSummary};
pub use genome::{feasible, is_permutation, GenomeLayout};
pub use progress::{ConsoleProgressCallback, SilentProgressCallback};
