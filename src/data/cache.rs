use crate::error::Result;
use crate::types::{Fitness, Genome};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Memo of already simulated chromosomes, keyed by full genome content.
///
/// Shared by all evaluation workers. Entries are never evicted within a run.
#[derive(Default)]
pub struct FitnessCache {
    data: Mutex<HashMap<Genome, Fitness>>,
}

#[derive(Serialize, Deserialize)]
struct CacheEntry {
    genome: Genome,
    fitness: Fitness,
}

impl FitnessCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Genome, Fitness>> {
        self.data.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn get(&self, genome: &[u32]) -> Option<Fitness> {
        self.lock().get(genome).copied()
    }

    /// Two workers may race on the same genome; the later write wins.
    pub fn insert(&self, genome: Genome, fitness: Fitness) {
        let mut data = self.lock();
        if let Some(previous) = data.insert(genome, fitness) {
            if previous != fitness {
                log::warn!(
                    "Fitness cache disagreement: {:?} replaced by {:?}",
                    previous,
                    fitness
                );
            }
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Write all entries as JSON, replacing the file atomically
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut entries: Vec<CacheEntry> = self
            .lock()
            .iter()
            .map(|(genome, fitness)| CacheEntry {
                genome: genome.clone(),
                fitness: *fitness,
            })
            .collect();
        entries.sort_by(|a, b| a.genome.cmp(&b.genome));

        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, serde_json::to_vec(&entries)?)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let entries: Vec<CacheEntry> = serde_json::from_slice(&bytes)?;
        let cache = Self::new();
        {
            let mut data = cache.lock();
            for entry in entries {
                data.insert(entry.genome, entry.fitness);
            }
        }
        Ok(cache)
    }
}
