use crate::error::{Result, RetroplanError};
use crate::types::{Fitness, Genome, Individual};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// One line of the checkpoint log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointRecord {
    pub generation: usize,
    pub genome: Genome,
    pub fitness: Fitness,
}

/// Append-only JSON-lines log of every evaluated population.
///
/// A generation is serialized into a single buffer and written with one
/// `write_all` under the lock, so records of different generations never interleave.
pub struct CheckpointLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl CheckpointLog {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append every individual carrying a fitness; returns the number of records written
    pub fn append_generation(&self, generation: usize, population: &[Individual]) -> Result<usize> {
        let mut buffer = Vec::new();
        let mut written = 0;

        for individual in population {
            let Some(fitness) = individual.fitness else {
                continue;
            };
            let record = CheckpointRecord {
                generation,
                genome: individual.genome.clone(),
                fitness,
            };
            serde_json::to_writer(&mut buffer, &record)?;
            buffer.push(b'\n');
            written += 1;
        }

        let mut file = self.file.lock().unwrap_or_else(|e| e.into_inner());
        file.write_all(&buffer)?;
        file.flush()?;

        log::debug!("Checkpointed {} records for generation {}", written, generation);
        Ok(written)
    }
}

/// Read every record; any malformed line makes the whole log unusable
pub fn read_records<P: AsRef<Path>>(path: P) -> Result<Vec<CheckpointRecord>> {
    let reader = BufReader::new(File::open(path.as_ref())?);
    let mut records = Vec::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record: CheckpointRecord = serde_json::from_str(&line).map_err(|e| {
            RetroplanError::Checkpoint(format!("line {}: {}", line_no + 1, e))
        })?;
        records.push(record);
    }

    Ok(records)
}

/// Tail of a checkpoint log
#[derive(Debug, Clone, PartialEq)]
pub struct LastPopulation {
    /// Generation of the newest record
    pub generation: usize,
    /// Genomes of the most recent records, oldest first
    pub genomes: Vec<Genome>,
}

/// The most recent `population_size` records; `None` for a missing or empty log
pub fn load_last_population<P: AsRef<Path>>(path: P, population_size: usize) -> Result<Option<LastPopulation>> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(None);
    }
    let records = read_records(path)?;
    let Some(newest) = records.last() else {
        return Ok(None);
    };

    let start = records.len().saturating_sub(population_size);
    Ok(Some(LastPopulation {
        generation: newest.generation,
        genomes: records[start..].iter().map(|r| r.genome.clone()).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_valid_individuals_are_logged() {
        let dir = tempfile::tempdir().unwrap();
        let log = CheckpointLog::open(dir.path().join("log.jsonl")).unwrap();

        let population = vec![
            Individual::with_fitness(vec![1, 2], Fitness::new(1.0, 2.0, 3.0)),
            Individual::new(vec![3, 4]),
        ];
        assert_eq!(log.append_generation(0, &population).unwrap(), 1);

        let records = read_records(log.path()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].genome, vec![1, 2]);
        assert_eq!(records[0].generation, 0);
    }

    #[test]
    fn test_malformed_line_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.jsonl");
        std::fs::write(&path, "{\"generation\":0,\"genome\":[1],\"fitness\":[1.0,1.0,1.0]}\nnot json\n")
            .unwrap();

        assert!(matches!(read_records(&path), Err(RetroplanError::Checkpoint(_))));
        assert!(load_last_population(&path, 4).is_err());
    }

    #[test]
    fn test_last_population_takes_the_tail() {
        let dir = tempfile::tempdir().unwrap();
        let log = CheckpointLog::open(dir.path().join("log.jsonl")).unwrap();
        assert_eq!(load_last_population(log.path(), 2).unwrap(), None);

        let first: Vec<Individual> = (0..3)
            .map(|i| Individual::with_fitness(vec![i], Fitness::new(1.0, 1.0, 1.0)))
            .collect();
        let second: Vec<Individual> = (10..13)
            .map(|i| Individual::with_fitness(vec![i], Fitness::new(2.0, 2.0, 2.0)))
            .collect();
        log.append_generation(0, &first).unwrap();
        log.append_generation(1, &second).unwrap();

        let last = load_last_population(log.path(), 2).unwrap().unwrap();
        assert_eq!(last.generation, 1);
        assert_eq!(last.genomes, vec![vec![11], vec![12]]);
    }
}
