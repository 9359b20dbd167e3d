use crate::error::Result;
use crate::types::Individual;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Files produced by [`export_pareto`]
#[derive(Debug, Clone)]
pub struct ParetoExport {
    pub genomes: PathBuf,
    pub fitnesses: PathBuf,
}

/// Write the archive as two timestamped listings: genomes, then fitness tuples (same line order)
pub fn export_pareto<P: AsRef<Path>>(dir: P, archive: &[Individual]) -> Result<ParetoExport> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;

    let stamp = chrono::Local::now().format("%Y%m%dT%H%M%S");
    let export = ParetoExport {
        genomes: dir.join(format!("pareto_{}.txt", stamp)),
        fitnesses: dir.join(format!("pareto_fitnesses_{}.txt", stamp)),
    };

    let mut genomes = BufWriter::new(File::create(&export.genomes)?);
    let mut fitnesses = BufWriter::new(File::create(&export.fitnesses)?);

    for individual in archive {
        writeln!(genomes, "{:?}", individual.genome)?;
        if let Some(fitness) = individual.fitness {
            writeln!(fitnesses, "{},{},{}", fitness.heating, fitness.comfort, fitness.price)?;
        }
    }

    genomes.flush()?;
    fitnesses.flush()?;

    log::info!(
        "Exported {} Pareto solutions to {}",
        archive.len(),
        export.genomes.display()
    );
    Ok(export)
}

/// Per-generation convergence trace, appended as the run goes.
///
/// `pareto_monitoring.csv` gets one `generation,heating,comfort,price` row per archive member
/// and `hypervolume.csv` one `generation,hypervolume` row.
#[derive(Debug, Clone)]
pub struct MonitoringLog {
    pareto: PathBuf,
    hypervolume: PathBuf,
}

impl MonitoringLog {
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            pareto: dir.join("pareto_monitoring.csv"),
            hypervolume: dir.join("hypervolume.csv"),
        })
    }

    pub fn pareto_path(&self) -> &Path {
        &self.pareto
    }

    pub fn hypervolume_path(&self) -> &Path {
        &self.hypervolume
    }

    pub fn append(&self, generation: usize, hypervolume: f64, archive: &[Individual]) -> Result<()> {
        let mut rows = String::new();
        for fitness in archive.iter().filter_map(|ind| ind.fitness) {
            rows.push_str(&format!(
                "{},{},{},{}\n",
                generation, fitness.heating, fitness.comfort, fitness.price
            ));
        }
        append_to(&self.pareto, rows.as_bytes())?;
        append_to(&self.hypervolume, format!("{},{}\n", generation, hypervolume).as_bytes())?;
        Ok(())
    }
}

fn append_to(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Fitness;

    #[test]
    fn test_export_lists_archive() {
        let dir = tempfile::tempdir().unwrap();
        let archive = vec![
            Individual::with_fitness(vec![1, 0, 2], Fitness::new(1.0, 2.0, 3.0)),
            Individual::with_fitness(vec![0, 3, 1], Fitness::new(3.0, 2.0, 1.0)),
        ];

        let export = export_pareto(dir.path(), &archive).unwrap();

        let genomes = std::fs::read_to_string(&export.genomes).unwrap();
        assert_eq!(genomes.lines().collect::<Vec<_>>(), vec!["[1, 0, 2]", "[0, 3, 1]"]);

        let fitnesses = std::fs::read_to_string(&export.fitnesses).unwrap();
        assert_eq!(fitnesses.lines().next(), Some("1,2,3"));
    }

    #[test]
    fn test_monitoring_appends_every_generation() {
        let dir = tempfile::tempdir().unwrap();
        let monitoring = MonitoringLog::open(dir.path().join("out")).unwrap();

        let front = vec![
            Individual::with_fitness(vec![1], Fitness::new(1.0, 2.0, 3.0)),
            Individual::with_fitness(vec![2], Fitness::new(3.0, 2.0, 1.0)),
        ];
        monitoring.append(0, 4.5, &front[..1]).unwrap();
        monitoring.append(1, 6.0, &front).unwrap();

        let pareto = std::fs::read_to_string(monitoring.pareto_path()).unwrap();
        assert_eq!(pareto.lines().collect::<Vec<_>>(), vec!["0,1,2,3", "1,1,2,3", "1,3,2,1"]);

        let hypervolume = std::fs::read_to_string(monitoring.hypervolume_path()).unwrap();
        assert_eq!(hypervolume.lines().collect::<Vec<_>>(), vec!["0,4.5", "1,6"]);
    }
}
