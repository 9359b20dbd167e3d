//! Chromosome layout for phased retrofit plans
//!
//! A genome is a flat sequence of integers made of two halves:
//!
//! - **Operational half**: one block of 4 genes per building, in portfolio order
//!   (wall, ceiling, floor, window). Each gene is a material/product index bounded
//!   by the `[low, high)` range of its kind; index 0 means "keep existing".
//! - **Temporal half** (temporal mode only): same length as the operational half,
//!   always a permutation of `0..n`. Entry `j` is the rank (or phase) of task `j`,
//!   where task `j` is operational gene `j`.
//!
//! # Example
//!
//! ```
//! // 1 building, temporal mode on:
//! // [wall, ceiling, floor, window | order of the 4 tasks]
//! let genome = vec![12, 0, 7, 2, 3, 0, 2, 1];
//! ```

use crate::types::{GeneBound, GeneBounds, GeneKind, Genome, TemporalMode, GENES_PER_BUILDING};
use rand::seq::SliceRandom;
use rand::Rng;

/// Known-incompatible (wall index, window index) pairs
pub const INCOMPATIBLE_WALL_WINDOW: [(u32, u32); 24] = [
    (10, 3), (10, 4), (20, 3), (20, 4), (30, 3), (30, 4), (40, 3), (40, 4),
    (1, 4), (4, 4), (21, 4), (31, 4),
    (8, 0), (18, 0), (28, 0), (38, 0),
    (9, 0), (9, 1), (19, 0), (19, 1), (29, 0), (29, 1), (39, 0), (39, 1),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenomeLayout {
    buildings: usize,
    bounds: GeneBounds,
    temporal: bool,
}

impl GenomeLayout {
    pub fn new(buildings: usize, bounds: GeneBounds, temporal_mode: TemporalMode) -> Self {
        Self {
            buildings,
            bounds,
            temporal: temporal_mode.is_temporal(),
        }
    }

    pub fn buildings(&self) -> usize {
        self.buildings
    }

    pub fn is_temporal(&self) -> bool {
        self.temporal
    }

    pub fn operational_len(&self) -> usize {
        self.buildings * GENES_PER_BUILDING
    }

    pub fn len(&self) -> usize {
        if self.temporal {
            2 * self.operational_len()
        } else {
            self.operational_len()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.buildings == 0
    }

    /// Bound of operational gene `position`
    pub fn bound_at(&self, position: usize) -> GeneBound {
        self.bounds.get(GeneKind::at_position(position))
    }

    /// Uniform operational genes, plus a uniform permutation in temporal mode
    pub fn initialize<R: Rng>(&self, rng: &mut R) -> Genome {
        let n = self.operational_len();
        let mut genome: Genome = (0..n).map(|i| rng.gen_range(self.bound_at(i).range())).collect();

        if self.temporal {
            let mut order: Vec<u32> = (0..n as u32).collect();
            order.shuffle(rng);
            genome.extend(order);
        }

        genome
    }

    /// (operational, temporal); the temporal half is empty when temporal mode is off
    pub fn split<'a>(&self, genome: &'a [u32]) -> (&'a [u32], &'a [u32]) {
        genome.split_at(self.operational_len().min(genome.len()))
    }

    pub fn building_block<'a>(&self, genome: &'a [u32], building: usize) -> &'a [u32] {
        let start = building * GENES_PER_BUILDING;
        &genome[start..start + GENES_PER_BUILDING]
    }

    pub fn within_bounds(&self, genome: &[u32]) -> bool {
        let (operational, _) = self.split(genome);
        operational
            .iter()
            .enumerate()
            .all(|(i, gene)| self.bound_at(i).contains(*gene))
    }

    /// Length, bound and permutation invariants together
    pub fn is_valid(&self, genome: &[u32]) -> bool {
        if genome.len() != self.len() || !self.within_bounds(genome) {
            return false;
        }
        let (_, temporal) = self.split(genome);
        !self.temporal || is_permutation(temporal)
    }
}

/// True when `values` holds each of `0..values.len()` exactly once
pub fn is_permutation(values: &[u32]) -> bool {
    let mut seen = vec![false; values.len()];
    for &v in values {
        match seen.get_mut(v as usize) {
            Some(slot) if !*slot => *slot = true,
            _ => return false,
        }
    }
    true
}

/// Rejects plans pairing a wall and a window known not to fit together.
///
/// Only the operational half is inspected; an infeasible plan is penalized, never discarded.
pub fn feasible(operational: &[u32]) -> bool {
    operational.chunks_exact(GENES_PER_BUILDING).all(|block| {
        let pair = (block[0], block[3]);
        !INCOMPATIBLE_WALL_WINDOW.contains(&pair)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_initialize_respects_layout() {
        let layout = GenomeLayout::new(3, GeneBounds::default(), TemporalMode::Phased);
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..50 {
            let genome = layout.initialize(&mut rng);
            assert_eq!(genome.len(), 24);
            assert!(layout.is_valid(&genome));
        }
    }

    #[test]
    fn test_initialize_without_temporal_half() {
        let layout = GenomeLayout::new(2, GeneBounds::default(), TemporalMode::Off);
        let mut rng = StdRng::seed_from_u64(1);

        let genome = layout.initialize(&mut rng);
        assert_eq!(genome.len(), 8);
        assert!(layout.split(&genome).1.is_empty());
    }

    #[test]
    fn test_is_permutation() {
        assert!(is_permutation(&[2, 0, 1]));
        assert!(is_permutation(&[]));
        assert!(!is_permutation(&[0, 0, 1]));
        assert!(!is_permutation(&[0, 3, 1]));
    }

    #[test]
    fn test_feasibility_checks_every_building() {
        assert!(feasible(&[10, 0, 0, 2, 5, 5, 5, 2]));
        assert!(!feasible(&[10, 0, 0, 3, 5, 5, 5, 2]));
        assert!(!feasible(&[5, 5, 5, 2, 9, 1, 1, 1]));
    }
}
