use crate::engines::generation::pareto::{self, MultiObjectiveIndividual};
use crate::types::{Fitness, Genome, Individual};

use std::collections::HashSet;

/// Every non-dominated plan seen since the start of the run.
///
/// Membership is by genome: a genome already archived is never added twice.
/// Plans with equal fitness but different genomes are both kept.
#[derive(Debug, Default, Clone)]
pub struct ParetoArchive {
    members: Vec<Individual>,
    seen_genomes: HashSet<Genome>,
}

impl ParetoArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempt to add a plan to the archive
    pub fn try_add(&mut self, candidate: &Individual) -> bool {
        let Some(fitness) = candidate.fitness else {
            return false;
        };
        // Failed simulations never enter the front
        if fitness.is_sentinel() {
            return false;
        }

        // Deduplication check
        if self.seen_genomes.contains(&candidate.genome) {
            return false;
        }

        let objectives = fitness.objectives();
        let dominated = self
            .members
            .iter()
            .any(|m| pareto::dominates(&member_objectives(m), &objectives));
        if dominated {
            return false;
        }

        let seen = &mut self.seen_genomes;
        self.members.retain(|m| {
            let keep = !pareto::dominates(&objectives, &member_objectives(m));
            if !keep {
                seen.remove(&m.genome);
            }
            keep
        });

        self.members.push(candidate.clone());
        self.seen_genomes.insert(candidate.genome.clone());
        true
    }

    /// Offer a whole population; returns how many plans entered the archive
    pub fn update(&mut self, population: &[Individual]) -> usize {
        population.iter().filter(|ind| self.try_add(ind)).count()
    }

    pub fn get_all(&self) -> &[Individual] {
        &self.members
    }

    /// Top N members, most isolated first (for capped reports)
    pub fn get_top_n(&self, n: usize) -> Vec<Individual> {
        let mut ranked: Vec<MultiObjectiveIndividual<usize>> = self
            .members
            .iter()
            .enumerate()
            .map(|(i, m)| MultiObjectiveIndividual::new(i, member_objectives(m).to_vec()))
            .collect();

        let front: Vec<usize> = (0..ranked.len()).collect();
        pareto::calculate_crowding_distance(&mut ranked, &front);
        ranked.sort_by(|a, b| {
            b.crowding_distance
                .partial_cmp(&a.crowding_distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        ranked
            .into_iter()
            .take(n)
            .map(|r| self.members[r.data].clone())
            .collect()
    }

    pub fn fitnesses(&self) -> Vec<Fitness> {
        self.members.iter().filter_map(|m| m.fitness).collect()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

fn member_objectives(member: &Individual) -> [f64; 3] {
    member.fitness.unwrap_or(Fitness::SENTINEL).objectives()
}
