//! Pareto optimization utilities for multi-objective evolution
//! Implements NSGA-II style fast non-dominated sorting, crowding distance and survivor selection.
//! Every objective is minimized.

use std::cmp::Ordering;

/// Individual with multiple objective values
#[derive(Debug, Clone)]
pub struct MultiObjectiveIndividual<T> {
    pub data: T,
    pub objectives: Vec<f64>,
    pub rank: usize,           // Pareto rank (0 = best frontier)
    pub crowding_distance: f64, // Diversity measure
}

impl<T> MultiObjectiveIndividual<T> {
    pub fn new(data: T, objectives: Vec<f64>) -> Self {
        Self {
            data,
            objectives,
            rank: 0,
            crowding_distance: 0.0,
        }
    }
}

/// Check if A dominates B: no worse in every objective and strictly better in at least one
pub fn dominates(a_objectives: &[f64], b_objectives: &[f64]) -> bool {
    if a_objectives.len() != b_objectives.len() {
        return false;
    }

    let mut at_least_one_better = false;

    for (a_val, b_val) in a_objectives.iter().zip(b_objectives) {
        if b_val < a_val {
            // B is better in this objective, so A does not dominate B
            return false;
        }
        if a_val < b_val {
            at_least_one_better = true;
        }
    }

    at_least_one_better
}

/// Fast non-dominated sorting (NSGA-II algorithm)
/// Returns individuals grouped by Pareto front (0 = best, 1 = second best, etc.)
pub fn fast_non_dominated_sort<T>(individuals: &mut [MultiObjectiveIndividual<T>]) -> Vec<Vec<usize>> {
    let n = individuals.len();
    if n == 0 {
        return Vec::new();
    }

    // domination_count: how many individuals dominate it
    // dominated_solutions: indices of individuals it dominates
    let mut domination_count = vec![0usize; n];
    let mut dominated_solutions: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut fronts: Vec<Vec<usize>> = Vec::new();

    let mut first_front = Vec::new();

    for i in 0..n {
        for j in 0..n {
            if i == j {
                continue;
            }

            if dominates(&individuals[i].objectives, &individuals[j].objectives) {
                dominated_solutions[i].push(j);
            } else if dominates(&individuals[j].objectives, &individuals[i].objectives) {
                domination_count[i] += 1;
            }
        }

        if domination_count[i] == 0 {
            individuals[i].rank = 0;
            first_front.push(i);
        }
    }

    fronts.push(first_front);

    let mut front_index = 0;
    while front_index < fronts.len() && !fronts[front_index].is_empty() {
        let mut next_front = Vec::new();

        for &i in &fronts[front_index] {
            for &j in &dominated_solutions[i] {
                domination_count[j] -= 1;
                if domination_count[j] == 0 {
                    individuals[j].rank = front_index + 1;
                    next_front.push(j);
                }
            }
        }

        if !next_front.is_empty() {
            next_front.sort_unstable();
            fronts.push(next_front);
        }
        front_index += 1;
    }

    fronts
}

/// Calculate crowding distance for individuals in a front
/// Higher values indicate more isolated (diverse) individuals
pub fn calculate_crowding_distance<T>(
    individuals: &mut [MultiObjectiveIndividual<T>],
    front_indices: &[usize],
) {
    let front_size = front_indices.len();
    if front_size == 0 {
        return;
    }

    if front_size <= 2 {
        for &idx in front_indices {
            individuals[idx].crowding_distance = f64::INFINITY;
        }
        return;
    }

    let num_objectives = individuals[front_indices[0]].objectives.len();

    for &idx in front_indices {
        individuals[idx].crowding_distance = 0.0;
    }

    for obj in 0..num_objectives {
        let mut sorted_indices: Vec<usize> = front_indices.to_vec();
        sorted_indices.sort_by(|&a, &b| {
            individuals[a].objectives[obj]
                .partial_cmp(&individuals[b].objectives[obj])
                .unwrap_or(Ordering::Equal)
        });

        // Boundary points have infinite distance
        individuals[sorted_indices[0]].crowding_distance = f64::INFINITY;
        individuals[sorted_indices[front_size - 1]].crowding_distance = f64::INFINITY;

        let min_val = individuals[sorted_indices[0]].objectives[obj];
        let max_val = individuals[sorted_indices[front_size - 1]].objectives[obj];
        let range = max_val - min_val;

        if range.abs() < 1e-10 || !range.is_finite() {
            continue;
        }

        for i in 1..(front_size - 1) {
            let idx = sorted_indices[i];
            let prev_val = individuals[sorted_indices[i - 1]].objectives[obj];
            let next_val = individuals[sorted_indices[i + 1]].objectives[obj];

            individuals[idx].crowding_distance += (next_val - prev_val) / range;
        }
    }
}

/// NSGA-II survivor selection.
///
/// Ranks and crowding distances are computed over the whole candidate set, whole fronts are
/// taken in rank order and the first front that does not fit is truncated by descending
/// crowding distance. Returns exactly `min(mu, candidates.len())` individuals.
pub fn select_survivors<T>(
    mut candidates: Vec<MultiObjectiveIndividual<T>>,
    mu: usize,
) -> Vec<MultiObjectiveIndividual<T>> {
    let fronts = fast_non_dominated_sort(&mut candidates);
    for front in &fronts {
        calculate_crowding_distance(&mut candidates, front);
    }

    let mut chosen: Vec<usize> = Vec::with_capacity(mu);
    for front in &fronts {
        if chosen.len() + front.len() <= mu {
            chosen.extend(front);
            continue;
        }

        let mut last = front.clone();
        last.sort_by(|&a, &b| {
            candidates[b]
                .crowding_distance
                .partial_cmp(&candidates[a].crowding_distance)
                .unwrap_or(Ordering::Equal)
        });
        chosen.extend(last.into_iter().take(mu - chosen.len()));
        break;
    }

    let mut slots: Vec<Option<MultiObjectiveIndividual<T>>> = candidates.into_iter().map(Some).collect();
    chosen
        .into_iter()
        .filter_map(|idx| slots[idx].take())
        .collect()
}
