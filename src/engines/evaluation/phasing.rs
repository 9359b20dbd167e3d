//! Phase reconstruction from a task ordering and per-phase budgets
//!
//! Tasks are taken in rank order and packed into the current phase while the
//! phase budget allows. The first task that does not fit closes the phase: the
//! unspent remainder moves to the next phase and packing resumes there with that
//! same task. A task that does not fit the last phase is a fatal budget overflow.

use crate::engines::generation::genome::is_permutation;
use crate::error::{Result, RetroplanError};

/// Phase of every task plus the unspent budget left in each phase
#[derive(Debug, Clone, PartialEq)]
pub struct PhasePlan {
    /// `assignment[task]` = phase index
    pub assignment: Vec<usize>,
    /// Residual budget per phase after packing; carried remainders count in the receiving phase
    pub ledger: Vec<f64>,
}

impl PhasePlan {
    /// Sequenced plan: every task is its own phase, its rank being the phase index
    pub fn sequenced(order: &[u32]) -> Result<Self> {
        check_order(order)?;
        Ok(Self {
            assignment: order.iter().map(|&rank| rank as usize).collect(),
            ledger: Vec::new(),
        })
    }

    pub fn max_phase(&self) -> usize {
        self.assignment.iter().copied().max().unwrap_or(0)
    }

    pub fn tasks_in(&self, phase: usize) -> Vec<usize> {
        self.assignment
            .iter()
            .enumerate()
            .filter(|(_, p)| **p == phase)
            .map(|(task, _)| task)
            .collect()
    }
}

/// Pack tasks into phases; `budgets` is copied, the caller's ledger is never touched
pub fn reconstruct(budgets: &[f64], order: &[u32], costs: &[f64]) -> Result<PhasePlan> {
    check_order(order)?;
    if costs.len() != order.len() {
        return Err(RetroplanError::CostModel(format!(
            "{} task costs for {} tasks",
            costs.len(),
            order.len()
        )));
    }

    let mut by_rank = vec![0usize; order.len()];
    for (task, &rank) in order.iter().enumerate() {
        by_rank[rank as usize] = task;
    }

    let mut ledger = budgets.to_vec();
    let mut assignment = vec![0usize; order.len()];
    let mut next = 0; // rank of the first unassigned task

    for phase in 0..ledger.len() {
        let mut spent = 0.0;

        while next < by_rank.len() {
            let task = by_rank[next];
            let cost = costs[task];
            if spent + cost <= ledger[phase] {
                spent += cost;
                assignment[task] = phase;
                next += 1;
                continue;
            }

            let remaining = ledger[phase] - spent;
            if phase + 1 == ledger.len() {
                return Err(RetroplanError::BudgetOverflow {
                    phase,
                    task,
                    cost,
                    remaining,
                });
            }
            ledger[phase + 1] += remaining;
            ledger[phase] = spent;
            break;
        }

        ledger[phase] -= spent;
        if next == by_rank.len() {
            break;
        }
    }

    if next < by_rank.len() {
        return Err(RetroplanError::Configuration(
            "no phase budgets configured for a phased plan".to_string(),
        ));
    }

    Ok(PhasePlan { assignment, ledger })
}

fn check_order(order: &[u32]) -> Result<()> {
    if is_permutation(order) {
        Ok(())
    } else {
        Err(RetroplanError::Configuration(format!(
            "task order {:?} is not a permutation",
            order
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remainder_carries_over() {
        // ranks: task 2, task 0, task 1, task 3
        let order = [1, 2, 0, 3];
        let costs = [40.0, 50.0, 30.0, 10.0];
        let plan = reconstruct(&[60.0, 60.0, 60.0], &order, &costs).unwrap();

        // phase 0: task 2 (30), task 0 does not fit; 30 moves on
        // phase 1: 90 available, task 0 (40) + task 1 (50)
        // phase 2: task 3 (10)
        assert_eq!(plan.assignment, vec![1, 1, 0, 2]);
        assert_eq!(plan.ledger, vec![0.0, 0.0, 50.0]);
        assert_eq!(plan.max_phase(), 2);
        assert_eq!(plan.tasks_in(1), vec![0, 1]);
    }

    #[test]
    fn test_overflow_in_last_phase() {
        let err = reconstruct(&[10.0, 10.0], &[0, 1], &[5.0, 100.0]).unwrap_err();
        match err {
            RetroplanError::BudgetOverflow { phase, task, .. } => {
                assert_eq!(phase, 1);
                assert_eq!(task, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_zero_cost_tasks_fit_empty_budgets() {
        let plan = reconstruct(&[0.0, 0.0], &[1, 0], &[0.0, 0.0]).unwrap();
        assert_eq!(plan.assignment, vec![0, 0]);
    }

    #[test]
    fn test_task_landing_exactly_on_the_budget_fits() {
        let plan = reconstruct(&[10.0, 10.0], &[0, 1], &[4.0, 6.0]).unwrap();
        assert_eq!(plan.assignment, vec![0, 0]);
        assert_eq!(plan.ledger, vec![0.0, 10.0]);

        let plan = reconstruct(&[10.0, 10.0], &[0, 1], &[4.0, 6.5]).unwrap();
        assert_eq!(plan.assignment, vec![0, 1]);
    }

    #[test]
    fn test_budgets_are_not_mutated() {
        let budgets = vec![5.0, 5.0];
        reconstruct(&budgets, &[0, 1], &[4.0, 4.0]).unwrap();
        reconstruct(&budgets, &[0, 1], &[4.0, 4.0]).unwrap();
        assert_eq!(budgets, vec![5.0, 5.0]);
    }

    #[test]
    fn test_sequenced_uses_ranks_as_phases() {
        let plan = PhasePlan::sequenced(&[2, 0, 1]).unwrap();
        assert_eq!(plan.assignment, vec![2, 0, 1]);
        assert_eq!(plan.max_phase(), 2);
        assert!(PhasePlan::sequenced(&[0, 0, 1]).is_err());
    }
}
