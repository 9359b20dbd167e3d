use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use retroplan::engines::evaluation::phasing::reconstruct;
use retroplan::RetroplanError;

fn random_case(rng: &mut StdRng, tasks: usize) -> (Vec<u32>, Vec<f64>) {
    let mut order: Vec<u32> = (0..tasks as u32).collect();
    order.shuffle(rng);
    let costs = (0..tasks).map(|_| rng.gen_range(0..50) as f64 * 100.0).collect();
    (order, costs)
}

#[test]
fn test_cumulative_spend_never_exceeds_cumulative_budget() {
    let mut rng = StdRng::seed_from_u64(2024);
    let budgets = [20_000.0, 20_000.0, 40_000.0, 200_000.0];

    for _ in 0..300 {
        let (order, costs) = random_case(&mut rng, 12);
        let plan = match reconstruct(&budgets, &order, &costs) {
            Ok(plan) => plan,
            Err(RetroplanError::BudgetOverflow { .. }) => continue,
            Err(e) => panic!("unexpected error: {e}"),
        };

        assert_eq!(plan.assignment.len(), 12);
        let mut spent_so_far = 0.0;
        let mut budget_so_far = 0.0;
        for (phase, budget) in budgets.iter().enumerate() {
            spent_so_far += plan.tasks_in(phase).iter().map(|&t| costs[t]).sum::<f64>();
            budget_so_far += budget;
            assert!(spent_so_far <= budget_so_far);
        }
    }
}

#[test]
fn test_phases_follow_task_order() {
    let mut rng = StdRng::seed_from_u64(7);
    let budgets = [10_000.0, 10_000.0, 10_000.0, 1_000_000.0];

    for _ in 0..200 {
        let (order, costs) = random_case(&mut rng, 8);
        let plan = reconstruct(&budgets, &order, &costs).unwrap();

        // a task ranked later never lands in an earlier phase
        for a in 0..8 {
            for b in 0..8 {
                if order[a] < order[b] {
                    assert!(plan.assignment[a] <= plan.assignment[b]);
                }
            }
        }
    }
}

#[test]
fn test_total_cost_above_total_budget_is_fatal() {
    let order = [0, 1, 2];
    let costs = [30.0, 30.0, 30.0];

    let err = reconstruct(&[40.0, 40.0], &order, &costs).unwrap_err();
    assert!(matches!(err, RetroplanError::BudgetOverflow { phase: 1, task: 2, .. }));
    assert!(err.is_fatal());
}
