use crate::engines::generation::genome::GenomeLayout;
use crate::types::Genome;
use rand::Rng;

/// Binary tournament on (genome, pareto rank, crowding distance).
///
/// Lower rank wins; equal ranks go to the larger crowding distance, then to a coin flip.
pub fn pareto_tournament_selection<R: Rng>(
    population: &[(Genome, usize, f64)],
    rng: &mut R,
) -> Genome {
    let a = &population[rng.gen_range(0..population.len())];
    let b = &population[rng.gen_range(0..population.len())];

    let winner = if a.1 != b.1 {
        if a.1 < b.1 { a } else { b }
    } else if a.2 != b.2 {
        if a.2 > b.2 { a } else { b }
    } else if rng.gen::<bool>() {
        a
    } else {
        b
    };

    winner.0.clone()
}

/// Single-point crossover: swap genome segments
pub fn crossover<R: Rng>(
    parent1: &[u32],
    parent2: &[u32],
    rng: &mut R,
) -> (Genome, Genome) {
    let len = parent1.len().min(parent2.len());
    if len <= 1 {
        return (parent1.to_vec(), parent2.to_vec());
    }

    let point = rng.gen_range(1..len);

    let mut child1 = parent1.to_vec();
    let mut child2 = parent2.to_vec();

    child1[point..len].copy_from_slice(&parent2[point..len]);
    child2[point..len].copy_from_slice(&parent1[point..len]);

    (child1, child2)
}

/// Partially matched crossover on two permutations of `0..n`.
///
/// The segment `[cx1, cx2)` is exchanged value by value; each exchange is mirrored at
/// the position currently holding the incoming value, so both children stay permutations.
pub fn partially_matched_crossover<R: Rng>(
    parent1: &[u32],
    parent2: &[u32],
    rng: &mut R,
) -> (Genome, Genome) {
    let size = parent1.len().min(parent2.len());
    let mut child1 = parent1.to_vec();
    let mut child2 = parent2.to_vec();
    if size < 2 {
        return (child1, child2);
    }

    // position of each value
    let mut pos1 = vec![0usize; size];
    let mut pos2 = vec![0usize; size];
    for i in 0..size {
        pos1[child1[i] as usize] = i;
        pos2[child2[i] as usize] = i;
    }

    let mut cx1 = rng.gen_range(0..size);
    let mut cx2 = rng.gen_range(0..size - 1);
    if cx2 >= cx1 {
        cx2 += 1;
    } else {
        std::mem::swap(&mut cx1, &mut cx2);
    }

    for i in cx1..cx2 {
        let v1 = child1[i];
        let v2 = child2[i];

        child1[i] = v2;
        child1[pos1[v2 as usize]] = v1;
        child2[i] = v1;
        child2[pos2[v1 as usize]] = v2;

        pos1.swap(v1 as usize, v2 as usize);
        pos2.swap(v1 as usize, v2 as usize);
    }

    (child1, child2)
}

/// Resample each operational gene within its bound with probability `rate`
pub fn mutate_uniform<R: Rng>(
    operational: &mut [u32],
    layout: &GenomeLayout,
    rate: f64,
    rng: &mut R,
) {
    for (i, gene) in operational.iter_mut().enumerate() {
        if rng.gen::<f64>() < rate {
            *gene = rng.gen_range(layout.bound_at(i).range());
        }
    }
}

/// With probability `rate` per position, swap it with another random position
pub fn mutate_shuffle<R: Rng>(order: &mut [u32], rate: f64, rng: &mut R) {
    let size = order.len();
    if size < 2 {
        return;
    }
    for i in 0..size {
        if rng.gen::<f64>() < rate {
            let mut j = rng.gen_range(0..size - 1);
            if j >= i {
                j += 1;
            }
            order.swap(i, j);
        }
    }
}

/// Phase-aware crossover: single-point on the operational halves, PMX on the temporal halves
pub fn cross<R: Rng>(
    layout: &GenomeLayout,
    parent1: &[u32],
    parent2: &[u32],
    rng: &mut R,
) -> (Genome, Genome) {
    if !layout.is_temporal() {
        return crossover(parent1, parent2, rng);
    }

    let (ope1, order1) = layout.split(parent1);
    let (ope2, order2) = layout.split(parent2);

    let (mut child1, mut child2) = crossover(ope1, ope2, rng);
    let (order1, order2) = partially_matched_crossover(order1, order2, rng);
    child1.extend(order1);
    child2.extend(order2);

    (child1, child2)
}

/// Phase-aware mutation with per-gene rate `1 / operational genes`
pub fn mutate<R: Rng>(layout: &GenomeLayout, genome: &mut Genome, rng: &mut R) {
    let n = layout.operational_len();
    if n == 0 {
        return;
    }
    let rate = 1.0 / n as f64;

    let split = n.min(genome.len());
    let (operational, order) = genome.split_at_mut(split);
    mutate_uniform(operational, layout, rate, rng);
    if layout.is_temporal() {
        mutate_shuffle(order, rate, rng);
    }
}
