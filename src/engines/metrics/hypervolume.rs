// src/engines/metrics/hypervolume.rs
use crate::types::Fitness;
use std::cmp::Ordering;

/// Reference point scale applied to the per-objective maximum of the archive
pub const REFERENCE_SCALE: f64 = 1.5;

/// Exact dominated hypervolume of `points` (minimization) bounded by `reference`.
///
/// Points not strictly better than the reference in every objective contribute nothing.
/// Dimensions above two are handled by slicing along the last objective.
pub fn hypervolume(points: &[Vec<f64>], reference: &[f64]) -> f64 {
    let inside: Vec<Vec<f64>> = points
        .iter()
        .filter(|p| p.len() == reference.len() && p.iter().zip(reference).all(|(v, r)| v < r))
        .cloned()
        .collect();

    slice_volume(inside, reference)
}

fn slice_volume(mut points: Vec<Vec<f64>>, reference: &[f64]) -> f64 {
    let dims = reference.len();
    if points.is_empty() || dims == 0 {
        return 0.0;
    }

    match dims {
        1 => {
            let best = points.iter().map(|p| p[0]).fold(f64::INFINITY, f64::min);
            reference[0] - best
        }
        2 => {
            points.sort_by(|a, b| {
                a[0].partial_cmp(&b[0])
                    .unwrap_or(Ordering::Equal)
                    .then(a[1].partial_cmp(&b[1]).unwrap_or(Ordering::Equal))
            });

            let mut volume = 0.0;
            let mut ceiling = reference[1];
            for p in &points {
                if p[1] < ceiling {
                    volume += (reference[0] - p[0]) * (ceiling - p[1]);
                    ceiling = p[1];
                }
            }
            volume
        }
        _ => {
            let last = dims - 1;
            points.sort_by(|a, b| a[last].partial_cmp(&b[last]).unwrap_or(Ordering::Equal));

            let mut volume = 0.0;
            for i in 0..points.len() {
                let upper = points.get(i + 1).map_or(reference[last], |p| p[last]);
                let depth = upper - points[i][last];
                if depth <= 0.0 {
                    continue;
                }
                let slice: Vec<Vec<f64>> = points[..=i].iter().map(|p| p[..last].to_vec()).collect();
                volume += slice_volume(slice, &reference[..last]) * depth;
            }
            volume
        }
    }
}

/// Reference point: `REFERENCE_SCALE` times the per-objective maximum
pub fn reference_point(fitnesses: &[Fitness]) -> Option<Vec<f64>> {
    let first = fitnesses.first()?;
    let mut max = first.objectives();
    for f in &fitnesses[1..] {
        for (m, v) in max.iter_mut().zip(f.objectives()) {
            *m = m.max(v);
        }
    }
    Some(max.iter().map(|m| m * REFERENCE_SCALE).collect())
}

/// Records the archive hypervolume once per generation
#[derive(Debug, Default, Clone)]
pub struct ConvergenceMonitor {
    history: Vec<f64>,
}

impl ConvergenceMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hypervolume of the given front; failed evaluations are left out
    pub fn record(&mut self, front: &[Fitness]) -> f64 {
        let usable: Vec<Fitness> = front.iter().copied().filter(|f| !f.is_sentinel()).collect();

        let volume = match reference_point(&usable) {
            Some(reference) => {
                let points: Vec<Vec<f64>> = usable.iter().map(|f| f.objectives().to_vec()).collect();
                hypervolume(&points, &reference)
            }
            None => 0.0,
        };

        self.history.push(volume);
        volume
    }

    pub fn history(&self) -> &[f64] {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_point_is_a_box() {
        let hv = hypervolume(&[vec![1.0, 1.0, 1.0]], &[2.0, 3.0, 4.0]);
        assert!((hv - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_two_dimensional_staircase() {
        let points = vec![vec![1.0, 3.0], vec![2.0, 2.0], vec![3.0, 1.0]];
        // 3*1 + 2*1 + 1*1
        let hv = hypervolume(&points, &[4.0, 4.0]);
        assert!((hv - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_overlapping_boxes_in_three_dimensions() {
        let points = vec![vec![0.0, 1.0, 1.0], vec![1.0, 0.0, 1.0]];
        // two 2x1x1 boxes sharing a 1x1x1 cube
        let hv = hypervolume(&points, &[2.0, 2.0, 2.0]);
        assert!((hv - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_dominated_points_add_nothing() {
        let front = vec![vec![1.0, 1.0, 1.0]];
        let with_dominated = vec![vec![1.0, 1.0, 1.0], vec![1.5, 1.5, 1.5]];
        let reference = [3.0, 3.0, 3.0];
        assert_eq!(hypervolume(&front, &reference), hypervolume(&with_dominated, &reference));
    }

    #[test]
    fn test_monitor_skips_sentinels() {
        let mut monitor = ConvergenceMonitor::new();
        let hv = monitor.record(&[Fitness::new(2.0, 2.0, 2.0), Fitness::SENTINEL]);
        // reference = (3, 3, 3)
        assert!((hv - 1.0).abs() < 1e-12);
        assert_eq!(monitor.history(), &[1.0]);
        assert_eq!(monitor.record(&[]), 0.0);
    }
}
