//! Painter's algorithm ordering.
//!
//! Both strategies return a permutation of indices into the projected face
//! list, farthest first. The list itself is never reordered. Ties keep input
//! order, so the two strategies always agree.

use serde::{Deserialize, Serialize};

/// How the per-frame depth order is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortStrategy {
    /// Stable merge sort, O(n log n) regardless of input order.
    Comparison,
    /// Stable insertion sort. Near linear when the order barely changes
    /// between frames, quadratic in the worst case.
    #[default]
    Insertion,
}

impl SortStrategy {
    /// Indices of `depths` ordered by descending depth.
    pub fn order(self, depths: &[f32]) -> Vec<usize> {
        match self {
            SortStrategy::Comparison => comparison_order(depths),
            SortStrategy::Insertion => insertion_order(depths),
        }
    }
}

fn comparison_order(depths: &[f32]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..depths.len()).collect();
    order.sort_by(|&a, &b| depths[b].total_cmp(&depths[a]));
    order
}

fn insertion_order(depths: &[f32]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..depths.len()).collect();
    for i in 1..order.len() {
        let current = order[i];
        let mut j = i;
        // Strictly nearer than the moving element: ties stay put.
        while j > 0 && depths[order[j - 1]] < depths[current] {
            order[j] = order[j - 1];
            j -= 1;
        }
        order[j] = current;
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted_depths(depths: &[f32], order: &[usize]) -> Vec<f32> {
        order.iter().map(|&i| depths[i]).collect()
    }

    #[test]
    fn orders_farthest_first() {
        let depths = [3.0, 9.0, 1.0, 4.0];
        for strategy in [SortStrategy::Comparison, SortStrategy::Insertion] {
            assert_eq!(strategy.order(&depths), vec![1, 3, 0, 2]);
        }
    }

    #[test]
    fn sorted_input_is_the_identity() {
        let depths = [10.0, 8.0, 8.0, 2.0, 0.5];
        for strategy in [SortStrategy::Comparison, SortStrategy::Insertion] {
            assert_eq!(strategy.order(&depths), vec![0, 1, 2, 3, 4]);
        }
    }

    #[test]
    fn ties_keep_input_order() {
        let depths = [2.0, 5.0, 2.0, 5.0, 2.0];
        for strategy in [SortStrategy::Comparison, SortStrategy::Insertion] {
            assert_eq!(strategy.order(&depths), vec![1, 3, 0, 2, 4]);
        }
    }

    #[test]
    fn strategies_agree_on_random_input() {
        let mut rng = fastrand::Rng::with_seed(42);
        let depths: Vec<f32> = (0..500).map(|_| (rng.u32(0..50)) as f32).collect();

        let comparison = SortStrategy::Comparison.order(&depths);
        let insertion = SortStrategy::Insertion.order(&depths);
        assert_eq!(comparison, insertion);

        let sorted = sorted_depths(&depths, &comparison);
        assert!(sorted.windows(2).all(|w| w[0] >= w[1]));
        // Sorting the already sorted depths changes nothing.
        assert_eq!(
            SortStrategy::Insertion.order(&sorted),
            (0..sorted.len()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn empty_input() {
        assert!(SortStrategy::Comparison.order(&[]).is_empty());
        assert!(SortStrategy::Insertion.order(&[]).is_empty());
    }
}
