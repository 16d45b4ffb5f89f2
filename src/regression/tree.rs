//! CART regression tree (variance reduction) used by the forest.
//!
//! Nodes live in a flat arena; node 0 is the root. A split sends a row left
//! when `x[feature] <= threshold`.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::features::FeatureVector;

/// Minimum impurity decrease for a split to be accepted.
const MIN_SPLIT_GAIN: f64 = 1e-12;

#[derive(Debug, Clone, Serialize, Deserialize)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// Growth limits for a single tree.
#[derive(Debug, Clone, Copy)]
pub struct TreeParams {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features drawn per split before accepting the best one found
    pub max_features: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<Node>,
    /// Total weighted impurity decrease per feature (un-normalized)
    impurity_decrease: Vec<f64>,
}

/// Sums over the rows of one node.
#[derive(Debug, Clone, Copy, Default)]
struct NodeStats {
    count: f64,
    sum: f64,
    sum_sq: f64,
}

impl NodeStats {
    fn add(&mut self, y: f64) {
        self.count += 1.0;
        self.sum += y;
        self.sum_sq += y * y;
    }

    /// Sum of squared errors around the node mean.
    fn sse(&self) -> f64 {
        if self.count == 0.0 {
            0.0
        } else {
            (self.sum_sq - self.sum * self.sum / self.count).max(0.0)
        }
    }

    fn mean(&self) -> f64 {
        if self.count == 0.0 {
            0.0
        } else {
            self.sum / self.count
        }
    }
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    gain: f64,
}

impl RegressionTree {
    /// Grow a tree over `rows` (indices into `features`, duplicates allowed).
    pub fn fit(
        features: &[FeatureVector],
        labels: &[f64],
        mut rows: Vec<usize>,
        n_features: usize,
        params: TreeParams,
        rng: &mut StdRng,
    ) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            impurity_decrease: vec![0.0; n_features],
        };
        tree.grow(features, labels, &mut rows, 0, params, rng);
        tree
    }

    fn grow(
        &mut self,
        features: &[FeatureVector],
        labels: &[f64],
        rows: &mut [usize],
        depth: usize,
        params: TreeParams,
        rng: &mut StdRng,
    ) -> usize {
        let mut stats = NodeStats::default();
        for &r in rows.iter() {
            stats.add(labels[r]);
        }

        let node_idx = self.nodes.len();
        self.nodes.push(Node::Leaf { value: stats.mean() });

        let depth_exhausted = params.max_depth.is_some_and(|d| depth >= d);
        if depth_exhausted || rows.len() < params.min_samples_split || stats.sse() <= MIN_SPLIT_GAIN {
            return node_idx;
        }

        let Some(best) = self.find_split(features, labels, rows, &stats, params, rng) else {
            return node_idx;
        };

        // Partition rows in place: left block first
        let mut split_at = 0;
        for i in 0..rows.len() {
            if features[rows[i]][best.feature] <= best.threshold {
                rows.swap(i, split_at);
                split_at += 1;
            }
        }
        if split_at == 0 || split_at == rows.len() {
            return node_idx;
        }

        self.impurity_decrease[best.feature] += best.gain;

        let (left_rows, right_rows) = rows.split_at_mut(split_at);
        let left = self.grow(features, labels, left_rows, depth + 1, params, rng);
        let right = self.grow(features, labels, right_rows, depth + 1, params, rng);

        self.nodes[node_idx] = Node::Split {
            feature: best.feature,
            threshold: best.threshold,
            left,
            right,
        };
        node_idx
    }

    /// Best split over a random feature subset.
    ///
    /// Features are visited in random order; after `max_features` have been
    /// examined the search stops as soon as a valid split is known.
    fn find_split(
        &self,
        features: &[FeatureVector],
        labels: &[f64],
        rows: &[usize],
        parent: &NodeStats,
        params: TreeParams,
        rng: &mut StdRng,
    ) -> Option<BestSplit> {
        let mut order: Vec<usize> = (0..self.impurity_decrease.len()).collect();
        order.shuffle(rng);

        let parent_sse = parent.sse();
        let min_leaf = params.min_samples_leaf.max(1);
        let mut best: Option<BestSplit> = None;
        let mut sorted: Vec<(f64, f64)> = Vec::with_capacity(rows.len());

        for (visited, &feature) in order.iter().enumerate() {
            if visited >= params.max_features && best.is_some() {
                break;
            }

            sorted.clear();
            sorted.extend(rows.iter().map(|&r| (features[r][feature], labels[r])));
            sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut left = NodeStats::default();
            for i in 0..sorted.len() - 1 {
                left.add(sorted[i].1);
                let n_left = i + 1;
                let n_right = sorted.len() - n_left;
                if n_left < min_leaf || n_right < min_leaf {
                    continue;
                }
                let (lo, hi) = (sorted[i].0, sorted[i + 1].0);
                if hi <= lo {
                    continue;
                }

                let right = NodeStats {
                    count: parent.count - left.count,
                    sum: parent.sum - left.sum,
                    sum_sq: parent.sum_sq - left.sum_sq,
                };
                let gain = parent_sse - left.sse() - right.sse();
                if gain <= MIN_SPLIT_GAIN || best.as_ref().is_some_and(|b| gain <= b.gain) {
                    continue;
                }

                let mut threshold = lo + (hi - lo) / 2.0;
                if threshold >= hi {
                    threshold = lo;
                }
                best = Some(BestSplit { feature, threshold, gain });
            }
        }

        best
    }

    pub fn predict_row(&self, x: &FeatureVector) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if x[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }

    /// Impurity decrease per feature, normalized to sum to 1 (zeros if the
    /// tree never split).
    pub fn normalized_importance(&self) -> Vec<f64> {
        let total: f64 = self.impurity_decrease.iter().sum();
        if total > 0.0 {
            self.impurity_decrease.iter().map(|v| v / total).collect()
        } else {
            vec![0.0; self.impurity_decrease.len()]
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}
