//! CART regression tree with variance-reduction splits.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
enum Node {
    Leaf {
        value: f32,
    },
    Split {
        feature: usize,
        threshold: f32,
        left: usize,
        right: usize,
    },
}

/// Stopping criteria for tree growth.
#[derive(Debug, Clone, Copy)]
pub struct TreeParams {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

/// A single fitted regression tree. Nodes are stored in a flat arena;
/// index 0 is the root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<Node>,
}

impl RegressionTree {
    /// Fit a tree over the given row subset (duplicates allowed, which is
    /// how bootstrap samples are passed in).
    pub fn fit(x: &crate::math::Array2<f32>, y: &crate::math::Array1<f32>, rows: &[usize], params: &TreeParams) -> Self {
        let mut tree = RegressionTree { nodes: Vec::new() };
        tree.grow(x, y, rows.to_vec(), 0, params);
        tree
    }

    fn grow(
        &mut self,
        x: &crate::math::Array2<f32>,
        y: &crate::math::Array1<f32>,
        rows: Vec<usize>,
        depth: usize,
        params: &TreeParams,
    ) -> usize {
        let mean = leaf_value(y, &rows);

        let depth_reached = params.max_depth.map_or(false, |d| depth >= d);
        if depth_reached || rows.len() < params.min_samples_split {
            return self.push_leaf(mean);
        }

        let split = match best_split(x, y, &rows, params.min_samples_leaf) {
            Some(split) => split,
            None => return self.push_leaf(mean),
        };

        // Reserve the split slot before recursing so child indices are stable.
        let node_idx = self.nodes.len();
        self.nodes.push(Node::Leaf { value: mean });

        let left = self.grow(x, y, split.left_rows, depth + 1, params);
        let right = self.grow(x, y, split.right_rows, depth + 1, params);

        self.nodes[node_idx] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        node_idx
    }

    fn push_leaf(&mut self, value: f32) -> usize {
        self.nodes.push(Node::Leaf { value });
        self.nodes.len() - 1
    }

    pub fn predict_row(&self, row: &[f32]) -> f32 {
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
                    idx = if row[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }
}

fn leaf_value(y: &crate::math::Array1<f32>, rows: &[usize]) -> f32 {
    if rows.is_empty() {
        return 0.0;
    }
    let sum: f64 = rows.iter().map(|&r| y[r] as f64).sum();
    (sum / rows.len() as f64) as f32
}

struct BestSplit {
    feature: usize,
    threshold: f32,
    left_rows: Vec<usize>,
    right_rows: Vec<usize>,
}

/// Pick the (feature, threshold) pair minimizing the summed squared error of
/// the two children. Returns `None` when no split satisfies the leaf-size
/// constraint or reduces the error.
fn best_split(
    x: &crate::math::Array2<f32>,
    y: &crate::math::Array1<f32>,
    rows: &[usize],
    min_samples_leaf: usize,
) -> Option<BestSplit> {
    let n = rows.len();
    if n < 2 * min_samples_leaf {
        return None;
    }

    let total_sum: f64 = rows.iter().map(|&r| y[r] as f64).sum();
    let total_sum2: f64 = rows.iter().map(|&r| (y[r] as f64).powi(2)).sum();
    let parent_sse = total_sum2 - total_sum * total_sum / n as f64;
    if parent_sse <= 1e-12 {
        return None;
    }

    let mut best: Option<(f64, usize, f32)> = None;

    for feature in 0..x.ncols() {
        let mut ordered: Vec<(f32, f64)> = rows
            .iter()
            .map(|&r| (x[(r, feature)], y[r] as f64))
            .collect();
        ordered.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        let mut left_sum = 0.0f64;
        let mut left_sum2 = 0.0f64;
        for i in 1..n {
            left_sum += ordered[i - 1].1;
            left_sum2 += ordered[i - 1].1 * ordered[i - 1].1;

            if ordered[i].0 <= ordered[i - 1].0 {
                continue;
            }
            if i < min_samples_leaf || n - i < min_samples_leaf {
                continue;
            }

            let right_sum = total_sum - left_sum;
            let right_sum2 = total_sum2 - left_sum2;
            let left_sse = left_sum2 - left_sum * left_sum / i as f64;
            let right_sse = right_sum2 - right_sum * right_sum / (n - i) as f64;
            let sse = left_sse + right_sse;

            if best.map_or(sse < parent_sse - 1e-12, |(b, _, _)| sse < b) {
                let threshold = (ordered[i - 1].0 + ordered[i].0) / 2.0;
                best = Some((sse, feature, threshold));
            }
        }
    }

    let (_, feature, threshold) = best?;
    let mut left_rows = Vec::new();
    let mut right_rows = Vec::new();
    for &r in rows {
        if x[(r, feature)] <= threshold {
            left_rows.push(r);
        } else {
            right_rows.push(r);
        }
    }
    Some(BestSplit {
        feature,
        threshold,
        left_rows,
        right_rows,
    })
}
