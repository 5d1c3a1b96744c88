//! Random forest inference over scikit-learn's exported tree arrays.
//!
//! Each tree is stored the way `sklearn.tree._tree.Tree` stores it: parallel
//! arrays indexed by node id, children listed after their parent, leaves
//! marked by `children_left == -1`. Only inference lives here.

use serde::{Deserialize, Deserializer};

use crate::error::ModelError;

/// Leaf marker used by scikit-learn in `children_left`/`children_right`.
const TREE_LEAF: i64 = -1;

/// One tree as exported from a fitted estimator's `tree_` attribute.
#[derive(Debug, Clone, Deserialize)]
pub struct TreeArrays {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    /// Per-node class weights, `value[node][class]`.
    ///
    /// Also accepts scikit-learn's native `(n_nodes, n_outputs, n_classes)`
    /// layout, i.e. `tree_.value.tolist()` as is, when `n_outputs == 1`.
    #[serde(deserialize_with = "single_output_values")]
    pub value: Vec<Vec<f64>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NodeValue {
    Classes(Vec<f64>),
    Outputs(Vec<Vec<f64>>),
}

fn single_output_values<'de, D>(deserializer: D) -> Result<Vec<Vec<f64>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<NodeValue>::deserialize(deserializer)?;
    raw.into_iter()
        .enumerate()
        .map(|(id, v)| match v {
            NodeValue::Classes(weights) => Ok(weights),
            NodeValue::Outputs(mut outputs) if outputs.len() == 1 => Ok(outputs.remove(0)),
            NodeValue::Outputs(outputs) => Err(serde::de::Error::custom(format!(
                "node {id} has {} outputs, only single-output classifiers are supported",
                outputs.len()
            ))),
        })
        .collect()
}

#[derive(Debug, Clone)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        proba: Vec<f64>,
    },
}

#[derive(Debug, Clone)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    /// Validates the arrays and normalises leaf weights to distributions.
    ///
    /// Children must point forward (`child > parent`), which scikit-learn's
    /// depth-first builder guarantees and which rules out cycles.
    pub fn from_arrays(
        index: usize,
        arrays: &TreeArrays,
        n_features: usize,
        n_classes: usize,
    ) -> Result<Self, ModelError> {
        let invalid = |reason: String| ModelError::InvalidTree {
            tree: index,
            reason,
        };

        let n = arrays.children_left.len();
        if n == 0 {
            return Err(invalid("no nodes".into()));
        }
        if arrays.children_right.len() != n
            || arrays.feature.len() != n
            || arrays.threshold.len() != n
            || arrays.value.len() != n
        {
            return Err(invalid("inconsistent array lengths".into()));
        }

        let mut nodes = Vec::with_capacity(n);
        for id in 0..n {
            let left = arrays.children_left[id];
            let right = arrays.children_right[id];

            if left == TREE_LEAF || right == TREE_LEAF {
                if left != right {
                    return Err(invalid(format!("node {id} has a single child")));
                }
                let weights = &arrays.value[id];
                if weights.len() != n_classes {
                    return Err(invalid(format!(
                        "leaf {id} has {} class weights, expected {n_classes}",
                        weights.len()
                    )));
                }
                if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
                    return Err(invalid(format!("leaf {id} has a negative or non-finite weight")));
                }
                let total: f64 = weights.iter().sum();
                if total <= 0.0 {
                    return Err(invalid(format!("leaf {id} has zero total weight")));
                }
                nodes.push(Node::Leaf {
                    proba: weights.iter().map(|w| w / total).collect(),
                });
                continue;
            }

            let child_ok = |c: i64| c > id as i64 && (c as usize) < n;
            if !child_ok(left) || !child_ok(right) {
                return Err(invalid(format!(
                    "node {id} has out-of-order children ({left}, {right})"
                )));
            }
            let feature = arrays.feature[id];
            if feature < 0 || feature as usize >= n_features {
                return Err(invalid(format!(
                    "node {id} splits on feature {feature}, model has {n_features}"
                )));
            }
            let threshold = arrays.threshold[id];
            if threshold.is_nan() {
                return Err(invalid(format!("node {id} has a NaN threshold")));
            }
            nodes.push(Node::Split {
                feature: feature as usize,
                threshold,
                left: left as usize,
                right: right as usize,
            });
        }

        Ok(Self { nodes })
    }

    /// Class distribution at the leaf `x` falls into.
    pub fn predict_proba(&self, x: &[f64]) -> &[f64] {
        let mut id = 0;
        loop {
            match &self.nodes[id] {
                Node::Leaf { proba } => return proba,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    // sklearn compares in float32 space against f64 thresholds
                    let v = x[*feature] as f32 as f64;
                    id = if v <= *threshold { *left } else { *right };
                }
            }
        }
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn depth(&self) -> usize {
        self.node_depth(0)
    }

    fn node_depth(&self, id: usize) -> usize {
        match &self.nodes[id] {
            Node::Leaf { .. } => 0,
            Node::Split { left, right, .. } => {
                1 + self.node_depth(*left).max(self.node_depth(*right))
            }
        }
    }
}

/// Soft-voting ensemble: the mean of every tree's leaf distribution.
#[derive(Debug, Clone)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    n_features: usize,
    n_classes: usize,
}

impl RandomForest {
    pub fn from_arrays(
        trees: &[TreeArrays],
        n_features: usize,
        n_classes: usize,
    ) -> Result<Self, ModelError> {
        if trees.is_empty() {
            return Err(ModelError::EmptyForest);
        }
        let trees = trees
            .iter()
            .enumerate()
            .map(|(i, t)| DecisionTree::from_arrays(i, t, n_features, n_classes))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            trees,
            n_features,
            n_classes,
        })
    }

    /// Mean class distribution over all trees.
    ///
    /// `x` must hold `n_features` values; the caller owns that contract.
    pub fn predict_proba(&self, x: &[f64]) -> Vec<f64> {
        debug_assert_eq!(x.len(), self.n_features);
        let mut acc = vec![0.0; self.n_classes];
        for tree in &self.trees {
            for (a, p) in acc.iter_mut().zip(tree.predict_proba(x)) {
                *a += p;
            }
        }
        let n = self.trees.len() as f64;
        acc.iter_mut().for_each(|a| *a /= n);
        acc
    }

    /// Index of the most probable class; ties go to the lower index.
    pub fn predict(&self, x: &[f64]) -> usize {
        argmax(&self.predict_proba(x))
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn total_nodes(&self) -> usize {
        self.trees.iter().map(DecisionTree::n_nodes).sum()
    }

    pub fn max_depth(&self) -> usize {
        self.trees.iter().map(DecisionTree::depth).max().unwrap_or(0)
    }
}

/// First index holding the maximum, like `numpy.argmax`.
pub(crate) fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate().skip(1) {
        if *v > values[best] {
            best = i;
        }
    }
    best
}
