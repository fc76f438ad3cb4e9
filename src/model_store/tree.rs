use serde::Deserialize;

use crate::ensemble::Predictor;
use crate::error::ForecastError;

/// How per-tree outputs are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    /// Gradient boosting: `base_score + Σ tree`.
    Sum,
    /// Bagging (random forest): mean of trees.
    Mean,
}

/// One binary regression tree in flat array form.
///
/// Node `i` sends a row left when `x[split_feature[i]] <= threshold[i]`.
/// A negative child `c` points at leaf `-c - 1`. A tree with no internal
/// nodes is a single leaf.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RegressionTree {
    #[serde(default)]
    pub split_feature: Vec<usize>,
    #[serde(default)]
    pub threshold: Vec<f64>,
    #[serde(default)]
    pub left_child: Vec<i32>,
    #[serde(default)]
    pub right_child: Vec<i32>,
    pub leaf_value: Vec<f64>,
}

impl RegressionTree {
    fn validate(&self, n_features: usize) -> Result<(), String> {
        let internal = self.split_feature.len();
        if self.threshold.len() != internal
            || self.left_child.len() != internal
            || self.right_child.len() != internal
        {
            return Err("split/threshold/child length mismatch".to_string());
        }
        if self.leaf_value.is_empty() {
            return Err("tree has no leaves".to_string());
        }
        for node in 0..internal {
            if self.split_feature[node] >= n_features {
                return Err(format!(
                    "node {} splits on feature {} of {}",
                    node, self.split_feature[node], n_features
                ));
            }
            for child in [self.left_child[node], self.right_child[node]] {
                if child < 0 {
                    if (-child - 1) as usize >= self.leaf_value.len() {
                        return Err(format!("node {} points at missing leaf {}", node, -child - 1));
                    }
                } else if child as usize <= node || child as usize >= internal {
                    // Children always come after their parent, which rules out cycles.
                    return Err(format!("node {} has invalid child {}", node, child));
                }
            }
        }
        Ok(())
    }

    pub fn predict(&self, features: &[f64]) -> f64 {
        if self.split_feature.is_empty() {
            return self.leaf_value[0];
        }
        let mut node = 0usize;
        loop {
            let x = features[self.split_feature[node]];
            let child = if x <= self.threshold[node] {
                self.left_child[node]
            } else {
                self.right_child[node]
            };
            if child < 0 {
                return self.leaf_value[(-child - 1) as usize];
            }
            node = child as usize;
        }
    }
}

/// Tree ensemble regressor (XGBoost / LightGBM dumps, random forests).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TreeEnsemble {
    pub aggregation: Aggregation,
    #[serde(default)]
    pub base_score: f64,
    pub trees: Vec<RegressionTree>,
    #[serde(skip)]
    n_features: usize,
}

impl TreeEnsemble {
    pub fn new(
        aggregation: Aggregation,
        base_score: f64,
        trees: Vec<RegressionTree>,
        n_features: usize,
    ) -> Result<Self, ForecastError> {
        let mut model = Self {
            aggregation,
            base_score,
            trees,
            n_features: 0,
        };
        model.validate(n_features)?;
        Ok(model)
    }

    /// Check every tree against the feature count and remember it for predict.
    pub fn validate(&mut self, n_features: usize) -> Result<(), ForecastError> {
        if self.trees.is_empty() {
            return Err(ForecastError::ModelStore(
                "tree ensemble has no trees".to_string(),
            ));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(n_features)
                .map_err(|e| ForecastError::ModelStore(format!("tree {}: {}", i, e)))?;
        }
        self.n_features = n_features;
        Ok(())
    }
}

impl Predictor for TreeEnsemble {
    fn predict(&self, features: &[f64]) -> Result<f64, ForecastError> {
        if features.len() != self.n_features {
            return Err(ForecastError::prediction(
                "tree_ensemble",
                format!(
                    "expected {} features, got {}",
                    self.n_features,
                    features.len()
                ),
            ));
        }
        let total: f64 = self.trees.iter().map(|t| t.predict(features)).sum();
        Ok(match self.aggregation {
            Aggregation::Sum => self.base_score + total,
            Aggregation::Mean => total / self.trees.len() as f64,
        })
    }
}
