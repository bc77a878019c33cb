//! Pre-trained regression artifact.
//!
//! The forest is stored as JSON: a list of trees, each a flat node array where
//! split nodes point at children by index. A sample goes left when
//! `x[feature] <= threshold`. The forest predicts the mean of its trees.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{AffinityError, Result};
use crate::feature::{FeatureVector, FEATURE_COUNT};

/// A 9 → 1 regressor. The pipeline reports `-predict(..)` as the affinity.
pub trait AffinityModel: Send + Sync {
    fn n_features(&self) -> usize;

    fn predict(&self, features: &FeatureVector) -> Result<f64>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    /// `None` marks a leaf.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature: Option<usize>,
    #[serde(default)]
    pub threshold: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<usize>,
    #[serde(default)]
    pub value: f64,
}

impl TreeNode {
    pub fn leaf(value: f64) -> Self {
        Self { feature: None, threshold: 0.0, left: None, right: None, value }
    }

    pub fn split(feature: usize, threshold: f64, left: usize, right: usize, value: f64) -> Self {
        Self { feature: Some(feature), threshold, left: Some(left), right: Some(right), value }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    pub nodes: Vec<TreeNode>,
}

impl RegressionTree {
    pub fn predict(&self, x: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            let node = &self.nodes[idx];
            match (node.feature, node.left, node.right) {
                (Some(f), Some(l), Some(r)) => idx = if x[f] <= node.threshold { l } else { r },
                _ => return node.value,
            }
        }
    }

    /// Children must sit after their parent, which also rules out cycles.
    fn validate(&self, n_features: usize) -> std::result::Result<(), String> {
        if self.nodes.is_empty() {
            return Err("empty tree".to_string());
        }
        for (i, node) in self.nodes.iter().enumerate() {
            if !node.value.is_finite() || !node.threshold.is_finite() {
                return Err(format!("node {} has a non-finite value", i));
            }
            let Some(feature) = node.feature else { continue };
            if feature >= n_features {
                return Err(format!("node {} splits on feature {} of {}", i, feature, n_features));
            }
            for child in [node.left, node.right] {
                match child {
                    Some(c) if c > i && c < self.nodes.len() => {}
                    _ => return Err(format!("node {} has an invalid child index", i)),
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestMetadata {
    pub trained_at: DateTime<Utc>,
    pub samples: usize,
    pub seed: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionForest {
    pub n_features: usize,
    #[serde(default)]
    pub feature_names: Vec<String>,
    pub trees: Vec<RegressionTree>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ForestMetadata>,
}

impl RegressionForest {
    /// Reads and validates a forest; every failure is `ModelUnavailable`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            AffinityError::ModelUnavailable(format!("cannot read {}: {}", path.display(), e))
        })?;
        let forest = Self::from_json_str(&content)?;
        info!(path = %path.display(), trees = forest.trees.len(), "Loaded affinity model");
        Ok(forest)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let forest: Self = serde_json::from_str(content)
            .map_err(|e| AffinityError::ModelUnavailable(format!("malformed model: {}", e)))?;
        forest.validate()?;
        Ok(forest)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.as_ref().parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.n_features != FEATURE_COUNT {
            return Err(AffinityError::ModelUnavailable(format!(
                "model expects {} features, pipeline produces {}",
                self.n_features, FEATURE_COUNT
            )));
        }
        if self.trees.is_empty() {
            return Err(AffinityError::ModelUnavailable("model has no trees".to_string()));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features)
                .map_err(|e| AffinityError::ModelUnavailable(format!("tree {}: {}", i, e)))?;
        }
        Ok(())
    }
}

impl AffinityModel for RegressionForest {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, features: &FeatureVector) -> Result<f64> {
        let x = features.as_slice();
        let sum: f64 = self.trees.iter().map(|t| t.predict(x)).sum();
        Ok(sum / self.trees.len() as f64)
    }
}
