//! Bagged CART regression forest training.
//!
//! Splits minimise the summed squared error of the two children. Each tree
//! sees a bootstrap sample drawn from a seeded `StdRng`, so a given seed
//! always yields the same forest.

use std::path::Path;

use anyhow::{ensure, Context, Result};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::feature::{FeatureVector, FEATURE_COUNT};
use crate::ligand::LigandDescriptorProvider;
use crate::model::{ForestMetadata, RegressionForest, RegressionTree, TreeNode};
use crate::protein::describe_protein;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_trees: usize,
    /// `None` grows until leaves are pure or too small to split.
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features tried per split; `None` tries all of them.
    pub max_features: Option<usize>,
    pub bootstrap: bool,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            bootstrap: true,
            seed: 42,
        }
    }
}

/// One labelled ligand/protein pair. `affinity` is in kcal/mol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingPair {
    pub smiles: String,
    pub sequence: String,
    pub affinity: f64,
}

/// Built-in sample set: five pairs with simulated affinities -6.0 .. -10.8.
pub const SAMPLE_PAIRS: [(&str, &str); 5] = [
    ("CCO", "MKTIIALSYIFCLVFA"),
    ("CC(C)Cc1ccc(O)cc1", "GAVLIMFWY"),
    ("C1=CC=CN=C1", "MVKVYAPASSANMSVGFDVLGAAVTPVDGALLGDVVTVEAAETFSLNNLGQK"),
    ("CC(=O)OC1=CC=CC=C1C(=O)O", "MEEPQSDPSVEPPLSQETFSDLWKLL"),
    ("CCN(CC)CCCC(C)NC1=C2C=CC(=CC2=NC=C1)Cl", "MSLLLLTLLVAAALAAPASSS"),
];

pub fn sample_pairs() -> Vec<TrainingPair> {
    SAMPLE_PAIRS
        .iter()
        .enumerate()
        .map(|(i, (smiles, sequence))| TrainingPair {
            smiles: smiles.to_string(),
            sequence: sequence.to_string(),
            affinity: -6.0 - i as f64 * 1.2,
        })
        .collect()
}

/// Reads a `smiles,sequence,affinity` CSV with a header row.
pub fn load_pairs_csv(path: impl AsRef<Path>) -> Result<Vec<TrainingPair>> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open training CSV {}", path.display()))?;
    let mut pairs = Vec::new();
    for (line, record) in reader.deserialize().enumerate() {
        let pair: TrainingPair =
            record.with_context(|| format!("Bad training row {} in {}", line + 2, path.display()))?;
        pairs.push(pair);
    }
    Ok(pairs)
}

/// Extracts feature vectors with the same providers used at inference.
pub async fn build_training_set(
    ligands: &dyn LigandDescriptorProvider,
    pairs: &[TrainingPair],
) -> Result<(Vec<FeatureVector>, Vec<f64>)> {
    ensure!(!pairs.is_empty(), "No training pairs; a forest needs at least one sample");
    let mut features = Vec::with_capacity(pairs.len());
    let mut affinities = Vec::with_capacity(pairs.len());
    for pair in pairs {
        let ligand = ligands
            .describe(&pair.smiles)
            .await
            .with_context(|| format!("Ligand descriptors for {}", pair.smiles))?;
        let protein = describe_protein(&pair.sequence)
            .with_context(|| format!("Protein descriptors for pair with {}", pair.smiles))?;
        features.push(FeatureVector::from_parts(&ligand, &protein));
        affinities.push(pair.affinity);
    }
    Ok((features, affinities))
}

/// Fits a forest whose prediction is the *negated* affinity.
pub fn train_forest(features: &[FeatureVector], affinities: &[f64], params: &ForestParams) -> RegressionForest {
    let x: Vec<&[f64]> = features.iter().map(|f| f.as_slice()).collect();
    let y: Vec<f64> = affinities.iter().map(|a| -a).collect();
    let trees = fit_trees(&x, &y, params);

    info!(trees = trees.len(), samples = y.len(), seed = params.seed, "Trained affinity forest");
    RegressionForest {
        n_features: FEATURE_COUNT,
        feature_names: FeatureVector::NAMES.iter().map(|s| s.to_string()).collect(),
        trees,
        metadata: Some(ForestMetadata { trained_at: Utc::now(), samples: y.len(), seed: params.seed }),
    }
}

pub fn fit_trees(x: &[&[f64]], y: &[f64], params: &ForestParams) -> Vec<RegressionTree> {
    let n = y.len();
    if n == 0 {
        return Vec::new();
    }
    let mut rng = StdRng::seed_from_u64(params.seed);
    (0..params.n_trees.max(1))
        .map(|t| {
            let sample: Vec<usize> = if params.bootstrap {
                (0..n).map(|_| rng.gen_range(0..n)).collect()
            } else {
                (0..n).collect()
            };
            let mut builder = TreeBuilder { x, y, params, rng: &mut rng, nodes: Vec::new() };
            builder.grow(sample, 0);
            debug!(tree = t, nodes = builder.nodes.len(), "Grew tree");
            RegressionTree { nodes: builder.nodes }
        })
        .collect()
}

struct Split {
    feature: usize,
    threshold: f64,
    left: Vec<usize>,
    right: Vec<usize>,
    sse: f64,
}

struct TreeBuilder<'a, 'r> {
    x: &'a [&'a [f64]],
    y: &'a [f64],
    params: &'a ForestParams,
    rng: &'r mut StdRng,
    nodes: Vec<TreeNode>,
}

fn mean(y: &[f64], idx: &[usize]) -> f64 {
    idx.iter().map(|&i| y[i]).sum::<f64>() / idx.len() as f64
}

fn sse(y: &[f64], idx: &[usize]) -> f64 {
    let m = mean(y, idx);
    idx.iter().map(|&i| (y[i] - m).powi(2)).sum()
}

impl TreeBuilder<'_, '_> {
    /// Appends the subtree in pre-order and returns its root index.
    fn grow(&mut self, idx: Vec<usize>, depth: usize) -> usize {
        let value = mean(self.y, &idx);
        let at = self.nodes.len();
        self.nodes.push(TreeNode::leaf(value));

        let depth_ok = self.params.max_depth.map_or(true, |d| depth < d);
        if !depth_ok || idx.len() < self.params.min_samples_split.max(2) {
            return at;
        }
        let Some(split) = self.best_split(&idx) else { return at };
        if split.sse >= sse(self.y, &idx) - 1e-12 {
            return at;
        }

        let left = self.grow(split.left, depth + 1);
        let right = self.grow(split.right, depth + 1);
        self.nodes[at] = TreeNode::split(split.feature, split.threshold, left, right, value);
        at
    }

    fn best_split(&mut self, idx: &[usize]) -> Option<Split> {
        let n_features = self.x[idx[0]].len();
        let mut candidates: Vec<usize> = (0..n_features).collect();
        if let Some(k) = self.params.max_features.filter(|&k| k > 0 && k < n_features) {
            candidates.shuffle(&mut *self.rng);
            candidates.truncate(k);
            candidates.sort_unstable();
        }

        let min_leaf = self.params.min_samples_leaf.max(1);
        let mut best: Option<(usize, f64, f64)> = None;

        for &f in &candidates {
            let mut order = idx.to_vec();
            order.sort_by(|&a, &b| self.x[a][f].total_cmp(&self.x[b][f]));

            let total: f64 = order.iter().map(|&i| self.y[i]).sum();
            let total_sq: f64 = order.iter().map(|&i| self.y[i] * self.y[i]).sum();
            let (mut left_sum, mut left_sq) = (0.0, 0.0);

            for pos in 1..order.len() {
                let prev = order[pos - 1];
                left_sum += self.y[prev];
                left_sq += self.y[prev] * self.y[prev];

                let (lo, hi) = (self.x[prev][f], self.x[order[pos]][f]);
                if lo == hi || pos < min_leaf || order.len() - pos < min_leaf {
                    continue;
                }
                let (nl, nr) = (pos as f64, (order.len() - pos) as f64);
                let right_sum = total - left_sum;
                let cost = (left_sq - left_sum * left_sum / nl) + (total_sq - left_sq - right_sum * right_sum / nr);
                if best.map_or(true, |(_, _, c)| cost < c - 1e-12) {
                    best = Some((f, (lo + hi) / 2.0, cost));
                }
            }
        }

        let (feature, threshold, cost) = best?;
        let (left, right): (Vec<usize>, Vec<usize>) =
            idx.iter().copied().partition(|&i| self.x[i][feature] <= threshold);
        Some(Split { feature, threshold, left, right, sse: cost.max(0.0) })
    }
}
