//! Ligand similarity clustering.
//!
//! SMILES → Morgan fingerprints → agglomerative Ward clustering with a
//! distance threshold → 2-D PCA projection for plotting.

use nalgebra::{DMatrix, SymmetricEigen};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{MoleculeError, Result};
use crate::fingerprint::smiles_fingerprint;

pub const DEFAULT_DISTANCE_THRESHOLD: f64 = 5.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusteredLigand {
    /// 1-based position in the submitted list.
    pub index: usize,
    pub smiles: String,
    pub cluster: usize,
    pub pc1: f64,
    pub pc2: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectedLigand {
    pub index: usize,
    pub input: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LigandClusterResult {
    pub ligands: Vec<ClusteredLigand>,
    pub rejected: Vec<RejectedLigand>,
    pub cluster_count: usize,
}

impl LigandClusterResult {
    /// Ligands of a single cluster, or all of them for `None`.
    pub fn filtered(&self, cluster: Option<usize>) -> Vec<&ClusteredLigand> {
        self.ligands
            .iter()
            .filter(|l| cluster.map_or(true, |c| l.cluster == c))
            .collect()
    }

    /// `Index,SMILES,Cluster` export.
    pub fn to_csv(&self, cluster: Option<usize>) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(["Index", "SMILES", "Cluster"])?;
        for ligand in self.filtered(cluster) {
            writer.write_record([
                ligand.index.to_string(),
                ligand.smiles.clone(),
                ligand.cluster.to_string(),
            ])?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| MoleculeError::Csv(e.into_error().into()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum::<f64>().sqrt()
}

/// Ward-linkage agglomerative clustering. Clusters merge while their Ward
/// distance is below `threshold`. Labels are numbered from 0 in order of
/// first appearance.
pub fn ward_labels(points: &[Vec<f64>], threshold: f64) -> Vec<usize> {
    let n = points.len();
    let mut dist = vec![vec![0.0f64; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let d = euclidean(&points[i], &points[j]);
            dist[i][j] = d;
            dist[j][i] = d;
        }
    }

    let mut size = vec![1usize; n];
    let mut active = vec![true; n];
    let mut owner: Vec<usize> = (0..n).collect();

    loop {
        let mut best: Option<(usize, usize, f64)> = None;
        for i in 0..n {
            if !active[i] {
                continue;
            }
            for j in (i + 1)..n {
                if active[j] && best.map_or(true, |(_, _, d)| dist[i][j] < d) {
                    best = Some((i, j, dist[i][j]));
                }
            }
        }

        let Some((a, b, d_ab)) = best else { break };
        if d_ab >= threshold {
            break;
        }
        debug!(a, b, distance = d_ab, "Merging clusters");

        // Lance-Williams update for Ward linkage
        for k in 0..n {
            if !active[k] || k == a || k == b {
                continue;
            }
            let (nk, na, nb) = (size[k] as f64, size[a] as f64, size[b] as f64);
            let d2 = ((nk + na) * dist[k][a].powi(2) + (nk + nb) * dist[k][b].powi(2)
                - nk * d_ab.powi(2))
                / (nk + na + nb);
            let d = d2.max(0.0).sqrt();
            dist[k][a] = d;
            dist[a][k] = d;
        }
        size[a] += size[b];
        active[b] = false;
        for o in owner.iter_mut() {
            if *o == b {
                *o = a;
            }
        }
    }

    let mut relabel: Vec<Option<usize>> = vec![None; n];
    let mut next = 0;
    owner
        .iter()
        .map(|&o| {
            *relabel[o].get_or_insert_with(|| {
                next += 1;
                next - 1
            })
        })
        .collect()
}

/// Projects rows onto their first two principal components.
///
/// Works on the n×n Gram matrix of the centred data. Each component's sign
/// is fixed so that its largest absolute score is positive.
pub fn pca_2d(points: &[Vec<f64>]) -> Vec<[f64; 2]> {
    let n = points.len();
    if n == 0 {
        return Vec::new();
    }
    let d = points[0].len();

    let mut centred = DMatrix::<f64>::zeros(n, d);
    for col in 0..d {
        let mean = points.iter().map(|p| p[col]).sum::<f64>() / n as f64;
        for (row, p) in points.iter().enumerate() {
            centred[(row, col)] = p[col] - mean;
        }
    }

    let gram = &centred * centred.transpose();
    let eigen = SymmetricEigen::new(gram);

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| eigen.eigenvalues[j].total_cmp(&eigen.eigenvalues[i]));

    let mut coords = vec![[0.0f64; 2]; n];
    for (component, &idx) in order.iter().take(2).enumerate() {
        let lambda = eigen.eigenvalues[idx];
        if lambda <= 1e-12 {
            continue;
        }
        let scale = lambda.sqrt();
        let column = eigen.eigenvectors.column(idx);

        let pivot = column.iter().copied().fold(0.0f64, |acc, v| if v.abs() > acc.abs() { v } else { acc });
        let sign = if pivot < 0.0 { -1.0 } else { 1.0 };

        for row in 0..n {
            coords[row][component] = sign * column[row] * scale;
        }
    }
    coords
}

/// Parses, fingerprints, clusters and projects a list of SMILES strings.
/// Invalid entries are reported in `rejected`; fewer than two valid ligands
/// is an error.
pub fn cluster_ligands(inputs: &[String], threshold: f64) -> Result<LigandClusterResult> {
    let mut valid = Vec::new();
    let mut rejected = Vec::new();

    for (i, smiles) in inputs.iter().enumerate() {
        match smiles_fingerprint(smiles) {
            Ok(fp) => valid.push((i + 1, smiles.clone(), fp.to_dense())),
            Err(e) => rejected.push(RejectedLigand {
                index: i + 1,
                input: smiles.clone(),
                reason: e.to_string(),
            }),
        }
    }

    if valid.len() < 2 {
        return Err(MoleculeError::TooFewLigands { required: 2, found: valid.len() });
    }

    let points: Vec<Vec<f64>> = valid.iter().map(|(_, _, p)| p.clone()).collect();
    let labels = ward_labels(&points, threshold);
    let coords = pca_2d(&points);
    let cluster_count = labels.iter().copied().max().map_or(0, |m| m + 1);

    info!(
        ligands = valid.len(),
        rejected = rejected.len(),
        clusters = cluster_count,
        "Clustered ligands"
    );

    let ligands = valid
        .into_iter()
        .zip(labels)
        .zip(coords)
        .map(|(((index, smiles, _), cluster), [pc1, pc2])| ClusteredLigand { index, smiles, cluster, pc1, pc2 })
        .collect();

    Ok(LigandClusterResult { ligands, rejected, cluster_count })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ward_separates_distant_groups() {
        let points = vec![
            vec![0.0, 0.0],
            vec![10.0, 10.0],
            vec![0.5, 0.0],
            vec![10.0, 10.5],
            vec![0.0, 0.5],
        ];
        let labels = ward_labels(&points, 5.0);
        assert_eq!(labels, vec![0, 1, 0, 1, 0]);
    }

    #[test]
    fn test_ward_threshold_zero_keeps_singletons() {
        let points = vec![vec![0.0], vec![1.0], vec![2.0]];
        assert_eq!(ward_labels(&points, 0.0), vec![0, 1, 2]);
    }

    #[test]
    fn test_ward_large_threshold_merges_all() {
        let points = vec![vec![0.0], vec![1.0], vec![2.0], vec![3.0]];
        assert_eq!(ward_labels(&points, 100.0), vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_pca_shape_and_centering() {
        let points = vec![
            vec![1.0, 2.0, 0.0],
            vec![2.0, 4.0, 0.0],
            vec![3.0, 6.0, 1.0],
            vec![4.0, 8.0, 0.0],
        ];
        let coords = pca_2d(&points);
        assert_eq!(coords.len(), 4);
        let mean1: f64 = coords.iter().map(|c| c[0]).sum::<f64>() / 4.0;
        assert!(mean1.abs() < 1e-9);
        // first component follows the dominant (x, 2x) direction
        assert!(coords[0][0] * coords[3][0] < 0.0);
    }

    #[test]
    fn test_pca_on_identical_points_is_zero() {
        let coords = pca_2d(&[vec![1.0, 1.0], vec![1.0, 1.0]]);
        assert!(coords.iter().all(|c| c[0] == 0.0 && c[1] == 0.0));
    }

    #[test]
    fn test_cluster_ligands_reports_rejections() {
        let inputs: Vec<String> = ["CCO", "not-a-smiles", "CCCO", "c1ccccc1"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let result = cluster_ligands(&inputs, DEFAULT_DISTANCE_THRESHOLD).unwrap();
        assert_eq!(result.ligands.len(), 3);
        assert_eq!(result.rejected.len(), 1);
        assert_eq!(result.rejected[0].index, 2);
        assert_eq!(result.ligands[0].cluster, 0);
        assert_eq!(result.ligands[2].index, 4);
    }

    #[test]
    fn test_too_few_ligands() {
        let inputs = vec!["CCO".to_string(), "???".to_string()];
        assert!(matches!(
            cluster_ligands(&inputs, DEFAULT_DISTANCE_THRESHOLD),
            Err(MoleculeError::TooFewLigands { found: 1, .. })
        ));
    }

    #[test]
    fn test_csv_export_and_filter() {
        let inputs: Vec<String> = ["CCO", "CCO"].iter().map(|s| s.to_string()).collect();
        let result = cluster_ligands(&inputs, DEFAULT_DISTANCE_THRESHOLD).unwrap();
        assert_eq!(result.cluster_count, 1);
        let csv = result.to_csv(None).unwrap();
        assert_eq!(csv, "Index,SMILES,Cluster\n1,CCO,0\n2,CCO,0\n");
        assert_eq!(result.filtered(Some(1)).len(), 0);
    }
}
