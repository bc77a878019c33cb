//! Ligand clustering over drug-like SMILES, from parsing to CSV export.
//!
//! Run with: cargo test --package biostructx-molecules --test test_ligand_clustering

use biostructx_molecules::clustering::{cluster_ligands, DEFAULT_DISTANCE_THRESHOLD};
use biostructx_molecules::fingerprint::smiles_fingerprint;

const ASPIRIN: &str = "CC(=O)Oc1ccccc1C(=O)O";
const SALICYLIC_ACID: &str = "Oc1ccccc1C(=O)O";
const IBUPROFEN: &str = "CC(C)Cc1ccc(cc1)C(C)C(=O)O";
const CAFFEINE: &str = "CN1C=NC2=C1C(=O)N(C(=O)N2C)C";

fn inputs(smiles: &[&str]) -> Vec<String> {
    smiles.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_analogues_are_more_similar_than_unrelated_drugs() {
    let aspirin = smiles_fingerprint(ASPIRIN).unwrap();
    let salicylic = smiles_fingerprint(SALICYLIC_ACID).unwrap();
    let caffeine = smiles_fingerprint(CAFFEINE).unwrap();
    assert!(aspirin.tanimoto(&salicylic) > aspirin.tanimoto(&caffeine));
}

#[test]
fn test_duplicates_share_a_cluster() {
    let result = cluster_ligands(
        &inputs(&[ASPIRIN, CAFFEINE, ASPIRIN, IBUPROFEN, CAFFEINE]),
        DEFAULT_DISTANCE_THRESHOLD,
    )
    .unwrap();

    assert_eq!(result.ligands.len(), 5);
    assert!(result.rejected.is_empty());
    assert_eq!(result.ligands[0].cluster, 0);
    assert_eq!(result.ligands[0].cluster, result.ligands[2].cluster);
    assert_eq!(result.ligands[1].cluster, result.ligands[4].cluster);
    assert!(result.cluster_count >= 1 && result.cluster_count <= 3);
    assert!(result.ligands.iter().all(|l| l.pc1.is_finite() && l.pc2.is_finite()));
}

#[test]
fn test_invalid_entries_keep_their_positions() {
    let result = cluster_ligands(
        &inputs(&[ASPIRIN, "C1CC", IBUPROFEN, "", CAFFEINE]),
        DEFAULT_DISTANCE_THRESHOLD,
    )
    .unwrap();

    let indices: Vec<usize> = result.ligands.iter().map(|l| l.index).collect();
    assert_eq!(indices, vec![1, 3, 5]);
    let rejected: Vec<usize> = result.rejected.iter().map(|r| r.index).collect();
    assert_eq!(rejected, vec![2, 4]);
}

#[test]
fn test_filtered_csv_export() {
    let result = cluster_ligands(&inputs(&[ASPIRIN, ASPIRIN, CAFFEINE]), DEFAULT_DISTANCE_THRESHOLD).unwrap();
    let csv = result.to_csv(Some(0)).unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("Index,SMILES,Cluster"));
    assert!(lines.all(|l| l.ends_with(",0")));
    assert_eq!(result.to_csv(None).unwrap().lines().count(), 4);
}

#[test]
fn test_aromatic_heterocycles_are_clustered() {
    // 5-methylfuroic acid, thiophene, N-methylpyrrole, pyridine
    let heterocycles = ["O=C(O)c1ccc(o1)C", "c1ccsc1", "Cn1cccc1", "c1ccncc1"];
    let result = cluster_ligands(&inputs(&heterocycles), DEFAULT_DISTANCE_THRESHOLD).unwrap();
    assert!(result.rejected.is_empty(), "rejected: {:?}", result.rejected);
    assert_eq!(result.ligands.len(), 4);

    let furan = smiles_fingerprint("c1ccoc1").unwrap();
    let thiophene = smiles_fingerprint("c1ccsc1").unwrap();
    assert_ne!(furan, thiophene);
}

#[test]
fn test_oversized_hydrogen_count_is_rejected() {
    let result =
        cluster_ligands(&inputs(&["[CH255]C", ASPIRIN, CAFFEINE]), DEFAULT_DISTANCE_THRESHOLD)
            .unwrap();
    assert_eq!(result.rejected.len(), 1);
    assert_eq!(result.rejected[0].index, 1);
}
