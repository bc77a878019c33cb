use serde::{Deserialize, Serialize};

use crate::ligand::LigandDescriptor;
use crate::protein::ProteinDescriptor;

pub const FEATURE_COUNT: usize = LigandDescriptor::LEN + ProteinDescriptor::LEN;

/// Ligand descriptor (4) followed by protein descriptor (5).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector(pub [f64; FEATURE_COUNT]);

impl FeatureVector {
    pub const LEN: usize = FEATURE_COUNT;

    pub const NAMES: [&'static str; Self::LEN] = [
        "MolWt", "LogP", "TPSA", "NumRotatableBonds",
        "Protein_MolWt", "Aromaticity", "InstabilityIndex", "IsoelectricPoint", "GRAVY",
    ];

    pub fn from_parts(ligand: &LigandDescriptor, protein: &ProteinDescriptor) -> Self {
        let mut values = [0.0; Self::LEN];
        values[..LigandDescriptor::LEN].copy_from_slice(&ligand.to_array());
        values[LigandDescriptor::LEN..].copy_from_slice(&protein.to_array());
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// (name, value) pairs in model order.
    pub fn named(&self) -> Vec<(&'static str, f64)> {
        Self::NAMES.iter().copied().zip(self.0).collect()
    }
}
