//! Protein side of the feature vector.

pub use biostructx_molecules::protein::ProteinDescriptor;
use biostructx_molecules::{protein, MoleculeError};

use crate::error::{AffinityError, Result};

/// Five-element protein descriptor; any sequence problem is `InvalidProtein`.
pub fn describe_protein(sequence: &str) -> Result<ProteinDescriptor> {
    protein::descriptors(sequence.trim()).map_err(|e| match e {
        MoleculeError::EmptySequence => AffinityError::InvalidProtein("empty protein sequence".to_string()),
        other => AffinityError::InvalidProtein(other.to_string()),
    })
}
