//! BioStructX Molecules - Local computation behind the dashboard pages.
//!
//! Nothing in this crate touches the network:
//! 1. Protein descriptors and profiles (ProtParam semantics)
//! 2. SMILES parsing into a molecular graph
//! 3. Morgan (ECFP-style) fingerprints
//! 4. Ward clustering and PCA projection of ligand fingerprints
//! 5. Secondary-structure composition and annotation lines from PDB text
//! 6. Pairwise identity of aligned sequences

pub mod error;
pub mod protein;
pub mod smiles;
pub mod fingerprint;
pub mod clustering;
pub mod structure;
pub mod alignment;

pub use error::{MoleculeError, Result};
