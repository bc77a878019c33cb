//! biostructx-web — Web dashboard for BioStructX
//! Provides:
//!   - Binding affinity estimation with a range chart
//!   - UniProt / PubChem / ChEMBL browsers
//!   - Protein characterization and GO terms
//!   - Structure viewer, drug–gene mapper, ligand clustering
//!   - Evolutionary divergence (Clustal Omega) and the protein chat assistant

pub mod chart;
pub mod context;
pub mod error;
pub mod handlers;
pub mod render;
pub mod router;
pub mod state;
