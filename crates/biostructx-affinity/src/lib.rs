//! BioStructX Affinity - Ligand/protein binding-affinity estimation.
//!
//! The call chain for one request:
//! 1. Normalize free-text inputs (ChEMBL IDs, UniProt accessions, FASTA) to SMILES + sequence
//! 2. Ligand descriptors from a remote provider (4 values)
//! 3. Protein descriptors computed locally (5 values)
//! 4. Concatenate into a 9-value feature vector
//! 5. Regression forest prediction, reported as `-prediction` with a qualitative label

pub mod error;
pub mod normalize;
pub mod ligand;
pub mod protein;
pub mod feature;
pub mod model;
pub mod estimate;
pub mod pipeline;
pub mod train;

pub use error::{AffinityError, Result, Side};
pub use estimate::{AffinityEstimate, BindingStrength};
pub use feature::FeatureVector;
pub use ligand::{LigandDescriptor, LigandDescriptorProvider};
pub use model::{AffinityModel, RegressionForest};
pub use pipeline::{AffinityPipeline, AffinityReport, AffinityRequest};
