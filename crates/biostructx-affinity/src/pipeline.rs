//! Orchestrator for one affinity request.
//!
//! normalize → ligand descriptors → protein descriptors → concatenate →
//! predict → label. Each step is awaited in turn; a failing descriptor step
//! stops the request before the model is consulted.

use std::sync::Arc;

use biostructx_sources::fasta::clean_sequence;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::error::{AffinityError, Result};
use crate::estimate::AffinityEstimate;
use crate::feature::{FeatureVector, FEATURE_COUNT};
use crate::ligand::LigandDescriptorProvider;
use crate::model::AffinityModel;
use crate::normalize::InputResolver;
use crate::protein::describe_protein;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AffinityRequest {
    /// SMILES or ChEMBL ID.
    #[serde(default)]
    pub ligand: String,
    /// Raw sequence, FASTA block or UniProt accession.
    #[serde(default)]
    pub protein: String,
    /// Contents of an uploaded FASTA/text file; takes precedence over `protein`.
    #[serde(default)]
    pub protein_upload: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffinityReport {
    pub smiles: String,
    pub sequence_length: usize,
    pub estimate: AffinityEstimate,
}

pub struct AffinityPipeline {
    ligands: Arc<dyn LigandDescriptorProvider>,
    model: Arc<dyn AffinityModel>,
    resolver: Option<InputResolver>,
}

impl AffinityPipeline {
    pub fn new(ligands: Arc<dyn LigandDescriptorProvider>, model: Arc<dyn AffinityModel>) -> Self {
        Self { ligands, model, resolver: None }
    }

    /// Enables ChEMBL and UniProt identifier resolution in `run`.
    pub fn with_resolver(mut self, resolver: InputResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Scores an already normalized SMILES / sequence pair.
    #[instrument(skip(self, sequence), fields(sequence_len = sequence.len()))]
    pub async fn estimate(&self, smiles: &str, sequence: &str) -> Result<AffinityEstimate> {
        if self.model.n_features() != FEATURE_COUNT {
            return Err(AffinityError::ModelUnavailable(format!(
                "model expects {} features, pipeline produces {}",
                self.model.n_features(),
                FEATURE_COUNT
            )));
        }

        let ligand = self.ligands.describe(smiles).await?;
        debug!(provider = self.ligands.name(), ?ligand, "Ligand descriptors");
        let protein = describe_protein(sequence)?;
        debug!(?protein, "Protein descriptors");

        let features = FeatureVector::from_parts(&ligand, &protein);
        let prediction = self.model.predict(&features)?;
        let estimate = AffinityEstimate::from_prediction(prediction, features);
        info!(energy = estimate.energy, strength = estimate.strength.label(), "Affinity estimated");
        Ok(estimate)
    }

    /// Normalizes free-text inputs, then estimates.
    pub async fn run(&self, request: &AffinityRequest) -> Result<AffinityReport> {
        let upload = request.protein_upload.as_deref();
        let (smiles, sequence) = match &self.resolver {
            Some(resolver) => (
                resolver.resolve_ligand(&request.ligand).await?,
                resolver.resolve_protein(&request.protein, upload).await?,
            ),
            None => {
                let text = upload.filter(|u| !u.trim().is_empty()).unwrap_or(request.protein.as_str());
                (request.ligand.trim().to_string(), clean_sequence(text))
            }
        };

        let estimate = self.estimate(&smiles, &sequence).await?;
        Ok(AffinityReport { sequence_length: sequence.len(), smiles, estimate })
    }
}
