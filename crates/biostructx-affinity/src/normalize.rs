//! Input normalization: free text → SMILES or protein sequence.

use std::sync::OnceLock;

use biostructx_sources::chembl::ChemblClient;
use biostructx_sources::fasta::clean_sequence;
use biostructx_sources::uniprot::UniProtClient;
use regex::Regex;
use tracing::{debug, instrument};

use crate::error::{AffinityError, Result, Side};

pub fn is_chembl_id(text: &str) -> bool {
    text.trim()
        .get(..6)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("CHEMBL"))
}

/// Matches the UniProtKB accession format (6 or 10 characters).
pub fn is_uniprot_accession(text: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"^(?:[OPQ][0-9][A-Z0-9]{3}[0-9]|[A-NR-Z][0-9](?:[A-Z][A-Z0-9]{2}[0-9]){1,2})$").unwrap()
    });
    re.is_match(&text.trim().to_ascii_uppercase())
}

/// Resolves database identifiers through ChEMBL and UniProt.
#[derive(Debug, Clone)]
pub struct InputResolver {
    chembl: ChemblClient,
    uniprot: UniProtClient,
}

impl InputResolver {
    pub fn new(chembl: ChemblClient, uniprot: UniProtClient) -> Self {
        Self { chembl, uniprot }
    }

    /// Trimmed SMILES, or the canonical SMILES of a ChEMBL molecule.
    #[instrument(skip(self))]
    pub async fn resolve_ligand(&self, text: &str) -> Result<String> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AffinityError::InvalidLigand("empty SMILES".to_string()));
        }
        if !is_chembl_id(text) {
            return Ok(text.to_string());
        }

        let id = text.to_ascii_uppercase();
        debug!(chembl_id = %id, "Resolving ligand through ChEMBL");
        match self.chembl.canonical_smiles(&id).await {
            Ok(Some(smiles)) => Ok(smiles),
            Ok(None) => Err(AffinityError::InvalidLigand(format!(
                "{} has no structure in ChEMBL",
                id
            ))),
            Err(e) => Err(AffinityError::from_source("ChEMBL", Side::Ligand, e)),
        }
    }

    /// Uploaded text wins over the text field; accessions are fetched from
    /// UniProt; anything else is cleaned as raw or FASTA text.
    #[instrument(skip(self, text, upload))]
    pub async fn resolve_protein(&self, text: &str, upload: Option<&str>) -> Result<String> {
        if let Some(upload) = upload.filter(|u| !u.trim().is_empty()) {
            return Ok(clean_sequence(upload));
        }

        let trimmed = text.trim();
        if !is_uniprot_accession(trimmed) {
            return Ok(clean_sequence(trimmed));
        }

        let accession = trimmed.to_ascii_uppercase();
        debug!(accession = %accession, "Resolving protein through UniProt");
        match self.uniprot.fetch_sequence(&accession).await {
            Ok(Some(seq)) => Ok(seq),
            Ok(None) => Err(AffinityError::InvalidProtein(format!(
                "UniProt accession {} not found",
                accession
            ))),
            Err(e) => Err(AffinityError::from_source("UniProt", Side::Protein, e)),
        }
    }
}
