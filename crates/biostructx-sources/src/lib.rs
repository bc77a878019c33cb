//! biostructx-sources — Clients for the public databases behind the dashboard.
//!
//!   - UniProt: entries, FASTA, search, GO cross-references, disease comments
//!   - ChEMBL: molecule records and canonical SMILES
//!   - PubChem: compound properties, similarity search, descriptors
//!   - RCSB / AlphaFold: PDB structure text
//!   - QuickGO: GO term names and annotations
//!   - Clustal Omega (EBI): remote multiple sequence alignment jobs

pub mod fasta;
pub mod uniprot;
pub mod chembl;
pub mod pubchem;
pub mod structures;
pub mod quickgo;
pub mod clustalo;

use biostructx_common::BioStructXError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error(transparent)]
    Client(#[from] BioStructXError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("{service} returned HTTP {status}")]
    Status { service: &'static str, status: u16 },

    #[error("{service} job failed: {message}")]
    Job { service: &'static str, message: String },
}

pub type Result<T> = std::result::Result<T, SourceError>;

/// Sorts a response status into success, "no such record", or upstream failure.
///
/// 400/404/410 mean the identifier does not resolve; everything else that is not
/// a success is the service's fault.
pub(crate) fn found(service: &'static str, status: reqwest::StatusCode) -> Result<bool> {
    if status.is_success() {
        return Ok(true);
    }
    match status.as_u16() {
        400 | 404 | 410 => Ok(false),
        code => Err(SourceError::Status { service, status: code }),
    }
}

pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
