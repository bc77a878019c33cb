//! PDB and AlphaFold structure fetching.
//!
//! Structures are returned as PDB text and handed straight to the browser
//! viewer; nothing is cached on disk.

use biostructx_common::HttpClient;
use tracing::{debug, info, instrument};

use crate::{found, join_url, Result};

/// Client for fetching protein structures from RCSB and AlphaFold.
#[derive(Debug, Clone)]
pub struct StructureClient {
    http: HttpClient,
    rcsb_url: String,
    alphafold_url: String,
}

impl StructureClient {
    pub fn new(http: HttpClient, rcsb_url: impl Into<String>, alphafold_url: impl Into<String>) -> Self {
        Self { http, rcsb_url: rcsb_url.into(), alphafold_url: alphafold_url.into() }
    }

    /// AlphaFold model file name for a UniProt accession.
    pub fn alphafold_file_name(uniprot_id: &str) -> String {
        format!("AF-{}-F1-model_v4.pdb", uniprot_id.trim().to_uppercase())
    }

    /// Fetch an experimental structure by its PDB ID.
    #[instrument(skip(self))]
    pub async fn fetch_pdb(&self, pdb_id: &str) -> Result<Option<String>> {
        let url = join_url(&self.rcsb_url, &format!("view/{}.pdb", pdb_id.trim().to_lowercase()));
        info!("Fetching PDB {} from RCSB", pdb_id);
        self.fetch_text("RCSB", &url).await
    }

    /// Fetch an AlphaFold predicted structure by UniProt ID.
    #[instrument(skip(self))]
    pub async fn fetch_alphafold(&self, uniprot_id: &str) -> Result<Option<String>> {
        let url = join_url(&self.alphafold_url, &Self::alphafold_file_name(uniprot_id));
        info!("Fetching AlphaFold structure for {} from EBI", uniprot_id);
        self.fetch_text("AlphaFold", &url).await
    }

    async fn fetch_text(&self, service: &'static str, url: &str) -> Result<Option<String>> {
        let resp = self.http.get(url)?.send().await?;
        if !found(service, resp.status())? {
            debug!(url, "Structure not found");
            return Ok(None);
        }
        let text = resp.text().await?;
        Ok(Some(text).filter(|t| !t.trim().is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alphafold_file_name() {
        assert_eq!(StructureClient::alphafold_file_name("p00533 "), "AF-P00533-F1-model_v4.pdb");
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_fetch_crambin() {
        let client = StructureClient::new(
            HttpClient::new().unwrap(),
            "https://files.rcsb.org",
            "https://alphafold.ebi.ac.uk/files",
        );
        let pdb = client.fetch_pdb("1CRN").await.unwrap().unwrap();
        assert!(pdb.contains("ATOM"));
    }
}
