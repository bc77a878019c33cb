//! UniProt REST client.
//!
//! Endpoint: https://rest.uniprot.org/uniprotkb
//!
//!   - `{acc}.json`  : full entry (names, organism, genes, comments, cross-references)
//!   - `{acc}.fasta` : sequence in FASTA format
//!   - `search`      : free-text query, used by the drug–gene mapper

use biostructx_common::HttpClient;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::fasta::clean_sequence;
use crate::{found, join_url, Result};

const SERVICE: &str = "UniProt";

/// Parsed subset of a UniProtKB entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UniProtEntry {
    pub accession: String,
    pub protein_name: Option<String>,
    pub organism: Option<String>,
    pub gene_names: Vec<String>,
    /// Text of the first FUNCTION comment.
    pub function: Option<String>,
    /// GO identifiers from the cross-references, de-duplicated, in entry order.
    pub go_ids: Vec<String>,
    pub diseases: Vec<DiseaseNote>,
    pub sequence: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseNote {
    pub name: String,
    pub description: String,
}

/// First hit of a UniProt search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UniProtSearchHit {
    pub accession: String,
    pub gene: Option<String>,
    pub protein_name: Option<String>,
    pub organism: Option<String>,
}

impl UniProtEntry {
    pub fn from_json(json: &Value) -> Self {
        let mut go_ids: Vec<String> = Vec::new();
        for xref in json["uniProtKBCrossReferences"].as_array().into_iter().flatten() {
            if xref["database"].as_str() == Some("GO") {
                if let Some(id) = xref["id"].as_str() {
                    if !go_ids.iter().any(|g| g == id) {
                        go_ids.push(id.to_string());
                    }
                }
            }
        }

        let comments = json["comments"].as_array().map(Vec::as_slice).unwrap_or_default();

        let function = comments
            .iter()
            .find(|c| c["commentType"].as_str() == Some("FUNCTION"))
            .and_then(|c| c["texts"][0]["value"].as_str())
            .map(String::from);

        let diseases = comments
            .iter()
            .filter(|c| c["commentType"].as_str() == Some("DISEASE"))
            .filter_map(|c| {
                let disease = &c["disease"];
                let name = disease["diseaseId"].as_str()?.to_string();
                let description = disease["description"]
                    .as_str()
                    .or_else(|| c["note"]["texts"][0]["value"].as_str())
                    .unwrap_or("")
                    .to_string();
                Some(DiseaseNote { name, description })
            })
            .collect();

        Self {
            accession: json["primaryAccession"].as_str().unwrap_or("").to_string(),
            protein_name: protein_name(json),
            organism: json["organism"]["scientificName"].as_str().map(String::from),
            gene_names: gene_names(json),
            function,
            go_ids,
            diseases,
            sequence: json["sequence"]["value"].as_str().map(String::from),
        }
    }
}

fn protein_name(json: &Value) -> Option<String> {
    let desc = &json["proteinDescription"];
    desc["recommendedName"]["fullName"]["value"]
        .as_str()
        .or_else(|| desc["submissionNames"][0]["fullName"]["value"].as_str())
        .map(String::from)
}

fn gene_names(json: &Value) -> Vec<String> {
    json["genes"]
        .as_array()
        .map(|arr| {
            arr.iter()
                .filter_map(|g| g["geneName"]["value"].as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

#[derive(Debug, Clone)]
pub struct UniProtClient {
    http: HttpClient,
    base_url: String,
}

impl UniProtClient {
    pub fn new(http: HttpClient, base_url: impl Into<String>) -> Self {
        Self { http, base_url: base_url.into() }
    }

    /// Fetch a full entry. `Ok(None)` when the accession does not resolve.
    #[instrument(skip(self))]
    pub async fn fetch_entry(&self, accession: &str) -> Result<Option<UniProtEntry>> {
        let url = join_url(&self.base_url, &format!("{}.json", accession));
        debug!(accession, "Fetching UniProt entry");

        let resp = self.http.get(&url)?.send().await?;
        if !found(SERVICE, resp.status())? {
            return Ok(None);
        }
        let json: Value = resp.json().await?;
        Ok(Some(UniProtEntry::from_json(&json)))
    }

    /// Fetch the raw FASTA text for an accession.
    #[instrument(skip(self))]
    pub async fn fetch_fasta(&self, accession: &str) -> Result<Option<String>> {
        let url = join_url(&self.base_url, &format!("{}.fasta", accession));
        debug!(accession, "Fetching UniProt FASTA");

        let resp = self.http.get(&url)?.send().await?;
        if !found(SERVICE, resp.status())? {
            return Ok(None);
        }
        let text = resp.text().await?;
        if !text.trim_start().starts_with('>') {
            return Ok(None);
        }
        Ok(Some(text))
    }

    /// Fetch the bare sequence for an accession.
    pub async fn fetch_sequence(&self, accession: &str) -> Result<Option<String>> {
        Ok(self
            .fetch_fasta(accession)
            .await?
            .map(|fasta| clean_sequence(&fasta))
            .filter(|seq| !seq.is_empty()))
    }

    /// Run a free-text search and return the first hit.
    #[instrument(skip(self))]
    pub async fn search_first(&self, query: &str) -> Result<Option<UniProtSearchHit>> {
        let url = join_url(&self.base_url, "search");
        debug!(query, "Searching UniProt");

        let resp = self
            .http
            .get(&url)?
            .query(&[("query", query), ("format", "json"), ("size", "1")])
            .send()
            .await?;
        if !found(SERVICE, resp.status())? {
            return Ok(None);
        }
        let json: Value = resp.json().await?;
        Ok(json["results"]
            .as_array()
            .and_then(|results| results.first())
            .and_then(|hit| {
                Some(UniProtSearchHit {
                    accession: hit["primaryAccession"].as_str()?.to_string(),
                    gene: gene_names(hit).into_iter().next(),
                    protein_name: protein_name(hit),
                    organism: hit["organism"]["scientificName"].as_str().map(String::from),
                })
            }))
    }
}
