//! QuickGO client: GO term names and gene-product annotations.
//!
//! Endpoint: https://www.ebi.ac.uk/QuickGO/services

use biostructx_common::HttpClient;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::{found, join_url, Result};

const SERVICE: &str = "QuickGO";

/// One GO annotation of a gene product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoAnnotation {
    pub go_id: String,
    pub aspect: String,
    pub go_name: Option<String>,
}

/// A GO identifier with its resolved name, if QuickGO knows it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoTerm {
    pub id: String,
    pub name: Option<String>,
}

pub fn parse_annotations(json: &Value) -> Vec<GoAnnotation> {
    json["results"]
        .as_array()
        .map(|arr| {
            arr.iter()
                .filter_map(|a| {
                    Some(GoAnnotation {
                        go_id: a["goId"].as_str()?.to_string(),
                        aspect: a["goAspect"].as_str().unwrap_or("").to_string(),
                        go_name: a["goName"].as_str().map(String::from),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

#[derive(Debug, Clone)]
pub struct QuickGoClient {
    http: HttpClient,
    base_url: String,
}

impl QuickGoClient {
    pub fn new(http: HttpClient, base_url: impl Into<String>) -> Self {
        Self { http, base_url: base_url.into() }
    }

    /// Name of a GO term, `Ok(None)` if QuickGO has no such term.
    #[instrument(skip(self))]
    pub async fn term_name(&self, go_id: &str) -> Result<Option<String>> {
        let url = join_url(&self.base_url, &format!("ontology/go/terms/{}", go_id));
        let resp = self.http.get(&url)?.header("Accept", "application/json").send().await?;
        if !found(SERVICE, resp.status())? {
            return Ok(None);
        }
        let json: Value = resp.json().await?;
        Ok(json["results"][0]["name"].as_str().map(String::from))
    }

    /// Resolve names for a list of GO ids. A failed lookup leaves that name
    /// empty instead of failing the batch.
    pub async fn term_names(&self, go_ids: &[String]) -> Vec<GoTerm> {
        let mut terms = Vec::with_capacity(go_ids.len());
        for id in go_ids {
            let name = match self.term_name(id).await {
                Ok(name) => name,
                Err(e) => {
                    debug!(go_id = %id, error = %e, "GO term lookup failed");
                    None
                }
            };
            terms.push(GoTerm { id: id.clone(), name });
        }
        terms
    }

    /// GO annotations for a UniProtKB accession.
    #[instrument(skip(self))]
    pub async fn annotations(&self, accession: &str, limit: usize) -> Result<Vec<GoAnnotation>> {
        let url = join_url(&self.base_url, "annotation/search");
        let product = format!("UniProtKB:{}", accession);
        let limit = limit.to_string();
        let resp = self
            .http
            .get(&url)?
            .header("Accept", "application/json")
            .query(&[("geneProductId", product.as_str()), ("limit", limit.as_str())])
            .send()
            .await?;
        if !found(SERVICE, resp.status())? {
            return Ok(Vec::new());
        }
        let json: Value = resp.json().await?;
        Ok(parse_annotations(&json))
    }
}
