//! Ligand side of the feature vector.
//!
//! Descriptors come from a remote provider behind `LigandDescriptorProvider`:
//! a hosted RDKit service (default) or PubChem's computed properties.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use biostructx_common::config::DescriptorProviderKind;
use biostructx_common::{AppConfig, HttpClient};
use biostructx_sources::pubchem::PubChemClient;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, instrument, warn};

use crate::error::{AffinityError, Result, Side};

/// MolWt, LogP, TPSA, NumRotatableBonds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LigandDescriptor {
    pub molecular_weight: f64,
    pub logp: f64,
    pub tpsa: f64,
    pub rotatable_bonds: f64,
}

impl LigandDescriptor {
    pub const LEN: usize = 4;
    pub const NAMES: [&'static str; Self::LEN] = ["MolWt", "LogP", "TPSA", "NumRotatableBonds"];

    pub fn to_array(&self) -> [f64; Self::LEN] {
        [self.molecular_weight, self.logp, self.tpsa, self.rotatable_bonds]
    }
}

#[async_trait]
pub trait LigandDescriptorProvider: Send + Sync {
    /// Service name used in logs and upstream errors.
    fn name(&self) -> &'static str;

    async fn describe(&self, smiles: &str) -> Result<LigandDescriptor>;
}

fn non_empty(smiles: &str) -> Result<&str> {
    let smiles = smiles.trim();
    if smiles.is_empty() {
        return Err(AffinityError::InvalidLigand("empty SMILES".to_string()));
    }
    Ok(smiles)
}

fn number(value: &Value) -> f64 {
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
        .unwrap_or(0.0)
}

/// Reads an RDKit service response body. Missing fields count as 0.
pub fn parse_rdkit_response(json: &Value) -> Result<LigandDescriptor> {
    if let Some(err) = json.get("error") {
        let message = err.as_str().map(String::from).unwrap_or_else(|| err.to_string());
        return Err(AffinityError::InvalidLigand(message));
    }
    if !json.is_object() {
        return Err(AffinityError::InvalidLigand(
            "descriptor service returned an unexpected body".to_string(),
        ));
    }
    Ok(LigandDescriptor {
        molecular_weight: number(&json["MolWt"]),
        logp: number(&json["LogP"]),
        tpsa: number(&json["TPSA"]),
        rotatable_bonds: number(&json["NumRotatableBonds"]),
    })
}

// ── RDKit service ──────────────────────────────────────────────────────────

pub struct RdkitServiceProvider {
    http: HttpClient,
    url: String,
}

impl RdkitServiceProvider {
    const SERVICE: &'static str = "RDKit service";

    pub fn new(http: HttpClient, url: impl Into<String>) -> Self {
        Self { http, url: url.into() }
    }
}

#[async_trait]
impl LigandDescriptorProvider for RdkitServiceProvider {
    fn name(&self) -> &'static str {
        Self::SERVICE
    }

    #[instrument(skip(self))]
    async fn describe(&self, smiles: &str) -> Result<LigandDescriptor> {
        let smiles = non_empty(smiles)?;
        let upstream = |e: &dyn std::fmt::Display| AffinityError::upstream(Self::SERVICE, Side::Ligand, e);

        let request = self.http.post(&self.url).map_err(|e| upstream(&e))?;
        let resp = request
            .json(&json!({ "smiles": smiles }))
            .send()
            .await
            .map_err(|e| upstream(&e))?;

        let status = resp.status();
        debug!(status = status.as_u16(), "RDKit service responded");
        if status.is_server_error() {
            warn!(status = status.as_u16(), "Descriptor service failure");
            return Err(upstream(&format!("HTTP {}", status.as_u16())));
        }
        if !status.is_success() {
            return Err(AffinityError::InvalidLigand(format!(
                "descriptor service rejected the SMILES (HTTP {})",
                status.as_u16()
            )));
        }

        let body = resp.text().await.map_err(|e| upstream(&e))?;
        let json: Value = serde_json::from_str(&body).map_err(|_| {
            AffinityError::InvalidLigand("descriptor service returned a non-JSON body".to_string())
        })?;
        parse_rdkit_response(&json)
    }
}

// ── PubChem ────────────────────────────────────────────────────────────────

pub struct PubChemDescriptorProvider {
    client: PubChemClient,
}

impl PubChemDescriptorProvider {
    pub fn new(client: PubChemClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LigandDescriptorProvider for PubChemDescriptorProvider {
    fn name(&self) -> &'static str {
        "PubChem"
    }

    #[instrument(skip(self))]
    async fn describe(&self, smiles: &str) -> Result<LigandDescriptor> {
        let smiles = non_empty(smiles)?;
        match self.client.descriptors_by_smiles(smiles).await {
            Ok(Some(d)) => Ok(LigandDescriptor {
                molecular_weight: d.molecular_weight.unwrap_or(0.0),
                logp: d.xlogp.unwrap_or(0.0),
                tpsa: d.tpsa.unwrap_or(0.0),
                rotatable_bonds: d.rotatable_bonds.unwrap_or(0.0),
            }),
            Ok(None) => Err(AffinityError::InvalidLigand(
                "PubChem could not resolve the SMILES".to_string(),
            )),
            Err(e) => Err(AffinityError::from_source("PubChem", Side::Ligand, e)),
        }
    }
}

/// Builds the provider selected in `[descriptors]`.
pub fn provider_from_config(config: &AppConfig, http: HttpClient) -> Arc<dyn LigandDescriptorProvider> {
    match config.descriptors.provider {
        DescriptorProviderKind::RdkitService => {
            Arc::new(RdkitServiceProvider::new(http, config.descriptors.rdkit_url.clone()))
        }
        DescriptorProviderKind::PubChem => Arc::new(PubChemDescriptorProvider::new(
            PubChemClient::new(http, config.endpoints.pubchem.clone()),
        )),
    }
}

// ── In-memory ──────────────────────────────────────────────────────────────

/// Provider answering from a fixed table. Unknown SMILES are `InvalidLigand`.
#[derive(Debug, Default, Clone)]
pub struct MockLigandProvider {
    table: HashMap<String, LigandDescriptor>,
}

impl MockLigandProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, smiles: &str, descriptor: LigandDescriptor) -> Self {
        self.table.insert(smiles.to_string(), descriptor);
        self
    }
}

#[async_trait]
impl LigandDescriptorProvider for MockLigandProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn describe(&self, smiles: &str) -> Result<LigandDescriptor> {
        let smiles = non_empty(smiles)?;
        self.table
            .get(smiles)
            .copied()
            .ok_or_else(|| AffinityError::InvalidLigand(format!("unknown SMILES: {}", smiles)))
    }
}
