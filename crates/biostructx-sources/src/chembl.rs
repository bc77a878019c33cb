//! ChEMBL API client.
//!
//! API docs: https://chembl.gitbook.io/chembl-interface-documentation/web-resources/chembl-api
//! Endpoint: https://www.ebi.ac.uk/chembl/api/data
//!
//! Only molecule records are needed: the browser shows name, type and phase,
//! and the normalizer and clustering page resolve IDs to canonical SMILES.

use biostructx_common::HttpClient;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::{found, join_url, Result};

const SERVICE: &str = "ChEMBL";
const REPORT_CARD_URL: &str = "https://www.ebi.ac.uk/chembl/compound_report_card";

/// Molecule record from ChEMBL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoleculeRecord {
    pub chembl_id: String,
    pub pref_name: Option<String>,
    pub molecule_type: Option<String>,
    pub max_phase: Option<f64>, // Clinical trial phase (0-4); ChEMBL reports "4.0" strings
    pub canonical_smiles: Option<String>,
    pub report_card_url: String,
}

impl MoleculeRecord {
    pub fn from_json(json: &Value, requested_id: &str) -> Self {
        let chembl_id = json["molecule_chembl_id"]
            .as_str()
            .unwrap_or(requested_id)
            .to_string();
        let max_phase = json["max_phase"]
            .as_f64()
            .or_else(|| json["max_phase"].as_str().and_then(|s| s.parse().ok()));

        Self {
            report_card_url: report_card_url(&chembl_id),
            pref_name: json["pref_name"].as_str().map(String::from),
            molecule_type: json["molecule_type"].as_str().map(String::from),
            max_phase,
            canonical_smiles: json["molecule_structures"]["canonical_smiles"]
                .as_str()
                .map(String::from),
            chembl_id,
        }
    }
}

pub fn report_card_url(chembl_id: &str) -> String {
    format!("{}/{}/", REPORT_CARD_URL, chembl_id)
}

/// ChEMBL client for molecule data.
#[derive(Debug, Clone)]
pub struct ChemblClient {
    http: HttpClient,
    base_url: String,
}

impl ChemblClient {
    pub fn new(http: HttpClient, base_url: impl Into<String>) -> Self {
        Self { http, base_url: base_url.into() }
    }

    /// Fetch molecule by ChEMBL ID.
    #[instrument(skip(self))]
    pub async fn fetch_molecule(&self, chembl_id: &str) -> Result<Option<MoleculeRecord>> {
        let url = join_url(&self.base_url, &format!("molecule/{}.json", chembl_id));

        debug!(chembl_id = chembl_id, "Fetching ChEMBL molecule");

        let resp = self.http.get(&url)?.send().await?;
        if !found(SERVICE, resp.status())? {
            return Ok(None);
        }

        let json: Value = resp.json().await?;
        Ok(Some(MoleculeRecord::from_json(&json, chembl_id)))
    }

    /// Resolve a ChEMBL ID to its canonical SMILES. `Ok(None)` when the
    /// molecule is unknown or has no structure (e.g. biologics).
    pub async fn canonical_smiles(&self, chembl_id: &str) -> Result<Option<String>> {
        Ok(self
            .fetch_molecule(chembl_id)
            .await?
            .and_then(|m| m.canonical_smiles)
            .filter(|s| !s.trim().is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_molecule_parsing() {
        let json = json!({
            "molecule_chembl_id": "CHEMBL25",
            "pref_name": "ASPIRIN",
            "molecule_type": "Small molecule",
            "max_phase": "4.0",
            "molecule_structures": { "canonical_smiles": "CC(=O)Oc1ccccc1C(=O)O" }
        });
        let record = MoleculeRecord::from_json(&json, "CHEMBL25");
        assert_eq!(record.pref_name.as_deref(), Some("ASPIRIN"));
        assert_eq!(record.max_phase, Some(4.0));
        assert_eq!(record.canonical_smiles.as_deref(), Some("CC(=O)Oc1ccccc1C(=O)O"));
        assert_eq!(
            record.report_card_url,
            "https://www.ebi.ac.uk/chembl/compound_report_card/CHEMBL25/"
        );
    }

    #[test]
    fn test_biologic_has_no_smiles() {
        let json = json!({
            "molecule_chembl_id": "CHEMBL1201580",
            "molecule_type": "Antibody",
            "max_phase": 4,
            "molecule_structures": null
        });
        let record = MoleculeRecord::from_json(&json, "CHEMBL1201580");
        assert!(record.canonical_smiles.is_none());
        assert_eq!(record.max_phase, Some(4.0));
    }

    #[test]
    fn test_compound_serialization() {
        let record = MoleculeRecord::from_json(&json!({}), "CHEMBL1");
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("CHEMBL1"));
    }
}
