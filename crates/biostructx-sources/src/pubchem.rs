//! PubChem PUG REST client.
//!
//! Endpoint: https://pubchem.ncbi.nlm.nih.gov/rest/pug
//!
//!   - compound properties by CID, by name, or by SMILES
//!   - 2-D fast similarity search (returns CIDs)
//!   - compound titles and PNG depiction URLs

use biostructx_common::HttpClient;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use crate::{found, Result};

const SERVICE: &str = "PubChem";

/// Summary properties for one compound.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompoundProperties {
    pub cid: Option<u64>,
    pub molecular_formula: Option<String>,
    pub molecular_weight: Option<f64>,
    pub iupac_name: Option<String>,
    pub canonical_smiles: Option<String>,
}

/// Descriptor values PubChem computes for a structure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DescriptorProperties {
    pub molecular_weight: Option<f64>,
    pub xlogp: Option<f64>,
    pub tpsa: Option<f64>,
    pub rotatable_bonds: Option<f64>,
}

/// A compound returned by the similarity search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarCompound {
    pub cid: u64,
    pub title: Option<String>,
    pub image_url: String,
}

/// PubChem reports most numbers as JSON strings ("180.16").
fn number(value: &Value) -> Option<f64> {
    value.as_f64().or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
}

fn first_property(json: &Value) -> Option<&Value> {
    json["PropertyTable"]["Properties"].as_array().and_then(|p| p.first())
}

impl CompoundProperties {
    pub fn from_json(json: &Value) -> Option<Self> {
        let p = first_property(json)?;
        Some(Self {
            cid: p["CID"].as_u64(),
            molecular_formula: p["MolecularFormula"].as_str().map(String::from),
            molecular_weight: number(&p["MolecularWeight"]),
            iupac_name: p["IUPACName"].as_str().map(String::from),
            canonical_smiles: ["CanonicalSMILES", "ConnectivitySMILES", "SMILES"]
                .iter()
                .find_map(|key| p[*key].as_str())
                .map(String::from),
        })
    }
}

impl DescriptorProperties {
    pub fn from_json(json: &Value) -> Option<Self> {
        let p = first_property(json)?;
        Some(Self {
            molecular_weight: number(&p["MolecularWeight"]),
            xlogp: number(&p["XLogP"]),
            tpsa: number(&p["TPSA"]),
            rotatable_bonds: number(&p["RotatableBondCount"]),
        })
    }
}

#[derive(Debug, Clone)]
pub struct PubChemClient {
    http: HttpClient,
    base_url: String,
}

impl PubChemClient {
    pub fn new(http: HttpClient, base_url: impl Into<String>) -> Self {
        Self { http, base_url: base_url.into() }
    }

    /// Builds `{base}/seg/seg/...` with each segment percent-encoded, so names
    /// with spaces or slashes stay a single path segment.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(self.base_url.trim_end_matches('/'))?;
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .extend(segments);
        Ok(url)
    }

    async fn get_json(&self, url: &Url, query: &[(&str, &str)]) -> Result<Option<Value>> {
        let resp = self.http.get(url.as_str())?.query(query).send().await?;
        if !found(SERVICE, resp.status())? {
            return Ok(None);
        }
        Ok(Some(resp.json().await?))
    }

    /// Formula, weight and IUPAC name by CID.
    #[instrument(skip(self))]
    pub async fn properties_by_cid(&self, cid: &str) -> Result<Option<CompoundProperties>> {
        let url = self.url(&[
            "compound", "cid", cid, "property",
            "MolecularFormula,MolecularWeight,IUPACName", "JSON",
        ])?;
        debug!(cid, "Fetching PubChem properties");
        Ok(self.get_json(&url, &[]).await?.as_ref().and_then(CompoundProperties::from_json))
    }

    /// Properties (including canonical SMILES) by compound name.
    #[instrument(skip(self))]
    pub async fn properties_by_name(&self, name: &str) -> Result<Option<CompoundProperties>> {
        let url = self.url(&[
            "compound", "name", name, "property",
            "MolecularFormula,MolecularWeight,CanonicalSMILES,IUPACName", "JSON",
        ])?;
        debug!(name, "Fetching PubChem properties by name");
        Ok(self.get_json(&url, &[]).await?.as_ref().and_then(CompoundProperties::from_json))
    }

    /// Same properties, treating the query as a SMILES string.
    #[instrument(skip(self))]
    pub async fn properties_by_smiles(&self, smiles: &str) -> Result<Option<CompoundProperties>> {
        let url = self.url(&[
            "compound", "smiles", "property",
            "MolecularFormula,MolecularWeight,CanonicalSMILES,IUPACName", "JSON",
        ])?;
        Ok(self
            .get_json(&url, &[("smiles", smiles)])
            .await?
            .as_ref()
            .and_then(CompoundProperties::from_json))
    }

    /// Descriptor values used as an alternative ligand descriptor source.
    #[instrument(skip(self))]
    pub async fn descriptors_by_smiles(&self, smiles: &str) -> Result<Option<DescriptorProperties>> {
        let url = self.url(&[
            "compound", "smiles", "property",
            "MolecularWeight,XLogP,TPSA,RotatableBondCount", "JSON",
        ])?;
        debug!(smiles, "Fetching PubChem descriptors");
        Ok(self
            .get_json(&url, &[("smiles", smiles)])
            .await?
            .as_ref()
            .and_then(DescriptorProperties::from_json))
    }

    /// CIDs of compounds with 2-D Tanimoto similarity >= `threshold` percent.
    #[instrument(skip(self))]
    pub async fn similar_cids(&self, smiles: &str, threshold: u32, max_records: usize) -> Result<Vec<u64>> {
        let url = self.url(&["compound", "fastsimilarity_2d", "smiles", "cids", "JSON"])?;
        let threshold = threshold.to_string();
        let max = max_records.to_string();
        let json = self
            .get_json(&url, &[("smiles", smiles), ("Threshold", &threshold), ("MaxRecords", &max)])
            .await?;

        let cids = json
            .as_ref()
            .and_then(|j| j["IdentifierList"]["CID"].as_array())
            .map(|arr| arr.iter().filter_map(Value::as_u64).take(max_records).collect())
            .unwrap_or_default();
        Ok(cids)
    }

    /// Compound title from the description record.
    #[instrument(skip(self))]
    pub async fn title(&self, cid: u64) -> Result<Option<String>> {
        let url = self.url(&["compound", "cid", &cid.to_string(), "description", "JSON"])?;
        let json = self.get_json(&url, &[]).await?;
        Ok(json.as_ref().and_then(|j| {
            j["InformationList"]["Information"]
                .as_array()?
                .iter()
                .find_map(|info| info["Title"].as_str())
                .map(String::from)
        }))
    }

    /// URL of PubChem's PNG depiction; not fetched server-side.
    pub fn image_url(&self, cid: u64) -> String {
        self.url(&["compound", "cid", &cid.to_string(), "PNG"])
            .map(String::from)
            .unwrap_or_default()
    }

    /// Similar compounds with titles and image links.
    pub async fn similar_compounds(&self, smiles: &str, threshold: u32, max_records: usize) -> Result<Vec<SimilarCompound>> {
        let mut out = Vec::new();
        for cid in self.similar_cids(smiles, threshold, max_records).await? {
            out.push(SimilarCompound {
                cid,
                title: self.title(cid).await?,
                image_url: self.image_url(cid),
            });
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> PubChemClient {
        PubChemClient::new(HttpClient::new().unwrap(), "https://pubchem.ncbi.nlm.nih.gov/rest/pug/")
    }

    #[test]
    fn test_properties_parse_string_numbers() {
        let json = json!({
            "PropertyTable": { "Properties": [ {
                "CID": 2244,
                "MolecularFormula": "C9H8O4",
                "MolecularWeight": "180.16",
                "IUPACName": "2-acetyloxybenzoic acid",
                "ConnectivitySMILES": "CC(=O)OC1=CC=CC=C1C(=O)O"
            } ] }
        });
        let props = CompoundProperties::from_json(&json).unwrap();
        assert_eq!(props.cid, Some(2244));
        assert_eq!(props.molecular_weight, Some(180.16));
        assert_eq!(props.canonical_smiles.as_deref(), Some("CC(=O)OC1=CC=CC=C1C(=O)O"));
    }

    #[test]
    fn test_descriptor_parsing_with_missing_xlogp() {
        let json = json!({
            "PropertyTable": { "Properties": [ {
                "MolecularWeight": "46.07", "TPSA": 20.2, "RotatableBondCount": 0
            } ] }
        });
        let props = DescriptorProperties::from_json(&json).unwrap();
        assert_eq!(props.molecular_weight, Some(46.07));
        assert_eq!(props.xlogp, None);
        assert_eq!(props.tpsa, Some(20.2));
        assert_eq!(props.rotatable_bonds, Some(0.0));
    }

    #[test]
    fn test_empty_property_table() {
        assert!(CompoundProperties::from_json(&json!({ "Fault": {} })).is_none());
    }

    #[test]
    fn test_url_encodes_segments() {
        let url = client().url(&["compound", "name", "acetic acid/ester", "JSON"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://pubchem.ncbi.nlm.nih.gov/rest/pug/compound/name/acetic%20acid%2Fester/JSON"
        );
    }

    #[test]
    fn test_image_url() {
        assert_eq!(
            client().image_url(2244),
            "https://pubchem.ncbi.nlm.nih.gov/rest/pug/compound/cid/2244/PNG"
        );
    }
}
