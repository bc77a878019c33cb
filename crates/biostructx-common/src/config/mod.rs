//! Configuration loading for BioStructX.
//! Reads biostructx.toml from the current directory or the path in BIOSTRUCTX_CONFIG.
//! Every field has a default, so a missing file or a partial file is fine.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::BioStructXError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub endpoints: EndpointConfig,
    #[serde(default)]
    pub descriptors: DescriptorConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub clustalo: ClustaloConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

fn default_bind()       -> String { "127.0.0.1:8501".to_string() }
fn default_static_dir() -> String { "static".to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: default_bind(), static_dir: default_static_dir() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub extra_allowed_hosts: Vec<String>,
}

fn default_timeout_secs() -> u64 { 30 }

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: default_timeout_secs(), extra_allowed_hosts: Vec::new() }
    }
}

/// Base URLs of the public databases. Overridable so a deployment can point
/// at a mirror.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    #[serde(default = "default_uniprot")]
    pub uniprot: String,
    #[serde(default = "default_chembl")]
    pub chembl: String,
    #[serde(default = "default_pubchem")]
    pub pubchem: String,
    #[serde(default = "default_rcsb")]
    pub rcsb: String,
    #[serde(default = "default_alphafold")]
    pub alphafold: String,
    #[serde(default = "default_quickgo")]
    pub quickgo: String,
    #[serde(default = "default_clustalo")]
    pub clustalo: String,
}

fn default_uniprot()   -> String { "https://rest.uniprot.org/uniprotkb".to_string() }
fn default_chembl()    -> String { "https://www.ebi.ac.uk/chembl/api/data".to_string() }
fn default_pubchem()   -> String { "https://pubchem.ncbi.nlm.nih.gov/rest/pug".to_string() }
fn default_rcsb()      -> String { "https://files.rcsb.org".to_string() }
fn default_alphafold() -> String { "https://alphafold.ebi.ac.uk/files".to_string() }
fn default_quickgo()   -> String { "https://www.ebi.ac.uk/QuickGO/services".to_string() }
fn default_clustalo()  -> String { "https://www.ebi.ac.uk/Tools/services/rest/clustalo".to_string() }

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            uniprot: default_uniprot(),
            chembl: default_chembl(),
            pubchem: default_pubchem(),
            rcsb: default_rcsb(),
            alphafold: default_alphafold(),
            quickgo: default_quickgo(),
            clustalo: default_clustalo(),
        }
    }
}

/// Which remote provider computes ligand descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DescriptorProviderKind {
    RdkitService,
    #[serde(rename = "pubchem")]
    PubChem,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescriptorConfig {
    #[serde(default = "default_provider")]
    pub provider: DescriptorProviderKind,
    #[serde(default = "default_rdkit_url")]
    pub rdkit_url: String,
}

fn default_provider()  -> DescriptorProviderKind { DescriptorProviderKind::RdkitService }
fn default_rdkit_url() -> String { "https://rdkit-api.onrender.com/compute".to_string() }

impl Default for DescriptorConfig {
    fn default() -> Self {
        Self { provider: default_provider(), rdkit_url: default_rdkit_url() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_model_path")]
    pub path: String,
}

fn default_model_path() -> String { "models/affinity_forest.json".to_string() }

impl Default for ModelConfig {
    fn default() -> Self {
        Self { path: default_model_path() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClustaloConfig {
    #[serde(default = "default_clustalo_email")]
    pub email: String,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_max_polls")]
    pub max_polls: u32,
}

fn default_clustalo_email() -> String { "biostructx@example.org".to_string() }
fn default_poll_interval()  -> u64    { 3 }
fn default_max_polls()      -> u32    { 100 }

impl Default for ClustaloConfig {
    fn default() -> Self {
        Self {
            email: default_clustalo_email(),
            poll_interval_secs: default_poll_interval(),
            max_polls: default_max_polls(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default = "default_chat_base_url")]
    pub base_url: String,
    #[serde(default = "default_chat_model")]
    pub default_model: String,
    #[serde(default = "default_advanced_model")]
    pub advanced_model: String,
    /// Name of the environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

fn default_chat_base_url()  -> String { "https://api.openai.com".to_string() }
fn default_chat_model()     -> String { "gpt-3.5-turbo".to_string() }
fn default_advanced_model() -> String { "gpt-4".to_string() }
fn default_api_key_env()    -> String { "OPENAI_API_KEY".to_string() }

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            base_url: default_chat_base_url(),
            default_model: default_chat_model(),
            advanced_model: default_advanced_model(),
            api_key_env: default_api_key_env(),
        }
    }
}

impl ChatConfig {
    /// Reads the API key from the configured environment variable.
    /// Empty values count as missing.
    pub fn api_key(&self) -> Option<secrecy::SecretString> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .map(secrecy::SecretString::from)
    }
}

mod tests;

impl AppConfig {
    /// Load configuration from biostructx.toml.
    /// Checks BIOSTRUCTX_CONFIG first, then the current directory. A missing
    /// file yields the defaults.
    pub fn load() -> Result<Self, BioStructXError> {
        let path = std::env::var("BIOSTRUCTX_CONFIG")
            .unwrap_or_else(|_| "biostructx.toml".to_string());
        Self::load_from(&path)
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, BioStructXError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::warn!("Config file not found: {}; using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, BioStructXError> {
        toml::from_str(content).map_err(|e| BioStructXError::Config(e.to_string()))
    }

    /// Every remote URL the configuration points at.
    pub fn endpoint_urls(&self) -> Vec<&str> {
        vec![
            self.endpoints.uniprot.as_str(),
            self.endpoints.chembl.as_str(),
            self.endpoints.pubchem.as_str(),
            self.endpoints.rcsb.as_str(),
            self.endpoints.alphafold.as_str(),
            self.endpoints.quickgo.as_str(),
            self.endpoints.clustalo.as_str(),
            self.descriptors.rdkit_url.as_str(),
            self.chat.base_url.as_str(),
        ]
    }
}
