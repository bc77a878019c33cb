use reqwest::{Client, ClientBuilder};
use std::collections::HashSet;
use std::time::Duration;
use url::Url;

use crate::config::AppConfig;
use crate::error::BioStructXError;

/// Hosts every BioStructX deployment talks to.
const DEFAULT_ALLOWLIST: &[&str] = &[
    "rest.uniprot.org",            // UniProt REST
    "ebi.ac.uk",                   // ChEMBL, AlphaFold, QuickGO, Clustal Omega
    "pubchem.ncbi.nlm.nih.gov",    // PubChem PUG REST
    "rcsb.org",                    // RCSB files
    "rdkit-api.onrender.com",      // Hosted ligand descriptor service
    "api.openai.com",              // Chat completions
    "localhost",
    "127.0.0.1",
];

/// An HTTP client that only allows requests to approved hosts.
///
/// Cloning is cheap: the inner `reqwest::Client` is reference counted.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    allowlist: HashSet<String>,
}

impl HttpClient {
    /// Creates a client with the default allowlist and a 30 s timeout.
    pub fn new() -> Result<Self, BioStructXError> {
        Self::with_timeout(Duration::from_secs(30))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, BioStructXError> {
        let allowlist = DEFAULT_ALLOWLIST.iter().map(|d| d.to_string()).collect();

        let client = ClientBuilder::new()
            .timeout(timeout)
            .user_agent(concat!("biostructx/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BioStructXError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, allowlist })
    }

    /// Builds a client from the application config: timeout, extra hosts, and
    /// the hosts of every configured endpoint.
    pub fn from_config(config: &AppConfig) -> Result<Self, BioStructXError> {
        let mut http = Self::with_timeout(Duration::from_secs(config.http.timeout_secs))?;
        for host in &config.http.extra_allowed_hosts {
            http.allow_domain(host);
        }
        for url in config.endpoint_urls() {
            http.allow_url_host(url);
        }
        Ok(http)
    }

    /// Appends an exact hostname to the allowlist.
    pub fn allow_domain(&mut self, domain: &str) {
        self.allowlist.insert(domain.to_string());
    }

    /// Allows the host part of `url`. Unparseable URLs are ignored.
    pub fn allow_url_host(&mut self, url: &str) {
        if let Some(host) = Url::parse(url).ok().and_then(|u| u.host_str().map(String::from)) {
            self.allowlist.insert(host);
        }
    }

    /// Validates if a URL is permitted under the current policy.
    pub fn is_allowed(&self, url: &str) -> bool {
        if let Ok(parsed) = Url::parse(url) {
            if let Some(host) = parsed.host_str() {
                // Exact match or a subdomain of an allowed domain
                for allowed in &self.allowlist {
                    if host == allowed || host.ends_with(&format!(".{}", allowed)) {
                        return true;
                    }
                }
            }
        }
        false
    }

    fn check(&self, url: &str) -> Result<(), BioStructXError> {
        if self.is_allowed(url) {
            Ok(())
        } else {
            Err(BioStructXError::Security(format!(
                "domain not in allowlist for URL {}",
                url
            )))
        }
    }

    pub fn get(&self, url: &str) -> Result<reqwest::RequestBuilder, BioStructXError> {
        self.check(url)?;
        Ok(self.client.get(url))
    }

    pub fn post(&self, url: &str) -> Result<reqwest::RequestBuilder, BioStructXError> {
        self.check(url)?;
        Ok(self.client.post(url))
    }
}
