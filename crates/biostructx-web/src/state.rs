//! Shared application state, built once at startup and read-only afterwards.

use std::sync::Arc;
use std::time::Duration;

use biostructx_affinity::ligand::provider_from_config;
use biostructx_affinity::normalize::InputResolver;
use biostructx_affinity::{AffinityPipeline, RegressionForest};
use biostructx_common::{AppConfig, HttpClient};
use biostructx_llm::ChatAssistant;
use biostructx_sources::chembl::ChemblClient;
use biostructx_sources::clustalo::ClustaloClient;
use biostructx_sources::pubchem::PubChemClient;
use biostructx_sources::quickgo::QuickGoClient;
use biostructx_sources::structures::StructureClient;
use biostructx_sources::uniprot::UniProtClient;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::render::Templates;

/// Database clients sharing one allowlisted HTTP client.
#[derive(Debug, Clone)]
pub struct Sources {
    pub uniprot: UniProtClient,
    pub chembl: ChemblClient,
    pub pubchem: PubChemClient,
    pub structures: StructureClient,
    pub quickgo: QuickGoClient,
    pub clustalo: ClustaloClient,
}

impl Sources {
    pub fn from_config(config: &AppConfig, http: &HttpClient) -> Self {
        let e = &config.endpoints;
        Self {
            uniprot: UniProtClient::new(http.clone(), &e.uniprot),
            chembl: ChemblClient::new(http.clone(), &e.chembl),
            pubchem: PubChemClient::new(http.clone(), &e.pubchem),
            structures: StructureClient::new(http.clone(), &e.rcsb, &e.alphafold),
            quickgo: QuickGoClient::new(http.clone(), &e.quickgo),
            clustalo: ClustaloClient::new(http.clone(), &e.clustalo, &config.clustalo.email).with_polling(
                Duration::from_secs(config.clustalo.poll_interval_secs),
                config.clustalo.max_polls,
            ),
        }
    }
}

/// Shared state injected into every Axum handler.
pub struct AppState {
    pub config: AppConfig,
    pub sources: Sources,
    /// `Err` holds the diagnostic shown while the affinity page is disabled.
    pub affinity: Result<AffinityPipeline, String>,
    /// `Err` holds the diagnostic shown while the chat page is disabled.
    pub chat: Result<ChatAssistant, String>,
    pub templates: Templates,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Builds clients, loads the model and sets up the chat backend. A missing
    /// model or API key disables only the page that needs it.
    pub fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let http = HttpClient::from_config(&config)?;
        let sources = Sources::from_config(&config, &http);

        let affinity = match RegressionForest::load(&config.model.path) {
            Ok(forest) => {
                let resolver = InputResolver::new(sources.chembl.clone(), sources.uniprot.clone());
                let pipeline = AffinityPipeline::new(provider_from_config(&config, http.clone()), Arc::new(forest))
                    .with_resolver(resolver);
                Ok(pipeline)
            }
            Err(e) => {
                warn!(path = %config.model.path, "Affinity page disabled: {}", e);
                Err(e.to_string())
            }
        };

        let chat = ChatAssistant::from_config(&config.chat, http).map_err(|e| {
            warn!("Chat page disabled: {}", e);
            e.to_string()
        });

        info!(
            model_loaded = affinity.is_ok(),
            chat_enabled = chat.is_ok(),
            "Application state ready"
        );

        Ok(Self { config, sources, affinity, chat, templates: Templates::new()?, started_at: Utc::now() })
    }
}

pub type SharedState = Arc<AppState>;
