//! Drug–gene mapper: compound properties, similar compounds, the matching
//! UniProt target with its GO annotations and disease notes.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use biostructx_sources::pubchem::{CompoundProperties, SimilarCompound};
use biostructx_sources::quickgo::GoAnnotation;
use biostructx_sources::uniprot::{DiseaseNote, UniProtSearchHit};
use biostructx_sources::SourceError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use crate::context::{Module, RequestContext, Theme};
use crate::error::ApiError;
use crate::handlers::render_page;
use crate::state::{AppState, SharedState};

const SIMILARITY_THRESHOLD: u32 = 70;
const MAX_SIMILAR: usize = 5;
const MIN_SIMILARITY_SMILES: usize = 5;
const MAX_ANNOTATIONS: usize = 5;

#[derive(Debug, Default, Deserialize)]
pub struct DrugGeneQuery {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Default, Serialize)]
pub struct DrugGeneReport {
    pub query: String,
    pub compound: Option<CompoundProperties>,
    /// SMILES used for the similarity search.
    pub smiles: String,
    pub similar: Vec<SimilarCompound>,
    pub target: Option<UniProtSearchHit>,
    pub annotations: Vec<GoAnnotation>,
    pub diseases: Vec<DiseaseNote>,
    pub warnings: Vec<String>,
}

impl DrugGeneReport {
    /// Keeps going after a failed section and records why it is missing.
    fn section<T: Default>(&mut self, what: &str, result: Result<T, SourceError>) -> T {
        result.unwrap_or_else(|e| {
            warn!(section = what, error = %e, "Drug-gene section failed");
            self.warnings.push(format!("{} unavailable: {}", what, e));
            T::default()
        })
    }
}

#[instrument(skip(state))]
pub async fn run_drug_gene(state: &AppState, query: &str) -> Result<DrugGeneReport, ApiError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(ApiError::invalid_input("Please enter a drug name or SMILES."));
    }
    let sources = &state.sources;
    let mut report = DrugGeneReport { query: query.to_string(), ..Default::default() };

    let by_name = sources.pubchem.properties_by_name(query).await;
    report.compound = match report.section("Compound properties", by_name) {
        Some(c) => Some(c),
        None => {
            let by_smiles = sources.pubchem.properties_by_smiles(query).await;
            report.section("Compound properties", by_smiles)
        }
    };
    report.smiles = report
        .compound
        .as_ref()
        .and_then(|c| c.canonical_smiles.clone())
        .unwrap_or_else(|| query.to_string());

    if report.smiles.len() >= MIN_SIMILARITY_SMILES {
        let similar = sources
            .pubchem
            .similar_compounds(&report.smiles, SIMILARITY_THRESHOLD, MAX_SIMILAR)
            .await;
        report.similar = report.section("Similar compounds", similar);
    }

    let target = sources.uniprot.search_first(query).await;
    report.target = report.section("UniProt search", target);

    if let Some(accession) = report.target.as_ref().map(|t| t.accession.clone()) {
        let annotations = sources.quickgo.annotations(&accession, MAX_ANNOTATIONS).await;
        report.annotations = report.section("GO annotations", annotations);

        let entry = sources.uniprot.fetch_entry(&accession).await;
        report.diseases = report.section("Disease associations", entry).map(|e| e.diseases).unwrap_or_default();
    } else if report.warnings.is_empty() {
        report.warnings.push(format!("No UniProt target found for {}.", query));
    }

    info!(
        compound = report.compound.is_some(),
        similar = report.similar.len(),
        target = report.target.as_ref().map(|t| t.accession.as_str()),
        "Drug-gene mapping done"
    );
    Ok(report)
}

#[derive(Debug, Serialize)]
struct DrugGenePage {
    query: String,
    report: Option<DrugGeneReport>,
    warnings: Vec<String>,
    error: Option<String>,
}

/// GET /drug-gene?query=
pub async fn drug_gene_page(
    State(state): State<SharedState>,
    theme: Theme,
    Query(params): Query<DrugGeneQuery>,
) -> Result<Response, ApiError> {
    let ctx = RequestContext::new(Module::DrugGene, theme);
    let mut page = DrugGenePage { query: params.query.clone(), report: None, warnings: Vec::new(), error: None };
    let mut status = StatusCode::OK;

    if !params.query.trim().is_empty() {
        match run_drug_gene(&state, &params.query).await {
            Ok(mut report) => {
                page.warnings = std::mem::take(&mut report.warnings);
                page.report = Some(report);
            }
            Err(e) => {
                status = e.status;
                page.error = Some(e.message);
            }
        }
    }
    render_page(&state, "drug_gene.html", &ctx, status, page)
}

/// GET /api/drug-gene?query=
pub async fn api_drug_gene(
    State(state): State<SharedState>,
    Query(params): Query<DrugGeneQuery>,
) -> Result<Json<Value>, ApiError> {
    let report = run_drug_gene(&state, &params.query).await?;
    Ok(Json(json!({ "status": "success", "report": report })))
}
