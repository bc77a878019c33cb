//! Evolutionary divergence: Clustal Omega alignment, guide tree and pairwise
//! identity.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use axum::{Form, Json};
use biostructx_molecules::alignment::identity_matrix;
use biostructx_sources::fasta::parse_fasta;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, instrument};

use crate::context::{Module, RequestContext, Theme};
use crate::error::ApiError;
use crate::handlers::{render_page, split_ids};
use crate::state::{AppState, SharedState};

pub const EMPTY_TREE_WARNING: &str =
    "The returned phylogenetic tree is empty or invalid. Please try with more diverse or longer sequences.";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvolutionForm {
    /// UniProt IDs separated by commas or newlines.
    #[serde(default)]
    pub ids: String,
}

#[derive(Debug, Serialize)]
pub struct EvolutionResult {
    pub job_id: String,
    pub labels: Vec<String>,
    pub matrix: Vec<Vec<f64>>,
    pub alignment: String,
    pub tree: String,
    pub tree_empty: bool,
    pub warnings: Vec<String>,
}

fn unique_ids(text: &str) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for id in split_ids(text).into_iter().map(|s| s.to_ascii_uppercase()) {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}

#[instrument(skip(state, form))]
pub async fn run_evolution(state: &AppState, form: &EvolutionForm) -> Result<EvolutionResult, ApiError> {
    let ids = unique_ids(&form.ids);
    if ids.len() < 2 {
        return Err(ApiError::invalid_input("Please enter at least two distinct UniProt IDs."));
    }

    let mut fasta = String::new();
    for id in &ids {
        let record = state
            .sources
            .uniprot
            .fetch_fasta(id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("UniProt entry {} not found.", id)))?;
        fasta.push_str(record.trim_end());
        fasta.push('\n');
    }

    let output = state.sources.clustalo.align(&fasta).await?;
    let records = parse_fasta(&output.alignment);
    let labels: Vec<String> = records.iter().map(|r| r.id().to_string()).collect();
    let aligned: Vec<&str> = records.iter().map(|r| r.sequence.as_str()).collect();
    let matrix = identity_matrix(&aligned);

    let tree_empty = output.tree_is_empty();
    let warnings = if tree_empty { vec![EMPTY_TREE_WARNING.to_string()] } else { Vec::new() };
    info!(job_id = %output.job_id, sequences = labels.len(), tree_empty, "Alignment finished");

    Ok(EvolutionResult {
        job_id: output.job_id,
        labels,
        matrix,
        alignment: output.alignment,
        tree: output.tree,
        tree_empty,
        warnings,
    })
}

#[derive(Debug, Serialize)]
struct EvolutionPage<'a> {
    ids: &'a str,
    result: Option<EvolutionResult>,
    warnings: Vec<String>,
    error: Option<String>,
}

pub async fn evolution_page(State(state): State<SharedState>, theme: Theme) -> Result<Response, ApiError> {
    let ctx = RequestContext::new(Module::Evolution, theme);
    let page = EvolutionPage { ids: "", result: None, warnings: Vec::new(), error: None };
    render_page(&state, "evolution.html", &ctx, StatusCode::OK, page)
}

pub async fn evolution_submit(
    State(state): State<SharedState>,
    theme: Theme,
    Form(form): Form<EvolutionForm>,
) -> Result<Response, ApiError> {
    let ctx = RequestContext::new(Module::Evolution, theme);
    let mut page = EvolutionPage { ids: &form.ids, result: None, warnings: Vec::new(), error: None };
    let status = match run_evolution(&state, &form).await {
        Ok(mut result) => {
            page.warnings = std::mem::take(&mut result.warnings);
            page.result = Some(result);
            StatusCode::OK
        }
        Err(e) => {
            page.error = Some(e.message);
            e.status
        }
    };
    render_page(&state, "evolution.html", &ctx, status, page)
}

/// POST /api/evolution
pub async fn api_evolution(
    State(state): State<SharedState>,
    Json(form): Json<EvolutionForm>,
) -> Result<Json<Value>, ApiError> {
    let result = run_evolution(&state, &form).await?;
    Ok(Json(json!({ "status": "success", "result": result })))
}
