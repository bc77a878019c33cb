//! Ligand similarity clustering page, CSV export and API.

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use biostructx_molecules::clustering::{cluster_ligands, ClusteredLigand, LigandClusterResult, DEFAULT_DISTANCE_THRESHOLD};
use biostructx_molecules::MoleculeError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use tracing::{debug, instrument};

use crate::chart::cluster_scatter_svg;
use crate::context::{Module, RequestContext, Theme};
use crate::error::ApiError;
use crate::handlers::render_page;
use crate::state::{AppState, SharedState};

pub const TOO_FEW_LIGANDS: &str = "Need at least 2 valid ligands for clustering.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LigandInput {
    #[default]
    Smiles,
    Chembl,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(usize),
    Text(String),
}

/// Accepts a JSON number or form text; an empty field (an untouched number
/// input) means "no filter".
fn empty_as_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<usize>, D::Error> {
    match Option::<NumberOrText>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrText::Number(n)) => Ok(Some(n)),
        Some(NumberOrText::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(NumberOrText::Text(s)) => s.trim().parse().map(Some).map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClusterForm {
    /// One SMILES or ChEMBL ID per line.
    #[serde(default)]
    pub ligands: String,
    #[serde(default)]
    pub input_kind: LigandInput,
    /// Restricts the table and CSV to one cluster.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub cluster: Option<usize>,
}

/// Resolves ChEMBL IDs (upper-cased) to SMILES; IDs without a structure are
/// reported as rejected at their original position.
#[instrument(skip(state, form), fields(kind = ?form.input_kind))]
pub async fn run_clusters(state: &AppState, form: &ClusterForm) -> Result<LigandClusterResult, ApiError> {
    let lines: Vec<String> = form
        .ligands
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();

    let mut inputs = Vec::with_capacity(lines.len());
    let mut unresolved = Vec::new();
    match form.input_kind {
        LigandInput::Smiles => inputs = lines,
        LigandInput::Chembl => {
            for (i, line) in lines.iter().enumerate() {
                let id = line.to_ascii_uppercase();
                match state.sources.chembl.canonical_smiles(&id).await? {
                    Some(smiles) => inputs.push(smiles),
                    None => {
                        debug!(chembl_id = %id, "No structure in ChEMBL");
                        unresolved.push((i + 1, id.clone()));
                        inputs.push(String::new());
                    }
                }
            }
        }
    }

    let mut result = cluster_ligands(&inputs, DEFAULT_DISTANCE_THRESHOLD).map_err(|e| match e {
        MoleculeError::TooFewLigands { .. } => ApiError::invalid_input(TOO_FEW_LIGANDS),
        other => ApiError::from(other),
    })?;

    for rejected in &mut result.rejected {
        if let Some((_, id)) = unresolved.iter().find(|(index, _)| *index == rejected.index) {
            rejected.input = id.clone();
            rejected.reason = "no structure in ChEMBL".to_string();
        }
    }
    Ok(result)
}

#[derive(Debug, Serialize)]
struct ClusterPage<'a> {
    form: &'a ClusterForm,
    result: Option<&'a LigandClusterResult>,
    rows: Vec<&'a ClusteredLigand>,
    scatter_svg: String,
    error: Option<String>,
}

pub async fn clusters_page(State(state): State<SharedState>, theme: Theme) -> Result<Response, ApiError> {
    let ctx = RequestContext::new(Module::LigandClusters, theme);
    let form = ClusterForm::default();
    let page = ClusterPage { form: &form, result: None, rows: Vec::new(), scatter_svg: String::new(), error: None };
    render_page(&state, "clusters.html", &ctx, StatusCode::OK, page)
}

pub async fn clusters_submit(
    State(state): State<SharedState>,
    theme: Theme,
    Form(form): Form<ClusterForm>,
) -> Result<Response, ApiError> {
    let ctx = RequestContext::new(Module::LigandClusters, theme);
    match run_clusters(&state, &form).await {
        Ok(result) => {
            let page = ClusterPage {
                form: &form,
                result: Some(&result),
                rows: result.filtered(form.cluster),
                scatter_svg: cluster_scatter_svg(&result.ligands),
                error: None,
            };
            render_page(&state, "clusters.html", &ctx, StatusCode::OK, page)
        }
        Err(e) => {
            let page = ClusterPage {
                form: &form,
                result: None,
                rows: Vec::new(),
                scatter_svg: String::new(),
                error: Some(e.message),
            };
            render_page(&state, "clusters.html", &ctx, e.status, page)
        }
    }
}

/// POST /ligand-clusters/csv: the (optionally filtered) table as a download.
pub async fn clusters_csv(State(state): State<SharedState>, Form(form): Form<ClusterForm>) -> Result<Response, ApiError> {
    let result = run_clusters(&state, &form).await?;
    let csv = result.to_csv(form.cluster)?;
    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
        (header::CONTENT_DISPOSITION, "attachment; filename=\"ligand_clusters.csv\""),
    ];
    Ok((headers, csv).into_response())
}

/// POST /api/ligand-clusters
pub async fn api_clusters(
    State(state): State<SharedState>,
    Json(form): Json<ClusterForm>,
) -> Result<Json<Value>, ApiError> {
    let result = run_clusters(&state, &form).await?;
    let ligands = result.filtered(form.cluster);
    Ok(Json(json!({
        "status": "success",
        "cluster_count": result.cluster_count,
        "ligands": ligands,
        "rejected": result.rejected,
    })))
}
