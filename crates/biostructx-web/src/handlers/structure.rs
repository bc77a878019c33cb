//! Structure viewer: fetch or accept PDB text and summarise it.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use axum::{Form, Json};
use biostructx_molecules::structure::{annotation_lines, residue_count, secondary_structure, SecondaryStructureComposition};
use biostructx_sources::fasta::header_accession;
use biostructx_sources::structures::StructureClient;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::context::{Module, RequestContext, Theme};
use crate::error::ApiError;
use crate::handlers::render_page;
use crate::state::{AppState, SharedState};

pub const FASTA_WITHOUT_ACCESSION: &str =
    "FASTA input does not contain a UniProt ID header. Please upload a PDB model.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StructureInput {
    #[default]
    Uniprot,
    Pdb,
    Fasta,
    Upload,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StructureForm {
    #[serde(default)]
    pub kind: StructureInput,
    #[serde(default)]
    pub query: String,
    /// Uploaded PDB text.
    #[serde(default)]
    pub upload: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StructureView {
    pub source: String,
    pub pdb: String,
    pub secondary: SecondaryStructureComposition,
    pub annotations: Vec<String>,
}

impl StructureView {
    fn new(source: String, pdb: String) -> Self {
        Self { secondary: secondary_structure(&pdb), annotations: annotation_lines(&pdb), source, pdb }
    }
}

#[derive(Debug, Default, Serialize)]
pub struct StructureOutcome {
    pub structure: Option<StructureView>,
    pub warnings: Vec<String>,
}

async fn alphafold(state: &AppState, accession: &str) -> Result<StructureView, ApiError> {
    let accession = accession.trim().to_ascii_uppercase();
    let pdb = state
        .sources
        .structures
        .fetch_alphafold(&accession)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("No AlphaFold model found for {}.", accession)))?;
    let source = format!("AlphaFold model {}", StructureClient::alphafold_file_name(&accession));
    Ok(StructureView::new(source, pdb))
}

fn required<'a>(text: &'a str, what: &str) -> Result<&'a str, ApiError> {
    let text = text.trim();
    if text.is_empty() {
        Err(ApiError::invalid_input(format!("Please enter a {}.", what)))
    } else {
        Ok(text)
    }
}

pub async fn run_structure(state: &AppState, form: &StructureForm) -> Result<StructureOutcome, ApiError> {
    let view = match form.kind {
        StructureInput::Uniprot => alphafold(state, required(&form.query, "UniProt ID")?).await?,
        StructureInput::Pdb => {
            let id = required(&form.query, "PDB ID")?.to_ascii_uppercase();
            let pdb = state
                .sources
                .structures
                .fetch_pdb(&id)
                .await?
                .ok_or_else(|| ApiError::not_found(format!("PDB entry {} not found.", id)))?;
            StructureView::new(format!("RCSB PDB {}", id), pdb)
        }
        StructureInput::Fasta => {
            let Some(accession) = header_accession(required(&form.query, "FASTA sequence")?) else {
                return Ok(StructureOutcome { structure: None, warnings: vec![FASTA_WITHOUT_ACCESSION.to_string()] });
            };
            alphafold(state, &accession).await?
        }
        StructureInput::Upload => {
            let text = form.upload.as_deref().filter(|u| !u.trim().is_empty()).unwrap_or(&form.query);
            let text = required(text, "PDB file")?;
            if residue_count(text) == 0 {
                return Err(ApiError::invalid_input("The uploaded file contains no Cα ATOM records."));
            }
            StructureView::new("Uploaded model".to_string(), text.to_string())
        }
    };

    info!(
        source = %view.source,
        residues = view.secondary.residues,
        annotated = view.secondary.annotated,
        "Structure loaded"
    );
    Ok(StructureOutcome { structure: Some(view), warnings: Vec::new() })
}

#[derive(Debug, Serialize)]
struct StructurePage<'a> {
    kind: StructureInput,
    query: &'a str,
    upload: Option<&'a str>,
    #[serde(flatten)]
    outcome: StructureOutcome,
    error: Option<String>,
}

pub async fn structure_page(State(state): State<SharedState>, theme: Theme) -> Result<Response, ApiError> {
    let ctx = RequestContext::new(Module::Structure, theme);
    let page = StructurePage {
        kind: StructureInput::default(),
        query: "",
        upload: None,
        outcome: StructureOutcome::default(),
        error: None,
    };
    render_page(&state, "structure.html", &ctx, StatusCode::OK, page)
}

pub async fn structure_submit(
    State(state): State<SharedState>,
    theme: Theme,
    Form(form): Form<StructureForm>,
) -> Result<Response, ApiError> {
    let ctx = RequestContext::new(Module::Structure, theme);
    let (outcome, error, status) = match run_structure(&state, &form).await {
        Ok(o) => (o, None, StatusCode::OK),
        Err(e) => (StructureOutcome::default(), Some(e.message), e.status),
    };
    let page = StructurePage {
        kind: form.kind,
        query: &form.query,
        upload: form.upload.as_deref(),
        outcome,
        error,
    };
    render_page(&state, "structure.html", &ctx, status, page)
}

/// POST /api/structure
pub async fn api_structure(
    State(state): State<SharedState>,
    Json(form): Json<StructureForm>,
) -> Result<Json<Value>, ApiError> {
    let outcome = run_structure(&state, &form).await?;
    Ok(Json(json!({ "status": "success", "structure": outcome.structure, "warnings": outcome.warnings })))
}
