//! Protein characterization: physicochemical profile and GO terms.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use axum::{Form, Json};
use biostructx_molecules::protein::{profile, ProteinProfile};
use biostructx_sources::fasta::{clean_sequence, header_accession};
use biostructx_sources::quickgo::GoTerm;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::context::{Module, RequestContext, Theme};
use crate::error::ApiError;
use crate::handlers::render_page;
use crate::state::{AppState, SharedState};

pub const NON_ALPHABETIC_WARNING: &str = "Sequence must contain only alphabetic characters (amino acids).";
const MAX_GO_TERMS: usize = 15;
const TOP_RESIDUES: usize = 10;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProteinForm {
    #[serde(default)]
    pub sequence: String,
    /// Accession for the GO lookup; falls back to the FASTA header.
    #[serde(default)]
    pub uniprot_id: String,
}

#[derive(Debug, Serialize)]
pub struct ResidueRow {
    residue: char,
    count: usize,
    percent: String,
}

/// Profile values formatted for display.
#[derive(Debug, Serialize)]
pub struct ProfileView {
    length: usize,
    molecular_weight: String,
    aromaticity: String,
    instability_index: String,
    isoelectric_point: String,
    gravy: String,
    extinction_reduced: u64,
    extinction_cystines: u64,
    composition: Vec<ResidueRow>,
}

impl From<&ProteinProfile> for ProfileView {
    fn from(p: &ProteinProfile) -> Self {
        let d = &p.descriptor;
        Self {
            length: p.length,
            molecular_weight: format!("{:.2}", d.molecular_weight),
            aromaticity: format!("{:.3}", d.aromaticity),
            instability_index: format!("{:.2}", d.instability_index),
            isoelectric_point: format!("{:.2}", d.isoelectric_point),
            gravy: format!("{:.3}", d.gravy),
            extinction_reduced: p.extinction.reduced,
            extinction_cystines: p.extinction.cystines,
            composition: p
                .top_composition(TOP_RESIDUES)
                .into_iter()
                .map(|r| ResidueRow { residue: r.residue, count: r.count, percent: format!("{:.2}", r.percent) })
                .collect(),
        }
    }
}

#[derive(Debug, Default, Serialize)]
pub struct ProteinAnalysis {
    pub profile: Option<ProfileView>,
    pub accession: Option<String>,
    pub go_terms: Vec<GoTerm>,
    pub warnings: Vec<String>,
}

fn lookup_accession(form: &ProteinForm) -> Option<String> {
    let explicit = form.uniprot_id.trim();
    if explicit.is_empty() {
        header_accession(&form.sequence)
    } else {
        Some(explicit.to_ascii_uppercase())
    }
}

/// Profiles the sequence and resolves GO terms. Validation problems and GO
/// lookup failures are reported as warnings; only an empty input fails.
pub async fn run_protein(state: &AppState, form: &ProteinForm) -> Result<ProteinAnalysis, ApiError> {
    let sequence = clean_sequence(&form.sequence);
    if sequence.is_empty() {
        return Err(ApiError::invalid_input("Please enter a protein sequence."));
    }

    let mut analysis = ProteinAnalysis::default();
    if !sequence.chars().all(|c| c.is_ascii_alphabetic()) {
        analysis.warnings.push(NON_ALPHABETIC_WARNING.to_string());
    } else {
        match profile(&sequence) {
            Ok(p) => analysis.profile = Some(ProfileView::from(&p)),
            Err(e) => analysis.warnings.push(e.to_string()),
        }
    }

    if let Some(accession) = lookup_accession(form) {
        match state.sources.uniprot.fetch_entry(&accession).await {
            Ok(Some(entry)) if entry.go_ids.is_empty() => {
                analysis.warnings.push(format!("No GO terms found for {}.", accession));
            }
            Ok(Some(entry)) => {
                let ids: Vec<String> = entry.go_ids.into_iter().take(MAX_GO_TERMS).collect();
                analysis.go_terms = state.sources.quickgo.term_names(&ids).await;
            }
            Ok(None) => analysis.warnings.push(format!("UniProt entry {} not found.", accession)),
            Err(e) => {
                warn!(accession = %accession, error = %e, "GO lookup failed");
                analysis.warnings.push(format!("GO lookup failed: {}", e));
            }
        }
        analysis.accession = Some(accession);
    }

    info!(
        length = sequence.len(),
        go_terms = analysis.go_terms.len(),
        warnings = analysis.warnings.len(),
        "Protein characterized"
    );
    Ok(analysis)
}

#[derive(Debug, Serialize)]
struct ProteinPage<'a> {
    sequence: &'a str,
    uniprot_id: &'a str,
    #[serde(flatten)]
    analysis: Option<ProteinAnalysis>,
    error: Option<String>,
}

pub async fn protein_page(State(state): State<SharedState>, theme: Theme) -> Result<Response, ApiError> {
    let ctx = RequestContext::new(Module::Protein, theme);
    let page = ProteinPage { sequence: "", uniprot_id: "", analysis: None, error: None };
    render_page(&state, "protein.html", &ctx, StatusCode::OK, page)
}

pub async fn protein_submit(
    State(state): State<SharedState>,
    theme: Theme,
    Form(form): Form<ProteinForm>,
) -> Result<Response, ApiError> {
    let ctx = RequestContext::new(Module::Protein, theme);
    let (analysis, error, status) = match run_protein(&state, &form).await {
        Ok(a) => (Some(a), None, StatusCode::OK),
        Err(e) => (None, Some(e.message), e.status),
    };
    let page = ProteinPage { sequence: &form.sequence, uniprot_id: &form.uniprot_id, analysis, error };
    render_page(&state, "protein.html", &ctx, status, page)
}

/// POST /api/protein
pub async fn api_protein(
    State(state): State<SharedState>,
    Json(form): Json<ProteinForm>,
) -> Result<Json<Value>, ApiError> {
    let analysis = run_protein(&state, &form).await?;
    Ok(Json(json!({ "status": "success", "analysis": analysis })))
}
