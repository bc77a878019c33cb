//! Home page: module cards and a quote.

use axum::extract::State;
use axum::response::Html;
use axum::Json;
use rand::seq::SliceRandom;
use serde::Serialize;
use serde_json::{json, Value};

use crate::context::{Module, RequestContext, Theme};
use crate::error::ApiError;
use crate::state::SharedState;

pub const QUOTES: [&str; 11] = [
    "Running GROMACS: because molecules won't shake themselves.",
    "You say debugging, I say 'experimental feature'.",
    "My protein folds better than my laundry.",
    "Yes, I'm in a relationship... with my FASTA file.",
    "If it compiles, it's biology. If it runs, it's bioinformatics.",
    "Don't blame me, blame the alignment algorithm.",
    "SNP happens.",
    "I speak fluent Python, but only in 3-letter codes.",
    "Bioinformatics: where your errors have 1000 base pairs.",
    "No bugs here — just undocumented features in your genome.",
    "PCR? Pretty Cool Research!",
];

pub fn random_quote() -> &'static str {
    QUOTES.choose(&mut rand::thread_rng()).copied().unwrap_or(QUOTES[0])
}

#[derive(Serialize)]
struct HomePage {
    quote: &'static str,
}

pub async fn home_page(State(state): State<SharedState>, theme: Theme) -> Result<Html<String>, ApiError> {
    let ctx = RequestContext::new(Module::Home, theme);
    state.templates.render("home.html", &ctx, HomePage { quote: random_quote() })
}

/// GET /api/modules
pub async fn api_modules() -> Json<Value> {
    let modules: Vec<_> = Module::TOOLS.iter().map(|m| m.card()).collect();
    Json(json!({ "status": "success", "modules": modules, "quote": random_quote() }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_comes_from_list() {
        for _ in 0..20 {
            assert!(QUOTES.contains(&random_quote()));
        }
    }
}
