//! Per-request context handed explicitly to every page.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("dark") { Theme::Dark } else { Theme::Light }
    }

    /// Reads `theme=` from a raw query string.
    pub fn from_query(query: Option<&str>) -> Self {
        query
            .into_iter()
            .flat_map(|q| q.split('&'))
            .filter_map(|pair| pair.split_once('='))
            .find(|(k, _)| *k == "theme")
            .map(|(_, v)| Theme::parse(v))
            .unwrap_or_default()
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Theme {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Theme::from_query(parts.uri.query()))
    }
}

/// Dashboard modules, in home-page card order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Module {
    Home,
    About,
    Affinity,
    DrugGene,
    Evolution,
    LigandClusters,
    Protein,
    Chat,
    Structure,
    UniProt,
    PubChem,
    Chembl,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModuleCard {
    pub id: Module,
    pub name: &'static str,
    pub description: &'static str,
    pub path: &'static str,
}

impl Module {
    pub const TOOLS: [Module; 10] = [
        Module::Affinity,
        Module::DrugGene,
        Module::Evolution,
        Module::LigandClusters,
        Module::Protein,
        Module::Chat,
        Module::Structure,
        Module::UniProt,
        Module::PubChem,
        Module::Chembl,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Module::Home => "Home",
            Module::About => "About BioStructX",
            Module::Affinity => "Binding Affinity Predictor",
            Module::DrugGene => "Drug–Gene Mapper",
            Module::Evolution => "Evolutionary Divergence Visualizer",
            Module::LigandClusters => "Ligand Similarity Clustering",
            Module::Protein => "Protein Characterization",
            Module::Chat => "Protein Chat Assistant",
            Module::Structure => "Protein Structure Viewer",
            Module::UniProt => "UniProt Browser",
            Module::PubChem => "PubChem Browser",
            Module::Chembl => "ChEMBL Browser",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Module::Home => "Structural intelligence platform.",
            Module::About => "What BioStructX is and where it is going.",
            Module::Affinity => "Predict binding affinity using ML models.",
            Module::DrugGene => "Map drug-gene interactions from public data.",
            Module::Evolution => "Analyze divergence & conservation.",
            Module::LigandClusters => "Cluster similar ligands with PCA.",
            Module::Protein => "Analyze properties & GO terms.",
            Module::Chat => "AI assistant for protein queries.",
            Module::Structure => "Explore protein structures in 3D.",
            Module::UniProt => "Search UniProt proteins and get metadata.",
            Module::PubChem => "Search small molecules by name or CID.",
            Module::Chembl => "Browse ChEMBL drugs and targets.",
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Module::Home => "/",
            Module::About => "/about",
            Module::Affinity => "/affinity",
            Module::DrugGene => "/drug-gene",
            Module::Evolution => "/evolution",
            Module::LigandClusters => "/ligand-clusters",
            Module::Protein => "/protein",
            Module::Chat => "/chat",
            Module::Structure => "/structure",
            Module::UniProt => "/browse/uniprot",
            Module::PubChem => "/browse/pubchem",
            Module::Chembl => "/browse/chembl",
        }
    }

    pub fn card(self) -> ModuleCard {
        ModuleCard { id: self, name: self.name(), description: self.description(), path: self.path() }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestContext {
    pub request_id: Uuid,
    pub module: Module,
    pub title: &'static str,
    pub path: &'static str,
    pub theme: Theme,
    /// Theme the toggle link switches to.
    pub other_theme: Theme,
}

impl RequestContext {
    pub fn new(module: Module, theme: Theme) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            module,
            title: module.name(),
            path: module.path(),
            theme,
            other_theme: theme.toggled(),
        }
    }
}
