use biostructx_sources::SourceError;
use serde::Serialize;
use thiserror::Error;

/// Which input a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Ligand,
    Protein,
}

#[derive(Debug, Error)]
pub enum AffinityError {
    #[error("invalid ligand: {0}")]
    InvalidLigand(String),

    #[error("invalid protein: {0}")]
    InvalidProtein(String),

    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("{service} unavailable ({side:?} input): {message}")]
    UpstreamUnavailable { service: String, side: Side, message: String },
}

impl AffinityError {
    /// Stable machine-readable name, used in JSON error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            AffinityError::InvalidLigand(_) => "invalid_ligand",
            AffinityError::InvalidProtein(_) => "invalid_protein",
            AffinityError::ModelUnavailable(_) => "model_unavailable",
            AffinityError::UpstreamUnavailable { .. } => "upstream_unavailable",
        }
    }

    pub fn side(&self) -> Option<Side> {
        match self {
            AffinityError::InvalidLigand(_) => Some(Side::Ligand),
            AffinityError::InvalidProtein(_) => Some(Side::Protein),
            AffinityError::UpstreamUnavailable { side, .. } => Some(*side),
            AffinityError::ModelUnavailable(_) => None,
        }
    }

    pub(crate) fn upstream(service: &str, side: Side, err: impl std::fmt::Display) -> Self {
        AffinityError::UpstreamUnavailable {
            service: service.to_string(),
            side,
            message: err.to_string(),
        }
    }

    /// Maps a database client failure on one side of the request.
    pub(crate) fn from_source(service: &str, side: Side, err: SourceError) -> Self {
        match err {
            SourceError::Status { service, .. } => Self::upstream(service, side, &err),
            other => Self::upstream(service, side, other),
        }
    }
}

pub type Result<T> = std::result::Result<T, AffinityError>;
