use crate::landmark::LandmarkKey;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanningError {
    #[error("landmark not found: {0}")]
    NotFound(LandmarkKey),
    #[error("missing required landmark: {key}")]
    MissingLandmark { key: LandmarkKey },
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),
    #[error("planning pipeline has not been initialized; run the full pipeline first")]
    PipelineNotInitialized,
    #[error("invalid offset: {0}")]
    InvalidOffset(String),
    #[error("unknown landmark key: {0:?}")]
    UnknownLandmark(String),
}

impl PlanningError {
    pub fn degenerate(what: impl Into<String>) -> Self {
        Self::DegenerateGeometry(what.into())
    }
}

pub type Result<T> = std::result::Result<T, PlanningError>;
