use thiserror::Error;

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("malformed match document: missing `{key}`")]
    MalformedInput { key: String },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("unsupported formation code `{0}`")]
    UnsupportedFormation(String),

    #[error("formation {formation} has no slot matching position `{position}`")]
    FormationMismatch { formation: String, position: String },

    #[error("invalid match timestamp `{0}`")]
    InvalidTimestamp(String),

    #[error("tracking name `{name}` matches several players: {candidates:?}")]
    AmbiguousPlayerMatch { name: String, candidates: Vec<String> },

    #[error("no player matches `{name}`")]
    NoPlayerMatch { name: String },

    #[error("unknown position id {0}")]
    UnknownPositionId(u32),

    #[error("missing column `{0}`")]
    MissingColumn(String),

    #[error("workload sample {index} is not finite")]
    NonFiniteWorkload { index: usize },

    #[error("need at least {needed} samples, got {got}")]
    NotEnoughSamples { needed: usize, got: usize },

    #[error("series has {series} samples but the clock has {clock}")]
    LengthMismatch { series: usize, clock: usize },

    #[error("player {0} is not in the lineup")]
    UnknownPlayer(u64),
}

impl PipelineError {
    pub fn missing(key: &str) -> Self {
        PipelineError::MalformedInput {
            key: key.to_string(),
        }
    }
}
