use thiserror::Error;

pub type Result<T> = std::result::Result<T, RenderError>;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("unknown built-in template: {name} (use --list-templates to see available templates)")]
    UnknownTemplate { name: String },

    #[error("failed to serialize JSON output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to format output: {0}")]
    Format(#[from] std::fmt::Error),
}

/// Marker problems found while splicing rendered output into a file.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum InjectError {
    #[error("marker not found: {marker}")]
    MissingMarker { marker: String },

    #[error("end marker appears before begin marker: {marker}")]
    EndBeforeBegin { marker: String },
}
