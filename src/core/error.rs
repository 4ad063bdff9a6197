//! Cuenote Error Definitions
//!
//! Defines error types used throughout the export pipeline.

use thiserror::Error;

/// Export pipeline error types
#[derive(Error, Debug)]
pub enum ExportError {
    // =========================================================================
    // Retrieval Errors
    // =========================================================================
    #[error("Source not found: {0}")]
    SourceNotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Unsupported source: {0}")]
    UnsupportedSource(String),

    #[error("Network error: {0}")]
    Network(String),

    // =========================================================================
    // Container Errors
    // =========================================================================
    #[error("Container parse error: {0}")]
    ContainerParse(String),

    // =========================================================================
    // External Tool Errors
    // =========================================================================
    #[error("FFmpeg not found. Please install FFmpeg or add it to PATH.")]
    ToolNotFound,

    #[error("Transcode failed: {0}")]
    Transcode(String),

    #[error("Mix failed: {0}")]
    Mix(String),

    #[error("Probe failed: {0}")]
    Probe(String),

    // =========================================================================
    // General Errors
    // =========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Export pipeline result type
///
/// Per-clip voice-track failures are handled at the clip boundary and
/// never surface as an `ExportError`; every variant here is fatal to
/// the request that produced it.
pub type ExportResult<T> = Result<T, ExportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_carries_context() {
        let err = ExportError::ContainerParse("no data chunk".to_string());
        assert!(err.to_string().contains("no data chunk"));

        let err = ExportError::Transcode("exit code 1".to_string());
        assert!(err.to_string().contains("exit code 1"));
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: ExportError = io.into();
        assert!(matches!(err, ExportError::Io(_)));
    }
}
