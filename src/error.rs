//! Error handling for daw-shell
//!
//! Every error carries a stable code and, where one exists, a short
//! suggestion the chrome can show next to the failed control.

use thiserror::Error;

/// Result type alias for daw-shell operations
pub type Result<T> = std::result::Result<T, StudioError>;

/// Main error type for daw-shell operations
#[derive(Error, Debug)]
pub enum StudioError {
    // Project Errors
    #[error("Track not found: {id}")]
    TrackNotFound { id: u64 },

    #[error("Region not found: {id}")]
    RegionNotFound { id: String },

    #[error("No region is selected")]
    NoSelection,

    // AI Assist Errors
    #[error("API key missing: set API_KEY or GEMINI_API_KEY")]
    MissingCredential,

    #[error("AI request failed: {reason}")]
    AiRequest { reason: String },

    #[error("AI response could not be used: {reason}")]
    AiResponse { reason: String },

    // Chrome Errors
    #[error("{feature} is not available yet")]
    Unsupported { feature: String },

    #[error("Storage error: {reason}")]
    Storage { reason: String },

    #[error("Invalid configuration: {reason}")]
    Config { reason: String },

    #[error("Script error on line {line}: {reason}")]
    Script { line: usize, reason: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StudioError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            StudioError::TrackNotFound { .. } => "TRACK_NOT_FOUND",
            StudioError::RegionNotFound { .. } => "REGION_NOT_FOUND",
            StudioError::NoSelection => "NO_SELECTION",
            StudioError::MissingCredential => "MISSING_CREDENTIAL",
            StudioError::AiRequest { .. } => "AI_REQUEST_FAILED",
            StudioError::AiResponse { .. } => "AI_RESPONSE_INVALID",
            StudioError::Unsupported { .. } => "UNSUPPORTED",
            StudioError::Storage { .. } => "STORAGE_ERROR",
            StudioError::Config { .. } => "CONFIG_ERROR",
            StudioError::Script { .. } => "SCRIPT_ERROR",
            StudioError::Io(_) => "IO_ERROR",
            StudioError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check if this error is recoverable without user intervention
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            StudioError::AiRequest { .. }
                | StudioError::AiResponse { .. }
                | StudioError::NoSelection
        )
    }

    /// Get a short recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            StudioError::MissingCredential => {
                Some("Export API_KEY with a valid key and restart the studio.")
            }
            StudioError::AiRequest { .. } => Some("Check your connection and try again."),
            StudioError::AiResponse { .. } => Some("Try again; the model returned unusable output."),
            StudioError::NoSelection => Some("Click a region on the timeline first."),
            StudioError::Storage { .. } => Some("Clear saved data and save the project again."),
            _ => None,
        }
    }
}
