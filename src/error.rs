use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid page geometry: {0}")]
    Geometry(String),
    #[error("PDF encoding error: {0}")]
    Encoding(String),
    #[error("invalid request: {0}")]
    Request(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Body returned to the caller when no document could be produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub details: String,
}

impl Error {
    pub fn to_response(&self) -> ErrorResponse {
        let error = match self {
            Error::Geometry(_) => "Invalid page setup",
            Error::Encoding(_) => "Failed to generate PDF",
            Error::Request(_) => "Invalid proposal request",
            Error::Io(_) => "Failed to write PDF",
        };
        ErrorResponse {
            error: error.to_string(),
            details: self.to_string(),
        }
    }
}

/// Raised by a surface that cannot measure text in the requested style.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeasureError {
    #[error("font size {0} is not usable")]
    InvalidFontSize(f32),
    #[error("cannot measure text: {0}")]
    Unsupported(String),
}
