use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// The drawing library refused an operation (font registration, save).
    #[error("pdf error: {0}")]
    Pdf(String),

    #[error("invalid document data: {0}")]
    InvalidData(String),

    #[error("io error: {0}")]
    Io(String),
}
