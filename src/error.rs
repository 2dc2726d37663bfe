use thiserror::Error;

/// Errors that abort a cut-path run.
///
/// Nothing is written when one of these is returned.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CutpathError {
    #[error("invalid image: {0}")]
    InvalidImage(String),

    #[error("failed to encode reference image: {0}")]
    Encode(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
