//! Error types for the ruxfont library

/// Library error type for ruxfont operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuxError {
    /// Unexpected chunk count, tag or form type in the SF2 layout
    #[error("structural error: {0}")]
    StructuralError(String),

    /// A read or a declared chunk size goes past the available bytes
    #[error("bounds error: {0}")]
    BoundsError(String),

    /// Record data inconsistent with its container (width, indices)
    #[error("format error: {0}")]
    FormatError(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl RuxError {
    pub(crate) fn structural(expected: &str, found: impl std::fmt::Display) -> Self {
        Self::StructuralError(format!("expected {expected}, found {found}"))
    }
}

impl From<nom::Err<nom::error::Error<&[u8]>>> for RuxError {
    fn from(error: nom::Err<nom::error::Error<&[u8]>>) -> Self {
        match error {
            nom::Err::Incomplete(needed) => Self::BoundsError(format!("incomplete input {needed:?}")),
            nom::Err::Error(e) | nom::Err::Failure(e) => Self::BoundsError(format!(
                "{:?} with {} bytes remaining",
                e.code,
                e.input.len()
            )),
        }
    }
}
