//! Common result and error types for the Tessera mapper.

/// The standard result type for fallible internal operations.
///
/// `Ok` carries the stage outcome, which may itself describe a failure the
/// user has to act on (an infeasible mapping, a cyclic DFG). Those are
/// reported through a `DiagnosticSink`. `Err` means the mapper broke one of
/// its own invariants, for example a found assignment that fails validation.
pub type TesseraResult<T> = Result<T, InternalError>;

/// An internal error indicating a bug in the mapper, not a problem with the
/// input graphs or configuration.
#[derive(Debug, thiserror::Error)]
#[error("internal mapper error: {message}")]
pub struct InternalError {
    /// Description of the violated invariant.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}
