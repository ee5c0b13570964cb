//! Distractor task error types.
//!
//! Defined as a typed enum so callers holding an `anyhow::Error` can
//! downcast and tell configuration mistakes apart from generation failures.

use thiserror::Error;

/// Errors raised while preparing or running a distraction period.
#[derive(Debug, Error)]
pub enum DistractError {
    /// Random generation could not produce an admissible value within its
    /// attempt cap.
    #[error("generation failed after {attempts} attempts: {reason}")]
    GenerationFailure { attempts: u32, reason: String },

    /// The supplied configuration is inconsistent.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A problem's terms and operators do not line up.
    #[error("invalid problem: {0}")]
    InvalidProblem(String),

    /// Typed or vocal answer entry was requested.
    #[error("response mode '{0}' is not supported; only true/false responses can be scored")]
    UnsupportedResponseMode(String),
}

impl DistractError {
    /// Returns `true` if the error comes from the configuration rather than
    /// from random generation or a collaborator.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            DistractError::Configuration(_) | DistractError::UnsupportedResponseMode(_)
        )
    }
}
