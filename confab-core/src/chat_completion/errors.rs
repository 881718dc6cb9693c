use thiserror::Error;

pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Failures when completing with a language model provider.
///
/// Transient errors are worth retrying by the caller, permanent ones are not.
/// No retry policy is implemented here.
#[derive(Error, Debug)]
pub enum LanguageModelError {
    #[error("Context length exceeded: {0}")]
    ContextLengthExceeded(#[source] BoxedError),

    #[error("Permanent error: {0}")]
    PermanentError(#[source] BoxedError),

    #[error("Transient error: {0}")]
    TransientError(#[source] BoxedError),
}

impl LanguageModelError {
    pub fn permanent(e: impl Into<BoxedError>) -> Self {
        LanguageModelError::PermanentError(e.into())
    }

    pub fn transient(e: impl Into<BoxedError>) -> Self {
        LanguageModelError::TransientError(e.into())
    }

    pub fn context_length_exceeded(e: impl Into<BoxedError>) -> Self {
        LanguageModelError::ContextLengthExceeded(e.into())
    }
}

impl From<anyhow::Error> for LanguageModelError {
    fn from(e: anyhow::Error) -> Self {
        LanguageModelError::PermanentError(e.into())
    }
}
