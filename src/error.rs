use thiserror::Error;

#[derive(Debug, Error)]
pub enum SurveyError {
    /// Malformed check-in input. The call must not be retried without
    /// correcting the input.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// One check-in per subject per calendar day. Raised by the store,
    /// surfaced to the user as a rejection.
    #[error("a check-in has already been recorded for this subject today")]
    DuplicateSubmission,
}
