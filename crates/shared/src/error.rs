use thiserror::Error;

/// Every failure a client operation can surface. Remote-call failures are
/// converted into one of these at the orchestrator/cache boundary; raw
/// transport errors never reach the filter engine.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// Network or protocol failure reaching the ledger service. Retryable.
    #[error("transport failure: {0}")]
    Transport(String),

    /// Malformed user input, caught before any remote call is made.
    #[error("invalid input: {0}")]
    Input(String),

    /// The ledger explicitly rejected the operation; the reason is surfaced
    /// verbatim to the user.
    #[error("ledger rejected the request: {0}")]
    Application(String),

    /// The reply shape matched no known success or error form.
    #[error("unexpected ledger response: {0}")]
    UnexpectedResponse(String),

    /// Identity resolution failed. The owned-by-me filter degrades to match
    /// nothing; everything else keeps working.
    #[error("identity resolution failed: {0}")]
    Identity(String),
}

impl ClientError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, ClientError::Transport(_))
    }
}
