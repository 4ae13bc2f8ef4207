use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("routing response is not a JSON object: {0}")]
    InvalidResponse(#[from] serde_json::Error),
    #[error("route provider failed: {0}")]
    Provider(#[source] Box<dyn std::error::Error + Send + Sync>),
}
