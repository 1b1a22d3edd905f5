#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("API returned {status}: {body}")]
    ApiError { status: u16, body: String },
    #[error("failed to parse response: {0}")]
    Parse(String),
    #[error("failed to encode tool arguments: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("stream ended before a finish event")]
    StreamAborted,
}
