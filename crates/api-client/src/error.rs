use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Failed to reach the catalog: {0}")]
    Network(#[from] reqwest::Error),

    #[error("The catalog returned status {status} for {url}")]
    UpstreamStatus { status: u16, url: String },

    #[error("Failed to deserialize the catalog response: {0}")]
    Decode(String),

    #[error("Product {0} does not exist in the catalog")]
    NotFound(i64),
}

impl ApiError {
    /// Whether repeating the same request could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Network(_) => true,
            ApiError::UpstreamStatus { status, .. } => *status >= 500,
            ApiError::Decode(_) | ApiError::NotFound(_) => false,
        }
    }
}
