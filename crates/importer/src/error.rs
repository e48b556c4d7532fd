use api_client::error::ApiError;
use database::DbError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Failed to fetch from the catalog: {0}")]
    Source(#[from] ApiError),

    #[error("Failed to persist the product: {0}")]
    Persistence(#[from] DbError),
}
