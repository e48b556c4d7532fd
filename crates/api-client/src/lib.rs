use crate::error::ApiError;
use async_trait::async_trait;
use configuration::SourceConfig;
use core_types::ExternalProduct;
use reqwest::StatusCode;

pub mod error;
pub mod retry;

// --- Public API ---
pub use retry::RetryingSource;

/// The abstract interface for a remote product catalog.
/// The importer only ever talks to this trait, so the HTTP implementation can
/// be wrapped (retries) or swapped out (tests) freely.
#[async_trait]
pub trait ProductSource: Send + Sync {
    /// Fetches the full catalog listing in a single request.
    async fn fetch_all(&self) -> Result<Vec<ExternalProduct>, ApiError>;

    /// Fetches a single product by its catalog id.
    async fn fetch_one(&self, id: i64) -> Result<ExternalProduct, ApiError>;
}

/// A concrete implementation of `ProductSource` over plain HTTP GET + JSON.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: reqwest::Client,
    base_url: String,
}

impl CatalogClient {
    pub fn new(config: &SourceConfig) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Builds a client with default HTTP settings against `base_url`.
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn _get(&self, url: &str) -> Result<(StatusCode, String), ApiError> {
        tracing::debug!(url, "Requesting catalog.");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let text = response.text().await?;
        Ok((status, text))
    }
}

#[async_trait]
impl ProductSource for CatalogClient {
    async fn fetch_all(&self) -> Result<Vec<ExternalProduct>, ApiError> {
        let url = format!("{}/products", self.base_url);
        let (status, text) = self._get(&url).await?;

        if !status.is_success() {
            return Err(ApiError::UpstreamStatus {
                status: status.as_u16(),
                url,
            });
        }

        serde_json::from_str::<Vec<ExternalProduct>>(&text)
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn fetch_one(&self, id: i64) -> Result<ExternalProduct, ApiError> {
        let url = format!("{}/products/{}", self.base_url, id);
        let (status, text) = self._get(&url).await?;

        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(id));
        }
        if !status.is_success() {
            return Err(ApiError::UpstreamStatus {
                status: status.as_u16(),
                url,
            });
        }

        // The public catalog answers unknown ids with 200 and an empty body.
        let body = text.trim();
        if body.is_empty() || body == "null" {
            return Err(ApiError::NotFound(id));
        }

        serde_json::from_str::<ExternalProduct>(body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    const LISTING: &str = r#"[
        {"id": 1, "title": "A", "price": 9.5, "description": "first", "category": "misc", "image": "https://img/1.png"},
        {"id": 2, "title": "B", "price": 3.33, "description": "second", "category": "misc", "image": ""}
    ]"#;

    #[tokio::test]
    async fn fetch_all_decodes_listing() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/products")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(LISTING)
            .create_async()
            .await;

        let client = CatalogClient::with_base_url(&server.url());
        let products = client.fetch_all().await.expect("listing should decode");

        mock.assert_async().await;
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].id, 1);
        assert_eq!(products[0].price, 9.5);
        assert_eq!(products[1].title, "B");
        assert_eq!(products[1].image, "");
    }

    #[tokio::test]
    async fn fetch_all_accepts_null_image() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/products")
            .with_status(200)
            .with_body(
                r#"[
                    {"id": 1, "title": "A", "price": 9.5, "description": "", "category": "misc", "image": null},
                    {"id": 2, "title": "B", "price": 3.33, "description": "", "category": "misc", "image": "https://img/2.png"}
                ]"#,
            )
            .create_async()
            .await;

        let client = CatalogClient::with_base_url(&server.url());
        let products = client.fetch_all().await.expect("null image should not fail the listing");

        assert_eq!(products.len(), 2);
        assert_eq!(products[0].image, "");
        assert_eq!(products[1].image, "https://img/2.png");
    }

    #[tokio::test]
    async fn fetch_all_reports_non_success_status() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/products")
            .with_status(503)
            .create_async()
            .await;

        let client = CatalogClient::with_base_url(&server.url());
        let err = client.fetch_all().await.unwrap_err();

        assert!(matches!(err, ApiError::UpstreamStatus { status: 503, .. }));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn fetch_all_rejects_malformed_body() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/products")
            .with_status(200)
            .with_body(r#"{"not": "an array"}"#)
            .create_async()
            .await;

        let client = CatalogClient::with_base_url(&server.url());
        let err = client.fetch_all().await.unwrap_err();

        assert!(matches!(err, ApiError::Decode(_)));
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn fetch_one_decodes_single_product() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/products/7")
            .with_status(200)
            .with_body(
                r#"{"id": 7, "title": "Ring", "price": 47.999, "description": "gold", "category": "jewelery", "image": "https://img/7.png"}"#,
            )
            .create_async()
            .await;

        let client = CatalogClient::with_base_url(&format!("{}/", server.url()));
        let product = client.fetch_one(7).await.unwrap();

        assert_eq!(product.id, 7);
        assert_eq!(product.category, "jewelery");
    }

    #[tokio::test]
    async fn fetch_one_maps_404_to_not_found() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/products/99")
            .with_status(404)
            .create_async()
            .await;

        let client = CatalogClient::with_base_url(&server.url());
        let err = client.fetch_one(99).await.unwrap_err();

        assert!(matches!(err, ApiError::NotFound(99)));
    }

    #[tokio::test]
    async fn fetch_one_treats_empty_body_as_not_found() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/products/500")
            .with_status(200)
            .with_body("")
            .create_async()
            .await;

        let client = CatalogClient::with_base_url(&server.url());
        let err = client.fetch_one(500).await.unwrap_err();

        assert!(matches!(err, ApiError::NotFound(500)));
    }

    #[tokio::test]
    async fn unreachable_catalog_is_a_network_error() {
        let client = CatalogClient::with_base_url("http://127.0.0.1:1");
        let err = client.fetch_all().await.unwrap_err();

        assert!(matches!(err, ApiError::Network(_)));
    }
}
