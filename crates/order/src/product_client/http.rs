use crate::abstract_trait::product_client::ProductClientTrait;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use shared::{
    domain::responses::{ApiResponse, ProductResponse},
    errors::ServiceError,
};
use std::time::Duration;
use tracing::{debug, error, warn};

#[derive(Clone)]
pub struct ProductHttpClient {
    client: Client,
    base_url: String,
}

impl ProductHttpClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::Internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ProductClientTrait for ProductHttpClient {
    async fn find_by_id(&self, id: i64) -> Result<ProductResponse, ServiceError> {
        let url = format!("{}/api/products/{id}", self.base_url);
        debug!(%url, "Looking up product");

        let response = self.client.get(&url).send().await.map_err(|e| {
            error!(product_id = id, "❌ Product lookup failed: {e}");
            ServiceError::DependencyUnavailable(format!("product service: {e}"))
        })?;

        let status = response.status();

        if status.is_server_error() {
            warn!(product_id = id, %status, "Product service returned a server error");
            return Err(ServiceError::DependencyUnavailable(format!(
                "product service answered {status}"
            )));
        }

        if !status.is_success() {
            let reason = if status == StatusCode::NOT_FOUND {
                format!("Product with id {id} not found")
            } else {
                format!("Product lookup for id {id} rejected with {status}")
            };
            return Err(ServiceError::NotFound(reason));
        }

        let body: ApiResponse<Option<ProductResponse>> = response.json().await.map_err(|e| {
            error!(product_id = id, "❌ Malformed product response: {e}");
            ServiceError::NotFound(format!("Product with id {id} returned no usable data"))
        })?;

        body.data
            .ok_or_else(|| ServiceError::NotFound(format!("Product with id {id} not found")))
    }
}
