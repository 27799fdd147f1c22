//! HTTP client for the stock API.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use storefront_cart::{Product, Stock};
use storefront_core::ProductId;

use super::{StockService, StockServiceError};
use crate::config::CartConfig;

/// Stock API client.
///
/// Endpoints: `GET {api_url}/stock/{id}` and `GET {api_url}/products/{id}`.
#[derive(Debug, Clone)]
pub struct HttpStockService {
    client: reqwest::Client,
    api_url: String,
    token: Option<String>,
}

impl HttpStockService {
    pub fn new(api_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn with_token(api_url: String, token: String) -> Self {
        Self {
            token: Some(token),
            ..Self::new(api_url)
        }
    }

    /// Build a client with the configured URL, token and request timeout.
    pub fn from_config(config: &CartConfig) -> Result<Self, StockServiceError> {
        let client = build_client(config.http_timeout)?;
        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            token: config.auth_token.clone(),
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    async fn fetch<T>(&self, resource: &str, id: ProductId) -> Result<T, StockServiceError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}/{}/{}", self.api_url, resource, id);
        tracing::debug!("GET {}", url);

        let mut req = self.client.get(&url);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| StockServiceError::Network(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(StockServiceError::NotFound(id));
        }
        if !status.is_success() {
            return Err(StockServiceError::Api(
                status.as_u16(),
                resp.text().await.unwrap_or_default(),
            ));
        }

        resp.json()
            .await
            .map_err(|e| StockServiceError::Parse(e.to_string()))
    }
}

#[async_trait]
impl StockService for HttpStockService {
    async fn get_stock(&self, id: ProductId) -> Result<Stock, StockServiceError> {
        self.fetch("stock", id).await
    }

    async fn get_product(&self, id: ProductId) -> Result<Product, StockServiceError> {
        self.fetch("products", id).await
    }
}

fn build_client(timeout: Duration) -> Result<reqwest::Client, StockServiceError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| StockServiceError::Network(e.to_string()))
}
