use crate::domain::model::{CarFeatures, PredictionResponse};
use crate::utils::error::{PricingError, Result};
use crate::utils::validation;
use reqwest::Client;
use std::time::Duration;

/// HTTP client for the prediction endpoint.
#[derive(Debug, Clone)]
pub struct PricingClient {
    client: Client,
    endpoint: String,
}

impl PricingClient {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        validation::validate_url("url", endpoint)?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn predict(&self, car: &CarFeatures) -> Result<PredictionResponse> {
        self.post(&self.endpoint, car).await
    }

    pub async fn predict_batch(&self, cars: &[CarFeatures]) -> Result<PredictionResponse> {
        let url = format!("{}/batch", self.endpoint);
        self.post(&url, cars).await
    }

    async fn post<T: serde::Serialize + ?Sized>(&self, url: &str, body: &T) -> Result<PredictionResponse> {
        tracing::debug!("POST {}", url);
        let response = self.client.post(url).json(body).send().await?;
        let status = response.status();
        tracing::debug!("API response status: {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PricingError::ServiceError {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}
