// O3as data service repository implementation
use crate::application::ozone_repository::OzoneRepository;
use crate::domain::plot::{PlotRequest, RawModelSeries};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;

#[derive(Debug, Clone)]
pub struct O3asRepository {
    base_url: String,
    client: reqwest::Client,
}

impl O3asRepository {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn build_plot_url(&self, request: &PlotRequest) -> String {
        let params = [
            ("begin", request.start_year.to_string()),
            ("end", request.end_year.to_string()),
            ("month", request.months_joined()),
            ("lat_min", request.lat_min.to_string()),
            ("lat_max", request.lat_max.to_string()),
            ("ref_meas", request.ref_model.clone()),
            ("ref_year", request.ref_year.to_string()),
        ];
        let query = params
            .iter()
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&");

        format!(
            "{}/plots/{}?{}",
            self.base_url,
            urlencoding::encode(request.plot_type.tag()),
            query
        )
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Data service request failed with status {}: {}", status, body);
        }

        response
            .json::<T>()
            .await
            .context("Failed to parse data service response")
    }

    async fn get_list(&self, path: &str) -> Result<Vec<String>> {
        let url = format!("{}/{}", self.base_url, path);
        tracing::debug!("Requesting {}", url);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", url))?;

        Self::read_json(response).await
    }
}

#[async_trait]
impl OzoneRepository for O3asRepository {
    async fn get_models(&self) -> Result<Vec<String>> {
        self.get_list("models").await
    }

    async fn get_plot_types(&self) -> Result<Vec<String>> {
        self.get_list("plots").await
    }

    async fn get_plot_data(&self, request: &PlotRequest) -> Result<Vec<RawModelSeries>> {
        let url = self.build_plot_url(request);
        tracing::debug!("Requesting plot data from {}", url);

        let response = self
            .client
            .post(&url)
            .header("Accept", "application/json")
            .json(&request.model_list)
            .send()
            .await
            .context("Failed to send plot data request")?;

        let series: Vec<RawModelSeries> = Self::read_json(response).await?;
        tracing::debug!("Received {} series for {}", series.len(), request.plot_type);
        Ok(series)
    }
}
