// TSAR HTTP series source
use crate::application::errors::FetchError;
use crate::application::series_source::{FetchRequest, SeriesSource};
use crate::domain::series::RawSeriesMap;
use async_trait::async_trait;

#[derive(Debug, Clone, Default)]
pub struct TsarSource {
    client: reqwest::Client,
}

impl TsarSource {
    pub fn new() -> Self {
        Self::default()
    }
}

fn transport_error(error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Transport(error)
    }
}

/// Decode a records response: series key -> `[[seconds, value|null], ...]`.
pub fn parse_series_response(body: &str) -> Result<RawSeriesMap, FetchError> {
    Ok(serde_json::from_str(body)?)
}

#[async_trait]
impl SeriesSource for TsarSource {
    async fn fetch_series(&self, request: &FetchRequest) -> Result<RawSeriesMap, FetchError> {
        let mut builder = self
            .client
            .get(&request.url)
            .header("Accept", "application/json");
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(transport_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await.map_err(transport_error)?;
        let series = parse_series_response(&body)?;
        tracing::debug!("Received {} series from {}", series.len(), request.url);

        Ok(series)
    }
}
