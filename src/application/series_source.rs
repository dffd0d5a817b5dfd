// Source trait for time series data
use crate::application::errors::FetchError;
use crate::domain::series::RawSeriesMap;
use async_trait::async_trait;
use std::time::Duration;

/// A single GET for every series of one chart.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub url: String,
    pub timeout: Option<Duration>,
}

#[async_trait]
pub trait SeriesSource: Send + Sync {
    /// Fetch all series named in the request URL. No retries.
    async fn fetch_series(&self, request: &FetchRequest) -> Result<RawSeriesMap, FetchError>;
}
