// Error types for chart rendering
use crate::domain::chart::ConfigError;
use crate::domain::document::DocumentError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to TSAR service failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("request to TSAR service timed out")]
    Timeout,
    #[error("TSAR service returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("could not parse TSAR response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Error, PartialEq)]
pub enum DataShapeError {
    #[error("response contains series {0} that was never requested")]
    UnknownSeries(String),
    #[error("response contains series {0} more than once")]
    DuplicateSeries(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum RenderError {
    #[error("drawing failed: {0}")]
    Draw(String),
}

#[derive(Debug, Error)]
pub enum ChartError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    DataShape(#[from] DataShapeError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error("container {0} was removed from the document before rendering")]
    Detached(String),
}
