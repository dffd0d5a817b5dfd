// Domain layer - chart, query, series and page models
pub mod chart;
pub mod document;
pub mod query;
pub mod series;
pub mod units;
