// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod query_encoder;
pub mod svg_renderer;
pub mod tsar_source;
