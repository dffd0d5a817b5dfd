// Application layer - rendering use cases and the traits they depend on
pub mod chart_composer;
pub mod data_shaper;
pub mod errors;
pub mod renderer;
pub mod series_source;
