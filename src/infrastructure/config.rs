use crate::domain::chart::ChartOptions;
use serde::Deserialize;

const DEFAULT_OUTPUT_DIR: &str = "charts";

#[derive(Debug, Deserialize, Clone)]
pub struct ChartsConfig {
    /// Service used by charts that do not name their own.
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default)]
    pub charts: Vec<ChartDefinition>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChartDefinition {
    /// Root container id the chart's panes are created under.
    pub container: String,
    #[serde(flatten)]
    pub options: ChartOptions,
}

fn default_output_dir() -> String {
    DEFAULT_OUTPUT_DIR.to_string()
}

impl ChartsConfig {
    /// Chart definitions with the shared service filled in.
    pub fn resolved_charts(&self) -> Vec<ChartDefinition> {
        self.charts
            .iter()
            .cloned()
            .map(|mut chart| {
                if chart.options.service.trim().is_empty() {
                    if let Some(service) = &self.service {
                        chart.options.service = service.clone();
                    }
                }
                chart
            })
            .collect()
    }
}

/// Load `config/charts` (toml, yaml or json) with `TSAR__`-prefixed overrides.
pub fn load_charts_config() -> anyhow::Result<ChartsConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/charts"))
        .add_source(
            config::Environment::with_prefix("TSAR")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

pub fn parse_charts_config(toml: &str) -> anyhow::Result<ChartsConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::from_str(toml, config::FileFormat::Toml))
        .build()?;

    Ok(settings.try_deserialize()?)
}
