// Chart configuration domain model
use super::query::Query;
use super::series::TimeRange;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("no service URL configured")]
    MissingService,
    #[error("chart has no queries")]
    EmptyQueries,
    #[error("series {0} is requested more than once")]
    DuplicateSeries(String),
    #[error("container {0} does not exist")]
    UnknownContainer(String),
}

/// Which of a chart's panes an element or event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaneKind {
    Plot,
    Overview,
    Legend,
}

impl PaneKind {
    pub fn name(&self) -> &'static str {
        match self {
            PaneKind::Plot => "plot",
            PaneKind::Overview => "overview",
            PaneKind::Legend => "legend",
        }
    }

    pub fn class(&self) -> String {
        format!("tsar-{}", self.name())
    }

    /// Id of the pane element created inside root container `root_id`.
    pub fn element_id(&self, root_id: &str) -> String {
        format!("tsar-{}-{}", self.name(), root_id)
    }

    pub fn default_size(&self) -> (u32, u32) {
        match self {
            PaneKind::Plot => (800, 300),
            PaneKind::Overview => (800, 100),
            PaneKind::Legend => (200, 120),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct PaneOptions {
    pub show: bool,
    /// Existing element to draw into instead of creating one.
    pub container: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl Default for PaneOptions {
    fn default() -> Self {
        Self {
            show: true,
            container: None,
            width: None,
            height: None,
        }
    }
}

impl PaneOptions {
    pub fn size(&self, kind: PaneKind) -> (u32, u32) {
        let (width, height) = kind.default_size();
        (self.width.unwrap_or(width), self.height.unwrap_or(height))
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct AxisOptions {
    pub units: Option<String>,
    pub tick_decimals: Option<usize>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub show_ticks: bool,
    /// Fraction of the value range added above the data.
    pub autoscale_margin: Option<f64>,
}

impl Default for AxisOptions {
    fn default() -> Self {
        Self {
            units: None,
            tick_decimals: None,
            min: None,
            max: None,
            show_ticks: true,
            autoscale_margin: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LineOptions {
    pub show: bool,
    pub line_width: u32,
}

impl Default for LineOptions {
    fn default() -> Self {
        Self {
            show: true,
            line_width: 2,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct BarOptions {
    pub show: bool,
    /// Bar width in axis units (milliseconds).
    pub bar_width: Option<f64>,
}

/// Everything a renderer needs to draw one pane.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotOptions {
    pub xaxis: AxisOptions,
    pub yaxis: AxisOptions,
    pub lines: LineOptions,
    pub bars: BarOptions,
    pub shadow_size: u32,
    /// Highlighted range, drawn as a band.
    pub selection: Option<TimeRange>,
    pub styling: BTreeMap<String, serde_json::Value>,
}

impl PlotOptions {
    /// Options limited to `range`, with bars sized to stay ten pixels wide.
    pub fn zoomed(&self, range: TimeRange, pane_width: u32) -> Self {
        let mut options = self.clone();
        options.xaxis.min = Some(range.from);
        options.xaxis.max = Some(range.to);
        options.bars.bar_width = Some(bar_width_for(range, pane_width));
        options.selection = None;
        options
    }
}

pub fn bar_width_for(range: TimeRange, pane_width: u32) -> f64 {
    10.0 * range.span() / f64::from(pane_width.max(1))
}

/// Caller-facing chart configuration.
///
/// Every field has a default, so any subset deserialized from a config
/// file is merged over `ChartOptions::default()` without touching it.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChartOptions {
    pub service: String,
    pub queries: Vec<Query>,
    /// Server-side filters such as `skipnull` or `derive`.
    pub filters: Vec<String>,
    pub timeout_secs: Option<u64>,
    pub plot: PaneOptions,
    pub overview: PaneOptions,
    pub legend: PaneOptions,
    pub xaxis: AxisOptions,
    pub yaxis: AxisOptions,
    pub lines: LineOptions,
    pub bars: BarOptions,
    pub shadow_size: u32,
    /// Renderer styling passed through untouched.
    #[serde(flatten)]
    pub styling: BTreeMap<String, serde_json::Value>,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            service: String::new(),
            queries: Vec::new(),
            filters: Vec::new(),
            timeout_secs: None,
            plot: PaneOptions::default(),
            overview: PaneOptions::default(),
            legend: PaneOptions::default(),
            xaxis: AxisOptions::default(),
            yaxis: AxisOptions::default(),
            lines: LineOptions::default(),
            bars: BarOptions::default(),
            shadow_size: 3,
            styling: BTreeMap::new(),
        }
    }
}

impl ChartOptions {
    pub fn new(service: impl Into<String>, queries: Vec<Query>) -> Self {
        Self {
            service: service.into(),
            queries,
            ..Self::default()
        }
    }

    pub fn pane(&self, kind: PaneKind) -> &PaneOptions {
        match kind {
            PaneKind::Plot => &self.plot,
            PaneKind::Overview => &self.overview,
            PaneKind::Legend => &self.legend,
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service.trim().is_empty() {
            return Err(ConfigError::MissingService);
        }
        if self.queries.is_empty() {
            return Err(ConfigError::EmptyQueries);
        }

        let mut seen = HashSet::with_capacity(self.queries.len());
        for query in &self.queries {
            let key = query.key();
            if !seen.insert(key.clone()) {
                return Err(ConfigError::DuplicateSeries(key));
            }
        }

        Ok(())
    }

    pub fn main_plot_options(&self) -> PlotOptions {
        PlotOptions {
            xaxis: self.xaxis.clone(),
            yaxis: self.yaxis.clone(),
            lines: self.lines.clone(),
            bars: self.bars.clone(),
            shadow_size: self.shadow_size,
            selection: None,
            styling: self.styling.clone(),
        }
    }

    /// Thin lines, no shadow and a y-axis pinned at zero without ticks.
    pub fn overview_plot_options(&self) -> PlotOptions {
        PlotOptions {
            xaxis: AxisOptions {
                min: None,
                max: None,
                ..self.xaxis.clone()
            },
            yaxis: AxisOptions {
                units: self.yaxis.units.clone(),
                tick_decimals: None,
                min: Some(0.0),
                max: None,
                show_ticks: false,
                autoscale_margin: Some(0.1),
            },
            lines: LineOptions {
                show: true,
                line_width: 1,
            },
            bars: self.bars.clone(),
            shadow_size: 0,
            selection: None,
            styling: self.styling.clone(),
        }
    }
}
