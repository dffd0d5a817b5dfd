// Chart composer - builds panes, fetches series and wires interaction
use crate::application::data_shaper::shape_series;
use crate::application::errors::ChartError;
use crate::application::renderer::ChartRenderer;
use crate::application::series_source::{FetchRequest, SeriesSource};
use crate::domain::chart::{ChartOptions, ConfigError, PaneKind, PlotOptions};
use crate::domain::document::{lock_document, Element, SharedDocument, BODY_ID};
use crate::domain::query::SeriesOptionsTable;
use crate::domain::series::{data_range, value_extent, RenderSeries, TimeRange};
use crate::domain::units::{format_tick, AxisScale};
use crate::infrastructure::query_encoder::build_request_url;
use std::sync::Arc;

const TOOLTIP_OFFSET: f64 = 5.0;

/// Interaction callbacks a chart reacts to.
pub trait PlotEvents {
    /// A range was brushed on `pane`.
    fn on_range_selected(&mut self, pane: PaneKind, range: TimeRange) -> Result<(), ChartError>;

    fn on_range_cleared(&mut self, pane: PaneKind) -> Result<(), ChartError>;

    /// The cursor is over a data point of the main plot.
    fn on_point_hover(&mut self, hover: &HoverPoint) -> Result<(), ChartError>;

    fn on_hover_end(&mut self) -> Result<(), ChartError>;
}

/// A data point under the cursor, with the cursor's page position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoverPoint {
    pub series_index: usize,
    pub point_index: usize,
    pub page_x: f64,
    pub page_y: f64,
}

/// The element a pane draws into.
#[derive(Debug, Clone, PartialEq)]
pub struct PaneTarget {
    pub kind: PaneKind,
    pub element_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPanes {
    pub plot: Option<PaneTarget>,
    pub overview: Option<PaneTarget>,
    pub legend: Option<PaneTarget>,
}

/// Render state of one plotted pane.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotState {
    pub target: PaneTarget,
    pub options: PlotOptions,
    pub selection: Option<TimeRange>,
}

#[derive(Clone)]
pub struct ChartComposer {
    source: Arc<dyn SeriesSource>,
    renderer: Arc<dyn ChartRenderer>,
    document: SharedDocument,
}

impl ChartComposer {
    pub fn new(
        source: Arc<dyn SeriesSource>,
        renderer: Arc<dyn ChartRenderer>,
        document: SharedDocument,
    ) -> Self {
        Self {
            source,
            renderer,
            document,
        }
    }

    /// Fetch the configured series and draw them under `container_id`.
    pub async fn plot(
        &self,
        container_id: &str,
        options: ChartOptions,
    ) -> Result<Chart, ChartError> {
        options.validate()?;
        let panes = self.resolve_panes(container_id, &options)?;

        let table = SeriesOptionsTable::from_queries(&options.queries);
        let request = FetchRequest {
            url: build_request_url(&options.service, &options.queries, &options.filters),
            timeout: options.timeout(),
        };
        tracing::debug!(
            "Fetching {} series for {}: {}",
            table.query_count(),
            container_id,
            request.url
        );

        let raw = match self.source.fetch_series(&request).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Fetch for chart {} failed: {}", container_id, e);
                self.show_error(container_id, panes.plot.as_ref(), &e.to_string());
                return Err(e.into());
            }
        };
        let series = shape_series(raw, &table)?;

        {
            let mut doc = lock_document(&self.document);
            if !doc.is_attached(container_id) {
                tracing::warn!("Container {} detached while fetching, not rendering", container_id);
                return Err(ChartError::Detached(container_id.to_string()));
            }
            doc.remove(&error_element_id(container_id));
        }

        let full_range = data_range(&series);
        let base_options = options.main_plot_options();
        let chart = Chart {
            root_id: container_id.to_string(),
            document: self.document.clone(),
            renderer: self.renderer.clone(),
            plot: panes.plot.map(|target| PlotState {
                target,
                options: base_options.clone(),
                selection: None,
            }),
            overview: panes.overview.map(|target| PlotState {
                target,
                options: options.overview_plot_options(),
                selection: None,
            }),
            legend: panes.legend,
            base_options,
            full_range,
            series,
            last_hover: None,
        };
        chart.render()?;

        Ok(chart)
    }

    /// Pick or create the element for each pane.
    pub fn resolve_panes(
        &self,
        container_id: &str,
        options: &ChartOptions,
    ) -> Result<ResolvedPanes, ChartError> {
        let mut doc = lock_document(&self.document);
        if !doc.contains(container_id) {
            return Err(ConfigError::UnknownContainer(container_id.to_string()).into());
        }

        let mut resolve = |kind: PaneKind| -> Result<Option<PaneTarget>, ChartError> {
            let pane = options.pane(kind);
            if let Some(explicit) = &pane.container {
                if !doc.contains(explicit) {
                    return Err(ConfigError::UnknownContainer(explicit.clone()).into());
                }
                return Ok(Some(PaneTarget {
                    kind,
                    element_id: explicit.clone(),
                }));
            }
            if !pane.show {
                return Ok(None);
            }

            let element_id = kind.element_id(container_id);
            if !doc.contains(&element_id) {
                let (width, height) = pane.size(kind);
                doc.append(
                    container_id,
                    Element::new(element_id.clone())
                        .with_class(kind.class())
                        .with_size(width, height),
                )?;
            }
            Ok(Some(PaneTarget { kind, element_id }))
        };

        Ok(ResolvedPanes {
            plot: resolve(PaneKind::Plot)?,
            overview: resolve(PaneKind::Overview)?,
            legend: resolve(PaneKind::Legend)?,
        })
    }

    fn show_error(&self, container_id: &str, plot: Option<&PaneTarget>, message: &str) {
        let mut doc = lock_document(&self.document);
        if !doc.is_attached(container_id) {
            return;
        }
        let parent = plot.map_or(container_id, |p| p.element_id.as_str());
        let error_id = error_element_id(container_id);
        doc.remove(&error_id);
        if let Err(e) = doc.append(
            parent,
            Element::new(error_id)
                .with_class("tsar-error")
                .with_content(message),
        ) {
            tracing::warn!("Could not show error for chart {}: {}", container_id, e);
        }
    }
}

fn error_element_id(container_id: &str) -> String {
    format!("tsar-error-{}", container_id)
}

/// A rendered chart; receives interaction events.
pub struct Chart {
    root_id: String,
    document: SharedDocument,
    renderer: Arc<dyn ChartRenderer>,
    series: Vec<RenderSeries>,
    base_options: PlotOptions,
    full_range: Option<TimeRange>,
    plot: Option<PlotState>,
    overview: Option<PlotState>,
    legend: Option<PaneTarget>,
    last_hover: Option<(usize, usize)>,
}

impl Chart {
    pub fn root_id(&self) -> &str {
        &self.root_id
    }

    pub fn series(&self) -> &[RenderSeries] {
        &self.series
    }

    pub fn plot_state(&self) -> Option<&PlotState> {
        self.plot.as_ref()
    }

    pub fn overview_state(&self) -> Option<&PlotState> {
        self.overview.as_ref()
    }

    pub fn legend_target(&self) -> Option<&PaneTarget> {
        self.legend.as_ref()
    }

    pub fn tooltip_id(&self) -> String {
        format!("tsar-tooltip-{}", self.root_id)
    }

    /// Element ids of every pane this chart drew.
    pub fn pane_ids(&self) -> Vec<String> {
        self.plot
            .iter()
            .chain(self.overview.iter())
            .map(|state| state.target.element_id.clone())
            .chain(self.legend.iter().map(|t| t.element_id.clone()))
            .collect()
    }

    fn render(&self) -> Result<(), ChartError> {
        self.draw_plot()?;
        self.draw_overview()?;
        if let Some(legend) = &self.legend {
            let mut doc = lock_document(&self.document);
            let markup = match doc.get(&legend.element_id) {
                Some(pane) => self.renderer.draw_legend(pane, &self.series)?,
                None => return Err(ChartError::Detached(legend.element_id.clone())),
            };
            doc.set_content(&legend.element_id, markup)?;
        }
        Ok(())
    }

    fn draw_state(&self, state: &PlotState) -> Result<(), ChartError> {
        let mut doc = lock_document(&self.document);
        if !doc.is_attached(&self.root_id) {
            return Err(ChartError::Detached(self.root_id.clone()));
        }
        let mut options = state.options.clone();
        options.selection = state.selection;

        let markup = match doc.get(&state.target.element_id) {
            Some(pane) => self.renderer.draw_plot(pane, &self.series, &options)?,
            None => return Err(ChartError::Detached(state.target.element_id.clone())),
        };
        doc.set_content(&state.target.element_id, markup)?;
        Ok(())
    }

    fn draw_plot(&self) -> Result<(), ChartError> {
        match &self.plot {
            Some(state) => self.draw_state(state),
            None => Ok(()),
        }
    }

    fn draw_overview(&self) -> Result<(), ChartError> {
        match &self.overview {
            Some(state) => self.draw_state(state),
            None => Ok(()),
        }
    }

    fn pane_width(&self, target: &PaneTarget) -> u32 {
        lock_document(&self.document)
            .get(&target.element_id)
            .map_or(target.kind.default_size().0, |e| e.width)
    }

    /// Limit the main plot to `range` and mirror it on the overview.
    fn zoom_to(&mut self, range: TimeRange) -> Result<(), ChartError> {
        if let Some(target) = self.plot.as_ref().map(|s| s.target.clone()) {
            let width = self.pane_width(&target);
            let zoomed = self.base_options.zoomed(range, width);
            if let Some(plot) = self.plot.as_mut() {
                plot.options = zoomed;
                plot.selection = None;
            }
            self.draw_plot()?;
        }

        if let Some(overview) = self.overview.as_mut() {
            overview.selection = Some(range);
        }
        self.draw_overview()
    }

    fn reset_zoom(&mut self) -> Result<(), ChartError> {
        if let Some(plot) = self.plot.as_mut() {
            plot.options = self.base_options.clone();
            if let Some(full) = self.full_range {
                plot.options.xaxis.min = Some(full.from);
                plot.options.xaxis.max = Some(full.to);
            }
            plot.selection = None;
        }
        self.draw_plot()?;

        if let Some(overview) = self.overview.as_mut() {
            overview.selection = None;
        }
        self.draw_overview()
    }

    fn tooltip_text(&self, series: &RenderSeries, value: f64) -> String {
        let yaxis = &self.base_options.yaxis;
        let formatted = match &yaxis.units {
            Some(units) => {
                let window = self.plot.as_ref().and_then(|p| {
                    match (p.options.xaxis.min, p.options.xaxis.max) {
                        (Some(from), Some(to)) => Some(TimeRange::new(from, to)),
                        _ => None,
                    }
                });
                let max = yaxis
                    .max
                    .or_else(|| value_extent(&self.series, window).map(|(_, hi)| hi))
                    .unwrap_or(value);
                format_tick(value, &AxisScale::new(max, yaxis.tick_decimals), units)
            }
            None => format!("{:.2}", value),
        };
        format!("{} (y={})", series.label, formatted)
    }

    fn remove_tooltip(&self) {
        lock_document(&self.document).remove(&self.tooltip_id());
    }
}

impl PlotEvents for Chart {
    fn on_range_selected(&mut self, pane: PaneKind, range: TimeRange) -> Result<(), ChartError> {
        tracing::debug!(
            "Range {}..{} selected on {} of {}",
            range.from,
            range.to,
            pane.name(),
            self.root_id
        );
        self.zoom_to(range)
    }

    fn on_range_cleared(&mut self, pane: PaneKind) -> Result<(), ChartError> {
        tracing::debug!("Selection cleared on {} of {}", pane.name(), self.root_id);
        self.reset_zoom()
    }

    fn on_point_hover(&mut self, hover: &HoverPoint) -> Result<(), ChartError> {
        if !lock_document(&self.document).is_attached(&self.root_id) {
            self.remove_tooltip();
            self.last_hover = None;
            return Err(ChartError::Detached(self.root_id.clone()));
        }

        let point = (hover.series_index, hover.point_index);
        if self.last_hover == Some(point) {
            return Ok(());
        }

        let Some(series) = self.series.get(hover.series_index) else {
            return self.on_hover_end();
        };
        let Some(value) = series.data.get(hover.point_index).and_then(|p| p.value) else {
            return self.on_hover_end();
        };

        let text = self.tooltip_text(series, value);
        self.remove_tooltip();
        self.last_hover = Some(point);

        let mut doc = lock_document(&self.document);
        doc.append(
            BODY_ID,
            Element::new(self.tooltip_id())
                .with_class("tsar-tooltip")
                .with_position(hover.page_x + TOOLTIP_OFFSET, hover.page_y + TOOLTIP_OFFSET)
                .with_content(text),
        )?;
        Ok(())
    }

    fn on_hover_end(&mut self) -> Result<(), ChartError> {
        self.remove_tooltip();
        self.last_hover = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::errors::{DataShapeError, FetchError, RenderError};
    use crate::domain::document::Document;
    use crate::domain::query::{Query, SeriesOptions};
    use crate::domain::series::{RawSeriesMap, RawSeriesPoint};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct StaticSource {
        response: Option<RawSeriesMap>,
        requests: Mutex<Vec<FetchRequest>>,
        calls: AtomicUsize,
    }

    impl StaticSource {
        fn new(response: RawSeriesMap) -> Self {
            Self {
                response: Some(response),
                requests: Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                response: None,
                requests: Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SeriesSource for StaticSource {
        async fn fetch_series(&self, request: &FetchRequest) -> Result<RawSeriesMap, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push(request.clone());
            self.response.clone().ok_or(FetchError::Status {
                status: 503,
                body: "unavailable".to_string(),
            })
        }
    }

    #[derive(Default)]
    struct RecordingRenderer {
        plots: Mutex<Vec<(String, PlotOptions)>>,
        legends: Mutex<Vec<String>>,
    }

    impl ChartRenderer for RecordingRenderer {
        fn draw_plot(
            &self,
            pane: &Element,
            series: &[RenderSeries],
            options: &PlotOptions,
        ) -> Result<String, RenderError> {
            self.plots.lock().unwrap().push((pane.id.clone(), options.clone()));
            Ok(format!("<svg series=\"{}\"/>", series.len()))
        }

        fn draw_legend(
            &self,
            pane: &Element,
            _series: &[RenderSeries],
        ) -> Result<String, RenderError> {
            self.legends.lock().unwrap().push(pane.id.clone());
            Ok("<svg/>".to_string())
        }
    }

    fn response() -> RawSeriesMap {
        let mut raw = RawSeriesMap::new();
        raw.insert(
            "mem/used".to_string(),
            vec![RawSeriesPoint(100.0, Some(5.0)), RawSeriesPoint(200.0, Some(2_500_000.0))],
        );
        raw.insert(
            "cpu/load".to_string(),
            vec![RawSeriesPoint(100.0, Some(1.0)), RawSeriesPoint(300.0, Some(1.5))],
        );
        raw
    }

    fn options() -> ChartOptions {
        ChartOptions::new(
            "http://tsar.example/observations",
            vec![Query::new("cpu", "load"), Query::new("mem", "used")],
        )
    }

    fn document_with_root(root: &str) -> SharedDocument {
        let mut doc = Document::new();
        doc.append(BODY_ID, Element::new(root)).unwrap();
        doc.shared()
    }

    fn setup(
        source: StaticSource,
    ) -> (ChartComposer, Arc<StaticSource>, Arc<RecordingRenderer>, SharedDocument) {
        let source = Arc::new(source);
        let renderer = Arc::new(RecordingRenderer::default());
        let document = document_with_root("load");
        let composer = ChartComposer::new(source.clone(), renderer.clone(), document.clone());
        (composer, source, renderer, document)
    }

    #[tokio::test]
    async fn test_plot_creates_all_panes() {
        let (composer, source, renderer, document) = setup(StaticSource::new(response()));

        let chart = composer.plot("load", options()).await.unwrap();

        let doc = lock_document(&document);
        assert_eq!(
            doc.get("load").unwrap().children,
            vec!["tsar-plot-load", "tsar-overview-load", "tsar-legend-load"]
        );
        assert_eq!(
            doc.get("tsar-plot-load").unwrap().content.as_deref(),
            Some("<svg series=\"2\"/>")
        );
        assert_eq!(doc.get("tsar-overview-load").unwrap().class.as_deref(), Some("tsar-overview"));
        assert_eq!(
            chart.pane_ids(),
            vec!["tsar-plot-load", "tsar-overview-load", "tsar-legend-load"]
        );

        let labels: Vec<&str> = chart.series().iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["cpu/load", "mem/used"]);

        let plots = renderer.plots.lock().unwrap();
        assert_eq!(plots.len(), 2);
        assert_eq!(plots[1].0, "tsar-overview-load");
        assert_eq!(plots[1].1.lines.line_width, 1);
        assert_eq!(renderer.legends.lock().unwrap().len(), 1);

        let requests = source.requests.lock().unwrap();
        assert_eq!(
            requests[0].url,
            "http://tsar.example/observations?_accept=application/json&missing=skip\
             &subject=cpu&attribute=load&subject=mem&attribute=used"
        );
    }

    #[tokio::test]
    async fn test_disabled_overview_is_not_created() {
        let (composer, _, renderer, document) = setup(StaticSource::new(response()));
        let mut options = options();
        options.overview.show = false;

        let chart = composer.plot("load", options).await.unwrap();

        assert!(chart.overview_state().is_none());
        assert!(!lock_document(&document).contains("tsar-overview-load"));
        let plots = renderer.plots.lock().unwrap();
        assert_eq!(plots.len(), 1);
        assert_eq!(plots[0].0, "tsar-plot-load");
    }

    #[tokio::test]
    async fn test_explicit_containers_are_used() {
        let (composer, _, _, document) = setup(StaticSource::new(response()));
        lock_document(&document)
            .append(BODY_ID, Element::new("sidebar").with_size(150, 100))
            .unwrap();
        let mut options = options();
        options.legend.container = Some("sidebar".to_string());

        let chart = composer.plot("load", options).await.unwrap();

        assert_eq!(chart.legend_target().unwrap().element_id, "sidebar");
        let doc = lock_document(&document);
        assert!(!doc.contains("tsar-legend-load"));
        assert_eq!(doc.get("sidebar").unwrap().content.as_deref(), Some("<svg/>"));
    }

    #[tokio::test]
    async fn test_invalid_options_fail_before_fetching() {
        let (composer, source, _, _) = setup(StaticSource::new(response()));

        let mut no_service = options();
        no_service.service = String::new();
        assert!(matches!(
            composer.plot("load", no_service).await,
            Err(ChartError::Config(ConfigError::MissingService))
        ));

        let mut unknown = options();
        unknown.plot.container = Some("nowhere".to_string());
        assert!(matches!(
            composer.plot("load", unknown).await,
            Err(ChartError::Config(ConfigError::UnknownContainer(id))) if id == "nowhere"
        ));

        assert!(matches!(
            composer.plot("missing-root", options()).await,
            Err(ChartError::Config(ConfigError::UnknownContainer(_)))
        ));
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fetch_failure_shows_error_state() {
        let (composer, _, renderer, document) = setup(StaticSource::failing());

        let result = composer.plot("load", options()).await;

        assert!(matches!(result, Err(ChartError::Fetch(FetchError::Status { status: 503, .. }))));
        assert!(renderer.plots.lock().unwrap().is_empty());
        let doc = lock_document(&document);
        let error = doc.get("tsar-error-load").unwrap();
        assert_eq!(error.parent.as_deref(), Some("tsar-plot-load"));
        assert!(error.content.as_deref().unwrap().contains("503"));
    }

    #[tokio::test]
    async fn test_unknown_response_series_fails_render() {
        let mut raw = response();
        raw.insert("disk/free".to_string(), vec![RawSeriesPoint(1.0, Some(1.0))]);
        let (composer, _, renderer, _) = setup(StaticSource::new(raw));

        let result = composer.plot("load", options()).await;

        assert!(matches!(
            result,
            Err(ChartError::DataShape(DataShapeError::UnknownSeries(key))) if key == "disk/free"
        ));
        assert!(renderer.plots.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_main_selection_mirrors_onto_overview() {
        let (composer, source, renderer, _) = setup(StaticSource::new(response()));
        let mut chart = composer.plot("load", options()).await.unwrap();

        chart
            .on_range_selected(PaneKind::Plot, TimeRange::new(100.0, 200.0))
            .unwrap();

        let overview = chart.overview_state().unwrap();
        assert_eq!(overview.selection, Some(TimeRange::new(100.0, 200.0)));
        let plot = chart.plot_state().unwrap();
        assert_eq!(plot.options.xaxis.min, Some(100.0));
        assert_eq!(plot.options.xaxis.max, Some(200.0));
        assert_eq!(plot.options.bars.bar_width, Some(10.0 * 100.0 / 800.0));

        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        let plots = renderer.plots.lock().unwrap();
        let last = plots.last().unwrap();
        assert_eq!(last.0, "tsar-overview-load");
        assert_eq!(last.1.selection, Some(TimeRange::new(100.0, 200.0)));
    }

    #[tokio::test]
    async fn test_clearing_overview_resets_main_plot() {
        let (composer, _, _, _) = setup(StaticSource::new(response()));
        let mut chart = composer.plot("load", options()).await.unwrap();

        chart
            .on_range_selected(PaneKind::Overview, TimeRange::new(150_000.0, 250_000.0))
            .unwrap();
        chart.on_range_cleared(PaneKind::Overview).unwrap();

        assert_eq!(chart.overview_state().unwrap().selection, None);
        let plot = chart.plot_state().unwrap();
        assert_eq!(plot.options.xaxis.min, Some(100_000.0));
        assert_eq!(plot.options.xaxis.max, Some(300_000.0));
    }

    #[tokio::test]
    async fn test_hover_shows_single_tooltip() {
        let (composer, _, _, document) = setup(StaticSource::new(response()));
        let mut chart = composer.plot("load", options()).await.unwrap();

        let hover = HoverPoint {
            series_index: 0,
            point_index: 1,
            page_x: 40.0,
            page_y: 60.0,
        };
        chart.on_point_hover(&hover).unwrap();
        chart
            .on_point_hover(&HoverPoint {
                point_index: 0,
                ..hover
            })
            .unwrap();

        {
            let doc = lock_document(&document);
            let body = doc.get(BODY_ID).unwrap();
            assert_eq!(
                body.children.iter().filter(|c| c.as_str() == "tsar-tooltip-load").count(),
                1
            );
            let tooltip = doc.get("tsar-tooltip-load").unwrap();
            assert_eq!(tooltip.content.as_deref(), Some("cpu/load (y=1.00)"));
            assert_eq!(tooltip.position, Some((45.0, 65.0)));
        }

        chart.on_hover_end().unwrap();
        assert!(!lock_document(&document).contains("tsar-tooltip-load"));
    }

    #[tokio::test]
    async fn test_tooltip_uses_axis_units() {
        let (composer, _, _, document) = setup(StaticSource::new(response()));
        let mut options = options();
        options.yaxis.units = Some("B".to_string());
        options.yaxis.tick_decimals = Some(1);
        options.queries[1] = Query::new("mem", "used").with_options(SeriesOptions {
            label: Some("Memory".to_string()),
            ..Default::default()
        });
        let mut chart = composer.plot("load", options).await.unwrap();

        chart
            .on_point_hover(&HoverPoint {
                series_index: 1,
                point_index: 1,
                page_x: 0.0,
                page_y: 0.0,
            })
            .unwrap();

        let doc = lock_document(&document);
        assert_eq!(
            doc.get("tsar-tooltip-load").unwrap().content.as_deref(),
            Some("Memory (y=2.5MB)")
        );
    }

    #[tokio::test]
    async fn test_detached_container_is_not_rendered() {
        struct DetachingSource {
            document: SharedDocument,
        }

        #[async_trait]
        impl SeriesSource for DetachingSource {
            async fn fetch_series(
                &self,
                _request: &FetchRequest,
            ) -> Result<RawSeriesMap, FetchError> {
                lock_document(&self.document).remove("load");
                Ok(response())
            }
        }

        let document = document_with_root("load");
        let renderer = Arc::new(RecordingRenderer::default());
        let composer = ChartComposer::new(
            Arc::new(DetachingSource {
                document: document.clone(),
            }),
            renderer.clone(),
            document,
        );

        let result = composer.plot("load", options()).await;

        assert!(matches!(result, Err(ChartError::Detached(id)) if id == "load"));
        assert!(renderer.plots.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_hover_after_detach_adds_no_tooltip() {
        let (composer, _, _, document) = setup(StaticSource::new(response()));
        let mut chart = composer.plot("load", options()).await.unwrap();

        lock_document(&document).remove("load");
        let result = chart.on_point_hover(&HoverPoint {
            series_index: 0,
            point_index: 1,
            page_x: 10.0,
            page_y: 10.0,
        });

        assert!(matches!(result, Err(ChartError::Detached(id)) if id == "load"));
        assert!(!lock_document(&document).contains("tsar-tooltip-load"));
    }

    #[tokio::test]
    async fn test_replot_reuses_pane_elements() {
        let (composer, source, _, document) = setup(StaticSource::new(response()));

        composer.plot("load", options()).await.unwrap();
        composer.plot("load", options()).await.unwrap();

        assert_eq!(lock_document(&document).get("load").unwrap().children.len(), 3);
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }
}
