// Main entry point - Dependency injection and chart rendering
use std::path::Path;
use std::sync::Arc;

use futures::future::join_all;
use tracing_subscriber::EnvFilter;

use tsar_chart::application::chart_composer::{Chart, ChartComposer};
use tsar_chart::application::errors::ChartError;
use tsar_chart::domain::document::{lock_document, Document, Element, SharedDocument, BODY_ID};
use tsar_chart::infrastructure::config::{load_charts_config, ChartDefinition};
use tsar_chart::infrastructure::svg_renderer::SvgRenderer;
use tsar_chart::infrastructure::tsar_source::TsarSource;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let charts_config = load_charts_config()?;
    let charts = charts_config.resolved_charts();

    // Create the page every chart is drawn into
    let mut document = Document::new();
    for chart in &charts {
        document.append(BODY_ID, Element::new(chart.container.clone()))?;
    }
    let document = document.shared();

    let composer = ChartComposer::new(
        Arc::new(TsarSource::new()),
        Arc::new(SvgRenderer::new()),
        document.clone(),
    );

    // Charts are independent; render them all at once
    let results = join_all(
        charts
            .iter()
            .map(|chart| composer.plot(&chart.container, chart.options.clone())),
    )
    .await;

    tokio::fs::create_dir_all(&charts_config.output_dir).await?;
    let output_dir = Path::new(&charts_config.output_dir);

    let failed = write_charts(&charts, results, &document, output_dir).await;

    tracing::info!(
        "Rendered {} of {} charts into {}",
        charts.len() - failed,
        charts.len(),
        output_dir.display()
    );

    Ok(())
}

/// Write the panes of every rendered chart; returns how many charts failed.
///
/// A failure to render or write one chart is logged and does not stop the
/// others.
async fn write_charts(
    charts: &[ChartDefinition],
    results: Vec<Result<Chart, ChartError>>,
    document: &SharedDocument,
    output_dir: &Path,
) -> usize {
    let mut failed = 0;
    for (definition, result) in charts.iter().zip(results) {
        match result {
            Ok(chart) => {
                if let Err(e) = write_panes(&chart, document, output_dir).await {
                    failed += 1;
                    tracing::warn!("Chart {} was not written: {}", definition.container, e);
                }
            }
            Err(e) => {
                failed += 1;
                tracing::warn!("Chart {} was not rendered: {}", definition.container, e);
            }
        }
    }
    failed
}

/// Write every drawn pane of `chart` to `<output_dir>/<pane id>.svg`.
async fn write_panes(
    chart: &Chart,
    document: &SharedDocument,
    output_dir: &Path,
) -> anyhow::Result<()> {
    let panes: Vec<(String, String)> = {
        let doc = lock_document(document);
        chart
            .pane_ids()
            .into_iter()
            .filter_map(|id| {
                let content = doc.get(&id)?.content.clone()?;
                Some((id, content))
            })
            .collect()
    };

    for (id, content) in panes {
        let path = output_dir.join(format!("{}.svg", id));
        tokio::fs::write(&path, content).await?;
        tracing::info!("Wrote {} for chart {}", path.display(), chart.root_id());
    }

    Ok(())
}
