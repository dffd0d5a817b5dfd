// Renderer trait - the charting library behind the composer
use crate::application::errors::RenderError;
use crate::domain::chart::PlotOptions;
use crate::domain::document::Element;
use crate::domain::series::RenderSeries;

/// Draws panes into markup that the composer stores on the pane element.
pub trait ChartRenderer: Send + Sync {
    fn draw_plot(
        &self,
        pane: &Element,
        series: &[RenderSeries],
        options: &PlotOptions,
    ) -> Result<String, RenderError>;

    fn draw_legend(&self, pane: &Element, series: &[RenderSeries]) -> Result<String, RenderError>;
}
