// Data shaper - TSAR response into ordered render series
use crate::application::errors::DataShapeError;
use crate::domain::query::SeriesOptionsTable;
use crate::domain::series::{RawSeriesMap, RenderPoint, RenderSeries};

/// Reassociate response series with their queries, in query order.
///
/// Times are converted from seconds to milliseconds. A response key with no
/// matching query fails the whole render.
pub fn shape_series(
    raw: RawSeriesMap,
    table: &SeriesOptionsTable,
) -> Result<Vec<RenderSeries>, DataShapeError> {
    let mut slots: Vec<Option<RenderSeries>> = vec![None; table.query_count()];

    for (raw_key, points) in raw {
        let key = urlencoding::decode(&raw_key)
            .map(|k| k.into_owned())
            .unwrap_or(raw_key);
        let entry = table
            .get(&key)
            .ok_or_else(|| DataShapeError::UnknownSeries(key.clone()))?;

        let slot = &mut slots[entry.id];
        if slot.is_some() {
            return Err(DataShapeError::DuplicateSeries(key));
        }

        let label = entry.options.label.clone().unwrap_or_else(|| key.clone());
        *slot = Some(RenderSeries {
            id: entry.id,
            label,
            data: points.into_iter().map(RenderPoint::from).collect(),
            options: entry.options.clone(),
            key,
        });
    }

    let total = slots.len();
    let series: Vec<RenderSeries> = slots.into_iter().flatten().collect();
    if series.len() < total {
        tracing::debug!(
            "TSAR response had {} of {} requested series",
            series.len(),
            total
        );
    }

    Ok(series)
}
