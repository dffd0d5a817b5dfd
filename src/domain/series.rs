// Time series domain models
use super::query::SeriesOptions;
use serde::Deserialize;
use std::collections::HashMap;

/// `[timestampSeconds, value]` as returned by the TSAR service.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RawSeriesPoint(pub f64, pub Option<f64>);

/// Service response: series key -> points in ascending time order.
pub type RawSeriesMap = HashMap<String, Vec<RawSeriesPoint>>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderPoint {
    pub time_ms: f64,
    pub value: Option<f64>,
}

impl RenderPoint {
    pub fn new(time_ms: f64, value: Option<f64>) -> Self {
        Self { time_ms, value }
    }
}

impl From<RawSeriesPoint> for RenderPoint {
    fn from(point: RawSeriesPoint) -> Self {
        Self::new(point.0 * 1000.0, point.1)
    }
}

/// A series ready to be handed to a renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSeries {
    pub id: usize,
    pub key: String,
    pub label: String,
    pub data: Vec<RenderPoint>,
    pub options: SeriesOptions,
}

impl RenderSeries {
    pub fn is_bars(&self) -> bool {
        self.options.bars.unwrap_or(false)
    }
}

/// Closed interval on the time axis, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeRange {
    pub from: f64,
    pub to: f64,
}

impl TimeRange {
    pub fn new(from: f64, to: f64) -> Self {
        if from <= to {
            Self { from, to }
        } else {
            Self { from: to, to: from }
        }
    }

    pub fn span(&self) -> f64 {
        self.to - self.from
    }

    pub fn contains(&self, time_ms: f64) -> bool {
        time_ms >= self.from && time_ms <= self.to
    }
}

/// Time extent over all points of all series.
pub fn data_range(series: &[RenderSeries]) -> Option<TimeRange> {
    let mut times = series.iter().flat_map(|s| s.data.iter().map(|p| p.time_ms));
    let first = times.next()?;
    let (min, max) = times.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t)));
    Some(TimeRange::new(min, max))
}

/// (min, max) over all non-null values, optionally restricted to a time window.
pub fn value_extent(series: &[RenderSeries], window: Option<TimeRange>) -> Option<(f64, f64)> {
    series
        .iter()
        .flat_map(|s| s.data.iter())
        .filter(|p| window.map_or(true, |w| w.contains(p.time_ms)))
        .filter_map(|p| p.value)
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(points: &[(f64, Option<f64>)]) -> RenderSeries {
        RenderSeries {
            id: 0,
            key: "a/b".to_string(),
            label: "a/b".to_string(),
            data: points.iter().map(|&(t, v)| RenderPoint::new(t, v)).collect(),
            options: SeriesOptions::default(),
        }
    }

    #[test]
    fn test_raw_point_conversion() {
        for seconds in [0.0, 1.0, -86400.0, 1_700_000_000.0] {
            let point = RenderPoint::from(RawSeriesPoint(seconds, Some(1.0)));
            assert_eq!(point.time_ms, seconds * 1000.0);
        }
    }

    #[test]
    fn test_raw_point_deserializes_null_value() {
        let points: Vec<RawSeriesPoint> = serde_json::from_str("[[100, 5], [160, null]]").unwrap();
        assert_eq!(points, vec![RawSeriesPoint(100.0, Some(5.0)), RawSeriesPoint(160.0, None)]);
    }

    #[test]
    fn test_time_range_normalizes_order() {
        let range = TimeRange::new(200.0, 100.0);
        assert_eq!(range.from, 100.0);
        assert_eq!(range.to, 200.0);
        assert_eq!(range.span(), 100.0);
    }

    #[test]
    fn test_data_range_and_extent() {
        let data = vec![
            series(&[(1000.0, Some(3.0)), (2000.0, None)]),
            series(&[(500.0, Some(-1.0)), (3000.0, Some(7.0))]),
        ];

        assert_eq!(data_range(&data), Some(TimeRange::new(500.0, 3000.0)));
        assert_eq!(value_extent(&data, None), Some((-1.0, 7.0)));
        assert_eq!(value_extent(&data, Some(TimeRange::new(900.0, 2500.0))), Some((3.0, 3.0)));
        assert_eq!(data_range(&[]), None);
    }
}
