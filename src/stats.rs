//! Distribution summaries for box plots and bar-chart series

use crate::metric::Metric;
use crate::rank::RankingResult;
use crate::record::NormalizedRecord;
use serde::Serialize;

/// Five-number summary plus count and mean
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Distribution {
    /// Summarized metric
    pub metric: Metric,
    /// Rows with the metric present
    pub count: usize,
    /// Arithmetic mean
    pub mean: f64,
    /// Smallest value
    pub min: f64,
    /// First quartile
    pub q1: f64,
    /// Median
    pub median: f64,
    /// Third quartile
    pub q3: f64,
    /// Largest value
    pub max: f64,
}

impl Distribution {
    /// Interquartile range
    #[must_use]
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

/// Summarize `metric` over the rows that carry it
///
/// Quartiles use linear interpolation between closest ranks. Returns
/// `None` when no row has the metric.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn summarize(records: &[NormalizedRecord], metric: Metric) -> Option<Distribution> {
    let mut values: Vec<f64> = records.iter().filter_map(|r| r.value(metric)).collect();
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);

    let count = values.len();
    let mean = values.iter().sum::<f64>() / count as f64;
    Some(Distribution {
        metric,
        count,
        mean,
        min: values[0],
        q1: quantile(&values, 0.25),
        median: quantile(&values, 0.5),
        q3: quantile(&values, 0.75),
        max: values[count - 1],
    })
}

/// Linear-interpolation quantile of sorted, non-empty data
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let weight = pos - pos.floor();
    (sorted[upper] - sorted[lower]).mul_add(weight, sorted[lower])
}

/// `(name, value)` pairs in ranked order for a horizontal bar chart
#[must_use]
pub fn bar_series(result: &RankingResult) -> Vec<(String, f64)> {
    result
        .entries()
        .map(|(_, record, value)| (record.name.clone(), value))
        .collect()
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use crate::rank::rank;
    use crate::record::PlayerRecord;

    fn aces(values: &[Option<f64>]) -> Vec<NormalizedRecord> {
        let raw: Vec<_> = values
            .iter()
            .enumerate()
            .map(|(i, v)| PlayerRecord::named(format!("p{i}")).with(Metric::Aces, *v))
            .collect();
        normalize(&raw)
    }

    #[test]
    fn test_summary_known_data() {
        let rows = aces(&[Some(7.0), Some(1.0), None, Some(3.0), Some(5.0), Some(9.0)]);
        let dist = summarize(&rows, Metric::Aces).unwrap();
        assert_eq!(dist.count, 5);
        assert_eq!(dist.mean, 5.0);
        assert_eq!(dist.min, 1.0);
        assert_eq!(dist.q1, 3.0);
        assert_eq!(dist.median, 5.0);
        assert_eq!(dist.q3, 7.0);
        assert_eq!(dist.max, 9.0);
        assert_eq!(dist.iqr(), 4.0);
    }

    #[test]
    fn test_quartiles_interpolate() {
        let rows = aces(&[Some(1.0), Some(2.0), Some(3.0), Some(4.0)]);
        let dist = summarize(&rows, Metric::Aces).unwrap();
        assert_eq!(dist.q1, 1.75);
        assert_eq!(dist.median, 2.5);
        assert_eq!(dist.q3, 3.25);
    }

    #[test]
    fn test_single_value() {
        let dist = summarize(&aces(&[Some(4.0)]), Metric::Aces).unwrap();
        assert_eq!((dist.min, dist.median, dist.max), (4.0, 4.0, 4.0));
    }

    #[test]
    fn test_no_values_no_summary() {
        assert!(summarize(&aces(&[None, None]), Metric::Aces).is_none());
        assert!(summarize(&[], Metric::Rating).is_none());
    }

    #[test]
    fn test_bar_series_follows_rank() {
        let rows = aces(&[Some(1.0), Some(4.0), Some(2.0)]);
        let result = rank(&rows, Metric::Aces, 2).unwrap();
        assert_eq!(
            bar_series(&result),
            vec![("p1".to_string(), 4.0), ("p2".to_string(), 2.0)]
        );
    }
}
