//! Leaderboard ranking: filter, sort descending, truncate
//!
//! `ORDER BY metric DESC LIMIT n` over normalized records, with the
//! guarantees a leaderboard needs:
//! - Rows missing the metric are excluded, never sorted to either end
//! - Equal values keep input order
//! - Fewer eligible rows than `limit` returns them all

use crate::config::LimitBounds;
use crate::metric::Metric;
use crate::record::NormalizedRecord;
use crate::topk::TopKSelection;
use crate::{Error, Result};
use serde::Serialize;

/// User query: which metric, how many rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RankingRequest {
    /// Sort metric
    pub metric: Metric,
    /// Result count
    pub limit: usize,
}

impl RankingRequest {
    /// Build a request, checking `limit` against the configured bounds
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidRequest` if `limit` is outside `bounds`
    pub fn new(metric: Metric, limit: usize, bounds: &LimitBounds) -> Result<Self> {
        bounds.check(limit)?;
        Ok(Self { metric, limit })
    }

    /// Request with the configured default limit
    #[must_use]
    pub const fn with_default_limit(metric: Metric, bounds: &LimitBounds) -> Self {
        Self {
            metric,
            limit: bounds.default,
        }
    }
}

/// Ranked rows, best first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingResult {
    metric: Metric,
    eligible: usize,
    records: Vec<NormalizedRecord>,
}

impl RankingResult {
    /// Metric the rows are ranked by
    #[must_use]
    pub const fn metric(&self) -> Metric {
        self.metric
    }

    /// Rows that had the metric before truncation
    #[must_use]
    pub const fn eligible(&self) -> usize {
        self.eligible
    }

    /// Ranked rows
    #[must_use]
    pub fn records(&self) -> &[NormalizedRecord] {
        &self.records
    }

    /// Number of ranked rows
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no row was eligible
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// `(position, record, value)` triples, position starting at 1
    pub fn entries(&self) -> impl Iterator<Item = (usize, &NormalizedRecord, f64)> + '_ {
        self.records.iter().enumerate().filter_map(move |(i, record)| {
            record.value(self.metric).map(|value| (i + 1, record, value))
        })
    }
}

/// Rank records by `metric`, descending, keeping the first `limit`
///
/// # Errors
///
/// Returns `Error::InvalidRequest` if `limit` is zero
///
/// # Example
///
/// ```rust
/// use statboard::metric::Metric;
/// use statboard::normalize::normalize;
/// use statboard::rank::rank;
/// use statboard::record::PlayerRecord;
///
/// # fn main() -> statboard::Result<()> {
/// let rows = normalize(&[
///     PlayerRecord::named("A").with(Metric::Rating, "Radiant #1"),
///     PlayerRecord::named("B").with(Metric::Rating, "Gold 3"),
///     PlayerRecord::named("C").with(Metric::Rating, "Unranked"),
/// ]);
/// let top = rank(&rows, Metric::Rating, 5)?;
/// let names: Vec<_> = top.records().iter().map(|r| r.name.as_str()).collect();
/// assert_eq!(names, ["A", "B"]);
/// # Ok(())
/// # }
/// ```
pub fn rank(records: &[NormalizedRecord], metric: Metric, limit: usize) -> Result<RankingResult> {
    if limit == 0 {
        return Err(Error::InvalidRequest("limit must be greater than 0".to_string()));
    }

    let eligible = records.iter().filter(|r| r.value(metric).is_some()).count();
    let top = records.top_k_by(limit, |r| r.value(metric))?;

    tracing::debug!(
        metric = metric.column(),
        limit,
        eligible,
        returned = top.len(),
        "ranked records"
    );

    Ok(RankingResult {
        metric,
        eligible,
        records: top.into_iter().cloned().collect(),
    })
}

/// Rank using a validated request
///
/// # Errors
///
/// Returns error if the request's limit is zero
pub fn rank_request(records: &[NormalizedRecord], request: &RankingRequest) -> Result<RankingResult> {
    rank(records, request.metric, request.limit)
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use crate::record::PlayerRecord;

    fn kd_rows(values: &[(&str, Option<f64>)]) -> Vec<NormalizedRecord> {
        let raw: Vec<PlayerRecord> = values
            .iter()
            .map(|(name, kd)| PlayerRecord::named(*name).with(Metric::KdRatio, *kd))
            .collect();
        normalize(&raw)
    }

    fn names(result: &RankingResult) -> Vec<&str> {
        result.records().iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_rank_sorts_descending_and_truncates() {
        let rows = kd_rows(&[
            ("a", Some(1.0)),
            ("b", Some(1.8)),
            ("c", Some(0.7)),
            ("d", Some(1.2)),
        ]);
        let result = rank(&rows, Metric::KdRatio, 2).unwrap();
        assert_eq!(names(&result), vec!["b", "d"]);
        assert_eq!(result.eligible(), 4);
        assert_eq!(result.metric(), Metric::KdRatio);
    }

    #[test]
    fn test_rank_limit_above_eligible_returns_all() {
        let rows = kd_rows(&[("a", Some(1.0)), ("b", None), ("c", Some(2.0))]);
        let result = rank(&rows, Metric::KdRatio, 50).unwrap();
        assert_eq!(names(&result), vec!["c", "a"]);
        assert_eq!(result.eligible(), 2);
    }

    #[test]
    fn test_rank_ties_are_stable() {
        let rows = kd_rows(&[
            ("first", Some(1.5)),
            ("top", Some(2.0)),
            ("second", Some(1.5)),
            ("third", Some(1.5)),
        ]);
        let result = rank(&rows, Metric::KdRatio, 3).unwrap();
        assert_eq!(names(&result), vec!["top", "first", "second"]);
    }

    #[test]
    fn test_rank_signed_zero_ties_are_stable() {
        let rows = normalize(&[
            PlayerRecord::named("first").with(Metric::KdRatio, "-0"),
            PlayerRecord::named("second").with(Metric::KdRatio, 0.0),
            PlayerRecord::named("third").with(Metric::KdRatio, -0.0),
        ]);
        let result = rank(&rows, Metric::KdRatio, 5).unwrap();
        assert_eq!(names(&result), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_rank_empty_is_not_an_error() {
        let rows = kd_rows(&[("a", None)]);
        let result = rank(&rows, Metric::KdRatio, 5).unwrap();
        assert!(result.is_empty());
        assert_eq!(result.eligible(), 0);
    }

    #[test]
    fn test_rank_zero_limit_rejected() {
        let rows = kd_rows(&[("a", Some(1.0))]);
        assert!(matches!(
            rank(&rows, Metric::KdRatio, 0),
            Err(Error::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_entries_are_one_based() {
        let rows = kd_rows(&[("a", Some(1.0)), ("b", Some(3.0))]);
        let result = rank(&rows, Metric::KdRatio, 5).unwrap();
        let entries: Vec<_> = result.entries().map(|(pos, r, v)| (pos, r.name.clone(), v)).collect();
        assert_eq!(entries, vec![(1, "b".to_string(), 3.0), (2, "a".to_string(), 1.0)]);
    }

    #[test]
    fn test_request_bounds() {
        let bounds = LimitBounds { min: 5, max: 20, default: 10 };
        assert!(RankingRequest::new(Metric::Rating, 5, &bounds).is_ok());
        assert!(RankingRequest::new(Metric::Rating, 21, &bounds).is_err());
        assert!(RankingRequest::new(Metric::Rating, 4, &bounds).is_err());
        assert_eq!(RankingRequest::with_default_limit(Metric::Aces, &bounds).limit, 10);
    }
}
