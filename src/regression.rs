//! Ordinary least squares on player metrics
//!
//! Rows missing the target or any feature are dropped together before the
//! split, so every fitted row has a complete feature vector. The held-out
//! partition is `ceil(test_fraction * rows)` rows chosen by a seeded shuffle;
//! the same data and seed always give the same report.

use crate::config::RegressionConfig;
use crate::metric::Metric;
use crate::record::NormalizedRecord;
use crate::{Error, Result};
use nalgebra::{DMatrix, DVector};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;

/// SVD singular values below this are treated as zero
const SVD_EPSILON: f64 = 1e-12;

/// Target and features of a fit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegressionRequest {
    target: Metric,
    features: Vec<Metric>,
}

impl RegressionRequest {
    /// Validate a target/feature selection
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidRequest` if `features` is empty, repeats a
    /// metric, or contains the target
    pub fn new(target: Metric, features: Vec<Metric>) -> Result<Self> {
        if features.is_empty() {
            return Err(Error::InvalidRequest(
                "regression needs at least one feature".to_string(),
            ));
        }
        if features.contains(&target) {
            return Err(Error::InvalidRequest(format!(
                "target '{target}' cannot also be a feature"
            )));
        }
        for (i, feature) in features.iter().enumerate() {
            if features[..i].contains(feature) {
                return Err(Error::InvalidRequest(format!(
                    "feature '{feature}' listed more than once"
                )));
            }
        }
        Ok(Self { target, features })
    }

    /// Predicted metric
    #[must_use]
    pub const fn target(&self) -> Metric {
        self.target
    }

    /// Explanatory metrics, in request order
    #[must_use]
    pub fn features(&self) -> &[Metric] {
        &self.features
    }

    /// Target followed by features
    #[must_use]
    pub fn columns(&self) -> Vec<Metric> {
        std::iter::once(self.target)
            .chain(self.features.iter().copied())
            .collect()
    }
}

/// Fitted model and its held-out score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegressionReport {
    /// Predicted metric
    pub target: Metric,
    /// Explanatory metrics
    pub features: Vec<Metric>,
    /// Fitted intercept
    pub intercept: f64,
    /// Fitted weights, aligned with `features`
    pub coefficients: Vec<f64>,
    /// Coefficient of determination on the test partition
    pub r_squared: f64,
    /// Rows used for fitting
    pub train_rows: usize,
    /// Rows used for scoring
    pub test_rows: usize,
    /// Rows dropped for a missing target or feature
    pub dropped_rows: usize,
}

impl RegressionReport {
    /// Weight of one feature
    #[must_use]
    pub fn coefficient(&self, feature: Metric) -> Option<f64> {
        self.features
            .iter()
            .position(|&f| f == feature)
            .map(|i| self.coefficients[i])
    }

    /// Predict the target for a record, `None` if a feature is missing
    #[must_use]
    pub fn predict(&self, record: &NormalizedRecord) -> Option<f64> {
        self.features
            .iter()
            .zip(&self.coefficients)
            .try_fold(self.intercept, |acc, (&f, &w)| Some(w.mul_add(record.value(f)?, acc)))
    }
}

/// Fit `target ~ features` on `records`
///
/// Returns `Ok(None)` when there is too little data: an empty test
/// partition, or no more training rows than features.
///
/// # Errors
///
/// Returns `Error::Regression` if the least-squares solve fails
pub fn fit(
    records: &[NormalizedRecord],
    request: &RegressionRequest,
    config: &RegressionConfig,
) -> Result<Option<RegressionReport>> {
    let columns = request.columns();
    let complete: Vec<&NormalizedRecord> = records
        .iter()
        .filter(|r| r.is_complete_for(&columns))
        .collect();
    let dropped_rows = records.len() - complete.len();

    let test_rows = test_size(complete.len(), config.test_fraction);
    let train_rows = complete.len() - test_rows;
    if test_rows == 0 || train_rows <= request.features.len() {
        tracing::debug!(
            target_metric = request.target.column(),
            rows = complete.len(),
            dropped_rows,
            "not enough rows for regression"
        );
        return Ok(None);
    }

    let mut order: Vec<usize> = (0..complete.len()).collect();
    order.shuffle(&mut StdRng::seed_from_u64(config.seed));
    let (test_idx, train_idx) = order.split_at(test_rows);

    let (x_train, y_train) = design(&complete, train_idx, request);
    let (x_test, y_test) = design(&complete, test_idx, request);

    let beta = x_train
        .svd(true, true)
        .solve(&y_train, SVD_EPSILON)
        .map_err(|e| Error::Regression(e.to_string()))?;

    let predicted = &x_test * &beta;
    let r_squared = r_squared(&y_test, &predicted);

    tracing::debug!(
        target_metric = request.target.column(),
        train_rows,
        test_rows,
        dropped_rows,
        r_squared,
        "fitted regression"
    );

    Ok(Some(RegressionReport {
        target: request.target,
        features: request.features.clone(),
        intercept: beta[0],
        coefficients: beta.iter().skip(1).copied().collect(),
        r_squared,
        train_rows,
        test_rows,
        dropped_rows,
    }))
}

#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn test_size(rows: usize, fraction: f64) -> usize {
    ((rows as f64) * fraction).ceil().min(rows as f64) as usize
}

/// Design matrix with a leading column of ones, and the target vector
fn design(
    rows: &[&NormalizedRecord],
    indices: &[usize],
    request: &RegressionRequest,
) -> (DMatrix<f64>, DVector<f64>) {
    let width = request.features.len() + 1;
    let x = DMatrix::from_fn(indices.len(), width, |r, c| {
        let record = rows[indices[r]];
        if c == 0 {
            1.0
        } else {
            record.value(request.features[c - 1]).unwrap_or_default()
        }
    });
    let y = DVector::from_fn(indices.len(), |r, _| {
        rows[indices[r]].value(request.target).unwrap_or_default()
    });
    (x, y)
}

/// R² = 1 - SS_res / SS_tot; a constant test target scores 1.0 only on
/// an exact fit
fn r_squared(actual: &DVector<f64>, predicted: &DVector<f64>) -> f64 {
    let mean = actual.mean();
    let ss_tot: f64 = actual.iter().map(|y| (y - mean).powi(2)).sum();
    let ss_res: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(y, p)| (y - p).powi(2))
        .sum();

    if ss_tot == 0.0 {
        if ss_res < SVD_EPSILON {
            1.0
        } else {
            0.0
        }
    } else {
        1.0 - ss_res / ss_tot
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    fn record(kd: Option<f64>, hs: Option<f64>, rating: Option<f64>) -> NormalizedRecord {
        NormalizedRecord {
            name: "p".to_string(),
            tag: None,
            rating,
            kd_ratio: kd,
            headshot_percent: hs,
            damage_round: None,
            aces: None,
        }
    }

    #[test]
    fn test_request_validation() {
        assert!(RegressionRequest::new(Metric::Rating, vec![]).is_err());
        assert!(RegressionRequest::new(Metric::Rating, vec![Metric::Rating]).is_err());
        assert!(
            RegressionRequest::new(Metric::Rating, vec![Metric::KdRatio, Metric::KdRatio]).is_err()
        );
        let ok = RegressionRequest::new(Metric::Rating, vec![Metric::KdRatio]).unwrap();
        assert_eq!(ok.columns(), vec![Metric::Rating, Metric::KdRatio]);
    }

    #[test]
    fn test_test_size_rounds_up() {
        assert_eq!(test_size(10, 0.2), 2);
        assert_eq!(test_size(11, 0.2), 3);
        assert_eq!(test_size(1, 0.2), 1);
        assert_eq!(test_size(0, 0.2), 0);
    }

    #[test]
    fn test_fit_recovers_single_feature_line() {
        let rows: Vec<_> = (0..20)
            .map(|i| {
                let kd = f64::from(i) * 0.1;
                record(Some(kd), None, Some(1.5 + 2.0 * kd))
            })
            .collect();
        let request = RegressionRequest::new(Metric::Rating, vec![Metric::KdRatio]).unwrap();
        let report = fit(&rows, &request, &RegressionConfig::default())
            .unwrap()
            .unwrap();

        assert!((report.intercept - 1.5).abs() < 1e-9);
        assert!((report.coefficient(Metric::KdRatio).unwrap() - 2.0).abs() < 1e-9);
        assert!((report.r_squared - 1.0).abs() < 1e-9);
        assert_eq!(report.test_rows, 4);
        assert_eq!(report.train_rows, 16);
    }

    #[test]
    fn test_rows_dropped_jointly() {
        let mut rows: Vec<_> = (0..10)
            .map(|i| {
                let kd = f64::from(i);
                record(Some(kd), None, Some(kd))
            })
            .collect();
        rows.push(record(None, None, Some(3.0)));
        rows.push(record(Some(3.0), None, None));

        let request = RegressionRequest::new(Metric::Rating, vec![Metric::KdRatio]).unwrap();
        let report = fit(&rows, &request, &RegressionConfig::default())
            .unwrap()
            .unwrap();
        assert_eq!(report.dropped_rows, 2);
        assert_eq!(report.train_rows + report.test_rows, 10);
    }

    #[test]
    fn test_insufficient_rows_yield_no_report() {
        let rows = vec![record(Some(1.0), Some(2.0), Some(3.0)); 2];
        let request =
            RegressionRequest::new(Metric::Rating, vec![Metric::KdRatio, Metric::HeadshotPercent])
                .unwrap();
        assert!(fit(&rows, &request, &RegressionConfig::default())
            .unwrap()
            .is_none());
        assert!(fit(&[], &request, &RegressionConfig::default())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_same_seed_same_report() {
        let rows: Vec<_> = (0..30)
            .map(|i| {
                let kd = f64::from(i % 7);
                let hs = f64::from(i % 5);
                record(Some(kd), Some(hs), Some(kd + hs + f64::from(i % 3)))
            })
            .collect();
        let request =
            RegressionRequest::new(Metric::Rating, vec![Metric::KdRatio, Metric::HeadshotPercent])
                .unwrap();
        let config = RegressionConfig::default();
        let a = fit(&rows, &request, &config).unwrap();
        let b = fit(&rows, &request, &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_r_squared_constant_target() {
        let actual = DVector::from_vec(vec![2.0, 2.0]);
        assert_eq!(r_squared(&actual, &DVector::from_vec(vec![2.0, 2.0])), 1.0);
        assert_eq!(r_squared(&actual, &DVector::from_vec(vec![1.0, 3.0])), 0.0);
    }

    #[test]
    fn test_predict_needs_every_feature() {
        let report = RegressionReport {
            target: Metric::Rating,
            features: vec![Metric::KdRatio],
            intercept: 1.0,
            coefficients: vec![2.0],
            r_squared: 1.0,
            train_rows: 4,
            test_rows: 1,
            dropped_rows: 0,
        };
        assert_eq!(report.predict(&record(Some(3.0), None, None)), Some(7.0));
        assert_eq!(report.predict(&record(None, Some(1.0), None)), None);
    }
}
