//! Interactive session: one pipeline invocation per user action
//!
//! A [`Session`] owns the configuration, the selected [`Source`] and the
//! [`DatasetCache`]. Every operation reloads through the cache, normalizes,
//! and runs to completion; nothing derived is kept between calls.
//!
//! ```rust,no_run
//! use statboard::config::PipelineConfig;
//! use statboard::metric::Metric;
//! use statboard::rank::RankingRequest;
//! use statboard::session::Session;
//! use statboard::storage::Source;
//!
//! # fn main() -> statboard::Result<()> {
//! let mut session = Session::new(PipelineConfig::default());
//! session.select_source(Source::path("cleaned_dataset.xlsx"));
//!
//! let request = RankingRequest::new(Metric::KdRatio, 10, &session.config().limits)?;
//! for (pos, player, kd) in session.rank(&request)?.entries() {
//!     println!("{pos:>2}. {} {kd:.2}", player.name);
//! }
//! # Ok(())
//! # }
//! ```

use crate::cache::{CacheStats, DatasetCache};
use crate::config::PipelineConfig;
use crate::metric::Metric;
use crate::normalize::{normalize, retain_complete};
use crate::rank::{rank_request, RankingRequest, RankingResult};
use crate::record::NormalizedRecord;
use crate::regression::{self, RegressionReport, RegressionRequest};
use crate::stats::{self, Distribution};
use crate::storage::{Dataset, Source};
use crate::{Error, Result};
use std::sync::Arc;
use tracing::info_span;

/// Single-user pipeline driver
#[derive(Debug)]
pub struct Session {
    config: PipelineConfig,
    source: Option<Source>,
    cache: DatasetCache,
}

impl Session {
    /// Session with no source selected
    #[must_use]
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            source: None,
            cache: DatasetCache::new(),
        }
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Currently selected source
    #[must_use]
    pub const fn source(&self) -> Option<&Source> {
        self.source.as_ref()
    }

    /// Select the source for subsequent operations
    ///
    /// Nothing is loaded until an operation runs.
    pub fn select_source(&mut self, source: Source) {
        tracing::debug!(source = %source, "selected source");
        self.source = Some(source);
    }

    /// Drop the cached dataset so the next operation reloads
    pub fn invalidate(&mut self) {
        self.cache.invalidate();
    }

    /// Cache hit/miss counters
    #[must_use]
    pub const fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Raw dataset for the selected source
    ///
    /// # Errors
    ///
    /// Returns `Error::NoSource` if no source is selected, or the load error
    pub fn dataset(&mut self) -> Result<Arc<Dataset>> {
        let source = self.source.as_ref().ok_or(Error::NoSource)?;
        let dataset = self
            .cache
            .get_or_load(source, self.config.sheet.as_deref())?;
        Ok(dataset)
    }

    /// Metrics the selected dataset can be ranked by
    ///
    /// # Errors
    ///
    /// Returns error if the dataset cannot be loaded
    pub fn metrics(&mut self) -> Result<Vec<Metric>> {
        Ok(self.dataset()?.shape().metrics().to_vec())
    }

    /// Top-N leaderboard
    ///
    /// # Errors
    ///
    /// - `Error::InvalidRequest` if the limit is outside the configured bounds
    /// - `Error::UnsupportedMetric` if the dataset lacks the metric column
    /// - Load errors from the source
    pub fn rank(&mut self, request: &RankingRequest) -> Result<RankingResult> {
        let _span = info_span!("rank", metric = request.metric.column(), limit = request.limit)
            .entered();

        self.config.limits.check(request.limit)?;

        let (dataset, rows) = self.normalized()?;
        require_metrics(&dataset, &[request.metric])?;
        let rows = retain_complete(&rows, &[request.metric]);
        rank_request(&rows, request)
    }

    /// Box-plot summary of one metric
    ///
    /// # Errors
    ///
    /// Returns `Error::UnsupportedMetric` or a load error
    pub fn summarize(&mut self, metric: Metric) -> Result<Option<Distribution>> {
        let _span = info_span!("summarize", metric = metric.column()).entered();
        let (dataset, rows) = self.normalized()?;
        require_metrics(&dataset, &[metric])?;
        Ok(stats::summarize(&rows, metric))
    }

    /// Least-squares fit of `target ~ features`
    ///
    /// `Ok(None)` means too few complete rows.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnsupportedMetric`, a load error, or a solver error
    pub fn regress(&mut self, request: &RegressionRequest) -> Result<Option<RegressionReport>> {
        let _span = info_span!("regress", target = request.target().column()).entered();
        let (dataset, rows) = self.normalized()?;
        require_metrics(&dataset, &request.columns())?;
        regression::fit(&rows, request, &self.config.regression)
    }

    /// First `rows` normalized records, in file order
    ///
    /// # Errors
    ///
    /// Returns a load error
    pub fn preview(&mut self, rows: usize) -> Result<Vec<NormalizedRecord>> {
        let (_, mut records) = self.normalized()?;
        records.truncate(rows);
        Ok(records)
    }

    fn normalized(&mut self) -> Result<(Arc<Dataset>, Vec<NormalizedRecord>)> {
        let dataset = self.dataset()?;
        let rows = normalize(dataset.records());
        Ok((dataset, rows))
    }
}

fn require_metrics(dataset: &Dataset, metrics: &[Metric]) -> Result<()> {
    match metrics.iter().find(|&&m| !dataset.shape().supports(m)) {
        Some(&metric) => Err(Error::UnsupportedMetric { metric }),
        None => Ok(()),
    }
}
