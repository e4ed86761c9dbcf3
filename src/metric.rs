//! Enumerated sort metrics and dataset shapes

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Numeric column a leaderboard can be ranked by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Competitive rating (ordinal tier score or raw number)
    Rating,
    /// Kill/death ratio
    KdRatio,
    /// Headshot percentage
    HeadshotPercent,
    /// Average damage per round
    DamageRound,
    /// Ace count
    Aces,
}

impl Metric {
    /// Every metric, in column order
    pub const ALL: [Self; 5] = [
        Self::Rating,
        Self::KdRatio,
        Self::HeadshotPercent,
        Self::DamageRound,
        Self::Aces,
    ];

    /// Spreadsheet column name
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Rating => "rating",
            Self::KdRatio => "kd_ratio",
            Self::HeadshotPercent => "headshot_percent",
            Self::DamageRound => "damage_round",
            Self::Aces => "aces",
        }
    }

    /// Human-readable label for selectors and chart axes
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Rating => "Rating",
            Self::KdRatio => "KD Ratio",
            Self::HeadshotPercent => "Headshot Percentage",
            Self::DamageRound => "Damage/Round",
            Self::Aces => "Aces",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for Metric {
    type Err = String;

    /// Accepts a column name or a display label, case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|m| {
                m.column().eq_ignore_ascii_case(wanted) || m.label().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|m| m.column()).collect();
                format!("unknown metric '{wanted}' (expected one of: {})", known.join(", "))
            })
    }
}

/// Metric columns present in a loaded table
///
/// Datasets differ: some carry only `rating`, `kd_ratio` and
/// `headshot_percent`, others add `damage_round` and `aces`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DatasetShape {
    metrics: Vec<Metric>,
    has_tag: bool,
}

impl DatasetShape {
    /// Shape from the metrics found in a header row
    #[must_use]
    pub fn new(mut metrics: Vec<Metric>, has_tag: bool) -> Self {
        metrics.sort_unstable();
        metrics.dedup();
        Self { metrics, has_tag }
    }

    /// Whether the dataset can be ranked by `metric`
    #[must_use]
    pub fn supports(&self, metric: Metric) -> bool {
        self.metrics.contains(&metric)
    }

    /// Supported metrics in column order
    #[must_use]
    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    /// Whether the optional `tag` column exists
    #[must_use]
    pub const fn has_tag(&self) -> bool {
        self.has_tag
    }
}
