//! Player records: raw spreadsheet rows and their normalized form

use crate::metric::Metric;
use serde::{Deserialize, Serialize};

/// Raw spreadsheet cell
///
/// Spreadsheet columns are dynamically typed; a cell keeps whatever the
/// reader produced until [`crate::normalize`] coerces it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    /// Blank cell, explicit null, or reader error value
    #[default]
    Empty,
    /// Text as entered
    Text(String),
    /// Numeric cell (integers widened to f64)
    Number(f64),
}

impl Cell {
    /// Coerce to a finite number
    ///
    /// Text is trimmed and parsed; anything unparseable, NaN or infinite is
    /// `None`. `-0.0` comes back as `0.0` so equal values compare equal.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        let value = match self {
            Self::Empty => return None,
            Self::Number(v) => *v,
            Self::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value + 0.0)
    }

    /// Coerce to non-blank text
    ///
    /// Whole numbers render without a fractional part so numeric player IDs
    /// stay readable (`1234`, not `1234.0`).
    #[must_use]
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Empty => None,
            Self::Text(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Self::Number(v) if !v.is_finite() => None,
            Self::Number(v) if v.fract() == 0.0 => Some(format!("{v:.0}")),
            Self::Number(v) => Some(v.to_string()),
        }
    }

    /// Whether the cell holds nothing usable
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::Number(_) => false,
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<Option<f64>> for Cell {
    fn from(v: Option<f64>) -> Self {
        v.map_or(Self::Empty, Self::Number)
    }
}

/// One row of input data, cells as read
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    /// Player identifier (required for ranking)
    pub name: Cell,
    /// Optional team/clan tag
    pub tag: Cell,
    /// Categorical tier string or numeric rating
    pub rating: Cell,
    /// Kill/death ratio
    pub kd_ratio: Cell,
    /// Headshot percentage
    pub headshot_percent: Cell,
    /// Damage per round
    pub damage_round: Cell,
    /// Ace count
    pub aces: Cell,
}

impl PlayerRecord {
    /// Record with only a name set
    pub fn named(name: impl Into<Cell>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the tag cell
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<Cell>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Set a metric cell
    #[must_use]
    pub fn with(mut self, metric: Metric, cell: impl Into<Cell>) -> Self {
        *self.cell_mut(metric) = cell.into();
        self
    }

    /// Raw cell for a metric
    #[must_use]
    pub const fn cell(&self, metric: Metric) -> &Cell {
        match metric {
            Metric::Rating => &self.rating,
            Metric::KdRatio => &self.kd_ratio,
            Metric::HeadshotPercent => &self.headshot_percent,
            Metric::DamageRound => &self.damage_round,
            Metric::Aces => &self.aces,
        }
    }

    /// Mutable raw cell for a metric
    pub fn cell_mut(&mut self, metric: Metric) -> &mut Cell {
        match metric {
            Metric::Rating => &mut self.rating,
            Metric::KdRatio => &mut self.kd_ratio,
            Metric::HeadshotPercent => &mut self.headshot_percent,
            Metric::DamageRound => &mut self.damage_round,
            Metric::Aces => &mut self.aces,
        }
    }
}

/// Player record after rating mapping and numeric coercion
///
/// `None` means missing: the row is excluded from anything that needs the
/// field, never treated as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    /// Player identifier
    pub name: String,
    /// Optional team/clan tag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Ordinal tier score or numeric rating
    pub rating: Option<f64>,
    /// Kill/death ratio
    pub kd_ratio: Option<f64>,
    /// Headshot percentage
    pub headshot_percent: Option<f64>,
    /// Damage per round
    pub damage_round: Option<f64>,
    /// Ace count
    pub aces: Option<f64>,
}

impl NormalizedRecord {
    /// Coerced value for a metric
    #[must_use]
    pub const fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Rating => self.rating,
            Metric::KdRatio => self.kd_ratio,
            Metric::HeadshotPercent => self.headshot_percent,
            Metric::DamageRound => self.damage_round,
            Metric::Aces => self.aces,
        }
    }

    /// Whether every listed metric is present
    #[must_use]
    pub fn is_complete_for(&self, metrics: &[Metric]) -> bool {
        metrics.iter().all(|&m| self.value(m).is_some())
    }
}

impl From<&NormalizedRecord> for PlayerRecord {
    fn from(record: &NormalizedRecord) -> Self {
        Self {
            name: Cell::Text(record.name.clone()),
            tag: record.tag.clone().map_or(Cell::Empty, Cell::Text),
            rating: record.rating.into(),
            kd_ratio: record.kd_ratio.into(),
            headshot_percent: record.headshot_percent.into(),
            damage_round: record.damage_round.into(),
            aces: record.aces.into(),
        }
    }
}
