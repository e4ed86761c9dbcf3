//! Rating-category mapping and numeric coercion
//!
//! Turns raw [`PlayerRecord`]s into [`NormalizedRecord`]s:
//! - Categorical ratings map to a fixed ordinal score by substring match,
//!   first match wins in [`RatingTier::PRIORITY`] order
//! - Cells that fail numeric coercion become missing, not errors
//! - Rows without a usable name are dropped

use crate::metric::Metric;
use crate::record::{Cell, NormalizedRecord, PlayerRecord};
use serde::Serialize;

/// Competitive tier recognised inside a rating string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RatingTier {
    /// 5.0
    Radiant,
    /// 4.0
    Immortal,
    /// 3.0
    Diamond,
    /// 2.0
    Platinum,
    /// 1.0
    Gold,
}

impl RatingTier {
    /// Match order: a string containing several tier names takes the first
    pub const PRIORITY: [Self; 5] = [
        Self::Radiant,
        Self::Immortal,
        Self::Diamond,
        Self::Platinum,
        Self::Gold,
    ];

    /// Tier name as it appears in raw data
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Radiant => "Radiant",
            Self::Immortal => "Immortal",
            Self::Diamond => "Diamond",
            Self::Platinum => "Platinum",
            Self::Gold => "Gold",
        }
    }

    /// Ordinal score
    #[must_use]
    pub const fn score(self) -> f64 {
        match self {
            Self::Radiant => 5.0,
            Self::Immortal => 4.0,
            Self::Diamond => 3.0,
            Self::Platinum => 2.0,
            Self::Gold => 1.0,
        }
    }

    /// First tier whose name occurs anywhere in `raw` (case-sensitive)
    #[must_use]
    pub fn detect(raw: &str) -> Option<Self> {
        Self::PRIORITY.into_iter().find(|tier| raw.contains(tier.name()))
    }
}

/// Normalize a single rating cell
///
/// Numeric cells pass through. Text is matched against the tier names
/// first; text with no tier name that still parses as a number (`"3.5"`)
/// is kept as that number. Everything else is missing.
#[must_use]
pub fn normalize_rating(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Empty | Cell::Number(_) => cell.as_number(),
        Cell::Text(raw) => RatingTier::detect(raw)
            .map(RatingTier::score)
            .or_else(|| cell.as_number()),
    }
}

/// Normalize one record, `None` if it has no usable name
#[must_use]
pub fn normalize_record(record: &PlayerRecord) -> Option<NormalizedRecord> {
    let name = record.name.as_text()?;
    Some(NormalizedRecord {
        name,
        tag: record.tag.as_text(),
        rating: normalize_rating(&record.rating),
        kd_ratio: record.kd_ratio.as_number(),
        headshot_percent: record.headshot_percent.as_number(),
        damage_round: record.damage_round.as_number(),
        aces: record.aces.as_number(),
    })
}

/// Normalize a table, preserving row order
///
/// Coercion failures are absorbed: the cell becomes missing and the count
/// is logged at debug level.
#[must_use]
pub fn normalize(records: &[PlayerRecord]) -> Vec<NormalizedRecord> {
    let mut nameless = 0usize;
    let mut coercion_failures = 0usize;

    let normalized: Vec<NormalizedRecord> = records
        .iter()
        .filter_map(|record| {
            let Some(out) = normalize_record(record) else {
                nameless += 1;
                return None;
            };
            coercion_failures += Metric::ALL
                .iter()
                .filter(|&&m| !record.cell(m).is_empty() && out.value(m).is_none())
                .count();
            Some(out)
        })
        .collect();

    if nameless > 0 {
        tracing::debug!(rows = nameless, "dropped rows without a player name");
    }
    if coercion_failures > 0 {
        tracing::debug!(cells = coercion_failures, "cells failed numeric coercion, treated as missing");
    }
    normalized
}

/// Drop rows missing any of `required` metrics
///
/// Strict dropna: partial rows never reach ranking or regression.
#[must_use]
pub fn retain_complete(records: &[NormalizedRecord], required: &[Metric]) -> Vec<NormalizedRecord> {
    records
        .iter()
        .filter(|r| r.is_complete_for(required))
        .cloned()
        .collect()
}
