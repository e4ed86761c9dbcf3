//! # statboard: Player Statistics Leaderboards
//!
//! Loads a spreadsheet of player statistics, maps categorical competitive
//! tiers to ordinal scores, and produces stable Top-N leaderboards, box-plot
//! summaries and least-squares fits.
//!
//! ## Pipeline
//!
//! ```text
//! Source ─load─▶ PlayerRecord ─normalize─▶ NormalizedRecord ─retain_complete─▶ rank ─▶ RankingResult
//! ```
//!
//! - **Missing is never zero**: unmatched tiers, stray text and non-finite
//!   numbers become missing, and missing rows are excluded from results
//! - **Stable ranking**: equal values keep file order
//! - **Explicit caching**: [`session::Session`] owns a single-entry cache
//!   keyed by source identity
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use statboard::metric::Metric;
//! use statboard::normalize::normalize;
//! use statboard::rank::rank;
//! use statboard::storage::{load, Source};
//!
//! let dataset = load(&Source::path("cleaned_dataset.xlsx"), None)?;
//! let rows = normalize(dataset.records());
//! let top = rank(&rows, Metric::HeadshotPercent, 10)?;
//!
//! for (pos, player, hs) in top.entries() {
//!     println!("{pos:>2}. {:<16} {hs:.1}%", player.name);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod cache;
pub mod config;
pub mod error;
pub mod metric;
pub mod normalize;
pub mod rank;
pub mod record;
pub mod regression;
pub mod session;
pub mod stats;
pub mod storage;
pub mod topk;

pub use error::{DataLoadError, Error, Result};
