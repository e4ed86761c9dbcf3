//! Storage backend (spreadsheets, Arrow/Parquet)
//!
//! Loading turns a [`Source`] into raw [`PlayerRecord`]s:
//! - Spreadsheets (`.xlsx`, `.xlsm`, `.xlsb`, `.xls`, `.ods`) via calamine
//! - Parquet files via the Arrow reader
//!
//! Columns are located by header name. `name` and `rating` are required;
//! the other metric columns and `tag` are optional and define the
//! [`DatasetShape`]. Ranked results export back to Arrow/Parquet.

mod parquet_io;
mod spreadsheet;

pub use self::parquet_io::{result_schema, result_to_record_batch, write_result_parquet};

use crate::error::DataLoadError;
use crate::metric::{DatasetShape, Metric};
use crate::record::{Cell, PlayerRecord};
use bytes::Bytes;
use std::fmt;
use std::path::{Path, PathBuf};

/// Where a dataset comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// File on disk
    Path(PathBuf),
    /// Uploaded file held in memory
    Upload {
        /// Original file name (used for format detection)
        file_name: String,
        /// File contents
        bytes: Bytes,
    },
}

impl Source {
    /// Source for a file on disk
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    /// Source for an uploaded file
    pub fn upload(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self::Upload {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    fn file_name(&self) -> String {
        match self {
            Self::Path(path) => path.display().to_string(),
            Self::Upload { file_name, .. } => file_name.clone(),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Upload { file_name, bytes } => {
                write!(f, "upload '{file_name}' ({} bytes)", bytes.len())
            }
        }
    }
}

/// File format, detected from the extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Workbook readable by calamine
    Spreadsheet,
    /// Apache Parquet
    Parquet,
}

impl SourceFormat {
    /// Detect the format from a file name
    #[must_use]
    pub fn detect(file_name: &str) -> Option<Self> {
        let extension = Path::new(file_name)
            .extension()?
            .to_str()?
            .to_ascii_lowercase();
        match extension.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Some(Self::Spreadsheet),
            "parquet" | "pq" => Some(Self::Parquet),
            _ => None,
        }
    }
}

/// Raw rows loaded from one source
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    records: Vec<PlayerRecord>,
    shape: DatasetShape,
}

impl Dataset {
    /// Dataset from already-built records and shape
    #[must_use]
    pub const fn new(records: Vec<PlayerRecord>, shape: DatasetShape) -> Self {
        Self { records, shape }
    }

    /// Raw rows in file order
    #[must_use]
    pub fn records(&self) -> &[PlayerRecord] {
        &self.records
    }

    /// Metric columns present
    #[must_use]
    pub const fn shape(&self) -> &DatasetShape {
        &self.shape
    }

    /// Number of rows
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table has no rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Load a dataset
///
/// `sheet` selects a worksheet by name; `None` reads the first sheet.
/// Ignored for Parquet sources.
///
/// # Errors
///
/// - `DataLoadError::NotFound` if a path source does not exist
/// - `DataLoadError::Unreadable` for unsupported formats, parse failures,
///   a missing sheet, or missing `name`/`rating` columns
pub fn load(source: &Source, sheet: Option<&str>) -> Result<Dataset, DataLoadError> {
    if let Source::Path(path) = source {
        if !path.exists() {
            return Err(DataLoadError::NotFound { path: path.clone() });
        }
    }

    let source_name = source.file_name();
    let format = SourceFormat::detect(&source_name).ok_or_else(|| {
        DataLoadError::unreadable(
            &source_name,
            "unsupported file type (expected .xlsx, .xls, .xlsb, .ods or .parquet)",
        )
    })?;

    let table = match source {
        Source::Path(path) => match format {
            SourceFormat::Spreadsheet => spreadsheet::read_path(path, sheet)?,
            SourceFormat::Parquet => parquet_io::read_path(path)?,
        },
        Source::Upload { bytes, .. } => match format {
            SourceFormat::Spreadsheet => spreadsheet::read_bytes(&source_name, bytes, sheet)?,
            SourceFormat::Parquet => parquet_io::read_bytes(&source_name, bytes)?,
        },
    };

    let dataset = table.into_dataset(&source_name)?;
    tracing::info!(
        source = %source,
        rows = dataset.len(),
        metrics = ?dataset.shape().metrics(),
        "loaded dataset"
    );
    Ok(dataset)
}

/// Header row plus untyped cells, before column mapping
#[derive(Debug, Default)]
struct RawTable {
    header: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl RawTable {
    fn column(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }

    fn into_dataset(self, source_name: &str) -> Result<Dataset, DataLoadError> {
        let name_col = self.column("name").ok_or_else(|| {
            DataLoadError::unreadable(source_name, "missing required column 'name'")
        })?;
        if self.column(Metric::Rating.column()).is_none() {
            return Err(DataLoadError::unreadable(
                source_name,
                "missing required column 'rating'",
            ));
        }

        let tag_col = self.column("tag");
        let metric_cols: Vec<(Metric, usize)> = Metric::ALL
            .into_iter()
            .filter_map(|m| self.column(m.column()).map(|idx| (m, idx)))
            .collect();

        let take = |row: &[Cell], idx: usize| row.get(idx).cloned().unwrap_or_default();

        let records: Vec<PlayerRecord> = self
            .rows
            .iter()
            .filter(|row| !row.iter().all(Cell::is_empty))
            .map(|row| {
                let mut record = PlayerRecord::named(take(row, name_col));
                if let Some(idx) = tag_col {
                    record.tag = take(row, idx);
                }
                for &(metric, idx) in &metric_cols {
                    *record.cell_mut(metric) = take(row, idx);
                }
                record
            })
            .collect();

        let shape = DatasetShape::new(
            metric_cols.iter().map(|&(m, _)| m).collect(),
            tag_col.is_some(),
        );
        Ok(Dataset::new(records, shape))
    }
}
