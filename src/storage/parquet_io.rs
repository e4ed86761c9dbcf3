//! Parquet sources and Arrow/Parquet export of ranked results

use super::RawTable;
use crate::error::DataLoadError;
use crate::metric::Metric;
use crate::rank::RankingResult;
use crate::record::Cell;
use crate::{Error, Result};
use arrow::array::{Array, ArrayRef, Float64Array, StringArray, UInt32Array};
use arrow::record_batch::RecordBatch;
use arrow::compute::cast;
use arrow::datatypes::{DataType, Field, Schema};
use bytes::Bytes;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::file::reader::ChunkReader;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

/// Read every record batch of a Parquet file on disk
pub(super) fn read_path(path: &Path) -> std::result::Result<RawTable, DataLoadError> {
    let source_name = path.display().to_string();
    let file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            DataLoadError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            DataLoadError::unreadable(&source_name, format!("failed to open Parquet file: {e}"))
        }
    })?;
    read_chunks(file, &source_name)
}

/// Read an uploaded Parquet file
pub(super) fn read_bytes(
    source_name: &str,
    bytes: &Bytes,
) -> std::result::Result<RawTable, DataLoadError> {
    read_chunks(bytes.clone(), source_name)
}

fn read_chunks<R: ChunkReader + 'static>(
    reader: R,
    source_name: &str,
) -> std::result::Result<RawTable, DataLoadError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(reader).map_err(|e| {
        DataLoadError::unreadable(source_name, format!("failed to parse Parquet file: {e}"))
    })?;
    let mut table = RawTable {
        header: builder
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect(),
        ..RawTable::default()
    };
    let reader = builder.build().map_err(|e| {
        DataLoadError::unreadable(source_name, format!("failed to create Parquet reader: {e}"))
    })?;

    for batch in reader {
        let batch = batch.map_err(|e| {
            DataLoadError::unreadable(source_name, format!("failed to read record batch: {e}"))
        })?;
        append_batch(&mut table, &batch)
            .map_err(|e| DataLoadError::unreadable(source_name, e.to_string()))?;
    }
    Ok(table)
}

/// Append a batch row-wise as untyped cells
///
/// Numeric columns become numbers; everything else is cast to text.
fn append_batch(table: &mut RawTable, batch: &RecordBatch) -> Result<()> {
    let mut columns: Vec<Vec<Cell>> = Vec::with_capacity(batch.num_columns());
    for column in batch.columns() {
        columns.push(column_cells(column)?);
    }

    for row in 0..batch.num_rows() {
        table
            .rows
            .push(columns.iter().map(|col| col[row].clone()).collect());
    }
    Ok(())
}

fn column_cells(column: &ArrayRef) -> Result<Vec<Cell>> {
    if column.data_type().is_numeric() {
        let floats = cast(column, &DataType::Float64)?;
        let floats = floats
            .as_any()
            .downcast_ref::<Float64Array>()
            .ok_or_else(|| Error::Export("Failed to downcast cast column to Float64Array".to_string()))?;
        Ok(floats.iter().map(Cell::from).collect())
    } else {
        let strings = cast(column, &DataType::Utf8)?;
        let strings = strings
            .as_any()
            .downcast_ref::<StringArray>()
            .ok_or_else(|| Error::Export("Failed to downcast cast column to StringArray".to_string()))?;
        Ok(strings
            .iter()
            .map(|s| s.map_or(Cell::Empty, Cell::from))
            .collect())
    }
}

/// Arrow schema of an exported ranking
#[must_use]
pub fn result_schema() -> Schema {
    let mut fields = vec![
        Field::new("rank", DataType::UInt32, false),
        Field::new("name", DataType::Utf8, false),
        Field::new("tag", DataType::Utf8, true),
    ];
    fields.extend(
        Metric::ALL
            .iter()
            .map(|m| Field::new(m.column(), DataType::Float64, true)),
    );
    Schema::new(fields)
}

/// Convert a ranking into an Arrow record batch
///
/// Columns: `rank` (1-based), `name`, `tag`, then every metric column;
/// missing values are nulls.
///
/// # Errors
///
/// Returns error if the batch cannot be assembled
pub fn result_to_record_batch(result: &RankingResult) -> Result<RecordBatch> {
    let records = result.records();
    let ranks = UInt32Array::from_iter_values(
        (1..=records.len()).map(|i| u32::try_from(i).unwrap_or(u32::MAX)),
    );
    let names = StringArray::from_iter_values(records.iter().map(|r| r.name.as_str()));
    let tags: StringArray = records.iter().map(|r| r.tag.as_deref()).collect();

    let mut columns: Vec<ArrayRef> = vec![Arc::new(ranks), Arc::new(names), Arc::new(tags)];
    for metric in Metric::ALL {
        let values: Float64Array = records.iter().map(|r| r.value(metric)).collect();
        columns.push(Arc::new(values));
    }

    RecordBatch::try_new(Arc::new(result_schema()), columns)
        .map_err(|e| Error::Export(format!("Failed to create result batch: {e}")))
}

/// Write a ranking to a Parquet file
///
/// # Errors
///
/// Returns error if the file cannot be created or written
pub fn write_result_parquet<P: AsRef<Path>>(result: &RankingResult, path: P) -> Result<()> {
    let batch = result_to_record_batch(result)?;
    let file = File::create(path.as_ref())?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)
        .map_err(|e| Error::Export(format!("Failed to create Parquet writer: {e}")))?;
    writer
        .write(&batch)
        .map_err(|e| Error::Export(format!("Failed to write Parquet batch: {e}")))?;
    writer
        .close()
        .map_err(|e| Error::Export(format!("Failed to finalize Parquet file: {e}")))?;

    tracing::info!(path = %path.as_ref().display(), rows = batch.num_rows(), "exported ranking");
    Ok(())
}
