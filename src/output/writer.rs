//! Export writers
//!
//! Tabular exports (CSV, Parquet) from Arrow RecordBatches, and pretty JSON
//! snapshots of raw API records.

use super::schema::json_to_arrow;
use crate::error::{Error, Result};
use arrow::datatypes::Schema;
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Tabular export format
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Comma-separated values with a header row
    #[default]
    Csv,
    /// Snappy-compressed Parquet
    Parquet,
}

impl ExportFormat {
    /// File extension, without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Parquet => "parquet",
        }
    }
}

/// Configuration for Parquet writer
#[derive(Debug, Clone)]
pub struct ParquetWriterConfig {
    compression: Compression,
    row_group_size: usize,
}

impl Default for ParquetWriterConfig {
    fn default() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: 1024 * 1024,
        }
    }
}

impl ParquetWriterConfig {
    fn build_properties(&self) -> WriterProperties {
        WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build()
    }
}

/// Parquet file writer
pub struct ParquetWriter {
    writer: ArrowWriter<File>,
    rows_written: usize,
}

impl ParquetWriter {
    /// Create a new Parquet writer
    pub fn new(
        path: impl AsRef<Path>,
        schema: &Schema,
        config: &ParquetWriterConfig,
    ) -> Result<Self> {
        let file = File::create(path.as_ref()).map_err(|e| Error::Output {
            message: format!("Failed to create file: {e}"),
        })?;

        let props = config.build_properties();
        let writer =
            ArrowWriter::try_new(file, Arc::new(schema.clone()), Some(props)).map_err(|e| {
                Error::Output {
                    message: format!("Failed to create Parquet writer: {e}"),
                }
            })?;

        Ok(Self {
            writer,
            rows_written: 0,
        })
    }

    /// Write a RecordBatch to the file
    pub fn write(&mut self, batch: &RecordBatch) -> Result<()> {
        self.writer.write(batch).map_err(|e| Error::Output {
            message: format!("Failed to write batch: {e}"),
        })?;

        self.rows_written += batch.num_rows();
        Ok(())
    }

    /// Close the writer and finalize the file
    pub fn close(self) -> Result<usize> {
        let rows = self.rows_written;
        self.writer.close().map_err(|e| Error::Output {
            message: format!("Failed to close Parquet writer: {e}"),
        })?;
        Ok(rows)
    }
}

/// Write a RecordBatch as snappy Parquet; returns the number of rows written
pub fn write_parquet(path: impl AsRef<Path>, batch: &RecordBatch) -> Result<usize> {
    let config = ParquetWriterConfig::default();
    let mut writer = ParquetWriter::new(path, batch.schema().as_ref(), &config)?;
    writer.write(batch)?;
    writer.close()
}

/// Write a RecordBatch as CSV with a header row; returns the number of rows written
pub fn write_csv(path: impl AsRef<Path>, batch: &RecordBatch) -> Result<usize> {
    let path = path.as_ref();
    let file = File::create(path)
        .map_err(|e| Error::output(format!("Failed to create {}: {e}", path.display())))?;

    let mut writer = arrow::csv::WriterBuilder::new()
        .with_header(true)
        .build(BufWriter::new(file));
    writer.write(batch)?;

    let mut inner = writer.into_inner();
    inner.flush()?;
    Ok(batch.num_rows())
}

/// Convert flat rows and write them in `format`, creating parent directories
pub fn write_rows(
    path: impl AsRef<Path>,
    rows: &[serde_json::Value],
    format: ExportFormat,
) -> Result<usize> {
    let path = path.as_ref();
    ensure_parent(path)?;

    let batch = json_to_arrow(rows, None)?;
    let written = match format {
        ExportFormat::Csv => write_csv(path, &batch)?,
        ExportFormat::Parquet => write_parquet(path, &batch)?,
    };

    debug!("Wrote {written} rows to {}", path.display());
    Ok(written)
}

/// Write a value as pretty-printed UTF-8 JSON, creating parent directories
pub fn write_json_snapshot<T: Serialize + ?Sized>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let path = path.as_ref();
    ensure_parent(path)?;

    let file = File::create(path)
        .map_err(|e| Error::output(format!("Failed to create {}: {e}", path.display())))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;

    debug!("Wrote snapshot {}", path.display());
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => Ok(fs::create_dir_all(parent)?),
        _ => Ok(()),
    }
}
