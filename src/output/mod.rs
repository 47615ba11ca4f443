//! Output module
//!
//! Turns fetched records into files.
//!
//! # Overview
//!
//! This module provides utilities for:
//! - Flattening nested records into rows with `target_*` columns
//! - Inferring ordered Arrow schemas and building RecordBatches
//! - Writing CSV and Parquet exports
//! - Writing raw JSON snapshots
//! - Laying out dated raw and processed directories

mod flatten;
mod layout;
mod schema;
mod writer;

pub use flatten::{
    flatten_record, flatten_records, flatten_value, format_timestamp, TARGET_USERNAME_COLUMN,
    TIMESTAMP_FORMAT, VALUE_COLUMN,
};
pub use layout::{sanitize_file_component, OutputLayout};
pub use schema::{infer_schema, json_to_arrow};
pub use writer::{
    write_csv, write_json_snapshot, write_parquet, write_rows, ExportFormat, ParquetWriter,
    ParquetWriterConfig,
};
