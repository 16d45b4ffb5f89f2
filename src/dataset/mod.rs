//! Dataset ingestion and exploration
//!
//! - `csv_loader`: CSV parsing with automatic header-to-schema mapping
//! - `demo`: seeded synthetic dataset with known deviation structure
//! - `summary`: column statistics, rock-type balance and correlations

pub mod csv_loader;
pub mod demo;
pub mod summary;

pub use csv_loader::{
    load_records, parse_override, read_records, ColumnMapping, LoadSummary, LoadedDataset,
    SchemaField,
};
pub use demo::{generate, write_csv, DemoOptions, CSV_HEADER, DEMO_ROCK_TYPES};
pub use summary::{summarize, Correlation, DatasetSummary};
