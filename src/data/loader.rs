//! Series Loader Module
//! Reads afl-fuzz plot_data files (or plain CSV exports) into a StatsSeries
//! using Polars.

use crate::data::series::StatsSeries;
use log::warn;
use polars::prelude::*;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Column names accepted as the sample timestamp.
const TIMESTAMP_COLUMNS: [&str; 2] = ["last_update", "unix_time"];

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] PolarsError),
    #[error("No timestamp column (`last_update` or `unix_time`); available: {0}")]
    MissingTimestamp(String),
    #[error("Column `{name}` not found; available: {available}")]
    MissingColumn {
        name: &'static str,
        available: String,
    },
    #[error("No samples in input")]
    Empty,
}

/// Parses plot_data/CSV text into the four counter sequences.
pub struct SeriesLoader;

impl SeriesLoader {
    /// Load a plot_data or CSV file from disk.
    pub fn load(path: &Path) -> Result<StatsSeries, LoaderError> {
        let raw = fs::read_to_string(path).map_err(|source| LoaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&raw)
    }

    /// Parse plot_data or CSV text.
    ///
    /// Rows with a missing timestamp are dropped; missing counter cells
    /// become gaps (`None`).
    pub fn parse(raw: &str) -> Result<StatsSeries, LoaderError> {
        let normalized = Self::normalize(raw);
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(10_000))
            .with_ignore_errors(true)
            .into_reader_with_file_handle(Cursor::new(normalized.into_bytes()))
            .finish()?;
        Self::extract(&df)
    }

    /// Undo the afl-fuzz plot_data formatting: the header line starts with
    /// `# ` and fields are separated by `, ` instead of `,`.
    fn normalize(raw: &str) -> String {
        let mut out = String::with_capacity(raw.len());
        let mut lines = raw.lines();
        if let Some(first) = lines.next() {
            let header = first.trim_start();
            let header = header.strip_prefix('#').map(str::trim_start).unwrap_or(header);
            out.push_str(&header.replace(", ", ","));
        }
        for line in lines {
            out.push('\n');
            out.push_str(&line.replace(", ", ","));
        }
        out
    }

    fn extract(df: &DataFrame) -> Result<StatsSeries, LoaderError> {
        let ts_name = Self::find_column(df, &TIMESTAMP_COLUMNS)
            .ok_or_else(|| LoaderError::MissingTimestamp(Self::available_columns(df)))?;
        let ts_col = df.column(&ts_name)?.cast(&DataType::Int64)?;
        let timestamps: Vec<Option<i64>> = ts_col.i64()?.into_iter().collect();

        let pending_total = Self::counter_column(df, "pending_total")?;
        let pending_favs = Self::counter_column(df, "pending_favs")?;
        let unique_crashes = Self::counter_column(df, "unique_crashes")?;
        let unique_hangs = Self::counter_column(df, "unique_hangs")?;

        let mut series = StatsSeries::default();
        for i in 0..df.height() {
            match timestamps[i] {
                Some(ts) => series.push_sample(
                    ts,
                    pending_total[i],
                    pending_favs[i],
                    unique_crashes[i],
                    unique_hangs[i],
                ),
                None => warn!("Dropping row {} with missing timestamp", i),
            }
        }

        if series.is_empty() {
            return Err(LoaderError::Empty);
        }
        Ok(series)
    }

    /// Extract one counter column as floats, keeping nulls as gaps.
    fn counter_column(
        df: &DataFrame,
        name: &'static str,
    ) -> Result<Vec<Option<f64>>, LoaderError> {
        let column = Self::find_column(df, &[name]).ok_or_else(|| LoaderError::MissingColumn {
            name,
            available: Self::available_columns(df),
        })?;
        let values = df.column(&column)?.cast(&DataType::Float64)?;
        Ok(values.f64()?.into_iter().collect())
    }

    /// Find a column whose (trimmed) name matches one of `names`.
    fn find_column(df: &DataFrame, names: &[&str]) -> Option<String> {
        df.get_column_names()
            .iter()
            .map(|s| s.to_string())
            .find(|column| names.contains(&column.trim()))
    }

    fn available_columns(df: &DataFrame) -> String {
        df.get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
