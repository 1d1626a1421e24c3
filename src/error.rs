//! Error types for the Q5 engine.
//!
//! Every fallible operation returns `QueryResult<T>`; bad input never panics.

use std::num::ParseFloatError;
use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for loading and executing TPC-H Query 5.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The requested region name matches no row of the region table
    #[error("region '{0}' not found")]
    RegionNotFound(String),

    /// l_extendedprice or l_discount is not a number
    #[error("invalid numeric value '{value}' in {column} at lineitem row {row}: {source}")]
    NumericParse {
        column: &'static str,
        row: usize,
        value: String,
        #[source]
        source: ParseFloatError,
    },

    /// An order in the date window references a customer missing from the customer table
    #[error("input inconsistency: order '{order_key}' references unknown customer '{customer_key}'")]
    MissingCustomer {
        order_key: String,
        customer_key: String,
    },

    /// A partial aggregate is keyed by a nation outside the resolved region
    #[error("input inconsistency: nation '{0}' has no resolved name")]
    UnknownNation(String),

    #[error("thread count must be at least 1, got {0}")]
    InvalidThreadCount(usize),

    /// Neither `<table>.tbl` nor `<table>.parquet` exists
    #[error("table '{table}' not found in {}", .dir.display())]
    TableNotFound { table: String, dir: PathBuf },

    #[error("column '{column}' not found in table '{table}'")]
    ColumnNotFound { table: String, column: String },

    #[error("worker {0} panicked")]
    WorkerPanicked(usize),

    /// Apache Arrow error (batch construction, casts)
    #[error("arrow error: {source}")]
    Arrow {
        #[from]
        source: arrow::error::ArrowError,
    },

    /// Apache Parquet error (file I/O)
    #[error("parquet error: {source}")]
    Parquet {
        #[from]
        source: parquet::errors::ParquetError,
    },

    /// Standard I/O error
    #[error("io error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

pub type QueryResult<T> = Result<T, QueryError>;
