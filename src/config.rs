//! Query parameters

use crate::error::{QueryError, QueryResult};

/// TPC-H Q5 validation parameters
pub const DEFAULT_REGION: &str = "ASIA";
pub const DEFAULT_START_DATE: &str = "1994-01-01";
pub const DEFAULT_END_DATE: &str = "1995-01-01";

/// Parameters of one Q5 execution
///
/// Dates must be zero-padded `YYYY-MM-DD` strings; they are compared
/// lexically and are not validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryConfig {
    pub region_name: String,
    /// Inclusive lower bound on o_orderdate
    pub start_date: String,
    /// Exclusive upper bound on o_orderdate
    pub end_date: String,
    /// Worker threads for the lineitem scan, at least 1
    pub threads: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            region_name: DEFAULT_REGION.to_string(),
            start_date: DEFAULT_START_DATE.to_string(),
            end_date: DEFAULT_END_DATE.to_string(),
            threads: num_cpus::get(),
        }
    }
}

impl QueryConfig {
    pub fn new(
        region_name: impl Into<String>,
        start_date: impl Into<String>,
        end_date: impl Into<String>,
        threads: usize,
    ) -> QueryResult<Self> {
        let config = Self {
            region_name: region_name.into(),
            start_date: start_date.into(),
            end_date: end_date.into(),
            threads,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn validate(&self) -> QueryResult<()> {
        if self.threads == 0 {
            return Err(QueryError::InvalidThreadCount(self.threads));
        }
        Ok(())
    }
}
