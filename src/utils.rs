//! Utility functions for column access and value parsing

use arrow::array::{Array, LargeStringArray, RecordBatch};

use crate::error::{QueryError, QueryResult};

/// Get a LargeUtf8 column by name
pub fn get_str_column<'a>(
    table: &str,
    batch: &'a RecordBatch,
    name: &str,
) -> QueryResult<&'a LargeStringArray> {
    let not_found = || QueryError::ColumnNotFound {
        table: table.to_string(),
        column: name.to_string(),
    };

    let idx = batch
        .schema()
        .fields()
        .iter()
        .position(|f| f.name() == name)
        .ok_or_else(not_found)?;

    batch
        .column(idx)
        .as_any()
        .downcast_ref::<LargeStringArray>()
        .ok_or_else(not_found)
}

/// Parse a decimal text field; surrounding whitespace is tolerated, anything else is an error
#[inline]
pub fn parse_f64(column: &'static str, row: usize, value: &str) -> QueryResult<f64> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|source| QueryError::NumericParse {
            column,
            row,
            value: value.to_string(),
            source,
        })
}

/// Copy a string array with nulls replaced by empty strings
pub fn fill_nulls_with_empty(array: &LargeStringArray) -> LargeStringArray {
    if array.null_count() == 0 {
        return array.clone();
    }
    array.iter().map(|v| Some(v.unwrap_or(""))).collect()
}
