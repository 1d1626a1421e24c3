//! Splitting the fact table into contiguous worker ranges

use std::ops::Range;

use crate::error::{QueryError, QueryResult};

/// Split `[0, total)` into `workers` contiguous ranges
///
/// Each range holds `total / workers` rows and the last one also takes the
/// remainder. With more workers than rows the leading ranges are empty.
pub fn partition_ranges(total: usize, workers: usize) -> QueryResult<Vec<Range<usize>>> {
    if workers == 0 {
        return Err(QueryError::InvalidThreadCount(workers));
    }

    let chunk = total / workers;
    let ranges = (0..workers)
        .map(|t| {
            let start = t * chunk;
            let end = if t == workers - 1 { total } else { start + chunk };
            start..end
        })
        .collect();

    Ok(ranges)
}
