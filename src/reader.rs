//! Table ingestion from dbgen `.tbl` files or Parquet
//!
//! Both paths produce all-text [`Table`]s with exactly the schema columns,
//! so the engine never sees a format difference.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use arrow::array::{ArrayRef, AsArray, LargeStringArray, RecordBatch};
use arrow::compute::cast;
use arrow_schema::DataType;
use arrow_select::concat::concat_batches;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ProjectionMask;
use tracing::{debug, info, warn};

use crate::error::{QueryError, QueryResult};
use crate::schema::*;
use crate::table::{Table, TableBuilder};
use crate::utils::fill_nulls_with_empty;

const TBL_DELIMITER: char = '|';

/// Rows per Parquet batch
const PARQUET_BATCH_SIZE: usize = 8192;

/// The six Q5 source tables
#[derive(Debug, Clone)]
pub struct TpchTables {
    pub customer: Table,
    pub orders: Table,
    pub lineitem: Table,
    pub supplier: Table,
    pub nation: Table,
    pub region: Table,
}

/// Read a pipe-delimited dbgen file
///
/// Fields map positionally onto `columns`. The trailing `|` dbgen writes
/// yields an extra empty field which is dropped; short lines are padded
/// with empty strings.
pub fn read_tbl(path: &Path, name: &str, columns: &[&str]) -> QueryResult<Table> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut builder = TableBuilder::new(name, columns);

    let mut line = String::new();
    while reader.read_line(&mut line)? > 0 {
        let record = line.trim_end_matches(|c: char| c == '\n' || c == '\r');
        if !record.is_empty() {
            builder.append_record(record.split(TBL_DELIMITER));
        }
        line.clear();
    }

    builder.finish()
}

/// Read a Parquet file with column projection, rendering every column as text
pub fn read_parquet(path: &Path, name: &str, columns: &[&str]) -> QueryResult<Table> {
    let file = File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;

    let parquet_schema = builder.parquet_schema();
    let arrow_schema = builder.schema().clone();

    let projection_indices: Vec<usize> = columns
        .iter()
        .filter_map(|col| arrow_schema.fields().iter().position(|f| f.name() == *col))
        .collect();

    if projection_indices.is_empty() {
        let rows = usize::try_from(builder.metadata().file_metadata().num_rows()).unwrap_or(0);
        warn!(table = name, path = %path.display(), rows, "no schema columns in parquet file");
        return Ok(Table::new(name, blank_text_batch(columns, rows)?));
    }

    let projection = ProjectionMask::roots(parquet_schema, projection_indices);
    let reader = builder
        .with_projection(projection)
        .with_batch_size(PARQUET_BATCH_SIZE)
        .build()?;

    let schema = text_schema(columns);
    let mut batches = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        if batch.num_rows() == 0 {
            continue;
        }
        batches.push(to_text_batch(&batch, columns)?);
    }

    let batch = concat_batches(&schema, &batches)?;
    Ok(Table::new(name, batch))
}

/// A batch of `rows` empty strings in every schema column
fn blank_text_batch(columns: &[&str], rows: usize) -> QueryResult<RecordBatch> {
    let blank: ArrayRef = Arc::new(LargeStringArray::from(vec![""; rows]));
    let arrays = columns.iter().map(|_| Arc::clone(&blank)).collect();
    Ok(RecordBatch::try_new(text_schema(columns), arrays)?)
}

/// Cast each schema column to non-null LargeUtf8; absent columns become empty strings
fn to_text_batch(batch: &RecordBatch, columns: &[&str]) -> QueryResult<RecordBatch> {
    let rows = batch.num_rows();
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(columns.len());

    for col in columns {
        let text = match batch.schema().index_of(col) {
            Ok(idx) => {
                let casted = cast(batch.column(idx), &DataType::LargeUtf8)?;
                fill_nulls_with_empty(casted.as_string::<i64>())
            }
            Err(_) => LargeStringArray::from(vec![""; rows]),
        };
        arrays.push(Arc::new(text) as ArrayRef);
    }

    Ok(RecordBatch::try_new(text_schema(columns), arrays)?)
}

/// Locate `<dir>/<name>.tbl`, falling back to `<dir>/<name>.parquet`
fn locate(dir: &Path, name: &str) -> Option<(PathBuf, bool)> {
    let tbl = dir.join(format!("{name}.tbl"));
    if tbl.is_file() {
        return Some((tbl, false));
    }
    let parquet = dir.join(format!("{name}.parquet"));
    if parquet.is_file() {
        return Some((parquet, true));
    }
    None
}

/// Load one table from `dir` in whichever format is present
pub fn load_table(dir: &Path, name: &str, columns: &[&str]) -> QueryResult<Table> {
    let (path, is_parquet) = locate(dir, name).ok_or_else(|| QueryError::TableNotFound {
        table: name.to_string(),
        dir: dir.to_path_buf(),
    })?;

    let start = Instant::now();
    let table = if is_parquet {
        read_parquet(&path, name, columns)?
    } else {
        read_tbl(&path, name, columns)?
    };
    debug!(
        table = name,
        path = %path.display(),
        rows = table.num_rows(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "loaded table"
    );
    Ok(table)
}

/// Load all six tables; any failure aborts before the query can start
pub fn load_tpch_tables(dir: &Path) -> QueryResult<TpchTables> {
    let start = Instant::now();
    let tables = TpchTables {
        customer: load_table(dir, CUSTOMER, CUSTOMER_COLUMNS)?,
        orders: load_table(dir, ORDERS, ORDERS_COLUMNS)?,
        lineitem: load_table(dir, LINEITEM, LINEITEM_COLUMNS)?,
        supplier: load_table(dir, SUPPLIER, SUPPLIER_COLUMNS)?,
        nation: load_table(dir, NATION, NATION_COLUMNS)?,
        region: load_table(dir, REGION, REGION_COLUMNS)?,
    };

    info!(
        dir = %dir.display(),
        lineitem_rows = tables.lineitem.num_rows(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "loaded TPC-H tables"
    );
    Ok(tables)
}
