//! In-memory tables as all-text Arrow batches
//!
//! Every column is a non-null `LargeUtf8` array. Row order is source order.

use std::sync::Arc;

use arrow_array::builder::LargeStringBuilder;
use arrow_array::{ArrayRef, LargeStringArray, RecordBatch};
use arrow_schema::SchemaRef;

use crate::error::QueryResult;
use crate::schema::text_schema;
use crate::utils::get_str_column;

/// Row-at-a-time builder for a [`Table`]
///
/// Fields map positionally onto the schema columns. Missing trailing fields
/// become empty strings; surplus fields are dropped.
pub struct TableBuilder {
    name: String,
    schema: SchemaRef,
    builders: Vec<LargeStringBuilder>,
}

impl TableBuilder {
    pub fn new(name: &str, columns: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            schema: text_schema(columns),
            builders: columns.iter().map(|_| LargeStringBuilder::new()).collect(),
        }
    }

    pub fn append_record<R, S>(&mut self, record: R)
    where
        R: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut fields = record.into_iter();
        for builder in self.builders.iter_mut() {
            match fields.next() {
                Some(value) => builder.append_value(value.as_ref()),
                None => builder.append_value(""),
            }
        }
    }

    pub fn finish(mut self) -> QueryResult<Table> {
        let arrays: Vec<ArrayRef> = self
            .builders
            .iter_mut()
            .map(|b| Arc::new(b.finish()) as ArrayRef)
            .collect();
        let batch = RecordBatch::try_new(self.schema, arrays)?;
        Ok(Table::new(self.name, batch))
    }
}

/// One loaded table
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    batch: RecordBatch,
}

impl Table {
    /// Wrap a batch whose columns are already all `LargeUtf8`
    pub fn new(name: impl Into<String>, batch: RecordBatch) -> Self {
        Self {
            name: name.into(),
            batch,
        }
    }

    /// Build a table from records of string fields, mapped positionally to `columns`
    pub fn from_records<I, R, S>(name: &str, columns: &[&str], records: I) -> QueryResult<Self>
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = TableBuilder::new(name, columns);
        for record in records {
            builder.append_record(record);
        }
        builder.finish()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn is_empty(&self) -> bool {
        self.batch.num_rows() == 0
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    /// Typed access to a text column by name
    pub fn column(&self, column: &str) -> QueryResult<&LargeStringArray> {
        get_str_column(&self.name, &self.batch, column)
    }
}
