//! Fixed TPC-H column layouts, in dbgen field order

use std::sync::Arc;

use arrow_schema::{DataType, Field, Schema, SchemaRef};

pub const CUSTOMER: &str = "customer";
pub const ORDERS: &str = "orders";
pub const LINEITEM: &str = "lineitem";
pub const SUPPLIER: &str = "supplier";
pub const NATION: &str = "nation";
pub const REGION: &str = "region";

pub const CUSTOMER_COLUMNS: &[&str] = &[
    "c_custkey",
    "c_name",
    "c_address",
    "c_nationkey",
    "c_phone",
    "c_acctbal",
    "c_mktsegment",
    "c_comment",
];

pub const ORDERS_COLUMNS: &[&str] = &[
    "o_orderkey",
    "o_custkey",
    "o_orderstatus",
    "o_totalprice",
    "o_orderdate",
    "o_orderpriority",
    "o_clerk",
    "o_shippriority",
    "o_comment",
];

pub const LINEITEM_COLUMNS: &[&str] = &[
    "l_orderkey",
    "l_partkey",
    "l_suppkey",
    "l_linenumber",
    "l_quantity",
    "l_extendedprice",
    "l_discount",
    "l_tax",
    "l_returnflag",
    "l_linestatus",
    "l_shipdate",
    "l_commitdate",
    "l_receiptdate",
    "l_shipinstruct",
    "l_shipmode",
    "l_comment",
];

pub const SUPPLIER_COLUMNS: &[&str] = &[
    "s_suppkey",
    "s_name",
    "s_address",
    "s_nationkey",
    "s_phone",
    "s_acctbal",
    "s_comment",
];

pub const NATION_COLUMNS: &[&str] = &["n_nationkey", "n_name", "n_regionkey", "n_comment"];

pub const REGION_COLUMNS: &[&str] = &["r_regionkey", "r_name", "r_comment"];

/// All columns are carried as raw text; numeric reads happen where a value is consumed
///
/// 64-bit offsets: a single text column of a large lineitem exceeds 2 GiB.
pub fn text_schema(columns: &[&str]) -> SchemaRef {
    let fields: Vec<Field> = columns
        .iter()
        .map(|name| Field::new(*name, DataType::LargeUtf8, false))
        .collect();
    Arc::new(Schema::new(fields))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_counts() {
        assert_eq!(CUSTOMER_COLUMNS.len(), 8);
        assert_eq!(ORDERS_COLUMNS.len(), 9);
        assert_eq!(LINEITEM_COLUMNS.len(), 16);
        assert_eq!(SUPPLIER_COLUMNS.len(), 7);
        assert_eq!(NATION_COLUMNS.len(), 4);
        assert_eq!(REGION_COLUMNS.len(), 3);
    }

    #[test]
    fn test_text_schema_is_utf8() {
        let schema = text_schema(REGION_COLUMNS);
        assert_eq!(schema.fields().len(), 3);
        assert!(schema.fields().iter().all(|f| f.data_type() == &DataType::LargeUtf8));
        assert_eq!(schema.field(1).name(), "r_name");
    }
}
