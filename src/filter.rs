//! Date-window filtering of orders using Arrow compute kernels
//!
//! Dates are compared as strings, so they must be fixed-width, zero-padded
//! and lexically sortable (`YYYY-MM-DD`). This is not validated.

use ahash::AHashMap;
use arrow::array::{BooleanArray, LargeStringArray, Scalar};
use arrow::compute;
use tracing::debug;

use crate::error::QueryResult;
use crate::table::Table;

/// Mask of rows with `start_date <= date < end_date`
pub fn create_date_window_mask(
    dates: &LargeStringArray,
    start_date: &str,
    end_date: &str,
) -> QueryResult<BooleanArray> {
    let start = Scalar::new(LargeStringArray::from(vec![start_date]));
    let end = Scalar::new(LargeStringArray::from(vec![end_date]));

    let from_start = compute::kernels::cmp::gt_eq(dates, &start)?;
    let before_end = compute::kernels::cmp::lt(dates, &end)?;

    Ok(compute::and(&from_start, &before_end)?)
}

/// o_orderkey -> o_custkey for orders inside the date window
#[derive(Debug, Default)]
pub struct OrderIndex<'a> {
    order_customer: AHashMap<&'a str, &'a str>,
}

impl<'a> OrderIndex<'a> {
    /// Scan `orders` once, keeping orders dated in `[start_date, end_date)`
    ///
    /// An empty window is not an error; it just produces an empty index.
    pub fn build(orders: &'a Table, start_date: &str, end_date: &str) -> QueryResult<Self> {
        let keys = orders.column("o_orderkey")?;
        let customers = orders.column("o_custkey")?;
        let dates = orders.column("o_orderdate")?;

        let mask = create_date_window_mask(dates, start_date, end_date)?;

        let mut order_customer = AHashMap::with_capacity(mask.true_count());
        for (i, keep) in mask.values().iter().enumerate() {
            if keep {
                order_customer.insert(keys.value(i), customers.value(i));
            }
        }

        debug!(
            start_date,
            end_date,
            scanned = orders.num_rows(),
            kept = order_customer.len(),
            "built order index"
        );

        Ok(Self { order_customer })
    }

    /// Customer of an order in the window
    #[inline]
    pub fn customer_of(&self, order_key: &str) -> Option<&'a str> {
        self.order_customer.get(order_key).copied()
    }

    pub fn len(&self) -> usize {
        self.order_customer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order_customer.is_empty()
    }
}
