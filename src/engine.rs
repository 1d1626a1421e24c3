//! Parallel join-aggregate over lineitem
//!
//! The fact table is split into contiguous ranges, one per worker thread.
//! Each worker runs the Q5 join chain against the read-only lookups and sums
//! into a private map; the shared accumulator is locked only for the merge.

use std::ops::Range;
use std::thread;
use std::time::Instant;

use arrow::array::LargeStringArray;
use tracing::{debug, info, warn};

use crate::aggregator::{LocalRevenue, RevenueAccumulator, RevenueByNation};
use crate::dimension::DimensionMaps;
use crate::error::{QueryError, QueryResult};
use crate::filter::OrderIndex;
use crate::partition::partition_ranges;
use crate::table::Table;
use crate::utils::parse_f64;

/// The four lineitem columns the scan reads
#[derive(Debug, Clone, Copy)]
pub struct LineitemColumns<'a> {
    pub orderkey: &'a LargeStringArray,
    pub suppkey: &'a LargeStringArray,
    pub extendedprice: &'a LargeStringArray,
    pub discount: &'a LargeStringArray,
}

impl<'a> LineitemColumns<'a> {
    pub fn from_table(lineitem: &'a Table) -> QueryResult<Self> {
        Ok(Self {
            orderkey: lineitem.column("l_orderkey")?,
            suppkey: lineitem.column("l_suppkey")?,
            extendedprice: lineitem.column("l_extendedprice")?,
            discount: lineitem.column("l_discount")?,
        })
    }
}

/// Run the join chain over `rows`, summing disc_price per supplier nation key
///
/// Skips rows whose order is outside the window, whose supplier is outside
/// the region, or whose customer and supplier nations differ.
pub fn scan_partition<'a>(
    lineitem: LineitemColumns<'a>,
    rows: Range<usize>,
    dims: &DimensionMaps<'a>,
    orders: &OrderIndex<'a>,
) -> QueryResult<LocalRevenue<'a>> {
    let mut local = LocalRevenue::new();

    for i in rows {
        let order_key = lineitem.orderkey.value(i);
        let Some(cust_key) = orders.customer_of(order_key) else {
            continue;
        };

        let supp_key = lineitem.suppkey.value(i);
        let Some(&supp_nation) = dims.supplier_nation.get(supp_key) else {
            continue;
        };

        let cust_nation =
            *dims
                .customer_nation
                .get(cust_key)
                .ok_or_else(|| QueryError::MissingCustomer {
                    order_key: order_key.to_string(),
                    customer_key: cust_key.to_string(),
                })?;

        if cust_nation != supp_nation {
            continue;
        }

        let price = parse_f64("l_extendedprice", i, lineitem.extendedprice.value(i))?;
        let discount = parse_f64("l_discount", i, lineitem.discount.value(i))?;

        local.add(supp_nation, price * (1.0 - discount));
    }

    Ok(local)
}

/// Join lineitem against the lookups on `threads` workers and merge per nation
///
/// Workers are spawned for this call and joined before it returns; ranges
/// left empty by the partitioning get no thread. If any worker fails, or the
/// OS refuses a thread, the first failure in worker order is returned and no
/// result is produced.
pub fn join_aggregate(
    lineitem: &Table,
    dims: &DimensionMaps<'_>,
    orders: &OrderIndex<'_>,
    threads: usize,
) -> QueryResult<RevenueByNation> {
    let start = Instant::now();
    let columns = LineitemColumns::from_table(lineitem)?;
    let ranges = partition_ranges(lineitem.num_rows(), threads)?;
    let accumulator = RevenueAccumulator::new();

    let outcomes: Vec<QueryResult<usize>> = thread::scope(|s| {
        let mut handles = Vec::with_capacity(ranges.len());
        let mut spawn_error = None;

        for (worker, rows) in ranges.iter().cloned().enumerate() {
            // an empty range contributes nothing, so it gets no thread
            if rows.is_empty() {
                continue;
            }
            let accumulator = &accumulator;
            let spawned = thread::Builder::new()
                .name(format!("q5-worker-{worker}"))
                .spawn_scoped(s, move || -> QueryResult<usize> {
                    debug!(worker, start = rows.start, end = rows.end, "scanning partition");
                    let local = scan_partition(columns, rows, dims, orders)?;
                    accumulator.merge(&local, &dims.nation_names)?;
                    Ok(local.len())
                });

            match spawned {
                Ok(handle) => handles.push((worker, handle)),
                Err(e) => {
                    warn!(worker, threads, error = %e, "failed to spawn worker");
                    spawn_error = Some(QueryError::from(e));
                    break;
                }
            }
        }

        // workers already running are always joined, even after a spawn failure
        let mut outcomes: Vec<QueryResult<usize>> = handles
            .into_iter()
            .map(|(worker, handle)| {
                handle
                    .join()
                    .unwrap_or(Err(QueryError::WorkerPanicked(worker)))
            })
            .collect();
        outcomes.extend(spawn_error.map(Err));
        outcomes
    });

    let mut merged_groups = 0;
    for outcome in outcomes {
        merged_groups += outcome?;
    }

    let result = accumulator.into_result();
    info!(
        threads,
        rows = lineitem.num_rows(),
        merged_groups,
        nations = result.len(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "join-aggregate finished"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimension::resolve_dimensions;
    use crate::schema::*;
    use proptest::prelude::*;

    struct Fixture {
        region: Table,
        nation: Table,
        supplier: Table,
        customer: Table,
        orders: Table,
        lineitem: Table,
    }

    impl Fixture {
        fn run(&self, threads: usize) -> QueryResult<RevenueByNation> {
            let dims = resolve_dimensions(
                "ASIA",
                &self.region,
                &self.nation,
                &self.supplier,
                &self.customer,
            )?;
            let orders = OrderIndex::build(&self.orders, "1994-01-01", "1995-01-01")?;
            join_aggregate(&self.lineitem, &dims, &orders, threads)
        }
    }

    fn lineitem(rows: &[(&str, &str, &str, &str)]) -> Table {
        Table::from_records(
            LINEITEM,
            LINEITEM_COLUMNS,
            rows.iter().map(|(order, supp, price, disc)| {
                vec![*order, "1", *supp, "1", "1", *price, *disc, "0.0"]
            }),
        )
        .unwrap()
    }

    /// ASIA holds INDIA (8) and JAPAN (12); FRANCE (6) is in EUROPE
    fn fixture(lines: &[(&str, &str, &str, &str)]) -> Fixture {
        Fixture {
            region: Table::from_records(REGION, REGION_COLUMNS, [["2", "ASIA"], ["3", "EUROPE"]])
                .unwrap(),
            nation: Table::from_records(
                NATION,
                NATION_COLUMNS,
                [["8", "INDIA", "2"], ["12", "JAPAN", "2"], ["6", "FRANCE", "3"]],
            )
            .unwrap(),
            supplier: Table::from_records(
                SUPPLIER,
                SUPPLIER_COLUMNS,
                [
                    ["1", "Supplier#1", "", "8"],
                    ["2", "Supplier#2", "", "12"],
                    ["3", "Supplier#3", "", "6"],
                ],
            )
            .unwrap(),
            customer: Table::from_records(
                CUSTOMER,
                CUSTOMER_COLUMNS,
                [
                    ["100", "Customer#100", "", "8"],
                    ["101", "Customer#101", "", "12"],
                    ["102", "Customer#102", "", "6"],
                    // nation in no region at all
                    ["103", "Customer#103", "", "42"],
                ],
            )
            .unwrap(),
            orders: Table::from_records(
                ORDERS,
                ORDERS_COLUMNS,
                [
                    ["1000", "100", "O", "0", "1994-03-01"],
                    ["1001", "101", "O", "0", "1994-07-01"],
                    ["1002", "102", "O", "0", "1994-07-01"],
                    ["1003", "100", "O", "0", "1995-01-01"],
                    ["1004", "103", "O", "0", "1994-02-01"],
                    ["1005", "999", "O", "0", "1993-02-01"],
                ],
            )
            .unwrap(),
            lineitem: lineitem(lines),
        }
    }

    #[test]
    fn test_single_matching_row() {
        let f = fixture(&[("1000", "1", "100", "0.1")]);
        let result = f.run(1).unwrap();
        assert_eq!(result.len(), 1);
        assert!((result.get("INDIA").unwrap() - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_nation_mismatch_is_excluded() {
        // INDIA customer, JAPAN supplier
        let f = fixture(&[("1000", "2", "100", "0.1")]);
        assert!(f.run(2).unwrap().is_empty());
    }

    #[test]
    fn test_order_on_end_date_is_excluded() {
        let f = fixture(&[("1003", "1", "100", "0.1")]);
        assert!(f.run(1).unwrap().is_empty());
    }

    #[test]
    fn test_supplier_outside_region_is_excluded() {
        // FRANCE customer with FRANCE supplier: nations match but not in ASIA
        let f = fixture(&[("1002", "3", "100", "0.0")]);
        assert!(f.run(1).unwrap().is_empty());
    }

    #[test]
    fn test_customer_outside_every_region() {
        let f = fixture(&[("1004", "1", "100", "0.0"), ("1001", "2", "50", "0.5")]);
        let result = f.run(3).unwrap();
        assert_eq!(result.len(), 1);
        assert!((result.get("JAPAN").unwrap() - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_multiple_nations() {
        let f = fixture(&[
            ("1000", "1", "100", "0.1"),
            ("1000", "1", "200", "0.0"),
            ("1001", "2", "10", "0.05"),
            ("1002", "3", "999", "0.0"),
            ("7777", "1", "999", "0.0"),
        ]);
        let result = f.run(2).unwrap();
        assert!((result.get("INDIA").unwrap() - 290.0).abs() < 1e-9);
        assert!((result.get("JAPAN").unwrap() - 9.5).abs() < 1e-9);
        assert_eq!(result.get("FRANCE"), None);
    }

    #[test]
    fn test_bad_price_is_fatal() {
        let f = fixture(&[("1000", "1", "1O0", "0.1")]);
        let err = f.run(1).unwrap_err();
        assert!(matches!(
            err,
            QueryError::NumericParse { column: "l_extendedprice", row: 0, .. }
        ));
    }

    #[test]
    fn test_bad_discount_in_later_partition() {
        let f = fixture(&[
            ("1000", "1", "100", "0.1"),
            ("1000", "1", "100", "0.1"),
            ("1000", "1", "100", ""),
        ]);
        let err = f.run(2).unwrap_err();
        assert!(matches!(
            err,
            QueryError::NumericParse { column: "l_discount", row: 2, .. }
        ));
    }

    #[test]
    fn test_bad_numbers_on_skipped_rows_are_ignored() {
        // order outside the window, so the price is never read
        let f = fixture(&[("1003", "1", "n/a", "n/a")]);
        assert!(f.run(1).unwrap().is_empty());
    }

    #[test]
    fn test_missing_customer_is_an_error() {
        let mut f = fixture(&[("1006", "1", "100", "0.1")]);
        f.orders = Table::from_records(
            ORDERS,
            ORDERS_COLUMNS,
            [["1006", "555", "O", "0", "1994-05-05"]],
        )
        .unwrap();
        let err = f.run(1).unwrap_err();
        assert!(matches!(
            err,
            QueryError::MissingCustomer { ref customer_key, .. } if customer_key == "555"
        ));
    }

    #[test]
    fn test_empty_lineitem() {
        let f = fixture(&[]);
        assert!(f.run(4).unwrap().is_empty());
    }

    #[test]
    fn test_zero_threads_rejected() {
        let f = fixture(&[("1000", "1", "100", "0.1")]);
        assert!(matches!(f.run(0), Err(QueryError::InvalidThreadCount(0))));
    }

    #[test]
    fn test_far_more_threads_than_rows() {
        let f = fixture(&[("1000", "1", "100", "0.1"), ("1001", "2", "10", "0.0")]);
        let baseline = f.run(1).unwrap();

        let result = f.run(1_000_000).unwrap();
        assert_eq!(result, baseline);
        assert!((result.get("INDIA").unwrap() - 90.0).abs() < 1e-9);
        assert!((result.get("JAPAN").unwrap() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_idempotent() {
        let f = fixture(&[
            ("1000", "1", "100.25", "0.04"),
            ("1001", "2", "310.5", "0.07"),
            ("1000", "1", "17.75", "0.1"),
        ]);
        let first = f.run(3).unwrap();
        let second = f.run(3).unwrap();
        for (nation, revenue) in first.iter() {
            let again = second.get(nation).unwrap();
            assert!(((revenue - again) / revenue).abs() < 1e-9);
        }
        assert_eq!(first.len(), second.len());
    }

    #[test]
    fn test_scan_partition_subrange() {
        let f = fixture(&[
            ("1000", "1", "100", "0.0"),
            ("1000", "1", "10", "0.0"),
            ("1000", "1", "1", "0.0"),
        ]);
        let dims =
            resolve_dimensions("ASIA", &f.region, &f.nation, &f.supplier, &f.customer).unwrap();
        let orders = OrderIndex::build(&f.orders, "1994-01-01", "1995-01-01").unwrap();
        let columns = LineitemColumns::from_table(&f.lineitem).unwrap();

        let local = scan_partition(columns, 1..3, &dims, &orders).unwrap();
        assert_eq!(local.iter().collect::<Vec<_>>(), vec![("8", 11.0)]);

        let none = scan_partition(columns, 3..3, &dims, &orders).unwrap();
        assert!(none.is_empty());
    }

    fn line_strategy() -> impl Strategy<Value = (usize, usize, u32, u32)> {
        // order index, supplier index, price in cents, discount in hundredths
        (0usize..7, 0usize..4, 0u32..1_000_000, 0u32..11)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn thread_count_does_not_change_result(
            raw in prop::collection::vec(line_strategy(), 0..40),
            extra in 0usize..3,
        ) {
            const ORDER_KEYS: [&str; 7] = ["1000", "1001", "1002", "1003", "1004", "1005", "8888"];
            const SUPP_KEYS: [&str; 4] = ["1", "2", "3", "4"];

            let owned: Vec<(String, String, String, String)> = raw
                .iter()
                .map(|(o, s, cents, disc)| {
                    (
                        ORDER_KEYS[*o].to_string(),
                        SUPP_KEYS[*s].to_string(),
                        format!("{}.{:02}", cents / 100, cents % 100),
                        format!("0.{:02}", disc),
                    )
                })
                .collect();
            let lines: Vec<(&str, &str, &str, &str)> = owned
                .iter()
                .map(|(o, s, p, d)| (o.as_str(), s.as_str(), p.as_str(), d.as_str()))
                .collect();
            let f = fixture(&lines);

            let baseline = f.run(1).unwrap();
            for threads in 1..=lines.len() + 1 + extra {
                let result = f.run(threads).unwrap();
                prop_assert_eq!(result.len(), baseline.len());
                for (nation, expected) in baseline.iter() {
                    let got = result.get(nation).unwrap();
                    prop_assert!((got - expected).abs() <= 1e-6 * expected.abs().max(1.0));
                }
            }
        }
    }
}
