//! Query orchestration - ties together all components

use std::path::Path;
use std::time::Instant;

use tracing::{debug, info};

use crate::aggregator::RevenueByNation;
use crate::config::QueryConfig;
use crate::dimension::resolve_dimensions;
use crate::engine::join_aggregate;
use crate::error::QueryResult;
use crate::filter::OrderIndex;
use crate::reader::{load_tpch_tables, TpchTables};

/// Execute TPC-H Query 5
///
/// Returns revenue per nation of `config.region_name` for orders placed in
/// `[start_date, end_date)` where customer and supplier share the nation.
/// Fails with `RegionNotFound` when the region is unknown; an empty window
/// or no qualifying lineitems is a successful empty result.
pub fn execute_tpch_q5(tables: &TpchTables, config: &QueryConfig) -> QueryResult<RevenueByNation> {
    config.validate()?;
    let start = Instant::now();

    let dims = resolve_dimensions(
        &config.region_name,
        &tables.region,
        &tables.nation,
        &tables.supplier,
        &tables.customer,
    )?;
    let dims_done = start.elapsed();

    let orders = OrderIndex::build(&tables.orders, &config.start_date, &config.end_date)?;
    let orders_done = start.elapsed();

    let result = join_aggregate(&tables.lineitem, &dims, &orders, config.threads)?;

    debug!(
        dimensions_ms = dims_done.as_secs_f64() * 1000.0,
        orders_ms = (orders_done - dims_done).as_secs_f64() * 1000.0,
        scan_ms = (start.elapsed() - orders_done).as_secs_f64() * 1000.0,
        "phase timings"
    );
    info!(
        region = %config.region_name,
        start_date = %config.start_date,
        end_date = %config.end_date,
        threads = config.threads,
        nations = result.len(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "query 5 complete"
    );

    Ok(result)
}

/// Load the six tables from `table_path` and execute Query 5
pub fn execute_tpch_q5_from_path(
    table_path: &Path,
    config: &QueryConfig,
) -> QueryResult<RevenueByNation> {
    config.validate()?;
    let tables = load_tpch_tables(table_path)?;
    execute_tpch_q5(&tables, config)
}
