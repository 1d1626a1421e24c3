//! Dimension lookups for the lineitem scan
//!
//! Resolves the region to its nations and indexes suppliers and customers by
//! nation. Keys and values borrow straight from the loaded string columns.

use ahash::AHashMap;
use tracing::{debug, warn};

use crate::error::{QueryError, QueryResult};
use crate::table::Table;

/// Lookup maps built once per query and shared read-only with every worker
#[derive(Debug, Default)]
pub struct DimensionMaps<'a> {
    /// n_nationkey -> n_name, nations of the resolved region only
    pub nation_names: AHashMap<&'a str, &'a str>,
    /// s_suppkey -> s_nationkey, suppliers inside the region only
    pub supplier_nation: AHashMap<&'a str, &'a str>,
    /// c_custkey -> c_nationkey for every customer
    pub customer_nation: AHashMap<&'a str, &'a str>,
}

/// Find the key of the first region named `region_name` (exact, case-sensitive)
pub fn resolve_region_key<'a>(region: &'a Table, region_name: &str) -> QueryResult<&'a str> {
    let keys = region.column("r_regionkey")?;
    let names = region.column("r_name")?;

    (0..region.num_rows())
        .find(|&i| names.value(i) == region_name)
        .map(|i| keys.value(i))
        .ok_or_else(|| QueryError::RegionNotFound(region_name.to_string()))
}

/// Nations whose region key is `region_key`, by key
pub fn nations_in_region<'a>(
    nation: &'a Table,
    region_key: &str,
) -> QueryResult<AHashMap<&'a str, &'a str>> {
    let keys = nation.column("n_nationkey")?;
    let names = nation.column("n_name")?;
    let regions = nation.column("n_regionkey")?;

    let mut nation_names = AHashMap::new();
    for i in 0..nation.num_rows() {
        if regions.value(i) == region_key {
            nation_names.insert(keys.value(i), names.value(i));
        }
    }
    Ok(nation_names)
}

/// Suppliers located in one of `nation_names`
pub fn suppliers_in_nations<'a>(
    supplier: &'a Table,
    nation_names: &AHashMap<&'a str, &'a str>,
) -> QueryResult<AHashMap<&'a str, &'a str>> {
    let keys = supplier.column("s_suppkey")?;
    let nations = supplier.column("s_nationkey")?;

    let mut supplier_nation = AHashMap::new();
    for i in 0..supplier.num_rows() {
        let nation = nations.value(i);
        if nation_names.contains_key(nation) {
            supplier_nation.insert(keys.value(i), nation);
        }
    }
    Ok(supplier_nation)
}

/// Every customer's nation
///
/// Not restricted to the region: the scan only counts a row when the
/// customer's nation equals an in-region supplier's nation, so customers
/// elsewhere can never contribute.
pub fn customer_nations(customer: &Table) -> QueryResult<AHashMap<&str, &str>> {
    let keys = customer.column("c_custkey")?;
    let nations = customer.column("c_nationkey")?;

    let mut customer_nation = AHashMap::with_capacity(customer.num_rows());
    for i in 0..customer.num_rows() {
        customer_nation.insert(keys.value(i), nations.value(i));
    }
    Ok(customer_nation)
}

/// Build all dimension lookups for `region_name`
///
/// Fails only with `RegionNotFound`. A region with no nations resolves to
/// empty maps and therefore an empty result.
pub fn resolve_dimensions<'a>(
    region_name: &str,
    region: &'a Table,
    nation: &'a Table,
    supplier: &'a Table,
    customer: &'a Table,
) -> QueryResult<DimensionMaps<'a>> {
    let region_key = resolve_region_key(region, region_name)?;

    let nation_names = nations_in_region(nation, region_key)?;
    if nation_names.is_empty() {
        warn!(region = region_name, region_key, "region has no nations");
    }

    let supplier_nation = suppliers_in_nations(supplier, &nation_names)?;
    let customer_nation = customer_nations(customer)?;

    debug!(
        region = region_name,
        region_key,
        nations = nation_names.len(),
        suppliers = supplier_nation.len(),
        customers = customer_nation.len(),
        "resolved dimensions"
    );

    Ok(DimensionMaps {
        nation_names,
        supplier_nation,
        customer_nation,
    })
}
