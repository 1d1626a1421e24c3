//! Revenue aggregation for TPC-H Q5
//!
//! Workers sum into a private map keyed by nation key, then merge once into
//! the shared accumulator, translating keys to nation names at merge time.

use std::collections::BTreeMap;

use ahash::AHashMap;
use parking_lot::Mutex;

use crate::error::{QueryError, QueryResult};

/// Per-worker partial sums, keyed by nation key
#[derive(Debug, Default)]
pub struct LocalRevenue<'a> {
    by_nation: AHashMap<&'a str, f64>,
}

impl<'a> LocalRevenue<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn add(&mut self, nation_key: &'a str, revenue: f64) {
        *self.by_nation.entry(nation_key).or_insert(0.0) += revenue;
    }

    /// Number of distinct nations seen
    pub fn len(&self) -> usize {
        self.by_nation.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_nation.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a str, f64)> + '_ {
        self.by_nation.iter().map(|(k, v)| (*k, *v))
    }
}

/// Shared nation name -> revenue totals
///
/// The only state mutated while workers run. Each worker locks it once,
/// after its scan, for a merge bounded by the number of nations.
#[derive(Debug, Default)]
pub struct RevenueAccumulator {
    totals: Mutex<BTreeMap<String, f64>>,
}

impl RevenueAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a worker's partial sums under the lock
    pub fn merge(
        &self,
        local: &LocalRevenue<'_>,
        nation_names: &AHashMap<&str, &str>,
    ) -> QueryResult<()> {
        // resolve names before locking so a bad key leaves totals untouched
        let resolved = local
            .iter()
            .map(|(key, revenue)| {
                nation_names
                    .get(key)
                    .map(|name| (*name, revenue))
                    .ok_or_else(|| QueryError::UnknownNation(key.to_string()))
            })
            .collect::<QueryResult<Vec<_>>>()?;

        let mut totals = self.totals.lock();
        for (name, revenue) in resolved {
            *totals.entry(name.to_string()).or_insert(0.0) += revenue;
        }
        Ok(())
    }

    pub fn into_result(self) -> RevenueByNation {
        RevenueByNation {
            totals: self.totals.into_inner(),
        }
    }
}

/// Final query result: nation name -> revenue, ordered by name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RevenueByNation {
    totals: BTreeMap<String, f64>,
}

impl RevenueByNation {
    pub fn get(&self, nation: &str) -> Option<f64> {
        self.totals.get(nation).copied()
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// Nations in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.totals.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Sum over all nations
    pub fn total(&self) -> f64 {
        self.totals.values().sum()
    }

    /// Nations by revenue descending, ties by name (the Q5 ORDER BY)
    pub fn ranked(&self) -> Vec<(&str, f64)> {
        let mut rows: Vec<(&str, f64)> = self.iter().collect();
        rows.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        rows
    }
}

impl FromIterator<(String, f64)> for RevenueByNation {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        let mut totals = BTreeMap::new();
        for (name, revenue) in iter {
            *totals.entry(name).or_insert(0.0) += revenue;
        }
        Self { totals }
    }
}
