//! TPC-H Query 5: local supplier volume
//!
//! Revenue per nation of one region over an order-date window, computed by
//! hash lookups over the dimension tables and a partitioned parallel scan of
//! lineitem.

pub mod aggregator;
pub mod config;
pub mod dimension;
pub mod engine;
pub mod error;
pub mod filter;
pub mod logging;
pub mod output;
pub mod partition;
pub mod query;
pub mod reader;
pub mod schema;
pub mod table;
pub mod utils;

pub use aggregator::RevenueByNation;
pub use config::QueryConfig;
pub use error::{QueryError, QueryResult};
pub use query::{execute_tpch_q5, execute_tpch_q5_from_path};
pub use reader::{load_tpch_tables, TpchTables};
