//! Result report writer

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::aggregator::RevenueByNation;
use crate::error::QueryResult;

pub const REPORT_FILE: &str = "query5_result.txt";

const HEADER: &str = "Nation|Revenue";
const RULE: &str = "---------------------------";

/// Render the pipe-delimited report, one nation per line in name order
pub fn format_report(result: &RevenueByNation) -> String {
    let mut out = format!("{HEADER}\n{RULE}\n");
    for (nation, revenue) in result.iter() {
        out.push_str(&format!("{nation}|{revenue:.2}\n"));
    }
    out
}

/// Write `query5_result.txt` into `result_dir`, creating the directory if needed
pub fn write_report(result_dir: &Path, result: &RevenueByNation) -> QueryResult<PathBuf> {
    fs::create_dir_all(result_dir)?;
    let path = result_dir.join(REPORT_FILE);
    fs::write(&path, format_report(result))?;
    info!(path = %path.display(), nations = result.len(), "wrote report");
    Ok(path)
}
