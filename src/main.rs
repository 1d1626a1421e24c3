use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use tracing::error;

use goose_q5::config::{DEFAULT_END_DATE, DEFAULT_REGION, DEFAULT_START_DATE};
use goose_q5::output::write_report;
use goose_q5::{execute_tpch_q5, load_tpch_tables, logging, QueryConfig, QueryResult};

#[derive(Parser, Debug)]
#[command(name = "goose-q5")]
#[command(version)]
#[command(about = "TPC-H Query 5 (local supplier volume) processor")]
struct Args {
    /// Region name (exact, case-sensitive)
    #[arg(long = "r-name", default_value = DEFAULT_REGION)]
    region: String,

    /// Inclusive lower bound on o_orderdate (YYYY-MM-DD)
    #[arg(long, default_value = DEFAULT_START_DATE)]
    start_date: String,

    /// Exclusive upper bound on o_orderdate (YYYY-MM-DD)
    #[arg(long, default_value = DEFAULT_END_DATE)]
    end_date: String,

    /// Worker threads for the lineitem scan (default: number of CPUs)
    #[arg(long)]
    threads: Option<usize>,

    /// Directory holding <table>.tbl or <table>.parquet files
    #[arg(long, value_name = "DIR")]
    table_path: PathBuf,

    /// Directory to write query5_result.txt into
    #[arg(long, value_name = "DIR")]
    result_path: Option<PathBuf>,

    /// Timed runs; more than one adds an untimed warmup run
    #[arg(long, default_value_t = 1)]
    runs: usize,

    /// Log level when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> ExitCode {
    let args = Args::parse();
    logging::init_with_level(&args.log_level);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("query failed: {e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> QueryResult<()> {
    let config = QueryConfig::new(
        args.region.as_str(),
        args.start_date.as_str(),
        args.end_date.as_str(),
        args.threads.unwrap_or_else(num_cpus::get),
    )?;
    let runs = args.runs.max(1);

    println!("TPC-H Query 5 Processor");
    println!("=======================");
    println!("Table path: {}", args.table_path.display());
    println!(
        "Region: {}  Window: [{}, {})  Threads: {}",
        config.region_name, config.start_date, config.end_date, config.threads
    );
    println!();

    let tables = load_tpch_tables(&args.table_path)?;

    if runs > 1 {
        // Warmup run (not counted)
        println!("Warmup run...");
        execute_tpch_q5(&tables, &config)?;
        println!();
    }

    let mut times = Vec::with_capacity(runs);
    let mut result = None;
    for _ in 0..runs {
        let start = Instant::now();
        let r = execute_tpch_q5(&tables, &config)?;
        times.push(start.elapsed().as_secs_f64() * 1000.0); // Convert to ms
        result = Some(r);
    }

    let Some(result) = result else {
        return Ok(());
    };

    println!("Query Results:");
    println!("{:-<40}", "");
    println!("{:<25} {:>14}", "n_name", "revenue");
    println!("{:-<40}", "");
    for (nation, revenue) in result.ranked() {
        println!("{:<25} {:>14.2}", nation, revenue);
    }
    println!();

    if runs == 1 {
        println!("Time: {:.2} ms", times[0]);
    } else {
        let mean = times.iter().sum::<f64>() / times.len() as f64;
        let variance = times.iter().map(|t| (t - mean).powi(2)).sum::<f64>() / times.len() as f64;
        let stddev = variance.sqrt();
        let min = times.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = times.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

        println!("Performance ({} runs):", runs);
        println!("{:-<40}", "");
        println!("  Mean:   {:.2} ms", mean);
        println!("  Stddev: {:.2} ms", stddev);
        println!("  Min:    {:.2} ms", min);
        println!("  Max:    {:.2} ms", max);
    }

    if let Some(dir) = &args.result_path {
        let path = write_report(dir, &result)?;
        println!("Results written to: {}", path.display());
    }

    Ok(())
}
