//! CLI entry point for MBO → MBP-10 reconstruction.
//!
//! # Usage
//!
//! ```bash
//! mbp-reconstructor <mbo_input_file.csv>
//! ```
//!
//! Reads the MBO CSV at the given path and writes the reconstructed
//! MBP-10 rows to `output.csv` in the working directory. Warnings and
//! errors go to stderr; exit code is non-zero on I/O failure or a fatal
//! input fault.

use std::env;
use std::fs::File;
use std::path::PathBuf;
use std::process;
use std::time::Instant;

use mbp_reconstructor::pipeline;

/// Output path, fixed by the tool contract.
const OUTPUT_PATH: &str = "output.csv";

/// Command-line arguments
struct Args {
    /// Path to the MBO input CSV
    input: PathBuf,
}

fn parse_args() -> Result<Args, String> {
    let args: Vec<String> = env::args().collect();

    let mut input: Option<PathBuf> = None;

    for arg in &args[1..] {
        match arg.as_str() {
            "--help" | "-h" => {
                print_help(&args[0]);
                process::exit(0);
            }
            arg if arg.starts_with('-') => {
                return Err(format!("Unknown option: {arg}"));
            }
            arg => {
                if input.is_some() {
                    return Err(format!("Unexpected argument: {arg}"));
                }
                input = Some(PathBuf::from(arg));
            }
        }
    }

    let input = input.ok_or("Input path is required")?;
    Ok(Args { input })
}

fn print_help(program: &str) {
    eprintln!(
        r#"
Reconstruct MBP-10 From MBO Events

Replays a Market-By-Order CSV stream and writes the aggregated top-10
Market-By-Price view, one row per input event, to {OUTPUT_PATH}.

USAGE:
    {program} <mbo_input_file.csv>

OPTIONS:
    -h, --help    Print this help message

OUTPUT:
    {OUTPUT_PATH} in the current working directory.
    Warnings and errors are written to stderr.
"#
    );
}

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    // Parse arguments
    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Use --help for usage information");
            process::exit(1);
        }
    };

    // Open input and output before any processing starts.
    let input = match File::open(&args.input) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Error: open MBO file {}: {e}", args.input.display());
            process::exit(1);
        }
    };
    let output = match File::create(OUTPUT_PATH) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Error: open MBP file {OUTPUT_PATH}: {e}");
            process::exit(1);
        }
    };

    let start = Instant::now();
    match pipeline::run(input, output) {
        Ok(stats) => {
            let elapsed = start.elapsed().as_secs_f64();
            let throughput = if elapsed > 0.0 {
                stats.events_processed as f64 / elapsed
            } else {
                0.0
            };

            println!("MBP-10 reconstruction complete. Output saved to {OUTPUT_PATH}");
            println!("  Events processed: {}", stats.events_processed);
            println!("  Rows written: {}", stats.rows_written);
            println!("  Records skipped: {}", stats.records_skipped);
            println!("  Synthetic trades: {}", stats.synthetic_trades);
            println!("  Time: {elapsed:.2}s ({throughput:.0} events/s)");
        }
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
