use std::path::PathBuf;
use std::process;

use clap::Parser;

use yarasentry::alert::ConsoleSink;
use yarasentry::config::Config;
use yarasentry::error::Result;
use yarasentry::{run, RunSummary, ScanOptions};

#[derive(Parser)]
#[command(
    name = "yarasentry",
    about = "Batch YARA scanner with structured console alerts",
    version
)]
struct Cli {
    /// Directory of YARA rule files (overrides config)
    #[arg(long)]
    rules_dir: Option<PathBuf>,

    /// Directory of files to scan (overrides config)
    #[arg(long)]
    scan_dir: Option<PathBuf>,

    /// Config file path
    #[arg(long, short = 'c', default_value = ".yarasentry.toml")]
    config: PathBuf,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run_scan(cli) {
        Ok(summary) => {
            eprintln!(
                "{} file(s) scanned, {} alert(s) sent",
                summary.files_scanned, summary.alerts_sent
            );
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(e.exit_code());
        }
    }
}

fn run_scan(cli: Cli) -> Result<RunSummary> {
    let config = Config::load(&cli.config)?;
    let mut options = ScanOptions::from(config);
    if let Some(rules_dir) = cli.rules_dir {
        options.rules_dir = rules_dir;
    }
    if let Some(scan_dir) = cli.scan_dir {
        options.scan_dir = scan_dir;
    }

    let mut sink = ConsoleSink;
    run(&options, &mut sink)
}
