mod args;
mod commands;
mod rows;

use std::io::{self, BufWriter, Write};

use clap::{Parser, ValueEnum};
use commands::Commands;
use logutil::LogFormat;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatArg {
    Human,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Human => LogFormat::HumanReadable,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

#[derive(Debug, Parser)]
#[clap(name = "skyql", version)]
struct Arguments {
    /// Log level used when `RUST_LOG` isn't set.
    #[clap(long, global = true, default_value = "error", env = "SKYQL_LOG_LEVEL")]
    log_level: tracing::Level,
    /// Format of log output. Logs are written to stderr.
    #[clap(long, global = true, value_enum, default_value_t = LogFormatArg::Human)]
    log_format: LogFormatArg,
    #[clap(subcommand)]
    command: Commands,
}

/// Partition pruning and per-chunk rewriting for sky-indexed queries.
fn main() {
    let args = Arguments::parse();
    logutil::configure_global_logger(args.log_level, args.log_format.into(), io::stderr);

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let result = args
        .command
        .run(io::stdin().lock(), &mut out)
        .and_then(|()| out.flush().map_err(Into::into));

    if let Err(err) = result {
        eprintln!("ERROR: {err}");
        std::process::exit(1);
    }
}
