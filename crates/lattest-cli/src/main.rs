use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod testing;

const USAGE: &str = "Usage: lattest PATH_TO_LATC [TEST_SUITE...]\n\
Example: lattest ../latc basic arrays\n\
If no TEST_SUITE specified, assuming usage of all test suites.\n";

/// Black-box test runner for the Latte compiler.
///
/// Compiles every `.lat` case under SUITE/*/good/ and SUITE/*/bad/, runs good
/// cases through the interpreter, and prints one classified line per case:
/// OK, WA or CE for good cases; CE or "no CE" for bad cases.
///
/// EXAMPLES:
///     lattest ../latc                  Run all default suites
///     lattest ../latc basic arrays     Run selected suites
///     lattest ../latc --timeout 10     Kill tools running longer than 10s
///     lattest ../latc --json           Machine-readable report
///
/// ENVIRONMENT VARIABLES:
///     LATTEST_INTERPRETER  Interpreter command (default: lli)
///     LATTEST_TIMEOUT      Per-invocation timeout in seconds
///     LATTEST_JSON         Set to '1' for JSON output by default
///     LATTEST_LOG          Log filter for diagnostics on stderr
///     NO_COLOR             Set to disable colored output
#[derive(Parser)]
#[command(name = "lattest")]
#[command(version)]
struct Cli {
    /// Path to the compiler executable
    #[arg(value_name = "PATH_TO_LATC")]
    compiler: Option<PathBuf>,

    /// Test suites to run (default: all suites)
    #[arg(value_name = "TEST_SUITE")]
    suites: Vec<String>,

    /// Directory suite names are resolved against
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Interpreter used to run compiled bytecode (default: lli)
    #[arg(long)]
    interpreter: Option<String>,

    /// Kill the compiler or interpreter after this many seconds
    #[arg(long, value_name = "SECS", value_parser = parse_timeout_arg)]
    timeout: Option<u64>,

    /// Print totals after all suites
    #[arg(long)]
    summary: bool,

    /// Output a single JSON report instead of one line per case
    #[arg(long)]
    json: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Report a suite whose tools cannot be launched and continue with the next
    #[arg(long)]
    keep_going: bool,

    /// Log every tool invocation to stderr
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn parse_timeout_arg(value: &str) -> Result<u64, String> {
    lattest_config::parse_timeout("--timeout", value).map_err(|e| e.to_string())
}

fn init_logging(verbose: bool) {
    let default_directive = if verbose { "lattest=debug" } else { "warn" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("LATTEST_LOG")
                .unwrap_or_else(|_| EnvFilter::new(default_directive)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let Some(compiler) = cli.compiler else {
        println!("{}", USAGE);
        std::process::exit(1);
    };

    init_logging(cli.verbose);

    let env_config = config::Config::from_env();
    let no_color = cli.no_color || env_config.no_color;
    // Labels are colored whether or not stdout is a terminal.
    colored::control::set_override(!no_color);

    let args = commands::test::TestArgs {
        compiler,
        suites: cli.suites,
        root: cli.root,
        interpreter: cli.interpreter,
        timeout: cli.timeout.map(Duration::from_secs),
        summary: cli.summary,
        json: cli.json || env_config.default_json,
        no_color,
        keep_going: cli.keep_going,
    };
    commands::test::run(args)
}
