//! plancharts CLI - map query plan shapes across parameter ranges
//!
//! Usage:
//!   plancharts run [CONFIG] [--format text|json] [-v...]
//!   plancharts check [CONFIG]
//!
//! Examples:
//!   plancharts run joins.toml -vv
//!   plancharts run joins.toml --format json > joins.json
//!   plancharts check joins.toml

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use plancharts::backend::PostgresProvider;
use plancharts::config::Settings;
use plancharts::report::SweepReport;
use plancharts::sweep::{sample, SweepError, SweepRunner};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "plancharts")]
#[command(about = "Sweep query parameters and map which regions produce which plan shape")]
#[command(version)]
struct Cli {
    /// Verbosity level; may be given up to three times
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the sweep and report the plan classes
    Run {
        /// Path to the configuration file (searches default locations if omitted)
        config: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Validate a configuration and show the values each axis will take
    Check {
        /// Path to the configuration file (searches default locations if omitted)
        config: Option<PathBuf>,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Per-class listing with representative plans
    Text,
    /// Full report payload for chart rendering
    Json,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Run { config, format } => cmd_run(config, format).await,
        Commands::Check { config } => cmd_check(config),
    }
}

/// Sample progress is logged at info level, so it stays visible by default.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "error,plancharts=info",
        1 => "warn,plancharts=info",
        2 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_settings(config: Option<PathBuf>) -> Option<Settings> {
    let result = match &config {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    };
    match result {
        Ok(settings) => Some(settings),
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            None
        }
    }
}

async fn cmd_run(config: Option<PathBuf>, format: OutputFormat) -> ExitCode {
    let Some(settings) = load_settings(config) else {
        return ExitCode::FAILURE;
    };

    let runner = SweepRunner::new(
        PostgresProvider::new(settings.worker.clone()),
        settings.statements(),
        settings.query.clone(),
    );

    let parameters = settings.parameter_configs();
    let result = match parameters.as_slice() {
        [] => runner
            .run_0d()
            .await
            .map(|plan| SweepReport::single(&settings.title, &plan)),
        [axis] => runner
            .run_1d(axis)
            .await
            .map(|sweep| SweepReport::from_1d(&settings.title, &sweep)),
        [first, second] => runner
            .run_2d(first, second)
            .await
            .map(|sweep| SweepReport::from_2d(&settings.title, &sweep)),
        more => Err(SweepError::InvalidParameter(format!(
            "at most two parameters can be swept, got {}",
            more.len()
        ))),
    };

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Sweep failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match format {
        OutputFormat::Text => print!("{}", report.render_text()),
        OutputFormat::Json => match report.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Failed to serialize report: {}", e);
                return ExitCode::FAILURE;
            }
        },
    }
    ExitCode::SUCCESS
}

fn cmd_check(config: Option<PathBuf>) -> ExitCode {
    let Some(settings) = load_settings(config) else {
        return ExitCode::FAILURE;
    };

    println!("Query: {}", settings.query.trim());
    println!("Setup statements: {}", settings.setup.len());

    let parameters = settings.parameter_configs();
    if parameters.is_empty() {
        println!("No swept parameters: a single plan will be captured.");
        return ExitCode::SUCCESS;
    }

    let mut samples = 1;
    for parameter in &parameters {
        match sample(parameter.start, parameter.stop, parameter.steps) {
            Ok(values) if values.len() > 1 => {
                let values: Vec<String> = values.iter().map(u64::to_string).collect();
                println!("{} ({} values): {}", parameter.name, values.len(), values.join(", "));
                samples *= values.len();
            }
            Ok(_) => {
                eprintln!(
                    "Parameter '{}' can only take on a single value",
                    parameter.name
                );
                return ExitCode::FAILURE;
            }
            Err(e) => {
                eprintln!("Parameter '{}': {}", parameter.name, e);
                return ExitCode::FAILURE;
            }
        }
    }

    println!("OK: {} samples", samples);
    ExitCode::SUCCESS
}
