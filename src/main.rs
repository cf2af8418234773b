use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;

use harlens::commands::{
    run_auth_failures, run_groups, run_investigate, run_list, run_navigate, run_search,
    run_summary, GroupBy, SearchOptions,
};
use harlens::config;
use harlens::error::{ErrorPayload, Result};
use harlens::live::LiveTracker;
use harlens::ops::Engine;
use harlens::resolver::Resolver;

#[derive(Parser)]
#[command(name = "harlens")]
#[command(about = "Analyze HAR captures: summaries, grouping, search, and live session inspection.")]
#[command(version)]
struct Cli {
    /// Capture root directory (overrides config; default ".")
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Machine-readable JSON output
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List capture files in the root, newest first
    List {
        /// Case-insensitive substring filter on the file name
        #[arg(long)]
        pattern: Option<String>,
    },

    /// Summarize a capture (counts, hosts, bandwidth, percentiles)
    Summary {
        /// Capture name, "latest", or "live"
        name: String,
    },

    /// Group entries by status code
    Status { name: String },

    /// Group entries into size buckets
    Sizes { name: String },

    /// Group entries into duration buckets
    Durations { name: String },

    /// Group entries by HTTP method
    Methods { name: String },

    /// Show 401/403 responses
    AuthFailures { name: String },

    /// Triage all 4xx/5xx responses, slowest first
    Failures {
        name: String,

        /// How many of the slowest failures to show
        #[arg(long, default_value_t = 10)]
        top: usize,
    },

    /// Multi-criteria entry search
    Search {
        name: String,

        /// Case-insensitive URL substring
        #[arg(long)]
        url: Option<String>,

        /// Regex tested against the URL
        #[arg(long)]
        url_regex: Option<String>,

        /// HTTP method (case-insensitive exact match)
        #[arg(long)]
        method: Option<String>,

        /// Exact status code
        #[arg(long)]
        status: Option<i64>,

        /// Inclusive lower status bound
        #[arg(long)]
        status_min: Option<i64>,

        /// Inclusive upper status bound
        #[arg(long)]
        status_max: Option<i64>,

        /// Minimum duration in milliseconds
        #[arg(long)]
        min_duration: Option<f64>,

        /// Maximum duration in milliseconds
        #[arg(long)]
        max_duration: Option<f64>,

        /// Minimum response size (e.g. "1KB")
        #[arg(long)]
        min_size: Option<String>,

        /// Maximum response size (e.g. "1MB")
        #[arg(long)]
        max_size: Option<String>,

        /// Required request header as key=value (repeatable)
        #[arg(long, action = clap::ArgAction::Append)]
        header: Vec<String>,

        /// Response MIME type prefix (e.g. "application/json")
        #[arg(long)]
        content_type: Option<String>,

        /// Trace-id substring from a traceparent header
        #[arg(long)]
        traceparent: Option<String>,
    },

    /// Print path:index for one entry so a viewer can open it
    Navigate { name: String, index: usize },
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        let payload = ErrorPayload::from(&err);
        eprintln!("harlens: [{}] {}", payload.kind, payload.message);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = config::load_config()?;
    let root = cli.root.unwrap_or_else(|| config.root_or_default());
    let tracker = LiveTracker::new(config.live_capacity_or_default());
    let engine = Engine::new(Resolver::new(root), tracker);
    let json = cli.json;

    match cli.command {
        Commands::List { pattern } => run_list(&engine, pattern.as_deref(), json),
        Commands::Summary { name } => run_summary(&engine, &name, json),
        Commands::Status { name } => run_groups(&engine, &name, GroupBy::Status, json),
        Commands::Sizes { name } => run_groups(&engine, &name, GroupBy::Size, json),
        Commands::Durations { name } => run_groups(&engine, &name, GroupBy::Duration, json),
        Commands::Methods { name } => run_groups(&engine, &name, GroupBy::Method, json),
        Commands::AuthFailures { name } => run_auth_failures(&engine, &name, json),
        Commands::Failures { name, top } => run_investigate(&engine, &name, top, json),
        Commands::Search {
            name,
            url,
            url_regex,
            method,
            status,
            status_min,
            status_max,
            min_duration,
            max_duration,
            min_size,
            max_size,
            header,
            content_type,
            traceparent,
        } => {
            let options = SearchOptions {
                url,
                url_regex,
                method,
                status,
                status_min,
                status_max,
                min_duration,
                max_duration,
                min_size,
                max_size,
                header,
                content_type,
                traceparent,
            };
            run_search(&engine, &name, &options, json)
        }
        Commands::Navigate { name, index } => run_navigate(&engine, &name, index, json),
    }
}
