//! netspect - concurrent fetch-and-aggregate demo client
//!
//! Registers skip-logging and mock rules, fires a batch of HTTP requests
//! against several public APIs at once, and reports what came back.
//!
//! Exit codes:
//!   0 - Run completed (individual request failures are part of the report)
//!   1 - Runtime error (bad arguments, config, report output)

mod aggregate;
mod cli;
mod config;
mod error;
mod fetch;
mod intercept;
mod models;
mod report;

use aggregate::Aggregator;
use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE_NAME};
use fetch::{Dispatcher, HttpTransport};
use indicatif::{ProgressBar, ProgressStyle};
use intercept::{InterceptingTransport, RuleBook};
use models::FetchDescriptor;
use report::{RunMetadata, RunReport};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    init_logging(&args, config.general.verbose);

    info!("netspect v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(args, config).await {
        error!("Run failed: {}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .netspect.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with the demo request set.", CONFIG_FILE_NAME);
    println!("   Edit it to add requests, skip-logging rules and mocks.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args, config_verbose: bool) {
    let level = if config_verbose && !args.quiet {
        tracing::Level::DEBUG
    } else {
        args.log_level()
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    if let Some(ref config_path) = args.config {
        return Config::load(config_path);
    }

    match Config::load_default() {
        Ok(Some(config)) => Ok(config),
        Ok(None) => Ok(Config::default()),
        Err(e) => {
            eprintln!("⚠️  Ignoring {}: {:#}", CONFIG_FILE_NAME, e);
            Ok(Config::default())
        }
    }
}

/// Register rules, dispatch the batch, and emit the report.
async fn run(args: Args, config: Config) -> Result<()> {
    config.validate()?;
    let descriptors = config.selected_requests(args.only.as_deref())?;

    // Interception rules go in before any request is sent.
    let rules = Arc::new(RuleBook::new());
    let registered = intercept::install(rules.as_ref(), &config.skip_logging, &config.mocks);
    debug!("Registered {} interception rules", registered);

    if args.dry_run {
        print_dry_run(&descriptors, &rules);
        return Ok(());
    }

    let http = HttpTransport::new().context("Failed to initialize HTTP transport")?;
    let transport = InterceptingTransport::new(Arc::new(http), Arc::clone(&rules));
    let dispatcher = Arc::new(Dispatcher::new(Arc::new(transport), Aggregator::new()));

    if !args.quiet {
        println!("🌐 Calling {} services...", descriptors.len());
    }

    let started_at = Utc::now();
    let start = Instant::now();
    let count = descriptors.len();

    let run = tokio::spawn({
        let dispatcher = Arc::clone(&dispatcher);
        async move { dispatcher.run_all(descriptors).await }
    });
    watch_progress(&dispatcher, &run, count, !args.quiet).await;
    run.await.context("Dispatcher task failed")?;

    let metadata = RunMetadata {
        started_at,
        duration_seconds: start.elapsed().as_secs_f64(),
        requests_dispatched: count,
    };
    let report = RunReport::new(metadata, dispatcher.aggregator().snapshot().await);

    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Text => report::generate_text_report(&report),
    };

    match config.general.output {
        Some(ref path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            if !args.quiet {
                println!("\n✅ Report saved to: {}", path.display());
            }
        }
        None => println!("{}", output),
    }

    if !args.quiet && args.format == OutputFormat::Text {
        print_summary(&report);
    }

    Ok(())
}

/// Show a spinner with live counts until the run finishes.
async fn watch_progress(
    dispatcher: &Dispatcher,
    run: &tokio::task::JoinHandle<()>,
    count: usize,
    show: bool,
) {
    let spinner = if show {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        Some(pb)
    } else {
        None
    };

    while !run.is_finished() {
        tokio::time::sleep(Duration::from_millis(100)).await;
        if let Some(ref pb) = spinner {
            let (done, failed) = dispatcher
                .aggregator()
                .inspect(|s| (s.total_requests, s.failed_requests))
                .await;
            let phase = if dispatcher.is_in_flight() {
                "loading"
            } else {
                "starting"
            };
            pb.set_message(format!("{phase}: {done}/{count} completed ({failed} failed)"));
            pb.tick();
        }
    }

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
}

fn print_summary(report: &RunReport) {
    let state = &report.state;
    println!("📊 Run Summary:");
    println!(
        "   Requests: {} completed | {} failed | {} skipped from log",
        state.total_requests, state.failed_requests, state.skipped_requests
    );
    println!(
        "   Data: {} characters | {} houses | {} images | {} mock responses",
        state.characters.len(),
        state.houses.len(),
        state.images.len(),
        state.mock_responses.len()
    );
    println!("   Duration: {:.1}s", report.metadata.duration_seconds);
    if !report.has_data {
        warn!("No data received from any service");
    }
}

/// Handle --dry-run: list what would be sent, exit.
fn print_dry_run(descriptors: &[FetchDescriptor], rules: &RuleBook) {
    println!("\n🔍 Dry run: no requests will be sent.\n");

    if descriptors.is_empty() {
        println!("   No requests configured.");
    } else {
        for d in descriptors {
            println!(
                "   📄 {} [{} / {} / {:?}] {}",
                d.id, d.payload, d.classification, d.transport, d.target
            );
        }
        println!("\n   Total: {} requests", descriptors.len());
    }

    let (suppressed, mocks) = rules.rule_counts();
    println!("   Rules: {} skip-logging, {} mocks", suppressed, mocks);
}
