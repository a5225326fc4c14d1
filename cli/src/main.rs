//! CLI entrypoint for finteam
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use finteam_application::{ActivityObserver, CompletionBackend, CompositeObserver};
use finteam_domain::{GenerationParams, Query};
use finteam_infrastructure::{
    ConfigLoader, FileConfig, JsonlActivityLog, TeamToggles, backend_from_config, default_team,
};
use finteam_presentation::{ActivityDisplay, Cli, ConsoleFormatter, OutputFormat};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Exit status when no agent produced an answer.
const EXIT_ALL_AGENTS_FAILED: u8 = 2;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // GEMINI_API_KEY may live in a .env file
    dotenv::dotenv().ok();

    let _log_guard = init_logging(cli.verbose, cli.log_file.as_deref())?;

    info!("Starting finteam");

    // === Configuration ===
    let mut file_config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())
            .map_err(|e| anyhow!("{}", e))
            .context("Failed to load configuration")?
    };
    apply_overrides(&cli, &mut file_config);

    if cli.show_config {
        for line in ConfigLoader::describe_sources(cli.config.as_deref()) {
            println!("{}", line);
        }
        println!();
        println!("Effective configuration:");
        println!("{}", file_config.to_redacted_toml()?);
        return Ok(ExitCode::SUCCESS);
    }

    let team_config = file_config.to_team_config()?;
    let query = Query::with_params(cli.query_text(), query_params(&cli))?;

    // === Dependency Injection ===
    let backend = Arc::new(
        backend_from_config(&file_config.backend).context("Failed to set up the backend")?,
    );

    if !cli.no_preflight {
        info!(model = backend.model(), "Connection test");
        backend
            .ping()
            .await
            .with_context(|| format!("Connection test to {} failed", backend.model()))?;
    }

    let cancellation = CancellationToken::new();
    spawn_ctrl_c_handler(cancellation.clone());

    let coordinator = default_team(
        backend,
        team_config,
        TeamToggles::from(&file_config.team),
    )?
    .with_cancellation(cancellation);

    // === Observers ===
    let mut observers = CompositeObserver::new(Vec::new());
    let display = (!cli.quiet).then(|| Arc::new(ActivityDisplay::new(cli.verbose > 0)));
    if let Some(display) = &display {
        observers.push(display.clone());
    }
    if let Some(path) = &cli.activity_log {
        let log = JsonlActivityLog::create(path)
            .with_context(|| format!("Cannot create activity log {}", path.display()))?;
        observers.push(Arc::new(log));
    }

    if !cli.quiet && cli.output == OutputFormat::Report {
        println!();
        println!("Query: {}", query.text());
        println!();
    }

    let observer: Arc<dyn ActivityObserver> = Arc::new(observers);
    let report = coordinator.run(&query, observer).await;

    if let Some(display) = &display {
        display.finish();
    }

    let output = match cli.output {
        OutputFormat::Report => ConsoleFormatter::format(&report),
        OutputFormat::Answer => ConsoleFormatter::format_answer_only(&report),
        OutputFormat::Json => ConsoleFormatter::format_json(&report),
    };
    println!("{}", output);

    if report.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(EXIT_ALL_AGENTS_FAILED))
    }
}

/// Install the tracing subscriber. With `log_file`, logs go to that file
/// through a non-blocking writer whose guard must outlive the run.
fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let Some(path) = log_file else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
        return Ok(None);
    };

    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow!("--log-file needs a file name: {}", path.display()))?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Cannot create log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(writer)
        .init();
    Ok(Some(guard))
}

/// CLI flags that change team-level settings.
fn apply_overrides(cli: &Cli, config: &mut FileConfig) {
    if let Some(timeout) = cli.timeout {
        config.team.timeout_seconds = timeout;
    }
    if cli.no_web {
        config.team.web_agent = false;
    }
    if cli.no_finance {
        config.team.finance_agent = false;
    }
}

/// CLI flags that override generation parameters for this query only.
fn query_params(cli: &Cli) -> GenerationParams {
    let mut params = GenerationParams::default();
    if let Some(temperature) = cli.temperature {
        params = params.with_temperature(temperature);
    }
    if let Some(max_tokens) = cli.max_tokens {
        params = params.with_max_tokens(max_tokens);
    }
    if let Some(bound) = cli.tool_rounds {
        params = params.with_tool_round_bound(bound);
    }
    params
}

fn spawn_ctrl_c_handler(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling team run");
            token.cancel();
        }
    });
}
