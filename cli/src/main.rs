//! CLI entrypoint for agent-thinker
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thinker_application::{
    ConversationLogger, LlmPlanner, LlmSynthesizer, LlmValidator, NoProgress, PageCache,
    ProgressNotifier, RetrievalAgent, RunResearchUseCase, ScrapePort, SearchPort,
};
use thinker_domain::{ConversationState, OrchestratorConfig, Severity};
use thinker_infrastructure::{
    CacheBackend, ConfigLoader, DirectFetcher, DisabledSearch, FileConfig, FilePageCache,
    HttpScrapeService, HttpSearchService, InMemoryPageCache, JsonlTranscriptLogger,
    OpenAiCompletionGateway,
};
use thinker_presentation::{ChatRepl, Cli, ConsoleFormatter, ProgressReporter, SimpleProgress};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let file_config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        println!();
        println!("{}", file_config.to_toml()?);
        return Ok(());
    }

    let log_dir = cli.log_dir.clone().or_else(|| file_config.logging.dir.clone());
    let log_guard = init_tracing(cli.verbose, log_dir.as_deref())?;

    info!("Starting agent-thinker");

    let mut errors = Vec::new();
    for issue in file_config.validate() {
        match issue.severity {
            Severity::Error => errors.push(issue.message),
            Severity::Warning => {
                warn!("{}", issue.message);
                if !cli.quiet {
                    eprintln!("warning: {}", issue.message);
                }
            }
        }
    }
    if !errors.is_empty() {
        bail!("Invalid configuration:\n  {}", errors.join("\n  "));
    }

    let (orchestrator, _) = file_config.orchestrator.to_orchestrator_config();
    let orchestrator = cli.apply_overrides(orchestrator);
    let use_case = build_use_case(&file_config, orchestrator)?;
    let use_case = match transcript_logger(&file_config, log_dir.as_deref()) {
        Some(logger) => use_case.with_conversation_logger(logger),
        None => use_case,
    };

    // Chat mode
    if cli.chat {
        let mut repl = ChatRepl::new(Arc::new(use_case))
            .with_progress(!cli.quiet)
            .with_output(cli.output);
        repl.run().await?;
        drop(log_guard);
        return Ok(());
    }

    // Single request mode - request is required
    let Some(request) = cli.request.clone() else {
        bail!("A request is required. Use --chat for interactive mode.");
    };

    let cancellation = CancellationToken::new();
    let use_case = use_case.with_cancellation(cancellation.clone());
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nCancelling...");
            cancellation.cancel();
        }
    });

    let conversation = ConversationState::from_request(request);
    let progress: Box<dyn ProgressNotifier> = if cli.quiet {
        Box::new(NoProgress)
    } else if std::io::stderr().is_terminal() {
        Box::new(ProgressReporter::new())
    } else {
        Box::new(SimpleProgress)
    };

    match use_case
        .execute_with_progress(&conversation, progress.as_ref())
        .await
    {
        Ok(outcome) => {
            print!("{}", ConsoleFormatter::format(&outcome, cli.output));
            Ok(())
        }
        Err(error) => {
            eprint!("{}", ConsoleFormatter::format_error(&error));
            drop(log_guard);
            std::process::exit(if error.is_cancelled() { 130 } else { 1 });
        }
    }
}

/// Console logs go to stderr; with a log directory, a daily log file as well.
///
/// `RUST_LOG` wins when no `-v` flag is given.
fn init_tracing(verbose: u8, log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = if verbose == 0 {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(level)
    };

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(dir, "agent-thinker.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(file_layer)
        .init();

    Ok(guard)
}

// ==================== Dependency Injection ====================

fn build_use_case(
    config: &FileConfig,
    orchestrator: OrchestratorConfig,
) -> Result<RunResearchUseCase> {
    let (retry, _) = config.retry.to_policy();

    let settings = config
        .provider
        .to_settings()
        .context("No API key for the completion provider")?;
    info!("Using model {} at {}", settings.model, settings.base_url);
    let gateway = Arc::new(OpenAiCompletionGateway::new(settings)?);

    let services = &config.services;
    let search: Arc<dyn SearchPort> = match services.search_url() {
        Some(url) => Arc::new(HttpSearchService::new(url, services.timeout())?),
        None => Arc::new(DisabledSearch),
    };
    let scrape: Arc<dyn ScrapePort> = match services.scrape_url() {
        Some(url) => Arc::new(HttpScrapeService::new(url, services.timeout())?),
        None => {
            info!("No scrape service configured, downloading pages directly");
            Arc::new(DirectFetcher::new(services.timeout())?)
        }
    };

    let retriever = RetrievalAgent::new(search, scrape, build_cache(config))
        .with_format(orchestrator.output_format)
        .with_retry_policy(retry.clone())
        .with_max_concurrent_fetches(services.max_concurrent_fetches);

    Ok(RunResearchUseCase::new(
        Arc::new(LlmPlanner::new(gateway.clone(), retry.clone())),
        Arc::new(retriever),
        Arc::new(LlmSynthesizer::new(
            gateway.clone(),
            retry.clone(),
            orchestrator.default_use_cache,
        )),
        Arc::new(LlmValidator::new(gateway, retry)),
        orchestrator,
    ))
}

fn build_cache(config: &FileConfig) -> Arc<dyn PageCache> {
    match config.cache.backend {
        CacheBackend::Memory => Arc::new(InMemoryPageCache::new()),
        CacheBackend::File => {
            let path: Option<PathBuf> = config
                .cache
                .path
                .clone()
                .or_else(FilePageCache::default_path);
            match path {
                Some(path) => {
                    info!("Page cache: {}", path.display());
                    Arc::new(FilePageCache::new(path))
                }
                None => {
                    warn!("No cache directory on this platform, using an in-memory cache");
                    Arc::new(InMemoryPageCache::new())
                }
            }
        }
    }
}

fn transcript_logger(
    config: &FileConfig,
    log_dir: Option<&Path>,
) -> Option<Arc<dyn ConversationLogger>> {
    if !config.logging.transcript {
        return None;
    }
    let logger = JsonlTranscriptLogger::in_dir(log_dir?, chrono::Utc::now())?;
    info!("Writing run transcript to {}", logger.path().display());
    Some(Arc::new(logger))
}
