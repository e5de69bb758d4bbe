use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use loaf_core::logger::{LogLevel, Logger};
use loaf_core::{
    Cli, Config, Manifest, ManifestError, ProcessRunner, Reporter, RunHistory, RunRecord,
    RunSummary, Scheduler, ToolCommands,
};
use std::path::Path;
use std::time::Instant;
use tokio::sync::mpsc;

fn fail(logger: &Logger, message: &str) -> ! {
    logger.log(LogLevel::Error, message);
    std::process::exit(1);
}

fn manifest_key(path: &Path) -> String {
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}

fn show_history(config: &Config, count: usize) -> Result<()> {
    let logger = Logger::new();
    let history = RunHistory::new(config.storage_path(), config.history.max_runs)
        .context("Failed to load history")?;

    let entries = history.entries();
    if entries.is_empty() {
        logger.log(LogLevel::Info, "No runs recorded yet.");
        return Ok(());
    }

    let count = count.min(entries.len());
    logger.log(LogLevel::Info, &format!("Last {} runs:", count));

    for entry in entries.iter().rev().take(count) {
        let level = if entry.success() {
            LogLevel::Success
        } else {
            LogLevel::Error
        };
        let resume = entry
            .resume_from
            .map(|skip| format!(" | resume with --skip {}", skip))
            .unwrap_or_default();
        logger.log(
            level,
            &format!(
                "{} | {} | {:.1}s | {} built, {} failed, {} skipped{}",
                entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
                entry.manifest,
                entry.duration,
                entry.succeeded,
                entry.failed,
                entry.skipped,
                resume
            ),
        );
    }

    Ok(())
}

fn record_run(config: &Config, record: RunRecord) -> Result<()> {
    let mut history = RunHistory::new(config.storage_path(), config.history.max_runs)
        .context("Failed to load history")?;
    history.add_entry(record).context("Failed to save history")
}

async fn run_manifest(cli: &Cli, config: &Config, path: &Path) -> Result<()> {
    let logger = Logger::new();

    if !path.exists() {
        fail(&logger, &format!("Unknown file '{}'.", path.display()));
    }

    let manifest = match Manifest::load(path) {
        Ok(manifest) => manifest,
        Err(ManifestError::Parse(err)) => fail(&logger, &format!("{}: {}", path.display(), err)),
        Err(err) => fail(&logger, &err.to_string()),
    };

    for directive in manifest.unknown_directives() {
        logger.log(
            LogLevel::Warning,
            &format!("Ignoring unknown directive '!{}'", directive),
        );
    }

    let key = manifest_key(path);
    let record_history = config.history.enabled && !cli.no_history;

    if record_history && cli.skip == 0 {
        if let Ok(history) = RunHistory::new(config.storage_path(), config.history.max_runs) {
            if let Some(skip) = history.last_failure_for(&key).and_then(|r| r.resume_from) {
                logger.log(
                    LogLevel::Info,
                    &format!("Last run of this manifest failed. Resume with --skip {}", skip),
                );
            }
        }
    }

    let run_config = cli.run_config(config, manifest.pull());
    let runner = ProcessRunner::new(ToolCommands::new(&config.tools));

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let reporter = Reporter::new(run_config.verbose, run_config.show_errors)
        .spawn(event_rx, Logger::new());

    let start = Instant::now();
    let outcomes = {
        let scheduler = Scheduler::new(runner, run_config.clone()).with_events(event_tx);
        scheduler.run(&manifest).await
    };
    let elapsed = start.elapsed();

    reporter.await.context("reporter task panicked")?;

    if record_history {
        let summary = RunSummary::from_outcomes(&outcomes);
        let record = RunRecord::new(key, run_config.skip, elapsed, &summary);
        if let Err(err) = record_run(config, record) {
            logger.log(LogLevel::Warning, &format!("{:#}", err));
        }
    }

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let logger = Logger::new();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => err.exit(),
            _ => {
                let _ = err.print();
                std::process::exit(1);
            }
        },
    };

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => fail(&logger, &format!("{:#}", err)),
    };

    if let Some(count) = cli.history {
        return show_history(&config, count);
    }

    let Some(path) = cli.manifest.clone() else {
        fail(&logger, "Please specify a file to build!");
    };

    run_manifest(&cli, &config, &path).await
}
