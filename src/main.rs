use clap::Parser;
use colored::*;
use eyre::{Context, Result, eyre};
use log::{info, warn};
use std::fs;
use std::io::Write;
use std::sync::Arc;

use casebridge::config::Config;
use casebridge::gitea::GiteaClient;
use casebridge::kibana::KibanaClient;
use casebridge::logging::LogFormat;
use casebridge::reconcile::{CaseOutcome, Reconciler, ReconcilerConfig};
use casebridge::severity::SeverityLabels;

mod cli;

use cli::Cli;
use cli::commands::Commands;

fn setup_logging(config: &Config, verbose: bool) -> Result<()> {
    let level = if verbose {
        "debug".to_string()
    } else {
        config.log_level.clone().unwrap_or_else(|| "info".to_string())
    };

    // RUST_LOG wins over the config file unless -v was given
    let mut builder = if verbose {
        let mut b = env_logger::Builder::new();
        b.parse_filters(&level);
        b
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
    };

    if let Some(template) = &config.log_format {
        let format = LogFormat::new(template.as_str()).context("Invalid log_format")?;
        builder.format(move |buf, record| {
            let line = format.render(buf.timestamp(), record.level(), record.target(), record.args());
            writeln!(buf, "{}", line)
        });
    }

    if let Some(log_file) = &config.log_file {
        if let Some(parent) = log_file.parent() {
            fs::create_dir_all(parent).context("Failed to create log directory")?;
        }
        let target = Box::new(
            fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_file)
                .context("Failed to open log file")?,
        );
        builder.target(env_logger::Target::Pipe(target));
    }

    builder.init();

    info!("Logging initialized");
    Ok(())
}

fn build_reconciler(config: &Config) -> Result<Reconciler<KibanaClient, GiteaClient>> {
    let kibana = KibanaClient::new(&config.kibana).context("Failed to create Kibana client")?;
    let gitea = GiteaClient::new(&config.gitea).context("Failed to create Gitea client")?;
    Ok(Reconciler::new(
        Arc::new(kibana),
        Arc::new(gitea),
        ReconcilerConfig::from_config(config),
    ))
}

async fn run_forever(config: &Config) -> Result<()> {
    let reconciler = build_reconciler(config)?;

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl-C, running until killed: {}", e);
            std::future::pending::<()>().await;
        }
    };

    let stats = reconciler.run_until(shutdown).await;
    info!(
        "Stopped after {} cycles: processed={} skipped={} failed={} poll_failures={}",
        stats.cycles, stats.processed, stats.skipped, stats.failed, stats.poll_failures
    );
    Ok(())
}

async fn run_once(config: &Config) -> Result<()> {
    let reconciler = build_reconciler(config)?;
    let report = reconciler.run_cycle().await;

    if let Some(err) = &report.poll_error {
        return Err(eyre!("Polling cases failed: {}", err));
    }

    println!("{} {}", "Cycle:".cyan(), report);
    for outcome in &report.outcomes {
        match outcome {
            CaseOutcome::Processed { case_id, issue_url } => {
                println!("  {} {} -> {}", "processed".green(), case_id, issue_url);
            }
            CaseOutcome::Skipped { case_id, reason } => {
                println!("  {} {}: {}", "skipped".yellow(), case_id, reason);
            }
            CaseOutcome::Failed {
                case_id, stage, error, ..
            } => {
                println!("  {} {} at {}: {}", "failed".red(), case_id, stage, error);
            }
        }
    }
    Ok(())
}

fn run_check(config: &Config) -> Result<()> {
    println!("{}", "Configuration OK".green());
    println!("  kibana: {} (verify_ssl={})", config.kibana.url, config.kibana.verify_ssl);
    println!(
        "  gitea:  {} repo={} (verify_ssl={})",
        config.gitea.url,
        config.gitea.repo_ref(),
        config.gitea.verify_ssl
    );
    println!(
        "  tags:   {:?} -> {:?} every {}s",
        config.search_tag, config.success_tag, config.search_interval
    );

    let labels = SeverityLabels::new(config.severity_labels.clone());
    for (severity, label) in labels.iter() {
        println!("  {:<9} label {}", severity.to_string(), label);
    }
    for severity in labels.unmapped() {
        println!("  {:<9} {}", severity.to_string(), "unmapped (cases will be skipped)".yellow());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration; any problem here is fatal
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    setup_logging(&config, cli.is_verbose()).context("Failed to setup logging")?;

    if let Some(source) = &config.source {
        info!("Loaded config from: {}", source.display());
    }
    for warning in config.warnings() {
        warn!("{}", warning);
    }

    match cli.command.clone().unwrap_or(Commands::Run) {
        Commands::Run => run_forever(&config).await,
        Commands::Once => run_once(&config).await,
        Commands::Check => run_check(&config),
    }
}
