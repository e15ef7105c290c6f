// file: src/main.rs
// description: commandline application entry point with command handling
// reference: application bootstrap and orchestration

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use docs_sync::utils::logging::{format_error, format_info, format_success, format_warning};
use docs_sync::{Config, InitOutcome, PushOutcome, RepositoryHandle, mcp::DocsSyncMcp, tools};
use indicatif::{ProgressBar, ProgressStyle};
use rmcp::{ServiceExt, transport::stdio};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "docs_sync")]
#[command(version)]
#[command(about = "Keep a documentation repository in sync and expose it as agent tools", long_about = None)]
struct Cli {
    #[arg(short, long, value_name = "FILE", env = "DOCS_SYNC_CONFIG")]
    config: Option<PathBuf>,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    /// Show spinners while network operations run
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    progress: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and integrate the latest remote changes
    Pull,

    /// Stage all changes, commit and push
    Push {
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Show branch, uncommitted changes and the last commit
    Status {
        #[arg(long)]
        json: bool,
    },

    /// List recent commits
    Log {
        #[arg(short = 'n', long, default_value_t = 10)]
        limit: usize,
    },

    /// Copy a file or directory into the working copy and push it
    Publish {
        source: PathBuf,

        /// Destination relative to the working copy (default: source file name)
        #[arg(long)]
        dest: Option<PathBuf>,

        #[arg(short, long)]
        message: Option<String>,
    },

    /// Start MCP (Model Context Protocol) server for agentic tool integration
    Mcp {
        #[arg(long, default_value = "stdio")]
        transport: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    docs_sync::utils::logging::init_logger(cli.color, cli.verbose);

    let config = match cli.config.as_deref() {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            Config::load(Some(path)).context("Failed to load configuration")?
        }
        None => Config::load(None).unwrap_or_else(|e| {
            warn!("Falling back to built-in defaults: {}", e);
            Config::default_config()
        }),
    };

    match cli.command {
        Commands::Pull => cmd_pull(&config, cli.progress)?,
        Commands::Push { message } => cmd_push(&config, message.as_deref(), cli.progress)?,
        Commands::Status { json } => cmd_status(&config, json)?,
        Commands::Log { limit } => cmd_log(&config, limit)?,
        Commands::Publish {
            source,
            dest,
            message,
        } => cmd_publish(&config, &source, dest.as_deref(), message.as_deref(), cli.progress)?,
        Commands::Mcp { transport } => cmd_mcp(&config, &transport).await?,
    }

    Ok(())
}

fn spinner(message: &str, enabled: bool) -> ProgressBar {
    let bar = if enabled {
        ProgressBar::new_spinner()
    } else {
        ProgressBar::hidden()
    };
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

fn open_handle(config: &Config, show_progress: bool) -> RepositoryHandle {
    let bar = spinner(
        &format!("Preparing {}", config.repository.local_path.display()),
        show_progress,
    );
    let handle = RepositoryHandle::ensure(config);
    bar.finish_and_clear();

    match handle.init_outcome() {
        InitOutcome::LocalFallback { cause } => eprintln!(
            "{}",
            format_warning(&format!(
                "Working with a local-only repository (clone failed: {})",
                cause
            ))
        ),
        InitOutcome::Reinitialized => eprintln!(
            "{}",
            format_warning(&format!(
                "Re-initialized {} as a new repository",
                handle.local_path().display()
            ))
        ),
        _ => {}
    }

    handle
}

fn cmd_pull(config: &Config, show_progress: bool) -> Result<()> {
    let handle = open_handle(config, show_progress);

    let bar = spinner("Pulling latest changes", show_progress);
    let result = handle.pull();
    bar.finish_and_clear();

    let outcome = result.context("Failed to pull changes")?;
    println!("{}", format_success(&format!("Pull: {}", outcome)));
    Ok(())
}

fn cmd_push(config: &Config, message: Option<&str>, show_progress: bool) -> Result<()> {
    let handle = open_handle(config, show_progress);
    let message = message.unwrap_or(&config.repository.default_commit_message);

    let bar = spinner("Pushing changes", show_progress);
    let result = handle.push(message);
    bar.finish_and_clear();

    report_push(result.context("Failed to push changes")?);
    Ok(())
}

fn report_push(outcome: PushOutcome) {
    match outcome {
        PushOutcome::NoChanges => println!("{}", format_info(tools::NO_CHANGES)),
        pushed => println!("{}", format_success(&format!("Push: {}", pushed))),
    }
}

fn cmd_status(config: &Config, json: bool) -> Result<()> {
    if json {
        println!("{}", tools::get_repo_status(config).to_json());
        return Ok(());
    }

    let handle = open_handle(config, false);
    let status = match handle.status() {
        Ok(status) => status,
        Err(e) => {
            println!("{}", format_error(&e.to_string()));
            return Err(e).context("Failed to read repository status");
        }
    };

    println!("Repository:      {}", handle.local_path().display());
    println!("Remote:          {}", handle.remote_url());
    println!("Remote linked:   {}", status.remote_connected);
    println!("Branch:          {}", status.active_branch);
    println!("Dirty:           {}", status.is_dirty);
    println!("Untracked files: {}", status.untracked_files);
    match (status.last_commit, status.last_commit_msg) {
        (Some(id), Some(msg)) => println!("Last commit:     {} {}", id, msg),
        _ => println!("Last commit:     (none)"),
    }

    Ok(())
}

fn cmd_log(config: &Config, limit: usize) -> Result<()> {
    let handle = open_handle(config, false);
    let commits = handle.history(limit).context("Failed to read history")?;

    if commits.is_empty() {
        println!("{}", format_info("No commits yet"));
    }
    for commit in commits {
        println!(
            "{} {} {} <{}>  {}",
            commit.short_id,
            commit.committed_at.format("%Y-%m-%d %H:%M"),
            commit.author_name,
            commit.author_email,
            commit.summary()
        );
    }

    Ok(())
}

fn cmd_publish(
    config: &Config,
    source: &std::path::Path,
    dest: Option<&std::path::Path>,
    message: Option<&str>,
    show_progress: bool,
) -> Result<()> {
    let handle = open_handle(config, show_progress);
    let message = message.unwrap_or(&config.repository.default_commit_message);

    let bar = spinner(&format!("Publishing {}", source.display()), show_progress);
    let result = handle.publish(source, dest, message);
    bar.finish_and_clear();

    report_push(result.with_context(|| format!("Failed to publish {}", source.display()))?);
    Ok(())
}

async fn cmd_mcp(config: &Config, transport: &str) -> Result<()> {
    info!("Starting MCP server (transport: {})", transport);

    if transport != "stdio" {
        error!("Only stdio transport is currently supported");
        return Err(anyhow::anyhow!("Unsupported transport: {}", transport));
    }

    let mcp_server = DocsSyncMcp::new(config.clone());

    info!("MCP server ready. Available tools:");
    for tool in mcp_server.get_tool_router().list_all() {
        info!("  - {}", tool.name);
    }

    let service = mcp_server
        .serve(stdio())
        .await
        .context("Failed to start MCP stdio transport")?;
    service.waiting().await?;

    Ok(())
}
