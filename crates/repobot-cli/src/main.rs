//! Repobot CLI - Command-line interface for the GitHub repository agent.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use repobot_agent::{AgentServer, Dispatcher};
use repobot_core::{Config, RepoRequest};
use repobot_github::GitHubClient;
use tracing_subscriber::EnvFilter;

/// Keys accepted by `config get` and shown by `config show`.
const CONFIG_KEYS: [&str; 4] = [
    "github.base_url",
    "github.token",
    "github.issue_token",
    "agent.format",
];

#[derive(Parser)]
#[command(name = "repobot")]
#[command(author, version, about = "Repobot - GitHub repository agent", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this config file instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the agent on stdin/stdout
    Serve,

    /// Run a single request and print the reply
    Ask {
        /// Action to run (e.g. get_details, list_issues)
        #[arg(short, long)]
        action: String,

        /// Repository URL
        #[arg(short, long, default_value = "")]
        repo_url: String,

        /// Title for create_issue
        #[arg(long)]
        issue_title: Option<String>,

        /// Body for create_issue
        #[arg(long)]
        issue_body: Option<String>,

        /// Username for collaborator actions
        #[arg(long, alias = "collaborator")]
        collaborator_username: Option<String>,

        /// Second repository URL for compare
        #[arg(long)]
        compare_repo_url: Option<String>,

        /// Username or profile URL for get_user_info
        #[arg(long, alias = "user")]
        user_info: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Get a configuration value (e.g. github.base_url)
    Get { key: String },

    /// Set a configuration value (e.g. agent.format html)
    Set { key: String, value: String },

    /// Print the config file path
    Path,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr, stdout carries protocol traffic
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config_path = match cli.config {
        Some(path) => path,
        None => Config::config_path()?,
    };

    match cli.command {
        Some(Commands::Serve) => {
            let dispatcher = build_dispatcher(&config_path)?;
            let mut server = AgentServer::new(dispatcher);
            server.run().await?;
        }
        Some(Commands::Ask {
            action,
            repo_url,
            issue_title,
            issue_body,
            collaborator_username,
            compare_repo_url,
            user_info,
        }) => {
            let dispatcher = build_dispatcher(&config_path)?;
            let request = RepoRequest {
                repo_url,
                action,
                issue_title,
                issue_body,
                collaborator_username,
                compare_repo_url,
                user_info,
            };

            let response = dispatcher.dispatch(&request).await;
            println!("{}", response.message);
        }
        Some(Commands::Config { command }) => handle_config(command, &config_path)?,
        None => {
            println!("Repobot - GitHub repository agent");
            println!("Run with --help for usage information");
        }
    }

    Ok(())
}

/// Load config (file, then environment) and wire the GitHub client into a dispatcher.
fn build_dispatcher(config_path: &Path) -> anyhow::Result<Dispatcher> {
    let config = Config::load_from(config_path)?.with_env()?;

    if config.github.credentials().read().is_none() {
        tracing::warn!("No GitHub token configured, requests are unauthenticated");
    }

    let client = GitHubClient::from_config(&config.github)
        .context("Failed to create GitHub client")?;

    Ok(Dispatcher::new(Arc::new(client)).with_format(config.agent.format))
}

fn handle_config(command: ConfigCommands, config_path: &Path) -> anyhow::Result<()> {
    match command {
        ConfigCommands::Show => {
            let config = Config::load_from(config_path)?;
            println!("Config file: {}", config_path.display());
            for key in CONFIG_KEYS {
                let value = config.get(key)?;
                println!("{} = {}", key, value.as_deref().unwrap_or("(not set)"));
            }
        }
        ConfigCommands::Get { key } => {
            let config = Config::load_from(config_path)?;
            match config.get(&key)? {
                Some(value) => println!("{}", value),
                None => println!("(not set)"),
            }
        }
        ConfigCommands::Set { key, value } => {
            let mut config = Config::load_from(config_path)?;
            config.set(&key, &value)?;
            config.save_to(config_path)?;
            println!("Set {}", key);
        }
        ConfigCommands::Path => println!("{}", config_path.display()),
    }

    Ok(())
}
