//! Signup CLI - Command-line interface for the activity sign-up service
//!
//! Drives the same page controller a browser page would, printing the page as
//! text instead of drawing it.

mod shell;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use signup_client::{
    from_config, render_page, render_text, FileStore, KeyValueStore, MemoryStore, UiController,
};
use signup_core::{
    init_logging, log_operation_error, log_operation_start, log_operation_success, ClientConfig,
    LoggingConfig, UiMessage,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Parser)]
#[command(name = "signup")]
#[command(about = "Browse activities and manage student sign-ups")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show every activity with its participants
    List,

    /// Show who is logged in
    Status,

    /// Log in as a teacher
    Login { username: String, password: String },

    /// Log out and forget the stored session
    Logout,

    /// Register a student for an activity
    Register {
        /// Student email
        email: String,

        /// Activity name
        activity: String,
    },

    /// Remove a student from an activity
    Unregister {
        /// Activity name
        activity: String,

        /// Student email
        email: String,
    },

    /// Write the page as HTML
    Render {
        /// Output file, stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Interactive session with live message timers
    Shell {
        /// Keep the session in memory only
        #[arg(long)]
        ephemeral: bool,
    },

    /// Manage configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Initialize default configuration
        #[arg(long)]
        init: bool,

        /// Validate current configuration
        #[arg(long)]
        validate: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_ref())?;

    let logging_config = if cli.verbose {
        LoggingConfig::verbose()
    } else {
        config.logging.clone()
    };
    init_logging(&logging_config)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Starting signup CLI v{}", env!("CARGO_PKG_VERSION"));

    if !matches!(cli.command, Commands::Config { .. }) {
        config.validate()?;
    }

    match cli.command {
        Commands::Config {
            show,
            init,
            validate,
        } => {
            handle_config(&config, show, init, validate)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Shell { ephemeral } => {
            let store: Arc<dyn KeyValueStore> = if ephemeral {
                Arc::new(MemoryStore::new())
            } else {
                open_store(&config)
            };
            let controller = start_controller(&config, store).await?;
            shell::run(&controller).await?;
            controller.shutdown();
            Ok(ExitCode::SUCCESS)
        }
        command => {
            let controller = start_controller(&config, open_store(&config)).await?;
            let code = handle_command(&controller, command).await?;
            controller.shutdown();
            Ok(code)
        }
    }
}

fn load_config(config_path: Option<&PathBuf>) -> anyhow::Result<ClientConfig> {
    let mut config = match config_path {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            ClientConfig::from_file(path)?
        }
        None => match ClientConfig::default_paths().into_iter().find(|p| p.exists()) {
            Some(path) => {
                debug!("Loading configuration from {:?}", path);
                ClientConfig::from_file(&path)?
            }
            None => ClientConfig::default(),
        },
    };

    config.apply_env_overrides();
    Ok(config)
}

/// Open the session file. An unreadable store is not fatal: the run continues
/// logged out with an in-memory store.
fn open_store(config: &ClientConfig) -> Arc<dyn KeyValueStore> {
    let path = config.resolved_store_path();
    match FileStore::open(&path) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            e.log();
            warn!(
                path = %path.display(),
                "Session store unavailable, continuing without a stored session"
            );
            Arc::new(MemoryStore::new())
        }
    }
}

async fn start_controller(
    config: &ClientConfig,
    store: Arc<dyn KeyValueStore>,
) -> anyhow::Result<UiController> {
    let controller = from_config(config, store)?;
    controller.start().await;
    Ok(controller)
}

async fn handle_command(controller: &UiController, command: Commands) -> anyhow::Result<ExitCode> {
    match command {
        Commands::List => {
            print!("{}", render_text(&controller.page().await));
        }
        Commands::Status => {
            println!("{}", controller.page().await.user_status);
        }
        Commands::Login { username, password } => {
            log_operation_start!("login", username = %username);
            let message = controller.login(&username, &password).await;
            print_message(&message);
            if message.is_error() {
                log_operation_error!("login", message.text);
                return Ok(ExitCode::FAILURE);
            }
            // Let the delayed refresh run so the stored session and page agree
            controller.wait_idle().await;
            log_operation_success!("login", username = %username);
            println!("{}", controller.page().await.user_status);
        }
        Commands::Logout => {
            if !controller.is_authenticated().await {
                println!("Not logged in");
            } else {
                controller.logout().await;
                println!("{}", controller.page().await.user_status);
            }
        }
        Commands::Register { email, activity } => {
            return Ok(exit_code(&controller.signup(&email, &activity).await));
        }
        Commands::Unregister { activity, email } => {
            return Ok(exit_code(&controller.unregister(&activity, &email).await));
        }
        Commands::Render { output } => {
            log_operation_start!("render_page");
            let html = render_page(&controller.page().await)?;
            log_operation_success!("render_page", bytes = html.len());
            match output {
                Some(path) => {
                    std::fs::write(&path, html)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("Page written to {}", path.display());
                }
                None => println!("{}", html),
            }
        }
        Commands::Shell { .. } | Commands::Config { .. } => {
            bail!("command is handled before the controller starts")
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn handle_config(config: &ClientConfig, show: bool, init: bool, validate: bool) -> anyhow::Result<()> {
    if init {
        let config_path = ClientConfig::default_paths()
            .into_iter()
            .next()
            .context("No configuration directory available")?;
        if config_path.exists() {
            println!("Configuration already exists at: {:?}", config_path);
        } else {
            ClientConfig::default().save_to_file(&config_path)?;
            println!("✅ Configuration initialized at: {:?}", config_path);
        }
    }

    if show {
        println!("📋 Current configuration:");
        println!("{}", toml::to_string_pretty(config)?);
        println!("Session store: {}", config.resolved_store_path().display());
    }

    if validate {
        match config.validate() {
            Ok(()) => println!("✅ Configuration is valid"),
            Err(e) => {
                println!("❌ Configuration validation failed: {}", e);
                return Err(e.into());
            }
        }
    }

    if !(init || show || validate) {
        println!("Nothing to do. Use --show, --init or --validate.");
    }

    Ok(())
}

pub(crate) fn print_message(message: &UiMessage) {
    let icon = if message.is_error() { "❌" } else { "✅" };
    println!("{} {}", icon, message.text);
}

fn exit_code(message: &UiMessage) -> ExitCode {
    print_message(message);
    if message.is_error() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
