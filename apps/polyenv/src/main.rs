//! polyenv - Multi-interpreter test environment provisioner
//!
//! Entry point of the image: `polyenv provision` runs once at build time,
//! and the default command drops into a shell with the provisioned
//! interpreters and artifact on the search path.

mod cli;
mod display;
mod error;
mod events;
mod logging;
mod shell;

use crate::cli::{Cli, Commands};
use crate::display::OutputRenderer;
use crate::error::CliError;
use crate::events::EventHandler;
use clap::Parser;
use polyenv_config::{constants, Config};
use polyenv_events::EventReceiver;
use polyenv_net::{NetClient, NetConfig};
use polyenv_ops::{OperationResult, OpsContextBuilder, OpsCtx};
use polyenv_platform::Platform;
use polyenv_types::{ColorChoice, OutputFormat};
use std::process;
use std::sync::Arc;
use tokio::select;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Parse command line arguments first to check for JSON mode
    let cli = Cli::parse();
    let json_mode = cli.global.json;

    init_tracing(json_mode, cli.global.debug);

    if let Err(e) = run(cli).await {
        error!("Application error: {}", e);
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// Main application logic
async fn run(cli: Cli) -> Result<(), CliError> {
    info!("Starting polyenv v{}", env!("CARGO_PKG_VERSION"));

    // Precedence: file (or defaults), then environment, then CLI flags
    let mut config = Config::load_or_default(cli.global.config.as_deref()).await?;
    config.merge_env()?;
    apply_cli_config(&mut config, &cli.global, cli.command.as_ref());

    let command = cli.command.unwrap_or(Commands::Shell);
    let Commands::Provision { dry_run, .. } = command else {
        return Err(shell::enter(&config));
    };

    let json_output = cli.global.json || config.general.default_output == OutputFormat::Json;
    let renderer = OutputRenderer::new(json_output, config.general.color);

    // Everything is validated before the first side effect
    let params = config.provision_params()?;

    let result = if dry_run {
        OperationResult::ProvisionPlan(polyenv_ops::plan(&params))
    } else {
        let (event_sender, event_receiver) = polyenv_events::channel();
        let fetcher = NetClient::new(NetConfig::with_timeouts(
            config.network.timeout,
            config.network.connect_timeout,
        ))?;

        let ctx = OpsContextBuilder::new()
            .with_platform(Platform::current())
            .with_fetcher(Arc::new(fetcher))
            .with_params(params)
            .with_event_sender(event_sender)
            .build()?;

        let colors_enabled = match config.general.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => console::Term::stderr().features().colors_supported(),
        };
        let mut event_handler = EventHandler::new(colors_enabled, cli.global.debug, json_output);

        execute_command_with_events(ctx, event_receiver, &mut event_handler).await?
    };

    renderer.render_result(&result)?;

    info!("Command completed successfully");
    Ok(())
}

/// Run the provisioning pipeline while draining its event stream
async fn execute_command_with_events(
    ctx: OpsCtx,
    mut event_receiver: EventReceiver,
    event_handler: &mut EventHandler,
) -> Result<OperationResult, CliError> {
    let mut command_future = Box::pin(async move {
        polyenv_ops::provision(&ctx)
            .await
            .map(OperationResult::ProvisionReport)
            .map_err(CliError::from)
    });

    loop {
        select! {
            result = &mut command_future => {
                // Drain any remaining events
                while let Ok(event) = event_receiver.try_recv() {
                    event_handler.handle_event(event);
                }
                return result;
            }

            event = event_receiver.recv() => {
                if let Some(event) = event {
                    event_handler.handle_event(event);
                }
            }
        }
    }
}

/// Initialize tracing/logging
fn init_tracing(json_mode: bool, debug_enabled_flag: bool) {
    let debug_enabled = std::env::var("RUST_LOG").is_ok() || debug_enabled_flag;
    let filter = |fallback: &str| {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback))
    };

    if debug_enabled {
        // Debug mode: structured JSON logs to file
        let log_dir = std::path::Path::new(constants::LOGS_DIR);
        if let Err(e) = std::fs::create_dir_all(log_dir) {
            if !json_mode {
                eprintln!("Warning: Failed to create log directory: {e}");
            }
        }

        let log_file = log_dir.join(format!(
            "polyenv-{}.log",
            chrono::Utc::now().format("%Y%m%d-%H%M%S")
        ));

        match std::fs::File::create(&log_file) {
            Ok(file) => {
                tracing_subscriber::fmt()
                    .json()
                    .with_writer(file)
                    .with_env_filter(filter("info,polyenv=debug,polyenv_ops=debug"))
                    .init();
                if !json_mode {
                    eprintln!("Debug logging enabled: {}", log_file.display());
                }
                return;
            }
            Err(e) if !json_mode => {
                eprintln!("Warning: Failed to create log file: {e}");
                tracing_subscriber::fmt()
                    .with_writer(std::io::stderr)
                    .with_env_filter(filter("info,polyenv=info,polyenv_ops=info"))
                    .init();
                return;
            }
            Err(_) => {}
        }
    }

    if json_mode {
        // Keep stdout clean for the JSON document
        tracing_subscriber::fmt()
            .with_writer(std::io::sink)
            .with_env_filter("off")
            .init();
    } else {
        // Normal mode: warnings and errors only
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(filter("warn"))
            .init();
    }
}

/// Apply CLI configuration overrides (highest precedence)
fn apply_cli_config(config: &mut Config, global: &cli::GlobalArgs, command: Option<&Commands>) {
    if let Some(color) = global.color {
        config.general.color = color;
    }

    if let Some(Commands::Provision {
        runtimes,
        retries,
        artifact_url,
        ..
    }) = command
    {
        if !runtimes.is_empty() {
            config.runtimes.versions.clone_from(runtimes);
        }
        if let Some(retries) = retries {
            config.network.retries = *retries;
        }
        if let Some(url) = artifact_url {
            config.artifact.url = Some(url.clone());
        }
    }
}
