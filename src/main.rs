//! Pomodoro session host
//!
//! Runs the session controller until interrupted:
//! - 25 minutes of focused work
//! - 5 minutes of break
//! - Ctrl-C or SIGTERM shuts the controller down within a bounded deadline

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::time::Instant;
use tracing::info;

use pomodoro_session::cli::{Cli, Commands, Display, LabelUpdater, RunArgs};
use pomodoro_session::{SessionConfig, SessionController};

/// Time budget granted to controller shutdown.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Exit status used when the smoke check fails.
const SMOKE_FAILURE_EXIT_CODE: i32 = 2;

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_tracing(cli.verbose);

    // Execute command
    if let Err(e) = execute(cli).await {
        Display::show_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    if cli.verbose {
        info!("Verbose mode enabled");
    }

    match cli.command {
        Some(Commands::Run(args)) => run(args).await,
        Some(Commands::Smoke) => {
            smoke().await;
            Ok(())
        }
        None => run(RunArgs::default()).await,
    }
}

/// Constructs the controller and shuts it down straight away.
async fn smoke() {
    let result = async {
        let controller = SessionController::new(SessionConfig::default())?;
        controller.shutdown(Instant::now() + SHUTDOWN_TIMEOUT).await
    }
    .await;

    if let Err(e) = result {
        Display::show_error(&format!("smoke shutdown error: {}", e));
        std::process::exit(SMOKE_FAILURE_EXIT_CODE);
    }
    Display::show_smoke_success();
}

/// Runs the controller until a termination signal arrives.
async fn run(args: RunArgs) -> Result<()> {
    let controller =
        SessionController::new(args.config()).context("セッションコントローラーの作成に失敗しました")?;
    info!(
        pomodoro_minutes = args.pomodoro,
        break_minutes = args.break_time,
        "starting session controller"
    );

    let json = args.json;
    let label = LabelUpdater::spawn(&controller, args.refresh_interval(), move |status| {
        Display::show_status(&status, json);
    });

    if let Some(kind) = args.start {
        controller.start(kind.into());
    }

    wait_for_termination().await?;
    info!("signal received, shutting down");

    let result = controller.shutdown(Instant::now() + SHUTDOWN_TIMEOUT).await;
    label.stop();
    result.context("シャットダウンに失敗しました")?;

    info!("exited");
    Ok(())
}

/// Waits for Ctrl-C, or SIGTERM on Unix.
async fn wait_for_termination() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate =
            signal(SignalKind::terminate()).context("SIGTERMハンドラの登録に失敗しました")?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result.context("Ctrl-Cの待機に失敗しました")?,
            _ = terminate.recv() => {}
        }
    }

    #[cfg(not(unix))]
    tokio::signal::ctrl_c()
        .await
        .context("Ctrl-Cの待機に失敗しました")?;

    Ok(())
}
