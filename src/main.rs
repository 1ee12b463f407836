use clap::Parser;
use jiho::config::{PlaybackConfig, Settings};
use jiho::ui::Args;
use std::error::Error;
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const LOG_TARGET: &str = "jiho::main";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_tracing(&args);

    // Load configuration, creating the default file on first run
    let config_path = match &args.config_file {
        Some(path) => path.clone(),
        None => {
            let path = Settings::default_path();
            Settings::ensure_exists(&path)?;
            path
        }
    };
    info!(target: LOG_TARGET, "Loading configuration from {}", config_path.display());

    let mut settings = Settings::load(&config_path).inspect_err(|e| {
        error!(target: LOG_TARGET, "Failed to load {}: {}", config_path.display(), e);
    })?;
    args.apply_overrides(&mut settings);

    let config = PlaybackConfig::from_settings(&settings).inspect_err(|e| {
        error!(target: LOG_TARGET, "Cannot start: {}", e);
    })?;
    info!(target: LOG_TARGET, "Sound source: {}", config.sound_source());

    let (shutdown_tx, shutdown_rx) = broadcast::channel::<()>(1);
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(());
    });

    jiho::run(&config, &settings.alsa_device, shutdown_rx).await.inspect_err(|e| {
        error!(target: LOG_TARGET, "Hourly chime stopped: {}", e);
    })?;

    info!(target: LOG_TARGET, "Goodbye.");
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM. A handler that cannot be installed never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(target: LOG_TARGET, "Unable to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(target: LOG_TARGET, "Unable to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!(target: LOG_TARGET, "Received Ctrl-C, shutting down..."),
        _ = terminate => info!(target: LOG_TARGET, "Received terminate signal, shutting down..."),
    }
}

fn init_tracing(args: &Args) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    if args.log_json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
