mod bluetooth;
mod config;
mod models;
mod protocol;
mod utils;

use log::{error, info};
use tokio::time::{sleep, Duration};

use bluetooth::scanner::listen_for_sensors;
use config::SensorConfig;

const RESTART_DELAY_SECS: u64 = 10;

async fn main_loop(config: SensorConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        "Starting sensor listener for device {}",
        config.device_signature
    );

    loop {
        // A scan ends when the adapter powers off or BlueZ goes away;
        // neither is fatal, so wait and start over
        match listen_for_sensors(&config).await {
            Ok(()) => info!("Scan stopped"),
            Err(e) => error!("Scan failed: {}", e),
        }

        info!("Restarting scan in {} seconds", RESTART_DELAY_SECS);
        sleep(Duration::from_secs(RESTART_DELAY_SECS)).await;
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = SensorConfig::new();

    // Initialize logging, verbose output when DEBUG is set
    let level = match &config {
        Ok(config) if config.verbose => log::LevelFilter::Debug,
        _ => log::LevelFilter::Info,
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp_secs()
        .init();

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e);
        }
    };

    // Handle Ctrl+C gracefully
    let (tx, mut rx) = tokio::sync::oneshot::channel();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            // Keep the sender alive so the listener keeps running
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        let _ = tx.send(());
    });

    // Run main loop or wait for shutdown signal
    tokio::select! {
        result = main_loop(config) => {
            match result {
                Ok(_) => info!("Program completed successfully"),
                Err(e) => error!("Fatal error: {}", e),
            }
        }
        _ = &mut rx => {
            info!("Program terminated by user. Exiting gracefully.");
        }
    }

    Ok(())
}
