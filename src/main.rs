mod logging;

use colored::Colorize;
use log::{error, info};
use thiserror::Error;
use tokio::runtime;
use vibefm_server::{run_server, ConfigError, ServerConfig};

#[derive(Debug, Error)]
enum VibeError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

impl VibeError {
    fn hint(&self) -> String {
        match self {
            VibeError::Config(_) => "Check the VIBEFM_* environment variables and try again.".to_string(),
            VibeError::Io(_) => "Make sure the port is not already in use, or set VIBEFM_SERVER_PORT to another one.".to_string(),
        }
    }
}

fn run() -> Result<(), VibeError> {
    let config = ServerConfig::from_env()?;

    info!("Building async runtime...");
    let main_runtime = runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("vibefm-async")
        .build()?;

    main_runtime.block_on(run_server(config))?;
    Ok(())
}

fn main() {
    if let Err(e) = logging::init_logger() {
        eprintln!("Logging could not be initialized: {}", e);
    }

    if let Err(error) = run() {
        error!("{} Read the error below to troubleshoot the issue.", "vibefm failed to start!".bold().red());
        error!("{}", error);
        error!("{}", format!("Hint: {}", error.hint()).dimmed().italic());
    }
}
