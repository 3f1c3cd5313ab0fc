//! `deskpilot host`: native-messaging host on stdio.

use tracing::{error, info};

use deskpilot_config::Config;

use crate::register::build_host;

/// Serve native-messaging frames until stdin closes.
///
/// Stdout carries frames only; logs go to stderr and the log file.
pub(crate) async fn run_host(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let service = build_host(config).await;
    info!("deskpilot host {} starting", config.host.version);

    if let Err(e) = service.serve(tokio::io::stdin(), tokio::io::stdout()).await {
        error!("Native host stopped: {}", e);
        return Err(e.into());
    }

    info!("deskpilot host exiting");
    Ok(())
}
