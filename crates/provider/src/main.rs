//! Terraform Provider for VMware Aria Automation
//!
//! This binary implements the Terraform Plugin Protocol v6 for managing vRA
//! projects, cloud zones, machines and deployments. Logs go to stderr;
//! stdout carries the plugin handshake.

use tracing::{error, info};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!(
        "Starting vRA Terraform Provider {}",
        env!("CARGO_PKG_VERSION")
    );

    if let Err(e) = terraform_provider_vra::server::serve().await {
        error!("{:#}", e);
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}
