//! Insurance CRM - command-line client
//!
//! # Usage
//!
//! ```bash
//! insurance-crm clients list
//! insurance-crm clients show 7
//! CRM_BASE_URL=https://crm.example.com/api insurance-crm policies add 7 \
//!     --type TERM_LIFE --coverage 250000 --term-years 20 \
//!     --beneficiary-name "Jane Doe" --beneficiary-relation Spouse
//! ```
//!
//! # Environment Variables
//!
//! * `CRM_BASE_URL` - Service base URL (default: http://localhost:8080/api)
//! * `CRM_TIMEOUT_SECS` - Timeout for reads and estimates (default: 30)
//! * `CRM_LOG_LEVEL` - Log level when `RUST_LOG` is unset (default: warn)
//! * `CRM_LOG_JSON` - Emit JSON log lines (default: false)

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use infra_http::CrmApiClient;
use interface_cli::{run, AppConfig, Cli, Services};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::from_env().context("Invalid CRM_* configuration")?;
    init_tracing(&config.log_level, config.log_json);

    tracing::debug!(base_url = %config.api.base_url, "Using CRM service");

    let api = CrmApiClient::new(config.api).context("Failed to set up the CRM client")?;
    let services = Services::from_api(api);

    let mut stdout = std::io::stdout().lock();
    if let Err(e) = run(cli, &services, &mut stdout).await {
        eprintln!("{e}");
        std::process::exit(1);
    }
    Ok(())
}

/// Initializes the tracing subscriber; logs go to stderr
fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}
