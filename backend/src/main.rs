//! # Backend Service
//!
//! Thin entry point that delegates to lib-web for server setup.
//!
//! `BIND_ADDRESS` overrides the listen address; everything else comes from lib-core's `Config`.

use lib_web::{start_server, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let defaults = ServerConfig::default();
    let config = ServerConfig {
        bind_address: std::env::var("BIND_ADDRESS").unwrap_or(defaults.bind_address),
        ..ServerConfig::default()
    };

    start_server(config).await
}
