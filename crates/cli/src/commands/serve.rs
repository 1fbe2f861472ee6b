//! `helpbot serve` — start the HTTP chat gateway.

use helpbot_config::AppConfig;

pub async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    // Fail at startup, not per-request, when the credential is missing.
    config.require_api_key()?;
    helpbot_gateway::start(config).await
}
