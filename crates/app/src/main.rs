mod assign;
mod error;
mod recommend;
mod router;
mod showcase;
mod telemetry;

use std::{net::SocketAddr, sync::Arc, time::Duration};

use genesis_advisor::{ChatClient, RoleAdvisor};
use genesis_core::showcase::StaticShowcase;
use genesis_storage::Database;
use genesis_util::{load_env_file, AdvisorSettings, AppConfig};
use tracing::{info, warn};

const ADVISOR_TIMEOUT: Duration = Duration::from_secs(20);

fn build_advisor(settings: &AdvisorSettings) -> Result<Option<RoleAdvisor>, reqwest::Error> {
    let Some(api_key) = settings.api_key.as_deref() else {
        warn!(stage = "advisor", "OPENAI_API_KEY is not set; recommendations will use the fallback list");
        return Ok(None);
    };

    let http = reqwest::Client::builder().timeout(ADVISOR_TIMEOUT).build()?;
    let client = ChatClient::new(api_key, settings.base_url.clone(), http);
    Ok(Some(RoleAdvisor::new(client, settings.model.clone())))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    load_env_file();
    let config = AppConfig::from_env()?;

    telemetry::init_tracing(&config)?;
    let metrics = telemetry::init_metrics()?;

    let database = Database::connect(&config.database_url).await?;
    database.run_migrations().await?;
    info!(stage = "storage", url = %config.database_url, "database ready");

    let advisor = build_advisor(&config.advisor)?;
    let state = router::AppState::new(metrics, database, advisor, Arc::new(StaticShowcase));

    let addr: SocketAddr = config.bind_addr;
    info!(stage = "app", %addr, env = %config.environment.as_str(), "starting HTTP server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router::app_router(state))
        .await
        .map_err(|err| err.into())
}
