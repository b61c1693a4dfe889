//! Vietnamese stock chat agent server
//!
//! # Usage
//!
//! ```bash
//! # .env in the working directory is picked up automatically
//! export GOOGLE_API_KEY="..."
//!
//! cargo run --bin vnstock-agent -p agent-vnstock
//!
//! curl -X POST http://localhost:8000/api/chat \
//!   -H 'content-type: application/json' \
//!   -d '{"question": "Danh sách ban lãnh đạo đang làm việc của VCB"}'
//! ```

use agent_utils::{EnvSource, init_tracing, load_dotenv};
use agent_vnstock::{StockConfig, VciClient, agent, server};
use std::sync::Arc;
use tracing::{debug, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv_path = load_dotenv();
    init_tracing("info,tower_http=debug");
    match &dotenv_path {
        Some(path) => info!(path = %path.display(), "Loaded .env"),
        None => debug!("No .env file found"),
    }

    let config = Arc::new(StockConfig::from_env(&EnvSource::Process)?);
    info!(
        model = %config.model,
        api_base = %config.llm_api_base,
        vci = %config.vci_base_url,
        "Configuration loaded"
    );

    let provider = Arc::new(agent::gemini_provider(&config)?);
    let source = Arc::new(VciClient::new(&config)?);
    let executor = agent::build_executor(provider, source, config.clone())?;

    let app = server::router(Arc::new(executor));
    server::serve(&config.bind_address(), app).await?;

    Ok(())
}
