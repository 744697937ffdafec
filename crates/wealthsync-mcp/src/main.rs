mod context;
mod server;

use rmcp::ServiceExt;
use wealthsync_core::logging::{default_log_level, init_tracing};
use wealthsync_core::WealthConfig;

use crate::context::AppContext;
use crate::server::WealthServer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing(default_log_level())?;

    let config = WealthConfig::load_with_dotenv()
        .inspect_err(|e| tracing::error!(error = %e, "failed to load configuration"))?;
    let ctx = AppContext::new(config);
    tracing::info!(data_dir = %ctx.store().root().display(), "starting wealthsync-mcp");

    let service = WealthServer::new(ctx)
        .serve(rmcp::transport::io::stdio())
        .await
        .inspect_err(|e| tracing::error!(error = %e, "MCP server error"))?;
    service.waiting().await?;
    Ok(())
}
