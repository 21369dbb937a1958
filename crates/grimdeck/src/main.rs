//! Grimdeck server binary.

use grimdeck::{GrimdeckError, GrimdeckServer, ServerConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), GrimdeckError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env();
    let server = GrimdeckServer::builder().config(config).build().await?;
    server.run().await
}
