//! `GrimdeckServer` builder and serve loop.

use grimdeck_store::RoomStore;
use tokio::net::TcpListener;

use crate::routes::router;
use crate::sweep::spawn_sweeps;
use crate::{AppState, GrimdeckError, ServerConfig};

/// Builder for configuring and starting a Grimdeck server.
///
/// # Example
///
/// ```rust,ignore
/// let server = GrimdeckServer::builder()
///     .bind("0.0.0.0:8080")
///     .build()
///     .await?;
/// server.run().await
/// ```
pub struct GrimdeckServerBuilder {
    config: ServerConfig,
}

impl GrimdeckServerBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
        }
    }

    /// Sets the address to bind the HTTP listener to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    /// Sets the SQLite connection URL.
    pub fn database_url(mut self, url: &str) -> Self {
        self.config.database_url = url.to_string();
        self
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Connects storage, builds the route table, and binds the listener.
    pub async fn build(self) -> Result<GrimdeckServer, GrimdeckError> {
        let persist = RoomStore::connect(&self.config.database_url).await?;
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        let state = AppState::new(persist, self.config);
        Ok(GrimdeckServer { listener, state })
    }
}

impl Default for GrimdeckServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A built Grimdeck server, ready to run.
pub struct GrimdeckServer {
    listener: TcpListener,
    state: AppState,
}

impl GrimdeckServer {
    /// Creates a new builder.
    pub fn builder() -> GrimdeckServerBuilder {
        GrimdeckServerBuilder::new()
    }

    /// Returns the local address the listener is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the server until the process is terminated.
    ///
    /// Starts the background lifecycle sweeps, then serves the HTTP
    /// route table on the bound listener.
    pub async fn run(self) -> Result<(), GrimdeckError> {
        spawn_sweeps(self.state.clone());

        tracing::info!(
            addr = %self.listener.local_addr()?,
            "grimdeck server running"
        );

        let app = router(self.state);
        axum::serve(self.listener, app).await?;
        Ok(())
    }
}
