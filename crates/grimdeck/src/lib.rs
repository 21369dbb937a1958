//! The Grimdeck game server.
//!
//! Ties the layers together: protocol types, the document store, the
//! SQLite persistence layer, and the turn/chain engines, exposed over an
//! axum HTTP surface with background lifecycle sweeps.
//!
//! # Example
//!
//! ```rust,ignore
//! use grimdeck::GrimdeckServer;
//!
//! let server = GrimdeckServer::builder()
//!     .bind("0.0.0.0:8080")
//!     .database_url("sqlite://grimdeck.db?mode=rwc")
//!     .build()
//!     .await?;
//! server.run().await
//! ```

mod config;
mod error;
mod reply;
mod routes;
mod server;
mod state;
mod sweep;

pub use config::ServerConfig;
pub use error::GrimdeckError;
pub use server::{GrimdeckServer, GrimdeckServerBuilder};
pub use state::AppState;
