//! Durable storage for Grimdeck rooms.
//!
//! One row per room in an embedded SQLite database: lifecycle metadata
//! (creation time, last activity) plus an opaque snapshot blob of the
//! room's replicated document. The document crate owns serialization;
//! this crate only moves bytes and rows.
//!
//! # Key types
//!
//! - [`RoomStore`] — pool wrapper with the save/load/cleanup contract
//! - [`RoomRow`] — lifecycle metadata for one room
//! - [`StoreError`] — persistence failures

mod error;
mod models;
mod rooms;

pub use error::StoreError;
pub use models::{NewRoom, RoomRow, SaveReceipt};
pub use rooms::RoomStore;
