//! # Sudoclash
//!
//! Server core for a competitive, real-time sudoku game.
//!
//! This crate ties the layers together: binary packets
//! ([`sudoclash_protocol`]) come in through [`GameServer::on_message`],
//! session and lobby requests are answered directly, and match actions are
//! routed to the room actor ([`sudoclash_room`]) that owns the match state
//! ([`sudoclash_state`]).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use sudoclash::{GameServerBuilder, GuestAuthenticator, ServerConfig, spawn_sweeper};
//!
//! # async fn run() -> Result<(), sudoclash::SudoclashError> {
//! sudoclash::init_tracing();
//! let config = ServerConfig::from_json(r#"{"seed": 7}"#)?;
//! let server = Arc::new(
//!     GameServerBuilder::new()
//!         .config(config)
//!         .build(GuestAuthenticator::new())?,
//! );
//! let _sweeper = spawn_sweeper(Arc::clone(&server));
//!
//! // Per connection:
//! let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
//! let mut session = server.open(tx);
//! server.on_message(&mut session, &[1, 0, 0, 0, 0]).await;
//! server.close(&mut session).await;
//! # Ok(())
//! # }
//! ```

mod auth;
mod config;
mod error;
mod server;

pub use auth::{Authenticator, GuestAuthenticator, MAX_GUEST_TOKEN_LEN};
pub use config::ServerConfig;
pub use error::SudoclashError;
pub use server::{Flow, GameServer, GameServerBuilder, Session, spawn_sweeper};

/// Installs a `tracing` subscriber filtered by `RUST_LOG` (default `info`).
///
/// Calling it twice is harmless; the second call does nothing.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
