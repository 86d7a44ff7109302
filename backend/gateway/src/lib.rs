//! peerverify HTTP gateway
//!
//! Serves the `/verify` authorization webhook.

pub mod server;
pub mod verify;

pub use server::{GatewayState, build_router, serve, shutdown_signal, start_server};
pub use verify::Rejection;
