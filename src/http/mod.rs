//! HTTP admission gate and server.

mod client_ip;
mod gate;
mod server;

pub use client_ip::{client_id, derive_client_id, split_host_port, UNKNOWN_CLIENT, X_FORWARDED_FOR};
pub use gate::{rate_limit_middleware, with_rate_limit, RATE_LIMIT_MESSAGE};
pub use server::HttpServer;
