//! Transports for the product catalog: HTTP (axum) and message-pattern RPC
//! (newline-delimited JSON over TCP). Both drive the same `ProductCatalog`.

pub mod app;
pub mod middleware;
pub mod rpc;
