//! Request forwarding to upstream services

pub mod filter;
pub mod forwarder;

pub use forwarder::{ForwardedResponse, Forwarder, RequestBody};
