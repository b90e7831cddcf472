//! Network transport for provider calls.

pub mod http;

pub use http::{HttpFetcher, TransportError};
