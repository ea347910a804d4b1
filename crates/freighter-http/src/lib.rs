//! freighter-http - Unary GET/POST client
//!
//! This crate provides:
//! - [`HttpClientFactory`] and [`HttpClient`] for one-shot calls
//! - [`HttpTransport`], the seam to the HTTP primitive, and [`ReqwestTransport`]
//! - [`build_query`] for GET request encoding

mod client;
mod query;
mod transport;

pub use client::{HttpClient, HttpClientFactory, PROTOCOL_HTTP};
pub use query::build_query;
pub use transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{HttpClient, HttpClientFactory, HttpMethod, HttpTransport};
}
