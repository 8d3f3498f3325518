//! Blocking HTTP connection for the scnnr image-recognition API.
//!
//! # Overview
//! A thin layer over ureq. A `Connection` sends a bodiless request for its
//! configured method, a chunked binary upload, or a JSON payload, attaching
//! the `x-api-key` header when a key is configured. Responses come back
//! exactly as the transport produced them.
//!
//! # Design
//! - Each send is split into a pure `build_*` step producing an `HttpRequest`
//!   and an `execute` step doing the I/O, so request construction is testable
//!   without a server.
//! - The logger is a `tracing::Dispatch` passed at construction rather than a
//!   process-wide subscriber.
//! - No retries, pooling policy or timeouts beyond ureq's defaults.

pub mod connection;
pub mod error;
pub mod http;

pub use connection::Connection;
pub use error::{Error, Result};
pub use http::{Body, HttpRequest, HttpResponse, Method};
