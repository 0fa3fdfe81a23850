//! Typed JSON-over-HTTP requests with a pluggable transport.
//!
//! # Overview
//! A `Resource<T>` describes one endpoint call: URL, JSON parameters and
//! headers, tagged with the type `T` the response decodes into. A `Session`
//! turns a resource and a verb into an `HttpRequest`, hands it to a
//! `Transport`, and decodes the `HttpResponse` into `T`.
//!
//! # Design
//! - `Session` is stateless. It holds a shared transport and a
//!   `SessionConfig`, so one session can serve any number of concurrent
//!   requests.
//! - Building and decoding are synchronous and public (`build_request`,
//!   `parse_response`); only the transport round-trip is async.
//! - Every failure, including a malformed URL or an undecodable body, comes
//!   back as a `RestError` through the same future or callback as success.
//! - The `ureq` feature (on by default) provides `UreqTransport`.

pub mod codec;
pub mod config;
pub mod error;
pub mod http;
pub mod resource;
pub mod session;
pub mod transport;

pub use codec::{decode_body, encode_body};
pub use config::SessionConfig;
pub use error::{RestError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use resource::Resource;
pub use session::Session;
pub use tokio_util::sync::CancellationToken;
pub use transport::Transport;
#[cfg(feature = "ureq")]
pub use transport::ureq::UreqTransport;
