//! The seam between request building and network I/O.
//!
//! # Design
//! A `Transport` takes a fully built `HttpRequest` and returns either the
//! response or a transport-level error. Connection handling, TLS, redirects,
//! timeouts and retries all live behind this trait; `Session` never sees them.
//! Status codes are data: a transport must return 4xx/5xx responses as
//! `Ok(HttpResponse)`.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};

#[cfg(feature = "ureq")]
pub mod ureq;

/// Executes one HTTP round-trip.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[async_trait]
impl<X: Transport + ?Sized> Transport for Arc<X> {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request).await
    }
}

#[async_trait]
impl<X: Transport + ?Sized> Transport for Box<X> {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request).await
    }
}
