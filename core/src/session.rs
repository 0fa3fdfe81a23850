//! Request dispatch: resource in, decoded value out.
//!
//! # Design
//! `Session` holds only a shared transport and its configuration and carries
//! no mutable state between calls. The pipeline is split the same way at
//! every entry point: `build_request` turns a `Resource` into an
//! `HttpRequest`, the transport executes it, and `parse_response` decodes the
//! `HttpResponse`. Both halves are synchronous and usable on their own when
//! the caller wants to drive the I/O itself.
//!
//! Every failure is returned through the same channel as the success value.
//! The callback entry points (`spawn_*`) invoke their callback exactly once
//! unless the request is cancelled first.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use url::Url;

use crate::codec::{body_excerpt, decode_body, encode_body};
use crate::config::SessionConfig;
use crate::error::RestError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::resource::Resource;
use crate::transport::Transport;

/// Stateless orchestrator over an injected transport.
///
/// Cloning is cheap: clones share the transport.
#[derive(Debug)]
pub struct Session<X> {
    transport: Arc<X>,
    config: SessionConfig,
}

impl<X> Clone for Session<X> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            config: self.config.clone(),
        }
    }
}

/// A `UreqTransport` session configured from the environment
/// (`SessionConfig::from_env`).
#[cfg(feature = "ureq")]
impl Default for Session<crate::transport::ureq::UreqTransport> {
    fn default() -> Self {
        Self::with_config(
            crate::transport::ureq::UreqTransport::default(),
            SessionConfig::from_env(),
        )
    }
}

impl<X> Session<X> {
    pub fn new(transport: X) -> Self {
        Self::with_config(transport, SessionConfig::default())
    }

    pub fn with_config(transport: X, config: SessionConfig) -> Self {
        Self::from_shared(Arc::new(transport), config)
    }

    /// Build a session over a transport that is already shared elsewhere.
    pub fn from_shared(transport: Arc<X>, config: SessionConfig) -> Self {
        Self { transport, config }
    }

    pub fn transport(&self) -> &X {
        &self.transport
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Turn a resource into the request a transport should execute.
    ///
    /// The URL is parsed here, so a malformed URL never reaches the
    /// transport. Headers are copied verbatim. POST and PUT carry the JSON
    /// encoding of the resource parameters; GET never carries a body and its
    /// parameters are dropped.
    pub fn build_request<T>(
        &self,
        verb: HttpMethod,
        resource: &Resource<T>,
    ) -> Result<HttpRequest, RestError> {
        let url = Url::parse(resource.url_string()).map_err(|e| RestError::MalformedUrl {
            url: resource.url_string().to_string(),
            reason: e.to_string(),
        })?;

        let mut headers: Vec<(String, String)> = resource
            .headers()
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();

        let body = if verb.carries_body() {
            let body = encode_body(resource.parameters())?;
            if self.config.json_content_type
                && !headers
                    .iter()
                    .any(|(name, _)| name.eq_ignore_ascii_case("content-type"))
            {
                headers.push(("content-type".to_string(), "application/json".to_string()));
            }
            Some(body)
        } else {
            if !resource.parameters().is_empty() {
                tracing::debug!(
                    count = resource.parameters().len(),
                    "GET request ignores body parameters"
                );
            }
            None
        };

        Ok(HttpRequest {
            method: verb,
            url,
            headers,
            body,
        })
    }

    /// Decode a response body into `T`.
    ///
    /// The status code is not interpreted; it is only carried on errors.
    pub fn parse_response<T: DeserializeOwned>(
        &self,
        response: HttpResponse,
    ) -> Result<T, RestError> {
        let HttpResponse { status, body, .. } = response;
        let body = match body {
            Some(body) if !body.is_empty() => body,
            _ => {
                tracing::debug!(status, "response has no body");
                return Err(RestError::EmptyResponse { status });
            }
        };
        tracing::debug!(status, len = body.len(), "decoding response body");

        decode_body(&body).map_err(|diagnostic| {
            tracing::warn!(status, %diagnostic, "failed to decode response body");
            RestError::Decode {
                diagnostic,
                status,
                body: body_excerpt(&body, self.config.error_body_limit),
            }
        })
    }
}

impl<X: Transport> Session<X> {
    /// Issue one request for `resource` and decode the response.
    pub async fn request<T: DeserializeOwned>(
        &self,
        verb: HttpMethod,
        resource: &Resource<T>,
    ) -> Result<T, RestError> {
        let span = tracing::debug_span!("request", method = %verb, url = %resource.url_string());
        self.dispatch(verb, resource).instrument(span).await
    }

    async fn dispatch<T: DeserializeOwned>(
        &self,
        verb: HttpMethod,
        resource: &Resource<T>,
    ) -> Result<T, RestError> {
        let request = self.build_request(verb, resource)?;
        tracing::debug!("dispatching request");

        let response = self.transport.execute(request).await.map_err(|e| {
            tracing::warn!(error = %e, "transport failed");
            RestError::Transport(e)
        })?;

        self.parse_response(response)
    }

    pub async fn get<T: DeserializeOwned>(&self, resource: &Resource<T>) -> Result<T, RestError> {
        self.request(HttpMethod::Get, resource).await
    }

    pub async fn post<T: DeserializeOwned>(&self, resource: &Resource<T>) -> Result<T, RestError> {
        self.request(HttpMethod::Post, resource).await
    }

    pub async fn put<T: DeserializeOwned>(&self, resource: &Resource<T>) -> Result<T, RestError> {
        self.request(HttpMethod::Put, resource).await
    }

    /// Like `request`, but returns `None` without a result if `cancel` fires
    /// before the transport completes. An already cancelled token prevents
    /// the request from being built or sent.
    pub async fn request_cancellable<T: DeserializeOwned>(
        &self,
        verb: HttpMethod,
        resource: &Resource<T>,
        cancel: &CancellationToken,
    ) -> Option<Result<T, RestError>> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!(method = %verb, url = %resource.url_string(), "request cancelled");
                None
            }
            result = self.request(verb, resource) => Some(result),
        }
    }
}

impl<X: Transport + 'static> Session<X> {
    /// Run the request on the current tokio runtime and hand the result to
    /// `on_complete`.
    ///
    /// `on_complete` runs exactly once, with the decoded value or the error,
    /// unless `cancel` fires first, in which case it never runs.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn spawn_request<T, F>(
        &self,
        verb: HttpMethod,
        resource: Resource<T>,
        cancel: CancellationToken,
        on_complete: F,
    ) -> JoinHandle<()>
    where
        T: DeserializeOwned + Send + 'static,
        F: FnOnce(Result<T, RestError>) + Send + 'static,
    {
        let session = self.clone();
        tokio::spawn(async move {
            if let Some(result) = session.request_cancellable(verb, &resource, &cancel).await {
                on_complete(result);
            }
        })
    }

    pub fn spawn_get<T, F>(
        &self,
        resource: Resource<T>,
        cancel: CancellationToken,
        on_complete: F,
    ) -> JoinHandle<()>
    where
        T: DeserializeOwned + Send + 'static,
        F: FnOnce(Result<T, RestError>) + Send + 'static,
    {
        self.spawn_request(HttpMethod::Get, resource, cancel, on_complete)
    }

    pub fn spawn_post<T, F>(
        &self,
        resource: Resource<T>,
        cancel: CancellationToken,
        on_complete: F,
    ) -> JoinHandle<()>
    where
        T: DeserializeOwned + Send + 'static,
        F: FnOnce(Result<T, RestError>) + Send + 'static,
    {
        self.spawn_request(HttpMethod::Post, resource, cancel, on_complete)
    }

    pub fn spawn_put<T, F>(
        &self,
        resource: Resource<T>,
        cancel: CancellationToken,
        on_complete: F,
    ) -> JoinHandle<()>
    where
        T: DeserializeOwned + Send + 'static,
        F: FnOnce(Result<T, RestError>) + Send + 'static,
    {
        self.spawn_request(HttpMethod::Put, resource, cancel, on_complete)
    }
}
