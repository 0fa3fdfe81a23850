//! `Transport` backed by a blocking `ureq` agent.
//!
//! Each call runs on tokio's blocking pool so the calling task never blocks.
//! Dropping the returned future detaches the blocking call; it is not aborted.
//! Response bodies are read in full with no size cap, overriding ureq's
//! default read limit. A body attached to a GET request is not sent.

use async_trait::async_trait;
use tokio::task;

use super::Transport;
use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ::ureq::Agent,
}

impl UreqTransport {
    /// Wrap an existing agent. The agent should be configured with
    /// `http_status_as_error(false)`, otherwise 4xx/5xx responses surface as
    /// transport errors instead of data.
    pub fn new(agent: ::ureq::Agent) -> Self {
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        let agent = ::ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self::new(agent)
    }
}

#[async_trait]
impl Transport for UreqTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let agent = self.agent.clone();
        task::spawn_blocking(move || execute_blocking(&agent, request))
            .await?
            .map_err(Into::into)
    }
}

fn execute_blocking(
    agent: &::ureq::Agent,
    request: HttpRequest,
) -> Result<HttpResponse, ::ureq::Error> {
    let HttpRequest {
        method,
        url,
        headers,
        body,
    } = request;
    let url = url.as_str();

    if method == HttpMethod::Get && body.is_some() {
        tracing::debug!(%url, "GET request body is not sent");
    }

    let mut response = match (method, body) {
        (HttpMethod::Get, _) => with_headers(agent.get(url), &headers).call(),
        (HttpMethod::Post, Some(body)) => with_headers(agent.post(url), &headers).send(body),
        (HttpMethod::Post, None) => with_headers(agent.post(url), &headers).send_empty(),
        (HttpMethod::Put, Some(body)) => with_headers(agent.put(url), &headers).send(body),
        (HttpMethod::Put, None) => with_headers(agent.put(url), &headers).send_empty(),
    }?;

    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();
    let body = response
        .body_mut()
        .with_config()
        .limit(u64::MAX)
        .read_to_vec()?;

    Ok(HttpResponse {
        status,
        headers,
        body: (!body.is_empty()).then_some(body),
    })
}

fn with_headers<B>(
    mut builder: ::ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ::ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}
