use std::{fmt, time::Duration};

use async_trait::async_trait;
use hyper::body::to_bytes;
use hyper::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use hyper::{Body, Request, Uri};
use serde_json::Value;
use tokio::time::timeout;
use toolflow_registry::remote::{ForwardError, ForwardResult, RemoteCall, RemoteForwarder};
use tracing::debug;

use crate::http_client::{HyperClient, build_client};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for [`HttpForwarder`].
#[derive(Clone)]
pub struct ForwarderConfig {
    endpoint: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl fmt::Debug for ForwarderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForwarderConfig")
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl ForwarderConfig {
    /// Creates a configuration posting to `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`ForwardError::Configuration`] if the endpoint is not an
    /// `http://` or `https://` URL.
    pub fn new(endpoint: impl AsRef<str>) -> ForwardResult<Self> {
        Ok(Self {
            endpoint: sanitize_endpoint(endpoint.as_ref())?,
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Sets the per-call timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Supplies a bearer token.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Returns the collaborator endpoint.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Returns the per-call timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Forwards remote function calls to an HTTP collaborator.
pub struct HttpForwarder {
    client: HyperClient,
    endpoint: Uri,
    api_key: Option<String>,
    timeout: Duration,
}

impl fmt::Debug for HttpForwarder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpForwarder")
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl HttpForwarder {
    /// Constructs a forwarder from the supplied configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ForwardError::Configuration`] if the endpoint cannot be parsed.
    pub fn new(config: ForwarderConfig) -> ForwardResult<Self> {
        let endpoint = config.endpoint.parse::<Uri>().map_err(|err| {
            ForwardError::configuration(format!("invalid remote endpoint: {err}"))
        })?;

        Ok(Self {
            client: build_client(),
            endpoint,
            api_key: config.api_key,
            timeout: config.timeout,
        })
    }

    fn build_request(&self, call: &RemoteCall) -> ForwardResult<Request<Body>> {
        let body = serde_json::to_vec(call).map_err(|err| {
            ForwardError::transport(format!("failed to encode remote call: {err}"))
        })?;

        let mut builder = Request::post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json");
        if let Some(key) = &self.api_key {
            builder = builder.header(AUTHORIZATION, format!("Bearer {key}"));
        }

        builder.body(Body::from(body)).map_err(|err| {
            ForwardError::transport(format!("failed to build remote request: {err}"))
        })
    }
}

#[async_trait]
impl RemoteForwarder for HttpForwarder {
    async fn forward(&self, call: RemoteCall) -> ForwardResult<Value> {
        let request = self.build_request(&call)?;
        debug!(
            function = %call.name(),
            handle = %call.handle(),
            endpoint = %self.endpoint,
            "posting remote call"
        );

        let response = timeout(self.timeout, self.client.request(request))
            .await
            .map_err(|_| ForwardError::Timeout)?
            .map_err(|err| ForwardError::transport(format!("remote request failed: {err}")))?;

        let status = response.status();
        let bytes = to_bytes(response.into_body()).await.map_err(|err| {
            ForwardError::transport(format!("failed to read remote response: {err}"))
        })?;

        if !status.is_success() {
            let reason = String::from_utf8_lossy(&bytes);
            return Err(ForwardError::response(format!(
                "remote host returned {status}: {reason}"
            )));
        }

        decode_body(&bytes)
    }
}

fn decode_body(bytes: &[u8]) -> ForwardResult<Value> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(bytes)
        .map_err(|err| ForwardError::response(format!("failed to decode remote response: {err}")))
}

fn sanitize_endpoint(input: &str) -> ForwardResult<String> {
    let endpoint = input.trim();
    if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
        return Err(ForwardError::configuration(
            "remote endpoint must start with http:// or https://",
        ));
    }
    endpoint
        .parse::<Uri>()
        .map_err(|err| ForwardError::configuration(format!("invalid remote endpoint: {err}")))?;
    Ok(endpoint.to_owned())
}
