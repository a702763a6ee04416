//! Reqwest-backed transport.
//!
//! This adapter owns transport details only: URL resolution, interceptors,
//! timeout/connectivity error mapping and request cancellation. Status codes
//! are interpreted by the data source.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use tokio::sync::watch;

use super::interceptors::{
    ConnectivityInterceptor, HeaderInterceptor, InterceptorChain, LoggingInterceptor,
};
use crate::config::{ConfigError, HttpConfig};
use crate::domain::TransportError;
use crate::ports::{ApiRequest, Connectivity, HttpTransport, Interceptor, RawResponse};

pub struct ReqwestTransport {
    client: Client,
    base_url: Url,
    chain: InterceptorChain,
    generation: watch::Sender<u64>,
}

impl ReqwestTransport {
    /// Build a transport using a reqwest client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        let (generation, _rx) = watch::channel(0);
        Ok(Self {
            client,
            base_url: with_trailing_slash(base_url),
            chain: InterceptorChain::new(),
            generation,
        })
    }

    /// Build the standard stack from configuration: connectivity check,
    /// default headers (user agent, optional bearer token), then logging.
    pub fn from_config(
        config: &HttpConfig,
        connectivity: Arc<dyn Connectivity>,
    ) -> Result<Self, ConfigError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            ConfigError::Invalid(format!("http.base_url {:?}: {e}", config.base_url))
        })?;

        let mut headers = HeaderInterceptor::new()
            .with_header("user-agent", &config.user_agent)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        if let Some(token) = config.bearer_token.as_deref() {
            headers = headers
                .with_bearer_token(token)
                .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        }

        let transport = Self::new(base_url, config.timeout())
            .map_err(|e| ConfigError::Invalid(format!("http client: {e}")))?
            .with_interceptor(Arc::new(ConnectivityInterceptor::new(connectivity)))
            .with_interceptor(Arc::new(headers))
            .with_interceptor(Arc::new(LoggingInterceptor));
        Ok(transport)
    }

    pub fn with_interceptor(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.chain.push(interceptor);
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve a request path against the base URL.
    ///
    /// A leading `/` is ignored so paths always stay below the base path.
    pub fn resolve(&self, path: &str) -> Result<Url, TransportError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| TransportError::Other(format!("invalid request path {path:?}: {e}")))
    }

    async fn send(&self, request: &ApiRequest) -> Result<RawResponse, TransportError> {
        let url = self.resolve(&request.path)?;
        let mut builder = self
            .client
            .request(request.method.clone(), url)
            .headers(request.headers.clone());
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(map_transport_error)?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.text().await.map_err(map_transport_error)?;
        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, mut request: ApiRequest) -> Result<RawResponse, TransportError> {
        let mut cancelled = self.generation.subscribe();
        self.chain.before(&mut request)?;

        let raw = tokio::select! {
            _ = cancelled.changed() => return Err(TransportError::Cancelled),
            result = self.send(&request) => result?,
        };
        self.chain.after(&request, &raw);
        Ok(raw)
    }

    fn cancel_all(&self) {
        tracing::info!("cancelling all in-flight requests");
        self.generation.send_modify(|g| *g += 1);
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn map_transport_error(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout(error.to_string())
    } else if error.is_connect() {
        TransportError::NoConnectivity(error.to_string())
    } else if error.is_decode() {
        TransportError::Parse(error.to_string())
    } else {
        TransportError::Other(error.to_string())
    }
}
