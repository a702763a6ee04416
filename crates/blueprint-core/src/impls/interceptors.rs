//! Built-in interceptors: default headers, request logging, connectivity.

use std::sync::Arc;

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};

use crate::domain::TransportError;
use crate::ports::{ApiRequest, Connectivity, Interceptor, RawResponse};

/// Ordered list of interceptors shared by the transports.
#[derive(Clone, Default)]
pub struct InterceptorChain {
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl InterceptorChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, interceptor: Arc<dyn Interceptor>) {
        self.interceptors.push(interceptor);
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    pub fn before(&self, request: &mut ApiRequest) -> Result<(), TransportError> {
        for interceptor in &self.interceptors {
            interceptor.intercept(request)?;
        }
        Ok(())
    }

    pub fn after(&self, request: &ApiRequest, response: &RawResponse) {
        for interceptor in &self.interceptors {
            interceptor.on_response(request, response);
        }
    }
}

/// Adds default headers unless the request already sets them.
#[derive(Debug, Clone)]
pub struct HeaderInterceptor {
    defaults: HeaderMap,
}

impl HeaderInterceptor {
    /// Starts with `Accept: application/json`.
    pub fn new() -> Self {
        let mut defaults = HeaderMap::new();
        defaults.insert(ACCEPT, HeaderValue::from_static("application/json"));
        Self { defaults }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self, TransportError> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| TransportError::Other(format!("invalid header name {name:?}: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| TransportError::Other(format!("invalid value for header {name}: {e}")))?;
        self.defaults.insert(name, value);
        Ok(self)
    }

    pub fn with_bearer_token(mut self, token: &str) -> Result<Self, TransportError> {
        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| TransportError::Other(format!("invalid bearer token: {e}")))?;
        value.set_sensitive(true);
        self.defaults.insert(AUTHORIZATION, value);
        Ok(self)
    }
}

impl Default for HeaderInterceptor {
    fn default() -> Self {
        Self::new()
    }
}

impl Interceptor for HeaderInterceptor {
    fn intercept(&self, request: &mut ApiRequest) -> Result<(), TransportError> {
        for (name, value) in &self.defaults {
            if !request.headers.contains_key(name) {
                request.headers.insert(name.clone(), value.clone());
            }
        }
        Ok(())
    }
}

/// Logs every request and response at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingInterceptor;

impl Interceptor for LoggingInterceptor {
    fn intercept(&self, request: &mut ApiRequest) -> Result<(), TransportError> {
        tracing::debug!(method = %request.method, path = %request.path, "--> request");
        Ok(())
    }

    fn on_response(&self, request: &ApiRequest, response: &RawResponse) {
        tracing::debug!(
            method = %request.method,
            path = %request.path,
            status = response.status,
            bytes = response.body.len(),
            "<-- response"
        );
    }
}

/// Fails fast with `NoConnectivity` while the device is offline.
pub struct ConnectivityInterceptor {
    monitor: Arc<dyn Connectivity>,
}

impl ConnectivityInterceptor {
    pub fn new(monitor: Arc<dyn Connectivity>) -> Self {
        Self { monitor }
    }
}

impl Interceptor for ConnectivityInterceptor {
    fn intercept(&self, request: &mut ApiRequest) -> Result<(), TransportError> {
        if self.monitor.is_online() {
            Ok(())
        } else {
            Err(TransportError::NoConnectivity(format!(
                "offline, {} {} not sent",
                request.method, request.path
            )))
        }
    }
}
