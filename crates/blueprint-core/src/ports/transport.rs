//! HttpTransport port - HTTP 呼び出しの抽象化
//!
//! # 実装
//! - **ReqwestTransport**: reqwest ベース（本番用）
//! - **ScriptedTransport**: 返答を台本で与える（テスト・デモ用）
//!
//! transport は失敗を [`TransportError`] として値で返します。
//! ステータスコードの解釈（成功 / エラー）は data source 側の責務です。

use std::any::TypeId;

use async_trait::async_trait;
use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;

use crate::domain::{StatusClass, TransportError};

/// An outgoing request, relative to the transport's base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self::new(Method::POST, path).with_body(body)
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// What came back over the wire, before any decoding.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Decode into an [`ApiResponse`].
    ///
    /// - success statuses (2xx, 303): an empty or `null` body becomes `None`,
    ///   anything else must be valid JSON for `T` or the call fails with
    ///   [`TransportError::Parse`]. Unit endpoints (`T = ()`) never decode
    ///   and always yield `None`.
    /// - other statuses: the raw text is kept as `error_body`.
    pub fn decode<T: DeserializeOwned + 'static>(self) -> Result<ApiResponse<T>, TransportError> {
        let RawResponse {
            status,
            headers,
            body,
        } = self;

        if !StatusClass::classify(status).is_success() {
            let error_body = Some(body).filter(|b| !b.trim().is_empty());
            return Ok(ApiResponse {
                status,
                headers,
                body: None,
                error_body,
            });
        }

        let trimmed = body.trim();
        let body = if is_unit::<T>() || trimmed.is_empty() || trimmed == "null" {
            None
        } else {
            let decoded = serde_json::from_str::<T>(trimmed)
                .map_err(|e| TransportError::Parse(e.to_string()))?;
            Some(decoded)
        };
        Ok(ApiResponse {
            status,
            headers,
            body,
            error_body: None,
        })
    }
}

/// `T` が `()` なら「ボディなし」とみなす
pub fn is_unit<T: ?Sized + 'static>() -> bool {
    TypeId::of::<T>() == TypeId::of::<()>()
}

/// A decoded HTTP-style response: status, headers and either a body or the
/// raw error text.
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Option<T>,
    pub error_body: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn status_class(&self) -> StatusClass {
        StatusClass::classify(self.status)
    }
}

/// HttpTransport はリクエストを実行して生のレスポンスを返す
///
/// # Thread Safety
/// - `Send + Sync` を要求（data source から `Arc<dyn HttpTransport>` で共有）
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, request: ApiRequest) -> Result<RawResponse, TransportError>;

    /// Cancel every in-flight and queued request (logout, teardown).
    ///
    /// Requests started afterwards are unaffected.
    fn cancel_all(&self);
}

/// Execute `request` and decode the body as `T`.
pub async fn fetch<T, H>(
    transport: &H,
    request: ApiRequest,
) -> Result<ApiResponse<T>, TransportError>
where
    T: DeserializeOwned + 'static,
    H: HttpTransport + ?Sized,
{
    transport.execute(request).await?.decode()
}
