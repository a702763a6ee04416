//! ScriptedTransport - 台本どおりに返答する開発用 transport
//!
//! # 学習ポイント
//! - `tokio::sync::Mutex` で返答キューを共有（ロックを await 跨ぎで持たない）
//! - `watch` の世代カウンタで `cancel_all` を実装
//!
//! # 使用例
//! ```ignore
//! let transport = ScriptedTransport::new();
//! transport.push(Reply::json(200, json!({"title": "A1"}))).await;
//! let raw = transport.execute(ApiRequest::get("articles/1")).await?;
//! ```

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use tokio::sync::{Mutex, watch};

use super::interceptors::InterceptorChain;
use crate::domain::TransportError;
use crate::ports::{ApiRequest, HttpTransport, Interceptor, RawResponse};

/// One scripted answer.
#[derive(Debug, Clone)]
pub enum Reply {
    Raw(RawResponse),
    Fail(TransportError),
    Delayed(Duration, Box<Reply>),
}

impl Reply {
    pub fn json(status: u16, body: serde_json::Value) -> Self {
        let mut raw = RawResponse::new(status, body.to_string());
        raw.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Reply::Raw(raw)
    }

    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Reply::Raw(RawResponse::new(status, body))
    }

    /// A bare status with an empty body.
    pub fn status(status: u16) -> Self {
        Reply::Raw(RawResponse::new(status, ""))
    }

    pub fn fail(error: TransportError) -> Self {
        Reply::Fail(error)
    }

    /// Deliver this reply after `delay`.
    pub fn after(self, delay: Duration) -> Self {
        Reply::Delayed(delay, Box::new(self))
    }

    async fn resolve(self) -> Result<RawResponse, TransportError> {
        let mut reply = self;
        loop {
            match reply {
                Reply::Raw(raw) => return Ok(raw),
                Reply::Fail(error) => return Err(error),
                Reply::Delayed(delay, inner) => {
                    tokio::time::sleep(delay).await;
                    reply = *inner;
                }
            }
        }
    }
}

/// In-memory transport that pops one scripted reply per request.
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<ApiRequest>>,
    chain: InterceptorChain,
    generation: watch::Sender<u64>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        let (generation, _rx) = watch::channel(0);
        Self {
            replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            chain: InterceptorChain::new(),
            generation,
        }
    }

    pub fn with_replies(replies: impl IntoIterator<Item = Reply>) -> Self {
        let transport = Self::new();
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            ..transport
        }
    }

    pub fn with_interceptor(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.chain.push(interceptor);
        self
    }

    pub async fn push(&self, reply: Reply) {
        self.replies.lock().await.push_back(reply);
    }

    /// Requests seen so far, after interceptors ran.
    pub async fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn remaining(&self) -> usize {
        self.replies.lock().await.len()
    }
}

impl Default for ScriptedTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn execute(&self, mut request: ApiRequest) -> Result<RawResponse, TransportError> {
        let mut cancelled = self.generation.subscribe();
        self.chain.before(&mut request)?;
        self.requests.lock().await.push(request.clone());

        let reply = self.replies.lock().await.pop_front().ok_or_else(|| {
            TransportError::Other(format!(
                "no scripted reply for {} {}",
                request.method, request.path
            ))
        })?;

        let raw = tokio::select! {
            biased;
            _ = cancelled.changed() => return Err(TransportError::Cancelled),
            result = reply.resolve() => result?,
        };
        self.chain.after(&request, &raw);
        Ok(raw)
    }

    fn cancel_all(&self) {
        self.generation.send_modify(|g| *g += 1);
    }
}
