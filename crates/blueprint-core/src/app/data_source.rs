//! NetworkDataSource - 1 回のリモート呼び出しを Outcome に正規化する
//!
//! # 学習ポイント
//! - `FnOnce(Arc<S>) -> Fut` で「サービスに束縛された呼び出し」を受け取る
//! - Box<dyn FnOnce> によるハンドラの差し替え（既定値つき）
//! - 失敗は値として返す（この境界より外へエラーを投げない）
//!
//! # 分類
//! 1. 2xx / 303: ボディあり → `on_success`（キャンセル済みなら `on_empty`）、
//!    なし・`()` → `on_empty`
//! 2. それ以外のステータス: エラーボディを `ErrorResponse` に解析して `on_error`
//! 3. transport エラー: センチネルコードに変換して `on_error`
//!
//! リトライはしません。必要なら呼び出し側で `attempt_request` と
//! `retry_outcome` を組み合わせます（一時的な失敗かどうかはステータスで判定）。

use std::future::Future;
use std::sync::Arc;

use reqwest::header::HeaderMap;
use tracing::{debug, warn};

use super::retry::Attempt;
use crate::domain::{ErrorDescriptor, ErrorResponse, Outcome, StatusClass, TransportError};
use crate::ports::{ApiResponse, CancelScope, is_unit};

type SuccessHandler<T, R> = Box<dyn FnOnce(T, HeaderMap) -> Outcome<R> + Send>;
type EmptyHandler<R> = Box<dyn FnOnce() -> Outcome<R> + Send>;
type ErrorHandler<R> = Box<dyn FnOnce(ErrorDescriptor, i32) -> Outcome<R> + Send>;

/// Handlers used to turn a classified response into an [`Outcome`].
///
/// Only one of them is invoked per request.
pub struct ResponseHandlers<T, R> {
    on_success: SuccessHandler<T, R>,
    on_empty: EmptyHandler<R>,
    on_error: ErrorHandler<R>,
}

impl<T: 'static, R: 'static> ResponseHandlers<T, R> {
    /// Custom success mapping; empty and error keep their defaults.
    pub fn new(on_success: impl FnOnce(T, HeaderMap) -> Outcome<R> + Send + 'static) -> Self {
        Self {
            on_success: Box::new(on_success),
            on_empty: Box::new(Outcome::empty),
            on_error: Box::new(|error, _code| Outcome::error(error)),
        }
    }

    pub fn on_success(
        mut self,
        handler: impl FnOnce(T, HeaderMap) -> Outcome<R> + Send + 'static,
    ) -> Self {
        self.on_success = Box::new(handler);
        self
    }

    pub fn on_empty(mut self, handler: impl FnOnce() -> Outcome<R> + Send + 'static) -> Self {
        self.on_empty = Box::new(handler);
        self
    }

    pub fn on_error(
        mut self,
        handler: impl FnOnce(ErrorDescriptor, i32) -> Outcome<R> + Send + 'static,
    ) -> Self {
        self.on_error = Box::new(handler);
        self
    }
}

impl<T: 'static> Default for ResponseHandlers<T, T> {
    fn default() -> Self {
        Self::new(|body, _headers| Outcome::success(body))
    }
}

/// NetworkDataSource はサービス `S` への呼び出しを実行して Outcome を返す
///
/// # 使用例
/// ```ignore
/// let source = NetworkDataSource::new(transport);
/// let outcome: Outcome<Article> = source
///     .perform_request(|t| async move { fetch(&*t, ApiRequest::get("articles/1")).await })
///     .await;
/// ```
pub struct NetworkDataSource<S: ?Sized> {
    service: Arc<S>,
    scope: CancelScope,
}

impl<S: ?Sized> Clone for NetworkDataSource<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            scope: self.scope.clone(),
        }
    }
}

impl<S: ?Sized + Send + Sync> NetworkDataSource<S> {
    pub fn new(service: Arc<S>) -> Self {
        Self::with_scope(service, CancelScope::new())
    }

    pub fn with_scope(service: Arc<S>, scope: CancelScope) -> Self {
        Self { service, scope }
    }

    /// Same service, checked against another cancellation scope.
    pub fn scoped(&self, scope: CancelScope) -> Self {
        Self::with_scope(Arc::clone(&self.service), scope)
    }

    pub fn service(&self) -> &Arc<S> {
        &self.service
    }

    pub fn scope(&self) -> &CancelScope {
        &self.scope
    }

    /// Run `call` with the default handlers.
    pub async fn perform_request<T, F, Fut>(&self, call: F) -> Outcome<T>
    where
        T: 'static,
        F: FnOnce(Arc<S>) -> Fut,
        Fut: Future<Output = Result<ApiResponse<T>, TransportError>>,
    {
        self.perform_request_with(call, ResponseHandlers::default())
            .await
    }

    /// Run `call` and classify the result through `handlers`.
    pub async fn perform_request_with<T, R, F, Fut>(
        &self,
        call: F,
        handlers: ResponseHandlers<T, R>,
    ) -> Outcome<R>
    where
        T: 'static,
        F: FnOnce(Arc<S>) -> Fut,
        Fut: Future<Output = Result<ApiResponse<T>, TransportError>>,
    {
        self.attempt_request_with(call, handlers).await.outcome
    }

    /// Like [`perform_request`](Self::perform_request), but keeps whether the
    /// failure was transient so callers can feed `retry_outcome`.
    pub async fn attempt_request<T, F, Fut>(&self, call: F) -> Attempt<T>
    where
        T: 'static,
        F: FnOnce(Arc<S>) -> Fut,
        Fut: Future<Output = Result<ApiResponse<T>, TransportError>>,
    {
        self.attempt_request_with(call, ResponseHandlers::default())
            .await
    }

    pub async fn attempt_request_with<T, R, F, Fut>(
        &self,
        call: F,
        handlers: ResponseHandlers<T, R>,
    ) -> Attempt<R>
    where
        T: 'static,
        F: FnOnce(Arc<S>) -> Fut,
        Fut: Future<Output = Result<ApiResponse<T>, TransportError>>,
    {
        match call(Arc::clone(&self.service)).await {
            Ok(response) => self.classify_response(response, handlers),
            Err(error) => classify_failure(error, handlers),
        }
    }

    fn classify_response<T: 'static, R>(
        &self,
        response: ApiResponse<T>,
        handlers: ResponseHandlers<T, R>,
    ) -> Attempt<R> {
        let ApiResponse {
            status,
            headers,
            body,
            error_body,
        } = response;
        let class = StatusClass::classify(status);

        if class.is_success() {
            let outcome = match body.filter(|_| !is_unit::<T>()) {
                Some(body) if self.scope.is_active() => (handlers.on_success)(body, headers),
                Some(_) => {
                    debug!(status, "scope cancelled before delivery, dropping body");
                    (handlers.on_empty)()
                }
                None => (handlers.on_empty)(),
            };
            return Attempt::settled(outcome);
        }

        let code = i32::from(status);
        let descriptor =
            ErrorDescriptor::from_response(ErrorResponse::parse(error_body.as_deref()), code);
        warn!(
            status,
            class = %class,
            error_code = descriptor.code,
            message = %descriptor.message,
            "request failed"
        );
        Attempt::failed((handlers.on_error)(descriptor, code), code)
    }
}

fn classify_failure<T, R>(error: TransportError, handlers: ResponseHandlers<T, R>) -> Attempt<R> {
    if matches!(error, TransportError::Cancelled) {
        debug!("request cancelled, reporting empty");
        return Attempt::settled((handlers.on_empty)());
    }
    let code = error.code();
    warn!(error = %error, code, "request did not complete");
    Attempt::failed((handlers.on_error)(ErrorDescriptor::from_transport(&error), code), code)
}
