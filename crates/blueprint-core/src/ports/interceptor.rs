//! Interceptor port - リクエスト/レスポンスのフック
//!
//! transport は登録順に `intercept` を呼び、レスポンス受信後に
//! 同じ順で `on_response` を呼びます。

use crate::domain::TransportError;

use super::transport::{ApiRequest, RawResponse};

pub trait Interceptor: Send + Sync {
    /// Inspect or modify the request before it is sent.
    ///
    /// Returning an error aborts the call without touching the network.
    fn intercept(&self, request: &mut ApiRequest) -> Result<(), TransportError>;

    fn on_response(&self, _request: &ApiRequest, _response: &RawResponse) {}
}
