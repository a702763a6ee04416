//! Codes - 非 HTTP 失敗のセンチネルコードと HTTP ステータス分類
//!
//! # 学習ポイント
//! - `thiserror` による型付きエラー（例外クラスの代わり）
//! - ステータスコードの範囲パターン（`500..=599`）

use serde::{Deserialize, Serialize};

/// Unclassified failure.
pub const UNKNOWN: i32 = -1;

/// The device/host has no usable network (DNS failure, connection refused, offline).
pub const NO_INTERNET: i32 = -2;

/// The request did not complete within the client timeout.
pub const TIMEOUT: i32 = -3;

/// The response body could not be decoded.
pub const PARSE_ERROR: i32 = -4;

/// HTTP 303 is accepted as success for legacy endpoints.
pub const SEE_OTHER: u16 = 303;

/// Whether a failure with this code is worth retrying.
///
/// Transport-level stalls (timeout, no connectivity), rate limiting and
/// server-side errors are transient; everything else is terminal.
pub fn is_transient(code: i32) -> bool {
    matches!(code, TIMEOUT | NO_INTERNET | 429 | 500..=599)
}

/// TransportError は I/O 層が返す型付きエラー
///
/// HTTP クライアント実装（reqwest など）がこの型に変換して返すため、
/// 上位層は例外型ではなく値で分類できます。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("no network connectivity: {0}")]
    NoConnectivity(String),

    #[error("failed to parse response body: {0}")]
    Parse(String),

    #[error("request cancelled")]
    Cancelled,

    #[error("transport failure: {0}")]
    Other(String),
}

impl TransportError {
    /// Sentinel code for this failure category.
    pub fn code(&self) -> i32 {
        match self {
            TransportError::Timeout(_) => TIMEOUT,
            TransportError::NoConnectivity(_) => NO_INTERNET,
            TransportError::Parse(_) => PARSE_ERROR,
            TransportError::Cancelled | TransportError::Other(_) => UNKNOWN,
        }
    }

    pub fn is_transient(&self) -> bool {
        is_transient(self.code())
    }
}

/// Diagnostic bucket for an HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusClass {
    Success,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    Unprocessable,
    RateLimited,
    ServerError,
    Other,
}

impl StatusClass {
    pub fn classify(status: u16) -> Self {
        match status {
            200..=299 | SEE_OTHER => StatusClass::Success,
            401 => StatusClass::Unauthorized,
            403 => StatusClass::Forbidden,
            404 => StatusClass::NotFound,
            409 => StatusClass::Conflict,
            422 => StatusClass::Unprocessable,
            429 => StatusClass::RateLimited,
            500..=599 => StatusClass::ServerError,
            _ => StatusClass::Other,
        }
    }

    pub fn is_success(self) -> bool {
        self == StatusClass::Success
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StatusClass::Success => "success",
            StatusClass::Unauthorized => "unauthorized",
            StatusClass::Forbidden => "forbidden",
            StatusClass::NotFound => "not_found",
            StatusClass::Conflict => "conflict",
            StatusClass::Unprocessable => "unprocessable",
            StatusClass::RateLimited => "rate_limited",
            StatusClass::ServerError => "server_error",
            StatusClass::Other => "other",
        }
    }
}

impl std::fmt::Display for StatusClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::ok(200, StatusClass::Success)]
    #[case::no_content(204, StatusClass::Success)]
    #[case::see_other(303, StatusClass::Success)]
    #[case::moved(301, StatusClass::Other)]
    #[case::bad_request(400, StatusClass::Other)]
    #[case::unauthorized(401, StatusClass::Unauthorized)]
    #[case::forbidden(403, StatusClass::Forbidden)]
    #[case::not_found(404, StatusClass::NotFound)]
    #[case::conflict(409, StatusClass::Conflict)]
    #[case::unprocessable(422, StatusClass::Unprocessable)]
    #[case::rate_limited(429, StatusClass::RateLimited)]
    #[case::internal(500, StatusClass::ServerError)]
    #[case::gateway(503, StatusClass::ServerError)]
    fn classifies_statuses(#[case] status: u16, #[case] expected: StatusClass) {
        assert_eq!(StatusClass::classify(status), expected);
    }

    #[rstest]
    #[case::timeout(TransportError::Timeout("t".into()), TIMEOUT)]
    #[case::offline(TransportError::NoConnectivity("dns".into()), NO_INTERNET)]
    #[case::parse(TransportError::Parse("eof".into()), PARSE_ERROR)]
    #[case::other(TransportError::Other("boom".into()), UNKNOWN)]
    fn transport_errors_map_to_sentinels(#[case] error: TransportError, #[case] code: i32) {
        assert_eq!(error.code(), code);
    }

    #[test]
    fn only_stalls_and_server_side_failures_are_transient() {
        assert!(is_transient(TIMEOUT));
        assert!(is_transient(NO_INTERNET));
        assert!(is_transient(429));
        assert!(is_transient(502));
        assert!(!is_transient(PARSE_ERROR));
        assert!(!is_transient(UNKNOWN));
        assert!(!is_transient(401));
    }
}
