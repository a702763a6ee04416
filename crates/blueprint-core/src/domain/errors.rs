//! Errors - 正規化されたエラー記述子とサーバーのエラー DTO
//!
//! HTTP ステータス、例外相当の transport エラー、ローカル検証のどこから来ても
//! 最終的には [`ErrorDescriptor`] 一つの形に揃えます。

use serde::{Deserialize, Deserializer, Serialize};

use super::codes::TransportError;

/// Message used when the server gave us nothing usable.
pub const PLACEHOLDER_MESSAGE: &str = "Something went wrong";

/// A normalized, domain-level error.
///
/// Created once by a mapping function and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDescriptor {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub field_errors: Vec<String>,
}

impl ErrorDescriptor {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            field_errors: Vec::new(),
        }
    }

    /// Default descriptor for failures that carry no server message.
    pub fn placeholder(code: i32) -> Self {
        Self::new(code, PLACEHOLDER_MESSAGE)
    }

    pub fn with_field_errors(mut self, field_errors: Vec<String>) -> Self {
        self.field_errors = field_errors;
        self
    }

    /// Map a server error body.
    ///
    /// `errorCode` wins when it is numeric; otherwise the HTTP status is used.
    pub fn from_response(response: ErrorResponse, fallback_code: i32) -> Self {
        let code = response.numeric_code().unwrap_or(fallback_code);
        let message = response
            .error_message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| PLACEHOLDER_MESSAGE.to_string());
        Self {
            code,
            message,
            field_errors: response.error_field_list,
        }
    }

    pub fn from_transport(error: &TransportError) -> Self {
        Self::placeholder(error.code())
    }
}

impl std::fmt::Display for ErrorDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if !self.field_errors.is_empty() {
            write!(f, " ({})", self.field_errors.join("; "))?;
        }
        Ok(())
    }
}

/// ErrorResponse はサーバーが返すエラーボディ
///
/// ```json
/// {"errorCode":"401","errorMessage":"Unauthorized","errorFieldList":[]}
/// ```
///
/// `errorCode` は文字列で来ることも数値で来ることもあるので `Value` で受けます。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    #[serde(default)]
    pub error_code: Option<serde_json::Value>,

    #[serde(default)]
    pub error_message: Option<String>,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub error_field_list: Vec<String>,
}

/// `"errorFieldList": null` は空リストとして扱う
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl ErrorResponse {
    /// The DTO used when the body is absent or malformed.
    pub fn placeholder() -> Self {
        Self {
            error_code: None,
            error_message: Some(PLACEHOLDER_MESSAGE.to_string()),
            error_field_list: Vec::new(),
        }
    }

    /// Best-effort parse of a raw error body.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
            return Self::placeholder();
        };
        match serde_json::from_str::<ErrorResponse>(raw) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::debug!(error = %e, "error body is not a structured error response");
                Self::placeholder()
            }
        }
    }

    pub fn numeric_code(&self) -> Option<i32> {
        match self.error_code.as_ref()? {
            serde_json::Value::Number(n) => n.as_i64().and_then(|n| i32::try_from(n).ok()),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::codes::TIMEOUT;

    #[test]
    fn maps_structured_unauthorized_body() {
        let dto = ErrorResponse::parse(Some(
            r#"{"errorCode":"401","errorMessage":"Unauthorized","errorFieldList":[]}"#,
        ));
        let descriptor = ErrorDescriptor::from_response(dto, 401);
        assert_eq!(descriptor, ErrorDescriptor::new(401, "Unauthorized"));
    }

    #[test]
    fn numeric_error_code_and_field_errors_are_kept() {
        let dto = ErrorResponse::parse(Some(
            r#"{"errorCode":4221,"errorMessage":"Invalid","errorFieldList":["email is required"]}"#,
        ));
        let descriptor = ErrorDescriptor::from_response(dto, 422);
        assert_eq!(descriptor.code, 4221);
        assert_eq!(descriptor.field_errors, vec!["email is required".to_string()]);
    }

    #[test]
    fn malformed_body_falls_back_to_placeholder_and_status() {
        let dto = ErrorResponse::parse(Some("<html>bad gateway</html>"));
        assert_eq!(dto, ErrorResponse::placeholder());

        let descriptor = ErrorDescriptor::from_response(dto, 502);
        assert_eq!(descriptor.code, 502);
        assert_eq!(descriptor.message, PLACEHOLDER_MESSAGE);
        assert!(descriptor.field_errors.is_empty());
    }

    #[test]
    fn explicit_nulls_keep_the_server_message() {
        let dto = ErrorResponse::parse(Some(
            r#"{"errorCode":"422","errorMessage":"Invalid","errorFieldList":null}"#,
        ));
        let descriptor = ErrorDescriptor::from_response(dto, 400);
        assert_eq!(descriptor, ErrorDescriptor::new(422, "Invalid"));

        let dto = ErrorResponse::parse(Some(
            r#"{"errorCode":null,"errorMessage":null,"errorFieldList":["name"]}"#,
        ));
        let descriptor = ErrorDescriptor::from_response(dto, 409);
        assert_eq!(descriptor.code, 409);
        assert_eq!(descriptor.message, PLACEHOLDER_MESSAGE);
        assert_eq!(descriptor.field_errors, vec!["name".to_string()]);
    }

    #[test]
    fn missing_body_falls_back_to_placeholder() {
        assert_eq!(ErrorResponse::parse(None), ErrorResponse::placeholder());
        assert_eq!(ErrorResponse::parse(Some("  ")), ErrorResponse::placeholder());
    }

    #[test]
    fn non_numeric_error_code_uses_fallback() {
        let dto = ErrorResponse::parse(Some(r#"{"errorCode":"E_AUTH","errorMessage":"nope"}"#));
        let descriptor = ErrorDescriptor::from_response(dto, 403);
        assert_eq!(descriptor.code, 403);
        assert_eq!(descriptor.message, "nope");
    }

    #[test]
    fn transport_errors_become_placeholder_with_sentinel() {
        let descriptor = ErrorDescriptor::from_transport(&TransportError::Timeout("30s".into()));
        assert_eq!(descriptor, ErrorDescriptor::placeholder(TIMEOUT));
    }

    #[test]
    fn display_includes_field_errors() {
        let descriptor = ErrorDescriptor::new(422, "Invalid")
            .with_field_errors(vec!["name".into(), "email".into()]);
        assert_eq!(descriptor.to_string(), "[422] Invalid (name; email)");
    }
}
