//! DefaultMessages - 英語の既定文言
//!
//! ホスト側で翻訳を持つ場合は `MessageLookup` を自前で実装してください。

use std::collections::HashMap;

use crate::domain::{PLACEHOLDER_MESSAGE, codes};
use crate::ports::MessageLookup;

#[derive(Debug, Clone, Default)]
pub struct DefaultMessages {
    overrides: HashMap<i32, String>,
}

impl DefaultMessages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_override(mut self, code: i32, message: impl Into<String>) -> Self {
        self.overrides.insert(code, message.into());
        self
    }
}

impl MessageLookup for DefaultMessages {
    fn message_for(&self, code: i32) -> String {
        if let Some(message) = self.overrides.get(&code) {
            return message.clone();
        }
        let text = match code {
            codes::TIMEOUT => "The server took too long to respond.",
            codes::NO_INTERNET => "No internet connection.",
            codes::PARSE_ERROR => "We could not read the server response.",
            401 => "Your session has expired. Please sign in again.",
            403 => "You do not have access to this resource.",
            404 => "The requested resource was not found.",
            429 => "Too many requests. Please try again shortly.",
            500..=599 => "The server is having trouble. Please try again later.",
            _ => PLACEHOLDER_MESSAGE,
        };
        text.to_string()
    }
}
