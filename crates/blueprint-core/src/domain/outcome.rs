//! Outcome model: the result of one asynchronous operation.
//!
//! This module is transport-agnostic: it does not assume HTTP, use cases or
//! any runtime. It only defines the "shape" of a result and how to consume it.

use serde::{Deserialize, Serialize};

use super::errors::ErrorDescriptor;

/// Three-state result of an operation.
///
/// - `Success`: a payload is present. Absent payloads use `Empty` instead of
///   `Success(None)`.
/// - `Error`: always carries a descriptor.
/// - `Empty`: finished without data (204, cancelled delivery, ...).
///
/// Serialized as `{"kind": "SUCCESS", "value": ...}` for logs and CLI output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome<T> {
    Success(T),
    Error(ErrorDescriptor),
    Empty,
}

/// Consumer contract for [`Outcome::accept`].
///
/// Exactly one method is invoked per outcome.
pub trait OutcomeConsumer<T> {
    fn on_success(&mut self, data: T);
    fn on_empty(&mut self);
    fn on_error(&mut self, error: ErrorDescriptor);
}

impl<T> Outcome<T> {
    pub fn success(data: T) -> Self {
        Outcome::Success(data)
    }

    pub fn error(error: ErrorDescriptor) -> Self {
        Outcome::Error(error)
    }

    pub fn empty() -> Self {
        Outcome::Empty
    }

    /// Consume the outcome and dispatch it to the matching consumer method.
    pub fn accept<C: OutcomeConsumer<T> + ?Sized>(self, consumer: &mut C) {
        match self {
            Outcome::Success(data) => consumer.on_success(data),
            Outcome::Error(error) => consumer.on_error(error),
            Outcome::Empty => consumer.on_empty(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Outcome::Error(_))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Outcome::Empty)
    }

    pub fn success_ref(&self) -> Option<&T> {
        match self {
            Outcome::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn error_ref(&self) -> Option<&ErrorDescriptor> {
        match self {
            Outcome::Error(error) => Some(error),
            _ => None,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Outcome::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Success(data) => Outcome::Success(f(data)),
            Outcome::Error(error) => Outcome::Error(error),
            Outcome::Empty => Outcome::Empty,
        }
    }

    pub fn map_error(self, f: impl FnOnce(ErrorDescriptor) -> ErrorDescriptor) -> Self {
        match self {
            Outcome::Error(error) => Outcome::Error(f(error)),
            other => other,
        }
    }

    pub fn and_then<U>(self, f: impl FnOnce(T) -> Outcome<U>) -> Outcome<U> {
        match self {
            Outcome::Success(data) => f(data),
            Outcome::Error(error) => Outcome::Error(error),
            Outcome::Empty => Outcome::Empty,
        }
    }

    /// Turn an `Error` into another outcome; `Success` and `Empty` pass through.
    pub fn recover(self, f: impl FnOnce(ErrorDescriptor) -> Outcome<T>) -> Self {
        match self {
            Outcome::Error(error) => f(error),
            other => other,
        }
    }
}

impl<T> From<Option<T>> for Outcome<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(data) => Outcome::Success(data),
            None => Outcome::Empty,
        }
    }
}
