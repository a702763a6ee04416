//! Async combinators over [`Outcome`].
//!
//! A `Success` is only forwarded while the caller's scope is active; once the
//! scope is cancelled it degrades into `Empty`. `Error` and `Empty` pass
//! through unchanged.

use std::future::Future;

use crate::domain::Outcome;
use crate::ports::CancelScope;

impl<T> Outcome<T> {
    /// Re-map a `Success` payload through another operation producing an
    /// `Outcome`.
    ///
    /// The scope is checked before `f` runs and again on its result.
    pub async fn map_or_else<U, F, Fut>(self, scope: &CancelScope, f: F) -> Outcome<U>
    where
        F: FnOnce(T) -> Fut,
        Fut: Future<Output = Outcome<U>>,
    {
        match self {
            Outcome::Success(data) if scope.is_active() => match f(data).await {
                Outcome::Success(_) if scope.is_cancelled() => Outcome::Empty,
                next => next,
            },
            Outcome::Success(_) => Outcome::Empty,
            Outcome::Error(error) => Outcome::Error(error),
            Outcome::Empty => Outcome::Empty,
        }
    }

    /// Like [`map_or_else`](Self::map_or_else) for operations that cannot fail.
    pub async fn then_on_success<U, F, Fut>(self, scope: &CancelScope, f: F) -> Outcome<U>
    where
        F: FnOnce(T) -> Fut,
        Fut: Future<Output = U>,
    {
        self.map_or_else(scope, |data| async move { Outcome::Success(f(data).await) })
            .await
    }

    /// Replace `Empty` with the result of a fallback operation.
    pub async fn or_else_empty<F, Fut>(self, f: F) -> Outcome<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Outcome<T>>,
    {
        match self {
            Outcome::Empty => f().await,
            other => other,
        }
    }
}
