//! AsyncUseCase - 非同期処理 1 単位の実行テンプレート
//!
//! # 学習ポイント
//! - 関連型（`Input` / `Output`）を持つ async trait
//! - `Option<Box<dyn FnOnce>>` による「省略可能なコールバック」
//! - 呼び出しごとの `CancelScope` による cancel-previous ポリシー
//!
//! # 通知順序（1 回の execute ごとに固定）
//! `loading` → `success | empty | error` → (idle_delay) → `idle`

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::config::UseCaseConfig;
use crate::domain::codes::UNKNOWN;
use crate::domain::{ErrorDescriptor, Outcome, OutcomeConsumer, TransportError};
use crate::ports::CancelScope;

/// Default pause between the terminal callback and `idle`.
pub const DEFAULT_IDLE_DELAY: Duration = Duration::from_millis(100);

/// What happens when `execute` is called while a previous invocation is
/// still running on the same runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionPolicy {
    /// Invocations run side by side and all deliver their results.
    #[default]
    Concurrent,

    /// A new invocation cancels the previous one; the superseded invocation
    /// skips its terminal callback but still reports `idle`.
    CancelPrevious,
}

/// Failure raised by [`AsyncUseCase::run`].
///
/// The runner converts it into `Outcome::Error`, so it never escapes `execute`.
#[derive(Debug, thiserror::Error)]
pub enum UseCaseError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Other(String),
}

impl UseCaseError {
    pub fn descriptor(&self) -> ErrorDescriptor {
        match self {
            UseCaseError::Transport(error) => ErrorDescriptor::from_transport(error),
            other => ErrorDescriptor::new(UNKNOWN, other.to_string()),
        }
    }
}

/// AsyncUseCase は 1 つのビジネス操作を表す
///
/// # 使用例
/// ```ignore
/// struct LoadArticle { source: NetworkDataSource<dyn HttpTransport> }
///
/// #[async_trait]
/// impl AsyncUseCase for LoadArticle {
///     type Input = u64;
///     type Output = Article;
///
///     async fn run(&self, id: u64) -> Result<Outcome<Article>, UseCaseError> {
///         Ok(self.source.perform_request(|t| async move {
///             fetch(&*t, ApiRequest::get(format!("articles/{id}"))).await
///         }).await)
///     }
/// }
/// ```
#[async_trait]
pub trait AsyncUseCase: Send + Sync {
    type Input: Send + 'static;
    type Output: Send + 'static;

    async fn run(&self, input: Self::Input) -> Result<Outcome<Self::Output>, UseCaseError>;

    /// Like [`run`](Self::run), with access to the invocation's scope.
    ///
    /// Override to forward the scope into data sources
    /// (`NetworkDataSource::scoped`) so superseded calls drop their results.
    async fn run_scoped(
        &self,
        input: Self::Input,
        _scope: &CancelScope,
    ) -> Result<Outcome<Self::Output>, UseCaseError> {
        self.run(input).await
    }
}

type Callback = Box<dyn FnOnce() + Send>;

/// Caller-supplied callbacks for one `execute` call.
///
/// Every callback is optional; missing ones are no-ops.
pub struct Callbacks<R> {
    success: Option<Box<dyn FnOnce(R) + Send>>,
    empty: Option<Callback>,
    error: Option<Box<dyn FnOnce(ErrorDescriptor) + Send>>,
    loading: Option<Callback>,
    idle: Option<Callback>,
}

impl<R> Callbacks<R> {
    pub fn new() -> Self {
        Self {
            success: None,
            empty: None,
            error: None,
            loading: None,
            idle: None,
        }
    }

    pub fn on_success(mut self, f: impl FnOnce(R) + Send + 'static) -> Self {
        self.success = Some(Box::new(f));
        self
    }

    pub fn on_empty(mut self, f: impl FnOnce() + Send + 'static) -> Self {
        self.empty = Some(Box::new(f));
        self
    }

    pub fn on_error(mut self, f: impl FnOnce(ErrorDescriptor) + Send + 'static) -> Self {
        self.error = Some(Box::new(f));
        self
    }

    pub fn on_loading(mut self, f: impl FnOnce() + Send + 'static) -> Self {
        self.loading = Some(Box::new(f));
        self
    }

    pub fn on_idle(mut self, f: impl FnOnce() + Send + 'static) -> Self {
        self.idle = Some(Box::new(f));
        self
    }

    fn fire_loading(&mut self) {
        if let Some(f) = self.loading.take() {
            f();
        }
    }

    fn fire_idle(&mut self) {
        if let Some(f) = self.idle.take() {
            f();
        }
    }
}

impl<R> Default for Callbacks<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> OutcomeConsumer<R> for Callbacks<R> {
    fn on_success(&mut self, data: R) {
        if let Some(f) = self.success.take() {
            f(data);
        }
    }

    fn on_empty(&mut self) {
        if let Some(f) = self.empty.take() {
            f();
        }
    }

    fn on_error(&mut self, error: ErrorDescriptor) {
        if let Some(f) = self.error.take() {
            f(error);
        }
    }
}

/// How an invocation ended, from the caller's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The terminal callback ran.
    Delivered,
    /// The invocation was cancelled before it could deliver.
    Superseded,
}

/// UseCaseRunner は AsyncUseCase を固定の通知順序で実行する
///
/// # 使用例
/// ```ignore
/// let runner = UseCaseRunner::new(LoadArticle { source })
///     .with_policy(ExecutionPolicy::CancelPrevious);
///
/// runner.execute(1, Callbacks::new()
///     .on_loading(|| println!("loading"))
///     .on_success(|article| println!("{article:?}"))
///     .on_idle(|| println!("idle"))).await;
/// ```
pub struct UseCaseRunner<U> {
    use_case: Arc<U>,
    idle_delay: Duration,
    policy: ExecutionPolicy,
    root: CancelScope,
    current: Mutex<Option<CancelScope>>,
}

impl<U: AsyncUseCase> UseCaseRunner<U> {
    pub fn new(use_case: U) -> Self {
        Self::from_arc(Arc::new(use_case))
    }

    pub fn from_arc(use_case: Arc<U>) -> Self {
        Self {
            use_case,
            idle_delay: DEFAULT_IDLE_DELAY,
            policy: ExecutionPolicy::default(),
            root: CancelScope::new(),
            current: Mutex::new(None),
        }
    }

    pub fn from_config(use_case: U, config: &UseCaseConfig) -> Self {
        Self::new(use_case)
            .with_idle_delay(config.idle_delay())
            .with_policy(config.policy)
    }

    pub fn with_idle_delay(mut self, idle_delay: Duration) -> Self {
        self.idle_delay = idle_delay;
        self
    }

    pub fn with_policy(mut self, policy: ExecutionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn use_case(&self) -> &Arc<U> {
        &self.use_case
    }

    pub fn idle_delay(&self) -> Duration {
        self.idle_delay
    }

    /// Cancel every running and future invocation of this runner.
    pub fn shutdown(&self) {
        self.root.cancel();
    }

    /// Run the use case once with the fixed notification sequence.
    #[tracing::instrument(skip_all, fields(use_case = std::any::type_name::<U>()))]
    pub async fn execute(&self, input: U::Input, mut callbacks: Callbacks<U::Output>) -> Delivery {
        let scope = self.begin().await;
        callbacks.fire_loading();

        let outcome = match self.use_case.run_scoped(input, &scope).await {
            Ok(outcome) => outcome,
            Err(error) => {
                warn!(error = %error, "use case failed");
                Outcome::error(error.descriptor())
            }
        };

        let delivery = if scope.is_active() {
            outcome.accept(&mut callbacks);
            Delivery::Delivered
        } else {
            debug!("invocation superseded, terminal callback skipped");
            Delivery::Superseded
        };

        tokio::time::sleep(self.idle_delay).await;
        callbacks.fire_idle();
        delivery
    }

    async fn begin(&self) -> CancelScope {
        let scope = self.root.child();
        if self.policy == ExecutionPolicy::CancelPrevious
            && let Some(previous) = self.current.lock().await.replace(scope.clone())
        {
            previous.cancel();
        }
        scope
    }
}
