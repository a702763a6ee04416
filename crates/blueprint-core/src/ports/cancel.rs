//! CancelScope - 協調的キャンセルの抽象化
//!
//! # 学習ポイント
//! - `tokio::sync::watch` による「状態」の共有（shutdown シグナルと同じ形）
//! - 親子スコープ: 親をキャンセルすると子も非アクティブになる（子は Weak で保持）
//!
//! 実行中の処理を強制終了はしません。処理側が `is_active()` を見て
//! 結果を届けるかどうかを判断します。

use std::sync::{Arc, Mutex, Weak};

use tokio::sync::watch;

#[derive(Debug)]
struct ScopeState {
    tx: watch::Sender<bool>,
    children: Mutex<Vec<Weak<ScopeState>>>,
}

impl ScopeState {
    fn new(cancelled: bool) -> Arc<Self> {
        let (tx, _rx) = watch::channel(cancelled);
        Arc::new(Self {
            tx,
            children: Mutex::new(Vec::new()),
        })
    }

    fn cancel(&self) {
        // send_replace は受信側がいなくても値を更新する
        if self.tx.send_replace(true) {
            return;
        }
        let children = {
            let mut guard = self.children.lock().unwrap_or_else(|e| e.into_inner());
            std::mem::take(&mut *guard)
        };
        for child in children.iter().filter_map(Weak::upgrade) {
            child.cancel();
        }
    }
}

/// A cooperatively-cancellable scope.
///
/// Cloning shares the same cancellation state. Cancelling a scope cancels
/// every child derived from it.
#[derive(Debug, Clone)]
pub struct CancelScope {
    state: Arc<ScopeState>,
}

impl CancelScope {
    pub fn new() -> Self {
        Self {
            state: ScopeState::new(false),
        }
    }

    /// A new scope that is cancelled together with `self`.
    pub fn child(&self) -> Self {
        let mut children = self.state.children.lock().unwrap_or_else(|e| e.into_inner());
        children.retain(|c| c.strong_count() > 0);
        let state = ScopeState::new(*self.state.tx.borrow());
        children.push(Arc::downgrade(&state));
        Self { state }
    }

    pub fn is_active(&self) -> bool {
        !*self.state.tx.borrow()
    }

    pub fn is_cancelled(&self) -> bool {
        !self.is_active()
    }

    pub fn cancel(&self) {
        self.state.cancel();
    }

    /// Resolves once this scope (or an ancestor) is cancelled.
    pub async fn cancelled(&self) {
        let mut rx = self.state.tx.subscribe();
        // sender lives in self.state, so wait_for only fails after self is gone
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for CancelScope {
    fn default() -> Self {
        Self::new()
    }
}
