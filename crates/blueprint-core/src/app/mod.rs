//! App - アプリケーション層
//!
//! このモジュールは、ports を組み合わせてアプリケーションロジックを実装します。
//!
//! # 主要コンポーネント
//! - **NetworkDataSource**: 1 回の HTTP 呼び出しを Outcome に正規化
//! - **UseCaseRunner**: loading → 結果 → idle の固定順序で use case を実行
//! - **combinators**: Outcome の非同期 bind（map_or_else など）
//! - **retry**: 呼び出し側リトライ（指数バックオフ）

pub mod combinators;
pub mod data_source;
pub mod retry;
pub mod use_case;

#[cfg(test)]
mod scenarios;

// 主要な型を再エクスポート
pub use self::data_source::{NetworkDataSource, ResponseHandlers};
pub use self::retry::{Attempt, RetryPolicy, retry_outcome};
pub use self::use_case::{
    AsyncUseCase, Callbacks, DEFAULT_IDLE_DELAY, Delivery, ExecutionPolicy, UseCaseError,
    UseCaseRunner,
};
