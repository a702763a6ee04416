//! blueprint-core
//!
//! Outcome propagation for remote calls: a three-state result type, a data
//! source that turns every HTTP/transport result into that type, and a use
//! case runner with a fixed `loading → result → idle` notification sequence.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（Outcome, ErrorDescriptor, センチネルコード, TransportError）
//! - **ports**: 抽象化レイヤー（HttpTransport, Interceptor, Connectivity, MessageLookup, CancelScope）
//! - **app**: アプリケーションロジック（NetworkDataSource, UseCaseRunner, combinators, retry）
//! - **impls**: 実装（ReqwestTransport, ScriptedTransport, interceptors）
//! - **config**: 環境変数からの設定読み込み

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod ports;

pub use crate::app::{AsyncUseCase, Callbacks, NetworkDataSource, UseCaseRunner};
pub use crate::config::AppConfig;
pub use crate::domain::{ErrorDescriptor, Outcome, TransportError};
