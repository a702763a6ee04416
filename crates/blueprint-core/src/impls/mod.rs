//! Impls - ports の実装
//!
//! - **ReqwestTransport**: reqwest による本番用 transport
//! - **ScriptedTransport**: 台本どおりに返す開発・テスト用 transport
//! - **interceptors**: ヘッダー付与 / ログ / 接続チェック
//! - **StaticConnectivity**, **DefaultMessages**: 単純な既定実装

pub mod connectivity;
pub mod interceptors;
pub mod messages;
pub mod reqwest_transport;
pub mod scripted;

pub use self::connectivity::StaticConnectivity;
pub use self::interceptors::{
    ConnectivityInterceptor, HeaderInterceptor, InterceptorChain, LoggingInterceptor,
};
pub use self::messages::DefaultMessages;
pub use self::reqwest_transport::ReqwestTransport;
pub use self::scripted::{Reply, ScriptedTransport};
