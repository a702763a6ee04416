//! Ports - 抽象化レイヤー
//!
//! このモジュールは Hexagonal Architecture の「ポート」を定義します。
//! 各 trait は外部システム（HTTP クライアント、OS の接続状態、
//! 文言リソース）へのインターフェースを提供し、実装の詳細を隠蔽します。

pub mod cancel;
pub mod connectivity;
pub mod interceptor;
pub mod messages;
pub mod transport;

// 主要な trait を再エクスポート
pub use self::cancel::CancelScope;
pub use self::connectivity::Connectivity;
pub use self::interceptor::Interceptor;
pub use self::messages::MessageLookup;
pub use self::transport::{
    ApiRequest, ApiResponse, HttpTransport, RawResponse, fetch, is_unit,
};
