//! Connectivity port - ネットワーク到達性の問い合わせ

/// Connectivity は「いまオンラインか」を答える
///
/// transport はリクエスト前にこれを見て、オフラインなら
/// ネットワークに触れずに `TransportError::NoConnectivity` を返します。
pub trait Connectivity: Send + Sync {
    fn is_online(&self) -> bool;
}
