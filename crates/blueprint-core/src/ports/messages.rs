//! MessageLookup port - コードから表示用メッセージへの変換
//!
//! 文言はこのクレートの責務ではありません。ホスト側が翻訳済みの
//! テキストを差し込めるよう trait にしています。

use crate::domain::{ErrorDescriptor, PLACEHOLDER_MESSAGE};

pub trait MessageLookup: Send + Sync {
    fn message_for(&self, code: i32) -> String;

    /// Text to show for `error`: the server's own message when it sent one,
    /// otherwise the lookup text for the code.
    fn describe(&self, error: &ErrorDescriptor) -> String {
        if error.message == PLACEHOLDER_MESSAGE {
            self.message_for(error.code)
        } else {
            error.message.clone()
        }
    }
}
