//! Domain model (outcomes, error descriptors, sentinel codes).
//!
//! ここには I/O もランタイムも出てきません。値型だけを置きます。

pub mod codes;
pub mod errors;
pub mod outcome;

pub use self::codes::{StatusClass, TransportError};
pub use self::errors::{ErrorDescriptor, ErrorResponse, PLACEHOLDER_MESSAGE};
pub use self::outcome::{Outcome, OutcomeConsumer};
