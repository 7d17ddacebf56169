//! Domain models

mod message;

pub use message::{MessageDetail, MessageId};
