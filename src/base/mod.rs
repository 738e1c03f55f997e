//! Message passing primitive and its building blocks

mod config;
mod message;
mod message_passing;
pub mod init;
pub mod scatter;

pub use config::MessagePassingConfig;
pub use init::Initialization;
pub use message::{FnMessage, Identity, Linear, Message};
pub use message_passing::MessagePassing;
pub use scatter::{gather_rows, scatter, Aggregation};
