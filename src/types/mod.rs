//! Core types for Aibitat.

pub mod chat;
pub mod completion;
pub mod message;

pub use chat::*;
pub use completion::*;
pub use message::*;
