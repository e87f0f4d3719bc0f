//! HTTP request handlers

pub mod chat;
pub mod contact;
pub mod health;
pub mod types;

pub use chat::*;
pub use contact::*;
pub use health::*;

pub use types::*;
