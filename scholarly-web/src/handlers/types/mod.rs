//! Request and response types shared by the handlers

pub mod chat;
pub mod common;
pub mod contact;

pub use chat::*;
pub use common::*;
pub use contact::*;
