//! Command dispatch and argument parsing for chat bots.

pub mod builtin;
pub mod channels;
pub mod command;
pub mod config;
pub mod error;
pub mod message;
pub mod parameter;
pub mod registry;
pub mod remote;
pub mod requirement;
pub mod router;
pub mod separator;
pub mod signature;
