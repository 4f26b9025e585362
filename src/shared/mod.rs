//! Process configuration and secrets.

pub mod config;
pub mod secrets;
