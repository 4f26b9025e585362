//! Infrastructure adapters. Implement outbound ports, drive the inbound one.
//!
//! WordPress database, mail transports, local store, admin HTTP, console. Map errors to DomainError.

pub mod admin;
pub mod mail;
pub mod persistence;
pub mod ui;
pub mod wordpress;
