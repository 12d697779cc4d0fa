//! HTTP surfaces for the follow relationship service.

pub mod auth;
pub mod config;
pub mod error;
pub mod server;
