//! Todo service library.
//!
//! Exposes the router, handlers and record stores for use by the
//! `todo-server` binary, tests, and embedding.

pub mod config;
pub mod error;
pub mod handlers;
pub mod server;
pub mod store;
