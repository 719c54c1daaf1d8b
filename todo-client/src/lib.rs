//! Todo client library.
//!
//! The gateway talks HTTP to the todo server, the view keeps the local list
//! in step with it, and the render module turns that list into text for the
//! `todo` binary.

pub mod config;
pub mod gateway;
pub mod render;
pub mod view;
