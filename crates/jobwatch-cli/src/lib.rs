//! jobwatch client library - job API, log stream and console rendering.
//!
//! Split from main.rs so the HTTP and websocket clients can be exercised by
//! integration tests.

pub mod api;
pub mod config;
pub mod logging;
pub mod stream;
pub mod surface;
