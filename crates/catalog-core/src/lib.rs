//! Core types shared by the SKU-family catalog crates.
//!
//! Nothing here performs I/O apart from loading configuration and installing
//! the tracing subscriber.

pub mod code;
pub mod config;
pub mod error;
pub mod logging;
pub mod types;
pub mod util;
