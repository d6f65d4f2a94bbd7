//! devid - Stable device identifier resolution
//!
//! Resolves one identifier per device from whatever the host offers:
//! native bridges, media devices, client hints or the hardware profile,
//! falling back to a generated id. Also ships the offline cache worker
//! that keeps the app shell available without a network.

pub mod cache;
pub mod capability;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod host;
pub mod resolver;
pub mod ui;
pub mod worker;

pub use error::{DevIdError, DevIdResult};
