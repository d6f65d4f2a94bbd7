//! CLI command implementations

pub mod apis;
pub mod cache;
pub mod config;
pub mod info;
pub mod resolve;

pub use apis::execute as apis;
pub use cache::execute as cache;
pub use config::execute as config;
pub use info::execute as info;
pub use resolve::execute as resolve;
