//! studydesk-core - Shared functionality for studydesk tools
//!
//! Resolves where tools keep their data and loads the application config.

pub mod config;
pub mod paths;

pub use config::Config;
pub use paths::Paths;
