//! Tool-call lifecycle and permission-coordination engine.
//!
//! Inbound protocol messages are fed to a [`SessionManager`], which keeps one
//! [`ToolCallSession`] (and with it one [`ToolCallRegistry`]) per session.
//! Permission requests are matched to tool calls through
//! [`signature::signature`]; [`StatusResolver`] folds backend-declared
//! status, orphan detection and local state into one visible status.

// Prevent accidental direct writes to stdout/stderr in library code.
#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod config;
pub mod error;
mod manager;
pub mod orphan;
pub mod permissions;
pub mod registry;
mod session;
pub mod signature;
pub mod status;
pub mod summary;
pub mod transcript;

pub use config::Config;
pub use config::ConfigOverrides;
pub use error::MinionErr;
pub use manager::SessionManager;
pub use orphan::OrphanDetector;
pub use permissions::PermissionCoordinator;
pub use registry::ToolCallRegistry;
pub use session::ToolCallSession;
pub use status::StatusResolver;

pub use minion_protocol as protocol;
