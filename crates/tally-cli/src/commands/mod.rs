//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared utilities (config and pipeline loading)
//! - `predict` - Single and batch prediction
//! - `check` - Config and model verification
//! - `audit` - Audit log listing
//! - `serve` - Web server command

pub mod audit;
pub mod check;
pub mod core;
pub mod predict;
pub mod serve;

// Re-export command functions for main.rs
pub use audit::*;
pub use check::*;
pub use core::*;
pub use predict::*;
pub use serve::*;
