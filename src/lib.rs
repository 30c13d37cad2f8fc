//! commandkit - typed argument parsing and decorated command dispatch.
//!
//! Commands declare their parameters and constraints up front; input lines
//! are resolved to a command, parsed into typed values, checked against the
//! caller restriction and handed to the command's handler.

pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod logging;
