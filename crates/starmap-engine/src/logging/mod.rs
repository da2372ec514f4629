//! Logging utilities.
//!
//! Centralizes logger initialization for map hosts. Library code only talks
//! to the `log` facade; `env_logger` is wired up here once per process.

mod init;

pub use init::{init_logging, LoggingConfig};
