//! Duplicity Driver Library
//!
//! Orchestrates the duplicity backup tool through its command-line
//! interface: version-gated option negotiation, command assembly, exit
//! code interpretation, and catalog parsing.

pub mod config;
pub mod driver;
pub mod fs;
pub mod process;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use driver::catalog::{BackupEntry, BackupKind};
pub use driver::command::{Invocation, RestoreRequest};
pub use driver::outcome::{ExecutionStatus, VerifyOutcome};
pub use driver::version::ToolVersion;
pub use driver::DuplicityDriver;
pub use utils::errors::DriverError;
pub type Result<T> = std::result::Result<T, DriverError>;
