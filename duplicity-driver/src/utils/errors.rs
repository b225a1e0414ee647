//! Custom error types for the duplicity driver.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DriverError {
    #[error("duplicity is not installed or could not be probed")]
    ToolNotFound,

    #[error("could not parse a duplicity version from {0:?}")]
    VersionParse(String),

    #[error("restore target {} does not exist", .0.display())]
    RestoreTargetMissing(PathBuf),

    #[error("restore target {} is not readable", .0.display())]
    RestoreTargetUnreadable(PathBuf),

    #[error("restore target {} is not empty", .0.display())]
    RestoreTargetNotEmpty(PathBuf),

    #[error("passphrase must not be empty")]
    EmptyPassphrase,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DriverError>;
