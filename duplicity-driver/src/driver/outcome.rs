//! Typed interpretation of duplicity exit codes.
//!
//! Raw integers never cross this layer's boundary as success signals;
//! every exit code is folded into a tagged result the caller has to
//! branch on.

/// Result of a `verify` run, derived from the exit code alone.
///
/// The mapping is total: any code outside the documented set reads as
/// [`VerifyOutcome::CorruptData`], because an unrecognized failure must
/// not pass for success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// Exit code 0: the archive matches the source.
    NoChanges,
    /// Exit code 1: archive and source differ.
    IsChanged,
    /// Exit code 30: no backup chain exists at the target.
    NoBackupFound,
    /// Any other exit code.
    CorruptData,
}

impl VerifyOutcome {
    pub fn from_exit_code(code: i32) -> Self {
        match code {
            0 => Self::NoChanges,
            1 => Self::IsChanged,
            30 => Self::NoBackupFound,
            _ => Self::CorruptData,
        }
    }
}

/// Result of a backup or restore run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStatus {
    Success,
    Failure(i32),
}

impl ExecutionStatus {
    pub fn from_exit_code(code: i32) -> Self {
        if code == 0 {
            Self::Success
        } else {
            Self::Failure(code)
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}
