//! Command assembly for duplicity invocations.
//!
//! A builder produces a complete [`Invocation`]: the argument vector plus
//! the environment entries to layer on top of the inherited environment.
//! The passphrase travels only through the `PASSPHRASE` environment
//! variable and never appears in the argument list, where it would leak
//! into process listings.

use crate::driver::version::ToolVersion;
use crate::fs::DirectoryProbe;
use crate::utils::errors::{DriverError, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Environment variable duplicity reads the passphrase from.
pub const PASSPHRASE_VAR: &str = "PASSPHRASE";

/// First duplicity release where `verify` only compares file data when
/// `--compare-data` is passed. Older releases compare data on every
/// verify, so against a pre-0.7 tool the flag changes nothing: data is
/// checked either way. Command assembly does not special-case this;
/// callers needing uniform behavior across versions must account for it.
pub const COMPARE_DATA_OPT_IN: &str = "0.7";

/// [`COMPARE_DATA_OPT_IN`] as a comparable version.
pub fn compare_data_opt_in() -> ToolVersion {
    ToolVersion::new([0, 7])
}

/// A fully assembled, ready-to-execute command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub arguments: Vec<String>,
    pub environment: HashMap<String, String>,
}

/// A request to restore the backup state at `time` into `destination`.
///
/// The destination must exist, be readable, and be empty. The check runs
/// before any process is spawned.
#[derive(Debug, Clone)]
pub struct RestoreRequest {
    pub time: DateTime<Utc>,
    pub destination: PathBuf,
}

/// Check the restore target precondition, distinguishing the three
/// failure modes.
pub fn validate_restore_target(destination: &Path, probe: &dyn DirectoryProbe) -> Result<()> {
    if !probe.exists(destination) {
        return Err(DriverError::RestoreTargetMissing(destination.to_path_buf()));
    }
    if !probe.is_readable(destination) {
        return Err(DriverError::RestoreTargetUnreadable(destination.to_path_buf()));
    }
    match probe.is_empty(destination) {
        Some(true) => Ok(()),
        Some(false) => Err(DriverError::RestoreTargetNotEmpty(destination.to_path_buf())),
        // Emptiness unknowable means the directory went unreadable.
        None => Err(DriverError::RestoreTargetUnreadable(destination.to_path_buf())),
    }
}

/// Assembles the argument vector for one operation each.
///
/// Every operation starts with the resolved option flags, then one
/// `--exclude **/<dir>` pair per configured exclusion in list order, so
/// identical configuration always yields byte-identical commands.
pub struct CommandBuilder<'a> {
    flags: Vec<String>,
    excludes: &'a [String],
    source: &'a Path,
    target_url: &'a str,
    passphrase: Option<&'a str>,
}

impl<'a> CommandBuilder<'a> {
    pub fn new(
        flags: Vec<String>,
        excludes: &'a [String],
        source: &'a Path,
        target_url: &'a str,
        passphrase: Option<&'a str>,
    ) -> Self {
        Self {
            flags,
            excludes,
            source,
            target_url,
            passphrase,
        }
    }

    /// `verify [--compare-data] <target> <source>`.
    ///
    /// See [`COMPARE_DATA_OPT_IN`] for what running without
    /// `compare_data` means on older tools.
    pub fn verify(&self, compare_data: bool) -> Invocation {
        let mut arguments = self.common_prefix();
        arguments.push("verify".to_string());
        if compare_data {
            arguments.push("--compare-data".to_string());
        }
        arguments.push(self.target_url.to_string());
        arguments.push(self.source.display().to_string());
        self.finish(arguments)
    }

    /// `[full] <source> <target>`: incremental unless `full` is set, in
    /// which case the `full` operation token is prefixed.
    pub fn execute(&self, full: bool) -> Invocation {
        let mut arguments = self.common_prefix();
        if full {
            arguments.push("full".to_string());
        }
        arguments.push(self.source.display().to_string());
        arguments.push(self.target_url.to_string());
        self.finish(arguments)
    }

    /// `collection-status <target>`.
    pub fn collection_status(&self) -> Invocation {
        let mut arguments = self.common_prefix();
        arguments.push("collection-status".to_string());
        arguments.push(self.target_url.to_string());
        self.finish(arguments)
    }

    /// `restore --restore-time <rfc3339> <target> <destination>`.
    ///
    /// Fails without building anything when the destination is missing,
    /// unreadable, or non-empty.
    pub fn restore(
        &self,
        request: &RestoreRequest,
        probe: &dyn DirectoryProbe,
    ) -> Result<Invocation> {
        validate_restore_target(&request.destination, probe)?;

        let mut arguments = self.common_prefix();
        arguments.push("restore".to_string());
        arguments.push("--restore-time".to_string());
        arguments.push(request.time.to_rfc3339_opts(SecondsFormat::Secs, false));
        arguments.push(self.target_url.to_string());
        arguments.push(request.destination.display().to_string());
        Ok(self.finish(arguments))
    }

    fn common_prefix(&self) -> Vec<String> {
        let mut arguments = self.flags.clone();
        for dir in self.excludes {
            arguments.push("--exclude".to_string());
            arguments.push(format!("**/{}", dir));
        }
        arguments
    }

    fn finish(&self, arguments: Vec<String>) -> Invocation {
        let mut environment = HashMap::new();
        if let Some(passphrase) = self.passphrase {
            environment.insert(PASSPHRASE_VAR.to_string(), passphrase.to_string());
        }
        Invocation {
            arguments,
            environment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::SystemProbe;
    use chrono::TimeZone;
    use tempfile::TempDir;

    struct StubProbe {
        exists: bool,
        readable: bool,
        empty: Option<bool>,
    }

    impl StubProbe {
        fn good() -> Self {
            Self {
                exists: true,
                readable: true,
                empty: Some(true),
            }
        }
    }

    impl DirectoryProbe for StubProbe {
        fn exists(&self, _path: &Path) -> bool {
            self.exists
        }

        fn is_readable(&self, _path: &Path) -> bool {
            self.readable
        }

        fn is_empty(&self, _path: &Path) -> Option<bool> {
            self.empty
        }
    }

    fn builder<'a>(excludes: &'a [String], passphrase: Option<&'a str>) -> CommandBuilder<'a> {
        CommandBuilder::new(
            vec!["--no-encryption".to_string()],
            excludes,
            Path::new("/data"),
            "file:///backups",
            passphrase,
        )
    }

    fn request() -> RestoreRequest {
        RestoreRequest {
            time: Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
            destination: PathBuf::from("/restore/out"),
        }
    }

    #[test]
    fn test_verify_arguments() {
        let invocation = builder(&[], None).verify(false);

        assert_eq!(
            invocation.arguments,
            vec!["--no-encryption", "verify", "file:///backups", "/data"]
        );
    }

    #[test]
    fn test_verify_with_compare_data() {
        let invocation = builder(&[], None).verify(true);

        assert_eq!(
            invocation.arguments,
            vec![
                "--no-encryption",
                "verify",
                "--compare-data",
                "file:///backups",
                "/data"
            ]
        );
    }

    #[test]
    fn test_execute_orders_flags_excludes_token_paths() {
        let excludes = vec!["cache".to_string(), "tmp/data".to_string()];
        let invocation = builder(&excludes, None).execute(true);

        assert_eq!(
            invocation.arguments,
            vec![
                "--no-encryption",
                "--exclude",
                "**/cache",
                "--exclude",
                "**/tmp/data",
                "full",
                "/data",
                "file:///backups"
            ]
        );
    }

    #[test]
    fn test_execute_incremental_has_no_operation_token() {
        let invocation = builder(&[], None).execute(false);

        assert_eq!(
            invocation.arguments,
            vec!["--no-encryption", "/data", "file:///backups"]
        );
    }

    #[test]
    fn test_collection_status_arguments() {
        let invocation = builder(&[], None).collection_status();

        assert_eq!(
            invocation.arguments,
            vec!["--no-encryption", "collection-status", "file:///backups"]
        );
    }

    #[test]
    fn test_passphrase_goes_to_environment_only() {
        let invocation = builder(&[], Some("secret")).execute(false);

        assert_eq!(
            invocation.environment.get(PASSPHRASE_VAR).map(String::as_str),
            Some("secret")
        );
        assert!(!invocation.arguments.iter().any(|a| a.contains("secret")));
    }

    #[test]
    fn test_no_passphrase_means_empty_environment() {
        let invocation = builder(&[], None).execute(false);

        assert!(invocation.environment.is_empty());
    }

    #[test]
    fn test_restore_arguments() {
        let invocation = builder(&[], None)
            .restore(&request(), &StubProbe::good())
            .unwrap();

        assert_eq!(
            invocation.arguments,
            vec![
                "--no-encryption",
                "restore",
                "--restore-time",
                "2020-01-01T00:00:00+00:00",
                "file:///backups",
                "/restore/out"
            ]
        );
    }

    #[test]
    fn test_restore_rejects_missing_target() {
        let probe = StubProbe {
            exists: false,
            readable: false,
            empty: None,
        };

        let result = builder(&[], None).restore(&request(), &probe);

        assert!(matches!(result, Err(DriverError::RestoreTargetMissing(_))));
    }

    #[test]
    fn test_restore_rejects_unreadable_target() {
        let probe = StubProbe {
            exists: true,
            readable: false,
            empty: None,
        };

        let result = builder(&[], None).restore(&request(), &probe);

        assert!(matches!(
            result,
            Err(DriverError::RestoreTargetUnreadable(_))
        ));
    }

    #[test]
    fn test_restore_rejects_populated_target() {
        let probe = StubProbe {
            exists: true,
            readable: true,
            empty: Some(false),
        };

        let result = builder(&[], None).restore(&request(), &probe);

        assert!(matches!(result, Err(DriverError::RestoreTargetNotEmpty(_))));
    }

    #[test]
    fn test_restore_treats_unknown_emptiness_as_unreadable() {
        let probe = StubProbe {
            exists: true,
            readable: true,
            empty: None,
        };

        let result = builder(&[], None).restore(&request(), &probe);

        assert!(matches!(
            result,
            Err(DriverError::RestoreTargetUnreadable(_))
        ));
    }

    #[test]
    fn test_restore_into_real_empty_directory() -> std::io::Result<()> {
        let temp_dir = TempDir::new()?;
        let request = RestoreRequest {
            time: Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
            destination: temp_dir.path().to_path_buf(),
        };

        let result = builder(&[], None).restore(&request, &SystemProbe);

        assert!(result.is_ok());
        Ok(())
    }

    #[test]
    fn test_restore_into_real_populated_directory() -> std::io::Result<()> {
        let temp_dir = TempDir::new()?;
        std::fs::write(temp_dir.path().join("existing.txt"), b"data")?;
        let request = RestoreRequest {
            time: Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
            destination: temp_dir.path().to_path_buf(),
        };

        let result = builder(&[], None).restore(&request, &SystemProbe);

        assert!(matches!(result, Err(DriverError::RestoreTargetNotEmpty(_))));
        Ok(())
    }
}
