//! Orchestration of the duplicity command-line tool.
//!
//! This layer builds correctly-formed invocations and interprets exit
//! codes and captured output into typed results; it does not implement
//! backup logic, manage encryption, or retry anything. Each operation
//! blocks on the external process for its full duration, so callers
//! wanting responsiveness run operations on their own worker thread.

pub mod catalog;
pub mod command;
pub mod options;
pub mod outcome;
pub mod version;

use crate::config::Config;
use crate::fs::{DirectoryProbe, SystemProbe};
use crate::process::{ProcessRunner, SystemRunner};
use crate::utils::errors::{DriverError, Result};
use catalog::BackupEntry;
use command::{CommandBuilder, Invocation, RestoreRequest};
use options::OptionSet;
use outcome::{ExecutionStatus, VerifyOutcome};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use version::{ToolVersion, VersionGate};

/// Caller-facing orchestrator for one source/target pair.
///
/// Holds the option registry, exclusions, and passphrase configured for
/// this instance, plus the process and filesystem collaborators every
/// operation goes through.
pub struct DuplicityDriver {
    binary: String,
    source: PathBuf,
    target_url: String,
    options: OptionSet,
    excludes: Vec<String>,
    passphrase: Option<String>,
    gate: VersionGate,
    runner: Box<dyn ProcessRunner>,
    probe: Box<dyn DirectoryProbe>,
}

impl DuplicityDriver {
    /// Driver wired to the real system collaborators.
    pub fn new(binary: &str, source: &Path, target: &Path) -> Self {
        Self::with_collaborators(
            binary,
            source,
            target,
            Box::new(SystemRunner::new()),
            Box::new(SystemProbe),
        )
    }

    /// Driver with explicit collaborators, for tests and embedding.
    pub fn with_collaborators(
        binary: &str,
        source: &Path,
        target: &Path,
        runner: Box<dyn ProcessRunner>,
        probe: Box<dyn DirectoryProbe>,
    ) -> Self {
        Self {
            binary: binary.to_string(),
            source: source.to_path_buf(),
            target_url: format!("file://{}", target.display()),
            options: OptionSet::with_defaults(),
            excludes: Vec::new(),
            passphrase: None,
            gate: VersionGate::new(binary),
            runner,
            probe,
        }
    }

    /// Driver configured from the loaded TOML config.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut driver = Self::new(
            &config.duplicity.binary,
            &config.backup.source_dir,
            &config.backup.target_dir,
        );
        driver.set_excluded_subdirectories(config.backup.exclude.clone());
        if config.duplicity.asynchronous_upload {
            driver.options.set_enabled(options::ASYNCHRONOUS_UPLOAD, true);
        }
        if let Some(passphrase) = &config.duplicity.passphrase {
            driver.set_passphrase(passphrase)?;
        }
        Ok(driver)
    }

    /// Whether the tool answers a version probe.
    pub fn is_installed(&mut self) -> bool {
        self.gate.is_installed(self.runner.as_mut())
    }

    /// The installed tool version (probed once, then cached).
    pub fn version(&mut self) -> Result<ToolVersion> {
        self.gate.version(self.runner.as_mut()).cloned()
    }

    /// Configure the archive passphrase. A non-empty passphrase disables
    /// `--no-encryption` and is handed to the tool only through the
    /// process environment.
    pub fn set_passphrase(&mut self, passphrase: &str) -> Result<()> {
        if passphrase.is_empty() {
            return Err(DriverError::EmptyPassphrase);
        }
        self.options.set_enabled(options::NO_ENCRYPTION, false);
        self.passphrase = Some(passphrase.to_string());
        Ok(())
    }

    /// Subdirectories (relative to the source) excluded from every
    /// operation, in the given order.
    pub fn set_excluded_subdirectories(&mut self, dirs: Vec<String>) {
        self.excludes = dirs;
    }

    pub fn options(&self) -> &OptionSet {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut OptionSet {
        &mut self.options
    }

    /// Raw captured lines of the most recent invocation.
    pub fn last_output(&self) -> &[String] {
        self.runner.output()
    }

    /// Compare the archive against the source directory.
    pub fn verify(&mut self, compare_data: bool) -> Result<VerifyOutcome> {
        let version = self.gate.version(self.runner.as_mut())?.clone();
        if !compare_data && version < command::compare_data_opt_in() {
            info!(
                %version,
                "this duplicity release predates opt-in --compare-data; verify compares file data regardless"
            );
        }

        let invocation = self.builder().verify(compare_data);
        let code = self.run(&invocation);
        let result = VerifyOutcome::from_exit_code(code);
        info!(code, ?result, "verify finished");
        Ok(result)
    }

    /// Run a backup: incremental by default, full when requested.
    pub fn execute(&mut self, full: bool) -> Result<ExecutionStatus> {
        self.gate.version(self.runner.as_mut())?;
        let invocation = self.builder().execute(full);
        info!(
            backup_type = if full { "full" } else { "incremental" },
            "starting backup"
        );
        let code = self.run(&invocation);
        Ok(ExecutionStatus::from_exit_code(code))
    }

    /// Restore the state at `request.time` into `request.destination`.
    ///
    /// The destination precondition is checked before anything is
    /// spawned, including the version probe.
    pub fn restore(&mut self, request: &RestoreRequest) -> Result<ExecutionStatus> {
        command::validate_restore_target(&request.destination, self.probe.as_ref())?;
        self.gate.version(self.runner.as_mut())?;
        let invocation = self.builder().restore(request, self.probe.as_ref())?;
        info!(
            destination = %request.destination.display(),
            time = %request.time,
            "starting restore"
        );
        let code = self.run(&invocation);
        Ok(ExecutionStatus::from_exit_code(code))
    }

    /// The backup catalog at the target, in listing order. A target
    /// without any chains yet yields an empty catalog, not an error.
    pub fn collection_status(&mut self) -> Result<Vec<BackupEntry>> {
        self.gate.version(self.runner.as_mut())?;
        let invocation = self.builder().collection_status();
        let code = self.run(&invocation);
        if code != 0 {
            debug!(code, "collection-status exited non-zero, treating catalog as empty");
            return Ok(Vec::new());
        }
        Ok(catalog::parse_collection_status(self.runner.output()))
    }

    fn builder(&self) -> CommandBuilder<'_> {
        CommandBuilder::new(
            self.options.resolve(&self.gate),
            &self.excludes,
            &self.source,
            &self.target_url,
            self.passphrase.as_deref(),
        )
    }

    fn run(&mut self, invocation: &Invocation) -> i32 {
        debug!(arguments = ?invocation.arguments, "running duplicity");
        self.runner
            .run(&self.binary, &invocation.arguments, &invocation.environment)
    }
}
