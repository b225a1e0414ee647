//! Duplicity version discovery and feature gating.
//!
//! The tool's option set varies across releases, so optional flags are
//! gated on the version reported by `duplicity --version`. The probe runs
//! at most once per gate instance; concurrent first calls race safely and
//! the first parsed value wins.

use crate::process::ProcessRunner;
use crate::utils::errors::{DriverError, Result};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use tracing::debug;

/// Product name token stripped from probe output (`duplicity 0.7.19`).
const PRODUCT_TOKEN: &str = "duplicity";

const VERSION_FLAG: &str = "--version";

/// Dotted numeric version. Missing components compare as zero, so
/// `0.7` equals `0.7.0` and `0.6.99` sorts before `0.7`.
#[derive(Debug, Clone)]
pub struct ToolVersion {
    components: Vec<u64>,
}

impl ToolVersion {
    pub fn new<C: Into<Vec<u64>>>(components: C) -> Self {
        Self {
            components: components.into(),
        }
    }

    /// Extract the version from `--version` probe output by stripping the
    /// product name token and surrounding whitespace.
    pub fn from_probe_output(lines: &[String]) -> Result<Self> {
        let line = lines.first().map(String::as_str).unwrap_or("").trim();
        let raw = line.strip_prefix(PRODUCT_TOKEN).unwrap_or(line).trim();
        raw.parse()
    }
}

impl FromStr for ToolVersion {
    type Err = DriverError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(DriverError::VersionParse(s.to_string()));
        }
        let components = trimmed
            .split('.')
            .map(|part| part.parse::<u64>())
            .collect::<std::result::Result<Vec<u64>, _>>()
            .map_err(|_| DriverError::VersionParse(s.to_string()))?;
        Ok(Self { components })
    }
}

impl fmt::Display for ToolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self
            .components
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(".");
        write!(f, "{}", rendered)
    }
}

impl Ord for ToolVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.components.len().max(other.components.len());
        for i in 0..len {
            let a = self.components.get(i).copied().unwrap_or(0);
            let b = other.components.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for ToolVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ToolVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ToolVersion {}

/// Discovers and caches the installed duplicity version.
///
/// A single tool installation is assumed not to change mid-run, so the
/// version is discovered lazily on first need and then served from the
/// cache for the lifetime of the gate.
pub struct VersionGate {
    binary: String,
    cached: OnceLock<ToolVersion>,
}

impl VersionGate {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            cached: OnceLock::new(),
        }
    }

    /// Whether the tool answers a `--version` probe. Any failure,
    /// including a missing binary, reads as "not installed".
    pub fn is_installed(&self, runner: &mut dyn ProcessRunner) -> bool {
        runner.run(&self.binary, &[VERSION_FLAG.to_string()], &HashMap::new()) == 0
    }

    /// The installed version, probing the tool on first use.
    pub fn version(&self, runner: &mut dyn ProcessRunner) -> Result<&ToolVersion> {
        if let Some(version) = self.cached.get() {
            return Ok(version);
        }

        let code = runner.run(&self.binary, &[VERSION_FLAG.to_string()], &HashMap::new());
        if code != 0 {
            return Err(DriverError::ToolNotFound);
        }

        let parsed = ToolVersion::from_probe_output(runner.output())?;
        debug!(version = %parsed, "discovered duplicity version");
        // First writer wins on a concurrent first probe.
        Ok(self.cached.get_or_init(|| parsed))
    }

    /// Whether the cached version satisfies `min`. `false` until the
    /// version has been discovered.
    pub fn supports(&self, min: &ToolVersion) -> bool {
        self.cached.get().is_some_and(|v| v >= min)
    }
}

#[cfg(test)]
impl VersionGate {
    /// Gate with a pre-discovered version, for tests that exercise
    /// resolution without a probe.
    pub(crate) fn with_version(version: ToolVersion) -> Self {
        let gate = Self::new(PRODUCT_TOKEN);
        let _ = gate.cached.set(version);
        gate
    }
}
