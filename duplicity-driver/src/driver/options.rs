//! Registry of optional duplicity flags.
//!
//! Options are version-gated: an enabled flag the local tool is too old
//! to understand is dropped with a warning rather than failing the
//! operation. Registration order is fixed, so identical configuration
//! always resolves to the same flag sequence.

use crate::driver::version::{ToolVersion, VersionGate};
use tracing::warn;

/// `--no-encryption`: skip gpg entirely. Disabled automatically once a
/// passphrase is configured.
pub const NO_ENCRYPTION: &str = "--no-encryption";

/// `--asynchronous-upload`: overlap volume upload with packing.
pub const ASYNCHRONOUS_UPLOAD: &str = "--asynchronous-upload";

/// One optional flag together with the minimum tool version that
/// understands it.
#[derive(Debug, Clone)]
pub struct ToolOption {
    pub flag: String,
    pub min_version: ToolVersion,
    pub enabled: bool,
}

/// Insertion-ordered option registry.
#[derive(Debug, Default)]
pub struct OptionSet {
    options: Vec<ToolOption>,
}

impl OptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry the driver starts from.
    pub fn with_defaults() -> Self {
        let mut set = Self::new();
        set.register(NO_ENCRYPTION, ToolVersion::new([0, 1]), true);
        set.register(ASYNCHRONOUS_UPLOAD, ToolVersion::new([0, 6, 23]), false);
        set
    }

    /// Register a flag. Re-registering an existing flag updates it in
    /// place, keeping its original position.
    pub fn register(&mut self, flag: &str, min_version: ToolVersion, enabled: bool) {
        if let Some(existing) = self.options.iter_mut().find(|o| o.flag == flag) {
            existing.min_version = min_version;
            existing.enabled = enabled;
            return;
        }
        self.options.push(ToolOption {
            flag: flag.to_string(),
            min_version,
            enabled,
        });
    }

    /// Toggle a flag. Returns `false` when the flag is not registered.
    pub fn set_enabled(&mut self, flag: &str, enabled: bool) -> bool {
        match self.options.iter_mut().find(|o| o.flag == flag) {
            Some(option) => {
                option.enabled = enabled;
                true
            }
            None => false,
        }
    }

    pub fn is_enabled(&self, flag: &str) -> bool {
        self.options.iter().any(|o| o.flag == flag && o.enabled)
    }

    /// Flags to pass on the next invocation, in registration order.
    /// Enabled flags the installed tool predates are skipped with a
    /// warning and the operation proceeds without them.
    pub fn resolve(&self, gate: &VersionGate) -> Vec<String> {
        let mut flags = Vec::new();
        for option in &self.options {
            if !option.enabled {
                continue;
            }
            if gate.supports(&option.min_version) {
                flags.push(option.flag.clone());
            } else {
                warn!(
                    "option {} requires duplicity >= {}, not available locally",
                    option.flag, option.min_version
                );
            }
        }
        flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version(s: &str) -> ToolVersion {
        s.parse().unwrap()
    }

    #[test]
    fn test_resolve_keeps_registration_order() {
        let mut set = OptionSet::new();
        set.register("--bbb", version("0.1"), true);
        set.register("--aaa", version("0.1"), true);
        let gate = VersionGate::with_version(version("0.8"));

        assert_eq!(set.resolve(&gate), vec!["--bbb", "--aaa"]);
        // Same inputs, same flag sequence.
        assert_eq!(set.resolve(&gate), vec!["--bbb", "--aaa"]);
    }

    #[test]
    fn test_resolve_skips_disabled_options() {
        let set = OptionSet::with_defaults();
        let gate = VersionGate::with_version(version("0.8"));

        assert_eq!(set.resolve(&gate), vec![NO_ENCRYPTION]);
    }

    #[test]
    fn test_resolve_drops_unsupported_options() {
        let mut set = OptionSet::with_defaults();
        set.set_enabled(ASYNCHRONOUS_UPLOAD, true);
        let gate = VersionGate::with_version(version("0.6.22"));

        // Too old for --asynchronous-upload; the flag is dropped, not fatal.
        assert_eq!(set.resolve(&gate), vec![NO_ENCRYPTION]);
    }

    #[test]
    fn test_resolve_includes_supported_options() {
        let mut set = OptionSet::with_defaults();
        set.set_enabled(ASYNCHRONOUS_UPLOAD, true);
        let gate = VersionGate::with_version(version("0.6.23"));

        assert_eq!(set.resolve(&gate), vec![NO_ENCRYPTION, ASYNCHRONOUS_UPLOAD]);
    }

    #[test]
    fn test_set_enabled_unknown_flag() {
        let mut set = OptionSet::with_defaults();

        assert!(!set.set_enabled("--made-up", true));
        assert!(set.set_enabled(NO_ENCRYPTION, false));
        assert!(!set.is_enabled(NO_ENCRYPTION));
    }

    #[test]
    fn test_register_updates_in_place() {
        let mut set = OptionSet::new();
        set.register("--first", version("0.1"), true);
        set.register("--second", version("0.1"), true);
        set.register("--first", version("0.9"), true);
        let gate = VersionGate::with_version(version("0.8"));

        // --first kept its position but now requires 0.9.
        assert_eq!(set.resolve(&gate), vec!["--second"]);
    }
}
