//! Parser for `collection-status` output.
//!
//! The catalog is free text. A backup row carries a `Full` or
//! `Incremental` token, a ctime-style timestamp, then further columns;
//! duplicity separates the timestamp from what follows with a run of at
//! least ten spaces, and that separator width is what disambiguates the
//! timestamp field from trailing columns. The grammar assumption lives
//! in this module only, so a future output format change stays contained
//! here.

use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;
use tracing::debug;

/// Timestamp layout of the catalog column (`Wed Jan  1 00:00:00 2020`).
const TIMESTAMP_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BackupKind {
    Full,
    Incremental,
}

/// One row of the backup catalog, in the order the tool listed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupEntry {
    pub kind: BackupKind,
    pub timestamp: DateTime<Utc>,
}

fn row_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*(Full|Incremental)\s+(.+?)\s{10,}").expect("static pattern compiles")
    })
}

/// Extract backup rows from captured `collection-status` lines.
///
/// Source order is preserved and never re-sorted. Lines that do not
/// match the row grammar are skipped; a matching row whose timestamp
/// fails to parse is skipped with a diagnostic.
pub fn parse_collection_status(lines: &[String]) -> Vec<BackupEntry> {
    let mut entries = Vec::new();

    for line in lines {
        let Some(captures) = row_pattern().captures(line) else {
            continue;
        };

        let kind = match &captures[1] {
            "Full" => BackupKind::Full,
            _ => BackupKind::Incremental,
        };

        let raw = captures[2].trim();
        match NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT) {
            // The column carries no zone information; pin it to UTC.
            Ok(naive) => entries.push(BackupEntry {
                kind,
                timestamp: naive.and_utc(),
            }),
            Err(e) => {
                debug!(
                    line = %line.trim_end(),
                    error = %e,
                    "skipping catalog row with unparseable timestamp"
                );
            }
        }
    }

    entries
}
