//! Duplicity Driver - Main entry point
//!
//! Thin CLI over the orchestration library: verify, backup, list, restore.

use anyhow::Result;
use clap::{Parser, Subcommand};
use duplicity_driver::{
    utils, Config, DuplicityDriver, ExecutionStatus, RestoreRequest, VerifyOutcome,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Report whether duplicity is installed and which version it is
    Status,
    /// Compare the archive against the source directory
    Verify {
        /// Also compare file contents, not just metadata
        #[arg(long)]
        compare_data: bool,
    },
    /// Run a backup
    Backup {
        /// Force a full backup instead of an incremental one
        #[arg(long)]
        full: bool,
    },
    /// List the backup chain at the target
    List {
        /// Emit the catalog as JSON
        #[arg(long)]
        json: bool,
    },
    /// Restore the state at a point in time into an empty directory
    Restore {
        /// Point in time to restore, RFC 3339 (e.g. 2020-01-01T00:00:00Z)
        #[arg(long)]
        time: String,
        /// Existing empty directory to restore into
        #[arg(long, value_name = "DIR")]
        to: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::from_file(&args.config)?;

    let log_level = args.log_level.as_deref().unwrap_or(&config.log.level);
    utils::logger::init(log_level)?;

    tracing::info!(
        "Starting duplicity-driver v{} (source: {})",
        env!("CARGO_PKG_VERSION"),
        config.backup.source_dir.display()
    );

    let mut driver = DuplicityDriver::from_config(&config)?;

    match args.command {
        Command::Status => {
            if !driver.is_installed() {
                println!("duplicity: not installed");
                std::process::exit(1);
            }
            let version = driver.version()?;
            println!("duplicity: installed, version {}", version);
        }
        Command::Verify { compare_data } => {
            let outcome = driver.verify(compare_data)?;
            println!("{:?}", outcome);
            if outcome != VerifyOutcome::NoChanges {
                std::process::exit(1);
            }
        }
        Command::Backup { full } => match driver.execute(full)? {
            ExecutionStatus::Success => println!("backup completed"),
            ExecutionStatus::Failure(code) => {
                for line in driver.last_output() {
                    tracing::error!("duplicity: {}", line);
                }
                anyhow::bail!("backup failed with exit code {}", code);
            }
        },
        Command::List { json } => {
            let entries = driver.collection_status()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else if entries.is_empty() {
                println!("no backups at target");
            } else {
                for entry in &entries {
                    println!(
                        "{:<12} {}",
                        format!("{:?}", entry.kind),
                        entry.timestamp.to_rfc3339()
                    );
                }
            }
        }
        Command::Restore { time, to } => {
            let time = chrono::DateTime::parse_from_rfc3339(&time)
                .map_err(|e| anyhow::anyhow!("invalid --time value: {}", e))?
                .with_timezone(&chrono::Utc);
            let request = RestoreRequest {
                time,
                destination: to,
            };
            match driver.restore(&request)? {
                ExecutionStatus::Success => println!("restore completed"),
                ExecutionStatus::Failure(code) => {
                    for line in driver.last_output() {
                        tracing::error!("duplicity: {}", line);
                    }
                    anyhow::bail!("restore failed with exit code {}", code);
                }
            }
        }
    }

    Ok(())
}
