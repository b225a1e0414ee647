//! External process execution.
//!
//! The driver never interpolates a shell string; it hands a fully
//! assembled argument vector and environment map to a [`ProcessRunner`].
//! The runner is stateful per run: [`ProcessRunner::output`] returns the
//! captured lines of the most recent invocation, so one runner instance
//! must not be shared across overlapping invocations.

use std::collections::HashMap;
use std::process::Command;
use tracing::debug;

/// Exit code reported when the program could not be spawned at all.
pub const SPAWN_FAILURE_CODE: i32 = 127;

pub trait ProcessRunner {
    /// Run `program` with `args`, layering `env` on top of the inherited
    /// environment, and block until it exits. Spawn failures map to
    /// [`SPAWN_FAILURE_CODE`] instead of an error.
    fn run(&mut self, program: &str, args: &[String], env: &HashMap<String, String>) -> i32;

    /// Captured stdout and stderr lines of the most recent run.
    fn output(&self) -> &[String];
}

/// [`ProcessRunner`] backed by `std::process::Command`.
#[derive(Debug, Default)]
pub struct SystemRunner {
    output: Vec<String>,
}

impl SystemRunner {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProcessRunner for SystemRunner {
    fn run(&mut self, program: &str, args: &[String], env: &HashMap<String, String>) -> i32 {
        let mut cmd = Command::new(program);
        cmd.args(args);
        for (key, value) in env {
            cmd.env(key, value);
        }

        match cmd.output() {
            Ok(out) => {
                let stdout = String::from_utf8_lossy(&out.stdout);
                let stderr = String::from_utf8_lossy(&out.stderr);
                self.output = stdout
                    .lines()
                    .chain(stderr.lines())
                    .map(str::to_string)
                    .collect();

                // None means the process died to a signal
                let code = out.status.code().unwrap_or(-1);
                debug!(program, code, "process finished");
                code
            }
            Err(e) => {
                debug!(program, error = %e, "failed to spawn process");
                self.output.clear();
                SPAWN_FAILURE_CODE
            }
        }
    }

    fn output(&self) -> &[String] {
        &self.output
    }
}
