//! Test driver for optparser integration tests.
//!
//! Runs the `test-optparser` binary with a given command line and captures
//! everything it produces:
//! - stdout: callback lines, help text, default error reports
//! - stderr: log output
//! - the exit status

use std::process::{Command, Stdio};

use tracing::debug;

/// The result of one `test-optparser` run.
#[derive(Debug)]
pub struct TestRun {
    stdout: String,
    stderr: String,
    code: Option<i32>,
}

impl TestRun {
    /// Run `binary` with `args`.
    pub fn run(binary: &str, args: &[&str]) -> std::io::Result<TestRun> {
        Self::run_with_env(binary, args, &[])
    }

    /// Like `run`, with additional environment variables.
    pub fn run_with_env(
        binary: &str,
        args: &[&str],
        env: &[(&str, &str)],
    ) -> std::io::Result<TestRun> {
        let mut cmd = Command::new(binary);
        cmd.args(args)
            .env_remove("RUST_LOG")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        for (k, v) in env {
            cmd.env(k, v);
        }

        debug!(binary, ?args, "spawning");
        let output = cmd.output()?;
        Ok(TestRun {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            code: output.status.code(),
        })
    }

    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    pub fn stderr(&self) -> &str {
        &self.stderr
    }

    /// Exit status, `None` if the process was killed by a signal.
    pub fn code(&self) -> Option<i32> {
        self.code
    }

    /// Stdout split into lines.
    pub fn lines(&self) -> Vec<&str> {
        self.stdout.lines().collect()
    }

    /// Assert that stdout contains `needle`, showing the full output if not.
    pub fn assert_stdout_contains(&self, needle: &str) {
        assert!(
            self.stdout.contains(needle),
            "expected stdout to contain {:?}\nstdout:\n{}\nstderr:\n{}",
            needle,
            self.stdout,
            self.stderr
        );
    }

    /// Assert that stdout does not contain `needle`.
    pub fn assert_stdout_lacks(&self, needle: &str) {
        assert!(
            !self.stdout.contains(needle),
            "expected stdout not to contain {:?}\nstdout:\n{}",
            needle,
            self.stdout
        );
    }
}
