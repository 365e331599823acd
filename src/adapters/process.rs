//! Helpers for invoking external command-line tools

use std::ffi::OsStr;
use std::path::PathBuf;
use std::process::{Command, Output};

use tracing::debug;

use crate::error::{AnifetchError, AnifetchResult};

/// A configured external program, resolved on every use so a missing tool
/// only fails the operations that need it
#[derive(Debug, Clone)]
pub struct ExternalTool {
    name: String,
    program: String,
}

impl ExternalTool {
    /// `name` is used in messages, `program` is a bare command or a path
    pub fn new(name: &str, program: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            program: program.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Locate the program on `PATH`
    pub fn resolve(&self) -> AnifetchResult<PathBuf> {
        which::which(&self.program).map_err(|e| {
            AnifetchError::tool(
                &self.name,
                format!("'{}' not found in PATH: {}", self.program, e),
            )
        })
    }

    /// Run to completion and capture output, failing on a non-zero exit
    pub fn run<I, S>(&self, args: I) -> AnifetchResult<Output>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let program = self.resolve()?;
        let mut command = Command::new(&program);
        command.args(args);
        debug!("Running {:?}", command);

        let output = command
            .output()
            .map_err(|e| AnifetchError::tool(&self.name, format!("failed to start: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AnifetchError::tool(
                &self.name,
                format!("exited with {}: {}", output.status, stderr.trim()),
            ));
        }
        Ok(output)
    }

    /// Run and return stdout as text
    pub fn run_stdout<I, S>(&self, args: I) -> AnifetchResult<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let output = self.run(args)?;
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Start without waiting, with all standard streams detached
    pub fn spawn_detached<I, S>(&self, args: I) -> AnifetchResult<std::process::Child>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let program = self.resolve()?;
        Command::new(&program)
            .args(args)
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .spawn()
            .map_err(|e| AnifetchError::tool(&self.name, format!("failed to start: {}", e)))
    }
}
