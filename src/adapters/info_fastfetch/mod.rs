//! Fastfetch system information adapter

use tracing::debug;

use crate::adapters::process::ExternalTool;
use crate::error::AnifetchResult;
use crate::ports::SystemInfoPort;

/// System information collected by `fastfetch` without its logo
pub struct FastfetchInfo {
    fastfetch: ExternalTool,
}

impl FastfetchInfo {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            fastfetch: ExternalTool::new("fastfetch", program),
        }
    }
}

impl SystemInfoPort for FastfetchInfo {
    fn info_lines(&self) -> AnifetchResult<Vec<String>> {
        let stdout = self
            .fastfetch
            .run_stdout(["--logo", "none", "--pipe", "false"])?;
        let lines: Vec<String> = stdout.lines().map(str::to_string).collect();
        debug!("fastfetch produced {} lines", lines.len());
        Ok(lines)
    }
}
