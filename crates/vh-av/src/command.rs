//! Builder for executing external tool commands.

use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

/// Output captured from a tool execution.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Process exit status.
    pub status: ExitStatus,
    /// Captured standard output (lossy UTF-8).
    pub stdout: String,
    /// Captured standard error (lossy UTF-8).
    pub stderr: String,
}

/// A builder for constructing and executing external tool invocations.
///
/// Execution is synchronous: [`ToolCommand::execute`] spawns the process,
/// waits for it to exit, and captures stdout and stderr.
///
/// # Example
///
/// ```no_run
/// use vh_av::ToolCommand;
/// use std::path::PathBuf;
///
/// # fn example() -> vh_core::Result<()> {
/// let output = ToolCommand::new(PathBuf::from("ffmpeg"))
///     .arg("-version")
///     .execute()?;
/// println!("{}", output.stdout);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<String>,
}

impl ToolCommand {
    /// Create a new command for the given program path.
    pub fn new(program: PathBuf) -> Self {
        Self {
            program,
            args: Vec::new(),
        }
    }

    /// Append a single argument.
    pub fn arg(&mut self, s: impl Into<String>) -> &mut Self {
        self.args.push(s.into());
        self
    }

    /// Append multiple arguments.
    pub fn args(&mut self, iter: impl IntoIterator<Item = impl Into<String>>) -> &mut Self {
        self.args.extend(iter.into_iter().map(Into::into));
        self
    }

    /// The program that will be executed.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// The argument vector, in order.
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    fn program_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.to_string_lossy().to_string())
    }

    /// Execute the command, capturing stdout and stderr.
    ///
    /// # Errors
    ///
    /// - Returns [`vh_core::Error::Tool`] if spawning the process fails.
    /// - Returns [`vh_core::Error::Tool`] if the process exits with a non-zero
    ///   status (message includes stderr).
    pub fn execute(&self) -> vh_core::Result<ToolOutput> {
        let program_name = self.program_name();

        let output = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| vh_core::Error::tool(&program_name, format!("failed to spawn: {e}")))?;

        let tool_output = ToolOutput {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };

        if !output.status.success() {
            return Err(vh_core::Error::tool(
                program_name,
                format!(
                    "exited with status {}: {}",
                    output.status,
                    tool_output.stderr.trim()
                ),
            ));
        }

        Ok(tool_output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn execute_echo() {
        let Ok(echo) = which::which("echo") else {
            return;
        };
        let out = ToolCommand::new(echo).arg("hello").execute().unwrap();
        assert!(out.status.success());
        assert!(out.stdout.trim().contains("hello"));
    }

    #[test]
    fn execute_nonexistent_tool() {
        let result = ToolCommand::new(PathBuf::from("nonexistent_tool_xyz_12345")).execute();
        let err = result.unwrap_err().to_string();
        assert!(err.contains("failed to spawn"), "unexpected error: {err}");
    }

    #[test]
    fn nonzero_exit_is_error() {
        let Ok(false_bin) = which::which("false") else {
            return;
        };
        let err = ToolCommand::new(false_bin).execute().unwrap_err();
        assert!(matches!(err, vh_core::Error::Tool { .. }));
        assert!(err.to_string().contains("exited with status"));
    }

    #[test]
    fn builder_collects_args_in_order() {
        let mut cmd = ToolCommand::new(PathBuf::from("/usr/bin/ffmpeg"));
        cmd.arg("-i").arg("in.mp4").args(["-c:v", "libx264"]);
        assert_eq!(cmd.program(), Path::new("/usr/bin/ffmpeg"));
        assert_eq!(cmd.get_args(), ["-i", "in.mp4", "-c:v", "libx264"]);
        assert_eq!(cmd.program_name(), "ffmpeg");
    }
}
