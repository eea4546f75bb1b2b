// src/exec/tool.rs

//! External tool runner.
//!
//! Tools are shell command templates from `[tools]`. `{input}`, `{output}`
//! and `{port}` are substituted before the command is handed to the
//! platform shell.

use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info};

use crate::errors::PipelineError;

/// Number of stderr lines kept in a tool failure.
const STDERR_TAIL: usize = 20;

/// Quote `value` for the platform shell.
pub fn shell_quote(value: &str) -> String {
    if cfg!(windows) {
        format!("\"{}\"", value.replace('"', "\\\""))
    } else {
        format!("'{}'", value.replace('\'', r"'\''"))
    }
}

/// Substitute placeholders in a command template.
///
/// Paths are shell-quoted; the port is inserted as-is.
pub fn render_template(
    template: &str,
    input: Option<&Path>,
    output: Option<&Path>,
    port: Option<u16>,
) -> String {
    let mut cmd = template.to_string();
    if let Some(input) = input {
        cmd = cmd.replace("{input}", &shell_quote(&input.to_string_lossy()));
    }
    if let Some(output) = output {
        cmd = cmd.replace("{output}", &shell_quote(&output.to_string_lossy()));
    }
    if let Some(port) = port {
        cmd = cmd.replace("{port}", &port.to_string());
    }
    cmd
}

/// Build a shell command appropriate for the platform.
pub fn shell_command(cmdline: &str) -> Command {
    let mut cmd = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmdline);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmdline);
        c
    };
    cmd.kill_on_drop(true);
    cmd
}

/// Run a tool to completion.
///
/// A non-zero exit becomes [`PipelineError::Tool`] carrying the exit code and
/// the tail of stderr. Stdout is logged at debug.
pub async fn run_tool(
    name: &str,
    template: &str,
    input: &Path,
    output: Option<&Path>,
) -> Result<(), PipelineError> {
    let cmdline = render_template(template, Some(input), output, None);
    info!(tool = name, cmd = %cmdline, "running tool");

    let out = shell_command(&cmdline)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    for line in String::from_utf8_lossy(&out.stdout).lines() {
        debug!(tool = name, "stdout: {}", line);
    }

    if out.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&out.stderr);
    let lines: Vec<&str> = stderr.lines().collect();
    let tail = lines[lines.len().saturating_sub(STDERR_TAIL)..].join("\n");

    Err(PipelineError::Tool {
        command: cmdline,
        code: out.status.code().unwrap_or(-1),
        stderr: tail,
    })
}
