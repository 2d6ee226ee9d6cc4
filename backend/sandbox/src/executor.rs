/// Bounded command execution: `sh -c` with a wall-clock ceiling and
/// truncated output.
use std::process::Stdio;
use std::time::Duration;

use clawgate_core::{ExecResult, GateError, DEFAULT_EXEC_TIMEOUT, DEFAULT_MAX_OUTPUT_CHARS};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Suffix appended to a stream that exceeded `max_output_chars`.
pub const TRUNCATION_MARKER: &str = "... (truncated)";

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecSettings {
    pub timeout: Duration,
    /// Characters kept from each of stdout and stderr after trimming.
    pub max_output_chars: usize,
}

impl Default for ExecSettings {
    fn default() -> Self {
        Self { timeout: DEFAULT_EXEC_TIMEOUT, max_output_chars: DEFAULT_MAX_OUTPUT_CHARS }
    }
}

impl ExecSettings {
    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self { timeout, ..self }
    }

    /// Bytes retained per stream while reading, not counting leading
    /// whitespace. Anything past this is drained and dropped so a chatty child
    /// never blocks on a full pipe.
    fn capture_limit(&self) -> usize {
        self.max_output_chars.saturating_add(1).saturating_mul(4).saturating_add(4096)
    }
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

/// Run `command` through `sh -c`. Never fails: timeouts, spawn errors and
/// non-zero exits all come back as an `ExecResult`.
pub async fn execute(command: &str, settings: &ExecSettings) -> ExecResult {
    if command.trim().is_empty() {
        return ExecResult::failure("Empty command");
    }
    info!(
        command = %command,
        timeout_ms = settings.timeout.as_millis() as u64,
        "Executing command"
    );

    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    run(cmd, settings).await
}

async fn run(mut cmd: Command, settings: &ExecSettings) -> ExecResult {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    #[cfg(unix)]
    cmd.process_group(0);

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            let err = GateError::Spawn(e.to_string());
            warn!(error = %err, "Command could not be started");
            return ExecResult::failure(err.to_string());
        }
    };

    let pid = child.id();
    let limit = settings.capture_limit();
    let stdout_task = tokio::spawn(read_capped(child.stdout.take(), limit));
    let stderr_task = tokio::spawn(read_capped(child.stderr.take(), limit));

    let deadline = Instant::now() + settings.timeout;
    let status = match tokio::time::timeout_at(deadline, child.wait()).await {
        Ok(Ok(status)) => status,
        Ok(Err(e)) => {
            stdout_task.abort();
            stderr_task.abort();
            warn!(error = %e, "Failed waiting for command");
            return ExecResult::failure(format!("Failed waiting for command: {e}"));
        }
        Err(_) => {
            // Kill the whole group, then reap the shell itself.
            kill_process_group(pid);
            if let Err(e) = child.kill().await {
                warn!(error = %e, "Failed to kill timed-out command");
            }
            stdout_task.abort();
            stderr_task.abort();
            return timed_out(settings.timeout);
        }
    };

    // Background grandchildren can keep the pipes open after the shell exits.
    let streams = tokio::time::timeout_at(deadline, async {
        let stdout = stdout_task.await.unwrap_or_default();
        let stderr = stderr_task.await.unwrap_or_default();
        (stdout, stderr)
    })
    .await;
    let Ok((stdout_captured, stderr_captured)) = streams else {
        kill_process_group(pid);
        return timed_out(settings.timeout);
    };

    let exit_code = status.code().unwrap_or(-1);
    let (stdout, out_cut) = stdout_captured.shape(settings.max_output_chars);
    let (stderr, err_cut) = stderr_captured.shape(settings.max_output_chars);
    debug!(exit_code, truncated = out_cut || err_cut, "Command finished");

    ExecResult {
        exit_code,
        stdout,
        stderr,
        timed_out: false,
        truncated: out_cut || err_cut,
    }
}

#[cfg(unix)]
fn kill_process_group(pid: Option<u32>) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    let Some(pid) = pid else { return };
    match killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
        Ok(()) => debug!(pid, "Killed process group"),
        Err(nix::errno::Errno::ESRCH) => {}
        Err(e) => warn!(pid, error = %e, "Failed to kill process group"),
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: Option<u32>) {}

fn timed_out(timeout: Duration) -> ExecResult {
    let message = format!("Command timed out after {}", format_duration(timeout));
    warn!(timeout_ms = timeout.as_millis() as u64, "{message}");
    ExecResult { timed_out: true, ..ExecResult::failure(message) }
}

/// One stream's output as read from the pipe.
#[derive(Debug, Default)]
struct Captured {
    bytes: Vec<u8>,
    /// Non-whitespace output was dropped past the capture limit.
    overflowed: bool,
}

impl Captured {
    fn shape(&self, max_chars: usize) -> (String, bool) {
        let (text, cut) = truncate_output(&String::from_utf8_lossy(&self.bytes), max_chars);
        if self.overflowed && !cut {
            return (format!("{text}\n{TRUNCATION_MARKER}"), true);
        }
        (text, cut)
    }
}

async fn read_capped<R: AsyncRead + Unpin>(stream: Option<R>, limit: usize) -> Captured {
    let mut captured = Captured::default();
    let Some(mut stream) = stream else { return captured };
    let mut chunk = [0u8; 8192];
    loop {
        let n = match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => n,
        };
        let mut data = &chunk[..n];
        // Leading whitespace does not count toward the cap.
        if captured.bytes.is_empty() {
            let start = data.iter().position(|b| !b.is_ascii_whitespace()).unwrap_or(n);
            data = &data[start..];
        }
        let room = limit.saturating_sub(captured.bytes.len());
        let (kept, dropped) = data.split_at(data.len().min(room));
        captured.bytes.extend_from_slice(kept);
        if dropped.iter().any(|b| !b.is_ascii_whitespace()) {
            captured.overflowed = true;
        }
    }
    captured
}

// ---------------------------------------------------------------------------
// Output shaping
// ---------------------------------------------------------------------------

/// Trim surrounding whitespace and cut to `max_chars` characters, appending
/// the truncation marker when anything was dropped.
pub fn truncate_output(raw: &str, max_chars: usize) -> (String, bool) {
    let trimmed = raw.trim();
    match trimmed.char_indices().nth(max_chars) {
        Some((cut, _)) => (format!("{}\n{}", &trimmed[..cut], TRUNCATION_MARKER), true),
        None => (trimmed.to_string(), false),
    }
}

fn format_duration(d: Duration) -> String {
    if d.as_secs() > 0 && d.subsec_nanos() == 0 {
        format!("{}s", d.as_secs())
    } else {
        format!("{}ms", d.as_millis())
    }
}
