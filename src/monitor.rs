//! Monitor process supervision
//!
//! Launches the external analysis process and owns its lifetime. The child's
//! streams are turned into a single ordered event channel so the bridge can
//! consume output chunks, stderr lines, and the final exit status from one
//! place. Nothing is ever written to the child's stdin.

use crate::{Error, Result};
use std::process::{ExitStatus, Stdio};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;

/// Events observed while supervising the monitor process.
#[derive(Debug)]
pub enum MonitorEvent {
    /// Raw stdout bytes, exactly as the child wrote them. Chunk boundaries
    /// carry no meaning.
    Stdout(Vec<u8>),
    /// One complete line of stderr output.
    StderrLine(String),
    /// The child exited. Always the last event on the channel.
    Exited(ExitStatus),
}

/// Handle to a running monitor process.
///
/// Dropping the handle detaches from the event stream; the reader tasks
/// notice the closed channel and stop.
pub struct MonitorProcess {
    events: mpsc::Receiver<MonitorEvent>,
}

impl MonitorProcess {
    /// Spawn the monitor command with piped stdout and stderr.
    ///
    /// A spawn failure (missing interpreter, bad path) is fatal and reported
    /// as [`Error::Monitor`], distinct from any exit of a running child.
    pub fn spawn(command: &str, args: &[String]) -> Result<Self> {
        let mut child = Command::new(command)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::Monitor(format!("failed to spawn `{command}`: {e}")))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::Monitor("child stdout was not captured".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| Error::Monitor("child stderr was not captured".to_string()))?;

        let (tx, rx) = mpsc::channel(64);

        let stderr_tx = tx.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if stderr_tx.send(MonitorEvent::StderrLine(line)).await.is_err() {
                    break;
                }
            }
        });

        // Drain stdout to EOF, then reap the child. The exit event is sent
        // only after the last stdout chunk so no output is lost.
        tokio::spawn(async move {
            let mut stdout = stdout;
            let mut buf = [0u8; 4096];
            loop {
                match stdout.read(&mut buf).await {
                    Ok(0) => break,
                    Ok(n) => {
                        if tx.send(MonitorEvent::Stdout(buf[..n].to_vec())).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Monitor stdout read failed");
                        break;
                    }
                }
            }

            match child.wait().await {
                Ok(status) => {
                    let _ = tx.send(MonitorEvent::Exited(status)).await;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to reap monitor process");
                }
            }
        });

        Ok(Self { events: rx })
    }

    /// Next supervision event, or `None` once the stream is exhausted.
    pub async fn next_event(&mut self) -> Option<MonitorEvent> {
        self.events.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn collect(mut monitor: MonitorProcess) -> (Vec<u8>, Vec<String>, Option<ExitStatus>) {
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let mut exit = None;
        while let Some(event) = monitor.next_event().await {
            match event {
                MonitorEvent::Stdout(bytes) => stdout.extend(bytes),
                MonitorEvent::StderrLine(line) => stderr.push(line),
                MonitorEvent::Exited(status) => exit = Some(status),
            }
        }
        (stdout, stderr, exit)
    }

    #[tokio::test]
    async fn relays_stdout_and_exit_status() {
        let monitor =
            MonitorProcess::spawn("sh", &["-c".to_string(), "printf 'hello\\nworld\\n'".to_string()])
                .unwrap();

        let (stdout, _, exit) = collect(monitor).await;
        assert_eq!(stdout, b"hello\nworld\n");
        assert!(exit.unwrap().success());
    }

    #[tokio::test]
    async fn stderr_arrives_as_lines() {
        let monitor = MonitorProcess::spawn(
            "sh",
            &["-c".to_string(), "echo oops >&2; echo fine".to_string()],
        )
        .unwrap();

        let (stdout, stderr, exit) = collect(monitor).await;
        assert_eq!(stdout, b"fine\n");
        assert_eq!(stderr, vec!["oops".to_string()]);
        assert!(exit.unwrap().success());
    }

    #[tokio::test]
    async fn nonzero_exit_is_reported() {
        let monitor =
            MonitorProcess::spawn("sh", &["-c".to_string(), "exit 3".to_string()]).unwrap();

        let (_, _, exit) = collect(monitor).await;
        assert_eq!(exit.unwrap().code(), Some(3));
    }

    #[tokio::test]
    async fn spawn_failure_is_a_monitor_error() {
        let result = MonitorProcess::spawn("/nonexistent/interpreter", &[]);
        assert!(matches!(result, Err(Error::Monitor(_))));
    }
}
