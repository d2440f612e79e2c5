//! Client-side half of §4.9/§5: find a live daemon via its state file, spawn
//! one if none is found or the one on record is dead, then speak the framed
//! JSON protocol with the documented retry-once-on-refusal behavior.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::Value;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, info};

use crate::error::{HwpError, Result};

use super::state_file::{self, StateFile, VERSION};
use super::transport::{self, Request, Response};

const LAUNCH_POLL_INTERVAL: Duration = Duration::from_millis(100);
const LAUNCH_POLL_ATTEMPTS: u32 = 100;
const RESPONSE_TIMEOUT: Duration = Duration::from_secs(30);

pub struct DaemonHandle {
    pub port: u16,
    pub token: String,
}

/// Finds the daemon for `path`'s canonical form, spawning a detached one if
/// the state file is missing, its pid is dead, or its version is stale.
pub async fn ensure_daemon(path: &Path) -> Result<DaemonHandle> {
    let state_path = state_file::path_for(path)?;

    if let Some(state) = read_live_state(&state_path) {
        return Ok(DaemonHandle { port: state.port, token: state.token });
    }

    spawn_daemon(path)?;
    wait_for_state(&state_path).await
}

fn read_live_state(state_path: &Path) -> Option<StateFile> {
    let state = StateFile::read(state_path).ok()?;
    if state.version != VERSION || !state.pid_is_alive() {
        return None;
    }
    Some(state)
}

fn spawn_daemon(path: &Path) -> Result<()> {
    let daemon_binary = sibling_daemon_binary()?;
    info!(binary = %daemon_binary.display(), path = %path.display(), "launching daemon");

    std::process::Command::new(daemon_binary)
        .arg(path)
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
        .map_err(HwpError::Io)?;
    Ok(())
}

/// `hwpcore-daemon` next to whatever binary the client is running as: there
/// is no installed registry of binaries to consult, and both ship from the
/// same workspace build output directory.
fn sibling_daemon_binary() -> Result<PathBuf> {
    let current = std::env::current_exe().map_err(HwpError::Io)?;
    let dir = current
        .parent()
        .ok_or_else(|| HwpError::Protocol("current executable has no parent directory".to_string()))?;
    let name = if cfg!(windows) { "hwpcore-daemon.exe" } else { "hwpcore-daemon" };
    Ok(dir.join(name))
}

async fn wait_for_state(state_path: &Path) -> Result<DaemonHandle> {
    for _ in 0..LAUNCH_POLL_ATTEMPTS {
        if let Some(state) = read_live_state(state_path) {
            return Ok(DaemonHandle { port: state.port, token: state.token });
        }
        tokio::time::sleep(LAUNCH_POLL_INTERVAL).await;
    }
    Err(HwpError::Timeout)
}

/// Opens one connection, sends one request, reads one response, closes.
/// A single `ECONNREFUSED` deletes the stale state file, relaunches, and
/// retries exactly once; any other failure or a second refusal propagates.
pub async fn send_request(path: &Path, command: &str, args: Value) -> Result<Value> {
    match try_request(path, command, &args).await {
        Ok(value) => Ok(value),
        Err(HwpError::Io(e)) if e.kind() == std::io::ErrorKind::ConnectionRefused => {
            debug!("connection refused, discarding stale state file and retrying once");
            if let Ok(state_path) = state_file::path_for(path) {
                let _ = std::fs::remove_file(&state_path);
            }
            try_request(path, command, &args).await
        }
        Err(e) => Err(e),
    }
}

async fn try_request(path: &Path, command: &str, args: &Value) -> Result<Value> {
    let handle = ensure_daemon(path).await?;
    let mut stream = TcpStream::connect(("127.0.0.1", handle.port)).await.map_err(HwpError::Io)?;

    let request = Request { token: handle.token, command: command.to_string(), args: args.clone() };
    let body = serde_json::to_vec(&request).map_err(|e| HwpError::Protocol(e.to_string()))?;
    transport::write_frame(&mut stream, &body).await?;

    let body = timeout(RESPONSE_TIMEOUT, transport::read_frame(&mut stream))
        .await
        .map_err(|_| HwpError::Timeout)??;
    let response: Response =
        serde_json::from_slice(&body).map_err(|e| HwpError::Protocol(format!("malformed response: {e}")))?;

    match response {
        Response::Success { data, .. } => Ok(data),
        Response::Failure { error, hint, .. } => {
            let message = match hint {
                Some(hint) => format!("{error}: {hint}"),
                None => error,
            };
            Err(HwpError::Protocol(message))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dead_pid_is_not_treated_as_a_live_daemon() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        // pid 1 belongs to init on any Unix box this test runs on, so pick a
        // pid far past any realistic pid_max to simulate a daemon that exited.
        let state = StateFile { port: 9, token: "t".to_string(), pid: 999_999, version: VERSION.to_string() };
        state.write_atomic(&path).unwrap();
        assert!(read_live_state(&path).is_none());
    }

    #[test]
    fn version_mismatch_is_not_treated_as_a_live_daemon() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let state = StateFile::new(9, "t".to_string());
        let mut stale = state;
        stale.version = "0.0.0-stale".to_string();
        stale.write_atomic(&path).unwrap();
        assert!(read_live_state(&path).is_none());
    }
}
