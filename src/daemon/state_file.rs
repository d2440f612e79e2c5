//! The discovery record a daemon leaves in the temp directory so clients can
//! find it without a registry: `{ port, token, pid, version }`, keyed by a
//! hash of the canonical document path.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{HwpError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateFile {
    pub port: u16,
    pub token: String,
    pub pid: u32,
    pub version: String,
}

/// `<tmpdir>/hwpclid-<sha256(canonical_path)[0..16]>.json`.
pub fn path_for(document_path: &Path) -> Result<PathBuf> {
    let canonical = std::fs::canonicalize(document_path)?;
    let digest = Sha256::digest(canonical.to_string_lossy().as_bytes());
    let hex: String = digest.iter().take(8).map(|b| format!("{b:02x}")).collect();
    Ok(std::env::temp_dir().join(format!("hwpclid-{hex}.json")))
}

/// A fresh hex-encoded 128-bit token for the wire-protocol handshake.
/// Reads from `/dev/urandom` directly rather than pulling in an RNG crate
/// the teacher never depended on; falls back to process/time entropy if
/// the device is unavailable (non-Unix targets, sandboxes without `/dev`).
pub fn generate_token() -> String {
    #[cfg(unix)]
    {
        use std::io::Read;
        if let Ok(mut file) = std::fs::File::open("/dev/urandom") {
            let mut buf = [0u8; 16];
            if file.read_exact(&mut buf).is_ok() {
                return buf.iter().map(|b| format!("{b:02x}")).collect();
            }
        }
    }

    let mut hasher = Sha256::new();
    hasher.update(std::process::id().to_le_bytes());
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    hasher.update(nanos.to_le_bytes());
    hasher.finalize().iter().take(16).map(|b| format!("{b:02x}")).collect()
}

impl StateFile {
    pub fn new(port: u16, token: String) -> Self {
        Self { port, token, pid: std::process::id(), version: VERSION.to_string() }
    }

    pub fn read(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(HwpError::Io)?;
        serde_json::from_slice(&bytes)
            .map_err(|e| HwpError::Protocol(format!("malformed state file: {e}")))
    }

    /// Written atomically so a client never observes a half-written file:
    /// temp + rename within the same directory (same filesystem, so the
    /// rename is a single metadata update).
    pub fn write_atomic(&self, path: &Path) -> Result<()> {
        let bytes = serde_json::to_vec(self)
            .map_err(|e| HwpError::Protocol(format!("failed to encode state file: {e}")))?;
        let mut tmp_name = path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);
        std::fs::write(&tmp_path, &bytes)?;
        std::fs::rename(&tmp_path, path)?;
        Ok(())
    }

    #[cfg(unix)]
    pub fn pid_is_alive(&self) -> bool {
        // signal 0: no-op existence probe, never actually delivered.
        unsafe { libc::kill(self.pid as libc::pid_t, 0) == 0 }
    }

    #[cfg(not(unix))]
    pub fn pid_is_alive(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_json() {
        let state = StateFile::new(12345, "deadbeef".to_string());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        state.write_atomic(&path).unwrap();
        let read_back = StateFile::read(&path).unwrap();
        assert_eq!(read_back.port, 12345);
        assert_eq!(read_back.token, "deadbeef");
    }

    #[test]
    fn path_for_is_stable_for_the_same_canonical_path() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("doc.hwp");
        std::fs::write(&doc, b"x").unwrap();
        let a = path_for(&doc).unwrap();
        let b = path_for(&doc).unwrap();
        assert_eq!(a, b);
    }
}
