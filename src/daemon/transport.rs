//! Wire framing: a big-endian `u32` length prefix followed by that many
//! bytes of UTF-8 JSON. Shared by the daemon's listener and the client.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::error::{HwpError, Result};

pub const MAX_FRAME_BYTES: u32 = 64 * 1024 * 1024;

#[derive(Debug, Serialize, Deserialize)]
pub struct Request {
    pub token: String,
    pub command: String,
    #[serde(default)]
    pub args: Value,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Success {
        success: bool,
        data: Value,
    },
    Failure {
        success: bool,
        error: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        context: Option<Value>,
        #[serde(skip_serializing_if = "Option::is_none")]
        hint: Option<String>,
    },
}

impl Response {
    pub fn success(data: Value) -> Self {
        Self::Success { success: true, data }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self::Failure { success: false, error: error.into(), context: None, hint: None }
    }

    pub fn failure_with_hint(error: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::Failure { success: false, error: error.into(), context: None, hint: Some(hint.into()) }
    }

    /// Maps a mutator/holder [`HwpError`] to the wire error vocabulary (§7):
    /// the `error` string names the failure kind, `hint` is the human-facing
    /// detail carried by the error's own `Display`.
    pub fn from_error(err: &HwpError) -> Self {
        let kind = match err {
            HwpError::InvalidFormat(_) => "InvalidFormat",
            HwpError::UnsupportedVersion(_) => "InvalidFormat",
            HwpError::Io(_) => "IoError",
            HwpError::Cfb(_) => "InvalidFormat",
            HwpError::CompressionError(_) => "InvalidFormat",
            HwpError::ParseError(_) => "InvalidFormat",
            HwpError::EncodingError(_) => "InvalidFormat",
            HwpError::NotFound(_) => "RefNotFound",
            HwpError::InvalidInput(_) => "InvalidReference",
            HwpError::PasswordProtected => "PasswordProtected",
            HwpError::InvalidReference(_) => "InvalidReference",
            HwpError::RefNotFound(_) => "RefNotFound",
            HwpError::RangeOutOfBounds(_) => "RangeOutOfBounds",
            HwpError::StreamTruncated(_) => "StreamTruncated",
            HwpError::ValidationFailed { .. } => "ValidationFailed",
            HwpError::FileMissing(_) => "FileMissing",
            HwpError::Unauthorized => "Unauthorized",
            HwpError::Timeout => "Timeout",
            HwpError::Protocol(_) => "Protocol",
        };
        Self::failure_with_hint(kind, err.to_string())
    }
}

/// Reads one frame: a 4-byte big-endian length followed by that many UTF-8
/// JSON bytes. An oversize declared length is a protocol error; the caller
/// is expected to close the connection on it rather than keep reading.
pub async fn read_frame<R: tokio::io::AsyncRead + Unpin>(reader: &mut R) -> Result<Vec<u8>> {
    let len = reader.read_u32().await.map_err(HwpError::Io)?;
    if len > MAX_FRAME_BYTES {
        return Err(HwpError::Protocol(format!("frame of {len} bytes exceeds {MAX_FRAME_BYTES} byte limit")));
    }
    let mut buf = vec![0u8; len as usize];
    reader.read_exact(&mut buf).await.map_err(HwpError::Io)?;
    Ok(buf)
}

pub async fn write_frame<W: tokio::io::AsyncWrite + Unpin>(writer: &mut W, body: &[u8]) -> Result<()> {
    if body.len() as u64 > MAX_FRAME_BYTES as u64 {
        return Err(HwpError::Protocol(format!("response of {} bytes exceeds frame limit", body.len())));
    }
    writer.write_u32(body.len() as u32).await.map_err(HwpError::Io)?;
    writer.write_all(body).await.map_err(HwpError::Io)?;
    writer.flush().await.map_err(HwpError::Io)?;
    Ok(())
}

pub fn encode_request(request: &serde_json::Value) -> Result<Vec<u8>> {
    serde_json::to_vec(request).map_err(|e| HwpError::Protocol(e.to_string()))
}

pub fn decode_request(body: &[u8]) -> Result<Request> {
    serde_json::from_slice(body).map_err(|e| HwpError::Protocol(format!("malformed request: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn round_trips_a_frame_through_a_duplex_stream() {
        let (mut a, mut b) = tokio::io::duplex(4096);
        write_frame(&mut a, b"hello").await.unwrap();
        let got = read_frame(&mut b).await.unwrap();
        assert_eq!(got, b"hello");
    }

    #[tokio::test]
    async fn oversize_declared_length_is_a_protocol_error() {
        let (mut a, mut b) = tokio::io::duplex(16);
        a.write_u32(MAX_FRAME_BYTES + 1).await.unwrap();
        let err = read_frame(&mut b).await.unwrap_err();
        assert!(matches!(err, HwpError::Protocol(_)));
    }

    #[test]
    fn response_serializes_success_shape() {
        let response = Response::success(serde_json::json!({"ok": true}));
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["data"]["ok"], true);
    }
}
