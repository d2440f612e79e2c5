use flate2::read::ZlibDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;
use std::io::{Read, Write};
use crate::error::Result;

/// Raw-deflate compress (no zlib header/trailer), matching what the reader's
/// `decompress_stream` expects for a `FileHeader` with the compression flag set.
pub fn compress_stream(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| crate::error::HwpError::CompressionError(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| crate::error::HwpError::CompressionError(e.to_string()))
}

pub fn decompress_stream(data: &[u8]) -> Result<Vec<u8>> {
    if data.is_empty() {
        return Ok(Vec::new());
    }
    
    // HWP files use raw deflate without zlib header
    // Try raw deflate first
    use flate2::read::DeflateDecoder;
    let mut decoder = DeflateDecoder::new(data);
    let mut decompressed = Vec::new();
    
    match decoder.read_to_end(&mut decompressed) {
        Ok(_) => Ok(decompressed),
        Err(_) => {
            // If raw deflate fails, try zlib
            let mut decoder = ZlibDecoder::new(data);
            let mut decompressed = Vec::new();
            
            match decoder.read_to_end(&mut decompressed) {
                Ok(_) => Ok(decompressed),
                Err(_) => {
                    // If both fail, return data as-is (might not be compressed)
                    Ok(data.to_vec())
                }
            }
        }
    }
}