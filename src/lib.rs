pub mod archive;
pub mod config;
pub mod daemon;
pub mod error;
pub mod holder;
pub mod model;
pub mod mutator;
pub mod ops;
pub mod parser;
pub mod reader;
pub mod utils;
pub mod validator;
pub mod writer;

use std::io::{Read, Seek};
use std::path::Path;

pub use crate::error::{HwpError, Result};
use crate::model::document::FormatTag;
pub use crate::model::{assign_references, HwpDocument};
use crate::parser::{body_text::BodyTextParser, doc_info::DocInfoParser, header::FileHeader};
use crate::reader::CfbReader;

/// Reads a binary-format (`.hwp`) document into the shared, format-agnostic
/// projection. Archive-format documents go through [`archive::read`]
/// instead; [`holder`] picks between the two by sniffing the file.
pub struct HwpReader;

impl HwpReader {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<HwpDocument> {
        let reader = CfbReader::from_file(path)?;
        Self::parse_document(reader)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<HwpDocument> {
        let cursor = std::io::Cursor::new(bytes.to_vec());
        let reader = CfbReader::new(cursor)?;
        Self::parse_document(reader)
    }

    fn parse_document<F: Read + Seek>(mut reader: CfbReader<F>) -> Result<HwpDocument> {
        let header_data = reader.read_stream("FileHeader")?;
        let header = FileHeader::parse(header_data)?;

        if header.is_encrypted() {
            return Err(HwpError::PasswordProtected);
        }

        let doc_info_data = reader.read_stream("DocInfo")?;
        let doc_info = DocInfoParser::parse(doc_info_data, header.is_compressed())?;
        let bin_data = doc_info.bin_data.clone();
        let header_tables = doc_info.into_header();

        let mut sections = Vec::new();
        let mut section_idx = 0;
        loop {
            let section_name = format!("BodyText/Section{section_idx}");
            if !reader.stream_exists(&section_name) {
                break;
            }
            let section_data = reader.read_stream(&section_name)?;
            let section = BodyTextParser::parse(section_data, header.is_compressed(), &bin_data)?;
            section_idx += 1;
            sections.push(section);
        }

        if sections.is_empty() {
            return Err(HwpError::InvalidFormat(
                "No BodyText sections found".to_string(),
            ));
        }

        assign_references(&mut sections);

        Ok(HwpDocument {
            format: FormatTag::Binary,
            header: header_tables,
            sections,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn test_file_path(name: &str) -> PathBuf {
        PathBuf::from("test-files").join(name)
    }

    #[test]
    fn test_reader_creation() {
        let path = test_file_path("test_document.hwp");
        if path.exists() {
            let result = HwpReader::from_file(&path);
            assert!(result.is_ok() || result.is_err());
        }
    }

    #[test]
    fn test_file_header_signature() {
        let signature = b"HWP Document File";
        assert_eq!(signature.len(), 17);
    }
}
