//! State management shared by both on-disk encodings. Expressed as a tagged
//! enum over a common trait rather than a trait object: the two variants
//! hold genuinely different mutators and caches, and a `match` at the call
//! site costs nothing next to a vtable while staying exhaustive at compile
//! time.

mod archive;
mod binary;
mod scheduler;

pub use self::archive::ArchiveHolder;
pub use self::binary::BinaryHolder;
pub use self::scheduler::FlushScheduler;

use std::path::{Path, PathBuf};

use crate::error::{HwpError, Result};
use crate::model::{DocumentHeader, Section};
use crate::ops::EditOperation;
use crate::validator::ValidationReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileStats {
    inode: u64,
    mtime_ms: i64,
    size: u64,
}

#[cfg(unix)]
fn file_stats(metadata: &std::fs::Metadata) -> FileStats {
    use std::os::unix::fs::MetadataExt;
    FileStats {
        inode: metadata.ino(),
        mtime_ms: metadata.mtime() * 1000 + metadata.mtime_nsec() / 1_000_000,
        size: metadata.len(),
    }
}

#[cfg(not(unix))]
fn file_stats(metadata: &std::fs::Metadata) -> FileStats {
    let mtime_ms = metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(std::time::SystemTime::UNIX_EPOCH).ok())
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0);
    FileStats { inode: 0, mtime_ms, size: metadata.len() }
}

fn stat(path: &Path) -> Result<FileStats> {
    let metadata = std::fs::metadata(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            HwpError::FileMissing(path.display().to_string())
        } else {
            HwpError::Io(e)
        }
    })?;
    Ok(file_stats(&metadata))
}

/// Writes to `<path>.tmp` then renames over `path`, relying on POSIX rename
/// atomicity. Any I/O failure removes the temp file before propagating.
fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    if let Err(e) = std::fs::write(&tmp_path, bytes) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(HwpError::Io(e));
    }
    if let Err(e) = std::fs::rename(&tmp_path, path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(HwpError::Io(e));
    }
    Ok(())
}

/// Operations common to both encodings (§4.8). `schedule_flush` is not part
/// of the trait: it only ever re-arms a [`FlushScheduler`] based on
/// `is_dirty()`, so it is implemented once on [`Holder`] instead.
pub trait DocumentHolder {
    fn load(&mut self) -> Result<()>;
    fn get_sections(&mut self) -> Result<&[Section]>;
    fn get_header(&mut self) -> Result<&DocumentHeader>;
    fn apply_operations(&mut self, ops: &[EditOperation]) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn is_dirty(&self) -> bool;
    fn validate(&self) -> Result<ValidationReport>;
}

/// Tagged union over the two holder variants, chosen once at `open()` by
/// sniffing the same `PK\x03\x04` signature the validator and mutator
/// loaders use.
pub enum Holder {
    Binary(BinaryHolder),
    Archive(ArchiveHolder),
}

impl Holder {
    /// Opens `path`, loads it, and picks the variant by sniffing the file's
    /// signature. Does not look at the extension: a misnamed file still
    /// round-trips correctly.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                HwpError::FileMissing(path.display().to_string())
            } else {
                HwpError::Io(e)
            }
        })?;

        let mut holder = if bytes.starts_with(b"PK\x03\x04") {
            Self::Archive(ArchiveHolder::new(path))
        } else {
            Self::Binary(BinaryHolder::new(path))
        };
        holder.load()?;
        Ok(holder)
    }

    pub fn schedule_flush(&self, scheduler: &FlushScheduler) {
        if self.is_dirty() {
            scheduler.schedule();
        }
    }
}

impl DocumentHolder for Holder {
    fn load(&mut self) -> Result<()> {
        match self {
            Self::Binary(h) => h.load(),
            Self::Archive(h) => h.load(),
        }
    }

    fn get_sections(&mut self) -> Result<&[Section]> {
        match self {
            Self::Binary(h) => h.get_sections(),
            Self::Archive(h) => h.get_sections(),
        }
    }

    fn get_header(&mut self) -> Result<&DocumentHeader> {
        match self {
            Self::Binary(h) => h.get_header(),
            Self::Archive(h) => h.get_header(),
        }
    }

    fn apply_operations(&mut self, ops: &[EditOperation]) -> Result<()> {
        match self {
            Self::Binary(h) => h.apply_operations(ops),
            Self::Archive(h) => h.apply_operations(ops),
        }
    }

    fn flush(&mut self) -> Result<()> {
        match self {
            Self::Binary(h) => h.flush(),
            Self::Archive(h) => h.flush(),
        }
    }

    fn is_dirty(&self) -> bool {
        match self {
            Self::Binary(h) => h.is_dirty(),
            Self::Archive(h) => h.is_dirty(),
        }
    }

    fn validate(&self) -> Result<ValidationReport> {
        match self {
            Self::Binary(h) => h.validate(),
            Self::Archive(h) => h.validate(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::EditOperation;
    use std::io::Write;

    // Mirrors `validator::tests::build_fixture`: a document the validator's
    // own pipeline accepts, since `flush()` runs that same pipeline.
    fn write_binary_fixture(path: &Path, text: &str) {
        use crate::parser::header::FileHeader;
        use crate::parser::record::{self, HwpTag};
        use crate::writer::build_container;

        let mut header = FileHeader::new_default();
        header.set_compressed(false);

        let mut mapping_counts = vec![0u32; 10];
        mapping_counts[9] = 1;
        let mut id_mappings_payload = Vec::new();
        for c in &mapping_counts {
            id_mappings_payload.extend_from_slice(&c.to_le_bytes());
        }
        let mut doc_info = Vec::new();
        doc_info.extend(record::build(HwpTag::IdMappings as u16, 0, &id_mappings_payload));
        doc_info.extend(record::build(HwpTag::FaceName as u16, 0, &vec![0u8; 7]));
        doc_info.extend(record::build(HwpTag::CharShape as u16, 0, &vec![0u8; 72]));
        doc_info.extend(record::build(HwpTag::ParaShape as u16, 0, &vec![0u8; 54]));
        doc_info.extend(record::build(HwpTag::Style as u16, 0, &vec![0u8; 12]));

        let mut para_header = vec![0u8; 12];
        let units: Vec<u8> = text.encode_utf16().flat_map(|u| u.to_le_bytes()).collect();
        para_header[0..4].copy_from_slice(&((units.len() / 2) as u32 | 0x8000_0000).to_le_bytes());
        let mut section = Vec::new();
        section.extend(record::build(HwpTag::ParaHeader as u16, 0, &para_header));
        section.extend(record::build(HwpTag::ParaText as u16, 1, &units));
        section.extend(record::build(HwpTag::ParaCharShape as u16, 1, &[0u8; 8]));
        section.extend(record::build(HwpTag::ParaLineSeg as u16, 1, &[0u8; 4]));

        let bytes = build_container(&[
            ("FileHeader".to_string(), header.to_bytes()),
            ("DocInfo".to_string(), doc_info),
            ("BodyText/Section0".to_string(), section),
        ])
        .unwrap();
        let mut file = std::fs::File::create(path).unwrap();
        file.write_all(&bytes).unwrap();
    }

    #[test]
    fn opens_and_edits_a_binary_fixture_then_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.hwp");
        write_binary_fixture(&path, "Hello");

        let mut holder = Holder::open(&path).unwrap();
        assert!(!holder.is_dirty());

        let op = EditOperation::edit_text("s0.p0", "Changed").unwrap();
        holder.apply_operations(&[op]).unwrap();
        assert!(holder.is_dirty());

        holder.flush().unwrap();
        assert!(!holder.is_dirty());

        let mut reopened = Holder::open(&path).unwrap();
        let sections = reopened.get_sections().unwrap();
        assert_eq!(sections[0].paragraphs[0].text(), "Changed");
    }

    #[test]
    fn missing_file_surfaces_file_missing() {
        let err = Holder::open("/nonexistent/path/doc.hwp").unwrap_err();
        assert!(matches!(err, HwpError::FileMissing(_)));
    }
}
