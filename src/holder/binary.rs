use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::warn;

use crate::error::{HwpError, Result};
use crate::model::{DocumentHeader, Section};
use crate::mutator::BinaryMutator;
use crate::ops::EditOperation;
use crate::validator::{self, ValidationReport};
use crate::HwpReader;

use super::{stat, write_atomically, DocumentHolder, FileStats};

pub struct BinaryHolder {
    file_path: PathBuf,
    mutator: Option<BinaryMutator>,
    header_cache: Option<DocumentHeader>,
    section_cache: Option<Vec<Section>>,
    dirty: bool,
    stats: Option<FileStats>,
    content_digest: [u8; 32],
}

impl BinaryHolder {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            file_path: path.as_ref().to_path_buf(),
            mutator: None,
            header_cache: None,
            section_cache: None,
            dirty: false,
            stats: None,
            content_digest: [0u8; 32],
        }
    }

    /// Re-derives `header_cache`/`section_cache` from the mutator's current
    /// serialization. The mutator already holds the authoritative bytes
    /// after an edit, so materializing just means running them back through
    /// the same reader a fresh load would use.
    fn materialize(&mut self) -> Result<()> {
        if self.section_cache.is_some() {
            return Ok(());
        }
        let mutator = self.mutator.as_ref().expect("load() called before use");
        let bytes = mutator.to_bytes()?;
        let document = HwpReader::from_bytes(&bytes)?;
        self.header_cache = Some(document.header);
        self.section_cache = Some(document.sections);
        Ok(())
    }
}

impl DocumentHolder for BinaryHolder {
    fn load(&mut self) -> Result<()> {
        let bytes = std::fs::read(&self.file_path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                HwpError::FileMissing(self.file_path.display().to_string())
            } else {
                HwpError::Io(e)
            }
        })?;
        self.content_digest = Sha256::digest(&bytes).into();
        self.stats = Some(stat(&self.file_path)?);
        self.mutator = Some(BinaryMutator::load(&bytes)?);
        self.header_cache = None;
        self.section_cache = None;
        self.dirty = false;
        Ok(())
    }

    fn get_sections(&mut self) -> Result<&[Section]> {
        self.check_file_changed()?;
        self.materialize()?;
        Ok(self.section_cache.as_deref().unwrap())
    }

    fn get_header(&mut self) -> Result<&DocumentHeader> {
        self.check_file_changed()?;
        self.materialize()?;
        Ok(self.header_cache.as_ref().unwrap())
    }

    fn apply_operations(&mut self, ops: &[EditOperation]) -> Result<()> {
        let mutator = self.mutator.as_mut().expect("load() called before use");
        for op in ops {
            crate::ops::apply_binary(mutator, op)?;
        }
        self.header_cache = None;
        self.section_cache = None;
        self.dirty = true;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        let mutator = self.mutator.as_ref().expect("load() called before use");
        let bytes = mutator.to_bytes()?;

        match validator::validate_catching_panics(&bytes) {
            Ok(Ok(report)) if !report.valid => {
                let failed: Vec<String> = report
                    .checks
                    .iter()
                    .filter(|c| c.status == validator::CheckStatus::Fail)
                    .map(|c| c.name.clone())
                    .collect();
                self.load()?;
                return Err(HwpError::ValidationFailed { checks: failed });
            }
            Ok(Ok(_)) => {}
            Ok(Err(err)) => return Err(err),
            Err(_) => {
                warn!("validator panicked during flush; writing unvalidated (fail-open)");
            }
        }

        write_atomically(&self.file_path, &bytes)?;
        self.content_digest = Sha256::digest(&bytes).into();
        self.stats = Some(stat(&self.file_path)?);
        self.dirty = false;
        Ok(())
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn validate(&self) -> Result<ValidationReport> {
        let mutator = self.mutator.as_ref().expect("load() called before use");
        validator::validate(&mutator.to_bytes()?)
    }
}

impl BinaryHolder {
    fn check_file_changed(&mut self) -> Result<()> {
        let current = match stat(&self.file_path) {
            Ok(stats) => stats,
            Err(HwpError::FileMissing(path)) => return Err(HwpError::FileMissing(path)),
            Err(other) => return Err(other),
        };
        let Some(previous) = self.stats else {
            return self.load();
        };

        let stats_match = current == previous;
        let needs_reload = if !stats_match {
            true
        } else if self.dirty {
            let bytes = std::fs::read(&self.file_path)?;
            let digest: [u8; 32] = Sha256::digest(&bytes).into();
            digest != self.content_digest
        } else {
            false
        };

        if needs_reload {
            if self.dirty {
                warn!(path = %self.file_path.display(), "file changed externally; discarding dirty in-memory state");
            }
            self.load()?;
        }
        Ok(())
    }
}

