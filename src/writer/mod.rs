//! Compound-file container rebuild. The mutator works on decompressed
//! per-stream byte buffers; once it's done patching, this module writes a
//! brand-new CFB container holding those bytes verbatim under their
//! original stream names. No knowledge of record structure lives here.

use cfb::CompoundFile;
use std::collections::BTreeSet;
use std::io::{Cursor, Write};

use crate::error::{HwpError, Result};

fn cfb_err(e: impl std::fmt::Display) -> HwpError {
    HwpError::Io(std::io::Error::other(e.to_string()))
}

/// Rebuilds a CFB container from `(stream_path, bytes)` pairs. Paths use
/// `/`-separated storage names, e.g. `"BodyText/Section0"`; any storage
/// directories they imply are created automatically.
pub fn build_container(streams: &[(String, Vec<u8>)]) -> Result<Vec<u8>> {
    let cursor = Cursor::new(Vec::new());
    let mut cfb = CompoundFile::create_with_version(cfb::Version::V3, cursor).map_err(cfb_err)?;

    let mut storages: BTreeSet<String> = BTreeSet::new();
    for (path, _) in streams {
        let mut prefix = String::new();
        for segment in path.split('/').rev().skip(1).collect::<Vec<_>>().into_iter().rev() {
            if !prefix.is_empty() {
                prefix.push('/');
            }
            prefix.push_str(segment);
            storages.insert(prefix.clone());
        }
    }
    for storage in &storages {
        cfb.create_storage(format!("/{storage}")).map_err(cfb_err)?;
    }

    for (path, bytes) in streams {
        let mut stream = cfb.create_stream(format!("/{path}")).map_err(cfb_err)?;
        stream.write_all(bytes)?;
    }

    cfb.flush().map_err(cfb_err)?;
    Ok(cfb.into_inner().into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_streams_through_cfb_reader() {
        let streams = vec![
            ("FileHeader".to_string(), vec![1u8, 2, 3]),
            ("BodyText/Section0".to_string(), vec![4u8, 5]),
        ];
        let bytes = build_container(&streams).unwrap();
        let mut file = cfb::CompoundFile::open(Cursor::new(bytes)).unwrap();
        let mut buf = Vec::new();
        std::io::Read::read_to_end(&mut file.open_stream("/FileHeader").unwrap(), &mut buf)
            .unwrap();
        assert_eq!(buf, vec![1, 2, 3]);
    }
}
