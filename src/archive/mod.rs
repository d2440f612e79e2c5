//! Archive-format (`.hwpx`) support: a ZIP of XML parts. Reading projects
//! into the same [`crate::model::HwpDocument`] tree the binary format
//! builds; mutating works directly on the order-preserving XML trees so
//! untouched parts survive byte-for-byte.

pub mod mutator;
pub mod reader;
pub mod xml;

pub use mutator::ArchiveMutator;
pub use reader::read;
