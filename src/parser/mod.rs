pub mod body_text;
pub mod doc_info;
pub mod header;
pub mod record;

pub use self::header::FileHeader;
pub use self::record::{HwpTag, Record, RecordHeader};
