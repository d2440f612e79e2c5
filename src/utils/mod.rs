pub mod compression;
pub mod encoding;

pub use self::compression::{compress_stream, decompress_stream};
pub use self::encoding::{
    decode_para_text_units, string_to_utf16le, units_from_le_bytes, utf16le_to_string,
};
