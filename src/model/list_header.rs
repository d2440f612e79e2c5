use crate::error::Result;
use crate::parser::record::Record;

/// A `LIST_HEADER` record: the header of any paragraph-owning container
/// (table cell, text-box sub-list). The common fields are 6 bytes; a table
/// cell additionally carries an 8-byte cell address right after, while a
/// text-box sub-list carries 2 reserved bytes instead (common header is then
/// effectively 8 bytes with no cell address).
#[derive(Debug, Clone)]
pub struct ListHeader {
    pub paragraph_count: u16,
    pub properties: u32,
    pub cell_addr: Option<CellAddr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellAddr {
    pub col: u16,
    pub row: u16,
    pub col_span: u16,
    pub row_span: u16,
}

impl ListHeader {
    pub fn from_record(record: &Record) -> Result<Self> {
        let mut reader = record.data_reader();

        if reader.remaining() < 6 {
            return Err(crate::error::HwpError::ParseError(format!(
                "ListHeader record too small: {} bytes",
                reader.remaining()
            )));
        }

        let paragraph_count = reader.read_u16()?;
        let properties = reader.read_u32()?;

        let cell_addr = if reader.remaining() >= 8 {
            Some(CellAddr {
                col: reader.read_u16()?,
                row: reader.read_u16()?,
                col_span: reader.read_u16()?,
                row_span: reader.read_u16()?,
            })
        } else {
            None
        };

        Ok(Self {
            paragraph_count,
            properties,
            cell_addr,
        })
    }

    pub fn is_multi_column(&self) -> bool {
        (self.properties & 0x01) != 0
    }

    pub fn has_line_wrap(&self) -> bool {
        (self.properties & 0x02) != 0
    }
}
