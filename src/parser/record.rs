use crate::error::Result;
use crate::reader::StreamReader;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    pub tag_id: u16,
    pub level: u8,
    pub size: u32,
}

/// Declared-size sentinel: when the 12-bit size field reads 0xFFF, the real
/// size follows as an extra 4-byte little-endian word.
const EXTENDED_SIZE_MARKER: u32 = 0xFFF;

impl RecordHeader {
    pub fn parse(reader: &mut StreamReader) -> Result<Self> {
        // Read single 32-bit header
        let header = reader.read_u32()?;

        // Extract fields from packed header
        // Bits 0-9: tag_id (10 bits)
        // Bits 10-19: level (10 bits)
        // Bits 20-31: size (12 bits)
        let tag_id = (header & 0x3FF) as u16;
        let level = ((header >> 10) & 0x3FF) as u8;
        let mut size = header >> 20;

        // If size is 0xFFF (4095), read extended size
        if size == EXTENDED_SIZE_MARKER {
            size = reader.read_u32()?;
        }

        Ok(Self {
            tag_id,
            level,
            size,
        })
    }

    /// Encodes a record header: 4 bytes, or 8 when `size >= 0xFFF`.
    pub fn encode(tag_id: u16, level: u8, size: u32) -> Vec<u8> {
        if size < EXTENDED_SIZE_MARKER {
            let packed = (tag_id as u32 & 0x3FF) | ((level as u32 & 0x3FF) << 10) | (size << 20);
            packed.to_le_bytes().to_vec()
        } else {
            let packed =
                (tag_id as u32 & 0x3FF) | ((level as u32 & 0x3FF) << 10) | (EXTENDED_SIZE_MARKER << 20);
            let mut out = packed.to_le_bytes().to_vec();
            out.extend_from_slice(&size.to_le_bytes());
            out
        }
    }

    /// Byte length of this record's own header (4 or 8 bytes).
    pub fn encoded_len(&self) -> usize {
        if self.size < EXTENDED_SIZE_MARKER {
            4
        } else {
            8
        }
    }
}

#[derive(Debug)]
pub struct Record {
    pub header: RecordHeader,
    pub data: Vec<u8>,
}

impl Record {
    pub fn parse(reader: &mut StreamReader) -> Result<Self> {
        if reader.remaining() < 4 {
            return Err(crate::error::HwpError::ParseError(
                "Not enough data for record header".to_string(),
            ));
        }

        let header = RecordHeader::parse(reader)?;

        // Size field contains the data size (without header)
        let data_size = header.size as usize;

        if data_size > reader.remaining() {
            return Err(crate::error::HwpError::ParseError(format!(
                "Record size {} exceeds remaining data {}",
                data_size,
                reader.remaining()
            )));
        }

        // Read data bytes
        let data = reader.read_bytes(data_size)?;

        Ok(Self { header, data })
    }

    pub fn tag_id(&self) -> u16 {
        self.header.tag_id
    }

    pub fn data_reader(&self) -> StreamReader {
        StreamReader::new(self.data.clone())
    }
}

/// Header + payload for a brand-new record, ready to be spliced into a stream.
pub fn build(tag_id: u16, level: u8, payload: &[u8]) -> Vec<u8> {
    let mut out = RecordHeader::encode(tag_id, level, payload.len() as u32);
    out.extend_from_slice(payload);
    out
}

/// One record plus the byte offset (within its stream) its header starts at.
#[derive(Debug)]
pub struct OffsetRecord {
    pub offset: usize,
    pub record: Record,
}

/// Walks an entire decompressed stream, yielding every record together with
/// its starting offset. Stops cleanly (without error) on truncation, mirroring
/// `iterate`'s "stops cleanly" contract.
pub fn iterate(stream: &[u8]) -> Vec<OffsetRecord> {
    let mut out = Vec::new();
    let mut reader = StreamReader::new(stream.to_vec());
    loop {
        let offset = reader.position() as usize;
        if reader.remaining() < 4 {
            break;
        }
        match Record::parse(&mut reader) {
            Ok(record) => out.push(OffsetRecord { offset, record }),
            Err(_) => break,
        }
    }
    out
}

/// Replaces the payload of the record whose header starts at `record_offset`
/// within `stream`, updating the header's size field. Every other byte in
/// `stream` is untouched.
pub fn replace_payload(stream: &[u8], record_offset: usize, new_payload: &[u8]) -> Result<Vec<u8>> {
    let mut reader = StreamReader::new(stream.to_vec());
    reader.set_position(record_offset as u64);
    let header = RecordHeader::parse(&mut reader)?;
    let old_data_start = record_offset + header.encoded_len();
    let old_data_end = old_data_start + header.size as usize;

    let mut out = Vec::with_capacity(stream.len() - header.size as usize + new_payload.len());
    out.extend_from_slice(&stream[..record_offset]);
    out.extend_from_slice(&RecordHeader::encode(
        header.tag_id,
        header.level,
        new_payload.len() as u32,
    ));
    out.extend_from_slice(new_payload);
    out.extend_from_slice(&stream[old_data_end..]);
    Ok(out)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum HwpTag {
    // Document Info
    DocumentProperties = 0x10,
    IdMappings = 0x11,
    BinData = 0x12,
    FaceName = 0x13,
    BorderFill = 0x14,
    CharShape = 0x15,
    TabDef = 0x16,
    Numbering = 0x17,
    Bullet = 0x18,
    ParaShape = 0x19,
    Style = 0x1A,
    DocData = 0x1B,
    DistributeDocData = 0x1C,

    // BodyText - Section Definition
    SectionDefine = 0x42,
    ColumnDefine = 0x43,
    TableControl = 0x44,
    SheetControl = 0x45,
    LineInfo = 0x47,
    HiddenComment = 0x48,
    HeaderFooter = 0x49,
    Footnote = 0x4A,
    AutoNumber = 0x4B,
    NewNumber = 0x4C,
    PageHide = 0x4D,
    PageOddEvenAdjust = 0x4E,
    PageNumberPosition = 0x4F,
    ParaHeader = 0x50,
    ParaText = 0x51,
    ParaCharShape = 0x52,
    ParaLineSeg = 0x53,
    ParaRangeTag = 0x54,
    CtrlHeader = 0x55,
    ListHeader = 0x56,
    PageDef = 0x57,
    FootnoteShape = 0x58,
    PageBorderFill = 0x59,
    ShapeObject = 0x5A,
    Table = 0x5B,
    ShapeComponent = 0x5C,
    ShapeComponentLine = 0x5D,
    ShapeComponentRectangle = 0x5E,
    ShapeComponentEllipse = 0x5F,
    ShapeComponentArc = 0x60,
    ShapeComponentPolygon = 0x61,
    ShapeComponentCurve = 0x62,
    ShapeComponentOle = 0x63,
    ShapeComponentPicture = 0x64,
    ShapeComponentContainer = 0x65,

    // Embedded controls
    EqEdit = 0x70,
    Reserved1 = 0x71,
    Reserved2 = 0x72,
    FormObject = 0x73,
    MemoShape = 0x74,
    MemoList = 0x75,
    ChartData = 0x76,
}

impl HwpTag {
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            0x10 => Some(Self::DocumentProperties),
            0x11 => Some(Self::IdMappings),
            0x12 => Some(Self::BinData),
            0x13 => Some(Self::FaceName),
            0x14 => Some(Self::BorderFill),
            0x15 => Some(Self::CharShape),
            0x16 => Some(Self::TabDef),
            0x17 => Some(Self::Numbering),
            0x18 => Some(Self::Bullet),
            0x19 => Some(Self::ParaShape),
            0x1A => Some(Self::Style),
            0x1B => Some(Self::DocData),
            0x1C => Some(Self::DistributeDocData),
            0x42 => Some(Self::SectionDefine),
            0x43 => Some(Self::ColumnDefine),
            0x44 => Some(Self::TableControl),
            0x45 => Some(Self::SheetControl),
            0x47 => Some(Self::LineInfo),
            0x48 => Some(Self::HiddenComment),
            0x49 => Some(Self::HeaderFooter),
            0x4A => Some(Self::Footnote),
            0x4B => Some(Self::AutoNumber),
            0x4C => Some(Self::NewNumber),
            0x4D => Some(Self::PageHide),
            0x4E => Some(Self::PageOddEvenAdjust),
            0x4F => Some(Self::PageNumberPosition),
            0x50 => Some(Self::ParaHeader),
            0x51 => Some(Self::ParaText),
            0x52 => Some(Self::ParaCharShape),
            0x53 => Some(Self::ParaLineSeg),
            0x54 => Some(Self::ParaRangeTag),
            0x55 => Some(Self::CtrlHeader),
            0x56 => Some(Self::ListHeader),
            0x57 => Some(Self::PageDef),
            0x58 => Some(Self::FootnoteShape),
            0x59 => Some(Self::PageBorderFill),
            0x5A => Some(Self::ShapeObject),
            0x5B => Some(Self::Table),
            0x5C => Some(Self::ShapeComponent),
            0x5D => Some(Self::ShapeComponentLine),
            0x5E => Some(Self::ShapeComponentRectangle),
            0x5F => Some(Self::ShapeComponentEllipse),
            0x60 => Some(Self::ShapeComponentArc),
            0x61 => Some(Self::ShapeComponentPolygon),
            0x62 => Some(Self::ShapeComponentCurve),
            0x63 => Some(Self::ShapeComponentOle),
            0x64 => Some(Self::ShapeComponentPicture),
            0x65 => Some(Self::ShapeComponentContainer),
            0x70 => Some(Self::EqEdit),
            0x71 => Some(Self::Reserved1),
            0x72 => Some(Self::Reserved2),
            0x73 => Some(Self::FormObject),
            0x74 => Some(Self::MemoShape),
            0x75 => Some(Self::MemoList),
            0x76 => Some(Self::ChartData),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_short_header() {
        let encoded = RecordHeader::encode(0x50, 2, 18);
        assert_eq!(encoded.len(), 4);
        let mut reader = StreamReader::new(encoded);
        let header = RecordHeader::parse(&mut reader).unwrap();
        assert_eq!(header, RecordHeader { tag_id: 0x50, level: 2, size: 18 });
    }

    #[test]
    fn round_trips_at_4094_without_extension() {
        let encoded = RecordHeader::encode(0x51, 0, 4094);
        assert_eq!(encoded.len(), 4);
        let mut reader = StreamReader::new(encoded);
        let header = RecordHeader::parse(&mut reader).unwrap();
        assert_eq!(header.size, 4094);
    }

    #[test]
    fn round_trips_at_4095_with_extension() {
        let encoded = RecordHeader::encode(0x51, 0, 4095);
        assert_eq!(encoded.len(), 8);
        let mut reader = StreamReader::new(encoded);
        let header = RecordHeader::parse(&mut reader).unwrap();
        assert_eq!(header.size, 4095);
    }

    #[test]
    fn round_trips_large_extended_size() {
        let encoded = RecordHeader::encode(0x51, 5, 100_000);
        let mut reader = StreamReader::new(encoded);
        let header = RecordHeader::parse(&mut reader).unwrap();
        assert_eq!(header, RecordHeader { tag_id: 0x51, level: 5, size: 100_000 });
    }

    #[test]
    fn iterate_stops_cleanly_on_truncation() {
        let mut stream = build(0x50, 0, &[1, 2, 3, 4]);
        stream.extend_from_slice(&[0xFF, 0xFF]); // a dangling partial header
        let records = iterate(&stream);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].offset, 0);
    }

    #[test]
    fn replace_payload_touches_only_target_record() {
        let mut stream = build(0x50, 0, &[1, 2, 3, 4]);
        let second_offset = stream.len();
        stream.extend_from_slice(&build(0x51, 1, &[9, 9]));

        let replaced = replace_payload(&stream, 0, &[7, 7, 7]).unwrap();
        let records = iterate(&replaced);
        assert_eq!(records[0].record.data, vec![7, 7, 7]);
        assert_eq!(records[0].record.header.tag_id, 0x50);
        assert_eq!(records[0].record.header.level, 0);
        assert_eq!(records[1].record.data, vec![9, 9]);
        assert_eq!(records[1].offset, second_offset + 1); // header grew by one byte
    }
}
