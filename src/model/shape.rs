use crate::error::Result;
use crate::parser::record::Record;

/// Common header shared by every `SHAPE_COMPONENT*` record: position/size of
/// the drawing object within its paragraph, plus the owning `CTRL_ID`'s
/// `BinData` reference when the component is a picture.
#[derive(Debug, Clone)]
pub struct ShapeComponent {
    pub width: i32,
    pub height: i32,
}

impl ShapeComponent {
    pub fn from_record(record: &Record) -> Result<Self> {
        if record.data.len() < 28 {
            return Err(crate::error::HwpError::ParseError(format!(
                "ShapeComponent record too small: {} bytes",
                record.data.len()
            )));
        }
        let width = i32::from_le_bytes(record.data[20..24].try_into().unwrap());
        let height = i32::from_le_bytes(record.data[24..28].try_into().unwrap());
        Ok(Self { width, height })
    }
}

/// A `SHAPE_COMPONENT_PICTURE` record: the border/crop fields are skipped,
/// only the `BinData` id this crate resolves images through is kept.
#[derive(Debug, Clone)]
pub struct ShapeComponentPicture {
    pub bin_data_id: u16,
}

/// Byte offset of the `BinData` id within a `SHAPE_COMPONENT_PICTURE` record:
/// four border-color `u32`s (4*4=16B) plus a border-thickness `u32` (4B) plus
/// a border-property `u32` (4B) land the id at `4*17+3`... the picture info
/// struct (border fill id at the 18th field) puts it at byte offset 71.
const PICTURE_BIN_DATA_OFFSET: usize = 4 * 17 + 3;

impl ShapeComponentPicture {
    pub fn from_record(record: &Record) -> Result<Self> {
        if record.data.len() < PICTURE_BIN_DATA_OFFSET + 2 {
            return Err(crate::error::HwpError::ParseError(format!(
                "ShapeComponentPicture record too small: {} bytes",
                record.data.len()
            )));
        }
        let bin_data_id = u16::from_le_bytes(
            record.data[PICTURE_BIN_DATA_OFFSET..PICTURE_BIN_DATA_OFFSET + 2]
                .try_into()
                .unwrap(),
        );
        Ok(Self { bin_data_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::record::RecordHeader;

    fn record_with_len(len: usize) -> Record {
        Record {
            header: RecordHeader {
                tag_id: 0x5C,
                level: 0,
                size: len as u32,
            },
            data: vec![0u8; len],
        }
    }

    #[test]
    fn reads_width_and_height() {
        let mut record = record_with_len(28);
        record.data[20..24].copy_from_slice(&100i32.to_le_bytes());
        record.data[24..28].copy_from_slice(&200i32.to_le_bytes());
        let shape = ShapeComponent::from_record(&record).unwrap();
        assert_eq!(shape.width, 100);
        assert_eq!(shape.height, 200);
    }

    #[test]
    fn reads_bin_data_id_from_picture() {
        let mut record = record_with_len(PICTURE_BIN_DATA_OFFSET + 2);
        record.data[PICTURE_BIN_DATA_OFFSET..PICTURE_BIN_DATA_OFFSET + 2]
            .copy_from_slice(&7u16.to_le_bytes());
        let picture = ShapeComponentPicture::from_record(&record).unwrap();
        assert_eq!(picture.bin_data_id, 7);
    }

    #[test]
    fn rejects_truncated_shape_component() {
        let record = record_with_len(10);
        assert!(ShapeComponent::from_record(&record).is_err());
    }
}
