use crate::error::Result;
use crate::parser::record::Record;

/// A `PARA_CHAR_SHAPE` record: either 8-byte `(position: u32, char_shape_ref:
/// u32)` pairs, or a single legacy 6-byte `(position: u32, char_shape_ref:
/// u16)` entry. `char_shape_ref` is kept as `u32` so refs at or above 2^16
/// survive a round trip.
#[derive(Debug, Clone)]
pub struct ParaCharShape {
    pub char_positions: Vec<CharPositionShape>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharPositionShape {
    pub position: u32,
    pub char_shape_id: u32,
}

impl ParaCharShape {
    pub fn from_record(record: &Record) -> Result<Self> {
        let mut reader = record.data_reader();

        if record.data.is_empty() {
            return Err(crate::error::HwpError::ParseError(
                "PARA_CHAR_SHAPE record is empty".to_string(),
            ));
        }

        // A stray 2-byte tail after whole 8-byte pairs means this is really
        // the legacy 6-byte (u32, u16) single-entry form.
        let mut char_positions = Vec::new();
        if record.data.len() % 8 == 6 {
            let position = reader.read_u32()?;
            let char_shape_id = reader.read_u16()? as u32;
            char_positions.push(CharPositionShape {
                position,
                char_shape_id,
            });
        } else {
            while reader.remaining() >= 8 {
                let position = reader.read_u32()?;
                let char_shape_id = reader.read_u32()?;
                char_positions.push(CharPositionShape {
                    position,
                    char_shape_id,
                });
            }
        }

        if char_positions.is_empty() {
            return Err(crate::error::HwpError::ParseError(
                "PARA_CHAR_SHAPE record has no entries".to_string(),
            ));
        }

        Ok(Self { char_positions })
    }

    pub fn get_shape_at_position(&self, char_pos: u32) -> Option<u32> {
        let mut current_shape = None;
        for pos_shape in &self.char_positions {
            if pos_shape.position <= char_pos {
                current_shape = Some(pos_shape.char_shape_id);
            } else {
                break;
            }
        }
        current_shape
    }

    pub fn new_single_shape(char_shape_id: u32) -> Self {
        Self {
            char_positions: vec![CharPositionShape {
                position: 0,
                char_shape_id,
            }],
        }
    }

    pub fn new_with_ranges(ranges: Vec<(u32, u32)>) -> Self {
        let mut char_positions: Vec<CharPositionShape> = ranges
            .into_iter()
            .map(|(position, char_shape_id)| CharPositionShape {
                position,
                char_shape_id,
            })
            .collect();
        char_positions.sort_by_key(|p| p.position);
        Self { char_positions }
    }

    pub fn add_shape_at_position(&mut self, position: u32, char_shape_id: u32) {
        self.char_positions.retain(|p| p.position != position);
        self.char_positions.push(CharPositionShape {
            position,
            char_shape_id,
        });
        self.char_positions.sort_by_key(|p| p.position);
    }

    /// Payload bytes for a fresh record: always the 8-byte-pair form, even
    /// when the source was the legacy 6-byte shape.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.char_positions.len() * 8);
        for char_pos in &self.char_positions {
            data.extend_from_slice(&char_pos.position.to_le_bytes());
            data.extend_from_slice(&char_pos.char_shape_id.to_le_bytes());
        }
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::record::RecordHeader;

    fn record_with_data(data: Vec<u8>) -> Record {
        Record {
            header: RecordHeader {
                tag_id: 0x52,
                level: 0,
                size: data.len() as u32,
            },
            data,
        }
    }

    #[test]
    fn reads_multiple_entry_pairs() {
        let mut data = Vec::new();
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(&3u32.to_le_bytes());
        data.extend_from_slice(&5u32.to_le_bytes());
        data.extend_from_slice(&70000u32.to_le_bytes());
        let parsed = ParaCharShape::from_record(&record_with_data(data)).unwrap();
        assert_eq!(parsed.char_positions.len(), 2);
        assert_eq!(parsed.get_shape_at_position(10), Some(70000));
    }

    #[test]
    fn reads_legacy_six_byte_form() {
        let mut data = Vec::new();
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(&42u16.to_le_bytes());
        let parsed = ParaCharShape::from_record(&record_with_data(data)).unwrap();
        assert_eq!(parsed.char_positions.len(), 1);
        assert_eq!(parsed.char_positions[0].char_shape_id, 42);
    }

    #[test]
    fn rejects_empty_record() {
        assert!(ParaCharShape::from_record(&record_with_data(Vec::new())).is_err());
    }
}
