use crate::error::Result;
use crate::parser::record::Record;

/// An `ID_MAPPINGS` record: one `u32` count per DocInfo sub-table, in a fixed
/// field order. Only the fields this crate's operations actually touch are
/// named; the rest are kept as a raw slice so a count can still be bumped
/// in-place without losing the trailing fields.
#[derive(Debug, Clone)]
pub struct IdMappings {
    counts: Vec<u32>,
}

/// Index of the char-shape count within the fixed field order (0-based:
/// binData, kernFile, ... , charShape is the 10th field).
const CHAR_SHAPE_COUNT_FIELD: usize = 9;

/// Index of the Hangul face-name count, the first of the five per-language
/// font tables. New `FaceName` records this crate appends always go in that
/// table, since `CharShape::face_name_ids[0]` (the only font ref this crate
/// writes) addresses it.
const FACE_NAME_COUNT_FIELD: usize = 1;

impl IdMappings {
    pub fn from_record(record: &Record) -> Result<Self> {
        let mut reader = record.data_reader();
        let field_count = reader.remaining() / 4;
        let mut counts = Vec::with_capacity(field_count);
        for _ in 0..field_count {
            counts.push(reader.read_u32()?);
        }
        Ok(Self { counts })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.counts.len() * 4);
        for count in &self.counts {
            out.extend_from_slice(&count.to_le_bytes());
        }
        out
    }

    pub fn char_shape_count(&self) -> u32 {
        self.counts.get(CHAR_SHAPE_COUNT_FIELD).copied().unwrap_or(0)
    }

    pub fn set_char_shape_count(&mut self, count: u32) {
        if self.counts.len() <= CHAR_SHAPE_COUNT_FIELD {
            self.counts.resize(CHAR_SHAPE_COUNT_FIELD + 1, 0);
        }
        self.counts[CHAR_SHAPE_COUNT_FIELD] = count;
    }

    pub fn increment_char_shape_count(&mut self) -> u32 {
        let next = self.char_shape_count() + 1;
        self.set_char_shape_count(next);
        next
    }

    pub fn face_name_count(&self) -> u32 {
        self.counts.get(FACE_NAME_COUNT_FIELD).copied().unwrap_or(0)
    }

    pub fn set_face_name_count(&mut self, count: u32) {
        if self.counts.len() <= FACE_NAME_COUNT_FIELD {
            self.counts.resize(FACE_NAME_COUNT_FIELD + 1, 0);
        }
        self.counts[FACE_NAME_COUNT_FIELD] = count;
    }

    pub fn increment_face_name_count(&mut self) -> u32 {
        let next = self.face_name_count() + 1;
        self.set_face_name_count(next);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::record::RecordHeader;

    fn record_with_counts(counts: &[u32]) -> Record {
        let mut data = Vec::new();
        for c in counts {
            data.extend_from_slice(&c.to_le_bytes());
        }
        Record {
            header: RecordHeader {
                tag_id: 0x11,
                level: 0,
                size: data.len() as u32,
            },
            data,
        }
    }

    #[test]
    fn reads_char_shape_count_at_field_nine() {
        let counts: Vec<u32> = (0..12).collect();
        let mappings = IdMappings::from_record(&record_with_counts(&counts)).unwrap();
        assert_eq!(mappings.char_shape_count(), 9);
    }

    #[test]
    fn increment_round_trips_through_bytes() {
        let counts = vec![0u32; 12];
        let mut mappings = IdMappings::from_record(&record_with_counts(&counts)).unwrap();
        assert_eq!(mappings.increment_char_shape_count(), 1);
        let bytes = mappings.to_bytes();
        assert_eq!(u32::from_le_bytes(bytes[36..40].try_into().unwrap()), 1);
    }
}
