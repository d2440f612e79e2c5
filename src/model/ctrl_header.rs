use crate::error::Result;
use crate::parser::record::Record;

/// A 4-character control identifier (`"tbl "`, `"gso "`, `"$rec"`, `"secd"`, ...).
/// On disk the 4 ASCII bytes are stored in reversed order; `ControlId` always
/// holds them in natural reading order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlId(pub [u8; 4]);

impl ControlId {
    pub fn from_reversed_bytes(raw: &[u8]) -> Self {
        let mut bytes = [0u8; 4];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = raw.get(3 - i).copied().unwrap_or(0);
        }
        Self(bytes)
    }

    pub fn to_reversed_bytes(self) -> [u8; 4] {
        [self.0[3], self.0[2], self.0[1], self.0[0]]
    }

    pub fn as_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }

    pub fn matches(&self, s: &str) -> bool {
        self.0 == s.as_bytes()
    }
}

#[derive(Debug, Clone)]
pub struct CtrlHeader {
    pub ctrl_id: ControlId,
    pub properties: u32,
}

impl CtrlHeader {
    pub fn from_record(record: &Record) -> Result<Self> {
        let mut reader = record.data_reader();

        if reader.remaining() < 4 {
            return Err(crate::error::HwpError::ParseError(format!(
                "CtrlHeader record too small: {} bytes",
                reader.remaining()
            )));
        }

        let raw = reader.read_bytes(4)?;
        let ctrl_id = ControlId::from_reversed_bytes(&raw);
        let properties = if reader.remaining() >= 4 {
            reader.read_u32()?
        } else {
            0
        };

        Ok(Self {
            ctrl_id,
            properties,
        })
    }

    pub fn is_table(&self) -> bool {
        self.ctrl_id.matches("tbl ")
    }

    pub fn is_drawing_object(&self) -> bool {
        self.ctrl_id.matches("gso ")
    }
}
