use serde::Serialize;

use crate::error::Result;
use crate::parser::record::Record;
use crate::utils::encoding::string_to_utf16le;

#[derive(Debug, Clone, Serialize)]
pub struct CharShape {
    pub face_name_ids: [u16; 7],
    pub ratios: [u8; 7],
    pub char_spaces: [i8; 7],
    pub relative_sizes: [u8; 7],
    pub char_offsets: [i8; 7],
    pub base_size: i32,
    pub properties: u32,
    pub shadow_gap_x: i8,
    pub shadow_gap_y: i8,
    pub text_color: u32,
    pub underline_color: u32,
    pub shade_color: u32,
    pub shadow_color: u32,
    pub border_fill_id: u16,
}

impl CharShape {
    pub fn is_bold(&self) -> bool {
        // Bold is bit 0 of properties
        self.properties & 0x1 != 0
    }

    pub fn is_italic(&self) -> bool {
        // Italic is bit 1 of properties
        self.properties & 0x2 != 0
    }

    pub fn is_underline(&self) -> bool {
        // Underline type is bits 2-4, non-zero means underlined
        (self.properties >> 2) & 0x7 != 0
    }

    pub fn is_strikethrough(&self) -> bool {
        // Strikethrough type is bits 5-7, non-zero means strikethrough
        (self.properties >> 5) & 0x7 != 0
    }

    pub fn get_outline_type(&self) -> u8 {
        // Outline type is bits 8-10
        ((self.properties >> 8) & 0x7) as u8
    }

    pub fn get_shadow_type(&self) -> u8 {
        // Shadow type is bits 11-12
        ((self.properties >> 11) & 0x3) as u8
    }

    /// `base_size` is stored on disk as hundredths of a point.
    pub fn font_size_points(&self) -> f64 {
        self.base_size as f64 / 100.0
    }

    pub fn set_font_size_points(&mut self, points: f64) {
        self.base_size = (points * 100.0).round() as i32;
    }

    /// `text_color` is stored on disk as `0xBBGGRR`; returns `(r, g, b)`.
    pub fn color_rgb(&self) -> (u8, u8, u8) {
        let b = ((self.text_color >> 16) & 0xFF) as u8;
        let g = ((self.text_color >> 8) & 0xFF) as u8;
        let r = (self.text_color & 0xFF) as u8;
        (r, g, b)
    }

    pub fn set_color_rgb(&mut self, r: u8, g: u8, b: u8) {
        self.text_color = ((b as u32) << 16) | ((g as u32) << 8) | (r as u32);
    }

    pub fn set_bold(&mut self, bold: bool) {
        if bold {
            self.properties |= 0x1;
        } else {
            self.properties &= !0x1;
        }
    }

    pub fn set_italic(&mut self, italic: bool) {
        if italic {
            self.properties |= 0x2;
        } else {
            self.properties &= !0x2;
        }
    }

    pub fn set_underline(&mut self, underline: bool) {
        let mask = 0x7 << 2;
        if underline {
            self.properties = (self.properties & !mask) | (1 << 2);
        } else {
            self.properties &= !mask;
        }
    }

    pub fn from_record(record: &Record) -> Result<Self> {
        let mut reader = record.data_reader();

        // Check minimum size
        if reader.remaining() < 72 {
            return Err(crate::error::HwpError::ParseError(format!(
                "CharShape record too small: {} bytes",
                reader.remaining()
            )));
        }

        let mut face_name_ids = [0u16; 7];
        let mut ratios = [0u8; 7];
        let mut char_spaces = [0i8; 7];
        let mut relative_sizes = [0u8; 7];
        let mut char_offsets = [0i8; 7];

        for item in &mut face_name_ids {
            *item = reader.read_u16()?;
        }
        for item in &mut ratios {
            *item = reader.read_u8()?;
        }
        for item in &mut char_spaces {
            *item = reader.read_u8()? as i8;
        }
        for item in &mut relative_sizes {
            *item = reader.read_u8()?;
        }
        for item in &mut char_offsets {
            *item = reader.read_u8()? as i8;
        }

        Ok(Self {
            face_name_ids,
            ratios,
            char_spaces,
            relative_sizes,
            char_offsets,
            base_size: reader.read_i32()?,
            properties: reader.read_u32()?,
            shadow_gap_x: reader.read_u8()? as i8,
            shadow_gap_y: reader.read_u8()? as i8,
            text_color: reader.read_u32()?,
            underline_color: reader.read_u32()?,
            shade_color: reader.read_u32()?,
            shadow_color: reader.read_u32()?,
            border_fill_id: reader.read_u16()?,
        })
    }
}
impl CharShape {
    /// Create a new default CharShape for writing
    pub fn new_default() -> Self {
        Self {
            face_name_ids: [0; 7],    // Use first font (index 0)
            ratios: [100; 7],         // 100% ratio
            char_spaces: [0; 7],      // No character spacing
            relative_sizes: [100; 7], // 100% relative size
            char_offsets: [0; 7],     // No offset
            base_size: 1200,          // 12pt (100 units per point)
            properties: 0,            // No bold, italic, etc.
            shadow_gap_x: 0,
            shadow_gap_y: 0,
            text_color: 0x000000, // Black text
            underline_color: 0x000000,
            shade_color: 0xFFFFFF,  // White shade
            shadow_color: 0x808080, // Gray shadow
            border_fill_id: 0,
        }
    }

    /// Payload bytes for a fresh `CHAR_SHAPE` record, matching `from_record`'s
    /// field order exactly.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(72);
        for id in &self.face_name_ids {
            out.extend_from_slice(&id.to_le_bytes());
        }
        out.extend_from_slice(&self.ratios);
        for v in &self.char_spaces {
            out.push(*v as u8);
        }
        out.extend_from_slice(&self.relative_sizes);
        for v in &self.char_offsets {
            out.push(*v as u8);
        }
        out.extend_from_slice(&self.base_size.to_le_bytes());
        out.extend_from_slice(&self.properties.to_le_bytes());
        out.push(self.shadow_gap_x as u8);
        out.push(self.shadow_gap_y as u8);
        out.extend_from_slice(&self.text_color.to_le_bytes());
        out.extend_from_slice(&self.underline_color.to_le_bytes());
        out.extend_from_slice(&self.shade_color.to_le_bytes());
        out.extend_from_slice(&self.shadow_color.to_le_bytes());
        out.extend_from_slice(&self.border_fill_id.to_le_bytes());
        // Two reserved bytes: the fields above only account for 70 of the
        // record's 72-byte minimum, and `from_record` rejects anything
        // shorter.
        out.extend_from_slice(&[0u8; 2]);
        out
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FaceName {
    pub properties: u8,
    pub font_name: String,
    pub substitute_font_type: u8,
    pub substitute_font_name: String,
    pub panose: Option<[u8; 10]>,
    pub default_font_name: String,
}

impl FaceName {
    pub fn from_record(record: &Record) -> Result<Self> {
        let mut reader = record.data_reader();

        if reader.remaining() < 7 {
            return Err(crate::error::HwpError::ParseError(
                "FaceName record too small".to_string(),
            ));
        }

        let properties = reader.read_u8()?;
        let font_name_len = reader.read_u16()? as usize;

        if reader.remaining() < font_name_len * 2 {
            return Err(crate::error::HwpError::ParseError(
                "Invalid font name length".to_string(),
            ));
        }
        let font_name = reader.read_string(font_name_len * 2)?;

        // Default values for optional fields
        let mut substitute_font_type = 0;
        let mut substitute_font_name = String::new();
        let mut panose = None;
        let mut default_font_name = String::new();

        // Read optional fields if available
        if reader.remaining() >= 3 {
            substitute_font_type = reader.read_u8()?;
            if reader.remaining() >= 2 {
                let substitute_font_name_len = reader.read_u16()? as usize;
                if reader.remaining() >= substitute_font_name_len * 2 {
                    substitute_font_name = reader.read_string(substitute_font_name_len * 2)?;
                }
            }
        }

        // Read panose if flag is set and data available
        if properties & 0x80 != 0 && reader.remaining() >= 10 {
            let mut p = [0u8; 10];
            for item in &mut p {
                *item = reader.read_u8()?;
            }
            panose = Some(p);
        }

        // Read default font name if available
        if reader.remaining() >= 2 {
            let default_font_name_len = reader.read_u16()? as usize;
            if reader.remaining() >= default_font_name_len * 2 {
                default_font_name = reader.read_string(default_font_name_len * 2)?;
            }
        }

        Ok(Self {
            properties,
            font_name,
            substitute_font_type,
            substitute_font_name,
            panose,
            default_font_name,
        })
    }
}
impl FaceName {
    /// Create a new default FaceName for writing
    pub fn new_default(font_name: String) -> Self {
        Self {
            properties: 0,
            font_name: font_name.clone(),
            substitute_font_type: 0,
            substitute_font_name: font_name.clone(),
            panose: None,
            default_font_name: font_name,
        }
    }

    /// Payload bytes for a fresh `FACE_NAME` record, matching `from_record`'s
    /// field order exactly.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.push(self.properties);

        let name = string_to_utf16le(&self.font_name);
        out.extend_from_slice(&((name.len() / 2) as u16).to_le_bytes());
        out.extend_from_slice(&name);

        out.push(self.substitute_font_type);
        let substitute = string_to_utf16le(&self.substitute_font_name);
        out.extend_from_slice(&((substitute.len() / 2) as u16).to_le_bytes());
        out.extend_from_slice(&substitute);

        if let Some(panose) = &self.panose {
            out.extend_from_slice(panose);
        }

        let default_name = string_to_utf16le(&self.default_font_name);
        out.extend_from_slice(&((default_name.len() / 2) as u16).to_le_bytes());
        out.extend_from_slice(&default_name);
        out
    }
}
