//! Binary-format edits: record-level patches against decompressed per-stream
//! byte buffers. The container itself (the CFB file) is only rebuilt once,
//! on [`BinaryMutator::to_bytes`], via [`crate::writer::build_container`].

mod locate;

use std::collections::{HashSet, BTreeMap};

use crate::error::{HwpError, Result};
use crate::model::char_shape::{CharShape, FaceName};
use crate::model::id_mappings::IdMappings;
use crate::model::para_char_shape::ParaCharShape;
use crate::model::reference::{Locator, ParsedRef};
use crate::ops::InsertPosition;
use crate::parser::header::FileHeader;
use crate::parser::record::{self, HwpTag};
use crate::reader::CfbReader;
use crate::utils::compression::{compress_stream, decompress_stream};
use crate::utils::encoding::string_to_utf16le;
use crate::writer::build_container;

use self::locate::{locate_paragraph, ParaLocation};

pub struct BinaryMutator {
    is_compressed: bool,
    streams: Vec<(String, Vec<u8>)>,
    doc_info: Vec<u8>,
    sections: BTreeMap<usize, Vec<u8>>,
    dirty_doc_info: bool,
    dirty_sections: HashSet<usize>,
}

fn section_path(idx: usize) -> String {
    format!("BodyText/Section{idx}")
}

impl BinaryMutator {
    pub fn load(bytes: &[u8]) -> Result<Self> {
        let cursor = std::io::Cursor::new(bytes.to_vec());
        let mut reader = CfbReader::new(cursor)?;

        let header_bytes = reader.read_stream("FileHeader")?;
        let header = FileHeader::parse(header_bytes)?;
        if header.is_encrypted() {
            return Err(HwpError::PasswordProtected);
        }
        let is_compressed = header.is_compressed();

        let paths = reader.list_streams();
        let mut streams = Vec::with_capacity(paths.len());
        for path in &paths {
            let data = reader.read_stream(path)?;
            streams.push((path.clone(), data));
        }

        let raw_doc_info = streams
            .iter()
            .find(|(p, _)| p == "DocInfo")
            .map(|(_, d)| d.clone())
            .ok_or_else(|| HwpError::FileMissing("DocInfo".to_string()))?;
        let doc_info = if is_compressed {
            decompress_stream(&raw_doc_info)?
        } else {
            raw_doc_info
        };

        let mut sections = BTreeMap::new();
        let mut idx = 0;
        loop {
            let path = section_path(idx);
            let Some((_, raw)) = streams.iter().find(|(p, _)| p == &path) else {
                break;
            };
            let data = if is_compressed {
                decompress_stream(raw)?
            } else {
                raw.clone()
            };
            sections.insert(idx, data);
            idx += 1;
        }

        Ok(Self {
            is_compressed,
            streams,
            doc_info,
            sections,
            dirty_doc_info: false,
            dirty_sections: HashSet::new(),
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out_streams = Vec::with_capacity(self.streams.len());
        for (path, raw) in &self.streams {
            let bytes = if path == "DocInfo" && self.dirty_doc_info {
                self.encode(&self.doc_info)?
            } else if let Some(idx) = section_index(path) {
                if self.dirty_sections.contains(&idx) {
                    self.encode(&self.sections[&idx])?
                } else {
                    raw.clone()
                }
            } else {
                raw.clone()
            };
            out_streams.push((path.clone(), bytes));
        }
        build_container(&out_streams)
    }

    fn encode(&self, data: &[u8]) -> Result<Vec<u8>> {
        if self.is_compressed {
            compress_stream(data)
        } else {
            Ok(data.to_vec())
        }
    }

    fn section_mut(&mut self, idx: usize) -> Result<&mut Vec<u8>> {
        self.sections
            .get_mut(&idx)
            .ok_or_else(|| HwpError::RefNotFound(format!("s{idx}")))
    }

    pub fn set_paragraph_text(&mut self, reference: &ParsedRef, text: &str) -> Result<()> {
        let section = self.section_mut(reference.section)?;
        let location = locate_paragraph(section, &reference.locator)
            .ok_or_else(|| HwpError::RefNotFound(crate::model::reference::build(reference)))?;
        set_text(section, &location, &reference.locator, text)?;
        self.dirty_sections.insert(reference.section);
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    pub fn set_format(
        &mut self,
        reference: &ParsedRef,
        bold: Option<bool>,
        italic: Option<bool>,
        underline: Option<bool>,
        font_name: Option<String>,
        size_points: Option<f64>,
        color_rgb: Option<(u8, u8, u8)>,
        range: Option<(usize, usize)>,
    ) -> Result<()> {
        let section_idx = reference.section;
        let (existing_ref, para_len) = {
            let section = self.section_mut(section_idx)?;
            let location = locate_paragraph(section, &reference.locator)
                .ok_or_else(|| HwpError::RefNotFound(crate::model::reference::build(reference)))?;
            (existing_char_shape_ref(section, &location), paragraph_code_unit_len(section, &location))
        };

        if let Some((start, end)) = range {
            if start > end || end > para_len {
                return Err(HwpError::RangeOutOfBounds(format!(
                    "range {start}..{end} out of bounds for paragraph of length {para_len}"
                )));
            }
        }

        let mut shape = self.char_shape_by_index(existing_ref).unwrap_or_else(CharShape::new_default);
        if let Some(bold) = bold {
            shape.set_bold(bold);
        }
        if let Some(italic) = italic {
            shape.set_italic(italic);
        }
        if let Some(underline) = underline {
            shape.set_underline(underline);
        }
        if let Some(points) = size_points {
            shape.set_font_size_points(points);
        }
        if let Some((r, g, b)) = color_rgb {
            shape.set_color_rgb(r, g, b);
        }
        if let Some(font_name) = &font_name {
            let face_id = self.append_face_name(font_name)?;
            shape.face_name_ids[0] = face_id as u16;
        }

        let new_id = self.append_char_shape(&shape)?;

        let section = self.section_mut(section_idx)?;
        let location = locate_paragraph(section, &reference.locator)
            .ok_or_else(|| HwpError::RefNotFound(crate::model::reference::build(reference)))?;
        match range {
            Some((start, end)) => {
                let source_id = existing_ref.unwrap_or(0);
                let mut entries = Vec::with_capacity(3);
                if start > 0 {
                    entries.push((0u32, source_id));
                }
                entries.push((start as u32, new_id));
                if end < para_len {
                    entries.push((end as u32, source_id));
                }
                set_char_shape_entries(section, &location, entries)?;
            }
            None => set_char_shape_ref(section, &location, new_id)?,
        }
        self.dirty_sections.insert(section_idx);
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    pub fn add_paragraph(
        &mut self,
        reference: &ParsedRef,
        text: &str,
        position: InsertPosition,
        bold: Option<bool>,
        italic: Option<bool>,
        underline: Option<bool>,
        font_name: Option<String>,
        size_points: Option<f64>,
        color_rgb: Option<(u8, u8, u8)>,
    ) -> Result<()> {
        let section_idx = reference.section;

        let char_shape_id = if bold.is_some()
            || italic.is_some()
            || underline.is_some()
            || font_name.is_some()
            || size_points.is_some()
            || color_rgb.is_some()
        {
            let mut shape = CharShape::new_default();
            if let Some(bold) = bold {
                shape.set_bold(bold);
            }
            if let Some(italic) = italic {
                shape.set_italic(italic);
            }
            if let Some(underline) = underline {
                shape.set_underline(underline);
            }
            if let Some(points) = size_points {
                shape.set_font_size_points(points);
            }
            if let Some((r, g, b)) = color_rgb {
                shape.set_color_rgb(r, g, b);
            }
            if let Some(font_name) = &font_name {
                let face_id = self.append_face_name(font_name)?;
                shape.face_name_ids[0] = face_id as u16;
            }
            Some(self.append_char_shape(&shape)?)
        } else {
            None
        };

        let section = self.section_mut(section_idx)?;
        let (insert_at, level) = locate::insertion_point(section, &reference.locator, position)?;

        let header_payload = vec![0u8; 12];
        let text_bytes = string_to_utf16le(text);
        let mut patch = record::build(HwpTag::ParaHeader as u16, level, &header_payload);
        patch.extend(record::build(HwpTag::ParaText as u16, level + 1, &text_bytes));
        if let Some(char_shape_id) = char_shape_id {
            let payload = ParaCharShape::new_single_shape(char_shape_id).to_bytes();
            patch.extend(record::build(HwpTag::ParaCharShape as u16, level + 1, &payload));
        }

        let mut out = Vec::with_capacity(section.len() + patch.len());
        out.extend_from_slice(&section[..insert_at]);
        out.extend_from_slice(&patch);
        out.extend_from_slice(&section[insert_at..]);
        *section = out;
        self.dirty_sections.insert(section_idx);
        Ok(())
    }

    pub fn add_table(&mut self, section_idx: usize, rows: usize, cols: usize, cell_text: &[String]) -> Result<()> {
        // Minimum on-disk sizes the validator's table-structure layer
        // enforces: a CTRL_HEADER('tbl ') of 44 bytes, a TABLE of 34, and a
        // cell LIST_HEADER of 46. Producers that emit anything smaller get
        // rejected by the native viewer, so pad past the fields we set.
        const CTRL_HEADER_MIN: usize = 44;
        const TABLE_MIN: usize = 34;
        const LIST_HEADER_MIN: usize = 46;

        let mut patch = Vec::new();
        patch.extend(record::build(HwpTag::ParaHeader as u16, 0, &vec![0u8; 12]));
        let mut ctrl_payload = vec![0u8; CTRL_HEADER_MIN];
        ctrl_payload[0..4].copy_from_slice(b" lbt"); // "tbl " reversed on disk
        patch.extend(record::build(HwpTag::CtrlHeader as u16, 1, &ctrl_payload));

        let mut table_payload = vec![0u8; TABLE_MIN];
        table_payload[4..6].copy_from_slice(&(rows as u16).to_le_bytes());
        table_payload[6..8].copy_from_slice(&(cols as u16).to_le_bytes());
        patch.extend(record::build(HwpTag::Table as u16, 2, &table_payload));

        for row in 0..rows {
            for col in 0..cols {
                let mut cell_payload = vec![0u8; LIST_HEADER_MIN];
                cell_payload[6..8].copy_from_slice(&(col as u16).to_le_bytes());
                cell_payload[8..10].copy_from_slice(&(row as u16).to_le_bytes());
                cell_payload[10..12].copy_from_slice(&1u16.to_le_bytes());
                cell_payload[12..14].copy_from_slice(&1u16.to_le_bytes());
                patch.extend(record::build(HwpTag::ListHeader as u16, 3, &cell_payload));

                let text = cell_text.get(row * cols + col).cloned().unwrap_or_default();
                patch.extend(record::build(HwpTag::ParaHeader as u16, 4, &vec![0u8; 12]));
                patch.extend(record::build(
                    HwpTag::ParaText as u16,
                    5,
                    &string_to_utf16le(&text),
                ));
            }
        }

        let section = self.section_mut(section_idx)?;
        section.extend_from_slice(&patch);
        self.dirty_sections.insert(section_idx);
        Ok(())
    }

    fn char_shape_by_index(&self, index: Option<u32>) -> Option<CharShape> {
        let index = index?;
        let mut seen = 0u32;
        for record::OffsetRecord { record, .. } in record::iterate(&self.doc_info) {
            if HwpTag::from_u16(record.tag_id()) == Some(HwpTag::CharShape) {
                if seen == index {
                    return CharShape::from_record(&record).ok();
                }
                seen += 1;
            }
        }
        None
    }

    fn append_char_shape(&mut self, shape: &CharShape) -> Result<u32> {
        let mut id_mappings_offset = None;
        let mut id_mappings: Option<IdMappings> = None;
        for record::OffsetRecord { record, offset } in record::iterate(&self.doc_info) {
            if HwpTag::from_u16(record.tag_id()) == Some(HwpTag::IdMappings) {
                id_mappings_offset = Some(offset);
                id_mappings = IdMappings::from_record(&record).ok();
            }
        }

        let mut mappings = id_mappings
            .ok_or_else(|| HwpError::InvalidFormat("DocInfo missing ID_MAPPINGS record".to_string()))?;
        let new_id = mappings.char_shape_count();
        mappings.increment_char_shape_count();

        if let Some(offset) = id_mappings_offset {
            self.doc_info = record::replace_payload(&self.doc_info, offset, &mappings.to_bytes())?;
        }

        self.doc_info
            .extend(record::build(HwpTag::CharShape as u16, 0, &shape.to_bytes()));
        self.dirty_doc_info = true;
        Ok(new_id)
    }

    fn append_face_name(&mut self, font_name: &str) -> Result<u32> {
        let mut id_mappings_offset = None;
        let mut id_mappings: Option<IdMappings> = None;
        for record::OffsetRecord { record, offset } in record::iterate(&self.doc_info) {
            if HwpTag::from_u16(record.tag_id()) == Some(HwpTag::IdMappings) {
                id_mappings_offset = Some(offset);
                id_mappings = IdMappings::from_record(&record).ok();
            }
        }

        let mut mappings = id_mappings
            .ok_or_else(|| HwpError::InvalidFormat("DocInfo missing ID_MAPPINGS record".to_string()))?;
        let new_id = mappings.face_name_count();
        mappings.increment_face_name_count();

        if let Some(offset) = id_mappings_offset {
            self.doc_info = record::replace_payload(&self.doc_info, offset, &mappings.to_bytes())?;
        }

        let face = FaceName::new_default(font_name.to_string());
        self.doc_info
            .extend(record::build(HwpTag::FaceName as u16, 0, &face.to_bytes()));
        self.dirty_doc_info = true;
        Ok(new_id)
    }
}

fn section_index(path: &str) -> Option<usize> {
    path.strip_prefix("BodyText/Section")?.parse().ok()
}

/// Ends with the UTF-16 code unit `0x000D` (`\r`), the paragraph-terminating
/// mark the reader relies on to know a paragraph's text record is complete.
fn ends_with_cr(payload: &[u8]) -> bool {
    payload.len() >= 2 && payload[payload.len() - 2..] == [0x0D, 0x00]
}

fn set_text(section: &mut Vec<u8>, location: &ParaLocation, locator: &Locator, text: &str) -> Result<()> {
    let original_text = location.text_offset.and_then(|offset| {
        let mut reader = crate::reader::StreamReader::new(section.to_vec());
        reader.set_position(offset as u64);
        record::Record::parse(&mut reader).ok().map(|r| r.data)
    });
    let original_ref = existing_char_shape_ref(section, location);

    let mut new_payload = string_to_utf16le(text);
    let had_cr = original_text.as_deref().is_some_and(ends_with_cr);
    if had_cr && !ends_with_cr(&new_payload) {
        new_payload.extend_from_slice(&[0x0D, 0x00]);
    }
    let nchars = (new_payload.len() / 2) as u32;

    *section = patch_nchars(section, location.header_offset, nchars)?;
    *section = match location.text_offset {
        Some(offset) => record::replace_payload(section, offset, &new_payload)?,
        None => {
            let mut out = Vec::with_capacity(section.len() + new_payload.len() + 8);
            out.extend_from_slice(&section[..location.header_record_end]);
            out.extend(record::build(HwpTag::ParaText as u16, location.level + 1, &new_payload));
            out.extend_from_slice(&section[location.header_record_end..]);
            out
        }
    };

    let reset_location = locate_paragraph(section, locator)
        .ok_or_else(|| HwpError::RefNotFound("paragraph vanished after text replacement".to_string()))?;
    set_char_shape_ref(section, &reset_location, original_ref.unwrap_or(0))?;
    Ok(())
}

/// Rewrites `PARA_HEADER.nChars` (low 31 bits) to the new code-unit count,
/// preserving the high "last paragraph in section" flag bit. Same payload
/// size in, same size out, so every other offset into the stream survives.
fn patch_nchars(section: &[u8], header_offset: usize, nchars: u32) -> Result<Vec<u8>> {
    let mut reader = crate::reader::StreamReader::new(section.to_vec());
    reader.set_position(header_offset as u64);
    let record = record::Record::parse(&mut reader)?;
    let mut payload = record.data.clone();
    if payload.len() >= 4 {
        let old = u32::from_le_bytes([payload[0], payload[1], payload[2], payload[3]]);
        let flag = old & 0x8000_0000;
        let new = flag | (nchars & 0x7FFF_FFFF);
        payload[0..4].copy_from_slice(&new.to_le_bytes());
    }
    record::replace_payload(section, header_offset, &payload)
}

fn existing_char_shape_ref(section: &[u8], location: &ParaLocation) -> Option<u32> {
    let offset = location.char_shape_offset?;
    let mut reader = crate::reader::StreamReader::new(section.to_vec());
    reader.set_position(offset as u64);
    let record = record::Record::parse(&mut reader).ok()?;
    ParaCharShape::from_record(&record)
        .ok()?
        .char_positions
        .first()
        .map(|p| p.char_shape_id)
}

/// Code-unit length of the paragraph's current `PARA_TEXT` payload, used to
/// bounds-check a `SetFormat` range before it's applied.
fn paragraph_code_unit_len(section: &[u8], location: &ParaLocation) -> usize {
    let Some(offset) = location.text_offset else { return 0 };
    let mut reader = crate::reader::StreamReader::new(section.to_vec());
    reader.set_position(offset as u64);
    match record::Record::parse(&mut reader) {
        Ok(record) => record.data.len() / 2,
        Err(_) => 0,
    }
}

fn set_char_shape_ref(section: &mut Vec<u8>, location: &ParaLocation, new_id: u32) -> Result<()> {
    set_char_shape_entries(section, location, vec![(0, new_id)])
}

fn set_char_shape_entries(section: &mut Vec<u8>, location: &ParaLocation, entries: Vec<(u32, u32)>) -> Result<()> {
    let payload = ParaCharShape::new_with_ranges(entries).to_bytes();
    *section = match location.char_shape_offset {
        Some(offset) => record::replace_payload(section, offset, &payload)?,
        None => {
            let insert_at = location.text_offset.unwrap_or(location.header_record_end);
            let mut reader = crate::reader::StreamReader::new(section.clone());
            reader.set_position(insert_at as u64);
            let after = if location.text_offset.is_some() {
                record::Record::parse(&mut reader)
                    .map(|r| insert_at + r.header.encoded_len() + r.data.len())
                    .unwrap_or(insert_at)
            } else {
                insert_at
            };
            let mut out = Vec::with_capacity(section.len() + payload.len() + 8);
            out.extend_from_slice(&section[..after]);
            out.extend(record::build(HwpTag::ParaCharShape as u16, location.level + 1, &payload));
            out.extend_from_slice(&section[after..]);
            out
        }
    };
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::reference;

    fn minimal_section() -> Vec<u8> {
        let header_payload = vec![0u8; 12];
        let text = "hi".encode_utf16().flat_map(|u| u.to_le_bytes()).collect::<Vec<_>>();
        let mut stream = Vec::new();
        stream.extend(record::build(HwpTag::ParaHeader as u16, 0, &header_payload));
        stream.extend(record::build(HwpTag::ParaText as u16, 1, &text));
        stream
    }

    #[test]
    fn replaces_paragraph_text_in_place() {
        let mut section = minimal_section();
        let reference = reference::parse("s0.p0").unwrap();
        let location = locate_paragraph(&section, &reference.locator).unwrap();
        set_text(&mut section, &location, &reference.locator, "bye!").unwrap();
        let records = record::iterate(&section);
        let text_record = &records[1].record;
        let units: Vec<u16> = text_record
            .data
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .collect();
        assert_eq!(String::from_utf16(&units).unwrap(), "bye!");
    }
}
