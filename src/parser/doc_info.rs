use crate::model::bin_data::BinData;
use crate::model::{CharShape, DocumentHeader, FaceName, IdMappings, ParaShape, Style};
use crate::parser::record::{HwpTag, Record};
use crate::reader::StreamReader;
use crate::utils::compression::decompress_stream;
use crate::error::Result;

/// Parses the `DocInfo` stream into the four public header tables plus
/// `ID_MAPPINGS` and `BinData`. Tables not part of the public document
/// projection (border fills, tab defs, numbering, bullets) are left
/// unparsed; their records pass through untouched on a binary round trip.
pub struct DocInfoParser;

impl DocInfoParser {
    pub fn parse(data: Vec<u8>, is_compressed: bool) -> Result<DocInfo> {
        let data = if is_compressed {
            decompress_stream(&data)?
        } else {
            data
        };

        let mut reader = StreamReader::new(data);
        let mut doc_info = DocInfo::default();

        while reader.remaining() >= 4 {
            let record = match Record::parse(&mut reader) {
                Ok(r) => r,
                Err(_) => break,
            };

            match HwpTag::from_u16(record.tag_id()) {
                Some(HwpTag::IdMappings) => {
                    doc_info.id_mappings = Some(IdMappings::from_record(&record)?);
                }
                Some(HwpTag::FaceName) => {
                    doc_info.face_names.push(FaceName::from_record(&record)?);
                }
                Some(HwpTag::CharShape) => {
                    doc_info.char_shapes.push(CharShape::from_record(&record)?);
                }
                Some(HwpTag::ParaShape) => {
                    doc_info.para_shapes.push(ParaShape::from_record(&record)?);
                }
                Some(HwpTag::Style) => {
                    doc_info.styles.push(Style::from_record(&record)?);
                }
                Some(HwpTag::BinData) => {
                    doc_info.bin_data.push(BinData::from_record(&record)?);
                }
                _ => {
                    // DocumentProperties and the layout-only tables
                    // (BorderFill, TabDef, Numbering, Bullet) are kept
                    // byte-identical by the mutator and don't need a
                    // parsed representation here.
                }
            }
        }

        Ok(doc_info)
    }
}

#[derive(Debug, Default)]
pub struct DocInfo {
    pub id_mappings: Option<IdMappings>,
    pub face_names: Vec<FaceName>,
    pub char_shapes: Vec<CharShape>,
    pub para_shapes: Vec<ParaShape>,
    pub styles: Vec<Style>,
    pub bin_data: Vec<BinData>,
}

impl DocInfo {
    pub fn into_header(self) -> DocumentHeader {
        DocumentHeader {
            fonts: self.face_names,
            char_shapes: self.char_shapes,
            para_shapes: self.para_shapes,
            styles: self.styles,
        }
    }
}
