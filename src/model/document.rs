use serde::Serialize;

use crate::model::{CharShape, FaceName, ParaShape, Section, Style};

/// Which persistence strategy a loaded document uses. Fixes how the holder
/// serializes edits back to disk: `Binary` rebuilds a compound-file
/// container, `Archive` re-zips the touched XML parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatTag {
    Binary,
    Archive,
}

/// The four ordered header tables shared by every section. Entry identity is
/// positional: a `char_shape_ref` of `3` means `header.char_shapes[3]`.
#[derive(Debug, Default, Clone, Serialize)]
pub struct DocumentHeader {
    pub fonts: Vec<FaceName>,
    pub char_shapes: Vec<CharShape>,
    pub para_shapes: Vec<ParaShape>,
    pub styles: Vec<Style>,
}

/// The format-agnostic projection: `(format_tag, header, sections[])`.
#[derive(Debug, Serialize)]
pub struct HwpDocument {
    pub format: FormatTag,
    pub header: DocumentHeader,
    pub sections: Vec<Section>,
}

impl HwpDocument {
    pub fn extract_text(&self) -> Vec<String> {
        self.sections
            .iter()
            .map(|section| {
                section
                    .paragraphs
                    .iter()
                    .map(|p| p.text())
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .collect()
    }

    pub fn get_char_shape(&self, id: usize) -> Option<&CharShape> {
        self.header.char_shapes.get(id)
    }

    pub fn get_para_shape(&self, id: usize) -> Option<&ParaShape> {
        self.header.para_shapes.get(id)
    }

    pub fn get_style(&self, id: usize) -> Option<&Style> {
        self.header.styles.get(id)
    }

    pub fn get_font(&self, id: usize) -> Option<&FaceName> {
        self.header.fonts.get(id)
    }
}
