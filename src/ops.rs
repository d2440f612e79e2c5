//! The edit-operation vocabulary shared by both mutators. A batch of these is
//! what [`crate::holder::Holder::apply_operations`] accepts; each variant
//! maps to one daemon command (§6.3) and to one binary/archive mutator
//! method pair.

use serde::{Deserialize, Serialize};

use crate::archive::ArchiveMutator;
use crate::error::Result;
use crate::model::reference::{self, ParsedRef};
use crate::mutator::BinaryMutator;

/// `FormatOptions` from the wire protocol: `color` arrives as `#RRGGBB` and
/// is decoded to `(r, g, b)` before reaching a mutator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormatOptions {
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
    #[serde(rename = "fontName")]
    pub font_name: Option<String>,
    #[serde(rename = "fontSize")]
    pub font_size: Option<f64>,
    pub color: Option<String>,
}

impl FormatOptions {
    fn color_rgb(&self) -> Result<Option<(u8, u8, u8)>> {
        let Some(color) = &self.color else { return Ok(None) };
        let hex = color.trim_start_matches('#');
        let packed = u32::from_str_radix(hex, 16)
            .map_err(|_| crate::error::HwpError::InvalidInput(format!("bad color {color}")))?;
        Ok(Some((
            ((packed >> 16) & 0xFF) as u8,
            ((packed >> 8) & 0xFF) as u8,
            (packed & 0xFF) as u8,
        )))
    }
}

/// Folds a `SetFormat`'s separately-parsed `start`/`end` fields into the
/// `(start, end)` pair a mutator's range-based overload expects. The wire
/// protocol only makes sense passing both or neither.
fn format_range(start: Option<usize>, end: Option<usize>) -> Result<Option<(usize, usize)>> {
    match (start, end) {
        (Some(start), Some(end)) => Ok(Some((start, end))),
        (None, None) => Ok(None),
        _ => Err(crate::error::HwpError::InvalidInput(
            "edit-format requires both start and end, or neither".to_string(),
        )),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsertPosition {
    Before,
    After,
    End,
}

#[derive(Debug, Clone)]
pub enum EditOperation {
    SetParagraphText { reference: ParsedRef, text: String },
    SetTableCellText { reference: ParsedRef, text: String },
    SetTextBoxText { reference: ParsedRef, text: String },
    SetFormat { reference: ParsedRef, format: FormatOptions, start: Option<usize>, end: Option<usize> },
    AddTable { section: usize, reference: ParsedRef, rows: usize, cols: usize, cell_text: Vec<String> },
    AddParagraph { reference: ParsedRef, text: String, position: InsertPosition, format: Option<FormatOptions> },
}

impl EditOperation {
    /// `edit-text`/`edit-table-cell` share one wire shape; which mutator
    /// method they reach depends on what the reference addresses.
    pub fn edit_text(reference_str: &str, text: &str) -> Result<Self> {
        let reference = reference::parse(reference_str)?;
        use crate::model::reference::Locator;
        Ok(match reference.locator {
            Locator::Table { cell: Some(_), .. } => {
                Self::SetTableCellText { reference, text: text.to_string() }
            }
            Locator::TextBox { .. } => Self::SetTextBoxText { reference, text: text.to_string() },
            _ => Self::SetParagraphText { reference, text: text.to_string() },
        })
    }

    pub fn edit_format(
        reference_str: &str,
        format: FormatOptions,
        start: Option<usize>,
        end: Option<usize>,
    ) -> Result<Self> {
        Ok(Self::SetFormat { reference: reference::parse(reference_str)?, format, start, end })
    }

    pub fn add_table(
        reference_str: &str,
        rows: usize,
        cols: usize,
        cell_text: Vec<String>,
    ) -> Result<Self> {
        let reference = reference::parse(reference_str)?;
        Ok(Self::AddTable { section: reference.section, reference, rows, cols, cell_text })
    }

    pub fn add_paragraph(
        reference_str: &str,
        text: &str,
        position: InsertPosition,
        format: Option<FormatOptions>,
    ) -> Result<Self> {
        Ok(Self::AddParagraph {
            reference: reference::parse(reference_str)?,
            text: text.to_string(),
            position,
            format,
        })
    }
}

pub fn apply_binary(mutator: &mut BinaryMutator, op: &EditOperation) -> Result<()> {
    match op {
        EditOperation::SetParagraphText { reference, text }
        | EditOperation::SetTableCellText { reference, text }
        | EditOperation::SetTextBoxText { reference, text } => {
            mutator.set_paragraph_text(reference, text)
        }
        EditOperation::SetFormat { reference, format, start, end } => mutator.set_format(
            reference,
            format.bold,
            format.italic,
            format.underline,
            format.font_name.clone(),
            format.font_size,
            format.color_rgb()?,
            format_range(*start, *end)?,
        ),
        EditOperation::AddTable { section, rows, cols, cell_text, .. } => {
            mutator.add_table(*section, *rows, *cols, cell_text)
        }
        EditOperation::AddParagraph { reference, text, position, format } => {
            let (bold, italic, underline, font_name, font_size, color) = match format {
                Some(format) => (
                    format.bold,
                    format.italic,
                    format.underline,
                    format.font_name.clone(),
                    format.font_size,
                    format.color_rgb()?,
                ),
                None => (None, None, None, None, None, None),
            };
            mutator.add_paragraph(reference, text, *position, bold, italic, underline, font_name, font_size, color)
        }
    }
}

pub fn apply_archive(mutator: &mut ArchiveMutator, op: &EditOperation) -> Result<()> {
    match op {
        EditOperation::SetParagraphText { reference, text }
        | EditOperation::SetTableCellText { reference, text }
        | EditOperation::SetTextBoxText { reference, text } => {
            mutator.set_paragraph_text(reference, text)
        }
        EditOperation::SetFormat { reference, format, start, end } => mutator.set_format(
            reference,
            format.bold,
            format.italic,
            format.underline,
            format.font_name.clone(),
            format.font_size,
            format.color_rgb()?,
            format_range(*start, *end)?,
        ),
        EditOperation::AddTable { section, rows, cols, cell_text, .. } => {
            mutator.add_table(*section, *rows, *cols, cell_text)
        }
        EditOperation::AddParagraph { reference, text, position, format } => {
            let (bold, italic, underline, font_name, font_size, color) = match format {
                Some(format) => (
                    format.bold,
                    format.italic,
                    format.underline,
                    format.font_name.clone(),
                    format.font_size,
                    format.color_rgb()?,
                ),
                None => (None, None, None, None, None, None),
            };
            mutator.add_paragraph(reference, text, *position, bold, italic, underline, font_name, font_size, color)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edit_text_targeting_a_cell_picks_table_cell_variant() {
        let op = EditOperation::edit_text("s0.t0.r1.c1", "hi").unwrap();
        assert!(matches!(op, EditOperation::SetTableCellText { .. }));
    }

    #[test]
    fn edit_text_targeting_a_paragraph_picks_paragraph_variant() {
        let op = EditOperation::edit_text("s0.p0", "hi").unwrap();
        assert!(matches!(op, EditOperation::SetParagraphText { .. }));
    }

    #[test]
    fn color_decodes_rrggbb_to_rgb_tuple() {
        let format = FormatOptions { color: Some("#1a2b3c".to_string()), ..Default::default() };
        assert_eq!(format.color_rgb().unwrap(), Some((0x1a, 0x2b, 0x3c)));
    }
}
