//! Walks a decompressed section stream the same way
//! [`crate::parser::body_text::BodyTextParser`] does, but instead of
//! building a document tree it tracks byte offsets so a single target
//! paragraph's records can be patched in place.

use crate::error::{HwpError, Result};
use crate::model::ctrl_header::ControlId;
use crate::model::reference::Locator;
use crate::model::{CtrlHeader, ListHeader};
use crate::ops::InsertPosition;
use crate::parser::record::{self, HwpTag};

pub struct ParaLocation {
    pub header_offset: usize,
    pub header_record_end: usize,
    pub level: u8,
    pub text_offset: Option<usize>,
    pub char_shape_offset: Option<usize>,
    /// Offset one past this paragraph's own records (and any records nested
    /// under it), i.e. where its next sibling begins, or the end of the
    /// stream if it's the last thing in its container.
    pub record_span_end: usize,
}

pub struct ParaBounds {
    pub start: usize,
    pub end: usize,
    pub level: u8,
}

/// The span `locate_paragraph` found for `locator`, reduced to just the byte
/// range an `AddParagraph` `before`/`after` insertion needs.
pub fn paragraph_bounds(data: &[u8], locator: &Locator) -> Option<ParaBounds> {
    let location = locate_paragraph(data, locator)?;
    Some(ParaBounds { start: location.header_offset, end: location.record_span_end, level: location.level })
}

struct OpenParagraph {
    header_offset: usize,
    header_record_end: usize,
    level: u8,
    text_offset: Option<usize>,
    char_shape_offset: Option<usize>,
}

enum Frame {
    Paragraph(OpenParagraph),
    Table { table_index: usize, next_cell: usize, cols: usize },
    Cell { table_index: usize, row: u16, col: u16, para_count: usize },
    TextBox { index: usize, para_count: usize },
}

struct LeveledFrame {
    level: u8,
    frame: Frame,
}

/// Finds the paragraph addressed by `locator` within one section stream.
pub fn locate_paragraph(data: &[u8], locator: &Locator) -> Option<ParaLocation> {
    let mut stack: Vec<LeveledFrame> = Vec::new();
    let mut root_para_count = 0usize;
    let mut root_table_count = 0usize;
    let mut root_textbox_count = 0usize;
    let mut pending_table = false;
    let mut pending_textbox = false;
    let mut result: Option<ParaLocation> = None;

    for record::OffsetRecord { record, offset } in record::iterate(data) {
        let level = record.header.level;
        close_at_or_above(&mut stack, level, locator, &mut root_para_count, &mut result, offset);

        match HwpTag::from_u16(record.tag_id()) {
            Some(HwpTag::ParaHeader) => {
                let record_end = offset + record.header.encoded_len() + record.data.len();
                stack.push(LeveledFrame {
                    level,
                    frame: Frame::Paragraph(OpenParagraph {
                        header_offset: offset,
                        header_record_end: record_end,
                        level,
                        text_offset: None,
                        char_shape_offset: None,
                    }),
                });
            }
            Some(HwpTag::ParaText) => {
                if let Some(LeveledFrame { frame: Frame::Paragraph(open), .. }) = stack.last_mut() {
                    open.text_offset = Some(offset);
                }
            }
            Some(HwpTag::ParaCharShape) => {
                if let Some(LeveledFrame { frame: Frame::Paragraph(open), .. }) = stack.last_mut() {
                    open.char_shape_offset = Some(offset);
                }
            }
            Some(HwpTag::CtrlHeader) => {
                if let Ok(ctrl) = CtrlHeader::from_record(&record) {
                    if ctrl.is_table() {
                        pending_table = true;
                    }
                }
            }
            Some(HwpTag::Table) => {
                if pending_table {
                    pending_table = false;
                    let cols = if record.data.len() >= 8 {
                        u16::from_le_bytes([record.data[6], record.data[7]]) as usize
                    } else {
                        1
                    };
                    let index = root_table_count;
                    root_table_count += 1;
                    stack.push(LeveledFrame {
                        level,
                        frame: Frame::Table { table_index: index, next_cell: 0, cols: cols.max(1) },
                    });
                }
            }
            Some(HwpTag::ShapeComponent) => {
                if record.data.len() >= 4 {
                    let subtype = ControlId::from_reversed_bytes(&record.data[0..4]);
                    if subtype.matches("$rec") {
                        pending_textbox = true;
                    }
                }
            }
            Some(HwpTag::ListHeader) => {
                if let Ok(header) = ListHeader::from_record(&record) {
                    if let Some(LeveledFrame { frame: Frame::Table { table_index, next_cell, cols }, .. }) =
                        stack.last_mut()
                    {
                        let (row, col) = match header.cell_addr {
                            Some(addr) => (addr.row, addr.col),
                            None => {
                                let idx = *next_cell;
                                ((idx / *cols) as u16, (idx % *cols) as u16)
                            }
                        };
                        let table_index = *table_index;
                        *next_cell += 1;
                        stack.push(LeveledFrame {
                            level,
                            frame: Frame::Cell { table_index, row, col, para_count: 0 },
                        });
                    } else if pending_textbox {
                        pending_textbox = false;
                        let index = root_textbox_count;
                        root_textbox_count += 1;
                        stack.push(LeveledFrame {
                            level,
                            frame: Frame::TextBox { index, para_count: 0 },
                        });
                    }
                }
            }
            _ => {}
        }
    }

    close_at_or_above(&mut stack, 0, locator, &mut root_para_count, &mut result, data.len());
    result
}

fn close_at_or_above(
    stack: &mut Vec<LeveledFrame>,
    level: u8,
    locator: &Locator,
    root_para_count: &mut usize,
    result: &mut Option<ParaLocation>,
    closing_offset: usize,
) {
    while matches!(stack.last(), Some(f) if f.level >= level) {
        let LeveledFrame { frame, .. } = stack.pop().unwrap();
        match frame {
            Frame::Paragraph(open) => {
                let matched = match stack.last_mut().map(|f| &mut f.frame) {
                    Some(Frame::Cell { table_index, row, col, para_count }) => {
                        let is_match = matches!(
                            locator,
                            Locator::Table { table, cell: Some(cr) }
                                if *table == *table_index
                                    && cr.row == *row as usize
                                    && cr.col == *col as usize
                                    && cr.paragraph.unwrap_or(0) == *para_count
                        );
                        *para_count += 1;
                        is_match
                    }
                    Some(Frame::TextBox { index, para_count }) => {
                        let is_match = matches!(
                            locator,
                            Locator::TextBox { text_box, paragraph }
                                if *text_box == *index && paragraph.unwrap_or(0) == *para_count
                        );
                        *para_count += 1;
                        is_match
                    }
                    _ => {
                        let is_match =
                            matches!(locator, Locator::Paragraph(p) if *p == *root_para_count);
                        *root_para_count += 1;
                        is_match
                    }
                };
                if matched && result.is_none() {
                    *result = Some(ParaLocation {
                        header_offset: open.header_offset,
                        header_record_end: open.header_record_end,
                        level: open.level,
                        text_offset: open.text_offset,
                        char_shape_offset: open.char_shape_offset,
                        record_span_end: closing_offset,
                    });
                }
            }
            Frame::Table { .. } | Frame::Cell { .. } | Frame::TextBox { .. } => {}
        }
    }
}

/// Resolves the insertion point (byte offset, child level) for an
/// `AddParagraph` targeting `locator` at `position`: end of section/container
/// for `End`, or the anchor paragraph's own span boundary for `before`/`after`.
pub fn insertion_point(data: &[u8], locator: &Locator, position: InsertPosition) -> Result<(usize, u8)> {
    let anchor = |locator: &Locator| {
        paragraph_bounds(data, locator)
            .ok_or_else(|| HwpError::RefNotFound("add_paragraph anchor paragraph not found".to_string()))
    };

    match locator {
        Locator::None => match position {
            InsertPosition::End => Ok((data.len(), 0)),
            InsertPosition::Before | InsertPosition::After => Err(HwpError::InvalidReference(
                "before/after AddParagraph requires a paragraph reference, not a section".to_string(),
            )),
        },
        Locator::Paragraph(_) => match position {
            InsertPosition::End => Ok((data.len(), 0)),
            InsertPosition::Before => anchor(locator).map(|b| (b.start, b.level)),
            InsertPosition::After => anchor(locator).map(|b| (b.end, b.level)),
        },
        Locator::Table { table, cell: Some(cell) } => {
            if cell.paragraph.is_some() && position != InsertPosition::End {
                match position {
                    InsertPosition::Before => anchor(locator).map(|b| (b.start, b.level)),
                    InsertPosition::After => anchor(locator).map(|b| (b.end, b.level)),
                    InsertPosition::End => unreachable!(),
                }
            } else {
                find_container_end(data, ContainerTarget::Cell { table: *table, row: cell.row, col: cell.col })
            }
        }
        Locator::TextBox { text_box, paragraph } => {
            if paragraph.is_some() && position != InsertPosition::End {
                match position {
                    InsertPosition::Before => anchor(locator).map(|b| (b.start, b.level)),
                    InsertPosition::After => anchor(locator).map(|b| (b.end, b.level)),
                    InsertPosition::End => unreachable!(),
                }
            } else {
                find_container_end(data, ContainerTarget::TextBox { index: *text_box })
            }
        }
        _ => Err(HwpError::InvalidReference(
            "AddParagraph target must be a section, table cell, or text box".to_string(),
        )),
    }
}

enum ContainerTarget {
    Cell { table: usize, row: usize, col: usize },
    TextBox { index: usize },
}

fn find_container_end(data: &[u8], target: ContainerTarget) -> Result<(usize, u8)> {
    let mut stack: Vec<LeveledFrame> = Vec::new();
    let mut root_table_count = 0usize;
    let mut root_textbox_count = 0usize;
    let mut pending_table = false;
    let mut pending_textbox = false;

    for record::OffsetRecord { record, offset } in record::iterate(data) {
        let level = record.header.level;

        while matches!(stack.last(), Some(f) if f.level >= level) {
            let LeveledFrame { level: closed_level, frame } = stack.pop().unwrap();
            let is_target = match (&frame, &target) {
                (Frame::Cell { table_index, row, col, .. }, ContainerTarget::Cell { table, row: r, col: c }) => {
                    *table_index == *table && *row as usize == *r && *col as usize == *c
                }
                (Frame::TextBox { index, .. }, ContainerTarget::TextBox { index: want }) => index == want,
                _ => false,
            };
            if is_target {
                return Ok((offset, closed_level + 1));
            }
        }

        match HwpTag::from_u16(record.tag_id()) {
            Some(HwpTag::CtrlHeader) => {
                if let Ok(ctrl) = CtrlHeader::from_record(&record) {
                    if ctrl.is_table() {
                        pending_table = true;
                    }
                }
            }
            Some(HwpTag::Table) => {
                if pending_table {
                    pending_table = false;
                    let cols = if record.data.len() >= 8 {
                        u16::from_le_bytes([record.data[6], record.data[7]]) as usize
                    } else {
                        1
                    };
                    let index = root_table_count;
                    root_table_count += 1;
                    stack.push(LeveledFrame {
                        level,
                        frame: Frame::Table { table_index: index, next_cell: 0, cols: cols.max(1) },
                    });
                }
            }
            Some(HwpTag::ShapeComponent) => {
                if record.data.len() >= 4 {
                    let subtype = ControlId::from_reversed_bytes(&record.data[0..4]);
                    if subtype.matches("$rec") {
                        pending_textbox = true;
                    }
                }
            }
            Some(HwpTag::ListHeader) => {
                if let Ok(header) = ListHeader::from_record(&record) {
                    if let Some(LeveledFrame { frame: Frame::Table { table_index, next_cell, cols }, .. }) =
                        stack.last_mut()
                    {
                        let (row, col) = match header.cell_addr {
                            Some(addr) => (addr.row, addr.col),
                            None => {
                                let idx = *next_cell;
                                ((idx / *cols) as u16, (idx % *cols) as u16)
                            }
                        };
                        let table_index = *table_index;
                        *next_cell += 1;
                        stack.push(LeveledFrame {
                            level,
                            frame: Frame::Cell { table_index, row, col, para_count: 0 },
                        });
                    } else if pending_textbox {
                        pending_textbox = false;
                        let index = root_textbox_count;
                        root_textbox_count += 1;
                        stack.push(LeveledFrame {
                            level,
                            frame: Frame::TextBox { index, para_count: 0 },
                        });
                    }
                }
            }
            _ => {}
        }
    }

    while let Some(LeveledFrame { level: closed_level, frame }) = stack.pop() {
        let is_target = match (&frame, &target) {
            (Frame::Cell { table_index, row, col, .. }, ContainerTarget::Cell { table, row: r, col: c }) => {
                *table_index == *table && *row as usize == *r && *col as usize == *c
            }
            (Frame::TextBox { index, .. }, ContainerTarget::TextBox { index: want }) => index == want,
            _ => false,
        };
        if is_target {
            return Ok((data.len(), closed_level + 1));
        }
    }

    Err(HwpError::RefNotFound("add_paragraph target container not found".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::reference;

    #[test]
    fn locates_top_level_paragraph_text_record() {
        let header_payload = vec![0u8; 12];
        let text = "hi".encode_utf16().flat_map(|u| u.to_le_bytes()).collect::<Vec<_>>();
        let mut stream = Vec::new();
        stream.extend(record::build(HwpTag::ParaHeader as u16, 0, &header_payload));
        stream.extend(record::build(HwpTag::ParaText as u16, 1, &text));

        let reference = reference::parse("s0.p0").unwrap();
        let location = locate_paragraph(&stream, &reference.locator).unwrap();
        assert_eq!(location.text_offset, Some(16));
    }
}
