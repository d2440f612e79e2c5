use crate::error::Result;
use crate::model::bin_data::BinData;
use crate::model::ctrl_header::ControlId;
use crate::model::{
    Cell, CtrlHeader, Image, ListHeader, ParaCharShape, Paragraph, Run, Section, ShapeComponent,
    ShapeComponentPicture, Table, TextBox,
};
use crate::parser::record::{self, HwpTag};
use crate::utils::compression::decompress_stream;
use crate::utils::encoding::{decode_para_text_units, units_from_le_bytes};

/// Scope opened while walking a section's record stream. Every kind tracks
/// the level its opening record was found at so the generic "pop everything
/// at or above this level" rule (the same rule the format uses to close a
/// paragraph on the next `PARA_HEADER`) closes it too.
struct LeveledFrame {
    level: u8,
    frame: Frame,
}

enum Frame {
    Paragraph(OpenParagraph),
    Table {
        table: Table,
        next_cell: usize,
    },
    Cell {
        row: u16,
        col: u16,
        col_span: u16,
        row_span: u16,
        paragraphs: Vec<Paragraph>,
    },
    TextBox {
        paragraphs: Vec<Paragraph>,
    },
}

struct OpenParagraph {
    para_shape_ref: u16,
    style_ref: u8,
    text_units: Option<Vec<u16>>,
    char_shape: Option<ParaCharShape>,
}

impl OpenParagraph {
    fn into_paragraph(self) -> Paragraph {
        let units = self.text_units.unwrap_or_default();
        let runs = match self.char_shape {
            Some(shape) if shape.char_positions.len() > 1 => split_runs(&units, &shape),
            Some(shape) => vec![Run {
                text: decode_para_text_units(&units),
                char_shape_ref: shape
                    .char_positions
                    .first()
                    .map(|p| p.char_shape_id)
                    .unwrap_or(0),
            }],
            None => vec![Run {
                text: decode_para_text_units(&units),
                char_shape_ref: 0,
            }],
        };
        Paragraph {
            reference: String::new(),
            runs,
            para_shape_ref: self.para_shape_ref,
            style_ref: self.style_ref,
        }
    }
}

/// Splits decoded text at each `PARA_CHAR_SHAPE` entry's code-unit position,
/// producing one run per entry. Positions are in code units, not visible
/// characters, so the split happens before control-code decoding collapses
/// any of them.
fn split_runs(units: &[u16], shape: &ParaCharShape) -> Vec<Run> {
    let mut runs = Vec::with_capacity(shape.char_positions.len());
    for (i, entry) in shape.char_positions.iter().enumerate() {
        let start = entry.position as usize;
        if start >= units.len() {
            continue;
        }
        let end = shape
            .char_positions
            .get(i + 1)
            .map(|next| (next.position as usize).min(units.len()))
            .unwrap_or(units.len());
        runs.push(Run {
            text: decode_para_text_units(&units[start..end]),
            char_shape_ref: entry.char_shape_id,
        });
    }
    runs
}

pub struct BodyTextParser;

impl BodyTextParser {
    /// Parses one `BodyText/Section<n>` stream. `bin_data` resolves image
    /// shapes to their stored binary data so `bin_data_path`/`format` can be
    /// filled in without a second pass.
    pub fn parse(data: Vec<u8>, is_compressed: bool, bin_data: &[BinData]) -> Result<Section> {
        let data = if is_compressed {
            decompress_stream(&data)?
        } else {
            data
        };

        let mut section = Section::default();
        let mut stack: Vec<LeveledFrame> = Vec::new();

        // Tracks the CTRL_HEADER / SHAPE_COMPONENT lookahead chains: a
        // pending table waits for its TABLE record, a pending drawing object
        // waits to learn whether it's a text box (`$rec`) or a picture.
        let mut pending_table = false;
        let mut pending_textbox = false;
        let mut pending_picture: Option<ShapeComponent> = None;

        for record::OffsetRecord { record, .. } in record::iterate(&data) {
            let level = record.header.level;

            close_frames_at_or_above(&mut stack, &mut section, level);

            match HwpTag::from_u16(record.tag_id()) {
                Some(HwpTag::ParaHeader) => {
                    let (para_shape_ref, style_ref) = parse_para_header(&record.data);
                    stack.push(LeveledFrame {
                        level,
                        frame: Frame::Paragraph(OpenParagraph {
                            para_shape_ref,
                            style_ref,
                            text_units: None,
                            char_shape: None,
                        }),
                    });
                }
                Some(HwpTag::ParaText) => {
                    if let Some(LeveledFrame {
                        frame: Frame::Paragraph(open),
                        ..
                    }) = stack.last_mut()
                    {
                        open.text_units = Some(units_from_le_bytes(&record.data));
                    }
                }
                Some(HwpTag::ParaCharShape) => {
                    if let Ok(shape) = ParaCharShape::from_record(&record) {
                        if let Some(LeveledFrame {
                            frame: Frame::Paragraph(open),
                            ..
                        }) = stack.last_mut()
                        {
                            open.char_shape = Some(shape);
                        }
                    }
                }
                Some(HwpTag::CtrlHeader) => {
                    if let Ok(ctrl) = CtrlHeader::from_record(&record) {
                        if ctrl.is_table() {
                            pending_table = true;
                        }
                        // `gso ` itself doesn't decide table vs. picture vs.
                        // text box; that's settled by the SHAPE_COMPONENT
                        // subtype that follows.
                    }
                }
                Some(HwpTag::Table) => {
                    if pending_table {
                        pending_table = false;
                        let table = parse_table_grid(&record.data);
                        stack.push(LeveledFrame {
                            level,
                            frame: Frame::Table {
                                table,
                                next_cell: 0,
                            },
                        });
                    }
                }
                Some(HwpTag::ShapeComponent) => {
                    if record.data.len() >= 4 {
                        let subtype = ControlId::from_reversed_bytes(&record.data[0..4]);
                        if subtype.matches("$rec") {
                            pending_textbox = true;
                        } else if let Ok(shape) = ShapeComponent::from_record(&record) {
                            pending_picture = Some(shape);
                        }
                    }
                }
                Some(HwpTag::ShapeComponentPicture) => {
                    if let (Some(shape), Ok(picture)) = (
                        pending_picture.take(),
                        ShapeComponentPicture::from_record(&record),
                    ) {
                        let bin = bin_data.iter().find(|b| b.bin_id == picture.bin_data_id);
                        section.images.push(Image {
                            reference: String::new(),
                            bin_data_path: bin.map(|b| b.rel_name.clone()).unwrap_or_default(),
                            width: shape.width,
                            height: shape.height,
                            format: bin.map(|b| b.extension.clone()).unwrap_or_default(),
                        });
                    }
                }
                Some(HwpTag::ListHeader) => {
                    if let Ok(header) = ListHeader::from_record(&record) {
                        if let Some(LeveledFrame {
                            frame: Frame::Table { next_cell, table },
                            ..
                        }) = stack.last_mut()
                        {
                            let cols = table.col_count().max(1);
                            let (row, col, col_span, row_span) = match header.cell_addr {
                                Some(addr) => (
                                    addr.row,
                                    addr.col,
                                    addr.col_span.max(1),
                                    addr.row_span.max(1),
                                ),
                                None => {
                                    let idx = *next_cell;
                                    ((idx / cols) as u16, (idx % cols) as u16, 1, 1)
                                }
                            };
                            *next_cell += 1;
                            stack.push(LeveledFrame {
                                level,
                                frame: Frame::Cell {
                                    row,
                                    col,
                                    col_span,
                                    row_span,
                                    paragraphs: Vec::new(),
                                },
                            });
                        } else if pending_textbox {
                            pending_textbox = false;
                            stack.push(LeveledFrame {
                                level,
                                frame: Frame::TextBox {
                                    paragraphs: Vec::new(),
                                },
                            });
                        }
                    }
                }
                _ => {}
            }
        }

        close_frames_at_or_above(&mut stack, &mut section, 0);
        Ok(section)
    }
}

/// Closes (pops and attaches) every frame whose level is `>= level`,
/// generalizing the "new `PARA_HEADER` at level L closes every scope with
/// level >= L" rule to every scope kind, not just paragraphs.
fn close_frames_at_or_above(stack: &mut Vec<LeveledFrame>, section: &mut Section, level: u8) {
    while matches!(stack.last(), Some(f) if f.level >= level) {
        let LeveledFrame { frame, .. } = stack.pop().unwrap();
        attach(stack, section, frame);
    }
}

fn attach(stack: &mut [LeveledFrame], section: &mut Section, frame: Frame) {
    match frame {
        Frame::Paragraph(open) => {
            let para = open.into_paragraph();
            match stack.last_mut().map(|f| &mut f.frame) {
                Some(Frame::Cell { paragraphs, .. }) => paragraphs.push(para),
                Some(Frame::TextBox { paragraphs }) => paragraphs.push(para),
                _ => section.paragraphs.push(para),
            }
        }
        Frame::Cell {
            row,
            col,
            col_span,
            row_span,
            paragraphs,
        } => {
            if let Some(Frame::Table { table, .. }) = stack.last_mut().map(|f| &mut f.frame) {
                while table.rows.len() <= row as usize {
                    table.rows.push(Default::default());
                }
                table.rows[row as usize].cells.push(Cell {
                    reference: String::new(),
                    paragraphs,
                    col,
                    row,
                    col_span,
                    row_span,
                });
            }
        }
        Frame::Table { table, .. } => section.tables.push(table),
        Frame::TextBox { paragraphs } => section.text_boxes.push(TextBox {
            reference: String::new(),
            paragraphs,
        }),
    }
}

/// `PARA_HEADER` layout (24 bytes, minimum 12): `[8..10]` para-shape ref,
/// `[10..11]` style ref.
fn parse_para_header(data: &[u8]) -> (u16, u8) {
    if data.len() < 11 {
        return (0, 0);
    }
    let para_shape_ref = u16::from_le_bytes([data[8], data[9]]);
    let style_ref = data[10];
    (para_shape_ref, style_ref)
}

/// `TABLE` record: row/col counts follow a `u32` properties field.
fn parse_table_grid(data: &[u8]) -> Table {
    if data.len() < 8 {
        return Table::default();
    }
    let rows = u16::from_le_bytes([data[4], data[5]]) as usize;
    let cols = u16::from_le_bytes([data[6], data[7]]) as usize;
    let mut table = Table::default();
    table.rows = (0..rows)
        .map(|_| crate::model::paragraph::Row {
            cells: Vec::with_capacity(cols),
        })
        .collect();
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::record::build;

    #[test]
    fn parses_single_top_level_paragraph() {
        let mut header_payload = vec![0u8; 12];
        header_payload[8] = 1; // para_shape_ref = 1
        header_payload[10] = 2; // style_ref = 2
        let text = "hi".encode_utf16().flat_map(|u| u.to_le_bytes()).collect::<Vec<_>>();

        let mut stream = Vec::new();
        stream.extend(build(HwpTag::ParaHeader as u16, 0, &header_payload));
        stream.extend(build(HwpTag::ParaText as u16, 1, &text));

        let section = BodyTextParser::parse(stream, false, &[]).unwrap();
        assert_eq!(section.paragraphs.len(), 1);
        assert_eq!(section.paragraphs[0].text(), "hi");
        assert_eq!(section.paragraphs[0].para_shape_ref, 1);
        assert_eq!(section.paragraphs[0].style_ref, 2);
    }

    #[test]
    fn splits_runs_on_multiple_char_shape_entries() {
        let header_payload = vec![0u8; 12];
        let text = "abcd".encode_utf16().flat_map(|u| u.to_le_bytes()).collect::<Vec<_>>();
        let mut shapes = Vec::new();
        shapes.extend_from_slice(&0u32.to_le_bytes());
        shapes.extend_from_slice(&10u32.to_le_bytes());
        shapes.extend_from_slice(&2u32.to_le_bytes());
        shapes.extend_from_slice(&20u32.to_le_bytes());

        let mut stream = Vec::new();
        stream.extend(build(HwpTag::ParaHeader as u16, 0, &header_payload));
        stream.extend(build(HwpTag::ParaText as u16, 1, &text));
        stream.extend(build(HwpTag::ParaCharShape as u16, 1, &shapes));

        let section = BodyTextParser::parse(stream, false, &[]).unwrap();
        assert_eq!(section.paragraphs[0].runs.len(), 2);
        assert_eq!(section.paragraphs[0].runs[0].text, "ab");
        assert_eq!(section.paragraphs[0].runs[1].text, "cd");
        assert_eq!(section.paragraphs[0].runs[1].char_shape_ref, 20);
    }

    #[test]
    fn groups_cells_under_a_table() {
        let outer_header = vec![0u8; 12];
        let mut ctrl_payload = Vec::new();
        ctrl_payload.extend_from_slice(b" lbt"); // "tbl " in reversed on-disk byte order
        ctrl_payload.extend_from_slice(&0u32.to_le_bytes());

        let mut table_payload = vec![0u8; 8];
        table_payload[4..6].copy_from_slice(&1u16.to_le_bytes());
        table_payload[6..8].copy_from_slice(&2u16.to_le_bytes());

        let mut cell_a = vec![0u8; 6];
        cell_a.extend_from_slice(&0u16.to_le_bytes()); // col
        cell_a.extend_from_slice(&0u16.to_le_bytes()); // row
        cell_a.extend_from_slice(&1u16.to_le_bytes());
        cell_a.extend_from_slice(&1u16.to_le_bytes());

        let mut cell_b = vec![0u8; 6];
        cell_b.extend_from_slice(&1u16.to_le_bytes());
        cell_b.extend_from_slice(&0u16.to_le_bytes());
        cell_b.extend_from_slice(&1u16.to_le_bytes());
        cell_b.extend_from_slice(&1u16.to_le_bytes());

        let cell_para_header = vec![0u8; 12];
        let cell_text = "x".encode_utf16().flat_map(|u| u.to_le_bytes()).collect::<Vec<_>>();

        let mut stream = Vec::new();
        stream.extend(build(HwpTag::ParaHeader as u16, 0, &outer_header));
        stream.extend(build(HwpTag::CtrlHeader as u16, 1, &ctrl_payload));
        stream.extend(build(HwpTag::Table as u16, 2, &table_payload));
        stream.extend(build(HwpTag::ListHeader as u16, 3, &cell_a));
        stream.extend(build(HwpTag::ParaHeader as u16, 4, &cell_para_header));
        stream.extend(build(HwpTag::ParaText as u16, 5, &cell_text));
        stream.extend(build(HwpTag::ListHeader as u16, 3, &cell_b));

        let section = BodyTextParser::parse(stream, false, &[]).unwrap();
        assert_eq!(section.tables.len(), 1);
        assert_eq!(section.tables[0].rows[0].cells.len(), 2);
        assert_eq!(section.tables[0].rows[0].cells[0].paragraphs[0].text(), "x");
    }
}
