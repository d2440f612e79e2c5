//! The format-agnostic document projection described by the data model: a
//! section is four ordered collections (paragraphs, tables, images, text
//! boxes); everything below a paragraph is a run. Both the binary and the
//! archive reader build this same tree so the rest of the crate (mutators,
//! reference resolution, the holder) never has to branch on format.

use serde::Serialize;

use crate::model::reference::{self, CellRef, Locator, ParsedRef};

#[derive(Debug, Default, Clone, Serialize)]
pub struct Section {
    pub paragraphs: Vec<Paragraph>,
    pub tables: Vec<Table>,
    pub images: Vec<Image>,
    pub text_boxes: Vec<TextBox>,
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct Paragraph {
    pub reference: String,
    pub runs: Vec<Run>,
    pub para_shape_ref: u16,
    pub style_ref: u8,
}

impl Paragraph {
    /// Concatenated visible text across every run, with no gaps.
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Run {
    pub text: String,
    pub char_shape_ref: u32,
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct Table {
    pub reference: String,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn col_count(&self) -> usize {
        self.rows
            .first()
            .map(|r| r.cells.iter().map(|c| c.col_span as usize).sum())
            .unwrap_or(0)
    }
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct Row {
    pub cells: Vec<Cell>,
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct Cell {
    pub reference: String,
    pub paragraphs: Vec<Paragraph>,
    pub col: u16,
    pub row: u16,
    pub col_span: u16,
    pub row_span: u16,
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct TextBox {
    pub reference: String,
    pub paragraphs: Vec<Paragraph>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Image {
    pub reference: String,
    pub bin_data_path: String,
    pub width: i32,
    pub height: i32,
    pub format: String,
}

/// Stamps every entity's `reference` field from its position in the tree.
/// Called once after parsing and again after any structural mutation
/// (`AddTable`/`AddParagraph`) that can shift indices.
pub fn assign_references(sections: &mut [Section]) {
    for (s_idx, section) in sections.iter_mut().enumerate() {
        for (p_idx, para) in section.paragraphs.iter_mut().enumerate() {
            para.reference = reference::build(&ParsedRef {
                section: s_idx,
                locator: Locator::Paragraph(p_idx),
                run: None,
            });
        }
        for (t_idx, table) in section.tables.iter_mut().enumerate() {
            table.reference = reference::build(&ParsedRef {
                section: s_idx,
                locator: Locator::Table {
                    table: t_idx,
                    cell: None,
                },
                run: None,
            });
            for row in table.rows.iter_mut() {
                for cell in row.cells.iter_mut() {
                    cell.reference = reference::build(&ParsedRef {
                        section: s_idx,
                        locator: Locator::Table {
                            table: t_idx,
                            cell: Some(CellRef {
                                row: cell.row as usize,
                                col: cell.col as usize,
                                paragraph: None,
                            }),
                        },
                        run: None,
                    });
                    for (p_idx, para) in cell.paragraphs.iter_mut().enumerate() {
                        para.reference = reference::build(&ParsedRef {
                            section: s_idx,
                            locator: Locator::Table {
                                table: t_idx,
                                cell: Some(CellRef {
                                    row: cell.row as usize,
                                    col: cell.col as usize,
                                    paragraph: Some(p_idx),
                                }),
                            },
                            run: None,
                        });
                    }
                }
            }
        }
        for (tb_idx, text_box) in section.text_boxes.iter_mut().enumerate() {
            text_box.reference = reference::build(&ParsedRef {
                section: s_idx,
                locator: Locator::TextBox {
                    text_box: tb_idx,
                    paragraph: None,
                },
                run: None,
            });
            for (p_idx, para) in text_box.paragraphs.iter_mut().enumerate() {
                para.reference = reference::build(&ParsedRef {
                    section: s_idx,
                    locator: Locator::TextBox {
                        text_box: tb_idx,
                        paragraph: Some(p_idx),
                    },
                    run: None,
                });
            }
        }
        for (i_idx, image) in section.images.iter_mut().enumerate() {
            image.reference = reference::build(&ParsedRef {
                section: s_idx,
                locator: Locator::Image(i_idx),
                run: None,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stamps_nested_references() {
        let mut sections = vec![Section {
            paragraphs: vec![Paragraph::default()],
            tables: vec![Table {
                rows: vec![Row {
                    cells: vec![Cell {
                        paragraphs: vec![Paragraph::default()],
                        col: 0,
                        row: 0,
                        col_span: 1,
                        row_span: 1,
                        ..Default::default()
                    }],
                }],
                ..Default::default()
            }],
            ..Default::default()
        }];
        assign_references(&mut sections);
        assert_eq!(sections[0].paragraphs[0].reference, "s0.p0");
        assert_eq!(sections[0].tables[0].reference, "s0.t0");
        assert_eq!(sections[0].tables[0].rows[0].cells[0].reference, "s0.t0.r0.c0");
        assert_eq!(
            sections[0].tables[0].rows[0].cells[0].paragraphs[0].reference,
            "s0.t0.r0.c0.p0"
        );
    }
}
