//! Builds the shared document projection from the archive format's XML
//! parts, using the same `model::paragraph` tree the binary reader builds.

use std::io::Read;

use zip::ZipArchive;

use crate::archive::xml::{self, Element};
use crate::error::{HwpError, Result};
use crate::model::document::{DocumentHeader, FormatTag};
use crate::model::{
    assign_references, CharShape, FaceName, HwpDocument, Image, Paragraph, ParaShape, Row, Run,
    Section, Style, Table, TextBox,
};
use crate::model::paragraph::Cell;

pub fn read(bytes: &[u8]) -> Result<HwpDocument> {
    let mut zip = ZipArchive::new(std::io::Cursor::new(bytes.to_vec()))
        .map_err(|e| HwpError::InvalidFormat(format!("not a valid archive: {e}")))?;

    let header_xml = read_entry(&mut zip, "Contents/header.xml")?;
    let header_doc = xml::parse(&header_xml)?;
    let header = parse_header(&header_doc.root)?;

    let mut sections = Vec::new();
    let mut idx = 0;
    loop {
        let name = format!("Contents/section{idx}.xml");
        let Some(bytes) = try_read_entry(&mut zip, &name) else {
            break;
        };
        let doc = xml::parse(&bytes)?;
        sections.push(parse_section(&doc.root));
        idx += 1;
    }

    if sections.is_empty() {
        return Err(HwpError::InvalidFormat(
            "archive has no Contents/section<n>.xml parts".to_string(),
        ));
    }

    assign_references(&mut sections);

    Ok(HwpDocument {
        format: FormatTag::Archive,
        header,
        sections,
    })
}

fn read_entry(zip: &mut ZipArchive<std::io::Cursor<Vec<u8>>>, name: &str) -> Result<Vec<u8>> {
    try_read_entry(zip, name).ok_or_else(|| HwpError::FileMissing(name.to_string()))
}

fn try_read_entry(zip: &mut ZipArchive<std::io::Cursor<Vec<u8>>>, name: &str) -> Option<Vec<u8>> {
    let mut entry = zip.by_name(name).ok()?;
    let mut buf = Vec::new();
    entry.read_to_end(&mut buf).ok()?;
    Some(buf)
}

fn parse_header(root: &Element) -> Result<DocumentHeader> {
    let ref_list = find_descendant(root, "hh:refList")
        .ok_or_else(|| HwpError::InvalidFormat("header.xml missing hh:refList".to_string()))?;

    let fonts = ref_list
        .first_child_named("hh:fontfaces")
        .map(|faces| {
            faces
                .children_named("hh:fontface")
                .map(parse_fontface)
                .collect()
        })
        .unwrap_or_default();

    let char_shapes = ref_list
        .first_child_named("hh:charProperties")
        .map(|props| props.children_named("hh:charPr").map(parse_char_pr).collect())
        .unwrap_or_default();

    let para_shapes = ref_list
        .first_child_named("hh:paraProperties")
        .map(|props| props.children_named("hh:paraPr").map(parse_para_pr).collect())
        .unwrap_or_default();

    let styles = ref_list
        .first_child_named("hh:styles")
        .map(|styles| styles.children_named("hh:style").map(parse_style).collect())
        .unwrap_or_default();

    Ok(DocumentHeader {
        fonts,
        char_shapes,
        para_shapes,
        styles,
    })
}

fn parse_fontface(el: &Element) -> FaceName {
    FaceName::new_default(el.attr("face").or(el.attr("name")).unwrap_or_default().to_string())
}

fn parse_char_pr(el: &Element) -> CharShape {
    let mut shape = CharShape::new_default();
    if let Some(height) = el.attr("height").and_then(|v| v.parse::<i32>().ok()) {
        shape.base_size = height;
    }
    if let Some((r, g, b)) = el.attr("textColor").and_then(parse_hex_color) {
        shape.set_color_rgb(r, g, b);
    }
    shape.set_bold(el.attr("bold").map(|v| v == "1").unwrap_or(false));
    shape.set_italic(el.attr("italic").map(|v| v == "1").unwrap_or(false));
    shape.set_underline(
        el.first_child_named("hh:underline")
            .and_then(|u| u.attr("type"))
            .map(|t| t != "NONE")
            .unwrap_or(false),
    );
    if let Some(font_ref) = el.first_child_named("hh:fontRef") {
        if let Some(id) = font_ref.attr("hangul").and_then(|v| v.parse().ok()) {
            shape.face_name_ids[0] = id;
        }
    }
    shape
}

fn parse_hex_color(value: &str) -> Option<(u8, u8, u8)> {
    let packed = u32::from_str_radix(value.trim_start_matches('#'), 16).ok()?;
    Some((
        ((packed >> 16) & 0xFF) as u8,
        ((packed >> 8) & 0xFF) as u8,
        (packed & 0xFF) as u8,
    ))
}

fn parse_para_pr(el: &Element) -> ParaShape {
    let mut shape = ParaShape::new_default();
    let alignment_bits = match el
        .first_child_named("hh:align")
        .and_then(|a| a.attr("horizontal"))
    {
        Some("RIGHT") => 1,
        Some("CENTER") => 2,
        Some("JUSTIFY") | Some("DISTRIBUTE") => 3,
        _ => 0,
    };
    shape.properties1 = (shape.properties1 & !(0x7 << 2)) | (alignment_bits << 2);
    if let Some(level) = el
        .first_child_named("hh:heading")
        .and_then(|h| h.attr("level"))
        .and_then(|v| v.parse::<u32>().ok())
    {
        shape.properties2 = (shape.properties2 & !0x7) | (level & 0x7);
    }
    shape
}

fn parse_style(el: &Element) -> Style {
    Style {
        name: el.attr("name").unwrap_or_default().to_string(),
        english_name: el.attr("engName").unwrap_or_default().to_string(),
        properties: 0,
        next_style_id: el
            .attr("nextStyleIDRef")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0),
        lang_id: el.attr("langID").and_then(|v| v.parse().ok()).unwrap_or(0),
        para_shape_id: el
            .attr("paraPrIDRef")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0),
        char_shape_id: el
            .attr("charPrIDRef")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0),
    }
}

fn parse_section(root: &Element) -> Section {
    let mut section = Section::default();
    for child in &root.children {
        let crate::archive::xml::XmlNode::Element(el) = child else {
            continue;
        };
        match el.name.as_str() {
            "hp:p" => section.paragraphs.push(parse_paragraph(el)),
            "hp:tbl" => section.tables.push(parse_table(el)),
            "hp:rect" => section.text_boxes.push(parse_text_box(el)),
            "hp:pic" => section.images.push(parse_image(el)),
            _ => {}
        }
    }
    section
}

fn parse_paragraph(el: &Element) -> Paragraph {
    let para_shape_ref = el.attr("paraPrIDRef").and_then(|v| v.parse().ok()).unwrap_or(0);
    let style_ref = el.attr("styleIDRef").and_then(|v| v.parse().ok()).unwrap_or(0);
    let runs = el
        .children_named("hp:run")
        .map(|run| Run {
            text: run
                .first_child_named("hp:t")
                .map(|t| t.text_content())
                .unwrap_or_default(),
            char_shape_ref: run
                .attr("charPrIDRef")
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
        })
        .collect();
    Paragraph {
        reference: String::new(),
        runs,
        para_shape_ref,
        style_ref,
    }
}

fn parse_table(el: &Element) -> Table {
    let mut table = Table::default();
    for tr in el.children_named("hp:tr") {
        let mut row = Row::default();
        for tc in tr.children_named("hp:tc") {
            let addr = tc.first_child_named("hp:cellAddr");
            let span = tc.first_child_named("hp:cellSpan");
            let col = addr
                .and_then(|a| a.attr("colAddr"))
                .and_then(|v| v.parse().ok())
                .unwrap_or(0);
            let row_idx = addr
                .and_then(|a| a.attr("rowAddr"))
                .and_then(|v| v.parse().ok())
                .unwrap_or(0);
            let col_span = span
                .and_then(|s| s.attr("colSpan"))
                .and_then(|v| v.parse().ok())
                .unwrap_or(1);
            let row_span = span
                .and_then(|s| s.attr("rowSpan"))
                .and_then(|v| v.parse().ok())
                .unwrap_or(1);
            row.cells.push(Cell {
                reference: String::new(),
                paragraphs: tc.children_named("hp:p").map(parse_paragraph).collect(),
                col,
                row: row_idx,
                col_span,
                row_span,
            });
        }
        table.rows.push(row);
    }
    table
}

fn parse_text_box(el: &Element) -> TextBox {
    let paragraphs = el
        .first_child_named("hp:drawText")
        .and_then(|dt| dt.first_child_named("hp:subList"))
        .map(|list| list.children_named("hp:p").map(parse_paragraph).collect())
        .unwrap_or_default();
    TextBox {
        reference: String::new(),
        paragraphs,
    }
}

fn parse_image(el: &Element) -> Image {
    let binary_item = el.first_child_named("hp:img");
    Image {
        reference: String::new(),
        bin_data_path: binary_item
            .and_then(|b| b.attr("binaryItemIDRef"))
            .unwrap_or_default()
            .to_string(),
        width: el.attr("width").and_then(|v| v.parse().ok()).unwrap_or(0),
        height: el.attr("height").and_then(|v| v.parse().ok()).unwrap_or(0),
        format: String::new(),
    }
}

fn find_descendant<'a>(el: &'a Element, name: &str) -> Option<&'a Element> {
    if el.name == name {
        return Some(el);
    }
    for child in &el.children {
        if let crate::archive::xml::XmlNode::Element(child_el) = child {
            if let Some(found) = find_descendant(child_el, name) {
                return Some(found);
            }
        }
    }
    None
}
