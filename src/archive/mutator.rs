//! Order-preserving edits over the archive format's XML parts. Untouched
//! ZIP entries are carried through byte-for-byte; only the header and the
//! section(s) actually touched are re-serialized.

use std::collections::HashSet;
use std::io::{Cursor, Read, Write};

use zip::{ZipArchive, ZipWriter};

use crate::archive::xml::{self, Element, XmlDocument, XmlNode};
use crate::error::{HwpError, Result};
use crate::model::reference::{CellRef, Locator, ParsedRef};
use crate::ops::InsertPosition;

const HEADER_PATH: &str = "Contents/header.xml";

pub struct ArchiveMutator {
    /// Original archive bytes, kept so `to_bytes` can reopen a [`ZipArchive`]
    /// and `raw_copy_file` any entry this mutator never touched, instead of
    /// decompressing and recompressing it for no reason.
    source_bytes: Vec<u8>,
    entries: Vec<String>,
    header_doc: XmlDocument,
    section_docs: Vec<XmlDocument>,
    dirty_header: bool,
    dirty_sections: HashSet<usize>,
}

impl ArchiveMutator {
    pub fn load(bytes: &[u8]) -> Result<Self> {
        let mut zip = ZipArchive::new(Cursor::new(bytes.to_vec()))
            .map_err(|e| HwpError::InvalidFormat(format!("not a valid archive: {e}")))?;

        let mut entries = Vec::with_capacity(zip.len());
        let mut header_bytes = None;
        let mut section_buffers: Vec<(usize, Vec<u8>)> = Vec::new();
        for i in 0..zip.len() {
            let mut entry = zip
                .by_index(i)
                .map_err(|e| HwpError::InvalidFormat(e.to_string()))?;
            let name = entry.name().to_string();
            if name == HEADER_PATH {
                let mut buf = Vec::new();
                entry.read_to_end(&mut buf)?;
                header_bytes = Some(buf);
            } else if let Some(idx) = section_index(&name) {
                let mut buf = Vec::new();
                entry.read_to_end(&mut buf)?;
                section_buffers.push((idx, buf));
            }
            entries.push(name);
        }

        let header_bytes = header_bytes.ok_or_else(|| HwpError::FileMissing(HEADER_PATH.to_string()))?;
        let header_doc = xml::parse(&header_bytes)?;

        section_buffers.sort_by_key(|(idx, _)| *idx);
        let mut section_docs = Vec::new();
        for (expected, (idx, buf)) in section_buffers.iter().enumerate() {
            if *idx != expected {
                break;
            }
            section_docs.push(xml::parse(buf)?);
        }

        Ok(Self {
            source_bytes: bytes.to_vec(),
            entries,
            header_doc,
            section_docs,
            dirty_header: false,
            dirty_sections: HashSet::new(),
        })
    }

    pub fn section_count(&self) -> usize {
        self.section_docs.len()
    }

    pub fn set_paragraph_text(&mut self, reference: &ParsedRef, text: &str) -> Result<()> {
        let section = self.section_mut(reference.section)?;
        let para = find_paragraph_mut(section, &reference.locator)
            .ok_or_else(|| HwpError::RefNotFound(crate::model::reference::build(reference)))?;
        replace_paragraph_text(para, text);
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

        let (source_id, full_text) = {
            let section = self.section_mut(section_idx)?;
            let para = find_paragraph_mut(section, &reference.locator)
                .ok_or_else(|| HwpError::RefNotFound(crate::model::reference::build(reference)))?;
            let source_id = para
                .children_named("hp:run")
                .next()
                .and_then(|r| r.attr("charPrIDRef"))
                .map(|s| s.to_string());
            let full_text = paragraph_text(para);
            (source_id, full_text)
        };

        if let Some((start, end)) = range {
            let len = full_text.chars().count();
            if start > end || end > len {
                return Err(HwpError::RangeOutOfBounds(format!(
                    "range {start}..{end} out of bounds for paragraph of length {len}"
                )));
            }
        }

        let new_id = self.append_char_pr(
            source_id.as_deref(),
            bold,
            italic,
            underline,
            font_name.as_deref(),
            size_points,
            color_rgb,
        )?;

        let section = self.section_mut(section_idx)?;
        let para = find_paragraph_mut(section, &reference.locator)
            .ok_or_else(|| HwpError::RefNotFound(crate::model::reference::build(reference)))?;

        match range {
            Some((start, end)) => {
                let source_ref = source_id.unwrap_or_else(|| "0".to_string());
                let chars: Vec<char> = full_text.chars().collect();
                let mut new_runs = Vec::with_capacity(3);
                if start > 0 {
                    new_runs.push(build_run(&source_ref, &chars[..start].iter().collect::<String>()));
                }
                new_runs.push(build_run(&new_id.to_string(), &chars[start..end].iter().collect::<String>()));
                if end < chars.len() {
                    new_runs.push(build_run(&source_ref, &chars[end..].iter().collect::<String>()));
                }
                para.children.retain(|c| !matches!(c, XmlNode::Element(e) if e.name == "hp:run"));
                for run in new_runs {
                    para.children.push(XmlNode::Element(run));
                }
            }
            None => {
                for run in para.children.iter_mut() {
                    if let XmlNode::Element(run) = run {
                        if run.name == "hp:run" {
                            run.set_attr("charPrIDRef", new_id.to_string());
                        }
                    }
                }
            }
        }
        self.dirty_sections.insert(section_idx);
        Ok(())
    }

    /// Deep-clones `source_id`'s `hh:charPr` (or a bare default if absent),
    /// applies the given overrides, and appends it to the header's
    /// `hh:charProperties` table. Shared by [`Self::set_format`] and
    /// [`Self::add_paragraph`]'s inline-format path.
    #[allow(clippy::too_many_arguments)]
    fn append_char_pr(
        &mut self,
        source_id: Option<&str>,
        bold: Option<bool>,
        italic: Option<bool>,
        underline: Option<bool>,
        font_name: Option<&str>,
        size_points: Option<f64>,
        color_rgb: Option<(u8, u8, u8)>,
    ) -> Result<u32> {
        let new_id = self.next_char_pr_id();

        let char_properties = self
            .header_doc
            .root
            .first_child_named("hh:head")
            .and_then(|h| h.first_child_named("hh:refList"))
            .and_then(|r| r.first_child_named("hh:charProperties"));
        let source = source_id.and_then(|id| {
            char_properties.and_then(|cp| cp.children_named("hh:charPr").find(|c| c.attr("id") == Some(id)))
        });
        let mut new_char_pr = source.cloned().unwrap_or_else(default_char_pr);
        new_char_pr.set_attr("id", new_id.to_string());
        if let Some(bold) = bold {
            new_char_pr.set_attr("bold", if bold { "1" } else { "0" });
        }
        if let Some(italic) = italic {
            new_char_pr.set_attr("italic", if italic { "1" } else { "0" });
        }
        if let Some(underline) = underline {
            if let Some(u) = new_char_pr.first_child_named_mut("hh:underline") {
                u.set_attr("type", if underline { "BOTTOM" } else { "NONE" });
            }
        }
        if let Some(points) = size_points {
            new_char_pr.set_attr("height", ((points * 100.0).round() as i64).to_string());
        }
        if let Some((r, g, b)) = color_rgb {
            let encoded = ((r as u32) << 16) | ((g as u32) << 8) | b as u32;
            new_char_pr.set_attr("textColor", format!("#{encoded:06X}"));
        }
        if let Some(font_name) = font_name {
            let face_id = self.append_font_face(font_name)?;
            match new_char_pr.first_child_named_mut("hh:fontRef") {
                Some(font_ref) => font_ref.set_attr("hangul", face_id.to_string()),
                None => {
                    let font_ref = Element {
                        name: "hh:fontRef".to_string(),
                        attrs: vec![("hangul".to_string(), face_id.to_string())],
                        children: Vec::new(),
                        self_closing: true,
                    };
                    new_char_pr.children.push(XmlNode::Element(font_ref));
                }
            }
        }

        let ref_list_mut = self
            .header_doc
            .root
            .first_child_named_mut("hh:head")
            .and_then(|h| h.first_child_named_mut("hh:refList"))
            .and_then(|r| r.first_child_named_mut("hh:charProperties"))
            .ok_or_else(|| HwpError::InvalidFormat("header.xml missing hh:charProperties".to_string()))?;
        ref_list_mut.children.push(XmlNode::Element(new_char_pr));
        self.dirty_header = true;
        Ok(new_id)
    }

    pub fn add_table(&mut self, section_idx: usize, rows: usize, cols: usize, cell_text: &[String]) -> Result<()> {
        let table = build_table_element(rows, cols, cell_text);
        let section = self.section_mut(section_idx)?;
        section.children.push(XmlNode::Element(table));
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
        let char_pr_id = if bold.is_some()
            || italic.is_some()
            || underline.is_some()
            || font_name.is_some()
            || size_points.is_some()
            || color_rgb.is_some()
        {
            self.append_char_pr(None, bold, italic, underline, font_name.as_deref(), size_points, color_rgb)?
        } else {
            0
        };
        let new_para = build_paragraph_element(text, char_pr_id);
        let section = self.section_mut(section_idx)?;

        match position {
            InsertPosition::End => {
                let container = match &reference.locator {
                    Locator::None => section,
                    other => find_container_mut(section, other)
                        .ok_or_else(|| HwpError::RefNotFound(crate::model::reference::build(reference)))?,
                };
                container.children.push(XmlNode::Element(new_para));
            }
            InsertPosition::Before | InsertPosition::After => {
                let anchor = paragraph_index(&reference.locator).ok_or_else(|| {
                    HwpError::InvalidReference(
                        "before/after AddParagraph requires a paragraph reference, not a section".to_string(),
                    )
                })?;
                let container = paragraph_container_mut(section, &reference.locator)
                    .ok_or_else(|| HwpError::RefNotFound(crate::model::reference::build(reference)))?;
                let anchor_at = nth_element_index(container, "hp:p", anchor)
                    .ok_or_else(|| HwpError::RefNotFound(crate::model::reference::build(reference)))?;
                let insert_at = match position {
                    InsertPosition::Before => anchor_at,
                    InsertPosition::After => anchor_at + 1,
                    InsertPosition::End => unreachable!(),
                };
                container.children.insert(insert_at, XmlNode::Element(new_para));
            }
        }
        self.dirty_sections.insert(section_idx);
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut source = ZipArchive::new(Cursor::new(self.source_bytes.clone()))
            .map_err(|e| HwpError::Io(std::io::Error::other(e.to_string())))?;
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default();

        for (i, name) in self.entries.iter().enumerate() {
            let rewritten = if name == HEADER_PATH && self.dirty_header {
                Some(xml::serialize(&self.header_doc)?)
            } else if let Some(idx) = section_index(name) {
                self.dirty_sections.contains(&idx).then(|| xml::serialize(&self.section_docs[idx])).transpose()?
            } else {
                None
            };

            match rewritten {
                Some(payload) => {
                    writer
                        .start_file(name, options)
                        .map_err(|e| HwpError::Io(std::io::Error::other(e.to_string())))?;
                    writer.write_all(&payload)?;
                }
                None => {
                    let entry = source
                        .by_index_raw(i)
                        .map_err(|e| HwpError::Io(std::io::Error::other(e.to_string())))?;
                    writer
                        .raw_copy_file(entry)
                        .map_err(|e| HwpError::Io(std::io::Error::other(e.to_string())))?;
                }
            }
        }

        let cursor = writer
            .finish()
            .map_err(|e| HwpError::Io(std::io::Error::other(e.to_string())))?;
        Ok(cursor.into_inner())
    }

    fn section_mut(&mut self, idx: usize) -> Result<&mut Element> {
        self.section_docs
            .get_mut(idx)
            .map(|doc| &mut doc.root)
            .ok_or_else(|| HwpError::RefNotFound(format!("s{idx}")))
    }

    fn next_char_pr_id(&self) -> u32 {
        self.header_doc
            .root
            .first_child_named("hh:head")
            .and_then(|h| h.first_child_named("hh:refList"))
            .and_then(|r| r.first_child_named("hh:charProperties"))
            .map(|cp| cp.children_named("hh:charPr").count() as u32)
            .unwrap_or(0)
    }

    fn find_font_face_id(&self, font_name: &str) -> Option<u32> {
        let fontfaces = self
            .header_doc
            .root
            .first_child_named("hh:head")
            .and_then(|h| h.first_child_named("hh:refList"))
            .and_then(|r| r.first_child_named("hh:fontfaces"))?;
        fontfaces
            .children_named("hh:fontface")
            .find(|f| f.first_child_named("hh:font").and_then(|font| font.attr("face")) == Some(font_name))
            .and_then(|f| f.attr("id"))
            .and_then(|id| id.parse().ok())
    }

    /// Finds an `hh:fontface` already naming `font_name`, or adds one to
    /// `hh:refList/hh:fontfaces` (creating that table if this is the first
    /// font override the document has ever needed). Returns its id.
    fn append_font_face(&mut self, font_name: &str) -> Result<u32> {
        if let Some(id) = self.find_font_face_id(font_name) {
            return Ok(id);
        }

        let ref_list = self
            .header_doc
            .root
            .first_child_named_mut("hh:head")
            .and_then(|h| h.first_child_named_mut("hh:refList"))
            .ok_or_else(|| HwpError::InvalidFormat("header.xml missing hh:refList".to_string()))?;
        if ref_list.first_child_named("hh:fontfaces").is_none() {
            ref_list.children.push(XmlNode::Element(Element {
                name: "hh:fontfaces".to_string(),
                attrs: Vec::new(),
                children: Vec::new(),
                self_closing: false,
            }));
        }
        let fontfaces = ref_list
            .first_child_named_mut("hh:fontfaces")
            .ok_or_else(|| HwpError::InvalidFormat("header.xml missing hh:fontfaces".to_string()))?;

        let new_id = fontfaces.children_named("hh:fontface").count() as u32;
        let font = Element {
            name: "hh:font".to_string(),
            attrs: vec![("face".to_string(), font_name.to_string())],
            children: Vec::new(),
            self_closing: true,
        };
        let face = Element {
            name: "hh:fontface".to_string(),
            attrs: vec![("id".to_string(), new_id.to_string())],
            children: vec![XmlNode::Element(font)],
            self_closing: false,
        };
        fontfaces.children.push(XmlNode::Element(face));
        self.dirty_header = true;
        Ok(new_id)
    }
}

fn section_index(name: &str) -> Option<usize> {
    name.strip_prefix("Contents/section")?
        .strip_suffix(".xml")?
        .parse()
        .ok()
}

fn replace_paragraph_text(para: &mut Element, text: &str) {
    let char_pr_ref = para
        .children_named("hp:run")
        .next()
        .and_then(|r| r.attr("charPrIDRef"))
        .unwrap_or("0")
        .to_string();
    para.children.retain(|c| !matches!(c, XmlNode::Element(e) if e.name == "hp:run"));
    para.children.push(XmlNode::Element(build_run(&char_pr_ref, text)));
}

/// A single `hp:run` wrapping one `hp:t` text node.
fn build_run(char_pr_ref: &str, text: &str) -> Element {
    let mut run = Element {
        name: "hp:run".to_string(),
        attrs: vec![("charPrIDRef".to_string(), char_pr_ref.to_string())],
        children: Vec::new(),
        self_closing: false,
    };
    run.children.push(XmlNode::Element(Element {
        name: "hp:t".to_string(),
        attrs: Vec::new(),
        children: vec![XmlNode::Text(text.to_string())],
        self_closing: false,
    }));
    run
}

/// Concatenated text of every `hp:run`'s `hp:t`, in document order.
fn paragraph_text(para: &Element) -> String {
    para.children_named("hp:run")
        .filter_map(|r| r.first_child_named("hp:t"))
        .flat_map(|t| t.children.iter())
        .filter_map(|c| match c {
            XmlNode::Text(s) => Some(s.as_str()),
            _ => None,
        })
        .collect()
}

fn find_paragraph_mut<'a>(root: &'a mut Element, locator: &Locator) -> Option<&'a mut Element> {
    match locator {
        Locator::Paragraph(p) => nth_child_mut(root, "hp:p", *p),
        Locator::Table { table, cell } => {
            let cell = cell.as_ref()?;
            let tbl = nth_child_mut(root, "hp:tbl", *table)?;
            let tc = find_cell_mut(tbl, cell)?;
            nth_child_mut(tc, "hp:p", cell.paragraph?)
        }
        Locator::TextBox { text_box, paragraph } => {
            let rect = nth_child_mut(root, "hp:rect", *text_box)?;
            let sub_list = rect
                .first_child_named_mut("hp:drawText")
                .and_then(|dt| dt.first_child_named_mut("hp:subList"))?;
            nth_child_mut(sub_list, "hp:p", (*paragraph)?)
        }
        _ => None,
    }
}

fn find_container_mut<'a>(root: &'a mut Element, locator: &Locator) -> Option<&'a mut Element> {
    match locator {
        Locator::Table { table, cell: Some(cell) } => {
            let tbl = nth_child_mut(root, "hp:tbl", *table)?;
            find_cell_mut(tbl, cell)
        }
        Locator::TextBox { text_box, .. } => {
            let rect = nth_child_mut(root, "hp:rect", *text_box)?;
            rect.first_child_named_mut("hp:drawText")
                .and_then(|dt| dt.first_child_named_mut("hp:subList"))
        }
        _ => None,
    }
}

/// The element a paragraph addressed by `locator` is a direct `hp:p` child
/// of: the section root itself, a table cell, or a text box's sub-list.
/// Used to resolve `before`/`after` `AddParagraph` insertion points, where
/// [`find_container_mut`] doesn't apply since `locator` names a paragraph,
/// not its container.
fn paragraph_container_mut<'a>(root: &'a mut Element, locator: &Locator) -> Option<&'a mut Element> {
    match locator {
        Locator::Paragraph(_) => Some(root),
        Locator::Table { table, cell: Some(cell) } => {
            let tbl = nth_child_mut(root, "hp:tbl", *table)?;
            find_cell_mut(tbl, cell)
        }
        Locator::TextBox { text_box, .. } => {
            let rect = nth_child_mut(root, "hp:rect", *text_box)?;
            rect.first_child_named_mut("hp:drawText")
                .and_then(|dt| dt.first_child_named_mut("hp:subList"))
        }
        _ => None,
    }
}

fn paragraph_index(locator: &Locator) -> Option<usize> {
    match locator {
        Locator::Paragraph(p) => Some(*p),
        Locator::Table { cell: Some(cell), .. } => cell.paragraph,
        Locator::TextBox { paragraph, .. } => *paragraph,
        _ => None,
    }
}

/// Absolute index within `container.children` of the `n`th child element
/// named `name`, for splicing with `Vec::insert` rather than `push`.
fn nth_element_index(container: &Element, name: &str, n: usize) -> Option<usize> {
    container
        .children
        .iter()
        .enumerate()
        .filter(|(_, c)| matches!(c, XmlNode::Element(e) if e.name == name))
        .nth(n)
        .map(|(i, _)| i)
}

fn find_cell_mut<'a>(tbl: &'a mut Element, cell: &CellRef) -> Option<&'a mut Element> {
    for tr in tbl.children.iter_mut() {
        let XmlNode::Element(tr) = tr else { continue };
        if tr.name != "hp:tr" {
            continue;
        }
        for tc in tr.children.iter_mut() {
            let XmlNode::Element(tc) = tc else { continue };
            if tc.name != "hp:tc" {
                continue;
            }
            let addr = tc.first_child_named("hp:cellAddr");
            let col = addr.and_then(|a| a.attr("colAddr")).and_then(|v| v.parse::<usize>().ok());
            let row = addr.and_then(|a| a.attr("rowAddr")).and_then(|v| v.parse::<usize>().ok());
            if col == Some(cell.col) && row == Some(cell.row) {
                return Some(tc);
            }
        }
    }
    None
}

fn nth_child_mut<'a>(parent: &'a mut Element, name: &str, n: usize) -> Option<&'a mut Element> {
    parent
        .children
        .iter_mut()
        .filter_map(|c| match c {
            XmlNode::Element(e) if e.name == name => Some(e),
            _ => None,
        })
        .nth(n)
}

fn build_paragraph_element(text: &str, char_pr_id: u32) -> Element {
    let mut run = Element {
        name: "hp:run".to_string(),
        attrs: vec![("charPrIDRef".to_string(), char_pr_id.to_string())],
        children: Vec::new(),
        self_closing: false,
    };
    run.children.push(XmlNode::Element(Element {
        name: "hp:t".to_string(),
        attrs: Vec::new(),
        children: vec![XmlNode::Text(text.to_string())],
        self_closing: false,
    }));
    Element {
        name: "hp:p".to_string(),
        attrs: vec![
            ("paraPrIDRef".to_string(), "0".to_string()),
            ("styleIDRef".to_string(), "0".to_string()),
        ],
        children: vec![XmlNode::Element(run)],
        self_closing: false,
    }
}

fn build_table_element(rows: usize, cols: usize, cell_text: &[String]) -> Element {
    let mut table = Element {
        name: "hp:tbl".to_string(),
        attrs: Vec::new(),
        children: Vec::new(),
        self_closing: false,
    };
    for row in 0..rows {
        let mut tr = Element {
            name: "hp:tr".to_string(),
            attrs: Vec::new(),
            children: Vec::new(),
            self_closing: false,
        };
        for col in 0..cols {
            let text = cell_text.get(row * cols + col).cloned().unwrap_or_default();
            let cell_addr = Element {
                name: "hp:cellAddr".to_string(),
                attrs: vec![
                    ("colAddr".to_string(), col.to_string()),
                    ("rowAddr".to_string(), row.to_string()),
                ],
                children: Vec::new(),
                self_closing: true,
            };
            let cell_span = Element {
                name: "hp:cellSpan".to_string(),
                attrs: vec![
                    ("colSpan".to_string(), "1".to_string()),
                    ("rowSpan".to_string(), "1".to_string()),
                ],
                children: Vec::new(),
                self_closing: true,
            };
            let tc = Element {
                name: "hp:tc".to_string(),
                attrs: Vec::new(),
                children: vec![
                    XmlNode::Element(cell_addr),
                    XmlNode::Element(cell_span),
                    XmlNode::Element(build_paragraph_element(&text, 0)),
                ],
                self_closing: false,
            };
            tr.children.push(XmlNode::Element(tc));
        }
        table.children.push(XmlNode::Element(tr));
    }
    table
}

fn default_char_pr() -> Element {
    Element {
        name: "hh:charPr".to_string(),
        attrs: vec![
            ("id".to_string(), "0".to_string()),
            ("height".to_string(), "1000".to_string()),
        ],
        children: Vec::new(),
        self_closing: false,
    }
}
