//! Read-only structural validator for the binary container. Eight layers,
//! each producing one named [`Check`]; layers after the first only run once
//! the container itself is readable. An archive-format (ZIP) file
//! short-circuits to a pass with an empty check list — its own structural
//! guarantees are the ZIP/XML layer's job, not this pipeline's.

use std::collections::HashSet;
use std::panic::{catch_unwind, AssertUnwindSafe};

use serde::Serialize;

use crate::error::Result;
use crate::model::ctrl_header::{ControlId, CtrlHeader};
use crate::model::document::FormatTag;
use crate::model::list_header::ListHeader;
use crate::parser::doc_info::DocInfoParser;
use crate::parser::header::FileHeader;
use crate::parser::record::{self, HwpTag};
use crate::reader::CfbReader;
use crate::utils::compression::decompress_stream;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Fail,
    Warn,
    Skip,
}

#[derive(Debug, Clone, Serialize)]
pub struct Check {
    pub name: String,
    pub status: CheckStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Check {
    fn pass(name: &str) -> Self {
        Self { name: name.to_string(), status: CheckStatus::Pass, message: None }
    }
    fn fail(name: &str, message: impl Into<String>) -> Self {
        Self { name: name.to_string(), status: CheckStatus::Fail, message: Some(message.into()) }
    }
    fn warn(name: &str, message: impl Into<String>) -> Self {
        Self { name: name.to_string(), status: CheckStatus::Warn, message: Some(message.into()) }
    }
    fn skip(name: &str, message: impl Into<String>) -> Self {
        Self { name: name.to_string(), status: CheckStatus::Skip, message: Some(message.into()) }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub format: String,
    pub checks: Vec<Check>,
}

impl ValidationReport {
    fn from_checks(format: &str, checks: Vec<Check>) -> Self {
        let valid = !checks.iter().any(|c| c.status == CheckStatus::Fail);
        Self { valid, format: format.to_string(), checks }
    }
}

/// Runs the pipeline on raw file bytes, sniffing format by the leading
/// signature (`PK\x03\x04` = archive, anything else is handed to the
/// CFB reader).
pub fn validate(bytes: &[u8]) -> Result<ValidationReport> {
    if bytes.starts_with(b"PK\x03\x04") {
        return Ok(ValidationReport::from_checks("archive", Vec::new()));
    }
    validate_binary(bytes)
}

/// Runs [`validate`] behind a `catch_unwind`, for callers (the holder's
/// flush path) that must treat a validator crash as an infrastructure error
/// rather than a structural failure: "fail-open" per the flush contract.
pub fn validate_catching_panics(bytes: &[u8]) -> std::thread::Result<Result<ValidationReport>> {
    catch_unwind(AssertUnwindSafe(|| validate(bytes)))
}

fn validate_binary(bytes: &[u8]) -> Result<ValidationReport> {
    let mut checks = Vec::new();

    let loaded = load_streams(bytes);
    let (header, doc_info_raw, sections_raw) = match loaded {
        Ok(ok) => ok,
        Err(e) => {
            checks.push(Check::fail("cfb_structure", e.to_string()));
            return Ok(ValidationReport::from_checks("binary", checks));
        }
    };
    if header.is_encrypted() {
        checks.push(Check::fail("cfb_structure", "document is password-protected"));
        return Ok(ValidationReport::from_checks("binary", checks));
    }
    if sections_raw.is_empty() {
        checks.push(Check::fail("cfb_structure", "no BodyText/Section0 stream"));
        return Ok(ValidationReport::from_checks("binary", checks));
    }
    checks.push(Check::pass("cfb_structure"));

    let doc_info_data = if header.is_compressed() {
        decompress_stream(&doc_info_raw)?
    } else {
        doc_info_raw.clone()
    };
    let sections_data: Vec<Vec<u8>> = if header.is_compressed() {
        sections_raw
            .iter()
            .map(|s| decompress_stream(s))
            .collect::<Result<_>>()?
    } else {
        sections_raw.clone()
    };

    let doc_info = DocInfoParser::parse(doc_info_raw, header.is_compressed())?;

    checks.push(check_record_stream(&doc_info_data, &sections_data));

    let scans: Vec<SectionScan> = sections_data.iter().map(|s| scan_section(s)).collect();

    checks.push(check_nchars_consistency(&scans));
    checks.push(check_cross_reference_bounds(&scans, &doc_info));
    checks.push(check_id_mappings(&doc_info));
    checks.push(check_content_completeness(&scans, &doc_info));
    checks.push(check_paragraph_completeness(&scans));
    checks.push(check_table_structure(&scans));

    Ok(ValidationReport::from_checks("binary", checks))
}

type LoadedStreams = (FileHeader, Vec<u8>, Vec<Vec<u8>>);

fn load_streams(bytes: &[u8]) -> Result<LoadedStreams> {
    let mut reader = CfbReader::new(std::io::Cursor::new(bytes.to_vec()))?;
    let header = FileHeader::parse(reader.read_stream("FileHeader")?)?;

    let doc_info = reader.read_stream("DocInfo")?;

    let mut sections = Vec::new();
    let mut idx = 0;
    loop {
        let name = format!("BodyText/Section{idx}");
        if !reader.stream_exists(&name) {
            break;
        }
        sections.push(reader.read_stream(&name)?);
        idx += 1;
    }

    Ok((header, doc_info, sections))
}

/// Reports truncation or leftover trailing bytes in any decompressed
/// stream. `record::iterate` itself stops cleanly on truncation rather than
/// erroring, so the only signal available here is "did we consume every
/// byte" plus a look at what's sitting in the gap.
///
/// A gap whose own header parses but declares more data than the stream
/// actually has left is a truncated last record — the declared-vs-actual
/// mismatch this layer exists to catch — and fails. Anything else left over
/// (stray padding, a header that doesn't even parse) only warns.
fn check_record_stream(doc_info: &[u8], sections: &[Vec<u8>]) -> Check {
    let mut failures = Vec::new();
    let mut warnings = Vec::new();
    let check_one = |name: &str, data: &[u8], failures: &mut Vec<String>, warnings: &mut Vec<String>| {
        let records = record::iterate(data);
        let consumed = records
            .iter()
            .map(|r| r.offset + r.record.header.encoded_len() + r.record.data.len())
            .max()
            .unwrap_or(0);
        if consumed >= data.len() {
            return;
        }
        let gap = data.len() - consumed;
        let mut reader = crate::reader::StreamReader::new(data.to_vec());
        reader.set_position(consumed as u64);
        match record::RecordHeader::parse(&mut reader) {
            Ok(header) if consumed + header.encoded_len() + header.size as usize > data.len() => {
                failures.push(format!(
                    "{name}: last record declares {} bytes but only {} remain",
                    header.size,
                    data.len() - consumed - header.encoded_len()
                ));
            }
            _ => warnings.push(format!("{name}: {gap} trailing/truncated bytes")),
        }
    };
    check_one("DocInfo", doc_info, &mut failures, &mut warnings);
    for (i, data) in sections.iter().enumerate() {
        check_one(&format!("BodyText/Section{i}"), data, &mut failures, &mut warnings);
    }

    if !failures.is_empty() {
        Check::fail("record_stream", failures.join("; "))
    } else if !warnings.is_empty() {
        Check::warn("record_stream", warnings.join("; "))
    } else {
        Check::pass("record_stream")
    }
}

fn check_nchars_consistency(scans: &[SectionScan]) -> Check {
    let mut problems = Vec::new();
    for (s_idx, scan) in scans.iter().enumerate() {
        let mut last_flag_count = 0usize;
        for para in scan.paragraphs.iter().filter(|p| p.is_top_level) {
            if para.nchars_raw & 0x8000_0000 != 0 {
                last_flag_count += 1;
            }
            let declared = para.nchars_raw & 0x7FFF_FFFF;
            if let Some(actual) = para.text_units_len {
                if declared as usize != actual {
                    problems.push(format!(
                        "s{s_idx}: paragraph nChars {declared} != PARA_TEXT code units {actual}"
                    ));
                }
            }
        }
        if last_flag_count != 1 {
            problems.push(format!(
                "s{s_idx}: expected exactly one last-paragraph flag, found {last_flag_count}"
            ));
        }
    }

    if problems.is_empty() {
        Check::pass("nchars_consistency")
    } else {
        Check::fail("nchars_consistency", problems.join("; "))
    }
}

fn check_cross_reference_bounds(
    scans: &[SectionScan],
    doc_info: &crate::parser::doc_info::DocInfo,
) -> Check {
    let char_shape_count = doc_info.char_shapes.len();
    let para_shape_count = doc_info.para_shapes.len();
    let style_count = doc_info.styles.len();
    let font_count = doc_info.face_names.len();

    let mut problems = Vec::new();
    for shape in &doc_info.char_shapes {
        let font_ref = shape.face_name_ids[0] as usize;
        if font_ref >= font_count {
            problems.push(format!("CHAR_SHAPE.font_ref {font_ref} >= font count {font_count}"));
        }
    }
    for (s_idx, scan) in scans.iter().enumerate() {
        for para in &scan.paragraphs {
            if para.para_shape_ref as usize >= para_shape_count {
                problems.push(format!(
                    "s{s_idx}: para_shape_ref {} >= para shape count {para_shape_count}",
                    para.para_shape_ref
                ));
            }
            if para.style_ref as usize >= style_count {
                problems.push(format!(
                    "s{s_idx}: style_ref {} >= style count {style_count}",
                    para.style_ref
                ));
            }
            for &r in &para.char_shape_refs {
                if r as usize >= char_shape_count {
                    problems.push(format!(
                        "s{s_idx}: PARA_CHAR_SHAPE ref {r} >= char shape count {char_shape_count}"
                    ));
                }
            }
        }
    }

    if problems.is_empty() {
        Check::pass("cross_reference")
    } else {
        Check::fail("cross_reference", problems.join("; "))
    }
}

fn check_id_mappings(doc_info: &crate::parser::doc_info::DocInfo) -> Check {
    let Some(mappings) = &doc_info.id_mappings else {
        return Check::fail("id_mappings", "DocInfo missing ID_MAPPINGS record");
    };
    let declared = mappings.char_shape_count() as usize;
    let actual = doc_info.char_shapes.len();
    if declared == actual {
        Check::pass("id_mappings")
    } else {
        Check::fail(
            "id_mappings",
            format!("ID_MAPPINGS declares {declared} char shapes, found {actual}"),
        )
    }
}

const CONTENT_COMPLETENESS_GUARD: usize = 10;

fn check_content_completeness(
    scans: &[SectionScan],
    doc_info: &crate::parser::doc_info::DocInfo,
) -> Check {
    let total = doc_info.char_shapes.len();
    if total < CONTENT_COMPLETENESS_GUARD {
        return Check::skip(
            "content_completeness",
            format!("{total} declared char shapes is below the guard of {CONTENT_COMPLETENESS_GUARD}"),
        );
    }

    let mut referenced: HashSet<u32> = HashSet::new();
    for scan in scans {
        for para in &scan.paragraphs {
            referenced.extend(para.char_shape_refs.iter().copied());
        }
    }
    let fraction = referenced.len() as f64 / total as f64;
    if fraction >= 0.5 {
        Check::pass("content_completeness")
    } else {
        Check::fail(
            "content_completeness",
            format!("only {:.0}% of {total} char shapes are referenced from body text", fraction * 100.0),
        )
    }
}

fn check_paragraph_completeness(scans: &[SectionScan]) -> Check {
    let mut problems = Vec::new();
    for (s_idx, scan) in scans.iter().enumerate() {
        for (p_idx, para) in scan.paragraphs.iter().enumerate() {
            if para.text_units_len.is_none() {
                continue;
            }
            if !para.has_char_shape {
                problems.push(format!("s{s_idx} paragraph {p_idx}: PARA_TEXT with no PARA_CHAR_SHAPE"));
            }
            if !para.has_line_seg {
                problems.push(format!("s{s_idx} paragraph {p_idx}: PARA_TEXT with no PARA_LINE_SEG"));
            }
        }
    }

    if problems.is_empty() {
        Check::pass("paragraph_completeness")
    } else {
        Check::fail("paragraph_completeness", problems.join("; "))
    }
}

fn check_table_structure(scans: &[SectionScan]) -> Check {
    const CTRL_HEADER_MIN: usize = 44;
    const TABLE_MIN: usize = 34;
    const LIST_HEADER_MIN: usize = 46;

    let mut problems = Vec::new();
    for (s_idx, scan) in scans.iter().enumerate() {
        for (t_idx, table) in scan.tables.iter().enumerate() {
            if table.ctrl_header_size < CTRL_HEADER_MIN {
                problems.push(format!(
                    "s{s_idx} table {t_idx}: CTRL_HEADER {} bytes < {CTRL_HEADER_MIN}",
                    table.ctrl_header_size
                ));
            }
            if table.table_record_size < TABLE_MIN {
                problems.push(format!(
                    "s{s_idx} table {t_idx}: TABLE {} bytes < {TABLE_MIN}",
                    table.table_record_size
                ));
            }
            let mut span_sum = 0usize;
            for (i, cell) in table.cells.iter().enumerate() {
                if cell.list_header_size < LIST_HEADER_MIN {
                    problems.push(format!(
                        "s{s_idx} table {t_idx} cell {i}: LIST_HEADER {} bytes < {LIST_HEADER_MIN}",
                        cell.list_header_size
                    ));
                }
                span_sum += cell.col_span.max(1) as usize * cell.row_span.max(1) as usize;
            }
            let expected = table.rows * table.cols;
            if span_sum != expected {
                problems.push(format!(
                    "s{s_idx} table {t_idx}: cell spans sum to {span_sum}, expected rows*cols = {expected}"
                ));
            }
        }
    }

    if problems.is_empty() {
        Check::pass("table_structure")
    } else {
        Check::fail("table_structure", problems.join("; "))
    }
}

struct ParagraphScan {
    is_top_level: bool,
    nchars_raw: u32,
    text_units_len: Option<usize>,
    has_char_shape: bool,
    has_line_seg: bool,
    char_shape_refs: Vec<u32>,
    para_shape_ref: u16,
    style_ref: u8,
}

struct CellScan {
    col_span: u16,
    row_span: u16,
    list_header_size: usize,
}

struct TableScan {
    ctrl_header_size: usize,
    table_record_size: usize,
    rows: usize,
    cols: usize,
    cells: Vec<CellScan>,
}

#[derive(Default)]
struct SectionScan {
    paragraphs: Vec<ParagraphScan>,
    tables: Vec<TableScan>,
}

enum Frame {
    Paragraph {
        is_top_level: bool,
        nchars_raw: u32,
        text_units_len: Option<usize>,
        has_char_shape: bool,
        has_line_seg: bool,
        char_shape_refs: Vec<u32>,
        para_shape_ref: u16,
        style_ref: u8,
    },
    Table {
        ctrl_header_size: usize,
        table_record_size: usize,
        rows: usize,
        cols: usize,
        cells: Vec<CellScan>,
    },
    Cell {
        col_span: u16,
        row_span: u16,
        list_header_size: usize,
    },
    Other,
}

struct LeveledFrame {
    level: u8,
    frame: Frame,
}

/// Walks one decompressed section stream, collecting enough information
/// about every paragraph and table (at any nesting depth) to run layers
/// 3, 4, 7, and 8 without re-parsing the stream for each one.
fn scan_section(data: &[u8]) -> SectionScan {
    let mut scan = SectionScan::default();
    let mut stack: Vec<LeveledFrame> = Vec::new();
    let mut pending_table = false;
    let mut pending_table_ctrl_size = 0usize;
    let mut pending_textbox = false;

    for record::OffsetRecord { record, .. } in record::iterate(data) {
        let level = record.header.level;
        close_at_or_above(&mut stack, &mut scan, level);

        match HwpTag::from_u16(record.tag_id()) {
            Some(HwpTag::ParaHeader) => {
                let is_top_level = stack.is_empty();
                let nchars_raw = record.data.get(0..4).map(|b| u32::from_le_bytes(b.try_into().unwrap())).unwrap_or(0);
                let para_shape_ref = record.data.get(8..10).map(|b| u16::from_le_bytes(b.try_into().unwrap())).unwrap_or(0);
                let style_ref = record.data.get(10).copied().unwrap_or(0);
                stack.push(LeveledFrame {
                    level,
                    frame: Frame::Paragraph {
                        is_top_level,
                        nchars_raw,
                        text_units_len: None,
                        has_char_shape: false,
                        has_line_seg: false,
                        char_shape_refs: Vec::new(),
                        para_shape_ref,
                        style_ref,
                    },
                });
            }
            Some(HwpTag::ParaText) => {
                if let Some(LeveledFrame { frame: Frame::Paragraph { text_units_len, .. }, .. }) = stack.last_mut() {
                    *text_units_len = Some(record.data.len() / 2);
                }
            }
            Some(HwpTag::ParaCharShape) => {
                if let Some(LeveledFrame {
                    frame: Frame::Paragraph { has_char_shape, char_shape_refs, .. },
                    ..
                }) = stack.last_mut()
                {
                    *has_char_shape = true;
                    if let Ok(shape) = crate::model::para_char_shape::ParaCharShape::from_record(&record) {
                        char_shape_refs.extend(shape.char_positions.iter().map(|p| p.char_shape_id));
                    }
                }
            }
            Some(HwpTag::ParaLineSeg) => {
                if let Some(LeveledFrame { frame: Frame::Paragraph { has_line_seg, .. }, .. }) = stack.last_mut() {
                    *has_line_seg = true;
                }
            }
            Some(HwpTag::CtrlHeader) => {
                if let Ok(ctrl) = CtrlHeader::from_record(&record) {
                    if ctrl.is_table() {
                        pending_table = true;
                        pending_table_ctrl_size = record.header.size as usize;
                    }
                }
            }
            Some(HwpTag::Table) => {
                if pending_table {
                    pending_table = false;
                    let rows = record.data.get(4..6).map(|b| u16::from_le_bytes(b.try_into().unwrap())).unwrap_or(0) as usize;
                    let cols = record.data.get(6..8).map(|b| u16::from_le_bytes(b.try_into().unwrap())).unwrap_or(0) as usize;
                    stack.push(LeveledFrame {
                        level,
                        frame: Frame::Table {
                            ctrl_header_size: pending_table_ctrl_size,
                            table_record_size: record.header.size as usize,
                            rows,
                            cols,
                            cells: Vec::new(),
                        },
                    });
                }
            }
            Some(HwpTag::ShapeComponent) => {
                if record.data.len() >= 4 && ControlId::from_reversed_bytes(&record.data[0..4]).matches("$rec") {
                    pending_textbox = true;
                }
            }
            Some(HwpTag::ListHeader) => {
                if let Ok(header) = ListHeader::from_record(&record) {
                    let in_table = matches!(stack.last(), Some(LeveledFrame { frame: Frame::Table { .. }, .. }));
                    if in_table {
                        let (col_span, row_span) = header.cell_addr.map(|a| (a.col_span, a.row_span)).unwrap_or((1, 1));
                        stack.push(LeveledFrame {
                            level,
                            frame: Frame::Cell { col_span, row_span, list_header_size: record.header.size as usize },
                        });
                    } else if pending_textbox {
                        pending_textbox = false;
                        stack.push(LeveledFrame { level, frame: Frame::Other });
                    }
                }
            }
            _ => {}
        }
    }

    close_at_or_above(&mut stack, &mut scan, 0);
    scan
}

fn close_at_or_above(stack: &mut Vec<LeveledFrame>, scan: &mut SectionScan, level: u8) {
    while matches!(stack.last(), Some(f) if f.level >= level) {
        let LeveledFrame { frame, .. } = stack.pop().unwrap();
        attach(stack, scan, frame);
    }
}

fn attach(stack: &mut [LeveledFrame], scan: &mut SectionScan, frame: Frame) {
    match frame {
        Frame::Paragraph {
            is_top_level,
            nchars_raw,
            text_units_len,
            has_char_shape,
            has_line_seg,
            char_shape_refs,
            para_shape_ref,
            style_ref,
        } => {
            scan.paragraphs.push(ParagraphScan {
                is_top_level,
                nchars_raw,
                text_units_len,
                has_char_shape,
                has_line_seg,
                char_shape_refs,
                para_shape_ref,
                style_ref,
            });
        }
        Frame::Table { ctrl_header_size, table_record_size, rows, cols, cells } => {
            scan.tables.push(TableScan { ctrl_header_size, table_record_size, rows, cols, cells });
        }
        Frame::Cell { col_span, row_span, list_header_size } => {
            if let Some(LeveledFrame { frame: Frame::Table { cells, .. }, .. }) = stack.last_mut() {
                cells.push(CellScan { col_span, row_span, list_header_size });
            }
        }
        Frame::Other => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::record::HwpTag;
    use crate::writer::build_container;

    fn minimal_doc_info() -> Vec<u8> {
        let mut data = Vec::new();
        let mut mapping_counts = vec![0u32; 10];
        mapping_counts[9] = 1; // declared char-shape count
        let mut payload = Vec::new();
        for c in &mapping_counts {
            payload.extend_from_slice(&c.to_le_bytes());
        }
        data.extend(record::build(HwpTag::IdMappings as u16, 0, &payload));
        data.extend(record::build(HwpTag::FaceName as u16, 0, &vec![0u8; 7]));
        data.extend(record::build(HwpTag::CharShape as u16, 0, &vec![0u8; 72]));
        data.extend(record::build(HwpTag::ParaShape as u16, 0, &vec![0u8; 54]));
        data.extend(record::build(HwpTag::Style as u16, 0, &vec![0u8; 12]));
        data
    }

    fn minimal_section(text: &str) -> Vec<u8> {
        let mut header = vec![0u8; 12];
        let units: Vec<u8> = text.encode_utf16().flat_map(|u| u.to_le_bytes()).collect();
        header[0..4].copy_from_slice(&((units.len() / 2) as u32 | 0x8000_0000).to_le_bytes());
        let mut stream = Vec::new();
        stream.extend(record::build(HwpTag::ParaHeader as u16, 0, &header));
        stream.extend(record::build(HwpTag::ParaText as u16, 1, &units));
        stream.extend(record::build(HwpTag::ParaCharShape as u16, 1, &[0u8; 8]));
        stream.extend(record::build(HwpTag::ParaLineSeg as u16, 1, &[0u8; 4]));
        stream
    }

    fn build_fixture(text: &str) -> Vec<u8> {
        let mut header = crate::parser::header::FileHeader::new_default();
        header.set_compressed(false);
        let streams = vec![
            ("FileHeader".to_string(), header.to_bytes()),
            ("DocInfo".to_string(), minimal_doc_info()),
            ("BodyText/Section0".to_string(), minimal_section(text)),
        ];
        build_container(&streams).unwrap()
    }

    #[test]
    fn valid_fixture_has_no_failing_checks() {
        let bytes = build_fixture("hi");
        let report = validate(&bytes).unwrap();
        assert!(report.valid, "{:?}", report.checks);
    }

    #[test]
    fn corrupted_signature_fails_cfb_structure() {
        let mut bytes = build_fixture("hi");
        // The FileHeader stream starts with the 32-byte signature field;
        // flip a bit inside it without touching the CFB directory.
        let pos = bytes.windows(4).position(|w| w == b"HWP ").unwrap();
        bytes[pos] = b'B';
        let report = validate(&bytes).unwrap();
        assert!(!report.valid);
        assert!(report.checks.iter().any(|c| c.name == "cfb_structure" && c.status == CheckStatus::Fail));
    }

    #[test]
    fn below_guard_content_completeness_skips() {
        let bytes = build_fixture("hi");
        let report = validate(&bytes).unwrap();
        let check = report.checks.iter().find(|c| c.name == "content_completeness").unwrap();
        assert_eq!(check.status, CheckStatus::Skip);
    }

    #[test]
    fn shrinking_a_stream_below_its_last_records_declared_size_fails() {
        let mut section = minimal_section("hi");
        // Drop the last record's trailing bytes without touching its header,
        // so the declared size now exceeds what's actually left.
        section.truncate(section.len() - 2);
        let check = check_record_stream(&minimal_doc_info(), std::slice::from_ref(&section));
        assert_eq!(check.status, CheckStatus::Fail);
    }

    #[test]
    fn stray_trailing_byte_that_isnt_a_record_header_only_warns() {
        let mut section = minimal_section("hi");
        section.push(0xAB);
        let check = check_record_stream(&minimal_doc_info(), std::slice::from_ref(&section));
        assert_eq!(check.status, CheckStatus::Warn);
    }
}
