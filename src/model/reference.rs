//! The dotted reference grammar shared by every mutator and the daemon's
//! `read`/`edit-*` commands: `s<i>[.p<i> | (.t<i>[.r<j>.c<k>[.p<m>]]) |
//! (.tb<i>[.p<j>]) | .img<i>][.run<i>]`.

use crate::error::{HwpError, Result};
use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRef {
    pub row: usize,
    pub col: usize,
    pub paragraph: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locator {
    Paragraph(usize),
    Table { table: usize, cell: Option<CellRef> },
    TextBox { text_box: usize, paragraph: Option<usize> },
    Image(usize),
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedRef {
    pub section: usize,
    pub locator: Locator,
    pub run: Option<usize>,
}

struct Tokenizer<'a> {
    rest: &'a str,
}

impl<'a> Tokenizer<'a> {
    fn new(s: &'a str) -> Self {
        Self { rest: s }
    }

    /// Consume a literal prefix followed by a decimal integer, e.g. `"s"` -> 3 from "s3.p1".
    fn take(&mut self, prefix: &str) -> Option<usize> {
        let rest = self.rest.strip_prefix(prefix)?;
        let digits_len = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
        if digits_len == 0 {
            return None;
        }
        let (digits, tail) = rest.split_at(digits_len);
        let value: usize = digits.parse().ok()?;
        self.rest = tail;
        Some(value)
    }

    fn take_dot(&mut self, prefix: &str) -> Option<usize> {
        let rest = self.rest.strip_prefix('.')?;
        let mut probe = Tokenizer { rest };
        let value = probe.take(prefix)?;
        self.rest = probe.rest;
        Some(value)
    }

    fn done(&self) -> bool {
        self.rest.is_empty()
    }
}

pub fn parse(reference: &str) -> Result<ParsedRef> {
    let mut tok = Tokenizer::new(reference);
    let section = tok
        .take("s")
        .ok_or_else(|| HwpError::InvalidReference(reference.to_string()))?;

    let locator = if let Some(p) = tok.take_dot("p") {
        Locator::Paragraph(p)
    } else if let Some(t) = tok.take_dot("t") {
        let cell = if let Some(r) = tok.take_dot("r") {
            let c = tok
                .take_dot("c")
                .ok_or_else(|| HwpError::InvalidReference(reference.to_string()))?;
            let paragraph = tok.take_dot("p");
            Some(CellRef {
                row: r,
                col: c,
                paragraph,
            })
        } else {
            None
        };
        Locator::Table { table: t, cell }
    } else if let Some(tb) = tok.take_dot("tb") {
        let paragraph = tok.take_dot("p");
        Locator::TextBox {
            text_box: tb,
            paragraph,
        }
    } else if let Some(img) = tok.take_dot("img") {
        Locator::Image(img)
    } else {
        Locator::None
    };

    let run = tok.take_dot("run");

    if !tok.done() {
        return Err(HwpError::InvalidReference(reference.to_string()));
    }

    Ok(ParsedRef {
        section,
        locator,
        run,
    })
}

pub fn build(parsed: &ParsedRef) -> String {
    let mut out = String::new();
    let _ = write!(out, "s{}", parsed.section);
    match &parsed.locator {
        Locator::Paragraph(p) => {
            let _ = write!(out, ".p{p}");
        }
        Locator::Table { table, cell } => {
            let _ = write!(out, ".t{table}");
            if let Some(cell) = cell {
                let _ = write!(out, ".r{}.c{}", cell.row, cell.col);
                if let Some(p) = cell.paragraph {
                    let _ = write!(out, ".p{p}");
                }
            }
        }
        Locator::TextBox { text_box, paragraph } => {
            let _ = write!(out, ".tb{text_box}");
            if let Some(p) = paragraph {
                let _ = write!(out, ".p{p}");
            }
        }
        Locator::Image(i) => {
            let _ = write!(out, ".img{i}");
        }
        Locator::None => {}
    }
    if let Some(r) = parsed.run {
        let _ = write!(out, ".run{r}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_paragraph_ref() {
        let r = parse("s0.p3").unwrap();
        assert_eq!(r.section, 0);
        assert_eq!(r.locator, Locator::Paragraph(3));
        assert_eq!(build(&r), "s0.p3");
    }

    #[test]
    fn round_trips_cell_paragraph_ref() {
        let r = parse("s2.t0.r1.c1.p0").unwrap();
        assert_eq!(
            r.locator,
            Locator::Table {
                table: 0,
                cell: Some(CellRef {
                    row: 1,
                    col: 1,
                    paragraph: Some(0)
                })
            }
        );
        assert_eq!(build(&r), "s2.t0.r1.c1.p0");
    }

    #[test]
    fn round_trips_text_box_ref_with_run() {
        let r = parse("s1.tb0.p2.run1").unwrap();
        assert_eq!(r.run, Some(1));
        assert_eq!(build(&r), "s1.tb0.p2.run1");
    }

    #[test]
    fn rejects_missing_section() {
        assert!(parse("p0").is_err());
    }

    #[test]
    fn rejects_incomplete_cell_ref() {
        assert!(parse("s0.t0.r1").is_err());
    }

    #[test]
    fn rejects_trailing_garbage() {
        assert!(parse("s0.p0.x1").is_err());
    }
}
