//! A minimal order-preserving XML tree, built on quick-xml's low-level
//! event API rather than its serde derive. Attribute order, child order, and
//! namespace prefixes all survive a parse/edit/serialize round trip
//! untouched for any node the caller doesn't explicitly mutate.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::io::Cursor;

use crate::error::{HwpError, Result};

#[derive(Debug, Clone)]
pub enum XmlNode {
    Element(Element),
    Text(String),
    CData(String),
}

#[derive(Debug, Clone)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
    pub self_closing: bool,
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(entry) = self.attrs.iter_mut().find(|(k, _)| k == name) {
            entry.1 = value;
        } else {
            self.attrs.push((name.to_string(), value));
        }
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter_map(move |c| match c {
            XmlNode::Element(e) if e.name == name => Some(e),
            _ => None,
        })
    }

    pub fn first_child_named(&self, name: &str) -> Option<&Element> {
        self.children_named(name).next()
    }

    pub fn first_child_named_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.children.iter_mut().find_map(|c| match c {
            XmlNode::Element(e) if e.name == name => Some(e),
            _ => None,
        })
    }

    /// Concatenation of every descendant text node, depth-first.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }
}

fn collect_text(el: &Element, out: &mut String) {
    for child in &el.children {
        match child {
            XmlNode::Text(t) | XmlNode::CData(t) => out.push_str(t),
            XmlNode::Element(e) => collect_text(e, out),
        }
    }
}

#[derive(Debug, Clone)]
pub struct XmlDocument {
    pub declaration: Option<(String, Option<String>, Option<String>)>,
    pub root: Element,
}

pub fn parse(bytes: &[u8]) -> Result<XmlDocument> {
    let mut reader = Reader::from_reader(bytes);
    reader.trim_text(false);

    let mut declaration = None;
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;
    let mut buf = Vec::new();

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| HwpError::ParseError(format!("malformed XML: {e}")))?;
        match event {
            Event::Decl(decl) => {
                declaration = Some(decode_decl(&decl)?);
            }
            Event::Start(start) => {
                stack.push(element_from_start(&start)?);
            }
            Event::Empty(start) => {
                let mut el = element_from_start(&start)?;
                el.self_closing = true;
                push_or_finish(&mut stack, &mut root, XmlNode::Element(el));
            }
            Event::End(_end) => {
                if let Some(el) = stack.pop() {
                    push_or_finish(&mut stack, &mut root, XmlNode::Element(el));
                }
            }
            Event::Text(text) => {
                let decoded = text
                    .unescape()
                    .map_err(|e| HwpError::ParseError(e.to_string()))?
                    .into_owned();
                if let Some(top) = stack.last_mut() {
                    top.children.push(XmlNode::Text(decoded));
                }
            }
            Event::CData(cdata) => {
                let decoded = String::from_utf8_lossy(cdata.as_ref()).into_owned();
                if let Some(top) = stack.last_mut() {
                    top.children.push(XmlNode::CData(decoded));
                }
            }
            Event::Comment(_) | Event::PI(_) | Event::DocType(_) => {}
            Event::Eof => break,
        }
        buf.clear();
    }

    let root = root.ok_or_else(|| HwpError::ParseError("XML document has no root element".to_string()))?;
    Ok(XmlDocument { declaration, root })
}

fn push_or_finish(stack: &mut Vec<Element>, root: &mut Option<Element>, node: XmlNode) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => {
            if let XmlNode::Element(el) = node {
                *root = Some(el);
            }
        }
    }
}

fn element_from_start(start: &BytesStart) -> Result<Element> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attrs = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| HwpError::ParseError(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| HwpError::ParseError(e.to_string()))?
            .into_owned();
        attrs.push((key, value));
    }
    Ok(Element {
        name,
        attrs,
        children: Vec::new(),
        self_closing: false,
    })
}

fn decode_decl(decl: &BytesDecl) -> Result<(String, Option<String>, Option<String>)> {
    let version = String::from_utf8_lossy(
        decl.version()
            .map_err(|e| HwpError::ParseError(e.to_string()))?
            .as_ref(),
    )
    .into_owned();
    let encoding = decl
        .encoding()
        .transpose()
        .map_err(|e| HwpError::ParseError(e.to_string()))?
        .map(|c| String::from_utf8_lossy(c.as_ref()).into_owned());
    let standalone = decl
        .standalone()
        .transpose()
        .map_err(|e| HwpError::ParseError(e.to_string()))?
        .map(|c| String::from_utf8_lossy(c.as_ref()).into_owned());
    Ok((version, encoding, standalone))
}

pub fn serialize(doc: &XmlDocument) -> Result<Vec<u8>> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    if let Some((version, encoding, standalone)) = &doc.declaration {
        writer
            .write_event(Event::Decl(BytesDecl::new(
                version,
                encoding.as_deref(),
                standalone.as_deref(),
            )))
            .map_err(xml_write_err)?;
    }
    write_element(&mut writer, &doc.root)?;
    Ok(writer.into_inner().into_inner())
}

fn write_element(writer: &mut Writer<Cursor<Vec<u8>>>, el: &Element) -> Result<()> {
    let mut start = BytesStart::new(&el.name);
    for (k, v) in &el.attrs {
        start.push_attribute((k.as_str(), v.as_str()));
    }
    if el.self_closing && el.children.is_empty() {
        writer.write_event(Event::Empty(start)).map_err(xml_write_err)?;
        return Ok(());
    }
    writer
        .write_event(Event::Start(start.to_owned()))
        .map_err(xml_write_err)?;
    for child in &el.children {
        match child {
            XmlNode::Element(e) => write_element(writer, e)?,
            XmlNode::Text(t) => {
                writer
                    .write_event(Event::Text(BytesText::new(t)))
                    .map_err(xml_write_err)?;
            }
            XmlNode::CData(t) => {
                writer
                    .write_event(Event::CData(quick_xml::events::BytesCData::new(t)))
                    .map_err(xml_write_err)?;
            }
        }
    }
    writer
        .write_event(Event::End(BytesEnd::new(&el.name)))
        .map_err(xml_write_err)?;
    Ok(())
}

fn xml_write_err(e: quick_xml::Error) -> HwpError {
    HwpError::ParseError(format!("XML write failed: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_attributes_and_children_in_order() {
        let xml = br#"<?xml version="1.0" encoding="UTF-8"?><hs:sec a="1" b="2"><hp:p id="0"><hp:run><hp:t>hi</hp:t></hp:run></hp:p></hs:sec>"#;
        let doc = parse(xml).unwrap();
        assert_eq!(doc.root.name, "hs:sec");
        assert_eq!(doc.root.attrs, vec![("a".to_string(), "1".to_string()), ("b".to_string(), "2".to_string())]);
        let out = serialize(&doc).unwrap();
        let reparsed = parse(&out).unwrap();
        assert_eq!(reparsed.root.attrs, doc.root.attrs);
        let p = reparsed.root.first_child_named("hp:p").unwrap();
        assert_eq!(p.attr("id"), Some("0"));
        assert_eq!(p.text_content(), "hi");
    }

    #[test]
    fn preserves_self_closing_empty_elements() {
        let xml = br#"<hp:tbl><hp:cellAddr colAddr="0" rowAddr="0"/></hp:tbl>"#;
        let doc = parse(xml).unwrap();
        let bytes = serialize(&doc).unwrap();
        assert!(String::from_utf8(bytes).unwrap().contains("<hp:cellAddr"));
    }
}
