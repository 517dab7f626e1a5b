// crates/scl-template-import/src/document/reader.rs

use super::element::{Attribute, Element, Node};
use crate::error::SclError;
use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use std::str::from_utf8;

/// Result of reading an XML string into an owned tree.
pub(crate) struct ParsedXml {
    pub root: Element,
    pub declaration: bool,
}

/// Reads an XML string into an owned element tree.
///
/// Whitespace-only text is dropped, entity and character references are
/// resolved, and comments are kept. Processing instructions and doctype
/// declarations are skipped.
pub(crate) fn read_tree(xml: &str) -> Result<ParsedXml, SclError> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Element> = Vec::new();
    // Text of the innermost open element, accumulated across text, CDATA
    // and reference events until the next structural event.
    let mut text = String::new();
    let mut root: Option<Element> = None;
    let mut declaration = false;

    loop {
        match reader.read_event()? {
            Event::Decl(_) => declaration = true,
            Event::Start(e) => {
                flush_text(&mut stack, &mut text);
                stack.push(start_element(&e)?);
            }
            Event::Empty(e) => {
                flush_text(&mut stack, &mut text);
                let element = start_element(&e)?;
                close_element(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                flush_text(&mut stack, &mut text);
                // The reader checks end names, so the stack top is the match.
                if let Some(element) = stack.pop() {
                    close_element(&mut stack, &mut root, element)?;
                }
            }
            Event::Text(e) => {
                if !stack.is_empty() {
                    text.push_str(&unescape(from_utf8(&e)?)?);
                }
            }
            Event::CData(e) => {
                if !stack.is_empty() {
                    text.push_str(from_utf8(&e)?);
                }
            }
            Event::GeneralRef(e) => {
                if !stack.is_empty() {
                    let reference = format!("&{};", from_utf8(&e)?);
                    text.push_str(&unescape(&reference)?);
                }
            }
            Event::Comment(e) => {
                if let Some(parent) = stack.last_mut() {
                    let comment = from_utf8(&e)?.to_string();
                    flush_pending(parent, &mut text);
                    parent.children.push(Node::Comment(comment));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.pop() {
        return Err(SclError::UnclosedElement { element: open.name });
    }

    let root = root.ok_or(SclError::MissingElement { element: "root" })?;
    Ok(ParsedXml { root, declaration })
}

fn start_element(e: &BytesStart<'_>) -> Result<Element, SclError> {
    let mut element = Element::new(from_utf8(e.name().as_ref())?);
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let name = from_utf8(attr.key.as_ref())?;
        let value = unescape(from_utf8(&attr.value)?)?;
        element
            .attributes
            .push(Attribute::new(name, value.into_owned()));
    }
    Ok(element)
}

/// Attaches a finished element to its parent, or makes it the root.
fn close_element(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), SclError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Element(element)),
        None if root.is_some() => return Err(SclError::MultipleRootElements),
        None => *root = Some(element),
    }
    Ok(())
}

fn flush_text(stack: &mut [Element], text: &mut String) {
    match stack.last_mut() {
        Some(parent) => flush_pending(parent, text),
        None => text.clear(),
    }
}

fn flush_pending(parent: &mut Element, text: &mut String) {
    if !text.trim().is_empty() {
        parent.children.push(Node::Text(std::mem::take(text)));
    }
    text.clear();
}
