//! XML parsing into [`Element`] trees
//!
//! Entity documents carry all of their information in element names and
//! attributes, so text content, comments and processing instructions are
//! dropped.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::Element;
use crate::error::{Result, SchemaError};

/// Parse an XML document; `path` only labels errors
pub fn parse_document(path: &str, xml: &str) -> Result<Element> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => stack.push(element_from(path, &e)?),
            Ok(Event::Empty(e)) => {
                let element = element_from(path, &e)?;
                attach(path, &mut stack, &mut root, element)?;
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| SchemaError::xml(path, "unexpected closing tag"))?;
                attach(path, &mut stack, &mut root, element)?;
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(SchemaError::xml(
                    path,
                    format!("at position {}: {}", reader.buffer_position(), e),
                ))
            }
        }
    }

    if let Some(open) = stack.last() {
        return Err(SchemaError::xml(path, format!("unclosed element <{}>", open.tag)));
    }
    root.ok_or_else(|| SchemaError::xml(path, "document has no root element"))
}

fn element_from(path: &str, start: &BytesStart) -> Result<Element> {
    let mut element = Element::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());

    for attr in start.attributes() {
        let attr = attr.map_err(|e| SchemaError::xml(path, e))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| SchemaError::xml(path, e))?
            .into_owned();
        element.attributes.push((key, value));
    }

    Ok(element)
}

fn attach(
    path: &str,
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
    } else if root.is_none() {
        *root = Some(element);
    } else {
        return Err(SchemaError::xml(path, "multiple root elements"));
    }
    Ok(())
}
