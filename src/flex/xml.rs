//! XML to JSON-shaped value decoding for Flex responses.
//!
//! The Flex web service replies with XML whose leaf data lives almost
//! entirely in attributes. Decoding produces the layout downstream parsing
//! expects: attributes become `@`-prefixed keys, child elements become keys
//! named after their tag, repeated siblings aggregate into arrays while a
//! lone child stays a bare object, and text-only elements collapse to plain
//! strings.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::{Map, Value};

use super::flex_errors::FlexError;

struct Node {
    name: String,
    map: Map<String, Value>,
    text: String,
}

pub(crate) fn xml_to_value(xml: &str) -> Result<Value, FlexError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Node> = vec![Node {
        name: String::new(),
        map: Map::new(),
        text: String::new(),
    }];

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                stack.push(open_node(&start)?);
            }
            Ok(Event::Empty(start)) => {
                let node = open_node(&start)?;
                let value = close_node(node.map, node.text);
                attach_child(last_node(&mut stack)?, &node.name, value);
            }
            Ok(Event::End(_)) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| FlexError::Xml("unbalanced element".to_string()))?;
                let value = close_node(node.map, node.text);
                attach_child(last_node(&mut stack)?, &node.name, value);
            }
            Ok(Event::Text(text)) => {
                let text = text
                    .unescape()
                    .map_err(|e| FlexError::Xml(e.to_string()))?;
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&text);
                }
            }
            Ok(Event::CData(cdata)) => {
                let bytes = cdata.into_inner();
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&String::from_utf8_lossy(&bytes));
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(FlexError::Xml(e.to_string())),
        }
    }

    let root = stack
        .pop()
        .ok_or_else(|| FlexError::Xml("empty document".to_string()))?;
    Ok(Value::Object(root.map))
}

fn open_node(start: &BytesStart) -> Result<Node, FlexError> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut map = Map::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| FlexError::Xml(e.to_string()))?;
        let key = format!("@{}", String::from_utf8_lossy(attr.key.as_ref()));
        let value = attr
            .unescape_value()
            .map_err(|e| FlexError::Xml(e.to_string()))?
            .into_owned();
        map.insert(key, Value::String(value));
    }
    Ok(Node {
        name,
        map,
        text: String::new(),
    })
}

fn last_node(stack: &mut [Node]) -> Result<&mut Node, FlexError> {
    stack
        .last_mut()
        .ok_or_else(|| FlexError::Xml("unbalanced element".to_string()))
}

/// An element with neither attributes nor children collapses to its text
/// (or null when empty), matching the semi-structured document shape the
/// statement parsers consume.
fn close_node(map: Map<String, Value>, text: String) -> Value {
    if map.is_empty() {
        if text.is_empty() {
            Value::Null
        } else {
            Value::String(text)
        }
    } else {
        let mut map = map;
        if !text.is_empty() {
            map.insert("$text".to_string(), Value::String(text));
        }
        Value::Object(map)
    }
}

fn attach_child(parent: &mut Node, name: &str, value: Value) {
    match parent.map.get_mut(name) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            parent.map.insert(name.to_string(), value);
        }
    }
}
