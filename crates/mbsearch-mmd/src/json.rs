//! JSON rendering of MMD element trees and response documents.
//!
//! Mapping: attributes become string members (prefix removed, `xmlns`
//! declarations dropped), text-only children become strings, repeated
//! children become arrays, `*-list` children become arrays of their items,
//! and text next to attributes or children is kept under `value`.

use serde_json::{Map, Value};

use crate::dispatch::ListAccessor;
use crate::element::{local_name, Element};
use crate::metadata::Metadata;

const TEXT_MEMBER: &str = "value";

fn is_namespace_declaration(name: &str) -> bool {
    name == "xmlns" || name.starts_with("xmlns:")
}

fn has_plain_attributes(element: &Element) -> bool {
    element.attributes.iter().any(|(k, _)| !is_namespace_declaration(k))
}

/// JSON value of a nested element: a string for simple leaves, otherwise an object.
pub fn element_value(element: &Element) -> Value {
    if !has_plain_attributes(element) && !element.has_child_elements() {
        return Value::String(element.text());
    }
    Value::Object(element_object(element))
}

/// JSON object of an element; entities always render as objects.
pub fn element_object(element: &Element) -> Map<String, Value> {
    let mut object = Map::new();
    for (key, value) in &element.attributes {
        if is_namespace_declaration(key) {
            continue;
        }
        object.insert(local_name(key).to_string(), Value::String(value.clone()));
    }

    let mut groups: Vec<(&str, Vec<&Element>)> = Vec::new();
    for child in element.elements() {
        match groups.iter_mut().find(|(name, _)| *name == child.name) {
            Some((_, members)) => members.push(child),
            None => groups.push((child.name.as_str(), vec![child])),
        }
    }
    for (name, members) in groups {
        let value = match members.as_slice() {
            [list] if name.ends_with("-list") => Value::Array(list.elements().map(element_value).collect()),
            [single] => element_value(single),
            many => Value::Array(many.iter().map(|e| element_value(e)).collect()),
        };
        object.insert(local_name(name).to_string(), value);
    }

    let text = element.text();
    if !text.is_empty() {
        object.insert(TEXT_MEMBER.to_string(), Value::String(text));
    }
    object
}

/// The JSON document for the accessor's list: `count`, `offset` and the
/// entities under the type's plural key.
pub fn response_value(metadata: &Metadata, accessor: &dyn ListAccessor) -> Value {
    let mut root = Map::new();
    let (count, offset, items) = match accessor.list(metadata) {
        Some(list) => {
            let items = list
                .entries
                .iter()
                .map(|entry| {
                    let mut object = element_object(entry.entity.root());
                    if let Some(score) = entry.score {
                        object.insert("score".to_string(), Value::from(score));
                    }
                    Value::Object(object)
                })
                .collect();
            (list.count, list.offset, items)
        }
        None => (0, 0, Vec::new()),
    };
    root.insert("count".to_string(), Value::from(count));
    root.insert("offset".to_string(), Value::from(offset));
    root.insert(accessor.json_key().to_string(), Value::Array(items));
    Value::Object(root)
}

pub fn render_json(metadata: &Metadata, accessor: &dyn ListAccessor) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(&response_value(metadata, accessor))
}
