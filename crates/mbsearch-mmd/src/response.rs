//! Rendering of the `<metadata>` response document and parsing it back.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;

use crate::codec::{Entity, EXT_NS, MMD_NS};
use crate::dispatch::ListAccessor;
use crate::element::{parse_document, write_element, Element, XmlError};
use crate::metadata::{EntityList, ListEntry, Metadata};

/// Qualified name of the score attribute on each listed entity.
pub const SCORE_ATTRIBUTE: &str = "ns2:score";

const ROOT_ELEMENT: &str = "metadata";

/// Render the accessor's list of `metadata` as an MMD document.
pub fn render_xml(metadata: &Metadata, accessor: &dyn ListAccessor) -> Result<Vec<u8>, XmlError> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;

    let mut root = BytesStart::new(ROOT_ELEMENT);
    root.push_attribute(("xmlns", MMD_NS));
    root.push_attribute(("xmlns:ns2", EXT_NS));
    writer.write_event(Event::Start(root))?;

    if let Some(list) = accessor.list(metadata) {
        write_list(&mut writer, accessor.list_element(), list)?;
    }

    writer.write_event(Event::End(BytesEnd::new(ROOT_ELEMENT)))?;
    Ok(writer.into_inner())
}

fn write_list(writer: &mut Writer<Vec<u8>>, name: &str, list: &EntityList) -> Result<(), XmlError> {
    let count = list.count.to_string();
    let offset = list.offset.to_string();
    let mut start = BytesStart::new(name);
    start.push_attribute(("count", count.as_str()));
    start.push_attribute(("offset", offset.as_str()));
    if list.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }
    writer.write_event(Event::Start(start))?;
    for entry in &list.entries {
        match entry.score {
            Some(score) => {
                let score = score.to_string();
                write_element(writer, entry.entity.root(), &[(SCORE_ATTRIBUTE, score.as_str())])?;
            }
            None => write_element(writer, entry.entity.root(), &[])?,
        }
    }
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// Parse a document produced by [`render_xml`] back into a [`Metadata`]
/// with the accessor's list filled in.
pub fn parse_xml(xml: &str, accessor: &dyn ListAccessor) -> Result<Metadata, XmlError> {
    let root = parse_document(xml)?;
    if root.name != ROOT_ELEMENT {
        return Err(XmlError::UnexpectedElement { expected: ROOT_ELEMENT.to_string(), found: root.name });
    }
    if let Some(ns) = root.attribute("xmlns") {
        if ns != MMD_NS {
            return Err(XmlError::ForeignNamespace(ns.to_string()));
        }
    }

    let list_name = accessor.list_element();
    let list_el = root.child(list_name).ok_or_else(|| XmlError::MissingElement(list_name.to_string()))?;

    let mut list = EntityList::new(numeric_attribute(list_el, "count")?, numeric_attribute(list_el, "offset")?);
    for item in list_el.elements() {
        let mut item = item.clone();
        let score = match item.remove_attribute(SCORE_ATTRIBUTE) {
            Some(raw) => Some(raw.parse::<u32>().map_err(|_| XmlError::InvalidNumber { attribute: SCORE_ATTRIBUTE.to_string(), value: raw })?),
            None => None,
        };
        list.entries.push(ListEntry { entity: Entity::new(accessor.entity_type(), item)?, score });
    }

    let mut metadata = Metadata::default();
    *accessor.slot(&mut metadata) = Some(list);
    Ok(metadata)
}

fn numeric_attribute(element: &Element, name: &str) -> Result<u64, XmlError> {
    match element.attribute(name) {
        None => Ok(0),
        Some(raw) => raw
            .parse()
            .map_err(|_| XmlError::InvalidNumber { attribute: name.to_string(), value: raw.to_string() }),
    }
}
