use quick_xml::Writer;

use mbsearch_core::types::EntityType;

use crate::element::{parse_document, write_element, Element, XmlError};

/// Default namespace of MusicBrainz metadata documents.
pub const MMD_NS: &str = "http://musicbrainz.org/ns/mmd-2.0#";
/// Extension namespace carrying search scores.
pub const EXT_NS: &str = "http://musicbrainz.org/ns/ext#-2.0";

/// One decoded entity of a known type.
///
/// The root element name always matches `kind`; the default namespace
/// declaration and any search score left on the root are not kept on the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    kind: EntityType,
    root: Element,
}

impl Entity {
    pub fn new(kind: EntityType, mut root: Element) -> Result<Self, XmlError> {
        if root.name != kind.element_name() {
            return Err(XmlError::UnexpectedElement { expected: kind.element_name().to_string(), found: root.name });
        }
        if let Some(ns) = root.remove_attribute("xmlns") {
            if ns != MMD_NS {
                return Err(XmlError::ForeignNamespace(ns));
            }
        }
        strip_search_score(&mut root);
        Ok(Self { kind, root })
    }

    pub fn kind(&self) -> EntityType {
        self.kind
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn into_root(self) -> Element {
        self.root
    }

    /// The MBID (or discid, editor id) when the entity has one.
    pub fn id(&self) -> Option<&str> {
        self.root.attribute("id")
    }
}

/// Remove score attributes of the extension namespace from `root`; responses
/// write their own `ns2:score` there.
fn strip_search_score(root: &mut Element) {
    let ext_prefixes: Vec<String> = root
        .attributes
        .iter()
        .filter(|(k, v)| k.starts_with("xmlns:") && v == EXT_NS)
        .map(|(k, _)| k["xmlns:".len()..].to_string())
        .collect();
    root.attributes.retain(|(k, _)| match k.split_once(':') {
        Some(("ns2", "score")) => false,
        Some((prefix, "score")) => !ext_prefixes.iter().any(|p| p == prefix),
        _ => true,
    });
}

/// Turns archived `_store` payloads into entities and back.
#[derive(Debug, Clone, Copy)]
pub struct StoredRecordCodec {
    kind: EntityType,
}

impl StoredRecordCodec {
    pub fn new(kind: EntityType) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> EntityType {
        self.kind
    }

    pub fn decode(&self, raw: &str) -> Result<Entity, XmlError> {
        Entity::new(self.kind, parse_document(raw)?)
    }

    pub fn decode_bytes(&self, raw: &[u8]) -> Result<Entity, XmlError> {
        self.decode(std::str::from_utf8(raw)?)
    }

    /// Canonical payload for `entity`: the root carries the MMD namespace,
    /// no XML declaration, no insignificant whitespace.
    pub fn encode(&self, entity: &Entity) -> Result<String, XmlError> {
        if entity.kind() != self.kind {
            return Err(XmlError::UnexpectedElement {
                expected: self.kind.element_name().to_string(),
                found: entity.root().name.clone(),
            });
        }
        let mut writer = Writer::new(Vec::new());
        write_element(&mut writer, entity.root(), &[("xmlns", MMD_NS)])?;
        Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
    }
}
