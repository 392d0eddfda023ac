use mbsearch_mmd::Entity;

use crate::tantivy_utils::{CoreSchema, ID_FIELD};

/// Field/value pairs of one document about to be indexed.
///
/// Names must exist in the core schema; a name may repeat for multi-valued fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexDocument {
	pub fields: Vec<(String, String)>,
}

impl IndexDocument {
	pub fn new() -> Self { Self::default() }

	pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.fields.push((name.into(), value.into()));
		self
	}

	pub fn values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
		self.fields.iter().filter(move |(k, _)| k == name).map(|(_, v)| v.as_str())
	}

	/// Build the document for an archived entity: its id, the verbatim
	/// payload, and every configured field found among the root's attributes
	/// or direct child elements.
	pub fn from_entity(entity: &Entity, raw_payload: &str, core: &CoreSchema) -> Self {
		let root = entity.root();
		let mut doc = IndexDocument::new();
		if let Some(id) = entity.id() {
			doc = doc.with(ID_FIELD, id);
		}
		doc = doc.with(core.store_field.clone(), raw_payload);
		for name in core.text_fields() {
			if let Some(value) = root.attribute(name) {
				doc = doc.with(name, value);
			}
			for child in root.elements().filter(|c| c.name == name) {
				let text = child.text();
				if !text.is_empty() { doc = doc.with(name, text); }
			}
		}
		doc
	}
}
