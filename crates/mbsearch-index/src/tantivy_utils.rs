use tantivy::schema::{IndexRecordOption, Schema, TextFieldIndexing, TextOptions, STORED, STRING};
use tantivy::tokenizer::{AsciiFoldingFilter, LowerCaser, SimpleTokenizer, TextAnalyzer};
use tantivy::Index;

use mbsearch_core::config::CoreConfig;
use mbsearch_core::types::{EntityType, STORE_FIELD};

pub const ID_FIELD: &str = "id";
pub const TEXT_TOKENIZER: &str = "mb_text";

/// Field layout of one entity core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreSchema {
	pub entity_type: EntityType,
	pub store_field: String,
	/// Searchable text fields, filled from entity attributes and child elements.
	pub fields: Vec<String>,
}

impl CoreSchema {
	pub fn new(entity_type: EntityType, fields: &[&str]) -> Self {
		Self { entity_type, store_field: STORE_FIELD.to_string(), fields: fields.iter().map(|f| f.to_string()).collect() }
	}

	pub fn from_config(config: &CoreConfig) -> mbsearch_core::Result<Self> {
		Ok(Self { entity_type: config.writer.entity_type()?, store_field: config.writer.store_field.clone(), fields: config.fields.clone() })
	}

	/// Text fields without the reserved names.
	pub fn text_fields(&self) -> impl Iterator<Item = &str> {
		self.fields.iter().map(String::as_str).filter(move |f| *f != ID_FIELD && *f != self.store_field)
	}
}

pub fn build_schema(core: &CoreSchema) -> Schema {
	let mut schema_builder = Schema::builder();
	schema_builder.add_text_field(ID_FIELD, STRING | STORED);
	// The payload is archived verbatim and never searched.
	schema_builder.add_text_field(&core.store_field, STORED);
	let text_field_indexing = TextFieldIndexing::default().set_tokenizer(TEXT_TOKENIZER).set_index_option(IndexRecordOption::WithFreqsAndPositions);
	let text_options = TextOptions::default().set_indexing_options(text_field_indexing).set_stored();
	let mut seen: Vec<&str> = Vec::new();
	for name in core.text_fields() {
		if seen.contains(&name) { continue; }
		seen.push(name);
		schema_builder.add_text_field(name, text_options.clone());
	}
	schema_builder.build()
}

/// Names are matched case- and accent-insensitively, and stop words are kept
/// ("The The" is a band).
pub fn register_tokenizer(index: &Index) {
	let tokenizer = TextAnalyzer::builder(SimpleTokenizer::default())
		.filter(LowerCaser)
		.filter(AsciiFoldingFilter)
		.build();
	index.tokenizers().register(TEXT_TOKENIZER, tokenizer);
}
