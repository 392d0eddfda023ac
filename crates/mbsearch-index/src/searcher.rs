use anyhow::Result;
use std::path::Path;
use tantivy::collector::{Count, TopDocs};
use tantivy::query::{AllQuery, Query, QueryParser, QueryParserError};
use tantivy::schema::{Field, Value};
use tantivy::{Index, IndexReader, ReloadPolicy, TantivyDocument};
use tracing::debug;

use mbsearch_core::traits::SearchCore;
use mbsearch_core::types::{EntityType, Hit, Meta, QueryResult, SearchRequest};

use crate::tantivy_utils::{register_tokenizer, CoreSchema, ID_FIELD};

/// Read side of an entity core.
pub struct CoreSearcher {
	index: Index,
	reader: IndexReader,
	core: CoreSchema,
	default_fields: Vec<Field>,
	stored_fields: Vec<(String, Field)>,
}

impl CoreSearcher {
	pub fn new(index: Index, core: CoreSchema) -> Result<Self> {
		let schema = index.schema();
		let default_fields = core.text_fields().map(|name| schema.get_field(name)).collect::<Result<Vec<_>, _>>()?;
		let stored_fields = schema
			.fields()
			.filter(|(_, entry)| entry.is_stored())
			.map(|(field, entry)| (entry.name().to_string(), field))
			.collect();
		let reader = index.reader_builder().reload_policy(ReloadPolicy::Manual).try_into()?;
		Ok(Self { index, reader, core, default_fields, stored_fields })
	}

	pub fn open_in_dir(index_dir: &Path, core: CoreSchema) -> Result<Self> {
		let index = Index::open_in_dir(index_dir)?;
		register_tokenizer(&index);
		Self::new(index, core)
	}

	/// `None` when the query can't match anything because it names a field
	/// the core doesn't have.
	fn parse_query(&self, text: &str) -> Result<Option<Box<dyn Query>>> {
		let text = text.trim();
		if text.is_empty() || text == "*" || text == "*:*" {
			return Ok(Some(Box::new(AllQuery)));
		}
		let query_parser = QueryParser::for_index(&self.index, self.default_fields.clone());
		match query_parser.parse_query(text) {
			Ok(query) => Ok(Some(query)),
			Err(QueryParserError::FieldDoesNotExist(field)) => {
				debug!(%field, query = text, "query names an unknown field, nothing can match");
				Ok(None)
			}
			Err(e) => Err(e.into()),
		}
	}

	fn to_hit(&self, doc: &TantivyDocument, score: f32, fallback_id: String) -> Hit {
		let mut fields = Meta::new();
		for (name, field) in &self.stored_fields {
			if let Some(value) = doc.get_first(*field).and_then(|v| v.as_str()) {
				fields.insert(name.clone(), value.to_string());
			}
		}
		let id = fields.get(ID_FIELD).cloned().unwrap_or(fallback_id);
		Hit { id, score, fields }
	}
}

impl SearchCore for CoreSearcher {
	fn entity_type(&self) -> EntityType { self.core.entity_type }

	fn execute(&self, request: &SearchRequest) -> Result<QueryResult> {
		let Some(query) = self.parse_query(&request.query)? else {
			return Ok(QueryResult::empty(request.start as u64));
		};
		self.reader.reload()?;
		let searcher = self.reader.searcher();

		let count = searcher.search(query.as_ref(), &Count)?;
		let max_score = if count > 0 {
			searcher.search(query.as_ref(), &TopDocs::with_limit(1))?.first().map(|(score, _)| *score)
		} else {
			None
		};

		let mut hits = Vec::new();
		// tantivy allocates for the whole limit up front
		let limit = request.rows.min(count.saturating_sub(request.start));
		if limit > 0 {
			let top_docs = searcher.search(query.as_ref(), &TopDocs::with_limit(limit).and_offset(request.start))?;
			for (score, addr) in top_docs {
				let doc: TantivyDocument = searcher.doc(addr)?;
				hits.push(self.to_hit(&doc, score, format!("{}/{}", addr.segment_ord, addr.doc_id)));
			}
		}
		debug!(query = %request.query, count, returned = hits.len(), "executed query");
		Ok(QueryResult { hits, count: count as u64, offset: request.start as u64, max_score })
	}
}
