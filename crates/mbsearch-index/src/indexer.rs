use anyhow::{anyhow, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tantivy::schema::{Field, FieldType, Schema};
use tantivy::{Index, IndexWriter, TantivyDocument};
use tracing::{info, warn};

use mbsearch_core::payload_loader::StoredPayload;
use mbsearch_mmd::{Entity, StoredRecordCodec};

use crate::document::IndexDocument;
use crate::searcher::CoreSearcher;
use crate::tantivy_utils::{build_schema, register_tokenizer, CoreSchema, ID_FIELD};

const WRITER_MEMORY_BYTES: usize = 50_000_000;

/// Outcome of indexing a batch of archived payloads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexReport {
	pub indexed: usize,
	pub skipped: usize,
}

pub struct CoreIndexer {
	index: Index,
	schema: Schema,
	core: CoreSchema,
}

impl CoreIndexer {
	/// Create a fresh index in `index_dir`, replacing whatever was there.
	pub fn create_in_dir(index_dir: PathBuf, core: CoreSchema) -> Result<Self> {
		let schema = build_schema(&core);
		if index_dir.exists() { std::fs::remove_dir_all(&index_dir)?; }
		std::fs::create_dir_all(&index_dir)?;
		let index = Index::create_in_dir(&index_dir, schema.clone())?;
		register_tokenizer(&index);
		Ok(Self { index, schema, core })
	}

	pub fn create_in_ram(core: CoreSchema) -> Result<Self> {
		let schema = build_schema(&core);
		let index = Index::create_in_ram(schema.clone());
		register_tokenizer(&index);
		Ok(Self { index, schema, core })
	}

	/// A searcher over this index; it sees every commit made through this indexer.
	pub fn searcher(&self) -> Result<CoreSearcher> {
		CoreSearcher::new(self.index.clone(), self.core.clone())
	}

	pub fn add_document(&self, doc: &IndexDocument) -> Result<()> {
		self.add_documents(std::slice::from_ref(doc)).map(|_| ())
	}

	/// Index a decoded entity, archiving `raw_payload` as its stored record.
	pub fn add_entity(&self, entity: &Entity, raw_payload: &str) -> Result<()> {
		if entity.kind() != self.core.entity_type {
			return Err(anyhow!("cannot index a {} in the {} core", entity.kind(), self.core.entity_type));
		}
		self.add_document(&IndexDocument::from_entity(entity, raw_payload, &self.core))
	}

	/// Add and commit `docs`. Documents keep their insertion order.
	pub fn add_documents(&self, docs: &[IndexDocument]) -> Result<usize> {
		let mut index_writer: IndexWriter = self.index.writer_with_num_threads(1, WRITER_MEMORY_BYTES)?;
		for doc in docs {
			index_writer.add_document(self.to_tantivy(doc)?)?;
		}
		index_writer.commit()?;
		Ok(docs.len())
	}

	/// Remove every document.
	pub fn clear(&self) -> Result<()> {
		let mut index_writer: IndexWriter = self.index.writer_with_num_threads(1, WRITER_MEMORY_BYTES)?;
		index_writer.delete_all_documents()?;
		index_writer.commit()?;
		Ok(())
	}

	/// Decode each payload with the core's codec and index the ones that
	/// decode; the raw text is archived unchanged in the store field.
	pub fn index_payloads(&self, payloads: &[StoredPayload]) -> Result<IndexReport> {
		let codec = StoredRecordCodec::new(self.core.entity_type);
		let pb = ProgressBar::new(payloads.len() as u64);
		pb.set_style(ProgressStyle::default_bar().template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} payloads ({percent}%) {msg}")?.progress_chars("#>-"));
		let mut report = IndexReport::default();
		let mut docs = Vec::with_capacity(payloads.len());
		for payload in payloads {
			match codec.decode(&payload.xml) {
				Ok(entity) => {
					let mut doc = IndexDocument::from_entity(&entity, &payload.xml, &self.core);
					if entity.id().is_none() { doc = doc.with(ID_FIELD, payload.id.clone()); }
					docs.push(doc);
					report.indexed += 1;
				}
				Err(e) => {
					warn!(file = %payload.path.display(), error = %e, "skipping payload that does not decode as {}", self.core.entity_type);
					report.skipped += 1;
				}
			}
			pb.inc(1);
		}
		self.add_documents(&docs)?;
		pb.finish_with_message("done");
		info!(indexed = report.indexed, skipped = report.skipped, entity_type = %self.core.entity_type, "indexed payloads");
		Ok(report)
	}

	fn to_tantivy(&self, doc: &IndexDocument) -> Result<TantivyDocument> {
		let mut out = TantivyDocument::default();
		for (name, value) in &doc.fields {
			let field: Field = self.schema.get_field(name).map_err(|_| anyhow!("unknown field '{}' for the {} core", name, self.core.entity_type))?;
			match self.schema.get_field_entry(field).field_type() {
				FieldType::Str(_) => out.add_text(field, value),
				other => return Err(anyhow!("field '{}' has unsupported type {:?}", name, other.value_type())),
			}
		}
		Ok(out)
	}
}
