//! mbsearch-index
//!
//! Tantivy-backed entity cores: each core is bound to one entity type,
//! archives the full entity document in a stored-only field and answers
//! queries with hits carrying every stored field.

pub mod document;
pub mod indexer;
pub mod searcher;
pub mod tantivy_utils;

pub use document::IndexDocument;
pub use indexer::{CoreIndexer, IndexReport};
pub use searcher::CoreSearcher;
pub use tantivy_utils::CoreSchema;
