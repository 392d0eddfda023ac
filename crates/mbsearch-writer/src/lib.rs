//! mbsearch-writer
//!
//! Turns the hits of an entity core into MMD response documents. Each hit's
//! stored record is decoded back into an entity, collected into the list of
//! the core's entity type and serialized as XML (`mbxml`) or JSON (`mbjson`).

pub mod assembler;
pub mod registry;
pub mod writer;

pub use assembler::{normalize_score, ResultAssembler};
pub use registry::WriterRegistry;
pub use writer::{MbResponseWriter, WireFormat, JSON_WRITER, XML_WRITER};
