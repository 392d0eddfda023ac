use std::io::Write;

use crate::types::{EntityType, QueryResult, SearchRequest};

/// An index core bound to one entity type.
pub trait SearchCore: Send + Sync {
    fn entity_type(&self) -> EntityType;
    fn execute(&self, request: &SearchRequest) -> anyhow::Result<QueryResult>;
}

/// Turns the result of one query into a response document on `out`.
///
/// Implementations must not write anything when they return an error.
pub trait QueryResponseWriter: Send + Sync {
    fn content_type(&self) -> &'static str;
    fn write(&self, out: &mut dyn Write, request: &SearchRequest, result: &QueryResult) -> crate::error::Result<()>;
}
