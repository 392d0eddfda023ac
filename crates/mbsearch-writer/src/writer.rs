use std::io::Write;
use std::sync::Arc;

use tracing::{debug, warn};

use mbsearch_core::config::WriterConfig;
use mbsearch_core::error::{Error, Result};
use mbsearch_core::traits::QueryResponseWriter;
use mbsearch_core::types::{EntityType, FieldList, QueryResult, SearchRequest};
use mbsearch_mmd::{Dispatcher, ListAccessor};

use crate::assembler::ResultAssembler;

pub const XML_WRITER: &str = "mbxml";
pub const JSON_WRITER: &str = "mbjson";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireFormat {
    Xml,
    Json,
}

impl WireFormat {
    pub const ALL: [WireFormat; 2] = [WireFormat::Xml, WireFormat::Json];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            XML_WRITER => Some(WireFormat::Xml),
            JSON_WRITER => Some(WireFormat::Json),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            WireFormat::Xml => XML_WRITER,
            WireFormat::Json => JSON_WRITER,
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            WireFormat::Xml => "application/xml; charset=UTF-8",
            WireFormat::Json => "application/json; charset=UTF-8",
        }
    }
}

/// Response writer bound to one entity type and one wire format.
///
/// Everything it needs is resolved at construction; a writer is immutable
/// afterwards and can serve concurrent requests.
pub struct MbResponseWriter {
    format: WireFormat,
    accessor: Arc<dyn ListAccessor>,
    assembler: ResultAssembler,
    score_field: String,
    default_field_list: FieldList,
}

impl MbResponseWriter {
    pub fn new(config: &WriterConfig, format: WireFormat) -> Result<Self> {
        Self::with_dispatcher(config, format, &Dispatcher::new())
    }

    /// Fails with [`Error::UnsupportedEntityType`] when the configured type
    /// is unknown.
    pub fn with_dispatcher(config: &WriterConfig, format: WireFormat, dispatcher: &Dispatcher) -> Result<Self> {
        if config.store_field.trim().is_empty() {
            return Err(Error::InvalidConfig("store_field must not be empty".to_string()));
        }
        if config.score_field.trim().is_empty() {
            return Err(Error::InvalidConfig("score_field must not be empty".to_string()));
        }
        let accessor = dispatcher.resolve_name(&config.entity_type)?;
        let assembler = ResultAssembler::new(accessor.clone(), config.store_field.clone());
        debug!(entity_type = %accessor.entity_type(), writer = format.name(), "response writer ready");
        Ok(Self {
            format,
            accessor,
            assembler,
            score_field: config.score_field.clone(),
            default_field_list: FieldList::parse(&config.default_field_list),
        })
    }

    pub fn entity_type(&self) -> EntityType {
        self.accessor.entity_type()
    }

    pub fn format(&self) -> WireFormat {
        self.format
    }

    /// Render the complete response document.
    pub fn render(&self, request: &SearchRequest, result: &QueryResult) -> Result<Vec<u8>> {
        let field_list = request.field_list.as_ref().unwrap_or(&self.default_field_list);
        if !field_list.contains(&self.score_field) {
            warn!(fl = %field_list, "rejecting request without '{}' in the field list", self.score_field);
            return Err(Error::ScoreFieldMissing);
        }

        let metadata = match self.assembler.assemble(result) {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!(entity_type = %self.entity_type(), error = %e, "could not assemble response");
                return Err(e);
            }
        };

        let body = match self.format {
            WireFormat::Xml => metadata.to_xml(self.accessor.as_ref()).map_err(|e| Error::Render(e.to_string()))?,
            WireFormat::Json => metadata.to_json(self.accessor.as_ref()).map_err(|e| Error::Render(e.to_string()))?,
        };
        debug!(writer = self.format.name(), bytes = body.len(), "rendered response");
        Ok(body)
    }

    /// Render, then write the whole document to `out`.
    pub fn write(&self, out: &mut dyn Write, request: &SearchRequest, result: &QueryResult) -> Result<()> {
        let body = self.render(request, result)?;
        out.write_all(&body)?;
        Ok(())
    }
}

impl QueryResponseWriter for MbResponseWriter {
    fn content_type(&self) -> &'static str { self.format.content_type() }
    fn write(&self, out: &mut dyn Write, request: &SearchRequest, result: &QueryResult) -> Result<()> { Self::write(self, out, request, result) }
}
