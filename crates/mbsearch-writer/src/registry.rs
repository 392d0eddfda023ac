use std::collections::BTreeMap;
use std::sync::Arc;

use mbsearch_core::config::WriterConfig;
use mbsearch_core::error::Result;
use mbsearch_core::traits::QueryResponseWriter;
use mbsearch_mmd::Dispatcher;

use crate::writer::{MbResponseWriter, WireFormat};

/// Response writers of one core, looked up by the request's writer name.
#[derive(Default)]
pub struct WriterRegistry {
    writers: BTreeMap<String, Arc<dyn QueryResponseWriter>>,
}

impl WriterRegistry {
    pub fn new() -> Self { Self::default() }

    /// `mbxml` and `mbjson` writers for the configured entity type.
    pub fn for_core(config: &WriterConfig) -> Result<Self> {
        let dispatcher = Dispatcher::new();
        let mut registry = Self::new();
        for format in WireFormat::ALL {
            let writer = MbResponseWriter::with_dispatcher(config, format, &dispatcher)?;
            registry.register(format.name(), Arc::new(writer));
        }
        Ok(registry)
    }

    /// Add or replace the writer for `name`.
    pub fn register(&mut self, name: impl Into<String>, writer: Arc<dyn QueryResponseWriter>) {
        self.writers.insert(name.into(), writer);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn QueryResponseWriter>> {
        self.writers.get(name).cloned()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.writers.keys().map(String::as_str)
    }
}
