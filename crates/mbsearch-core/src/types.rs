//! Domain types shared by the search core, the codec and the writer.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

pub type DocId = String;
pub type Meta = HashMap<String, String>;

/// Name of the reserved stored field holding the archived entity.
pub const STORE_FIELD: &str = "_store";
/// Name of the pseudo field that asks for relevance scores.
pub const SCORE_FIELD: &str = "score";
/// Field list applied when a request does not carry one.
pub const DEFAULT_FIELD_LIST: &str = "score,*";

/// The MusicBrainz entity kinds an index core can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Annotation,
    Area,
    Artist,
    Cdstub,
    Editor,
    Event,
    Instrument,
    Label,
    Place,
    Recording,
    Release,
    ReleaseGroup,
    Series,
    Tag,
    Work,
    Url,
}

impl EntityType {
    pub const ALL: [EntityType; 16] = [
        EntityType::Annotation,
        EntityType::Area,
        EntityType::Artist,
        EntityType::Cdstub,
        EntityType::Editor,
        EntityType::Event,
        EntityType::Instrument,
        EntityType::Label,
        EntityType::Place,
        EntityType::Recording,
        EntityType::Release,
        EntityType::ReleaseGroup,
        EntityType::Series,
        EntityType::Tag,
        EntityType::Work,
        EntityType::Url,
    ];

    /// Configuration spelling, e.g. `release_group`.
    pub fn as_str(self) -> &'static str {
        match self {
            EntityType::Annotation => "annotation",
            EntityType::Area => "area",
            EntityType::Artist => "artist",
            EntityType::Cdstub => "cdstub",
            EntityType::Editor => "editor",
            EntityType::Event => "event",
            EntityType::Instrument => "instrument",
            EntityType::Label => "label",
            EntityType::Place => "place",
            EntityType::Recording => "recording",
            EntityType::Release => "release",
            EntityType::ReleaseGroup => "release_group",
            EntityType::Series => "series",
            EntityType::Tag => "tag",
            EntityType::Work => "work",
            EntityType::Url => "url",
        }
    }

    /// MMD element name of a single entity, e.g. `release-group`.
    pub fn element_name(self) -> &'static str {
        match self {
            EntityType::ReleaseGroup => "release-group",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        EntityType::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted || t.element_name() == wanted)
            .ok_or_else(|| Error::UnsupportedEntityType(wanted.to_string()))
    }
}

/// One match returned by the host search core.
///
/// `fields` holds every stored field of the matched document, including
/// [`STORE_FIELD`] when the document was indexed with a payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Hit {
    pub id: DocId,
    pub score: f32,
    pub fields: Meta,
}

impl Hit {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// Hits of one page plus the envelope numbers the writer echoes back.
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    pub hits: Vec<Hit>,
    /// Total number of matching documents, not just this page.
    pub count: u64,
    pub offset: u64,
    /// Highest score of the whole result set, used to normalize scores.
    pub max_score: Option<f32>,
}

impl QueryResult {
    pub fn empty(offset: u64) -> Self {
        Self { hits: Vec::new(), count: 0, offset, max_score: None }
    }
}

/// A parsed `fl` parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldList {
    fields: Vec<String>,
}

impl FieldList {
    pub fn parse(raw: &str) -> Self {
        let fields = raw
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|f| !f.is_empty())
            .map(str::to_string)
            .collect();
        Self { fields }
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }

    pub fn wants_all_stored(&self) -> bool {
        self.contains("*")
    }
}

impl Default for FieldList {
    fn default() -> Self {
        Self::parse(DEFAULT_FIELD_LIST)
    }
}

impl fmt::Display for FieldList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fields.join(","))
    }
}

/// Request parameters as the host received them.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub query: String,
    /// `None` means the request carried no `fl`; the configured default applies.
    pub field_list: Option<FieldList>,
    pub start: usize,
    pub rows: usize,
    pub writer_name: String,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self { query: query.into(), field_list: None, start: 0, rows: 25, writer_name: "mbxml".to_string() }
    }

    pub fn with_field_list(mut self, fl: &str) -> Self {
        self.field_list = Some(FieldList::parse(fl));
        self
    }

    pub fn with_page(mut self, start: usize, rows: usize) -> Self {
        self.start = start;
        self.rows = rows;
        self
    }

    pub fn with_writer(mut self, name: impl Into<String>) -> Self {
        self.writer_name = name.into();
        self
    }
}
