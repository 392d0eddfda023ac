use crate::codec::Entity;
use crate::dispatch::ListAccessor;
use crate::element::XmlError;

/// A decoded entity together with its normalized search score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub entity: Entity,
    pub score: Option<u32>,
}

/// The `<xxx-list count=".." offset="..">` envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityList {
    pub count: u64,
    pub offset: u64,
    pub entries: Vec<ListEntry>,
}

impl EntityList {
    pub fn new(count: u64, offset: u64) -> Self {
        Self { count, offset, entries: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entries.iter().map(|e| &e.entity)
    }
}

/// Root `<metadata>` aggregate with one slot per entity list type.
///
/// Slots are reached through a [`crate::dispatch::ListAccessor`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    pub annotation_list: Option<EntityList>,
    pub area_list: Option<EntityList>,
    pub artist_list: Option<EntityList>,
    pub cdstub_list: Option<EntityList>,
    pub editor_list: Option<EntityList>,
    pub event_list: Option<EntityList>,
    pub instrument_list: Option<EntityList>,
    pub label_list: Option<EntityList>,
    pub place_list: Option<EntityList>,
    pub recording_list: Option<EntityList>,
    pub release_list: Option<EntityList>,
    pub release_group_list: Option<EntityList>,
    pub series_list: Option<EntityList>,
    pub tag_list: Option<EntityList>,
    pub work_list: Option<EntityList>,
    pub url_list: Option<EntityList>,
}

impl Metadata {
    /// Parse an XML response document, filling the accessor's list.
    pub fn from_xml(xml: &str, accessor: &dyn ListAccessor) -> Result<Self, XmlError> {
        crate::response::parse_xml(xml, accessor)
    }

    pub fn to_xml(&self, accessor: &dyn ListAccessor) -> Result<Vec<u8>, XmlError> {
        crate::response::render_xml(self, accessor)
    }

    pub fn to_json(&self, accessor: &dyn ListAccessor) -> Result<Vec<u8>, serde_json::Error> {
        crate::json::render_json(self, accessor)
    }
}
