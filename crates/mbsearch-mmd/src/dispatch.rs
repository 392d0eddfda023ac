//! Entity-type dispatch over the sixteen list slots of [`Metadata`].
//!
//! Each entity type has one [`ListAccessor`] implementation. The
//! [`Dispatcher`] owns a lookup table built once and only read afterwards,
//! so a writer resolves its accessor at construction and never branches on
//! the type per request.

use std::collections::HashMap;
use std::sync::Arc;

use mbsearch_core::error::{Error, Result};
use mbsearch_core::types::EntityType;

use crate::metadata::{EntityList, ListEntry, Metadata};

pub trait ListAccessor: Send + Sync {
    fn entity_type(&self) -> EntityType;

    /// Element name of the list, e.g. `release-group-list`.
    fn list_element(&self) -> &'static str;

    /// Member name of the list in JSON responses, e.g. `release-groups`.
    fn json_key(&self) -> &'static str;

    fn list<'a>(&self, metadata: &'a Metadata) -> Option<&'a EntityList>;

    fn slot<'a>(&self, metadata: &'a mut Metadata) -> &'a mut Option<EntityList>;

    /// The list for this type, created empty when absent.
    fn list_mut<'a>(&self, metadata: &'a mut Metadata) -> &'a mut EntityList {
        self.slot(metadata).get_or_insert_with(EntityList::default)
    }

    fn append(&self, metadata: &mut Metadata, entry: ListEntry) {
        self.list_mut(metadata).entries.push(entry);
    }
}

macro_rules! list_accessors {
    ($($accessor:ident => $kind:ident, $field:ident, $list:literal, $json:literal;)*) => {
        $(
            pub struct $accessor;

            impl ListAccessor for $accessor {
                fn entity_type(&self) -> EntityType { EntityType::$kind }
                fn list_element(&self) -> &'static str { $list }
                fn json_key(&self) -> &'static str { $json }
                fn list<'a>(&self, metadata: &'a Metadata) -> Option<&'a EntityList> { metadata.$field.as_ref() }
                fn slot<'a>(&self, metadata: &'a mut Metadata) -> &'a mut Option<EntityList> { &mut metadata.$field }
            }
        )*

        fn all_accessors() -> Vec<Arc<dyn ListAccessor>> {
            vec![$(Arc::new($accessor) as Arc<dyn ListAccessor>),*]
        }
    };
}

list_accessors! {
    AnnotationListAccessor => Annotation, annotation_list, "annotation-list", "annotations";
    AreaListAccessor => Area, area_list, "area-list", "areas";
    ArtistListAccessor => Artist, artist_list, "artist-list", "artists";
    CdstubListAccessor => Cdstub, cdstub_list, "cdstub-list", "cdstubs";
    EditorListAccessor => Editor, editor_list, "editor-list", "editors";
    EventListAccessor => Event, event_list, "event-list", "events";
    InstrumentListAccessor => Instrument, instrument_list, "instrument-list", "instruments";
    LabelListAccessor => Label, label_list, "label-list", "labels";
    PlaceListAccessor => Place, place_list, "place-list", "places";
    RecordingListAccessor => Recording, recording_list, "recording-list", "recordings";
    ReleaseListAccessor => Release, release_list, "release-list", "releases";
    ReleaseGroupListAccessor => ReleaseGroup, release_group_list, "release-group-list", "release-groups";
    SeriesListAccessor => Series, series_list, "series-list", "series";
    TagListAccessor => Tag, tag_list, "tag-list", "tags";
    WorkListAccessor => Work, work_list, "work-list", "works";
    UrlListAccessor => Url, url_list, "url-list", "urls";
}

pub struct Dispatcher {
    table: HashMap<EntityType, Arc<dyn ListAccessor>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        let table: HashMap<_, _> = all_accessors().into_iter().map(|a| (a.entity_type(), a)).collect();
        debug_assert_eq!(table.len(), EntityType::ALL.len(), "every entity type needs an accessor");
        Self { table }
    }

    pub fn resolve(&self, kind: EntityType) -> Result<Arc<dyn ListAccessor>> {
        self.table
            .get(&kind)
            .cloned()
            .ok_or_else(|| Error::UnsupportedEntityType(kind.to_string()))
    }

    /// Parse a configured type name and resolve it.
    pub fn resolve_name(&self, name: &str) -> Result<Arc<dyn ListAccessor>> {
        self.resolve(name.parse()?)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}
