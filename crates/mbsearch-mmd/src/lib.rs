//! mbsearch-mmd
//!
//! MusicBrainz metadata (MMD 2.0) documents as far as the search writer
//! needs them: the stored-record codec, the `<metadata>` aggregate with its
//! sixteen entity lists, entity-type dispatch, and XML/JSON rendering.

pub mod codec;
pub mod dispatch;
pub mod element;
pub mod json;
pub mod metadata;
pub mod response;

pub use codec::{Entity, StoredRecordCodec, EXT_NS, MMD_NS};
pub use dispatch::{Dispatcher, ListAccessor};
pub use element::{Element, Node, XmlError};
pub use metadata::{EntityList, ListEntry, Metadata};
