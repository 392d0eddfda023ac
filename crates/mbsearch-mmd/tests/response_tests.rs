use mbsearch_core::error::Error;
use mbsearch_core::types::EntityType;
use mbsearch_mmd::json::{element_value, render_json, response_value};
use mbsearch_mmd::response::{parse_xml, render_xml, SCORE_ATTRIBUTE};
use mbsearch_mmd::{Dispatcher, Element, Entity, EntityList, ListEntry, Metadata, StoredRecordCodec};
use serde_json::json;

fn entry(kind: EntityType, id: &str, name: &str, score: Option<u32>) -> ListEntry {
    let root = Element::new(kind.element_name()).with_attribute("id", id).with_child(Element::leaf("name", name));
    ListEntry { entity: Entity::new(kind, root).unwrap(), score }
}

#[test]
fn dispatcher_covers_every_entity_type() {
    let dispatcher = Dispatcher::new();
    assert_eq!(dispatcher.len(), EntityType::ALL.len());
    for kind in EntityType::ALL {
        let accessor = dispatcher.resolve(kind).unwrap();
        assert_eq!(accessor.entity_type(), kind);
        assert_eq!(accessor.list_element(), format!("{}-list", kind.element_name()));
    }
    assert_eq!(dispatcher.resolve(EntityType::ReleaseGroup).unwrap().json_key(), "release-groups");
    assert_eq!(dispatcher.resolve(EntityType::Series).unwrap().json_key(), "series");
}

#[test]
fn dispatcher_rejects_unknown_names() {
    let dispatcher = Dispatcher::new();
    assert!(dispatcher.resolve_name("label").is_ok());
    let err = dispatcher.resolve_name("medium").err().expect("unknown type");
    assert!(matches!(err, Error::UnsupportedEntityType(_)));
}

#[test]
fn accessors_touch_only_their_own_slot() {
    let dispatcher = Dispatcher::new();
    for kind in EntityType::ALL {
        let accessor = dispatcher.resolve(kind).unwrap();
        let mut metadata = Metadata::default();
        accessor.append(&mut metadata, entry(kind, "1", "one", None));
        for other in EntityType::ALL {
            let other_accessor = dispatcher.resolve(other).unwrap();
            assert_eq!(other_accessor.list(&metadata).is_some(), other == kind, "{} vs {}", kind, other);
        }
        assert_eq!(accessor.list(&metadata).unwrap().len(), 1);
    }
}

#[test]
fn xml_round_trip_keeps_order_scores_and_envelope() {
    let dispatcher = Dispatcher::new();
    let accessor = dispatcher.resolve(EntityType::Artist).unwrap();
    let mut metadata = Metadata::default();
    *accessor.list_mut(&mut metadata) = EntityList::new(42, 10);
    accessor.append(&mut metadata, entry(EntityType::Artist, "a", "First", Some(100)));
    accessor.append(&mut metadata, entry(EntityType::Artist, "b", "Second", Some(57)));

    let xml = String::from_utf8(render_xml(&metadata, accessor.as_ref()).unwrap()).unwrap();
    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>"));
    assert!(xml.contains("<metadata xmlns=\"http://musicbrainz.org/ns/mmd-2.0#\" xmlns:ns2=\"http://musicbrainz.org/ns/ext#-2.0\">"));
    assert!(xml.contains("<artist-list count=\"42\" offset=\"10\">"));
    assert!(xml.contains(&format!("<artist {}=\"57\" id=\"b\">", SCORE_ATTRIBUTE)));

    let parsed = parse_xml(&xml, accessor.as_ref()).unwrap();
    assert_eq!(parsed, metadata);
}

#[test]
fn empty_list_is_rendered_and_parsed() {
    let dispatcher = Dispatcher::new();
    let accessor = dispatcher.resolve(EntityType::Work).unwrap();
    let mut metadata = Metadata::default();
    accessor.list_mut(&mut metadata);

    let xml = String::from_utf8(render_xml(&metadata, accessor.as_ref()).unwrap()).unwrap();
    assert!(xml.contains("<work-list count=\"0\" offset=\"0\"/>"));
    let list = parse_xml(&xml, accessor.as_ref()).unwrap().work_list.expect("work list");
    assert_eq!((list.count, list.offset, list.len()), (0, 0, 0));
}

#[test]
fn parse_xml_reports_missing_list() {
    let dispatcher = Dispatcher::new();
    let accessor = dispatcher.resolve(EntityType::Url).unwrap();
    let xml = r#"<metadata xmlns="http://musicbrainz.org/ns/mmd-2.0#"><area-list count="0" offset="0"/></metadata>"#;
    assert!(parse_xml(xml, accessor.as_ref()).is_err());
}

#[test]
fn listed_entities_match_stored_payloads() {
    let dispatcher = Dispatcher::new();
    let accessor = dispatcher.resolve(EntityType::Label).unwrap();
    let codec = StoredRecordCodec::new(EntityType::Label);
    let stored = codec.decode(r#"<label xmlns="http://musicbrainz.org/ns/mmd-2.0#" id="l"><name>Apple</name><label-code>46</label-code></label>"#).unwrap();

    let mut metadata = Metadata::default();
    accessor.list_mut(&mut metadata).count = 1;
    accessor.append(&mut metadata, ListEntry { entity: stored.clone(), score: Some(100) });

    let xml = String::from_utf8(render_xml(&metadata, accessor.as_ref()).unwrap()).unwrap();
    let parsed = parse_xml(&xml, accessor.as_ref()).unwrap();
    assert_eq!(parsed.label_list.unwrap().entries[0].entity, stored);
}

#[test]
fn json_response_shape() {
    let dispatcher = Dispatcher::new();
    let accessor = dispatcher.resolve(EntityType::ReleaseGroup).unwrap();
    let mut metadata = Metadata::default();
    *accessor.list_mut(&mut metadata) = EntityList::new(3, 1);
    accessor.append(&mut metadata, entry(EntityType::ReleaseGroup, "rg1", "Abbey Road", Some(88)));

    let value = response_value(&metadata, accessor.as_ref());
    assert_eq!(value, json!({
        "count": 3,
        "offset": 1,
        "release-groups": [{"id": "rg1", "name": "Abbey Road", "score": 88}],
    }));

    let bytes = render_json(&metadata, accessor.as_ref()).unwrap();
    let reparsed: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(reparsed, value);
}

#[test]
fn json_element_mapping() {
    let el = Element::new("artist")
        .with_attribute("xmlns:ext", "urn:ext")
        .with_attribute("ext:rank", "1")
        .with_child(Element::leaf("name", "Queen"))
        .with_child(Element::new("alias-list").with_child(Element::leaf("alias", "Q")).with_child(Element::leaf("alias", "QN")))
        .with_child(Element::new("ipi").with_text("1"))
        .with_child(Element::new("ipi").with_text("2"))
        .with_child(Element::new("gender").with_attribute("id", "g").with_text("Male"));

    assert_eq!(element_value(&el), json!({
        "rank": "1",
        "name": "Queen",
        "alias-list": ["Q", "QN"],
        "ipi": ["1", "2"],
        "gender": {"id": "g", "value": "Male"},
    }));
    assert_eq!(element_value(&Element::leaf("country", "GB")), json!("GB"));
}

#[test]
fn stored_score_does_not_clash_with_response_score() {
    let dispatcher = Dispatcher::new();
    let accessor = dispatcher.resolve(EntityType::Artist).unwrap();
    let payload = format!(r#"<artist xmlns:ns2="{}" ns2:score="7" id="a"/>"#, mbsearch_mmd::EXT_NS);
    let entity = StoredRecordCodec::new(EntityType::Artist).decode(&payload).unwrap();

    let mut metadata = Metadata::default();
    *accessor.list_mut(&mut metadata) = EntityList::new(1, 0);
    accessor.append(&mut metadata, ListEntry { entity, score: Some(100) });

    let xml = String::from_utf8(render_xml(&metadata, accessor.as_ref()).unwrap()).unwrap();
    assert_eq!(xml.matches("ns2:score=").count(), 1, "{}", xml);
    let parsed = parse_xml(&xml, accessor.as_ref()).unwrap();
    assert_eq!(parsed, metadata);
    assert_eq!(accessor.list(&parsed).unwrap().entries[0].score, Some(100));
}
