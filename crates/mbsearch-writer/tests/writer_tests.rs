use std::fs;

use anyhow::Result;
use mbsearch_core::config::WriterConfig;
use mbsearch_core::error::{Error, NO_STORE_VALUE, SCORE_NOT_IN_FIELD_LIST, UNMARSHALLING_STORE_FAILED};
use mbsearch_core::payload_loader::PayloadLoader;
use mbsearch_core::traits::SearchCore;
use mbsearch_core::types::{EntityType, Hit, Meta, QueryResult, SearchRequest, STORE_FIELD};
use mbsearch_index::{CoreIndexer, CoreSchema, CoreSearcher, IndexDocument};
use mbsearch_mmd::{Dispatcher, Metadata, StoredRecordCodec};
use mbsearch_writer::{MbResponseWriter, WireFormat, WriterRegistry};

const ARTIST: &str = include_str!("fixtures/artist.xml");

fn core(kind: EntityType) -> CoreSchema {
    CoreSchema::new(kind, &["name", "sort-name", "country"])
}

fn writer(kind: EntityType, format: WireFormat) -> MbResponseWriter {
    match MbResponseWriter::new(&WriterConfig::new(kind.as_str()), format) {
        Ok(writer) => writer,
        Err(e) => panic!("writer for {}: {}", kind, e),
    }
}

/// Run `request` against `indexer` and render it with an XML writer.
fn respond(indexer: &CoreIndexer, request: &SearchRequest) -> Result<Vec<u8>, Error> {
    let searcher = indexer.searcher().expect("searcher");
    let result = searcher.execute(request).expect("query");
    writer(searcher.entity_type(), WireFormat::Xml).render(request, &result)
}

fn reparse(kind: EntityType, body: &[u8]) -> Metadata {
    let accessor = Dispatcher::new().resolve(kind).unwrap();
    Metadata::from_xml(std::str::from_utf8(body).unwrap(), accessor.as_ref()).unwrap()
}

fn hit(id: &str, score: f32, payload: &str) -> Hit {
    let mut fields = Meta::new();
    fields.insert(STORE_FIELD.to_string(), payload.to_string());
    Hit { id: id.to_string(), score, fields }
}

fn simple_payload(kind: EntityType, id: &str, name: &str) -> String {
    format!(r#"<{el} xmlns="http://musicbrainz.org/ns/mmd-2.0#" id="{id}"><name>{name}</name></{el}>"#, el = kind.element_name())
}

#[test]
fn artist_core_returns_the_stored_artist() -> Result<()> {
    let indexer = CoreIndexer::create_in_ram(core(EntityType::Artist))?;
    let artist = StoredRecordCodec::new(EntityType::Artist).decode(ARTIST)?;
    indexer.add_entity(&artist, ARTIST)?;

    let request = SearchRequest::new("*:*").with_field_list("score,*");
    let body = respond(&indexer, &request)?;
    let text = String::from_utf8(body.clone())?;
    assert!(text.starts_with(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#));
    assert!(text.contains(r#"<artist-list count="1" offset="0">"#));
    assert!(text.contains(r#"<artist ns2:score="100" id="4302e264-1cf0-4d1f-aca7-2a6f89e34b36""#));

    let metadata = reparse(EntityType::Artist, &body);
    let list = metadata.artist_list.as_ref().expect("artist list");
    assert_eq!(list.count, 1);
    assert_eq!(list.offset, 0);
    assert_eq!(list.len(), 1);
    assert_eq!(list.entries[0].entity, artist);
    assert_eq!(list.entries[0].score, Some(100));
    Ok(())
}

#[test]
fn field_list_without_score_is_rejected() -> Result<()> {
    let indexer = CoreIndexer::create_in_ram(core(EntityType::Artist))?;
    let artist = StoredRecordCodec::new(EntityType::Artist).decode(ARTIST)?;
    indexer.add_entity(&artist, ARTIST)?;

    let err = respond(&indexer, &SearchRequest::new("*:*").with_field_list("*")).unwrap_err();
    assert!(matches!(err, Error::ScoreFieldMissing));
    assert_eq!(err.to_string(), SCORE_NOT_IN_FIELD_LIST);
    assert!(err.is_request_error());
    Ok(())
}

#[test]
fn default_field_list_includes_score() -> Result<()> {
    let indexer = CoreIndexer::create_in_ram(core(EntityType::Artist))?;
    let artist = StoredRecordCodec::new(EntityType::Artist).decode(ARTIST)?;
    indexer.add_entity(&artist, ARTIST)?;

    let body = respond(&indexer, &SearchRequest::new("farming"))?;
    assert_eq!(reparse(EntityType::Artist, &body).artist_list.map(|l| l.len()), Some(1));
    Ok(())
}

#[test]
fn missing_configured_score_field_in_default_list_is_rejected() {
    let mut config = WriterConfig::new("artist");
    config.default_field_list = "*".to_string();
    let writer = MbResponseWriter::new(&config, WireFormat::Xml).unwrap();
    let err = writer.render(&SearchRequest::new("*:*"), &QueryResult::empty(0)).unwrap_err();
    assert!(matches!(err, Error::ScoreFieldMissing));
}

#[test]
fn hit_without_store_is_rejected() -> Result<()> {
    let indexer = CoreIndexer::create_in_ram(core(EntityType::Artist))?;
    indexer.add_document(&IndexDocument::new().with("id", "a1").with("name", "No Store"))?;

    let err = respond(&indexer, &SearchRequest::new("*:*").with_field_list("score,*")).unwrap_err();
    assert_eq!(err.to_string(), NO_STORE_VALUE);
    match err {
        Error::StoreFieldMissing { id } => assert_eq!(id, "a1"),
        other => panic!("unexpected error {:?}", other),
    }
    Ok(())
}

#[test]
fn undecodable_store_is_reported_verbatim() -> Result<()> {
    let indexer = CoreIndexer::create_in_ram(core(EntityType::Artist))?;
    indexer.add_document(&IndexDocument::new().with("id", "a1").with(STORE_FIELD, "invalid"))?;

    let err = respond(&indexer, &SearchRequest::new("*:*").with_field_list("score")).unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with(UNMARSHALLING_STORE_FAILED));
    assert!(message.ends_with("invalid"));
    assert!(matches!(err, Error::StoreDecodeFailed { ref payload, .. } if payload == "invalid"));
    Ok(())
}

#[test]
fn payload_of_another_entity_type_does_not_decode() {
    let label = simple_payload(EntityType::Label, "l1", "EMI");
    let result = QueryResult { hits: vec![hit("l1", 1.0, &label)], count: 1, offset: 0, max_score: Some(1.0) };
    let err = writer(EntityType::Artist, WireFormat::Xml).render(&SearchRequest::new("*:*"), &result).unwrap_err();
    assert_eq!(err.to_string(), format!("{}{}", UNMARSHALLING_STORE_FAILED, label));
}

#[test]
fn query_on_unknown_field_yields_empty_list() -> Result<()> {
    let indexer = CoreIndexer::create_in_ram(core(EntityType::Artist))?;
    let artist = StoredRecordCodec::new(EntityType::Artist).decode(ARTIST)?;
    indexer.add_entity(&artist, ARTIST)?;

    let body = respond(&indexer, &SearchRequest::new("unknownFieldname:value").with_field_list("score,*"))?;
    let text = String::from_utf8(body.clone())?;
    assert!(text.contains(r#"<artist-list count="0" offset="0"/>"#));
    let list = reparse(EntityType::Artist, &body).artist_list.expect("artist list");
    assert_eq!((list.count, list.offset, list.len()), (0, 0, 0));
    Ok(())
}

#[test]
fn hits_keep_their_ranked_order_and_normalized_scores() {
    let kind = EntityType::Recording;
    let result = QueryResult {
        hits: vec![
            hit("r1", 3.0, &simple_payload(kind, "r1", "First")),
            hit("r2", 2.0, &simple_payload(kind, "r2", "Second")),
            hit("r3", 1.0, &simple_payload(kind, "r3", "Third")),
        ],
        count: 42,
        offset: 10,
        max_score: Some(3.0),
    };
    let body = writer(kind, WireFormat::Xml).render(&SearchRequest::new("*:*"), &result).unwrap();
    let list = reparse(kind, &body).recording_list.expect("recording list");
    assert_eq!((list.count, list.offset), (42, 10));
    let ids: Vec<_> = list.entities().filter_map(|e| e.id()).collect();
    assert_eq!(ids, vec!["r1", "r2", "r3"]);
    let scores: Vec<_> = list.entries.iter().map(|e| e.score).collect();
    assert_eq!(scores, vec![Some(100), Some(67), Some(33)]);
}

#[test]
fn paging_echoes_offset_and_total_count() -> Result<()> {
    let kind = EntityType::Work;
    let indexer = CoreIndexer::create_in_ram(core(kind))?;
    let codec = StoredRecordCodec::new(kind);
    for i in 0..4 {
        let payload = simple_payload(kind, &format!("w{}", i), "Symphony");
        indexer.add_entity(&codec.decode(&payload)?, &payload)?;
    }

    let body = respond(&indexer, &SearchRequest::new("symphony").with_page(2, 25))?;
    let list = reparse(kind, &body).work_list.expect("work list");
    assert_eq!((list.count, list.offset, list.len()), (4, 2, 2));

    let body = respond(&indexer, &SearchRequest::new("symphony").with_page(0, 0))?;
    let list = reparse(kind, &body).work_list.expect("work list");
    assert_eq!((list.count, list.offset, list.len()), (4, 0, 0));
    Ok(())
}

#[test]
fn json_writer_renders_count_offset_and_entities() -> Result<()> {
    let indexer = CoreIndexer::create_in_ram(core(EntityType::Artist))?;
    let artist = StoredRecordCodec::new(EntityType::Artist).decode(ARTIST)?;
    indexer.add_entity(&artist, ARTIST)?;
    let searcher = indexer.searcher()?;
    let request = SearchRequest::new("*:*").with_writer("mbjson");
    let result = searcher.execute(&request)?;

    let body = writer(EntityType::Artist, WireFormat::Json).render(&request, &result)?;
    let value: serde_json::Value = serde_json::from_slice(&body)?;
    assert_eq!(value["count"], 1);
    assert_eq!(value["offset"], 0);
    let first = &value["artists"][0];
    assert_eq!(first["id"], "4302e264-1cf0-4d1f-aca7-2a6f89e34b36");
    assert_eq!(first["name"], "Farming Incident");
    assert_eq!(first["score"], 100);
    assert_eq!(first["area"]["name"], "Afghanistan");
    assert_eq!(first["alias-list"][1]["value"], "Farm Incident");
    assert_eq!(first["alias-list"][0]["locale"], "en");
    assert_eq!(first["tag-list"][1]["count"], "11");
    Ok(())
}

#[test]
fn every_entity_type_round_trips_through_index_and_writer() -> Result<()> {
    for kind in EntityType::ALL {
        let indexer = CoreIndexer::create_in_ram(core(kind))?;
        let payload = simple_payload(kind, "e1", "Something");
        let entity = StoredRecordCodec::new(kind).decode(&payload)?;
        indexer.add_entity(&entity, &payload)?;

        let body = respond(&indexer, &SearchRequest::new("*:*"))?;
        let accessor = Dispatcher::new().resolve(kind)?;
        let metadata = reparse(kind, &body);
        let list = accessor.list(&metadata).unwrap_or_else(|| panic!("no {} list", kind));
        assert_eq!(list.count, 1, "{}", kind);
        assert_eq!(list.entities().next(), Some(&entity), "{}", kind);

        let text = String::from_utf8(body)?;
        assert!(text.contains(&format!("<{} count=\"1\" offset=\"0\">", accessor.list_element())), "{}", kind);
    }
    Ok(())
}

#[test]
fn unsupported_entity_type_fails_at_construction() {
    match MbResponseWriter::new(&WriterConfig::new("spaceship"), WireFormat::Xml) {
        Err(Error::UnsupportedEntityType(name)) => assert_eq!(name, "spaceship"),
        Err(other) => panic!("unexpected error {:?}", other),
        Ok(_) => panic!("writer built for an unknown entity type"),
    }
    assert!(WriterRegistry::for_core(&WriterConfig::new("spaceship")).is_err());
}

#[test]
fn empty_store_field_name_is_invalid_config() {
    let mut config = WriterConfig::new("artist");
    config.store_field = String::new();
    assert!(matches!(MbResponseWriter::new(&config, WireFormat::Xml), Err(Error::InvalidConfig(_))));
}

#[test]
fn registry_serves_both_wire_formats() {
    let registry = WriterRegistry::for_core(&WriterConfig::new("release_group")).unwrap();
    assert_eq!(registry.names().collect::<Vec<_>>(), vec!["mbjson", "mbxml"]);
    assert_eq!(registry.get("mbxml").unwrap().content_type(), "application/xml; charset=UTF-8");
    assert_eq!(registry.get("mbjson").unwrap().content_type(), "application/json; charset=UTF-8");
    assert!(registry.get("xml").is_none());
    assert_eq!(WireFormat::from_name("mbjson"), Some(WireFormat::Json));
    assert_eq!(WireFormat::from_name("json"), None);
}

#[test]
fn failed_write_leaves_output_untouched() {
    let registry = WriterRegistry::for_core(&WriterConfig::new("artist")).unwrap();
    let writer = registry.get("mbxml").unwrap();
    let result = QueryResult { hits: vec![hit("a1", 1.0, "<artist>")], count: 1, offset: 0, max_score: Some(1.0) };

    let mut out = Vec::new();
    let err = writer.write(&mut out, &SearchRequest::new("*:*"), &result).unwrap_err();
    assert!(matches!(err, Error::StoreDecodeFailed { .. }));
    assert!(out.is_empty());

    let ok = QueryResult::empty(0);
    writer.write(&mut out, &SearchRequest::new("*:*"), &ok).unwrap();
    assert!(!out.is_empty());
}

#[test]
fn payload_directory_served_from_disk() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let payload_dir = tmp.path().join("payloads");
    fs::create_dir_all(&payload_dir)?;
    fs::write(payload_dir.join("farming.xml"), ARTIST)?;
    fs::write(payload_dir.join("other.xml"), simple_payload(EntityType::Artist, "a2", "Other Band"))?;

    let payloads = PayloadLoader::new().load_directory(&payload_dir)?;
    let index_dir = tmp.path().join("index");
    let report = CoreIndexer::create_in_dir(index_dir.clone(), core(EntityType::Artist))?.index_payloads(&payloads)?;
    assert_eq!(report.indexed, 2);

    let searcher = CoreSearcher::open_in_dir(&index_dir, core(EntityType::Artist))?;
    let request = SearchRequest::new("country:af");
    let result = searcher.execute(&request)?;
    let body = writer(EntityType::Artist, WireFormat::Xml).render(&request, &result)?;
    let list = reparse(EntityType::Artist, &body).artist_list.expect("artist list");
    assert_eq!(list.count, 1);
    assert_eq!(list.entities().next().and_then(|e| e.id()), Some("4302e264-1cf0-4d1f-aca7-2a6f89e34b36"));
    Ok(())
}
