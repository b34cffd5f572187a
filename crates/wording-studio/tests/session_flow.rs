//! End-to-end session behavior: load a branch, edit, derive, expand,
//! restructure, save.

use std::rc::Rc;

use wording_schema::{BranchConfig, NodeId, NodeKind, NodeType, ParamDef, PluralForm};
use wording_studio::{
    CoalescingScheduler, FieldsOwner, ImmediateScheduler, InsertPosition, StudioSession,
};

fn catalog_branch() -> BranchConfig {
    BranchConfig::from_json_str(
        r#"{
            "constants": [
                { "type": "enum", "name": "SIZE", "options": ["S", "M", "L"] },
                { "type": "string", "name": "BRAND", "value": "Acme" }
            ],
            "locales": ["en", "fr"],
            "schema": {
                "nodes": {
                    "card": { "id": "card", "type": "object", "fields": [
                        { "name": "title", "typeId": "title" },
                        { "name": "tags", "typeId": "tags" }
                    ]},
                    "title": { "id": "title", "type": "string-template",
                               "instances": { "en": "Hello {name}" },
                               "params": { "name": { "type": "string" } } },
                    "tags": { "id": "tags", "type": "array", "itemTypeId": "tag" },
                    "tag": { "id": "tag", "type": "string-template" },
                    "items": { "id": "items", "type": "string-template",
                               "variant": "pluralized",
                               "params": { "count": { "type": "number" } },
                               "instances": { "en": { "one": "1 item", "other": "{count} items" } } }
                },
                "root": { "type": "object", "fields": [
                    { "name": "card", "typeId": "card" },
                    { "name": "items", "typeId": "items" }
                ]}
            }
        }"#,
    )
    .unwrap()
}

fn session() -> StudioSession {
    StudioSession::load(catalog_branch(), Rc::new(ImmediateScheduler)).unwrap()
}

fn template_params(branch: &BranchConfig, id: &str) -> Option<Vec<String>> {
    match &branch.schema.nodes[&NodeId::from(id)].kind {
        NodeKind::StringTemplate { params, .. } => params
            .as_ref()
            .map(|map| map.keys().cloned().collect()),
        other => panic!("expected string-template, got {other:?}"),
    }
}

#[test]
fn load_save_round_trip_is_lossless() {
    let s = session();
    assert_eq!(s.save().unwrap(), catalog_branch());
}

#[test]
fn typing_a_placeholder_derives_a_param() {
    let s = session();
    s.set_template_text(&NodeId::from("title"), "fr", "Bonjour {name} de {city}");

    let saved = s.save().unwrap();
    assert_eq!(
        template_params(&saved, "title").unwrap(),
        vec!["city".to_string(), "name".to_string()]
    );
}

#[test]
fn removing_every_placeholder_removes_the_map() {
    let s = session();
    s.set_template_text(&NodeId::from("title"), "en", "Hello world");

    let saved = s.save().unwrap();
    assert_eq!(template_params(&saved, "title"), None);
}

#[test]
fn param_type_survives_text_edits() {
    let s = session();
    let id = NodeId::from("items");
    s.set_plural_text(&id, "en", PluralForm::Other, "{count} things");

    let saved = s.save().unwrap();
    let NodeKind::StringTemplate { params, .. } = &saved.schema.nodes[&id].kind else {
        panic!("expected template");
    };
    assert_eq!(params.as_ref().unwrap()["count"], ParamDef::Number);
}

#[test]
fn pluralized_count_survives_texts_without_placeholder() {
    let s = session();
    let id = NodeId::from("items");
    // Neither form mentions {count} any more; the count still drives
    // form selection, so its definition must stay.
    s.set_plural_text(&id, "en", PluralForm::One, "one item");
    s.set_plural_text(&id, "en", PluralForm::Other, "many");

    let saved = s.save().unwrap();
    let NodeKind::StringTemplate { params, .. } = &saved.schema.nodes[&id].kind else {
        panic!("expected template");
    };
    assert_eq!(params.as_ref().unwrap()["count"], ParamDef::Number);
}

#[test]
fn templated_field_name_expands_across_enum() {
    let s = session();
    let owner = FieldsOwner::Node(NodeId::from("card"));
    s.insert_field(&owner, InsertPosition::End, NodeType::StringTemplate)
        .unwrap();
    s.set_field_name(&owner, 2, "{SIZE}Label");

    assert_eq!(
        s.field_name_possibilities(&owner, 2).unwrap(),
        vec!["SLabel", "MLabel", "LLabel"]
    );
}

#[test]
fn string_constant_in_field_name_yields_zero_possibilities() {
    let s = session();
    let owner = FieldsOwner::Root;
    s.insert_field(&owner, InsertPosition::End, NodeType::Number)
        .unwrap();
    s.set_field_name(&owner, 2, "{BRAND}Note");

    assert!(s.field_name_possibilities(&owner, 2).unwrap().is_empty());
}

#[test]
fn plain_field_name_is_its_own_possibility() {
    let s = session();
    assert_eq!(
        s.field_name_possibilities(&FieldsOwner::Root, 0).unwrap(),
        vec!["card"]
    );
}

#[test]
fn removing_a_field_deletes_its_owned_subtree() {
    let s = session();
    let removed = s
        .remove_field_recursive(&FieldsOwner::Root, 0)
        .unwrap();
    assert_eq!(
        removed,
        vec![
            NodeId::from("card"),
            NodeId::from("title"),
            NodeId::from("tags"),
            NodeId::from("tag"),
        ]
    );

    let saved = s.save().unwrap();
    assert_eq!(saved.schema.nodes.len(), 1);
    assert!(saved.schema.nodes.contains_key(&NodeId::from("items")));
    assert_eq!(saved.schema.root.fields().len(), 1);
}

#[test]
fn replacing_a_node_type_preserves_its_id() {
    let s = session();
    let id = NodeId::from("card");
    let removed = s.replace_node_type(&id, NodeType::Boolean).unwrap();
    assert_eq!(removed.len(), 3);

    let saved = s.save().unwrap();
    assert_eq!(saved.schema.nodes[&id].kind.node_type(), NodeType::Boolean);
    // The root field entry still references the same id.
    assert_eq!(saved.schema.root.fields()[0].type_id, id);
}

#[test]
fn coverage_reflects_missing_locales() {
    let s = session();
    let report = s.coverage().unwrap();
    // Leaves: card.title, card.tags, items.
    assert_eq!(report.total_wordings, 3);

    let en = &report.locales[0];
    assert_eq!(en.present, 2);
    assert_eq!(en.missing, vec!["card.tags".to_string()]);

    let fr = &report.locales[1];
    assert_eq!(fr.present, 0);
    assert_eq!(fr.missing.len(), 3);
}

#[test]
fn typing_burst_coalesces_into_one_derivation() {
    let scheduler = Rc::new(CoalescingScheduler::new());
    let s = StudioSession::load(catalog_branch(), Rc::<CoalescingScheduler>::clone(&scheduler))
        .unwrap();
    let id = NodeId::from("title");

    // Simulate keystrokes; each write schedules under the same key.
    s.set_template_text(&id, "en", "Hello {n");
    s.set_template_text(&id, "en", "Hello {na");
    s.set_template_text(&id, "en", "Hello {nb}");
    assert_eq!(scheduler.pending_count(), 1);

    let version_before_drain = s.store().version();
    scheduler.run_pending();
    assert_eq!(
        s.store().version(),
        version_before_drain + 1,
        "one params write for the whole burst"
    );

    let saved = s.save().unwrap();
    assert_eq!(
        template_params(&saved, "title").unwrap(),
        vec!["nb".to_string()]
    );
}

#[test]
fn derivation_settles_without_further_writes() {
    let scheduler = Rc::new(CoalescingScheduler::new());
    let s = StudioSession::load(catalog_branch(), Rc::<CoalescingScheduler>::clone(&scheduler))
        .unwrap();

    s.set_template_text(&NodeId::from("title"), "en", "Hi {who}");
    scheduler.run_pending();
    let version = s.store().version();

    // The params write re-arms the params watch once; draining again
    // derives an equal map, which the store suppresses, and nothing
    // further is scheduled.
    assert_eq!(scheduler.pending_count(), 1);
    scheduler.run_pending();
    assert_eq!(scheduler.pending_count(), 0);
    scheduler.run_pending();
    assert_eq!(s.store().version(), version);
}
