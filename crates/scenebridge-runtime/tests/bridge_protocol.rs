//! Integration tests for the bridge protocol.
//!
//! Drives a [`Bridge`] the way a transport would: encoded inbound batches
//! in, encoded outbound batches out. Covers:
//! - path resolution through the bridge
//! - the interest gate and query enrichment
//! - UpdateInterests merging
//! - query results and callback routing
//! - outbound draining
//! - the end-to-end Widget scenario

use scenebridge_event::{InterestSpec, Interests, WireEvent};
use scenebridge_object::ResolveError;
use scenebridge_runtime::config::BridgeConfig;
use scenebridge_runtime::{Bridge, BridgeError, CreateSpec};
use scenebridge_types::{CallbackId, ErrorCode, ObjectId};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

// =============================================================================
// Test Fixtures
// =============================================================================

fn bridge() -> Bridge {
    Bridge::new(BridgeConfig::shared()).expect("non-exclusive bridge")
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

fn widget(bridge: &mut Bridge, id: &str) -> ObjectId {
    bridge
        .create(CreateSpec::new("Widget").with_id(ObjectId::from(id)))
        .expect("widget template is builtin")
}

/// Drains every queued outbound event, decoded.
fn drain(bridge: &Bridge) -> Vec<Value> {
    let mut events = Vec::new();
    while let Some(batch) = bridge.drain_outbound(16) {
        match serde_json::from_str::<Value>(&batch).expect("outbound batch is JSON") {
            Value::Array(items) => events.extend(items),
            other => panic!("outbound batch must be an array, got {other}"),
        }
    }
    events
}

fn names(events: &[Value]) -> Vec<String> {
    events
        .iter()
        .map(|e| format!("{} {}", e["event"].as_str().unwrap_or("?"), e["id"].as_str().unwrap_or("?")))
        .collect()
}

fn query(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

// =============================================================================
// Path resolution
// =============================================================================

#[test]
fn resolution_is_repeatable_and_read_only() {
    let mut bridge = bridge();
    let id = bridge.create(CreateSpec::new("Node")).expect("node");
    bridge
        .handle_update(&id, &object(json!({"data": {"a": {"b": 7}}})), "")
        .expect("update");
    drain(&bridge);

    let first = bridge.resolve_path(&id, "data/a/b").expect("resolves");
    let second = bridge.resolve_path(&id, "data/a/b").expect("resolves");
    assert_eq!(first, Some(json!(7)));
    assert_eq!(first, second);
    assert_eq!(
        bridge.resolve_path(&id, "data").expect("resolves"),
        Some(json!({"a": {"b": 7}}))
    );
    assert_eq!(bridge.outbound_len(), 0);
}

#[test]
fn optional_step_suppresses_later_misses() {
    let mut bridge = bridge();
    let id = bridge.create(CreateSpec::new("Node")).expect("node");

    assert_eq!(bridge.resolve_path(&id, "?data/b/?c").expect("silent miss"), None);

    let err = bridge
        .resolve_path(&id, "data/b/?c")
        .expect_err("non-optional middle step");
    assert_eq!(err.code(), "BRIDGE_RESOLUTION");
    match err {
        BridgeError::Resolution {
            source: ResolveError::Unresolved { step, segment, .. },
            ..
        } => {
            assert_eq!(step, 1);
            assert_eq!(segment, "b");
        }
        other => panic!("expected an unresolved step, got {other:?}"),
    }
}

#[test]
fn component_writes_go_back_through_the_owner() {
    let mut bridge = bridge();
    let id = widget(&mut bridge, "w");
    bridge
        .handle_update(&id, &object(json!({"transform/position/y": 4})), "")
        .expect("update");
    assert_eq!(
        bridge.resolve_path(&id, "transform/position").expect("resolves"),
        Some(json!({"x": 0, "y": 4, "z": 0}))
    );
}

// =============================================================================
// Interest gate
// =============================================================================

#[test]
fn interest_gate_matrix() {
    for present in [false, true] {
        for disabled in [false, true] {
            for do_not_send in [false, true] {
                let mut bridge = bridge();
                let mut interests = Interests::new();
                if present {
                    interests.insert(
                        "Clicked",
                        InterestSpec::send().disabled(disabled).do_not_send(do_not_send),
                    );
                }
                let id = bridge
                    .create(CreateSpec::new("Widget").with_interests(interests))
                    .expect("widget");
                assert_eq!(names(&drain(&bridge)), vec![format!("Created {id}")]);

                let expected = present && !disabled && !do_not_send;
                let sent = bridge.emit(&id, "Clicked", None);
                assert_eq!(
                    sent, expected,
                    "present={present} disabled={disabled} doNotSend={do_not_send}"
                );
                assert_eq!(drain(&bridge).len(), usize::from(expected));

                assert!(bridge.emit(&id, "Created", None), "Created always sends");
                bridge.destroy(&id).expect("destroy");
                assert_eq!(
                    names(&drain(&bridge)),
                    vec![format!("Created {id}"), format!("Destroyed {id}")]
                );
            }
        }
    }
}

#[test]
fn unconditional_events_ignore_their_own_specs() {
    let mut bridge = bridge();
    let interests = Interests::from_wire(&json!({
        "Created": {"disabled": true, "doNotSend": true},
        "Destroyed": {"disabled": true, "doNotSend": true}
    }))
    .expect("valid interests");
    let id = bridge
        .create(CreateSpec::new("Node").with_interests(interests))
        .expect("node");
    bridge.destroy(&id).expect("destroy");
    assert_eq!(
        names(&drain(&bridge)),
        vec![format!("Created {id}"), format!("Destroyed {id}")]
    );
}

#[test]
fn disabled_interest_still_runs_side_effects() {
    let mut bridge = bridge();
    let interests = Interests::from_wire(&json!({
        "Clicked": {"disabled": true, "update": {"title": "seen"}}
    }))
    .expect("valid interests");
    let id = bridge
        .create(CreateSpec::new("Widget").with_interests(interests))
        .expect("widget");
    drain(&bridge);

    assert!(!bridge.emit(&id, "Clicked", None));
    assert_eq!(bridge.resolve_path(&id, "title").expect("title"), Some(json!("seen")));
    assert!(drain(&bridge).is_empty());
}

#[test]
fn interest_events_replay_against_the_source() {
    let mut bridge = bridge();
    let interests = Interests::from_wire(&json!({
        "Clicked": {
            "events": [{"event": "Update", "data": {"title": "clicked"}}],
            "query": {"title": "title"}
        }
    }))
    .expect("valid interests");
    let id = bridge
        .create(CreateSpec::new("Widget").with_interests(interests))
        .expect("widget");
    drain(&bridge);

    assert!(bridge.emit(&id, "Clicked", Some(json!({"button": 0}))));
    let events = drain(&bridge);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["data"], json!({"button": 0, "title": "clicked"}));
}

#[test]
fn do_not_send_skips_the_query() {
    let mut bridge = bridge();
    let interests = Interests::from_wire(&json!({
        "Clicked": {"doNotSend": true, "query": {"title": "title"}, "update": {"count": 9}}
    }))
    .expect("valid interests");
    let id = bridge
        .create(CreateSpec::new("Widget").with_interests(interests))
        .expect("widget");
    drain(&bridge);

    assert!(!bridge.emit(&id, "Clicked", None));
    assert_eq!(bridge.resolve_path(&id, "count").expect("count"), Some(json!(9)));
    assert!(drain(&bridge).is_empty());
}

#[test]
fn recursive_interest_events_stop_at_the_depth_limit() {
    let mut bridge = bridge();
    let interests = Interests::from_wire(&json!({
        "Ping": {"events": [{"event": "Update", "data": {"method:Emit": ["Ping"]}}], "doNotSend": true}
    }))
    .expect("valid interests");
    let id = bridge
        .create(CreateSpec::new("Node").with_interests(interests))
        .expect("node");
    drain(&bridge);

    bridge.emit(&id, "Ping", None);
    bridge.tick(Duration::ZERO);
    assert!(drain(&bridge).is_empty());
    assert!(bridge.registry().is_active(&id));
}

// =============================================================================
// UpdateInterests
// =============================================================================

#[test]
fn update_interests_merges_per_event_name() {
    let mut bridge = bridge();
    let base = json!({"Clicked": {"disabled": false, "query": {"x": "a"}}});
    let id = bridge
        .create(CreateSpec::new("Widget").with_interests(Interests::from_wire(&base).expect("valid")))
        .expect("widget");
    let spec = |bridge: &Bridge| {
        bridge
            .object(&id)
            .and_then(|o| o.interests())
            .and_then(|i| i.get("Clicked"))
            .cloned()
    };
    let original = spec(&bridge).expect("installed");

    bridge
        .handle_update_interests(&id, &object(json!({"Clicked": true})), "")
        .expect("true");
    assert_eq!(spec(&bridge), Some(original.clone()));

    bridge
        .handle_update_interests(&id, &object(json!({"Clicked": false})), "")
        .expect("false");
    let disabled = spec(&bridge).expect("kept");
    assert!(disabled.disabled);
    assert_eq!(disabled.query, original.query);

    bridge
        .handle_update_interests(&id, &object(json!({"Clicked": {"disabled": false}})), "")
        .expect("re-enable");
    bridge
        .handle_update_interests(&id, &object(json!({"Clicked": {"query": {"y": "b"}}})), "")
        .expect("object");
    let merged = spec(&bridge).expect("kept");
    assert!(!merged.disabled);
    assert_eq!(merged.query, Some(query(&[("y", "b")])));

    bridge
        .handle_update_interests(&id, &object(json!({"Clicked": null})), "")
        .expect("null");
    assert_eq!(spec(&bridge), None);
}

#[test]
fn update_interests_over_the_wire() {
    let mut bridge = bridge();
    let id = widget(&mut bridge, "obj1");
    drain(&bridge);

    bridge.receive_inbound_batch(
        r#"[{"event":"UpdateInterests","id":"obj1","data":{"Clicked":{"query":{"n":"count"}},"Bad":5}},
            {"event":"Update","id":"obj1","data":{"method:Click":[]}}]"#,
    );
    assert_eq!(bridge.dispatch_inbound(), 2);

    let events = drain(&bridge);
    assert_eq!(events, vec![json!({"event": "Clicked", "id": "obj1", "data": {"n": 1}})]);
    let interests = bridge.object(&id).and_then(|o| o.interests()).expect("interests");
    assert!(interests.get("Bad").is_none());
}

// =============================================================================
// Query
// =============================================================================

#[test]
fn query_returns_null_for_unresolved_keys() {
    let mut bridge = bridge();
    let id = widget(&mut bridge, "obj1");
    bridge
        .handle_update(&id, &object(json!({"title": "Foo", "count": 5})), "")
        .expect("update");

    let result = bridge
        .handle_query(&id, &query(&[("t", "title"), ("c", "count"), ("missing", "nope")]), None, "")
        .expect("query never fails on a missing key");
    assert_eq!(result, json!({"t": "Foo", "c": 5, "missing": null}));
}

#[test]
fn query_subject_path_prefixes_every_key() {
    let mut bridge = bridge();
    let id = widget(&mut bridge, "obj1");
    let result = bridge
        .handle_query(&id, &query(&[("s", "scale/x")]), None, "transform")
        .expect("query");
    assert_eq!(result, json!({"s": 1}));
}

#[test]
fn remote_callbacks_fire_at_most_once() {
    let mut bridge = bridge();
    widget(&mut bridge, "obj1");
    drain(&bridge);

    let message =
        r#"{"event":"Query","id":"obj1","data":{"query":{"c":"count"},"callbackID":"cb-1"}}"#;
    bridge.receive_inbound_batch(message);
    bridge.receive_inbound_batch(message);
    bridge.dispatch_inbound();

    assert_eq!(
        drain(&bridge),
        vec![json!({"event": "Callback", "id": "obj1", "data": {"callbackID": "cb-1", "result": {"c": 0}}})]
    );
}

#[test]
fn local_callbacks_fire_at_most_once() {
    let mut bridge = bridge();
    let id = widget(&mut bridge, "obj1");
    drain(&bridge);

    let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let callback = bridge.register_callback(Box::new(move |_: &CallbackId, object: &ObjectId, result: &Value| {
        sink.lock().push((object.clone(), result.clone()));
    }));
    assert_eq!(bridge.pending_callbacks(), 1);

    let mapping = query(&[("t", "title")]);
    bridge
        .handle_query(&id, &mapping, Some(&callback), "")
        .expect("first");
    bridge
        .handle_query(&id, &mapping, Some(&callback), "")
        .expect("second is logged, not an error");

    assert_eq!(*seen.lock(), vec![(id, json!({"t": ""}))]);
    assert_eq!(bridge.pending_callbacks(), 0);
    assert!(drain(&bridge).is_empty(), "local results never hit the wire");
}

// =============================================================================
// Queue & dispatch
// =============================================================================

#[test]
fn drain_respects_the_batch_bound() {
    let bridge = bridge();
    for i in 0..7 {
        bridge.enqueue_outbound(&WireEvent::new("Tick", ObjectId::new(format!("e{i}"))));
    }

    let ids = |batch: Option<String>| -> Vec<String> {
        let batch = batch.expect("non-empty queue");
        let events: Vec<Value> = serde_json::from_str(&batch).expect("array batch");
        events
            .iter()
            .map(|e| e["id"].as_str().unwrap_or_default().to_string())
            .collect()
    };
    assert_eq!(ids(bridge.drain_outbound(3)), vec!["e0", "e1", "e2"]);
    assert_eq!(ids(bridge.drain_outbound(3)), vec!["e3", "e4", "e5"]);
    assert_eq!(ids(bridge.drain_outbound(3)), vec!["e6"]);
    assert_eq!(bridge.drain_outbound(3), None);
}

#[test]
fn unknown_kinds_are_skipped_mid_batch() {
    let mut bridge = bridge();
    let id = widget(&mut bridge, "obj1");
    drain(&bridge);

    bridge.receive_inbound_batch(
        r#"[{"event":"Update","id":"obj1","data":{"title":"A"}},
            {"event":"Teleport","id":"obj1","data":{}},
            {"event":"Created","id":"obj1"},
            {"event":"Update","id":"obj1","data":{"count":3}}]"#,
    );
    assert_eq!(bridge.dispatch_inbound(), 2);
    assert_eq!(bridge.resolve_path(&id, "title").expect("title"), Some(json!("A")));
    assert_eq!(bridge.resolve_path(&id, "count").expect("count"), Some(json!(3)));
}

#[test]
fn unknown_kind_is_an_error_when_dispatched_directly() {
    let mut bridge = bridge();
    let err = bridge
        .dispatch_event(WireEvent::new("Teleport", ObjectId::from("obj1")))
        .expect_err("unknown kind");
    assert!(matches!(err, BridgeError::UnknownMessageKind(ref kind) if kind == "Teleport"));
    assert_eq!(err.code(), "BRIDGE_UNKNOWN_MESSAGE_KIND");
}

#[test]
fn update_keys_apply_independently() {
    let mut bridge = bridge();
    let id = widget(&mut bridge, "obj1");
    let applied = bridge
        .handle_update(
            &id,
            &object(json!({"title": "ok", "count": "not a number", "nope": 1, "visible": false})),
            "",
        )
        .expect("update");
    assert_eq!(applied, 2);
    assert_eq!(bridge.resolve_path(&id, "title").expect("title"), Some(json!("ok")));
    assert_eq!(bridge.resolve_path(&id, "count").expect("count"), Some(json!(0)));
    assert_eq!(bridge.resolve_path(&id, "visible").expect("visible"), Some(json!(false)));
}

#[test]
fn failing_method_key_is_skipped_without_emitting() {
    let mut bridge = bridge();
    let id = widget(&mut bridge, "obj1");
    bridge
        .handle_update(&id, &object(json!({"count": i64::MAX})), "")
        .expect("update");
    drain(&bridge);

    let applied = bridge
        .handle_update(&id, &object(json!({"method:Click": [], "title": "still applied"})), "")
        .expect("update");
    assert_eq!(applied, 1);
    assert_eq!(bridge.resolve_path(&id, "count").expect("count"), Some(json!(i64::MAX)));
    assert_eq!(bridge.resolve_path(&id, "title").expect("title"), Some(json!("still applied")));
    bridge.tick(Duration::ZERO);
    assert!(drain(&bridge).iter().all(|e| e["event"] != json!("Clicked")));
}

#[test]
fn method_arguments_may_be_paths() {
    let mut bridge = bridge();
    let interests = Interests::from_wire(&json!({"hero": true})).expect("valid interests");
    let id = bridge
        .create(CreateSpec::new("Node").with_interests(interests))
        .expect("node");
    bridge
        .handle_update(&id, &object(json!({"name": "hero", "tag": "player"})), "")
        .expect("update");
    drain(&bridge);

    assert_eq!(
        bridge.resolve_path(&id, "method:Emit(name, tag)").expect("method runs"),
        Some(Value::Null)
    );
    bridge.tick(Duration::ZERO);
    assert_eq!(
        drain(&bridge),
        vec![json!({"event": "hero", "id": id.as_str(), "data": "player"})]
    );
}

// =============================================================================
// End-to-end
// =============================================================================

#[test]
fn widget_click_end_to_end() {
    let mut bridge = bridge();
    bridge.receive_inbound_batch(
        r#"[{"event":"Create","id":"obj1","data":{
                "template":"Widget",
                "update":{"visible":true},
                "interests":{"Clicked":{"query":{"pos":"transform/position"}}}}},
            {"event":"Update","id":"obj1","data":{"transform/position":{"x":1,"y":2,"z":3}}}]"#,
    );
    assert_eq!(bridge.dispatch_inbound(), 2);
    assert_eq!(drain(&bridge), vec![json!({"event": "Created", "id": "obj1"})]);

    assert!(bridge.emit(&ObjectId::from("obj1"), "Clicked", None));
    assert_eq!(
        drain(&bridge),
        vec![json!({"event": "Clicked", "id": "obj1", "data": {"pos": {"x": 1, "y": 2, "z": 3}}})]
    );
}

#[test]
fn method_emissions_flow_through_interests() {
    let mut bridge = bridge();
    bridge.receive_inbound_batch(
        r#"[{"event":"Create","id":"obj1","data":{"template":"Widget","interests":{"Clicked":{"query":{"n":"count"}}}}},
            {"event":"Update","id":"obj1","data":{"method:Click":[]}},
            {"event":"Update","id":"obj1","data":{"method:Click":[]}}]"#,
    );
    bridge.dispatch_inbound();
    assert_eq!(
        drain(&bridge),
        vec![
            json!({"event": "Created", "id": "obj1"}),
            json!({"event": "Clicked", "id": "obj1", "data": {"n": 1}}),
            json!({"event": "Clicked", "id": "obj1", "data": {"n": 2}}),
        ]
    );
}
