//! Integration tests for the object lifecycle.
//!
//! Tests the complete flow of:
//! - create and destroy, including cascades and idempotence
//! - delayed destroy and its cancellation
//! - reparenting with world position preserved
//! - capabilities and animations driven by `tick`
//! - model listener notifications

use parking_lot::Mutex;
use scenebridge_runtime::config::BridgeConfig;
use scenebridge_runtime::{Bridge, BridgeError, CreateSpec, LifecycleState, ModelListener};
use scenebridge_types::ObjectId;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::Duration;

// =============================================================================
// Test Fixtures
// =============================================================================

fn bridge() -> Bridge {
    Bridge::new(BridgeConfig::shared()).expect("non-exclusive bridge")
}

fn node(bridge: &mut Bridge, id: &str, parent: Option<&str>) -> ObjectId {
    let mut spec = CreateSpec::new("Node").with_id(ObjectId::from(id));
    if let Some(parent) = parent {
        spec = spec.with_parent(ObjectId::from(parent), true);
    }
    bridge.create(spec).expect("node template is builtin")
}

fn drain_names(bridge: &Bridge) -> Vec<String> {
    let mut names = Vec::new();
    while let Some(batch) = bridge.drain_outbound(16) {
        let events: Vec<Value> = serde_json::from_str(&batch).expect("array batch");
        names.extend(events.iter().map(|e| {
            format!(
                "{} {}",
                e["event"].as_str().unwrap_or("?"),
                e["id"].as_str().unwrap_or("?")
            )
        }));
    }
    names
}

fn update(bridge: &mut Bridge, id: &ObjectId, bundle: Value) {
    let Value::Object(bundle) = bundle else {
        panic!("bundle must be an object");
    };
    bridge.handle_update(id, &bundle, "").expect("update");
}

fn position(bridge: &mut Bridge, id: &ObjectId) -> [f64; 3] {
    let value = bridge
        .resolve_path(id, "transform/position")
        .expect("resolves")
        .expect("present");
    ["x", "y", "z"].map(|axis| value[axis].as_f64().expect("numeric axis"))
}

fn assert_close(actual: [f64; 3], expected: [f64; 3]) {
    for (a, e) in actual.iter().zip(expected) {
        assert!((a - e).abs() < 1e-9, "{actual:?} != {expected:?}");
    }
}

#[derive(Clone, Default)]
struct Journal(Arc<Mutex<Vec<String>>>);

impl ModelListener for Journal {
    fn on_model_changed(&mut self, id: &ObjectId, path: &str) {
        self.0.lock().push(format!("changed {id} {path}"));
    }

    fn on_lifecycle(&mut self, id: &ObjectId, state: LifecycleState) {
        self.0.lock().push(format!("{state} {id}"));
    }
}

// =============================================================================
// Create
// =============================================================================

#[test]
fn create_rejects_unknown_template_and_reused_id() {
    let mut bridge = bridge();
    let err = bridge
        .create(CreateSpec::new("Dragon"))
        .expect_err("unknown template");
    assert!(matches!(err, BridgeError::UnknownTemplate(ref t) if t == "Dragon"));

    node(&mut bridge, "n1", None);
    let err = bridge
        .create(CreateSpec::new("Widget").with_id(ObjectId::from("n1")))
        .expect_err("reused id");
    assert!(matches!(err, BridgeError::DuplicateObjectId(_)));
    assert_eq!(bridge.registry().len(), 1);
    assert_eq!(drain_names(&bridge), vec!["Created n1"]);
}

#[test]
fn create_message_runs_pre_and_post_events_around_created() {
    let mut bridge = bridge();
    bridge.receive_inbound_batch(
        r#"{"event":"Create","id":"w","data":{
            "template":"Widget",
            "components":["Tags"],
            "interests":{"Clicked":true},
            "preEvents":[{"event":"Update","data":{"title":"pre"}}],
            "postEvents":[{"event":"Update","data":{"method:Click":[]}}]}}"#,
    );
    assert_eq!(bridge.dispatch_inbound(), 1);

    let id = ObjectId::from("w");
    assert_eq!(drain_names(&bridge), vec!["Created w", "Clicked w"]);
    assert_eq!(bridge.resolve_path(&id, "title").expect("title"), Some(json!("pre")));
    assert!(bridge.object(&id).is_some_and(|o| o.has_capability("Tags")));
}

#[test]
fn generated_ids_are_unique() {
    let mut bridge = bridge();
    let a = bridge.create(CreateSpec::new("Node")).expect("a");
    let b = bridge.create(CreateSpec::new("Node")).expect("b");
    assert_ne!(a, b);
    assert!(!a.is_empty());
}

// =============================================================================
// Destroy
// =============================================================================

#[test]
fn destroy_twice_emits_once() {
    let mut bridge = bridge();
    let id = node(&mut bridge, "n1", None);
    bridge.destroy(&id).expect("first");
    bridge.destroy(&id).expect("second is a no-op");
    assert_eq!(drain_names(&bridge), vec!["Created n1", "Destroyed n1"]);
    assert!(bridge.registry().is_retired(&id));
}

#[test]
fn destroy_unknown_id_emits_nothing() {
    let mut bridge = bridge();
    let err = bridge
        .destroy(&ObjectId::from("ghost"))
        .expect_err("never created");
    assert!(matches!(err, BridgeError::UnknownObject(_)));

    bridge.receive_inbound_batch(r#"{"event":"Destroy","id":"ghost"}"#);
    assert_eq!(bridge.dispatch_inbound(), 0);
    assert_eq!(bridge.outbound_len(), 0);
}

#[test]
fn destroy_cascades_children_first() {
    let mut bridge = bridge();
    let root = node(&mut bridge, "root", None);
    node(&mut bridge, "a", Some("root"));
    node(&mut bridge, "a1", Some("a"));
    node(&mut bridge, "b", Some("root"));
    drain_names(&bridge);

    bridge.destroy(&root).expect("destroy");
    assert_eq!(
        drain_names(&bridge),
        vec!["Destroyed a1", "Destroyed a", "Destroyed b", "Destroyed root"]
    );
    assert!(bridge.registry().is_empty());
}

#[test]
fn destroyed_query_runs_while_tearing_down() {
    let mut bridge = bridge();
    bridge.receive_inbound_batch(
        r#"{"event":"Create","id":"w","data":{"template":"Widget",
            "update":{"title":"bye"},
            "interests":{"Destroyed":{"query":{"t":"title"},"update":{"title":"ignored"}}}}}"#,
    );
    bridge.dispatch_inbound();
    bridge.drain_outbound(16);

    bridge.destroy(&ObjectId::from("w")).expect("destroy");
    let batch = bridge.drain_outbound(16).expect("Destroyed queued");
    let events: Value = serde_json::from_str(&batch).expect("json");
    assert_eq!(events, json!([{"event": "Destroyed", "id": "w", "data": {"t": "bye"}}]));
}

#[test]
fn destroy_path_naming_a_capability_detaches_it() {
    let mut bridge = bridge();
    let id = node(&mut bridge, "n1", None);
    bridge
        .handle_add_component(&id, "Highlight", "")
        .expect("attach");
    bridge
        .handle_add_component(&id, "Highlight", "")
        .expect("attaching twice is a no-op");
    assert_eq!(
        bridge.resolve_path(&id, "Highlight/enabled").expect("resolves"),
        Some(json!(false))
    );

    bridge.handle_destroy(&id, "Highlight").expect("detach");
    assert!(bridge.registry().is_active(&id));
    assert!(bridge.object(&id).is_some_and(|o| !o.has_capability("Highlight")));
    assert_eq!(drain_names(&bridge), vec!["Created n1"]);
}

#[test]
fn add_component_rejects_unknown_capability() {
    let mut bridge = bridge();
    let id = node(&mut bridge, "n1", None);
    let err = bridge
        .handle_add_component(&id, "Rigidbody", "")
        .expect_err("not in the catalog");
    assert!(matches!(err, BridgeError::UnknownCapability(_)));
}

// =============================================================================
// Delayed destroy
// =============================================================================

#[test]
fn destroy_after_fires_on_tick() {
    let mut bridge = bridge();
    let id = node(&mut bridge, "n1", None);
    drain_names(&bridge);

    bridge.handle_destroy_after(&id, 0.5, "").expect("armed");
    assert!(bridge.has_pending_destroy(&id));

    bridge.tick(Duration::from_millis(300));
    assert!(bridge.registry().is_active(&id));
    bridge.tick(Duration::from_millis(300));
    assert_eq!(drain_names(&bridge), vec!["Destroyed n1"]);
    assert!(!bridge.has_pending_destroy(&id));
}

#[test]
fn explicit_destroy_cancels_the_timer() {
    let mut bridge = bridge();
    let id = node(&mut bridge, "n1", None);
    drain_names(&bridge);

    bridge.destroy_after(&id, Duration::from_secs(1)).expect("armed");
    bridge.destroy(&id).expect("explicit");
    assert!(!bridge.has_pending_destroy(&id));

    bridge.tick(Duration::from_secs(2));
    assert_eq!(drain_names(&bridge), vec!["Destroyed n1"]);
}

#[test]
fn rearming_replaces_the_deadline() {
    let mut bridge = bridge();
    let id = node(&mut bridge, "n1", None);
    bridge.destroy_after(&id, Duration::from_secs(1)).expect("armed");
    bridge.destroy_after(&id, Duration::from_secs(5)).expect("re-armed");

    bridge.tick(Duration::from_secs(2));
    assert!(bridge.registry().is_active(&id));
    bridge.tick(Duration::from_secs(4));
    assert!(bridge.registry().is_retired(&id));
}

#[test]
fn non_positive_delay_destroys_now_and_nan_is_rejected() {
    let mut bridge = bridge();
    let id = node(&mut bridge, "n1", None);
    assert!(matches!(
        bridge.handle_destroy_after(&id, f64::NAN, ""),
        Err(BridgeError::InvalidMessage(_))
    ));
    bridge.handle_destroy_after(&id, 0.0, "").expect("immediate");
    assert!(bridge.registry().is_retired(&id));
}

#[test]
fn oversized_delay_is_rejected_and_batch_continues() {
    let mut bridge = bridge();
    let id = node(&mut bridge, "n1", None);
    drain_names(&bridge);

    assert!(matches!(
        bridge.handle_destroy_after(&id, 1e20, ""),
        Err(BridgeError::InvalidMessage(_))
    ));
    assert!(bridge.registry().is_active(&id));

    bridge.receive_inbound_batch(
        r#"[{"event":"DestroyAfter","id":"n1","data":{"delay":1e20}},
            {"event":"Destroy","id":"n1"}]"#,
    );
    assert_eq!(bridge.dispatch_inbound(), 1);
    assert_eq!(drain_names(&bridge), vec!["Destroyed n1"]);
    assert!(bridge.registry().is_retired(&id));
}

// =============================================================================
// Hierarchy
// =============================================================================

#[test]
fn reparent_keeps_world_position() {
    let mut bridge = bridge();
    let parent = node(&mut bridge, "parent", None);
    let child = node(&mut bridge, "child", None);
    update(&mut bridge, &parent, json!({"transform/position": {"x": 10, "y": 0, "z": 0}}));
    update(&mut bridge, &child, json!({"transform/position": {"x": 1, "y": 2, "z": 3}}));

    bridge.reparent(&child, Some(&parent), true).expect("reparent");
    assert_close(position(&mut bridge, &child), [-9.0, 2.0, 3.0]);
    assert_eq!(
        bridge.object(&child).and_then(|o| o.parent()).cloned(),
        Some(parent.clone())
    );

    bridge.reparent(&child, None, true).expect("detach");
    assert_close(position(&mut bridge, &child), [1.0, 2.0, 3.0]);
}

#[test]
fn reparent_without_world_position_keeps_local() {
    let mut bridge = bridge();
    let parent = node(&mut bridge, "parent", None);
    let child = node(&mut bridge, "child", None);
    update(&mut bridge, &parent, json!({"transform/position": {"x": 10, "y": 0, "z": 0}}));
    update(&mut bridge, &child, json!({"transform/position": {"x": 1, "y": 2, "z": 3}}));

    bridge
        .handle_set_parent(&child, "object:parent", false, "")
        .expect("set parent");
    assert_close(position(&mut bridge, &child), [1.0, 2.0, 3.0]);
    assert_eq!(
        bridge.resolve_path(&child, "transform:../name").expect("parent step"),
        Some(json!(""))
    );
}

#[test]
fn reparent_refuses_cycles() {
    let mut bridge = bridge();
    let root = node(&mut bridge, "root", None);
    let leaf = node(&mut bridge, "leaf", Some("root"));
    let err = bridge
        .reparent(&root, Some(&leaf), true)
        .expect_err("cycle");
    assert!(matches!(err, BridgeError::InvalidParent { .. }));
    assert_eq!(bridge.object(&root).and_then(|o| o.parent()), None);
}

// =============================================================================
// Animation
// =============================================================================

#[test]
fn animate_interpolates_and_emits_on_finish() {
    let mut bridge = bridge();
    bridge.receive_inbound_batch(
        r#"[{"event":"Create","id":"n1","data":{"template":"Node","interests":{"Arrived":true}}},
            {"event":"Animate","id":"n1","data":[
                {"path":"transform/position","to":{"x":10,"y":0,"z":0},"duration":1.0,"emit":"Arrived"}]}]"#,
    );
    assert_eq!(bridge.dispatch_inbound(), 2);
    let id = ObjectId::from("n1");
    assert!(bridge.is_animating(&id));
    drain_names(&bridge);

    bridge.tick(Duration::from_millis(500));
    assert_close(position(&mut bridge, &id), [5.0, 0.0, 0.0]);
    assert!(drain_names(&bridge).is_empty());

    bridge.tick(Duration::from_millis(500));
    assert_close(position(&mut bridge, &id), [10.0, 0.0, 0.0]);
    assert_eq!(drain_names(&bridge), vec!["Arrived n1"]);
    assert!(!bridge.is_animating(&id));
}

#[test]
fn destroy_stops_animation() {
    let mut bridge = bridge();
    let id = node(&mut bridge, "n1", None);
    let steps = scenebridge_runtime::AnimationStep::parse_all(&json!([
        {"path": "transform/position/x", "to": 5, "duration": 1.0}
    ]))
    .expect("valid steps");
    bridge.handle_animate(&id, steps, "").expect("animate");
    bridge.destroy(&id).expect("destroy");
    assert!(!bridge.is_animating(&id));
    bridge.tick(Duration::from_millis(500));
}

// =============================================================================
// Listeners
// =============================================================================

#[test]
fn listeners_see_writes_and_lifecycle() {
    let mut bridge = bridge();
    let journal = Journal::default();
    let listener = bridge.add_listener(Box::new(journal.clone()));

    let id = node(&mut bridge, "n1", None);
    let mut bundle = Map::new();
    bundle.insert("name".into(), json!("hero"));
    bundle.insert("nope".into(), json!(1));
    bridge.handle_update(&id, &bundle, "").expect("update");
    bridge.destroy(&id).expect("destroy");

    assert_eq!(
        *journal.0.lock(),
        vec![
            "active n1",
            "changed n1 name",
            "destroying n1",
            "destroyed n1",
        ]
    );

    assert!(bridge.remove_listener(listener));
    node(&mut bridge, "n2", None);
    assert_eq!(journal.0.lock().len(), 4);
}
