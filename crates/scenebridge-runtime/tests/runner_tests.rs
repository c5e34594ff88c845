//! Integration tests for [`BridgeRunner`] over a channel transport.

use scenebridge_runtime::config::BridgeConfig;
use scenebridge_runtime::{Bridge, BridgeRunner, ChannelTransport, TransportError};
use scenebridge_types::ObjectId;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

fn bridge(configure: impl FnOnce(&mut BridgeConfig)) -> Bridge {
    let mut config = BridgeConfig::shared();
    configure(&mut config);
    Bridge::new(config).expect("non-exclusive bridge")
}

/// Receives batches until `count` events arrived.
async fn recv_events(rx: &mut mpsc::UnboundedReceiver<String>, count: usize) -> Vec<Value> {
    let mut events = Vec::new();
    while events.len() < count {
        let batch = timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("batch within timeout")
            .expect("transport open");
        match serde_json::from_str::<Value>(&batch).expect("json batch") {
            Value::Array(items) => events.extend(items),
            other => panic!("expected an array batch, got {other}"),
        }
    }
    events
}

#[tokio::test]
async fn runner_round_trips_batches() {
    let (transport, mut rx) = ChannelTransport::pair();
    let (runner, handle) = BridgeRunner::new(bridge(|_| {}), transport);
    let task = tokio::spawn(runner.run());

    handle
        .send_batch(
            r#"[{"event":"Create","id":"obj1","data":{"template":"Widget",
                "interests":{"Clicked":{"query":{"n":"count"}}}}},
                {"event":"Update","id":"obj1","data":{"method:Click":[]}}]"#,
        )
        .await
        .expect("runner alive");

    let events = recv_events(&mut rx, 2).await;
    assert_eq!(
        events,
        vec![
            json!({"event": "Created", "id": "obj1"}),
            json!({"event": "Clicked", "id": "obj1", "data": {"n": 1}}),
        ]
    );

    handle.shutdown();
    let bridge = timeout(Duration::from_secs(5), task)
        .await
        .expect("runner stops")
        .expect("runner task did not panic");
    assert!(bridge.registry().is_active(&ObjectId::from("obj1")));
}

#[tokio::test]
async fn runner_splits_outbound_by_max_event_count() {
    let (transport, mut rx) = ChannelTransport::pair();
    let (runner, handle) = BridgeRunner::new(bridge(|c| c.queue.max_event_count = 2), transport);
    let task = tokio::spawn(runner.run());

    handle
        .send_batch(
            r#"[{"event":"Create","id":"a","data":{"template":"Node"}},
                {"event":"Create","id":"b","data":{"template":"Node"}},
                {"event":"Create","id":"c","data":{"template":"Node"}}]"#,
        )
        .await
        .expect("runner alive");

    let first: Vec<Value> = serde_json::from_str(&rx.recv().await.expect("first batch")).expect("json");
    let second: Vec<Value> = serde_json::from_str(&rx.recv().await.expect("second batch")).expect("json");
    assert_eq!(first.len(), 2);
    assert_eq!(second.len(), 1);
    assert_eq!(second[0]["id"], json!("c"));

    drop(handle);
    timeout(Duration::from_secs(5), task)
        .await
        .expect("runner stops when every handle is dropped")
        .expect("runner task did not panic");
}

#[tokio::test]
async fn buffered_batches_are_dispatched_after_handle_drop() {
    let (transport, mut rx) = ChannelTransport::pair();
    let (runner, handle) = BridgeRunner::new(bridge(|_| {}), transport);

    for id in ["n0", "n1", "n2"] {
        handle
            .send_batch(format!(r#"[{{"event":"Create","id":"{id}","data":{{"template":"Node"}}}}]"#))
            .await
            .expect("channel has capacity");
    }
    drop(handle);

    let bridge = timeout(Duration::from_secs(5), runner.run())
        .await
        .expect("runner stops once the handle is gone");
    for id in ["n0", "n1", "n2"] {
        assert!(bridge.registry().is_active(&ObjectId::from(id)), "{id} was dropped");
    }

    let events = recv_events(&mut rx, 3).await;
    let ids: Vec<&str> = events.iter().filter_map(|e| e["id"].as_str()).collect();
    assert_eq!(ids, vec!["n0", "n1", "n2"]);
}

#[tokio::test(start_paused = true)]
async fn runner_ticks_delayed_destroys() {
    let (transport, mut rx) = ChannelTransport::pair();
    let (runner, handle) = BridgeRunner::new(bridge(|c| c.pump.tick_ms = 10), transport);
    let task = tokio::spawn(runner.run());

    handle
        .send_batch(
            r#"[{"event":"Create","id":"n1","data":{"template":"Node"}},
                {"event":"DestroyAfter","id":"n1","data":{"delay":0.05}}]"#,
        )
        .await
        .expect("runner alive");

    let events = recv_events(&mut rx, 2).await;
    assert_eq!(
        events,
        vec![
            json!({"event": "Created", "id": "n1"}),
            json!({"event": "Destroyed", "id": "n1"}),
        ]
    );

    handle.shutdown();
    let bridge = task.await.expect("runner task did not panic");
    assert!(bridge.registry().is_retired(&ObjectId::from("n1")));
}

#[tokio::test]
async fn send_after_stop_reports_closed() {
    let (transport, _rx) = ChannelTransport::pair();
    let (runner, handle) = BridgeRunner::new(bridge(|_| {}), transport);
    let task = tokio::spawn(runner.run());

    handle.shutdown();
    task.await.expect("runner task did not panic");
    assert_eq!(handle.send_batch("[]").await, Err(TransportError::Closed));
}
