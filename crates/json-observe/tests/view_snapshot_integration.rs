use graph_clone::{clone, deep_equal, to_json, GraphValue};
use json_observe::{RecordingHost, Store};
use serde_json::json;

#[test]
fn view_snapshot_survives_store_mutation() {
    let mut store = Store::new(
        RecordingHost::new(),
        json!({ "cfg": { "mode": "fast" }, "events": [1] }),
    );

    let before = store.view().clone();
    let graph = GraphValue::from(store.view());
    let snapshot = clone(&graph);
    assert!(deep_equal(&graph, &snapshot));

    store.set("cfg.mode", json!("slow")).unwrap();
    store.seq("events").unwrap().push(json!(2)).unwrap();

    // The detached copy still renders the pre-mutation document.
    assert_eq!(to_json(&snapshot), before);
    assert_ne!(store.view(), &before);
    assert_eq!(store.host().len(), 2);
}

#[test]
fn reported_values_snapshot_cleanly() {
    let mut store = Store::new(RecordingHost::new(), json!({ "xs": [1, 2] }));
    store.seq("xs").unwrap().push(json!(3)).unwrap();

    let reported = &store.host().records()[0].value;
    let graph = GraphValue::from(reported);
    assert_eq!(to_json(&clone(&graph)), json!([1, 2, 3]));
}
