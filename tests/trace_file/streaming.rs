//! Streaming reads

use crate::common::*;

#[test]
fn consumer_sees_traces_in_traversal_order() {
    let (_dir, path) = scratch();
    let mut file = TraceFile::create(&path, SessionConfig::default()).unwrap();
    file.write(&three_component()).unwrap();

    let mut channels = Vec::new();
    let outcome = file.for_each(&ReadOptions::new(), |tr| {
        channels.push(tr.metadata["channel"].as_str().unwrap().to_string());
        ControlFlow::Continue(())
    });
    assert_eq!(outcome, StreamOutcome::Completed { visited: 3 });
    assert_eq!(channels, vec!["EHE", "EHN", "EHZ"]);
}

#[test]
fn consumer_can_stop_early() {
    let (_dir, path) = scratch();
    let mut file = TraceFile::create(&path, SessionConfig::default()).unwrap();
    file.write(&three_component()).unwrap();

    let mut calls = 0;
    let outcome = file.for_each(&ReadOptions::new(), |_| {
        calls += 1;
        ControlFlow::Break(())
    });
    assert_eq!(outcome, StreamOutcome::Stopped { visited: 1 });
    assert!(outcome.is_stopped());
    assert_eq!(calls, 1);
}

#[test]
fn empty_file_streams_nothing() {
    let (_dir, path) = scratch();
    let file = TraceFile::create(&path, SessionConfig::default()).unwrap();
    let outcome = file.for_each(&ReadOptions::new(), |_| ControlFlow::Continue(()));
    assert_eq!(outcome.visited(), 0);
}

#[test]
fn iterator_is_lazy_and_finite() {
    let (_dir, path) = scratch();
    let mut file = TraceFile::create(&path, SessionConfig::default()).unwrap();
    file.write(&three_component()).unwrap();

    let mut iter = file.iter(&ReadOptions::new().headonly(true));
    let first = iter.next().unwrap();
    assert!(first.path.ends_with("EHE/2009-08-24T00:20:03_2009-08-24T00:20:13"));
    assert_eq!(iter.count(), 2);
}
