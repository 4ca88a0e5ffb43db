//! Nested metadata through the JSON fallback attribute

use crate::common::*;
use std::collections::BTreeMap;

fn nested_extra() -> MetadataValue {
    let mut extra = BTreeMap::new();
    extra.insert("a".to_string(), MetadataValue::Int(1));
    extra.insert(
        "b".to_string(),
        MetadataValue::List(vec![1i64.into(), 2i64.into(), 3i64.into()]),
    );
    MetadataValue::Map(extra)
}

#[test]
fn scenario_nested_record_restored_from_blob() {
    let (_dir, path) = scratch();
    let mut tr = station_trace("BW", "RJOB", "EHZ", t0(), 11);
    tr.metadata.insert("extra".into(), nested_extra());

    let mut file = TraceFile::create(&path, SessionConfig::default()).unwrap();
    file.write(std::slice::from_ref(&tr)).unwrap();

    let entry = file.get_at(0).unwrap();
    assert_eq!(entry.trace, tr);
    assert!(entry.warnings.is_empty());
    file.close().unwrap();

    let file = TraceFile::open(&path, SessionConfig::default()).unwrap();
    assert_eq!(file.read(&ReadOptions::new()), vec![tr]);
}

#[test]
fn processing_history_and_nested_maps() {
    let (_dir, path) = scratch();
    let mut tr = station_trace("BW", "RJOB", "EHZ", t0(), 11);
    tr.metadata.insert(
        "processing".into(),
        MetadataValue::List(vec!["filter:lowpass".into(), "detrend:linear".into()]),
    );
    let mut inner = BTreeMap::new();
    inner.insert("x".to_string(), MetadataValue::from("next"));
    inner.insert("y".to_string(), MetadataValue::Timestamp(t0()));
    let mut ad = BTreeMap::new();
    ad.insert("bla".to_string(), MetadataValue::Int(0));
    ad.insert("bla3".to_string(), MetadataValue::from(vec![4i64, 5]));
    ad.insert("nested".to_string(), MetadataValue::Map(inner));
    tr.metadata.insert("ad".into(), MetadataValue::Map(ad));

    let mut file = TraceFile::create(&path, SessionConfig::default()).unwrap();
    file.write(std::slice::from_ref(&tr)).unwrap();
    file.close().unwrap();

    let file = TraceFile::open(&path, SessionConfig::default()).unwrap();
    assert_eq!(file.read(&ReadOptions::new()), vec![tr]);
}

#[test]
fn unsupported_values_dropped_with_warning() {
    let (_dir, path) = scratch();
    let mut tr = station_trace("BW", "RJOB", "EHZ", t0(), 11);
    tr.metadata.insert("handle".into(), MetadataValue::opaque("FileHandle"));

    let mut file = TraceFile::create(&path, SessionConfig::default()).unwrap();
    let report = file.write(std::slice::from_ref(&tr)).unwrap();
    assert_eq!(
        report.warnings().cloned().collect::<Vec<_>>(),
        vec![Warning::UnsupportedValue {
            key: "handle".into(),
            type_name: "FileHandle".into()
        }]
    );

    let read = file.get_at(0).unwrap().trace;
    assert!(!read.metadata.contains_key("handle"));
    tr.metadata.remove("handle");
    assert_eq!(read, tr);
}

#[test]
fn caller_ignored_keys_not_stored() {
    let (_dir, path) = scratch();
    let mut tr = station_trace("BW", "RJOB", "EHZ", t0(), 11);
    tr.metadata.insert(
        "processing".into(),
        MetadataValue::List(vec!["trim".into()]),
    );

    let config = SessionConfig::builder().ignore("processing").build().unwrap();
    let mut file = TraceFile::create(&path, config).unwrap();
    file.write(std::slice::from_ref(&tr)).unwrap();

    let read = file.get_at(0).unwrap().trace;
    assert!(!read.metadata.contains_key("processing"));
}
