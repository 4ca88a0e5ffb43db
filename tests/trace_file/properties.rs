//! Property tests for the attribute codec and index rendering

use crate::common::*;
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use tracestore::codec::{decode, encode_metadata, FALLBACK_KEY};
use tracestore::DerivedFields;
use tracestore_storage::Attribute;

fn arb_native() -> impl Strategy<Value = MetadataValue> {
    prop_oneof![
        any::<i64>().prop_map(MetadataValue::Int),
        any::<f64>()
            .prop_filter("NaN never compares equal", |f| !f.is_nan())
            .prop_map(MetadataValue::Float),
        "[a-zA-Z0-9 _.:-]{0,20}".prop_map(MetadataValue::String),
        any::<i64>().prop_map(|ns| MetadataValue::from(Utc.timestamp_nanos(ns))),
        prop::collection::vec(any::<i64>(), 0..8).prop_map(MetadataValue::from),
        prop::collection::vec(-1e9f64..1e9f64, 0..8).prop_map(MetadataValue::from),
    ]
}

fn arb_value() -> impl Strategy<Value = MetadataValue> {
    arb_native().prop_recursive(3, 16, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(MetadataValue::List),
            prop::collection::btree_map("[a-z]{1,6}", inner, 0..4).prop_map(MetadataValue::Map),
        ]
    })
}

fn arb_metadata(value: impl Strategy<Value = MetadataValue>) -> impl Strategy<Value = Metadata> {
    prop::collection::btree_map("[a-z][a-z0-9_]{0,10}", value, 0..10)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_native_metadata_round_trip(m in arb_metadata(arb_native())) {
        let encoded = encode_metadata(&m, &BTreeSet::new());
        prop_assert!(encoded.warnings.is_empty());
        prop_assert!(!encoded.native.contains_key(FALLBACK_KEY));
        let (decoded, warnings) = decode(&encoded.native);
        prop_assert!(warnings.is_empty());
        prop_assert_eq!(decoded, m);
    }

    #[test]
    fn prop_mixed_metadata_round_trip(m in arb_metadata(arb_value())) {
        let encoded = encode_metadata(&m, &BTreeSet::new());
        for (key, attr) in &encoded.native {
            if key != FALLBACK_KEY {
                prop_assert!(!matches!(attr, Attribute::Text(_)));
            }
        }
        for key in &encoded.fallback {
            prop_assert!(m[key].is_compound());
            prop_assert!(!encoded.native.contains_key(key));
        }
        let (decoded, warnings) = decode(&encoded.native);
        prop_assert!(warnings.is_empty());
        prop_assert_eq!(decoded, m);
    }

    #[test]
    fn prop_timestamp_never_changes_type(
        us in -300_000_000_000_000_000i64..300_000_000_000_000_000i64
    ) {
        let ts = Timestamp::from_micros(us).unwrap();
        let mut m = Metadata::new();
        m.insert("onset".into(), MetadataValue::Timestamp(ts));

        let encoded = encode_metadata(&m, &BTreeSet::new());
        let (decoded, _) = decode(&encoded.native);
        if ts.has_wire_form() {
            prop_assert!(encoded.warnings.is_empty());
            prop_assert_eq!(decoded, m);
        } else {
            prop_assert_eq!(encoded.warnings.len(), 1);
            prop_assert!(decoded.is_empty());
        }
    }

    #[test]
    fn prop_prefix_is_prefix_of_full_path(
        net in "[A-Z]{2}",
        sta in "[A-Z]{3,5}",
        cha in "[A-Z]{3}",
        keep in 0usize..5,
    ) {
        let mut full = Metadata::new();
        full.insert("network".into(), net.as_str().into());
        full.insert("station".into(), sta.as_str().into());
        full.insert("location".into(), "00".into());
        full.insert("channel".into(), cha.as_str().into());
        full.insert("starttime".into(), MetadataValue::Timestamp(t0()));
        full.insert("endtime".into(), MetadataValue::Timestamp(t0_plus(60)));

        let order = ["network", "station", "location", "channel", "starttime"];
        let partial: Metadata = full
            .iter()
            .filter(|(k, _)| order[..keep].contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        let template = IndexTemplate::resolve("nested").unwrap();
        let path = template.render(&full, &DerivedFields::from_metadata(&full)).unwrap();
        let prefix = template.render_prefix(&partial, &DerivedFields::from_metadata(&partial));
        prop_assert!(path.starts_with(&prefix));
        prop_assert_eq!(prefix.split('/').filter(|s| !s.is_empty()).count(), keep.min(4));
    }
}

#[test]
fn fallback_keys_partition_metadata() {
    let mut m = Metadata::new();
    m.insert("plain".into(), MetadataValue::Int(1));
    m.insert("list".into(), MetadataValue::List(vec![MetadataValue::Int(1)]));
    m.insert("map".into(), MetadataValue::Map(BTreeMap::new()));

    let encoded = encode_metadata(&m, &BTreeSet::new());
    let native: BTreeSet<_> = encoded
        .native
        .keys()
        .filter(|k| *k != FALLBACK_KEY)
        .cloned()
        .collect();
    assert!(native.is_disjoint(&encoded.fallback));
    let all: BTreeSet<_> = native.union(&encoded.fallback).cloned().collect();
    assert_eq!(all, m.keys().cloned().collect());
}
