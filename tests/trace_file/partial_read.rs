//! Prefix-filtered reads

use crate::common::*;

fn populate(path: &std::path::Path) {
    let mut traces = Vec::new();
    for (net, sta) in [("BW", "RJOB"), ("BW", "ALTM"), ("GR", "FUR")] {
        for cha in ["HHZ", "HHN"] {
            traces.push(station_trace(net, sta, cha, t0(), 11));
        }
    }
    let mut file = TraceFile::create(path, config("nested", "raise")).unwrap();
    file.write(&traces).unwrap();
    file.close().unwrap();
}

fn filter(pairs: &[(&str, &str)]) -> Metadata {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), MetadataValue::from(*v)))
        .collect()
}

fn codes(traces: &[Trace]) -> Vec<String> {
    traces
        .iter()
        .map(|t| {
            let get = |k: &str| t.metadata[k].as_str().unwrap().to_string();
            format!("{}.{}.{}", get("network"), get("station"), get("channel"))
        })
        .collect()
}

#[test]
fn two_level_filter_selects_subtree() {
    let (_dir, path) = scratch();
    populate(&path);

    let file = TraceFile::open(&path, SessionConfig::default()).unwrap();
    let opts = ReadOptions::new().filter(filter(&[("network", "BW"), ("station", "RJOB")]));
    assert_eq!(codes(&file.read(&opts)), vec!["BW.RJOB.HHN", "BW.RJOB.HHZ"]);
}

#[test]
fn filter_stops_at_first_unresolved_level() {
    let (_dir, path) = scratch();
    populate(&path);

    let file = TraceFile::open(&path, SessionConfig::default()).unwrap();
    // location is unresolved, so channel cannot narrow the read further
    let opts = ReadOptions::new().filter(filter(&[("network", "BW"), ("channel", "HHZ")]));
    assert_eq!(
        codes(&file.read(&opts)),
        vec!["BW.ALTM.HHN", "BW.ALTM.HHZ", "BW.RJOB.HHN", "BW.RJOB.HHZ"]
    );
}

#[test]
fn filter_matching_nothing_yields_nothing() {
    let (_dir, path) = scratch();
    populate(&path);

    let file = TraceFile::open(&path, SessionConfig::default()).unwrap();
    let opts = ReadOptions::new().filter(filter(&[("network", "XX")]));
    assert!(file.read(&opts).is_empty());
}

#[test]
fn empty_filter_reads_everything() {
    let (_dir, path) = scratch();
    populate(&path);

    let file = TraceFile::open(&path, SessionConfig::default()).unwrap();
    assert_eq!(file.read(&ReadOptions::new().filter(Metadata::new())).len(), 6);
}

#[test]
fn group_may_name_a_single_dataset() {
    let (_dir, path) = scratch();
    populate(&path);

    let file = TraceFile::open(&path, SessionConfig::default()).unwrap();
    let target = file.paths()[2].clone();
    let read = file.read(&ReadOptions::new().group(target));
    assert_eq!(codes(&read), vec!["BW.RJOB.HHN"]);
}
