//! Running trace counter

use crate::common::*;

#[test]
fn counter_monotonic_across_append_sessions() {
    let (_dir, path) = scratch();
    let first = three_component();
    let second: Vec<Trace> = ["HHZ", "HHN"]
        .iter()
        .map(|cha| station_trace("BW", "ALTM", cha, t0(), 5))
        .collect();

    let mut file = TraceFile::create(&path, config("counter", "raise")).unwrap();
    file.write(&first).unwrap();
    file.close().unwrap();

    let mut file = TraceFile::append(&path, config("standard", "raise")).unwrap();
    let report = file.write(&second).unwrap();
    assert_eq!(report.outcomes[0].path, "waveforms/000003");
    file.close().unwrap();

    let file = TraceFile::open(&path, SessionConfig::default()).unwrap();
    assert_eq!(file.header().trace_counter, Some(5));

    let numbers: Vec<u64> = file
        .paths()
        .iter()
        .map(|p| p.rsplit('/').next().unwrap().parse().unwrap())
        .collect();
    assert_eq!(numbers, vec![0, 1, 2, 3, 4]);
    assert!(numbers.windows(2).all(|w| w[0] < w[1]));

    let mut expected = first;
    expected.extend(second);
    assert_eq!(file.read(&ReadOptions::new()), expected);
}

#[test]
fn same_stream_written_twice_keeps_both_copies() {
    let (_dir, path) = scratch();
    let traces = three_component();

    let mut file = TraceFile::create(&path, config("{trc_num:03d}", "raise")).unwrap();
    file.write(&traces).unwrap();
    file.close().unwrap();
    let mut file = TraceFile::append(&path, config("{trc_num:03d}", "raise")).unwrap();
    file.write(&traces).unwrap();
    file.close().unwrap();

    let read = TraceFile::open(&path, SessionConfig::default())
        .unwrap()
        .read(&ReadOptions::new());
    assert_eq!(read.len(), 6);
    assert_eq!(read[..3], traces[..]);
    assert_eq!(read[3..], traces[..]);
}

#[test]
fn skipped_writes_do_not_consume_counter() {
    let (_dir, path) = scratch();
    let mut tr = station_trace("BW", "RJOB", "EHZ", t0(), 3);
    tr.metadata.insert("trc_num".into(), MetadataValue::Int(0));

    let mut file = TraceFile::create(&path, config("counter", "skip")).unwrap();
    let report = file.write(&[tr.clone(), tr]).unwrap();
    assert_eq!(report.count(WriteStatus::Written), 1);
    assert_eq!(report.count(WriteStatus::Skipped), 1);
    assert_eq!(file.header().trace_counter, Some(1));
}

#[test]
fn counter_absent_without_counter_template() {
    let (_dir, path) = scratch();
    let mut file = TraceFile::create(&path, SessionConfig::default()).unwrap();
    file.write(&three_component()).unwrap();
    assert_eq!(file.header().trace_counter, None);
}
