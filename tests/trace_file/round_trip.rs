//! Full write/read cycles

use crate::common::*;

// ============================================================================
// Scenario: custom two-level template
// ============================================================================

#[test]
fn scenario_custom_template_path_and_round_trip() {
    let (_dir, path) = scratch();
    let mut m = Metadata::new();
    m.insert("network".into(), "BW".into());
    m.insert("station".into(), "RJOB".into());
    m.insert("starttime".into(), MetadataValue::Timestamp(t0()));
    let trace = Trace::new(Samples::I32((0..11).collect()), m);

    let config = config("{network}.{station}/{starttime}_{endtime}", "raise");
    let mut file = TraceFile::create(&path, config.clone()).unwrap();
    let report = file.write(std::slice::from_ref(&trace)).unwrap();
    file.close().unwrap();

    assert_eq!(
        report.outcomes[0].path,
        "waveforms/BW.RJOB/2009-08-24T00:20:03.000000Z_2009-08-24T00:20:13.000000Z"
    );

    let file = TraceFile::open(&path, config).unwrap();
    let read = file.read(&ReadOptions::new());
    assert_eq!(read, vec![trace]);
}

// ============================================================================
// Standard template
// ============================================================================

#[test]
fn standard_template_round_trip() {
    let (_dir, path) = scratch();
    let traces = three_component();

    let mut file = TraceFile::create(&path, SessionConfig::default()).unwrap();
    let report = file.write(&traces).unwrap();
    assert_eq!(report.count(WriteStatus::Written), 3);
    assert_eq!(report.warnings().count(), 0);
    file.close().unwrap();

    assert!(tracestore::is_trace_file(&path));

    let file = TraceFile::open(&path, SessionConfig::default()).unwrap();
    assert_eq!(by_channel(file.read(&ReadOptions::new())), by_channel(traces));
    assert_eq!(
        file.paths(),
        vec![
            "waveforms/BW.RJOB/.EHE/2009-08-24T00:20:03_2009-08-24T00:20:13",
            "waveforms/BW.RJOB/.EHN/2009-08-24T00:20:03_2009-08-24T00:20:13",
            "waveforms/BW.RJOB/.EHZ/2009-08-24T00:20:03_2009-08-24T00:20:13",
        ]
    );
}

#[test]
fn payload_types_preserved() {
    let (_dir, path) = scratch();
    let base = station_trace("BW", "RJOB", "EHZ", t0(), 4).metadata;
    let payloads = vec![
        Samples::I32(vec![1, -2, 3, 4]),
        Samples::I64(vec![i64::MAX, 0, -1, 7]),
        Samples::F32(vec![0.25, 1.5, -3.0, 8.0]),
        Samples::F64(vec![f64::MIN_POSITIVE, 2.0, -0.0, 1e300]),
    ];
    let traces: Vec<Trace> = payloads
        .into_iter()
        .enumerate()
        .map(|(i, data)| {
            let mut m = base.clone();
            m.insert("channel".into(), format!("CH{}", i).into());
            Trace::new(data, m)
        })
        .collect();

    let mut file = TraceFile::create(&path, SessionConfig::default()).unwrap();
    file.write(&traces).unwrap();
    file.close().unwrap();

    let file = TraceFile::open(&path, SessionConfig::default()).unwrap();
    assert_eq!(by_channel(file.read(&ReadOptions::new())), traces);
}

#[test]
fn stored_template_wins_over_session_default() {
    let (_dir, path) = scratch();
    let mut file = TraceFile::create(&path, config("flat", "raise")).unwrap();
    file.write(&three_component()).unwrap();
    file.close().unwrap();

    let mut file = TraceFile::append(&path, config("nested", "raise")).unwrap();
    assert_eq!(file.index_template().as_str(), tracestore::index::FLAT);
    file.write(&[station_trace("BW", "ALTM", "EHZ", t0(), 11)]).unwrap();
    assert!(file
        .paths()
        .iter()
        .all(|p| p.split('/').count() == 2), "flat paths have one level below the data group");
}

#[test]
fn custom_data_group() {
    let (_dir, path) = scratch();
    let config = SessionConfig::builder().group("xcorr/day1").build().unwrap();
    let mut file = TraceFile::create(&path, config.clone()).unwrap();
    file.write(&three_component()).unwrap();
    assert!(file.paths().iter().all(|p| p.starts_with("xcorr/day1/")));

    let default_group = file.read(&ReadOptions::new().group("waveforms"));
    assert!(default_group.is_empty());
    assert_eq!(file.read(&ReadOptions::new()).len(), 3);
}

// ============================================================================
// Format markers
// ============================================================================

#[test]
fn foreign_files_are_not_trace_files() {
    let (dir, path) = scratch();
    std::fs::write(&path, b"MiniSEED? no.").unwrap();
    assert!(!tracestore::is_trace_file(&path));
    assert!(!tracestore::is_trace_file(dir.path().join("absent.trc")));
    assert!(!tracestore::is_trace_file(dir.path()));
}

#[test]
fn header_markers_written_on_create() {
    let (_dir, path) = scratch();
    let file = TraceFile::create(&path, SessionConfig::default()).unwrap();
    let header = file.header().clone();
    file.close().unwrap();

    assert_eq!(header.format_tag.as_deref(), Some("tracestore"));
    assert_eq!(header.format_version.as_deref(), Some(env!("CARGO_PKG_VERSION")));
    assert_eq!(header.index_template.as_deref(), Some(tracestore::index::STANDARD));
    assert_eq!(header.trace_counter, None);
    assert!(tracestore::is_trace_file(&path));
}

// ============================================================================
// Timestamp precision and derived stats at the edges
// ============================================================================

#[test]
fn nanosecond_starttime_reads_back_at_microseconds() {
    let (_dir, path) = scratch();
    let start = Timestamp::from(Utc.timestamp_nanos(1_251_073_203_123_456_789));
    let trace = station_trace("BW", "RJOB", "EHZ", start, 5);
    assert_eq!(
        trace.metadata["starttime"],
        MetadataValue::Timestamp(Timestamp::from_micros(1_251_073_203_123_456).unwrap())
    );

    let mut file = TraceFile::create(&path, config("counter", "raise")).unwrap();
    file.write(std::slice::from_ref(&trace)).unwrap();
    file.close().unwrap();

    let file = TraceFile::open(&path, SessionConfig::default()).unwrap();
    assert_eq!(file.read(&ReadOptions::new()), vec![trace]);
}

#[test]
fn huge_stored_delta_reads_without_endtime() {
    let (_dir, path) = scratch();
    let mut m = station_trace("BW", "RJOB", "EHZ", t0(), 2).metadata;
    m.insert("delta".into(), MetadataValue::Float(1e300));
    let trace = Trace::new(Samples::F64(vec![0.0, 1.0]), m);
    assert!(!trace.metadata.contains_key("endtime"));

    let mut file = TraceFile::create(&path, config("counter", "raise")).unwrap();
    file.write(std::slice::from_ref(&trace)).unwrap();
    file.close().unwrap();

    let file = TraceFile::open(&path, SessionConfig::default()).unwrap();
    let read = file.read(&ReadOptions::new());
    assert_eq!(read, vec![trace]);
    assert_eq!(file.get_at(0).unwrap().trace.npts(), 2);
}
