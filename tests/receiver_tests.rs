//! Receive session tests with file-backed configuration and output.

use std::fs;
use std::io::Write;

use ec3k_rs::ec3k::{encode_row, FlagPolicy};
use ec3k_rs::{
    BitRow, Capture, CaptureMeta, DecoderConfig, EncodeOptions, EnergyRecord, FrameBuilder,
    JsonLinesSink, Receiver,
};
use tempfile::NamedTempFile;

fn capture(id: u16, power_raw: u16) -> Capture {
    let frame = FrameBuilder::new(id)
        .power_raw(power_raw)
        .build()
        .unwrap();
    Capture::single(
        encode_row(&frame, &EncodeOptions::default()),
        CaptureMeta::new(1_000_000, 30_000),
    )
}

#[test]
fn test_config_file_loaded() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{ "flag_policy": "six_or_more", "max_tone_separation_hz": 100000 }}"#
    )
    .unwrap();

    let config = DecoderConfig::from_json_file(file.path()).unwrap();
    assert_eq!(config.flag_policy, FlagPolicy::SixOrMore);
    assert_eq!(config.max_tone_separation_hz, 100_000);
    assert_eq!(config.min_tone_separation_hz, 20_000);
}

#[test]
fn test_missing_config_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = DecoderConfig::from_json_file(dir.path().join("absent.json"));
    assert!(matches!(result, Err(ec3k_rs::Ec3kError::Io(_))));
}

#[test]
fn test_json_lines_written_to_file() {
    let out = NamedTempFile::new().unwrap();
    let sink = JsonLinesSink::new(out.reopen().unwrap());
    let mut receiver = Receiver::new(DecoderConfig::default(), sink).unwrap();

    let garbage = Capture::single(
        BitRow::from_bits(&[0u8; 600]),
        CaptureMeta::new(1_000_000, 30_000),
    );
    let stats = receiver
        .run(vec![capture(10, 5), garbage, capture(11, 15)])
        .unwrap();
    assert_eq!(stats.captures, 3);
    assert_eq!(stats.records, 2);
    assert_eq!(stats.no_frame, 1);

    let contents = fs::read_to_string(out.path()).unwrap();
    let records: Vec<EnergyRecord> = contents
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(
        records,
        vec![
            EnergyRecord::new(10, 0.5, 0.0),
            EnergyRecord::new(11, 1.5, 0.0)
        ]
    );
}

#[test]
fn test_stats_reset() {
    let mut receiver =
        Receiver::new(DecoderConfig::default(), ec3k_rs::MemorySink::new()).unwrap();
    receiver.process(&capture(1, 1)).unwrap();
    assert_eq!(receiver.stats().records, 1);
    receiver.reset_stats();
    assert_eq!(*receiver.stats(), ec3k_rs::DecodeStats::default());
}
