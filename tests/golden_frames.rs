use ec3k_rs::ec3k::{
    decode_row, encode_row, CaptureMeta, DecodedFields, DecoderConfig, DeviceFlags,
    EncodeOptions, FrameBuilder, FrameBytes,
};
use ec3k_rs::util::hex::decode_hex;

/// id 0x1234, 60.0 W, 824395111 Ws, one reset, drawing power.
const EXAMPLE_FRAME_HEX: &str =
    "01234BCDE000023450000000123456702580FA000C0DE0000000000000000A0000000030010110EA7D";

fn hex_to_bytes(hex: &str) -> Vec<u8> {
    decode_hex(hex).expect("Invalid hex in test data")
}

fn example_frame() -> FrameBytes {
    FrameBytes::try_from(hex_to_bytes(EXAMPLE_FRAME_HEX).as_slice()).unwrap()
}

#[test]
fn test_example_frame_fields() {
    let fields = DecodedFields::from_frame(&example_frame()).unwrap();

    assert_eq!(fields.id, 0x1234);
    assert_eq!(fields.time_total_s, 0x0A_BCDE);
    assert_eq!(fields.time_on_s, 0x01_2345);
    assert_eq!(fields.energy_ws, 824_395_111);
    assert_eq!(fields.energy_ws_bytewise, 824_395_111);
    assert_eq!(fields.power_current_raw, 600);
    assert_eq!(fields.power_max_raw, 4000);
    assert_eq!(fields.internal, 0xC0DE);
    assert_eq!(fields.reset_counter, 1);
    assert_eq!(fields.flags, DeviceFlags::DRAWING_POWER);
    assert!(fields.padding_clear());
    assert_eq!(fields.crc_received, 0x7DEA);
    assert!(fields.crc_matches());
}

#[test]
fn test_builder_reproduces_example_frame() {
    let built = FrameBuilder::new(0x1234)
        .time_total(0x0A_BCDE)
        .time_on(0x01_2345)
        .energy_ws(824_395_111)
        .power_raw(600)
        .power_max_raw(4000)
        .internal(0xC0DE)
        .reset_counter(1)
        .flags(DeviceFlags::DRAWING_POWER)
        .build()
        .unwrap();
    assert_eq!(built, example_frame());
}

#[test]
fn test_example_frame_over_the_air() {
    let row = encode_row(&example_frame(), &EncodeOptions::default());
    let outcome = decode_row(
        &row,
        &CaptureMeta::new(1_000_000, 50_000),
        &DecoderConfig::default(),
    )
    .unwrap();

    let record = outcome.record().unwrap();
    assert_eq!(record.id, 0x1234);
    assert!((record.power - 60.0).abs() < 1e-9);
    assert!((record.energy - 228.998_641_944).abs() < 1e-6);
}
