//! Unit tests for the logging functionality in the `ec3k-rs` crate.

use ec3k_rs::logging::{init_logger, init_logger_with_level, log_debug, log_error, log_info, log_warn};
use ec3k_rs::util::logging::{debug::log_crc_result, log_frame_hex, LogThrottle};

/// Tests that the logging helpers work as expected after initialisation.
#[test]
fn test_logging() {
    init_logger_with_level(log::LevelFilter::Trace);
    log_error("This is an error message");
    log_warn("This is a warning message");
    log_info("This is an info message");
    log_debug("This is a debug message");
    log_frame_hex("EC3K frame", &[0x7E; 100]);
    log_crc_result(0x1234, 0x1234);
    log_crc_result(0x1234, 0x4321);
}

/// Tests that repeated initialisation does not panic.
#[test]
fn test_init_logger() {
    init_logger();
    init_logger();
    init_logger_with_level(log::LevelFilter::Debug);
    assert!(log::max_level() != log::LevelFilter::Off);
}

#[test]
fn test_throttle_caps_messages() {
    let mut throttle = LogThrottle::new(60_000, 3);
    let allowed = (0..10).filter(|_| throttle.allow()).count();
    assert_eq!(allowed, 3);
    assert_eq!(throttle.suppressed(), 7);

    throttle.reset();
    assert!(throttle.allow());
}
