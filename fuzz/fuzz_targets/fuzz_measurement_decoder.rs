//! Fuzz target: `codec::measurement::decode`
//!
//! Drives arbitrary byte sequences into the Heart Rate Measurement decoder
//! and asserts that it never panics, fails only on short input, and that
//! a successful decode agrees with the flag byte.
//!
//! cargo fuzz run fuzz_measurement_decoder

#![no_main]

use hrp::codec::measurement::{ValueFormat, decode};
use hrp::error::DecodeError;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    match decode(data) {
        Ok(m) => {
            let flags = data[0];
            let mut needed = if flags & 0x01 == 0 { 2 } else { 3 };
            if flags & 0x08 != 0 {
                needed += 1;
            }
            assert!(data.len() >= needed, "decoded from {} bytes, need {needed}", data.len());
            if m.format == ValueFormat::U8 {
                assert!(m.heart_rate <= u16::from(u8::MAX));
            }
            assert_eq!(m.secondary.is_some(), flags & 0x08 != 0);
            assert_eq!(m.trailer_present, flags & 0x10 != 0);
        }
        Err(DecodeError::Empty) => assert!(data.is_empty()),
        Err(DecodeError::Truncated) => assert!(!data.is_empty() && data.len() <= 3),
    }

    // Reserved bits never change the result.
    if let Some((&flags, rest)) = data.split_first() {
        let mut cleared = Vec::with_capacity(data.len());
        cleared.push(flags & 0x1F);
        cleared.extend_from_slice(rest);
        assert_eq!(decode(data), decode(&cleared));
    }
});
