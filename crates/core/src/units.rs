//! Byte/megabyte conversions.
//!
//! Quotas are tracked in megabytes with two decimal places. One megabyte is
//! 1,048,576 bytes throughout.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Bytes per megabyte (binary).
pub const BYTES_PER_MB: u64 = 1_048_576;

const SIZE_UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// Converts bytes to megabytes rounded to two decimal places.
#[must_use]
pub fn bytes_to_mb(bytes: u64) -> Decimal {
    (Decimal::from(bytes) / Decimal::from(BYTES_PER_MB))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Converts megabytes to whole bytes.
///
/// Negative input yields 0; values beyond `u64` saturate.
#[must_use]
pub fn mb_to_bytes(mb: Decimal) -> u64 {
    if mb.is_sign_negative() {
        return 0;
    }

    mb.checked_mul(Decimal::from(BYTES_PER_MB))
        .map(|bytes| bytes.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|bytes| bytes.to_u64())
        .unwrap_or(u64::MAX)
}

/// Formats a byte count with 1024-based units (B, KB, MB, GB).
///
/// At most two decimals are shown and trailing zeros are dropped, so
/// `1536` renders as `1.5 KB` and `1048576` as `1 MB`.
#[must_use]
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut unit = 0;
    let mut divisor: u64 = 1;
    while unit < SIZE_UNITS.len() - 1 && bytes / divisor >= 1024 {
        divisor *= 1024;
        unit += 1;
    }

    let value = (Decimal::from(bytes) / Decimal::from(divisor))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .normalize();

    format!("{value} {}", SIZE_UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(0, "0 B")]
    #[case(512, "512 B")]
    #[case(1023, "1023 B")]
    #[case(1024, "1 KB")]
    #[case(1536, "1.5 KB")]
    #[case(1_048_576, "1 MB")]
    #[case(1_572_864, "1.5 MB")]
    #[case(1_073_741_824, "1 GB")]
    #[case(5 * 1_099_511_627_776, "5120 GB")]
    fn test_format_file_size(#[case] bytes: u64, #[case] expected: &str) {
        assert_eq!(format_file_size(bytes), expected);
    }

    #[rstest]
    #[case(0, dec!(0))]
    #[case(1_048_576, dec!(1))]
    #[case(52_428_800, dec!(50))]
    #[case(1_572_864, dec!(1.5))]
    // 5242 bytes = 0.004999 MB, 5243 bytes = 0.0050001 MB
    #[case(5242, dec!(0))]
    #[case(5243, dec!(0.01))]
    fn test_bytes_to_mb(#[case] bytes: u64, #[case] expected: Decimal) {
        assert_eq!(bytes_to_mb(bytes), expected);
    }

    #[test]
    fn test_mb_to_bytes() {
        assert_eq!(mb_to_bytes(dec!(1)), 1_048_576);
        assert_eq!(mb_to_bytes(dec!(0.5)), 524_288);
        assert_eq!(mb_to_bytes(dec!(1.23)), 1_289_748);
        assert_eq!(mb_to_bytes(dec!(-1)), 0);
        assert_eq!(mb_to_bytes(Decimal::MAX), u64::MAX);
    }

    proptest! {
        /// Rounding to hundredths of a megabyte loses at most half a hundredth.
        #[test]
        fn prop_bytes_mb_round_trip_within_rounding(bytes in 0u64..1_000_000_000_000) {
            let back = mb_to_bytes(bytes_to_mb(bytes));
            prop_assert!(back.abs_diff(bytes) <= 5243, "{bytes} -> {back}");
        }

        /// Whole megabytes survive the round trip exactly.
        #[test]
        fn prop_whole_mb_round_trip_exact(mb in 0u64..10_000_000) {
            let bytes = mb * BYTES_PER_MB;
            prop_assert_eq!(mb_to_bytes(bytes_to_mb(bytes)), bytes);
        }

        #[test]
        fn prop_format_has_known_unit(bytes in any::<u64>()) {
            let formatted = format_file_size(bytes);
            let unit = formatted.rsplit(' ').next().unwrap_or_default();
            prop_assert!(SIZE_UNITS.contains(&unit));
        }
    }
}
