//! Physical-range inference for signal authoring.
//!
//! When a signal is being composed interactively, its documented physical
//! `[min, max]` follows from the bit width, signedness and scaling alone.

use crate::dbc::types::errors::RangeError;
use crate::dbc::types::signal::Signess;

/// Infers the documented physical range of a signal from its bit width,
/// signedness and scaling.
///
/// Raw bounds are `[0, 2^len - 1]` for unsigned signals and
/// `[-2^(len-1), 2^(len-1) - 1]` for signed ones; both ends are scaled with
/// `factor`/`offset` and rounded to 6 decimal places.
///
/// # Errors
/// Returns [`RangeError::InvalidSignalWidth`] when `bit_length` is outside
/// `1..=64`.
pub fn physical_range(
    bit_length: u16,
    sign: Signess,
    factor: f64,
    offset: f64,
) -> Result<(f64, f64), RangeError> {
    if !(1..=64).contains(&bit_length) {
        return Err(RangeError::InvalidSignalWidth { bit_length });
    }

    let (raw_min, raw_max): (f64, f64) = match sign {
        Signess::Signed => {
            let half: f64 = 2f64.powi(bit_length as i32 - 1);
            (-half, half - 1.0)
        }
        Signess::Unsigned => (0.0, 2f64.powi(bit_length as i32) - 1.0),
    };

    Ok((
        round6(raw_min * factor + offset),
        round6(raw_max * factor + offset),
    ))
}

#[inline]
fn round6(value: f64) -> f64 {
    (value * 1e6).round() / 1e6
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsigned_byte_with_identity_scaling() {
        assert_eq!(
            physical_range(8, Signess::Unsigned, 1.0, 0.0).unwrap(),
            (0.0, 255.0)
        );
    }

    #[test]
    fn signed_byte_with_scaling() {
        assert_eq!(
            physical_range(8, Signess::Signed, 0.5, -40.0).unwrap(),
            (-104.0, 23.5)
        );
    }

    #[test]
    fn single_bit_and_full_width() {
        assert_eq!(
            physical_range(1, Signess::Unsigned, 1.0, 0.0).unwrap(),
            (0.0, 1.0)
        );
        let (lo, hi) = physical_range(64, Signess::Signed, 1.0, 0.0).unwrap();
        assert!(lo < 0.0 && hi > 0.0);
    }

    #[test]
    fn rounding_is_six_decimals() {
        let (_, hi) = physical_range(4, Signess::Unsigned, 1.0 / 3.0, 0.0).unwrap();
        assert_eq!(hi, 5.0);
        let (_, hi) = physical_range(2, Signess::Unsigned, 0.1234567, 0.0).unwrap();
        assert_eq!(hi, 0.37037);
    }

    #[test]
    fn zero_and_oversized_widths_are_rejected() {
        assert!(matches!(
            physical_range(0, Signess::Unsigned, 1.0, 0.0),
            Err(RangeError::InvalidSignalWidth { bit_length: 0 })
        ));
        assert!(matches!(
            physical_range(65, Signess::Signed, 1.0, 0.0),
            Err(RangeError::InvalidSignalWidth { bit_length: 65 })
        ));
    }
}
