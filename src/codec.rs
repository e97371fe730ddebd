//! # codec
//!
//! Bit-level signal codec over a classic CAN payload (up to 8 bytes).
//!
//! The payload is folded into a single 64-bit integer under either byte
//! order; a signal's raw value is then a shift-and-mask window into that
//! integer. [`insert_raw`] is the exact inverse placement, used by the
//! authoring path when composing payloads. Scaling between raw and physical
//! values is the usual linear `physical = raw * factor + offset`.

use crate::dbc::types::errors::CodecError;
use crate::dbc::types::signal::{Endianness, Signess};

/// Bit layout and scaling of one signal, decoupled from the database model.
///
/// Interactive hosts build this directly for manual (non-DBC) signal
/// configuration; [`SignalDBC::layout`](crate::dbc::types::signal::SignalDBC::layout)
/// produces it for database signals.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct SignalLayout {
    /// Bit start in the payload (bit 0 = LSB of the first byte).
    pub bit_start: u16,
    /// Bit length (1..=64).
    pub bit_length: u16,
    /// Endianness.
    pub endian: Endianness,
    /// Sign.
    pub sign: Signess,
    /// Scaling factor.
    pub factor: f64,
    /// Scaling offset.
    pub offset: f64,
}

impl Default for SignalLayout {
    fn default() -> Self {
        SignalLayout {
            bit_start: 0,
            bit_length: 8,
            endian: Endianness::default(),
            sign: Signess::default(),
            factor: 1.0,
            offset: 0.0,
        }
    }
}

impl SignalLayout {
    /// Decodes the physical value of this signal from a frame payload.
    pub fn decode(&self, payload: &[u8]) -> Result<f64, CodecError> {
        let raw: i64 = extract_raw_i64(payload, self.bit_start, self.bit_length, self.endian, self.sign)?;
        Ok(to_physical(raw, self.factor, self.offset))
    }

    /// Encodes a physical value into `payload` at this signal's bit window.
    pub fn encode(&self, value: f64, payload: &mut [u8]) -> Result<(), CodecError> {
        let raw: i64 = from_physical(value, self.factor, self.offset);
        insert_raw(payload, self.bit_start, self.bit_length, self.endian, raw as u64)
    }
}

/// Extracts the **unsigned** raw value of a bit window from the payload.
///
/// Fails with [`CodecError::OutOfRange`] when the window does not fit the
/// payload; the value is never truncated or wrapped.
pub fn extract_raw_u64(
    payload: &[u8],
    bit_start: u16,
    bit_length: u16,
    endian: Endianness,
) -> Result<u64, CodecError> {
    let shift: u32 = window_shift(payload, bit_start, bit_length, endian)?;
    let folded: u64 = match endian {
        Endianness::Intel => fold_le(payload),
        Endianness::Motorola => fold_be(payload),
    };
    Ok((folded >> shift) & width_mask(bit_length))
}

/// Extracts the **signed** raw value from the payload, performing
/// two's-complement sign extension when the signal is signed.
///
/// At `bit_length == 64` the extracted pattern is reinterpreted as `i64`
/// (two's complement at full width).
pub fn extract_raw_i64(
    payload: &[u8],
    bit_start: u16,
    bit_length: u16,
    endian: Endianness,
    sign: Signess,
) -> Result<i64, CodecError> {
    let raw_u: u64 = extract_raw_u64(payload, bit_start, bit_length, endian)?;
    if matches!(sign, Signess::Signed) {
        let sign_bit: u64 = 1u64 << (bit_length - 1);
        if (raw_u & sign_bit) != 0 {
            return Ok((raw_u | !width_mask(bit_length)) as i64);
        }
    }
    Ok(raw_u as i64)
}

/// Writes `raw` (masked to `bit_length`) into the payload at the signal's
/// bit window, leaving every other bit untouched. Exact inverse of
/// [`extract_raw_u64`]: negative signed values are passed as their
/// two's-complement `u64` pattern.
pub fn insert_raw(
    payload: &mut [u8],
    bit_start: u16,
    bit_length: u16,
    endian: Endianness,
    raw: u64,
) -> Result<(), CodecError> {
    let shift: u32 = window_shift(payload, bit_start, bit_length, endian)?;
    let window: u64 = width_mask(bit_length) << shift;
    let folded: u64 = match endian {
        Endianness::Intel => fold_le(payload),
        Endianness::Motorola => fold_be(payload),
    };
    let folded: u64 = (folded & !window) | ((raw & width_mask(bit_length)) << shift);
    match endian {
        Endianness::Intel => unfold_le(folded, payload),
        Endianness::Motorola => unfold_be(folded, payload),
    }
    Ok(())
}

/// Converts a raw integer into its physical value.
///
/// With `factor == 1.0` and `offset == 0.0` this is an identity cast.
#[inline]
pub fn to_physical(raw: i64, factor: f64, offset: f64) -> f64 {
    raw as f64 * factor + offset
}

/// Back-computes the raw integer nearest to a physical value.
///
/// A zero factor is treated as `1.0`.
#[inline]
pub fn from_physical(value: f64, factor: f64, offset: f64) -> i64 {
    let factor: f64 = if factor == 0.0 { 1.0 } else { factor };
    ((value - offset) / factor).round() as i64
}

/// Validates the bit window against the payload width and returns the shift
/// of the window's LSB inside the folded integer.
fn window_shift(
    payload: &[u8],
    bit_start: u16,
    bit_length: u16,
    endian: Endianness,
) -> Result<u32, CodecError> {
    let payload_bits: usize = payload.len() * 8;
    let end: usize = bit_start as usize + bit_length as usize;
    // Classic CAN only: the fold target is a single u64.
    if payload_bits > 64 || bit_length == 0 || bit_length > 64 || end > payload_bits {
        return Err(CodecError::OutOfRange {
            bit_start,
            bit_length,
            payload_bits,
        });
    }
    Ok(match endian {
        // Intel: bit 0 of the signal is the LSB of byte 0.
        Endianness::Intel => bit_start as u32,
        // Motorola: the window sits at [total - start - length, total - start)
        // of the big-endian integer.
        Endianness::Motorola => (payload_bits - end) as u32,
    })
}

#[inline]
fn width_mask(bit_length: u16) -> u64 {
    if bit_length >= 64 {
        u64::MAX
    } else {
        (1u64 << bit_length) - 1
    }
}

#[inline]
fn fold_le(payload: &[u8]) -> u64 {
    payload
        .iter()
        .enumerate()
        .fold(0u64, |acc, (i, &b)| acc | (b as u64) << (8 * i))
}

#[inline]
fn fold_be(payload: &[u8]) -> u64 {
    payload.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64)
}

#[inline]
fn unfold_le(folded: u64, payload: &mut [u8]) {
    for (i, b) in payload.iter_mut().enumerate() {
        *b = (folded >> (8 * i)) as u8;
    }
}

#[inline]
fn unfold_be(folded: u64, payload: &mut [u8]) {
    let n: usize = payload.len();
    for (i, b) in payload.iter_mut().enumerate() {
        *b = (folded >> (8 * (n - 1 - i))) as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intel_and_motorola_16_bit_windows() {
        let payload: [u8; 2] = [0x12, 0x34];
        assert_eq!(
            extract_raw_u64(&payload, 0, 16, Endianness::Intel).unwrap(),
            0x3412
        );
        assert_eq!(
            extract_raw_u64(&payload, 0, 16, Endianness::Motorola).unwrap(),
            0x1234
        );
    }

    #[test]
    fn sign_extension_at_8_bits() {
        for (byte, expected) in [(0xFFu8, -1i64), (0x80, -128), (0x7F, 127)] {
            let raw =
                extract_raw_i64(&[byte], 0, 8, Endianness::Intel, Signess::Signed).unwrap();
            assert_eq!(raw, expected);
        }
    }

    #[test]
    fn unsigned_never_sign_extends() {
        let raw =
            extract_raw_i64(&[0xFF], 0, 8, Endianness::Intel, Signess::Unsigned).unwrap();
        assert_eq!(raw, 255);
    }

    #[test]
    fn window_beyond_payload_is_rejected() {
        let err = extract_raw_u64(&[0x00, 0x00], 9, 8, Endianness::Intel).unwrap_err();
        assert_eq!(
            err,
            CodecError::OutOfRange {
                bit_start: 9,
                bit_length: 8,
                payload_bits: 16
            }
        );
        assert!(extract_raw_u64(&[0x00], 0, 0, Endianness::Intel).is_err());
    }

    #[test]
    fn mid_byte_intel_window() {
        // Bits 4..=15 of the little-endian integer 0xBEEF = 0b1011_1110_1110_1111.
        let payload: [u8; 2] = [0xEF, 0xBE];
        assert_eq!(
            extract_raw_u64(&payload, 4, 12, Endianness::Intel).unwrap(),
            0xBEE
        );
    }

    #[test]
    fn full_width_unsigned_and_signed() {
        let payload: [u8; 8] = [0xFF; 8];
        assert_eq!(
            extract_raw_u64(&payload, 0, 64, Endianness::Intel).unwrap(),
            u64::MAX
        );
        // 64-bit signed reinterprets the pattern as i64.
        assert_eq!(
            extract_raw_i64(&payload, 0, 64, Endianness::Motorola, Signess::Signed).unwrap(),
            -1
        );
    }

    #[test]
    fn insert_then_extract_round_trips() {
        for endian in [Endianness::Intel, Endianness::Motorola] {
            for &(start, len, raw) in &[
                (0u16, 8u16, 0xA5u64),
                (3, 5, 0x1B),
                (12, 11, 0x5F3),
                (0, 32, 0xDEAD_BEEF),
                (40, 24, 0x00_C0FF_EE),
            ] {
                let mut payload: [u8; 8] = [0u8; 8];
                insert_raw(&mut payload, start, len, endian, raw).unwrap();
                assert_eq!(
                    extract_raw_u64(&payload, start, len, endian).unwrap(),
                    raw,
                    "start={start} len={len} endian={endian:?}"
                );
            }
        }
    }

    #[test]
    fn insert_leaves_neighbouring_bits_untouched() {
        let mut payload: [u8; 4] = [0xFF; 4];
        insert_raw(&mut payload, 8, 8, Endianness::Intel, 0x00).unwrap();
        assert_eq!(payload, [0xFF, 0x00, 0xFF, 0xFF]);
    }

    #[test]
    fn signed_layout_round_trips_through_physical() {
        let layout = SignalLayout {
            bit_start: 16,
            bit_length: 10,
            endian: Endianness::Intel,
            sign: Signess::Signed,
            factor: 0.25,
            offset: -12.0,
        };
        let mut payload: [u8; 8] = [0u8; 8];
        layout.encode(-30.5, &mut payload).unwrap();
        let decoded = layout.decode(&payload).unwrap();
        assert!((decoded - -30.5).abs() < 1e-9);
    }

    #[test]
    fn physical_scaling() {
        assert_eq!(to_physical(100, 0.5, -40.0), 10.0);
        assert_eq!(from_physical(10.0, 0.5, -40.0), 100);
        // Identity scaling is a plain cast.
        assert_eq!(to_physical(-7, 1.0, 0.0), -7.0);
        // Zero factor falls back to 1.0 instead of dividing by zero.
        assert_eq!(from_physical(5.0, 0.0, 0.0), 5);
    }
}
