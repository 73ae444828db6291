//! Numeric codec
//!
//! Fixed-width big-endian integer packing and hex rendering used to
//! canonicalize tick values before they reach the consensus application.

use thiserror::Error;

/// Supported fixed encoding widths
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    /// 4 bytes (prices)
    U32,
    /// 8 bytes (timestamps)
    U64,
}

impl Width {
    /// Number of bytes produced for this width
    pub fn bytes(self) -> usize {
        match self {
            Width::U32 => 4,
            Width::U64 => 8,
        }
    }

    /// Largest value representable in this width
    pub fn max_value(self) -> u64 {
        match self {
            Width::U32 => u32::MAX as u64,
            Width::U64 => u64::MAX,
        }
    }
}

/// Codec errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Value does not fit in the requested width
    #[error("value {value} does not fit in {width} bytes")]
    Overflow { value: u64, width: usize },
    /// Input longer than the widest supported integer
    #[error("cannot decode {0} bytes into a 64-bit integer")]
    TooWide(usize),
}

/// Encode `value` as a big-endian byte sequence of exactly `width` bytes.
///
/// Overflowing values are rejected rather than wrapped.
pub fn encode_be(value: u64, width: Width) -> Result<Vec<u8>, CodecError> {
    if value > width.max_value() {
        return Err(CodecError::Overflow {
            value,
            width: width.bytes(),
        });
    }

    let mut bytes = vec![0u8; width.bytes()];
    let mut remaining = value;
    for slot in bytes.iter_mut().rev() {
        *slot = (remaining & 0xff) as u8;
        remaining >>= 8;
    }

    Ok(bytes)
}

/// Decode a big-endian byte sequence (at most 8 bytes) into an integer
pub fn decode_be(bytes: &[u8]) -> Result<u64, CodecError> {
    if bytes.len() > Width::U64.bytes() {
        return Err(CodecError::TooWide(bytes.len()));
    }

    Ok(bytes
        .iter()
        .fold(0u64, |value, byte| (value << 8) | u64::from(*byte)))
}

/// Render bytes as lowercase hex, two characters per byte, no prefix
pub fn to_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_u32_layout() {
        assert_eq!(
            encode_be(27000, Width::U32).unwrap(),
            vec![0x00, 0x00, 0x69, 0x78]
        );
    }

    #[test]
    fn test_encode_u64_layout() {
        assert_eq!(
            encode_be(1_700_000_000, Width::U64).unwrap(),
            vec![0, 0, 0, 0, 0x65, 0x53, 0xf1, 0x00]
        );
    }

    #[test]
    fn test_encode_zero_fills_width() {
        assert_eq!(encode_be(0, Width::U32).unwrap(), vec![0; 4]);
        assert_eq!(encode_be(0, Width::U64).unwrap(), vec![0; 8]);
    }

    #[test]
    fn test_encode_rejects_overflow() {
        let err = encode_be(u32::MAX as u64 + 1, Width::U32).unwrap_err();
        assert_eq!(
            err,
            CodecError::Overflow {
                value: 4_294_967_296,
                width: 4
            }
        );
    }

    #[test]
    fn test_width_boundaries_round_trip() {
        for (value, width) in [
            (0, Width::U32),
            (1, Width::U32),
            (u32::MAX as u64, Width::U32),
            (0, Width::U64),
            (u32::MAX as u64 + 1, Width::U64),
            (u64::MAX, Width::U64),
        ] {
            let bytes = encode_be(value, width).unwrap();
            assert_eq!(bytes.len(), width.bytes());
            assert_eq!(decode_be(&bytes).unwrap(), value);
        }
    }

    #[test]
    fn test_decode_empty_is_zero() {
        assert_eq!(decode_be(&[]).unwrap(), 0);
    }

    #[test]
    fn test_decode_rejects_too_wide() {
        assert_eq!(decode_be(&[0; 9]), Err(CodecError::TooWide(9)));
    }

    #[test]
    fn test_to_hex() {
        assert_eq!(to_hex(&[0x00, 0xFF, 0x1A]), "00ff1a");
        assert_eq!(to_hex(&[]), "");
    }

    #[test]
    fn test_codec_error_display() {
        let err = CodecError::Overflow { value: 300, width: 1 };
        assert_eq!(err.to_string(), "value 300 does not fit in 1 bytes");
    }
}
