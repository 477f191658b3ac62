//! Prefix-coded numeric terms.
//!
//! Numeric fields are indexed as a family of "trie" terms: the full-precision
//! value (shift 0) plus progressively coarser copies with the low `shift`
//! bits dropped, which range queries use to cover large intervals with few
//! terms. Each term is laid out as:
//!
//! ```text
//! [SHIFT_START + shift] [7-bit group] [7-bit group] ...
//! ```
//!
//! The value is sign-flipped so that unsigned byte order matches numeric
//! order, shifted right by `shift`, and written big-endian in 7-bit groups.
//! Every payload byte is therefore below `0x80`, so encoded terms are plain
//! ASCII.
//!
//! Floating-point values are indexed through their *sortable bits*: the
//! IEEE bit pattern with the magnitude bits flipped for negative numbers, so
//! that integer order equals float order.

use thiserror::Error;

/// Header byte for a long term at shift 0. Long shifts occupy `0x20..=0x5f`.
pub const SHIFT_START_LONG: u8 = 0x20;

/// Header byte for an int term at shift 0. Int shifts occupy `0x60..=0x7f`.
pub const SHIFT_START_INT: u8 = 0x60;

/// Default precision step used when generating trie terms.
pub const PRECISION_STEP_DEFAULT: u32 = 16;

/// Maximum encoded length of a long term.
pub const BUF_SIZE_LONG: usize = 63 / 7 + 2;

/// Maximum encoded length of an int term.
pub const BUF_SIZE_INT: usize = 31 / 7 + 2;

/// Why a term could not be decoded under a numeric scheme.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericDecodeError {
    #[error("empty term")]
    Empty,

    #[error("invalid shift value {0}")]
    InvalidShift(i32),

    #[error("invalid byte {byte:#04x} at position {position}")]
    InvalidByte { byte: u8, position: usize },

    #[error("shift {shift} out of range for {width}-bit values")]
    ShiftOutOfRange { shift: u32, width: u32 },
}

/// The two prefix-coding widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericKind {
    /// 64-bit values; reinterpreted as `f64`.
    Long,
    /// 32-bit values; reinterpreted as `f32`.
    Int,
}

impl NumericKind {
    /// Decode `term` under this scheme.
    pub fn decode(self, term: &[u8]) -> Result<DecodedTerm, NumericDecodeError> {
        match self {
            NumericKind::Long => {
                let shift = prefix_coded_long_shift(term)?;
                let value = prefix_coded_to_long(term)?;
                Ok(DecodedTerm {
                    value: NumericValue::Long(value),
                    shift,
                })
            }
            NumericKind::Int => {
                let shift = prefix_coded_int_shift(term)?;
                let value = prefix_coded_to_int(term)?;
                Ok(DecodedTerm {
                    value: NumericValue::Int(value),
                    shift,
                })
            }
        }
    }
}

/// A numeric value recovered from a term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericValue {
    Long(i64),
    Int(i32),
}

impl NumericValue {
    /// Native rendering, tagged with the integer type: `<long>42`.
    pub fn native_string(&self) -> String {
        match self {
            NumericValue::Long(v) => format!("<long>{v}"),
            NumericValue::Int(v) => format!("<int>{v}"),
        }
    }

    /// The same bits read as sortable float bits: `<double>...`.
    ///
    /// The original field type cannot be told apart from the encoded term,
    /// so callers usually keep both renderings.
    pub fn reinterpreted_string(&self) -> String {
        match self {
            NumericValue::Long(v) => format!("<double>{:?}", sortable_long_to_double(*v)),
            NumericValue::Int(v) => format!("<float>{:?}", sortable_int_to_float(*v)),
        }
    }
}

/// A decoded term and the precision it was indexed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedTerm {
    pub value: NumericValue,
    /// Number of low bits dropped; 0 means full precision.
    pub shift: u32,
}

impl DecodedTerm {
    pub fn is_full_precision(&self) -> bool {
        self.shift == 0
    }
}

/// Encode `val` as a prefix-coded long term with the low `shift` bits dropped.
pub fn long_to_prefix_coded(val: i64, shift: u32) -> Result<String, NumericDecodeError> {
    if shift > 63 {
        return Err(NumericDecodeError::ShiftOutOfRange { shift, width: 64 });
    }
    Ok(encode_long(val, shift))
}

/// Encode `val` as a prefix-coded int term with the low `shift` bits dropped.
pub fn int_to_prefix_coded(val: i32, shift: u32) -> Result<String, NumericDecodeError> {
    if shift > 31 {
        return Err(NumericDecodeError::ShiftOutOfRange { shift, width: 32 });
    }
    Ok(encode_int(val, shift))
}

// shift must be <= 63
fn encode_long(val: i64, shift: u32) -> String {
    let n_chars = ((63 - shift) / 7 + 1) as usize;
    let mut bytes = vec![0u8; n_chars + 1];
    bytes[0] = SHIFT_START_LONG + shift as u8;
    let mut sortable_bits = ((val as u64) ^ 0x8000_0000_0000_0000) >> shift;
    for slot in bytes[1..].iter_mut().rev() {
        *slot = (sortable_bits & 0x7f) as u8;
        sortable_bits >>= 7;
    }
    ascii_string(bytes)
}

// shift must be <= 31
fn encode_int(val: i32, shift: u32) -> String {
    let n_chars = ((31 - shift) / 7 + 1) as usize;
    let mut bytes = vec![0u8; n_chars + 1];
    bytes[0] = SHIFT_START_INT + shift as u8;
    let mut sortable_bits = ((val as u32) ^ 0x8000_0000) >> shift;
    for slot in bytes[1..].iter_mut().rev() {
        *slot = (sortable_bits & 0x7f) as u8;
        sortable_bits >>= 7;
    }
    ascii_string(bytes)
}

fn ascii_string(bytes: Vec<u8>) -> String {
    // every byte is < 0x80
    bytes.into_iter().map(char::from).collect()
}

/// Shift encoded in a long term's header byte.
pub fn prefix_coded_long_shift(term: &[u8]) -> Result<u32, NumericDecodeError> {
    let first = *term.first().ok_or(NumericDecodeError::Empty)?;
    let shift = first as i32 - SHIFT_START_LONG as i32;
    if !(0..=63).contains(&shift) {
        return Err(NumericDecodeError::InvalidShift(shift));
    }
    Ok(shift as u32)
}

/// Shift encoded in an int term's header byte.
pub fn prefix_coded_int_shift(term: &[u8]) -> Result<u32, NumericDecodeError> {
    let first = *term.first().ok_or(NumericDecodeError::Empty)?;
    let shift = first as i32 - SHIFT_START_INT as i32;
    if !(0..=31).contains(&shift) {
        return Err(NumericDecodeError::InvalidShift(shift));
    }
    Ok(shift as u32)
}

/// Decode a prefix-coded long term. Bits dropped by the shift come back as zero.
pub fn prefix_coded_to_long(term: &[u8]) -> Result<i64, NumericDecodeError> {
    let shift = prefix_coded_long_shift(term)?;
    let mut sortable_bits = 0u64;
    for (position, &byte) in term.iter().enumerate().skip(1) {
        if byte & 0x80 != 0 {
            return Err(NumericDecodeError::InvalidByte { byte, position });
        }
        sortable_bits = (sortable_bits << 7) | byte as u64;
    }
    Ok(((sortable_bits << shift) ^ 0x8000_0000_0000_0000) as i64)
}

/// Decode a prefix-coded int term.
pub fn prefix_coded_to_int(term: &[u8]) -> Result<i32, NumericDecodeError> {
    let shift = prefix_coded_int_shift(term)?;
    let mut sortable_bits = 0u32;
    for (position, &byte) in term.iter().enumerate().skip(1) {
        if byte & 0x80 != 0 {
            return Err(NumericDecodeError::InvalidByte { byte, position });
        }
        sortable_bits = (sortable_bits << 7) | byte as u32;
    }
    Ok(((sortable_bits << shift) ^ 0x8000_0000) as i32)
}

/// All trie terms for a long value, full precision first.
pub fn long_trie_terms(val: i64, precision_step: u32) -> Vec<String> {
    (0..64)
        .step_by(precision_step.max(1) as usize)
        .map(|shift| encode_long(val, shift))
        .collect()
}

/// All trie terms for an int value, full precision first.
pub fn int_trie_terms(val: i32, precision_step: u32) -> Vec<String> {
    (0..32)
        .step_by(precision_step.max(1) as usize)
        .map(|shift| encode_int(val, shift))
        .collect()
}

pub fn double_to_sortable_long(val: f64) -> i64 {
    let bits = val.to_bits() as i64;
    bits ^ ((bits >> 63) & 0x7fff_ffff_ffff_ffff)
}

pub fn sortable_long_to_double(val: i64) -> f64 {
    let bits = val ^ ((val >> 63) & 0x7fff_ffff_ffff_ffff);
    f64::from_bits(bits as u64)
}

pub fn float_to_sortable_int(val: f32) -> i32 {
    let bits = val.to_bits() as i32;
    bits ^ ((bits >> 31) & 0x7fff_ffff)
}

pub fn sortable_int_to_float(val: i32) -> f32 {
    let bits = val ^ ((val >> 31) & 0x7fff_ffff);
    f32::from_bits(bits as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_long_encoding() {
        let term = long_to_prefix_coded(0, 0).unwrap();
        let bytes = term.as_bytes();
        assert_eq!(bytes.len(), 11);
        assert_eq!(bytes[0], SHIFT_START_LONG);
        // sign bit lands in the lowest bit of the first payload group
        assert_eq!(bytes[1], 0x01);
        assert!(bytes[2..].iter().all(|&b| b == 0));

        let term = long_to_prefix_coded(42, 0).unwrap();
        assert_eq!(*term.as_bytes().last().unwrap(), 42);
    }

    #[test]
    fn test_long_terms_decode_at_every_shift() {
        for &value in &[0i64, 1, -1, 42, -42, i64::MAX, i64::MIN, 1 << 40] {
            for shift in [0u32, 4, 16, 32, 48, 63] {
                let term = long_to_prefix_coded(value, shift).unwrap();
                assert!(term.len() <= BUF_SIZE_LONG);
                assert_eq!(prefix_coded_long_shift(term.as_bytes()).unwrap(), shift);
                let decoded = prefix_coded_to_long(term.as_bytes()).unwrap();
                assert_eq!(decoded as u64, (value as u64) & (!0u64 << shift));
                assert_eq!(decoded >> shift, value >> shift);
            }
        }
    }

    #[test]
    fn test_int_terms_decode() {
        for &value in &[0i32, 7, -7, i32::MAX, i32::MIN] {
            let term = int_to_prefix_coded(value, 0).unwrap();
            assert!(term.len() <= BUF_SIZE_INT);
            assert_eq!(term.as_bytes()[0], SHIFT_START_INT);
            assert_eq!(prefix_coded_to_int(term.as_bytes()).unwrap(), value);
        }
    }

    #[test]
    fn test_encoding_preserves_order() {
        let values = [-1000i64, -1, 0, 1, 999, 1 << 50];
        let terms: Vec<String> = values
            .iter()
            .map(|v| long_to_prefix_coded(*v, 0).unwrap())
            .collect();
        let mut sorted = terms.clone();
        sorted.sort();
        assert_eq!(terms, sorted);
    }

    #[test]
    fn test_decode_failures() {
        assert_eq!(prefix_coded_long_shift(b""), Err(NumericDecodeError::Empty));
        assert!(matches!(
            prefix_coded_long_shift(b"hello"),
            Err(NumericDecodeError::InvalidShift(_))
        ));
        // int header is not a long header
        let int_term = int_to_prefix_coded(5, 0).unwrap();
        assert!(NumericKind::Long.decode(int_term.as_bytes()).is_err());
        assert!(NumericKind::Int.decode(int_term.as_bytes()).is_ok());

        let bad = [SHIFT_START_LONG, 0x01, 0x80];
        assert_eq!(
            prefix_coded_to_long(&bad),
            Err(NumericDecodeError::InvalidByte {
                byte: 0x80,
                position: 2
            })
        );
        assert!(long_to_prefix_coded(1, 64).is_err());
        assert!(int_to_prefix_coded(1, 32).is_err());
    }

    #[test]
    fn test_trie_terms() {
        let terms = long_trie_terms(1234, PRECISION_STEP_DEFAULT);
        assert_eq!(terms.len(), 4);
        let shifts: Vec<u32> = terms
            .iter()
            .map(|t| prefix_coded_long_shift(t.as_bytes()).unwrap())
            .collect();
        assert_eq!(shifts, vec![0, 16, 32, 48]);

        let terms = int_trie_terms(1234, 8);
        assert_eq!(terms.len(), 4);
    }

    #[test]
    fn test_sortable_bits() {
        for &v in &[0.0f64, -0.0, 1.5, -1.5, f64::MAX, f64::MIN_POSITIVE, -1e300] {
            assert_eq!(sortable_long_to_double(double_to_sortable_long(v)).to_bits(), v.to_bits());
        }
        for &v in &[0.0f32, 2.25, -2.25, f32::MAX] {
            assert_eq!(sortable_int_to_float(float_to_sortable_int(v)).to_bits(), v.to_bits());
        }
        assert!(double_to_sortable_long(-1.0) < double_to_sortable_long(1.0));
    }

    #[test]
    fn test_value_renderings() {
        let value = NumericValue::Long(42);
        assert_eq!(value.native_string(), "<long>42");
        assert_eq!(
            value.reinterpreted_string(),
            format!("<double>{:?}", f64::from_bits(42))
        );

        let sortable = double_to_sortable_long(2.5);
        assert_eq!(
            NumericValue::Long(sortable).reinterpreted_string(),
            "<double>2.5"
        );
        let sortable = float_to_sortable_int(-0.5);
        assert_eq!(NumericValue::Int(sortable).reinterpreted_string(), "<float>-0.5");
        assert_eq!(NumericValue::Int(-3).native_string(), "<int>-3");
    }
}
