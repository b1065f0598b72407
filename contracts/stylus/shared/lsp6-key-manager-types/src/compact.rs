//! `CompactBytesArray` codec: a flat sequence of `uint16 length || bytes` records.
//!
//! Allow-lists are stored under a single data key in this form. Elements must be
//! between 1 and 32 bytes long.

use alloc::vec::Vec;

/// Longest element an allow-list may hold.
pub const MAX_ELEMENT_LEN: usize = 32;

/// Errors while decoding or encoding a compact bytes array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompactArrayError {
    /// Zero, above 32, or running past the end of the input. Carries the raw length read.
    InvalidLengthElement(u16),
}

/// Decode into borrowed element slices.
pub fn decode_compact_bytes_array(bytes: &[u8]) -> Result<Vec<&[u8]>, CompactArrayError> {
    let mut out = Vec::new();
    let mut i = 0usize;

    while i < bytes.len() {
        // a lone trailing byte cannot hold a length prefix
        if i + 2 > bytes.len() {
            return Err(CompactArrayError::InvalidLengthElement(bytes[i] as u16));
        }
        let len = u16::from_be_bytes([bytes[i], bytes[i + 1]]);
        i += 2;

        let n = len as usize;
        if n == 0 || n > MAX_ELEMENT_LEN || i + n > bytes.len() {
            return Err(CompactArrayError::InvalidLengthElement(len));
        }
        out.push(&bytes[i..i + n]);
        i += n;
    }

    Ok(out)
}

/// True when `bytes` decodes cleanly.
pub fn is_valid_compact_bytes_array(bytes: &[u8]) -> bool {
    decode_compact_bytes_array(bytes).is_ok()
}

/// Encode elements as a compact bytes array.
pub fn encode_compact_bytes_array<T: AsRef<[u8]>>(elements: &[T]) -> Result<Vec<u8>, CompactArrayError> {
    let mut buf = Vec::with_capacity(elements.iter().map(|e| 2 + e.as_ref().len()).sum());
    for element in elements {
        let element = element.as_ref();
        if element.is_empty() || element.len() > MAX_ELEMENT_LEN {
            return Err(CompactArrayError::InvalidLengthElement(element.len().min(u16::MAX as usize) as u16));
        }
        buf.extend_from_slice(&(element.len() as u16).to_be_bytes());
        buf.extend_from_slice(element);
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn elements(n: usize) -> Vec<Vec<u8>> {
        (0..n).map(|i| vec![i as u8 + 1; (i % 32) + 1]).collect()
    }

    #[test]
    fn decodes_what_it_encodes() {
        for n in [0usize, 1, 2, 7] {
            let items = elements(n);
            let encoded = encode_compact_bytes_array(&items).unwrap();
            let decoded = decode_compact_bytes_array(&encoded).unwrap();
            assert_eq!(decoded.len(), n);
            for (a, b) in decoded.iter().zip(items.iter()) {
                assert_eq!(*a, b.as_slice());
            }
            assert_eq!(encode_compact_bytes_array(&decoded).unwrap(), encoded);
        }
    }

    #[test]
    fn reencodes_stored_bytes_unchanged() {
        let stored = [0x00, 0x02, 0xbe, 0xef, 0x00, 0x01, 0x07, 0x00, 0x03, 1, 2, 3];
        let decoded = decode_compact_bytes_array(&stored).unwrap();
        let expected: [&[u8]; 3] = [&[0xbe, 0xef], &[0x07], &[1, 2, 3]];
        assert_eq!(decoded, expected);
        assert_eq!(encode_compact_bytes_array(&decoded).unwrap(), stored);
    }

    #[test]
    fn rejects_zero_length_element_between_others() {
        let bytes = [0x00, 0x01, 0xaa, 0x00, 0x00, 0x00, 0x01, 0xbb];
        assert_eq!(
            decode_compact_bytes_array(&bytes),
            Err(CompactArrayError::InvalidLengthElement(0))
        );
        assert!(!is_valid_compact_bytes_array(&bytes));
        let elements: [&[u8]; 3] = [&[0xaa], &[], &[0xbb]];
        assert_eq!(
            encode_compact_bytes_array(&elements),
            Err(CompactArrayError::InvalidLengthElement(0))
        );
    }

    #[test]
    fn rejects_zero_length_element() {
        assert_eq!(
            decode_compact_bytes_array(&[0x00, 0x00, 0xaa]),
            Err(CompactArrayError::InvalidLengthElement(0))
        );
        assert_eq!(
            encode_compact_bytes_array(&[Vec::<u8>::new()]),
            Err(CompactArrayError::InvalidLengthElement(0))
        );
    }

    #[test]
    fn rejects_oversized_element() {
        let mut bytes = vec![0x00, 0x21];
        bytes.extend_from_slice(&[0xcc; 33]);
        assert_eq!(
            decode_compact_bytes_array(&bytes),
            Err(CompactArrayError::InvalidLengthElement(33))
        );
        assert_eq!(
            encode_compact_bytes_array(&[[0u8; 33]]),
            Err(CompactArrayError::InvalidLengthElement(33))
        );
    }

    #[test]
    fn rejects_truncated_input() {
        // declares 4 bytes, carries 3
        assert_eq!(
            decode_compact_bytes_array(&[0x00, 0x04, 1, 2, 3]),
            Err(CompactArrayError::InvalidLengthElement(4))
        );
        // dangling half of a length prefix
        assert_eq!(
            decode_compact_bytes_array(&[0x00, 0x01, 0xff, 0x07]),
            Err(CompactArrayError::InvalidLengthElement(7))
        );
        assert!(!is_valid_compact_bytes_array(&[0x00]));
        assert!(is_valid_compact_bytes_array(&[]));
    }
}
