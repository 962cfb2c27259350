//! Owned, padded input buffer.

use alloc::vec::Vec;

use crate::simd::PADDING;

/// An owned copy of a JSON document followed by one SIMD block of zeros.
///
/// The scanner's whitespace fast path loads whole blocks and may read up to
/// one SIMD block (64 bytes) past the logical end of the document. Borrowed
/// inputs passed to [`get_by_path`](crate::get_by_path) never get that
/// treatment; constructing a `PaddedJson` is how a caller opts in, and the
/// type owns the padding guarantee.
#[derive(Debug, Clone)]
pub struct PaddedJson {
    buf: Vec<u8>,
    len: usize,
}

impl PaddedJson {
    /// Copy `json` into a freshly padded buffer.
    pub fn new(json: impl AsRef<[u8]>) -> Self {
        let json = json.as_ref();
        let mut buf = Vec::with_capacity(json.len() + PADDING);
        buf.extend_from_slice(json);
        buf.resize(json.len() + PADDING, 0);
        Self {
            buf,
            len: json.len(),
        }
    }

    /// The document, without the padding.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Length of the document in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the document is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl From<&str> for PaddedJson {
    fn from(json: &str) -> Self {
        Self::new(json.as_bytes())
    }
}

impl From<&[u8]> for PaddedJson {
    fn from(json: &[u8]) -> Self {
        Self::new(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_with_a_full_block_of_zeros() {
        let padded = PaddedJson::from("{\"a\":1}");
        assert_eq!(padded.as_bytes(), b"{\"a\":1}");
        assert_eq!(padded.len(), 7);
        assert_eq!(padded.buf.len(), 7 + PADDING);
        assert!(padded.buf[7..].iter().all(|&b| b == 0));
    }

    #[test]
    fn empty_document() {
        let padded = PaddedJson::new(b"");
        assert!(padded.is_empty());
        assert_eq!(padded.buf.len(), PADDING);
    }
}
