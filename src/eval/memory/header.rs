//! Header for all heap objects
//!
//! Currently carries only the mark bit used by the collector.

use bitmaps::Bitmap;

const MARK_BIT: usize = 0;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HeaderBits(Bitmap<1>);

impl HeaderBits {
    fn mark(&mut self) {
        self.0.set(MARK_BIT, true);
    }

    fn unmark(&mut self) {
        self.0.set(MARK_BIT, false);
    }

    fn is_marked(&self) -> bool {
        self.0.get(MARK_BIT)
    }
}

/// Object header
///
/// The mark bit is only meaningful while a collection is in
/// progress. Between collections every live object is unmarked.
#[derive(Default, Debug, Clone, Copy)]
pub struct ObjectHeader {
    bits: HeaderBits,
}

impl ObjectHeader {
    pub fn mark(&mut self) {
        self.bits.mark()
    }

    pub fn unmark(&mut self) {
        self.bits.unmark()
    }

    pub fn is_marked(&self) -> bool {
        self.bits.is_marked()
    }
}

#[cfg(test)]
pub mod tests {
    use std::mem::size_of;

    use super::*;

    #[test]
    pub fn test_expected_bitmap_size() {
        assert_eq!(size_of::<HeaderBits>(), 1);
    }

    #[test]
    pub fn test_new_header_is_unmarked() {
        let mut header = ObjectHeader::default();
        assert!(!header.is_marked());
        header.mark();
        assert!(header.is_marked());
        header.unmark();
        assert!(!header.is_marked());
    }
}
