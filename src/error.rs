//! Fatal decode errors.
//!
//! Only structural corruption that would force out-of-bounds reads or
//! meaningless output lands here; everything else is reported through
//! [`crate::session::Session::report`] and decoding continues. The caller
//! (the run loop) decides process policy for these errors.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// A page with an item directory but not a single slot.
    #[error("block {blkno}: empty block - no items listed")]
    EmptyBlock { blkno: u32 },

    /// The item directory claims more slots than the page could hold.
    #[error("block {blkno}: item index corrupt ({max_items} slots on a {page_size}-byte page)")]
    CorruptItemIndex {
        blkno: u32,
        max_items: usize,
        page_size: u32,
    },

    /// A heap item's declared extent crosses the page or read boundary.
    #[error(
        "block {blkno}: item {slot} contents extend beyond block \
         (offset {offset}, length {length}, {available} bytes available)"
    )]
    ItemBeyondBlock {
        blkno: u32,
        slot: usize,
        offset: usize,
        length: usize,
        available: usize,
    },

    /// An annotation was produced out of ascending start-offset order.
    /// The downstream viewer's ordering contract would be violated.
    #[error("block {blkno}: annotation at offset {start} emitted after offset {last}")]
    AnnotationOrder { blkno: u32, start: u64, last: u64 },

    /// An annotation with end < start.
    #[error("block {blkno}: inverted annotation range [{start}, {end}]")]
    InvertedRange { blkno: u32, start: u64, end: u64 },
}
