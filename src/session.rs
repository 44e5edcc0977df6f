//! Run-scoped session state.
//!
//! One `Session` lives for the whole run: the page size discovered from
//! block 0, the segment configuration, the annotation id counter, and the
//! cumulative failure flag. Decoders receive it explicitly; there is no
//! other shared state between pages.

use log::error;

use crate::config::Options;

pub struct Session {
    page_size: u32,
    segment_number: u32,
    opts: Options,
    next_tag_id: u64,
    failed: bool,
}

impl Session {
    pub fn new(page_size: u32, segment_number: u32, opts: Options) -> Self {
        Self {
            page_size,
            segment_number,
            opts,
            next_tag_id: 0,
            failed: false,
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn options(&self) -> &Options {
        &self.opts
    }

    /// Base file offset of a block in the display address space.
    pub fn base_offset(&self, blkno: u32) -> u64 {
        self.page_size as u64 * blkno as u64
    }

    /// Block number in the checksum address space: the block's position in
    /// the whole relation, not in this segment file. Display offsets never
    /// use this; the two address spaces must not be conflated.
    pub fn checksum_block(&self, blkno: u32) -> u32 {
        let per_segment = (self.opts.segment_size / self.page_size as u64) as u32;
        per_segment.wrapping_mul(self.segment_number).wrapping_add(blkno)
    }

    /// Report a non-fatal condition: user-visible on stderr, and the run's
    /// exit status becomes non-zero. Decoding continues.
    pub fn report(&mut self, msg: impl AsRef<str>) {
        error!("{}", msg.as_ref());
        self.failed = true;
    }

    pub fn failed(&self) -> bool {
        self.failed
    }

    pub(crate) fn next_tag_id(&mut self) -> u64 {
        let id = self.next_tag_id;
        self.next_tag_id += 1;
        id
    }
}
