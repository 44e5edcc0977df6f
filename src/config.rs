//! Run options, collected once by the CLI layer and carried through the
//! session instead of scattering flag lookups across the decoders.

use crate::consts::DEFAULT_SEGMENT_SIZE;

/// Inclusive, 0-based block range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockRange {
    pub start: u32,
    pub end: u32,
}

impl BlockRange {
    pub fn new(start: u32, end: u32) -> Option<Self> {
        if end >= start {
            Some(Self { start, end })
        } else {
            None
        }
    }

    /// A single-block range, the `-R START` form.
    pub fn single(block: u32) -> Self {
        Self {
            start: block,
            end: block,
        }
    }
}

/// Top-level options for one annotation run.
#[derive(Clone, Debug)]
pub struct Options {
    /// Verify page checksums against the declared pd_checksum.
    pub verify_checksums: bool,

    /// Collapse non-root b-tree leaf pages into one whole-page tag.
    /// Root pages are always decoded in full, leaf or not.
    pub skip_leaf_pages: bool,

    /// Restrict the run to a block range; None means the whole file.
    pub range: Option<BlockRange>,

    /// Relation segment size in bytes. Only used, together with the segment
    /// number, to offset the block number fed into checksum verification.
    pub segment_size: u64,

    /// Segment number of the file; None means "infer from the file name".
    pub segment_number: Option<u32>,
}

impl Options {
    /// Switch-style summary for the document header comment, rebuilt from
    /// the parsed options so it stays deterministic.
    pub fn summary(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if self.verify_checksums {
            parts.push("-k".into());
        }
        if self.skip_leaf_pages {
            parts.push("-l".into());
        }
        if let Some(range) = self.range {
            if range.start == range.end {
                parts.push(format!("-R {}", range.start));
            } else {
                parts.push(format!("-R {}:{}", range.start, range.end));
            }
        }
        if self.segment_size != DEFAULT_SEGMENT_SIZE {
            parts.push(format!("-s {}", self.segment_size));
        }
        if let Some(n) = self.segment_number {
            parts.push(format!("-n {}", n));
        }
        parts.join(" ")
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            verify_checksums: false,
            skip_leaf_pages: false,
            range: None,
            segment_size: DEFAULT_SEGMENT_SIZE,
            segment_number: None,
        }
    }
}
