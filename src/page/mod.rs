//! Page decoding: block views, the item directory, and the per-page
//! orchestration that strings header, tuple and special-section decoding
//! together into one ordered annotation stream.

pub mod header;
pub mod heap;
pub mod index;
pub mod special;

use byteorder::{ByteOrder, LittleEndian};

use crate::consts::*;
use crate::error::DecodeError;
use crate::session::Session;
use crate::tags::{Annotation, Color, PageTags};

use self::special::SpecialKind;

/// One block as read from the file. `data.len()` is the byte count actually
/// read; it is short of `page_size` exactly when the read was truncated, and
/// no decoder ever looks past it.
pub struct Block {
    blkno: u32,
    page_size: u32,
    data: Vec<u8>,
}

impl Block {
    pub fn new(blkno: u32, data: Vec<u8>, page_size: u32) -> Self {
        debug_assert!(data.len() <= page_size as usize);
        Self {
            blkno,
            page_size,
            data,
        }
    }

    pub fn blkno(&self) -> u32 {
        self.blkno
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// The bytes actually read.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn available(&self) -> usize {
        self.data.len()
    }

    pub fn is_full(&self) -> bool {
        self.data.len() == self.page_size as usize
    }
}

/// Fixed page header fields, parsed with no interpretation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageHeader {
    pub lsn_hi: u32,
    pub lsn_lo: u32,
    pub checksum: u16,
    pub flags: u16,
    pub lower: u16,
    pub upper: u16,
    pub special: u16,
    pub pagesize_version: u16,
    pub prune_xid: u32,
}

impl PageHeader {
    /// Parse the fixed header; None if fewer than `PAGE_HEADER_SIZE` bytes
    /// were read.
    pub fn parse(page: &[u8]) -> Option<Self> {
        if page.len() < PAGE_HEADER_SIZE {
            return None;
        }
        Some(Self {
            lsn_hi: LittleEndian::read_u32(&page[OFF_PD_LSN..OFF_PD_LSN + 4]),
            lsn_lo: LittleEndian::read_u32(&page[OFF_PD_LSN + 4..OFF_PD_LSN + 8]),
            checksum: LittleEndian::read_u16(&page[OFF_PD_CHECKSUM..OFF_PD_CHECKSUM + 2]),
            flags: LittleEndian::read_u16(&page[OFF_PD_FLAGS..OFF_PD_FLAGS + 2]),
            lower: LittleEndian::read_u16(&page[OFF_PD_LOWER..OFF_PD_LOWER + 2]),
            upper: LittleEndian::read_u16(&page[OFF_PD_UPPER..OFF_PD_UPPER + 2]),
            special: LittleEndian::read_u16(&page[OFF_PD_SPECIAL..OFF_PD_SPECIAL + 2]),
            pagesize_version: LittleEndian::read_u16(
                &page[OFF_PD_PAGESIZE_VERSION..OFF_PD_PAGESIZE_VERSION + 2],
            ),
            prune_xid: LittleEndian::read_u32(&page[OFF_PD_PRUNE_XID..OFF_PD_PRUNE_XID + 4]),
        })
    }

    pub fn page_size(&self) -> u32 {
        (self.pagesize_version & 0xFF00) as u32
    }

    pub fn layout_version(&self) -> u8 {
        (self.pagesize_version & 0x00FF) as u8
    }

    /// Number of item-directory slots implied by pd_lower.
    pub fn max_items(&self) -> usize {
        let lower = self.lower as usize;
        if lower <= PAGE_HEADER_SIZE {
            0
        } else {
            (lower - PAGE_HEADER_SIZE) / ITEM_POINTER_SIZE
        }
    }
}

/// 2-bit item pointer status.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemStatus {
    Unused,
    Normal,
    Redirect,
    Dead,
}

impl ItemStatus {
    fn from_bits(bits: u8) -> Self {
        match bits {
            LP_UNUSED => ItemStatus::Unused,
            LP_NORMAL => ItemStatus::Normal,
            LP_REDIRECT => ItemStatus::Redirect,
            _ => ItemStatus::Dead,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ItemStatus::Unused => "LP_UNUSED",
            ItemStatus::Normal => "LP_NORMAL",
            ItemStatus::Redirect => "LP_REDIRECT",
            ItemStatus::Dead => "LP_DEAD",
        }
    }
}

/// One item-directory slot, unpacked from its bit-packed u32.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ItemPointer {
    raw: u32,
}

impl ItemPointer {
    /// Read slot `slot` (1-indexed) from the directory. The caller must have
    /// established that the directory entry lies within the read bytes.
    pub fn read(page: &[u8], slot: usize) -> Self {
        let off = PAGE_HEADER_SIZE + ITEM_POINTER_SIZE * (slot - 1);
        Self {
            raw: LittleEndian::read_u32(&page[off..off + 4]),
        }
    }

    /// Byte offset of the item within the page (or redirect target slot).
    pub fn offset(self) -> usize {
        (self.raw & 0x7FFF) as usize
    }

    pub fn status(self) -> ItemStatus {
        ItemStatus::from_bits(((self.raw >> 15) & 0x3) as u8)
    }

    /// Declared item length in bytes.
    pub fn length(self) -> usize {
        ((self.raw >> 17) & 0x7FFF) as usize
    }

    /// Whether the slot points at stored bytes at all.
    pub fn has_storage(self) -> bool {
        self.length() != 0
    }
}

/// Everything the boundary layer needs for one page.
#[derive(Debug)]
pub struct PageAnnotations {
    pub annotations: Vec<Annotation>,
    /// Tree level, when the page belongs to a b-tree.
    pub level: Option<u32>,
    pub special: SpecialKind,
}

/// Item decoding style, decided by the special-section family.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ItemFormat {
    Heap,
    Index,
}

/// Decode one block into its annotation stream.
///
/// Non-fatal conditions are reported through the session and decoding
/// continues; a returned error is structural corruption and the caller is
/// expected to abort the run.
pub fn annotate_page(session: &mut Session, block: &Block) -> Result<PageAnnotations, DecodeError> {
    let page = block.data();
    let page_size = block.page_size() as usize;
    let kind = special::classify(page, page_size);

    let mut level = None;
    if kind == SpecialKind::Btree {
        if let Some(sp) = special::parse_btree_special(page, page_size) {
            level = Some(sp.level);

            // Leaf pages can be itemized as a single whole-page tag to bound
            // output volume; internal and root pages are always decoded.
            if special::elide_leaf_page(&sp, session.options()) {
                let mut tags = PageTags::new(session, block.blkno(), level);
                tags.page_tag("leaf page", Color::GreenDark, 0, page_size - 1)?;
                return Ok(PageAnnotations {
                    annotations: tags.into_annotations(),
                    level,
                    special: kind,
                });
            }
        }
    }

    let mut tags = PageTags::new(session, block.blkno(), level);
    match header::emit_page_header(&mut tags, block)? {
        header::HeaderOutcome::Truncated => {
            // The header or directory ran past the read boundary; this page
            // contributes nothing further.
        }
        header::HeaderOutcome::Complete {
            max_items,
            is_meta,
        } => {
            if !is_meta {
                emit_tuples(&mut tags, block, kind, max_items)?;
            }
            if kind != SpecialKind::None {
                special::emit_special(&mut tags, kind, page, page_size)?;
            }
        }
    }

    Ok(PageAnnotations {
        annotations: tags.into_annotations(),
        level,
        special: kind,
    })
}

/// Annotate the items of a non-meta page.
fn emit_tuples(
    tags: &mut PageTags<'_>,
    block: &Block,
    kind: SpecialKind,
    max_items: usize,
) -> Result<(), DecodeError> {
    let blkno = block.blkno();
    let page = block.data();
    let page_size = block.page_size() as usize;
    let available = block.available();

    if max_items == 0 {
        return Err(DecodeError::EmptyBlock { blkno });
    }
    if max_items > page_size {
        return Err(DecodeError::CorruptItemIndex {
            blkno,
            max_items,
            page_size: block.page_size(),
        });
    }

    // Supported item-format set: b-tree pages hold index entries; heap,
    // sequence and unclassifiable pages are decoded as heap items; the
    // remaining index families are recognized but not item-decoded.
    let format = match kind {
        SpecialKind::Hash | SpecialKind::Gist | SpecialKind::Gin | SpecialKind::SpGist => {
            tags.session().report(format!(
                "block {}: items of {} index pages are not decoded",
                blkno,
                kind.name()
            ));
            return Ok(());
        }
        SpecialKind::Btree => ItemFormat::Index,
        _ => ItemFormat::Heap,
    };

    let slots: Vec<(usize, ItemPointer)> = (1..=max_items)
        .map(|slot| (slot, ItemPointer::read(page, slot)))
        .collect();

    // Heap items must physically fit on the block (and within the bytes we
    // read) before anything is decoded; an item that claims otherwise means
    // the directory cannot be trusted at all. Index lengths are allowed to
    // disagree, since lp_len is not authoritative there.
    if format == ItemFormat::Heap {
        for &(slot, ip) in &slots {
            let end = ip.offset() + ip.length();
            if end > page_size || end > available {
                return Err(DecodeError::ItemBeyondBlock {
                    blkno,
                    slot,
                    offset: ip.offset(),
                    length: ip.length(),
                    available,
                });
            }
        }
    }

    // Decode in ascending physical position, not slot order: the viewer
    // contract wants tag start offsets non-decreasing, and items are laid
    // out from the top of the page downward.
    let mut decodable: Vec<(usize, ItemPointer)> = slots
        .into_iter()
        .filter(|(_, ip)| match format {
            ItemFormat::Heap => ip.status() == ItemStatus::Normal && ip.has_storage(),
            ItemFormat::Index => ip.has_storage(),
        })
        .collect();
    decodable.sort_by_key(|(_, ip)| ip.offset());

    for (slot, ip) in decodable {
        match format {
            ItemFormat::Heap => heap::emit_heap_tuple(tags, page, slot, ip.offset(), ip.length())?,
            ItemFormat::Index => {
                index::emit_index_tuple(tags, page, slot, ip.offset(), ip.length())?
            }
        }
    }

    Ok(())
}
