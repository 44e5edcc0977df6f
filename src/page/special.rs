//! Special-section classification and decoding.
//!
//! The trailing region of a page does not name its owner on disk; it has to
//! be inferred from its size and, when the whole page was read, from a magic
//! value at the special offset and/or the page's trailing two bytes. Several
//! families share sizes, so the checks below run in a fixed order and the
//! boundary checks always run first - a malformed page can satisfy a later
//! predicate by coincidence on garbage bytes.
//!
//! Only the b-tree family's special section is field-decoded; the other
//! families are classified and reported, nothing more.

use byteorder::{ByteOrder, LittleEndian};

use crate::config::Options;
use crate::consts::*;
use crate::error::DecodeError;
use crate::tags::{Color, PageTags};
use crate::util::{flag_names, maxalign};

/// Who owns the trailing special section of a page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpecialKind {
    /// No special section (ordinary heap page).
    None,
    Sequence,
    Btree,
    Hash,
    Gist,
    Gin,
    SpGist,
    /// Size/signature combination matches no known family.
    UnknownError,
    /// The declared special offset is not safely readable.
    BoundaryError,
}

impl SpecialKind {
    pub fn name(self) -> &'static str {
        match self {
            SpecialKind::None => "none",
            SpecialKind::Sequence => "sequence",
            SpecialKind::Btree => "b-tree",
            SpecialKind::Hash => "hash",
            SpecialKind::Gist => "gist",
            SpecialKind::Gin => "gin",
            SpecialKind::SpGist => "sp-gist",
            SpecialKind::UnknownError => "unknown",
            SpecialKind::BoundaryError => "boundary error",
        }
    }

    pub fn is_error(self) -> bool {
        matches!(self, SpecialKind::UnknownError | SpecialKind::BoundaryError)
    }
}

/// Classify the special section of a page.
///
/// `page` holds the bytes actually read (`page.len()` may be short of
/// `page_size` on a truncated read); bytes beyond it are never examined.
/// Pure function of its inputs.
pub fn classify(page: &[u8], page_size: usize) -> SpecialKind {
    let available = page.len();

    // Need more than the fixed header to trust pd_special at all.
    if available <= PAGE_HEADER_SIZE {
        return SpecialKind::UnknownError;
    }

    let special = LittleEndian::read_u16(&page[OFF_PD_SPECIAL..OFF_PD_SPECIAL + 2]) as usize;
    if special == 0 || special > page_size || special > available {
        return SpecialKind::BoundaryError;
    }

    let special_size = page_size - special;
    let full = available == page_size;
    // Trailing two bytes identify several index families, but only exist
    // for us when the read covered the whole page.
    let trailing = if full {
        Some(LittleEndian::read_u16(&page[page_size - 2..page_size]))
    } else {
        None
    };

    if special_size == 0 {
        return SpecialKind::None;
    }

    if special_size == maxalign(4) {
        // Ambiguous size shared by sequence, SP-GiST and GIN pages.
        return match trailing {
            Some(trailing) => {
                let magic = LittleEndian::read_u32(&page[special..special + 4]);
                if magic == SEQUENCE_MAGIC {
                    SpecialKind::Sequence
                } else if special_size == SPGIST_SPECIAL_SIZE && trailing == SPGIST_PAGE_ID {
                    SpecialKind::SpGist
                } else if special_size == GIN_SPECIAL_SIZE {
                    SpecialKind::Gin
                } else {
                    SpecialKind::UnknownError
                }
            }
            None => SpecialKind::UnknownError,
        };
    }

    // SP-GiST and GIN share a size too, so the page id decides first.
    if special_size == SPGIST_SPECIAL_SIZE && trailing == Some(SPGIST_PAGE_ID) {
        return SpecialKind::SpGist;
    }
    if special_size == GIN_SPECIAL_SIZE {
        return SpecialKind::Gin;
    }

    if special_size > 2 {
        // B-tree, hash and GiST all use the same struct size; the trailing
        // two bytes tell them apart (a b-tree cycle id never reaches the
        // reserved page-id values).
        if let Some(trailing) = trailing {
            if trailing <= MAX_BTREE_CYCLE_ID && special_size == BTREE_SPECIAL_SIZE {
                return SpecialKind::Btree;
            } else if trailing == HASH_PAGE_ID && special_size == HASH_SPECIAL_SIZE {
                return SpecialKind::Hash;
            } else if trailing == GIST_PAGE_ID && special_size == GIST_SPECIAL_SIZE {
                return SpecialKind::Gist;
            }
            return SpecialKind::UnknownError;
        }
    }

    SpecialKind::UnknownError
}

/// Decoded b-tree special section.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BtreeSpecial {
    pub prev: u32,
    pub next: u32,
    pub level: u32,
    pub flags: u16,
    pub cycle_id: u16,
}

impl BtreeSpecial {
    pub fn is_leaf(&self) -> bool {
        self.flags & BTP_LEAF != 0
    }

    pub fn is_root(&self) -> bool {
        self.flags & BTP_ROOT != 0
    }
}

/// Parse the b-tree special section, if the page carries one and the whole
/// page was read. Returns None rather than touching absent bytes.
pub fn parse_btree_special(page: &[u8], page_size: usize) -> Option<BtreeSpecial> {
    if page.len() != page_size || page_size <= PAGE_HEADER_SIZE {
        return None;
    }
    let special = LittleEndian::read_u16(&page[OFF_PD_SPECIAL..OFF_PD_SPECIAL + 2]) as usize;
    if special == 0 || special > page_size || page_size - special != BTREE_SPECIAL_SIZE {
        return None;
    }
    let sp = &page[special..special + BTREE_SPECIAL_SIZE];
    Some(BtreeSpecial {
        prev: LittleEndian::read_u32(&sp[BT_OFF_PREV..BT_OFF_PREV + 4]),
        next: LittleEndian::read_u32(&sp[BT_OFF_NEXT..BT_OFF_NEXT + 4]),
        level: LittleEndian::read_u32(&sp[BT_OFF_LEVEL..BT_OFF_LEVEL + 4]),
        flags: LittleEndian::read_u16(&sp[BT_OFF_FLAGS..BT_OFF_FLAGS + 2]),
        cycle_id: LittleEndian::read_u16(&sp[BT_OFF_CYCLEID..BT_OFF_CYCLEID + 2]),
    })
}

/// A b-tree meta page replaces the item directory with the tree-wide meta
/// struct. The cycle id must look valid before the meta flag is trusted.
pub fn is_btree_meta_page(page: &[u8], page_size: usize) -> bool {
    match parse_btree_special(page, page_size) {
        Some(sp) => sp.cycle_id <= MAX_BTREE_CYCLE_ID && sp.flags & BTP_META != 0,
        None => false,
    }
}

/// Leaf-elision rule: non-root leaf pages may be collapsed into a single
/// whole-page tag when requested. Root overrides leaf-skip by policy: a
/// page that is both root and leaf is always decoded in full.
pub fn elide_leaf_page(sp: &BtreeSpecial, opts: &Options) -> bool {
    opts.skip_leaf_pages && sp.is_leaf() && !sp.is_root()
}

/// Annotate the special section. Only the b-tree family gets field-level
/// tags; everything else is a reported condition.
pub(crate) fn emit_special(
    tags: &mut PageTags<'_>,
    kind: SpecialKind,
    page: &[u8],
    page_size: usize,
) -> Result<(), DecodeError> {
    let blkno = tags.blkno();
    match kind {
        SpecialKind::None => Ok(()),

        SpecialKind::UnknownError | SpecialKind::BoundaryError => {
            tags.session()
                .report(format!("block {}: invalid special section encountered", blkno));
            Ok(())
        }

        SpecialKind::Btree => {
            let special =
                LittleEndian::read_u16(&page[OFF_PD_SPECIAL..OFF_PD_SPECIAL + 2]) as usize;
            let sp = match parse_btree_special(page, page_size) {
                Some(sp) => sp,
                None => {
                    // Classified b-tree but the section is not dereferencable
                    // (truncated read); nothing to annotate.
                    tags.session().report(format!(
                        "block {}: b-tree special section not fully read",
                        blkno
                    ));
                    return Ok(());
                }
            };

            tags.page_tag(
                "btpo_prev",
                Color::Black,
                special + BT_OFF_PREV,
                special + BT_OFF_NEXT - 1,
            )?;
            tags.page_tag(
                "btpo_next",
                Color::Black,
                special + BT_OFF_NEXT,
                special + BT_OFF_LEVEL - 1,
            )?;
            tags.page_tag(
                "btpo.level",
                Color::Black,
                special + BT_OFF_LEVEL,
                special + BT_OFF_FLAGS - 1,
            )?;
            let flags = format!("btpo_flags - {}", flag_names(BTP_FLAG_NAMES, sp.flags));
            tags.page_tag(
                &flags,
                Color::Black,
                special + BT_OFF_FLAGS,
                special + BT_OFF_CYCLEID - 1,
            )?;
            tags.page_tag(
                "btpo_cycleid",
                Color::Black,
                special + BT_OFF_CYCLEID,
                special + BTREE_SPECIAL_SIZE - 1,
            )?;
            Ok(())
        }

        SpecialKind::Sequence
        | SpecialKind::Hash
        | SpecialKind::Gist
        | SpecialKind::Gin
        | SpecialKind::SpGist => {
            tags.session().report(format!(
                "block {}: unsupported special section type <{}>",
                blkno,
                kind.name()
            ));
            Ok(())
        }
    }
}
