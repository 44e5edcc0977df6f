//! Page header and item directory annotation.
//!
//! The item pointers are emitted here, between the fixed header fields and
//! the tuples, so the whole page's tag stream stays in ascending offset
//! order. A b-tree meta page replaces the directory with the fixed meta
//! struct.

use byteorder::{ByteOrder, LittleEndian};

use crate::checksum::checksum_page;
use crate::consts::*;
use crate::error::DecodeError;
use crate::tags::{Color, PageTags};
use crate::util::{flag_names, maxalign};

use super::special;
use super::{Block, ItemPointer, PageHeader};

/// What the header pass concluded about the rest of the page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeaderOutcome {
    /// Header or directory ran past the read boundary; the page contributes
    /// no tuple or special-section annotations.
    Truncated,
    Complete { max_items: usize, is_meta: bool },
}

/// Annotate the fixed header fields and the item directory (or meta struct),
/// validate cross-field consistency, and verify the checksum if requested.
pub(crate) fn emit_page_header(
    tags: &mut PageTags<'_>,
    block: &Block,
) -> Result<HeaderOutcome, DecodeError> {
    let blkno = block.blkno();
    let page = block.data();
    let page_size = block.page_size() as usize;
    let available = block.available();

    // Without the full fixed header there is nothing trustworthy to label.
    let hdr = match PageHeader::parse(page) {
        Some(hdr) => hdr,
        None => {
            tags.session().report(format!(
                "block {}: end of block encountered within the header ({} bytes read)",
                blkno, available
            ));
            return Ok(HeaderOutcome::Truncated);
        }
    };

    let max_items = hdr.max_items();
    let dir_end = PAGE_HEADER_SIZE + max_items * ITEM_POINTER_SIZE;
    let dir_truncated = available < dir_end;

    tags.page_tag("LSN", Color::YellowLight, OFF_PD_LSN, OFF_PD_CHECKSUM - 1)?;
    tags.page_tag(
        "checksum",
        Color::GreenBright,
        OFF_PD_CHECKSUM,
        OFF_PD_FLAGS - 1,
    )?;
    let flags = format!("pd_flags - {}", flag_names(PD_FLAG_NAMES, hdr.flags));
    tags.page_tag(&flags, Color::YellowDark, OFF_PD_FLAGS, OFF_PD_LOWER - 1)?;
    tags.page_tag("pd_lower", Color::Maroon, OFF_PD_LOWER, OFF_PD_UPPER - 1)?;
    tags.page_tag("pd_upper", Color::Maroon, OFF_PD_UPPER, OFF_PD_SPECIAL - 1)?;
    tags.page_tag(
        "pd_special",
        Color::GreenBright,
        OFF_PD_SPECIAL,
        OFF_PD_PAGESIZE_VERSION - 1,
    )?;
    tags.page_tag(
        "pd_pagesize_version",
        Color::Brown,
        OFF_PD_PAGESIZE_VERSION,
        OFF_PD_PRUNE_XID - 1,
    )?;
    tags.page_tag(
        "pd_prune_xid",
        Color::RedLight,
        OFF_PD_PRUNE_XID,
        PAGE_HEADER_SIZE - 1,
    )?;

    let is_meta = special::is_btree_meta_page(page, page_size);
    if is_meta {
        emit_btree_meta(tags, page)?;
    } else {
        // Only slots whose directory entry was fully read get a tag; on a
        // truncated read the remainder of the directory does not exist for us.
        let readable = if dir_truncated {
            (available - PAGE_HEADER_SIZE) / ITEM_POINTER_SIZE
        } else {
            max_items
        };
        for slot in 1..=readable.min(max_items) {
            let ip = ItemPointer::read(page, slot);
            let start = PAGE_HEADER_SIZE + ITEM_POINTER_SIZE * (slot - 1);
            let name = format!(
                "lp_len: {}, lp_off: {}, lp_flags: {}",
                ip.length(),
                ip.offset(),
                ip.status().name()
            );
            tags.tuple_tag(
                slot,
                &name,
                Color::BlueLight,
                start,
                start + ITEM_POINTER_SIZE - 1,
            )?;
        }
    }

    validate_header(tags, &hdr, max_items, page_size);

    // The declared checksum covers the whole page, so a partial read cannot
    // be verified.
    if tags.session().options().verify_checksums && block.is_full() {
        let chk_blkno = tags.session().checksum_block(blkno);
        let calculated = checksum_page(page, chk_blkno);
        if calculated != hdr.checksum {
            tags.session().report(format!(
                "block {}: checksum failure: calculated 0x{:04x}, header has 0x{:04x}",
                blkno, calculated, hdr.checksum
            ));
        }
    }

    if dir_truncated {
        tags.session().report(format!(
            "block {}: end of block encountered within the item directory ({} bytes read)",
            blkno, available
        ));
        return Ok(HeaderOutcome::Truncated);
    }

    Ok(HeaderOutcome::Complete { max_items, is_meta })
}

/// Cross-field sanity: violations are reported, never fatal; decoding
/// carries on with the nominal values.
fn validate_header(tags: &mut PageTags<'_>, hdr: &PageHeader, max_items: usize, page_size: usize) {
    let lower = hdr.lower as usize;
    let upper = hdr.upper as usize;
    let special = hdr.special as usize;

    if max_items > page_size
        || hdr.layout_version() != PAGE_LAYOUT_VERSION
        || upper > page_size
        || upper > special
        || lower < PAGE_HEADER_SIZE - ITEM_POINTER_SIZE
        || lower > page_size
        || upper < lower
        || special > page_size
    {
        let blkno = tags.blkno();
        tags.session().report(format!(
            "block {}: invalid header information \
             (lower={} upper={} special={} version={})",
            blkno,
            lower,
            upper,
            special,
            hdr.layout_version()
        ));
    }
}

/// The meta struct sits where the item directory would otherwise start.
fn emit_btree_meta(tags: &mut PageTags<'_>, page: &[u8]) -> Result<(), DecodeError> {
    let base = maxalign(PAGE_HEADER_SIZE);
    debug_assert!(page.len() >= base + BTREE_META_SIZE);

    let fields: [(&str, usize, usize); 6] = [
        ("btm_magic", BTM_OFF_MAGIC, BTM_OFF_VERSION),
        ("btm_version", BTM_OFF_VERSION, BTM_OFF_ROOT),
        ("btm_root", BTM_OFF_ROOT, BTM_OFF_LEVEL),
        ("btm_level", BTM_OFF_LEVEL, BTM_OFF_FASTROOT),
        ("btm_fastroot", BTM_OFF_FASTROOT, BTM_OFF_FASTLEVEL),
        ("btm_fastlevel", BTM_OFF_FASTLEVEL, BTREE_META_SIZE),
    ];
    for (name, start, end) in fields {
        tags.page_tag(name, Color::Pink, base + start, base + end - 1)?;
    }

    let magic = LittleEndian::read_u32(&page[base + BTM_OFF_MAGIC..base + BTM_OFF_MAGIC + 4]);
    if magic != BTREE_META_MAGIC {
        let blkno = tags.blkno();
        tags.session().report(format!(
            "block {}: b-tree meta page magic 0x{:06x} (expected 0x{:06x})",
            blkno, magic, BTREE_META_MAGIC
        ));
    }
    Ok(())
}
