//! Index entry decoding.
//!
//! Index entries carry their own size in the low bits of t_info; the item
//! pointer's lp_len is not authoritative here. An entry whose declared size
//! equals the bare header is a "minus infinity" sentinel and legitimately
//! has no payload.

use byteorder::{ByteOrder, LittleEndian};

use crate::consts::*;
use crate::error::DecodeError;
use crate::tags::{Color, PageTags};

/// Annotate one index entry at `off` (directory length `len`).
pub(crate) fn emit_index_tuple(
    tags: &mut PageTags<'_>,
    page: &[u8],
    slot: usize,
    off: usize,
    len: usize,
) -> Result<(), DecodeError> {
    let blkno = tags.blkno();
    let available = page.len();

    if len < INDEX_TUPLE_HEADER_SIZE || off + INDEX_TUPLE_HEADER_SIZE > available {
        tags.session().report(format!(
            "block {}: item {} too small for an index entry header \
             (offset {}, length {}, {} bytes available)",
            blkno, slot, off, len, available
        ));
        return Ok(());
    }

    // Same shading as the heap t_ctid: physical halves light, the logical
    // offset number dark.
    tags.tuple_tag(
        slot,
        "t_tid->bi_hi",
        Color::BlueLight,
        off + IDX_OFF_TID_BI_HI,
        off + IDX_OFF_TID_BI_LO - 1,
    )?;
    tags.tuple_tag(
        slot,
        "t_tid->bi_lo",
        Color::BlueLight,
        off + IDX_OFF_TID_BI_LO,
        off + IDX_OFF_TID_OFFNUM - 1,
    )?;
    tags.tuple_tag(
        slot,
        "t_tid->offsetNumber",
        Color::BlueDark,
        off + IDX_OFF_TID_OFFNUM,
        off + IDX_OFF_INFO - 1,
    )?;
    tags.tuple_tag(
        slot,
        "t_info",
        Color::YellowDark,
        off + IDX_OFF_INFO,
        off + INDEX_TUPLE_HEADER_SIZE - 1,
    )?;

    let info = LittleEndian::read_u16(&page[off + IDX_OFF_INFO..off + IDX_OFF_INFO + 2]);
    let size = (info & INDEX_SIZE_MASK) as usize;

    if size < INDEX_TUPLE_HEADER_SIZE {
        tags.session().report(format!(
            "block {}: item {} declared index entry size {} below header size",
            blkno, slot, size
        ));
        return Ok(());
    }
    if off + size > available {
        tags.session().report(format!(
            "block {}: item {} index entry extends beyond block \
             (offset {}, size {}, {} bytes available)",
            blkno, slot, off, size, available
        ));
        return Ok(());
    }

    // Sentinel entries end right after the header and get no contents tag.
    if size > INDEX_TUPLE_HEADER_SIZE {
        tags.tuple_tag(
            slot,
            "contents",
            Color::White,
            off + INDEX_TUPLE_HEADER_SIZE,
            off + size - 1,
        )?;
    }

    Ok(())
}
