//! Heap tuple decoding.
//!
//! The header is parsed in full before anything is emitted: whether byte 8
//! is t_cid or t_xvac depends on the HEAP_MOVED bits of t_infomask, which
//! lives later in the header. Decode order and emission order differ; the
//! emitted offsets do not.

use byteorder::{ByteOrder, LittleEndian};

use crate::consts::*;
use crate::error::DecodeError;
use crate::tags::{Color, PageTags};
use crate::util::{flag_names, maxalign};

/// Fixed heap tuple header fields.
struct HeapHeader {
    infomask2: u16,
    infomask: u16,
    hoff: u8,
}

impl HeapHeader {
    fn parse(item: &[u8]) -> Self {
        Self {
            infomask2: LittleEndian::read_u16(&item[HEAP_OFF_INFOMASK2..HEAP_OFF_INFOMASK2 + 2]),
            infomask: LittleEndian::read_u16(&item[HEAP_OFF_INFOMASK..HEAP_OFF_INFOMASK + 2]),
            hoff: item[HEAP_OFF_HOFF],
        }
    }

    fn natts(&self) -> usize {
        (self.infomask2 & HEAP_NATTS_MASK) as usize
    }

    /// Header length implied by the attribute count and presence bits; must
    /// agree with the stored t_hoff.
    fn computed_hoff(&self) -> usize {
        let bitmap = if self.infomask & HEAP_HASNULL != 0 {
            (self.natts() + 7) / 8
        } else {
            0
        };
        let oid = if self.infomask & HEAP_HASOID != 0 {
            OID_SIZE
        } else {
            0
        };
        maxalign(HEAP_OFF_BITS + bitmap + oid)
    }
}

fn mask_label(prefix: &str, names: String) -> String {
    if names.is_empty() {
        format!("{} ( )", prefix)
    } else {
        format!("{} ( {} )", prefix, names)
    }
}

/// Annotate one heap tuple at `off` with declared length `len`.
/// The caller has already established that `off + len` lies within the
/// bytes read.
pub(crate) fn emit_heap_tuple(
    tags: &mut PageTags<'_>,
    page: &[u8],
    slot: usize,
    off: usize,
    len: usize,
) -> Result<(), DecodeError> {
    let blkno = tags.blkno();

    if len < HEAP_OFF_BITS {
        tags.session().report(format!(
            "block {}: item {} too small for a heap tuple header ({} bytes)",
            blkno, slot, len
        ));
        return Ok(());
    }

    let item = &page[off..off + len];
    let hdr = HeapHeader::parse(item);

    // xmin and xmax are symmetric and share a color; t_cid is related but
    // distinct. t_xvac only appears on tuples moved by long-dead vacuum
    // versions, so it gets a color that stands out.
    tags.tuple_tag(
        slot,
        "xmin",
        Color::RedLight,
        off + HEAP_OFF_XMIN,
        off + HEAP_OFF_XMAX - 1,
    )?;
    tags.tuple_tag(
        slot,
        "xmax",
        Color::RedLight,
        off + HEAP_OFF_XMAX,
        off + HEAP_OFF_FIELD3 - 1,
    )?;
    if hdr.infomask & HEAP_MOVED == 0 {
        tags.tuple_tag(
            slot,
            "t_cid",
            Color::RedDark,
            off + HEAP_OFF_FIELD3,
            off + HEAP_OFF_CTID_BI_HI - 1,
        )?;
    } else {
        tags.tuple_tag(
            slot,
            "t_xvac",
            Color::Pink,
            off + HEAP_OFF_FIELD3,
            off + HEAP_OFF_CTID_BI_HI - 1,
        )?;
    }

    // The block-number halves are physical pointers like the item pointers
    // themselves; the offset number is a logical pointer and is shaded
    // differently.
    tags.tuple_tag(
        slot,
        "t_ctid->bi_hi",
        Color::BlueLight,
        off + HEAP_OFF_CTID_BI_HI,
        off + HEAP_OFF_CTID_BI_LO - 1,
    )?;
    tags.tuple_tag(
        slot,
        "t_ctid->bi_lo",
        Color::BlueLight,
        off + HEAP_OFF_CTID_BI_LO,
        off + HEAP_OFF_CTID_OFFNUM - 1,
    )?;
    tags.tuple_tag(
        slot,
        "t_ctid->offsetNumber",
        Color::BlueDark,
        off + HEAP_OFF_CTID_OFFNUM,
        off + HEAP_OFF_INFOMASK2 - 1,
    )?;

    let infomask2 = mask_label("t_infomask2", flag_names(HEAP_INFOMASK2_NAMES, hdr.infomask2));
    tags.tuple_tag(
        slot,
        &infomask2,
        Color::GreenLight,
        off + HEAP_OFF_INFOMASK2,
        off + HEAP_OFF_INFOMASK - 1,
    )?;
    let infomask = mask_label("t_infomask", flag_names(HEAP_INFOMASK_NAMES, hdr.infomask));
    tags.tuple_tag(
        slot,
        &infomask,
        Color::GreenDark,
        off + HEAP_OFF_INFOMASK,
        off + HEAP_OFF_HOFF - 1,
    )?;
    tags.tuple_tag(
        slot,
        "t_hoff",
        Color::YellowDark,
        off + HEAP_OFF_HOFF,
        off + HEAP_OFF_BITS - 1,
    )?;

    let hoff = hdr.hoff as usize;
    let computed = hdr.computed_hoff();
    if computed != hoff {
        tags.session().report(format!(
            "block {}: item {} computed header length not equal to header size \
             (computed {}, header {})",
            blkno, slot, computed, hoff
        ));
    }

    if hoff < HEAP_OFF_BITS || hoff > len {
        // t_hoff points outside the tuple; the bitmap and payload cannot be
        // delimited, so stop at the fixed header.
        tags.session().report(format!(
            "block {}: item {} header length {} outside tuple of {} bytes",
            blkno, slot, hoff, len
        ));
        return Ok(());
    }

    // Everything between the fixed header and t_hoff is the null bitmap
    // (with the oid, when present, hiding in its final 4 bytes) plus
    // alignment padding.
    if hoff > HEAP_OFF_BITS {
        tags.tuple_tag(
            slot,
            "t_bits",
            Color::YellowDark,
            off + HEAP_OFF_BITS,
            off + hoff - 1,
        )?;
    }

    // Attribute data is opaque without catalog metadata: one payload region
    // up to the slot's declared end.
    if hoff < len {
        tags.tuple_tag(slot, "contents", Color::White, off + hoff, off + len - 1)?;
    }

    Ok(())
}
