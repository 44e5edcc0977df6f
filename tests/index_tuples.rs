use byteorder::{ByteOrder, LittleEndian};

use hexpage::consts::*;
use hexpage::{annotate_page, Block, Options, Session, SpecialKind};

const PS: usize = 8192;

#[test]
fn sentinel_entry_has_no_contents() {
    // "Minus infinity" entry: declared size equals the bare 8-byte header.
    let mut page = btree_page(&[(8160, 8)], 0, BTP_LEAF | BTP_ROOT);
    write_index_tuple(&mut page, 8160, 8);

    let out = decode(page).unwrap();
    assert_eq!(out.special, SpecialKind::Btree);

    let slot1: Vec<&str> = out
        .annotations
        .iter()
        .filter(|t| t.label.starts_with("(0,1) "))
        .map(|t| t.label.as_str())
        .filter(|l| !l.contains("lp_len"))
        .collect();
    assert_eq!(
        slot1,
        vec![
            "(0,1) t_tid->bi_hi",
            "(0,1) t_tid->bi_lo",
            "(0,1) t_tid->offsetNumber",
            "(0,1) t_info",
        ]
    );
}

#[test]
fn entry_with_payload_gets_one_contents_region() {
    let mut page = btree_page(&[(8000, 24), (8160, 8)], 1, 0);
    write_index_tuple(&mut page, 8000, 24);
    write_index_tuple(&mut page, 8160, 8);

    let out = decode(page).unwrap();
    let contents = out
        .annotations
        .iter()
        .find(|t| t.label == "(0,1) contents")
        .unwrap();
    assert_eq!((contents.start, contents.end), (8008, 8023));

    // Field ranges of the header: 2 + 2 + 2 + 2 bytes.
    let bi_hi = out
        .annotations
        .iter()
        .find(|t| t.label == "(0,1) t_tid->bi_hi")
        .unwrap();
    assert_eq!((bi_hi.start, bi_hi.end), (8000, 8001));
    let info = out
        .annotations
        .iter()
        .find(|t| t.label == "(0,1) t_info")
        .unwrap();
    assert_eq!((info.start, info.end), (8006, 8007));
}

#[test]
fn btree_pages_carry_the_level_in_page_tags() {
    let mut page = btree_page(&[(8160, 8)], 3, 0);
    write_index_tuple(&mut page, 8160, 8);

    let out = decode(page).unwrap();
    assert_eq!(out.level, Some(3));
    assert!(out
        .annotations
        .iter()
        .any(|t| t.label == "block 0 (level 3) LSN"));
    // Item tags keep the (block,slot) form without a level.
    assert!(out
        .annotations
        .iter()
        .any(|t| t.label == "(0,1) t_tid->bi_hi"));
}

#[test]
fn declared_size_past_read_boundary_is_reported_and_skipped() {
    let mut page = btree_page(&[(8160, 8)], 0, 0);
    write_index_tuple(&mut page, 8160, 5000);

    let mut session = Session::new(PS as u32, 0, Options::default());
    let out = annotate_page(&mut session, &Block::new(0, page, PS as u32)).unwrap();
    assert!(session.failed());
    assert!(!out.annotations.iter().any(|t| t.label == "(0,1) contents"));
    // The header fields were still annotated.
    assert!(out.annotations.iter().any(|t| t.label == "(0,1) t_info"));
}

#[test]
fn dead_index_entries_are_still_decoded() {
    let mut page = btree_page_with_status(&[(8160, 16, LP_DEAD)], 0, 0);
    write_index_tuple(&mut page, 8160, 16);

    let out = decode(page).unwrap();
    assert!(out.annotations.iter().any(|t| t.label == "(0,1) contents"));
}

#[test]
fn entries_are_emitted_in_physical_order() {
    let mut page = btree_page(&[(8100, 16), (8000, 16)], 0, 0);
    write_index_tuple(&mut page, 8100, 16);
    write_index_tuple(&mut page, 8000, 16);

    let out = decode(page).unwrap();
    for pair in out.annotations.windows(2) {
        assert!(pair[1].start >= pair[0].start);
        assert!(pair[1].id > pair[0].id);
    }
}

// ---------- helpers ----------

fn btree_page(items: &[(usize, usize)], level: u32, flags: u16) -> Vec<u8> {
    let with_status: Vec<(usize, usize, u8)> =
        items.iter().map(|(off, len)| (*off, *len, LP_NORMAL)).collect();
    btree_page_with_status(&with_status, level, flags)
}

/// B-tree page: item directory plus a 16-byte special section whose cycle id
/// keeps it classifiable as b-tree.
fn btree_page_with_status(items: &[(usize, usize, u8)], level: u32, flags: u16) -> Vec<u8> {
    let mut page = vec![0u8; PS];
    let special = PS - BTREE_SPECIAL_SIZE;
    let lower = (PAGE_HEADER_SIZE + items.len() * ITEM_POINTER_SIZE) as u16;
    let upper = items.iter().map(|(off, _, _)| *off).min().unwrap_or(special) as u16;
    LittleEndian::write_u16(&mut page[OFF_PD_LOWER..], lower);
    LittleEndian::write_u16(&mut page[OFF_PD_UPPER..], upper);
    LittleEndian::write_u16(&mut page[OFF_PD_SPECIAL..], special as u16);
    LittleEndian::write_u16(
        &mut page[OFF_PD_PAGESIZE_VERSION..],
        PS as u16 & 0xFF00 | PAGE_LAYOUT_VERSION as u16,
    );
    for (slot, (off, len, status)) in items.iter().enumerate() {
        let raw = (*off as u32) | ((*status as u32) << 15) | ((*len as u32) << 17);
        let at = PAGE_HEADER_SIZE + slot * ITEM_POINTER_SIZE;
        LittleEndian::write_u32(&mut page[at..], raw);
    }
    LittleEndian::write_u32(&mut page[special + BT_OFF_LEVEL..], level);
    LittleEndian::write_u16(&mut page[special + BT_OFF_FLAGS..], flags);
    LittleEndian::write_u16(&mut page[special + BT_OFF_CYCLEID..], 0);
    page
}

fn write_index_tuple(page: &mut [u8], off: usize, size: u16) {
    LittleEndian::write_u16(&mut page[off + IDX_OFF_INFO..], size & INDEX_SIZE_MASK);
}

fn decode(page: Vec<u8>) -> anyhow::Result<hexpage::PageAnnotations> {
    let mut session = Session::new(PS as u32, 0, Options::default());
    Ok(annotate_page(&mut session, &Block::new(0, page, PS as u32))?)
}
