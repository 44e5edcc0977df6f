use byteorder::{ByteOrder, LittleEndian};

use hexpage::consts::*;
use hexpage::{annotate_page, Block, Options, Session, SpecialKind};

const PS: usize = 8192;

#[test]
fn special_fields_are_annotated_for_btree() {
    let page = btree_page(2, BTP_LEAF | BTP_HAS_GARBAGE, &[(8000, 16)]);
    let out = decode(page, Options::default()).unwrap();

    let special = (PS - BTREE_SPECIAL_SIZE) as u64;
    let expected: &[(&str, u64, u64)] = &[
        ("block 0 (level 2) btpo_prev", special, special + 3),
        ("block 0 (level 2) btpo_next", special + 4, special + 7),
        ("block 0 (level 2) btpo.level", special + 8, special + 11),
        (
            "block 0 (level 2) btpo_flags - BTP_LEAF|BTP_HAS_GARBAGE",
            special + 12,
            special + 13,
        ),
        ("block 0 (level 2) btpo_cycleid", special + 14, special + 15),
    ];
    for (label, start, end) in expected {
        let tag = out
            .annotations
            .iter()
            .find(|t| t.label == *label)
            .unwrap_or_else(|| panic!("missing tag {}", label));
        assert_eq!((tag.start, tag.end), (*start, *end));
    }
}

#[test]
fn meta_flag_routes_to_meta_struct_not_item_directory() {
    // Meta routing must hold regardless of lower/upper: make them garbage.
    let mut page = btree_page(0, BTP_META, &[]);
    LittleEndian::write_u16(&mut page[OFF_PD_LOWER..], 200);
    LittleEndian::write_u16(&mut page[OFF_PD_UPPER..], 100);
    let base = PAGE_HEADER_SIZE as u64;
    LittleEndian::write_u32(
        &mut page[PAGE_HEADER_SIZE + BTM_OFF_MAGIC..],
        BTREE_META_MAGIC,
    );

    let mut session = Session::new(PS as u32, 0, Options::default());
    let out = annotate_page(&mut session, &Block::new(0, page, PS as u32)).unwrap();

    // Six meta fields, no item pointers, no tuples.
    let meta: Vec<&str> = out
        .annotations
        .iter()
        .filter(|t| t.label.contains("btm_"))
        .map(|t| t.label.as_str())
        .collect();
    assert_eq!(
        meta,
        vec![
            "block 0 (level 0) btm_magic",
            "block 0 (level 0) btm_version",
            "block 0 (level 0) btm_root",
            "block 0 (level 0) btm_level",
            "block 0 (level 0) btm_fastroot",
            "block 0 (level 0) btm_fastlevel",
        ]
    );
    let magic = out
        .annotations
        .iter()
        .find(|t| t.label.ends_with("btm_magic"))
        .unwrap();
    assert_eq!((magic.start, magic.end), (base, base + 3));
    assert!(!out.annotations.iter().any(|t| t.label.contains("lp_len")));
    assert!(!out.annotations.iter().any(|t| t.label.contains("xmin")));
    // The b-tree special section is still annotated after the meta struct.
    assert!(out
        .annotations
        .iter()
        .any(|t| t.label.ends_with("btpo_cycleid")));
    // The nonsense lower/upper were reported, but never stopped the page.
    assert!(session.failed());
}

#[test]
fn non_root_leaf_collapses_to_one_tag_when_skipping() {
    let page = btree_page(0, BTP_LEAF, &[(8000, 16)]);
    let mut opts = Options::default();
    opts.skip_leaf_pages = true;

    let out = decode(page, opts).unwrap();
    assert_eq!(out.annotations.len(), 1);
    let tag = &out.annotations[0];
    assert_eq!(tag.label, "block 0 (level 0) leaf page");
    assert_eq!((tag.start, tag.end), (0, PS as u64 - 1));
}

#[test]
fn root_leaf_is_always_fully_decoded() {
    // Root overrides leaf-skip: before the first root split the root is a
    // leaf, and it still gets the full treatment.
    let page = btree_page(0, BTP_LEAF | BTP_ROOT, &[(8000, 16)]);
    let mut opts = Options::default();
    opts.skip_leaf_pages = true;

    let out = decode(page, opts).unwrap();
    assert!(out.annotations.len() > 1);
    assert!(out
        .annotations
        .iter()
        .any(|t| t.label == "block 0 (level 0) LSN"));
}

#[test]
fn internal_pages_are_never_skipped() {
    let page = btree_page(1, 0, &[(8000, 16)]);
    let mut opts = Options::default();
    opts.skip_leaf_pages = true;

    let out = decode(page, opts).unwrap();
    assert!(out.annotations.len() > 1);
}

#[test]
fn unsupported_families_report_and_skip_items() {
    // GIN-shaped page: 8-byte special section, no sequence magic.
    let mut page = vec![0u8; PS];
    let special = (PS - GIN_SPECIAL_SIZE) as u16;
    LittleEndian::write_u16(
        &mut page[OFF_PD_LOWER..],
        (PAGE_HEADER_SIZE + ITEM_POINTER_SIZE) as u16,
    );
    LittleEndian::write_u16(&mut page[OFF_PD_UPPER..], 8000);
    LittleEndian::write_u16(&mut page[OFF_PD_SPECIAL..], special);
    LittleEndian::write_u16(
        &mut page[OFF_PD_PAGESIZE_VERSION..],
        PS as u16 & 0xFF00 | PAGE_LAYOUT_VERSION as u16,
    );
    // One normal item that must NOT be decoded.
    let raw = 8000u32 | (u32::from(LP_NORMAL) << 15) | (16u32 << 17);
    LittleEndian::write_u32(&mut page[PAGE_HEADER_SIZE..], raw);

    let mut session = Session::new(PS as u32, 0, Options::default());
    let out = annotate_page(&mut session, &Block::new(0, page, PS as u32)).unwrap();

    assert_eq!(out.special, SpecialKind::Gin);
    assert!(session.failed());
    // Header and directory are annotated; items and special fields are not.
    assert!(out.annotations.iter().any(|t| t.label.contains("lp_len")));
    assert!(!out.annotations.iter().any(|t| t.label.contains("t_tid")));
    assert!(!out.annotations.iter().any(|t| t.label.contains("xmin")));
    assert!(!out.annotations.iter().any(|t| t.label.contains("btpo")));
}

#[test]
fn sequence_special_section_is_reported_unsupported() {
    let mut page = vec![0u8; PS];
    let special = (PS - 8) as u16;
    LittleEndian::write_u16(
        &mut page[OFF_PD_LOWER..],
        (PAGE_HEADER_SIZE + ITEM_POINTER_SIZE) as u16,
    );
    LittleEndian::write_u16(&mut page[OFF_PD_UPPER..], 8000);
    LittleEndian::write_u16(&mut page[OFF_PD_SPECIAL..], special);
    LittleEndian::write_u16(
        &mut page[OFF_PD_PAGESIZE_VERSION..],
        PS as u16 & 0xFF00 | PAGE_LAYOUT_VERSION as u16,
    );
    LittleEndian::write_u32(&mut page[special as usize..], SEQUENCE_MAGIC);
    // The single sequence row, decoded as an ordinary heap tuple.
    let raw = 8000u32 | (u32::from(LP_NORMAL) << 15) | (40u32 << 17);
    LittleEndian::write_u32(&mut page[PAGE_HEADER_SIZE..], raw);
    page[8000 + HEAP_OFF_HOFF] = 24;

    let mut session = Session::new(PS as u32, 0, Options::default());
    let out = annotate_page(&mut session, &Block::new(0, page, PS as u32)).unwrap();

    assert_eq!(out.special, SpecialKind::Sequence);
    assert!(out.annotations.iter().any(|t| t.label == "(0,1) xmin"));
    // Field decoding of the sequence struct itself is unsupported.
    assert!(session.failed());
}

// ---------- helpers ----------

fn btree_page(level: u32, flags: u16, items: &[(usize, usize)]) -> Vec<u8> {
    let mut page = vec![0u8; PS];
    let special = PS - BTREE_SPECIAL_SIZE;
    let lower = (PAGE_HEADER_SIZE + items.len() * ITEM_POINTER_SIZE) as u16;
    let upper = items.iter().map(|(off, _)| *off).min().unwrap_or(special) as u16;
    LittleEndian::write_u16(&mut page[OFF_PD_LOWER..], lower);
    LittleEndian::write_u16(&mut page[OFF_PD_UPPER..], upper);
    LittleEndian::write_u16(&mut page[OFF_PD_SPECIAL..], special as u16);
    LittleEndian::write_u16(
        &mut page[OFF_PD_PAGESIZE_VERSION..],
        PS as u16 & 0xFF00 | PAGE_LAYOUT_VERSION as u16,
    );
    for (slot, (off, len)) in items.iter().enumerate() {
        let raw = (*off as u32) | (u32::from(LP_NORMAL) << 15) | ((*len as u32) << 17);
        let at = PAGE_HEADER_SIZE + slot * ITEM_POINTER_SIZE;
        LittleEndian::write_u32(&mut page[at..], raw);
        LittleEndian::write_u16(&mut page[*off + IDX_OFF_INFO..], *len as u16);
    }
    LittleEndian::write_u32(&mut page[special + BT_OFF_LEVEL..], level);
    LittleEndian::write_u16(&mut page[special + BT_OFF_FLAGS..], flags);
    LittleEndian::write_u16(&mut page[special + BT_OFF_CYCLEID..], 0);
    page
}

fn decode(page: Vec<u8>, opts: Options) -> anyhow::Result<hexpage::PageAnnotations> {
    let mut session = Session::new(PS as u32, 0, opts);
    Ok(annotate_page(&mut session, &Block::new(0, page, PS as u32))?)
}
