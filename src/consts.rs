//! On-disk layout constants for the supported page format (layout version 4,
//! little-endian, MAXALIGN = 8).

// -------- Page header --------

/// Offset of pd_lsn (u64, stored as two u32 halves).
pub const OFF_PD_LSN: usize = 0;
/// Offset of pd_checksum (u16).
pub const OFF_PD_CHECKSUM: usize = 8;
/// Offset of pd_flags (u16).
pub const OFF_PD_FLAGS: usize = 10;
/// Offset of pd_lower (u16): end of the item directory / start of free space.
pub const OFF_PD_LOWER: usize = 12;
/// Offset of pd_upper (u16): end of free space / start of item storage.
pub const OFF_PD_UPPER: usize = 14;
/// Offset of pd_special (u16): start of the trailing special section.
pub const OFF_PD_SPECIAL: usize = 16;
/// Offset of pd_pagesize_version (u16): size in the high-byte mask, version in the low.
pub const OFF_PD_PAGESIZE_VERSION: usize = 18;
/// Offset of pd_prune_xid (u32).
pub const OFF_PD_PRUNE_XID: usize = 20;

/// Header size up to (not including) the item directory.
pub const PAGE_HEADER_SIZE: usize = 24;

/// The one page layout version this tool decodes.
pub const PAGE_LAYOUT_VERSION: u8 = 4;

// pd_flags bits
pub const PD_HAS_FREE_LINES: u16 = 0x0001;
pub const PD_PAGE_FULL: u16 = 0x0002;
pub const PD_ALL_VISIBLE: u16 = 0x0004;

pub const PD_FLAG_NAMES: &[(u16, &str)] = &[
    (PD_HAS_FREE_LINES, "PD_HAS_FREE_LINES"),
    (PD_PAGE_FULL, "PD_PAGE_FULL"),
    (PD_ALL_VISIBLE, "PD_ALL_VISIBLE"),
];

// -------- Item directory --------

/// Size of one item pointer: a single bit-packed u32.
pub const ITEM_POINTER_SIZE: usize = 4;

// lp_flags values (2 bits)
pub const LP_UNUSED: u8 = 0;
pub const LP_NORMAL: u8 = 1;
pub const LP_REDIRECT: u8 = 2;
pub const LP_DEAD: u8 = 3;

// -------- Special-section signatures --------

/// Magic u32 stored at pd_special on sequence pages.
pub const SEQUENCE_MAGIC: u32 = 0x1717;

/// Largest valid b-tree vacuum cycle id; the trailing u16 of a b-tree page
/// never exceeds it, which is what disambiguates b-tree from hash/GiST.
pub const MAX_BTREE_CYCLE_ID: u16 = 0xFF7F;
/// Trailing-u16 page id of hash index pages.
pub const HASH_PAGE_ID: u16 = 0xFF80;
/// Trailing-u16 page id of GiST index pages.
pub const GIST_PAGE_ID: u16 = 0xFF81;
/// Trailing-u16 page id of SP-GiST index pages.
pub const SPGIST_PAGE_ID: u16 = 0xFF82;

// Special-section struct sizes, already MAXALIGN-rounded.
pub const BTREE_SPECIAL_SIZE: usize = 16;
pub const HASH_SPECIAL_SIZE: usize = 16;
pub const GIST_SPECIAL_SIZE: usize = 16;
pub const GIN_SPECIAL_SIZE: usize = 8;
pub const SPGIST_SPECIAL_SIZE: usize = 8;

// -------- B-tree special section (16 bytes at pd_special) --------

pub const BT_OFF_PREV: usize = 0;
pub const BT_OFF_NEXT: usize = 4;
pub const BT_OFF_LEVEL: usize = 8;
pub const BT_OFF_FLAGS: usize = 12;
pub const BT_OFF_CYCLEID: usize = 14;

// btpo_flags bits
pub const BTP_LEAF: u16 = 1 << 0;
pub const BTP_ROOT: u16 = 1 << 1;
pub const BTP_DELETED: u16 = 1 << 2;
pub const BTP_META: u16 = 1 << 3;
pub const BTP_HALF_DEAD: u16 = 1 << 4;
pub const BTP_SPLIT_END: u16 = 1 << 5;
pub const BTP_HAS_GARBAGE: u16 = 1 << 6;
pub const BTP_INCOMPLETE_SPLIT: u16 = 1 << 7;

pub const BTP_FLAG_NAMES: &[(u16, &str)] = &[
    (BTP_LEAF, "BTP_LEAF"),
    (BTP_ROOT, "BTP_ROOT"),
    (BTP_DELETED, "BTP_DELETED"),
    (BTP_META, "BTP_META"),
    (BTP_HALF_DEAD, "BTP_HALF_DEAD"),
    (BTP_SPLIT_END, "BTP_SPLIT_END"),
    (BTP_HAS_GARBAGE, "BTP_HAS_GARBAGE"),
    (BTP_INCOMPLETE_SPLIT, "BTP_INCOMPLETE_SPLIT"),
];

// -------- B-tree meta struct (24 bytes right after the page header) --------

pub const BTREE_META_MAGIC: u32 = 0x053162;
pub const BTREE_META_SIZE: usize = 24;

pub const BTM_OFF_MAGIC: usize = 0;
pub const BTM_OFF_VERSION: usize = 4;
pub const BTM_OFF_ROOT: usize = 8;
pub const BTM_OFF_LEVEL: usize = 12;
pub const BTM_OFF_FASTROOT: usize = 16;
pub const BTM_OFF_FASTLEVEL: usize = 20;

// -------- Heap tuple header --------

pub const HEAP_OFF_XMIN: usize = 0;
pub const HEAP_OFF_XMAX: usize = 4;
/// t_cid, or t_xvac when the HEAP_MOVED bits are set.
pub const HEAP_OFF_FIELD3: usize = 8;
pub const HEAP_OFF_CTID_BI_HI: usize = 12;
pub const HEAP_OFF_CTID_BI_LO: usize = 14;
pub const HEAP_OFF_CTID_OFFNUM: usize = 16;
pub const HEAP_OFF_INFOMASK2: usize = 18;
pub const HEAP_OFF_INFOMASK: usize = 20;
pub const HEAP_OFF_HOFF: usize = 22;
/// Start of the null bitmap; also the fixed-prefix length of the header.
pub const HEAP_OFF_BITS: usize = 23;

pub const OID_SIZE: usize = 4;

// t_infomask bits
pub const HEAP_HASNULL: u16 = 0x0001;
pub const HEAP_HASVARWIDTH: u16 = 0x0002;
pub const HEAP_HASEXTERNAL: u16 = 0x0004;
pub const HEAP_HASOID: u16 = 0x0008;
pub const HEAP_XMAX_KEYSHR_LOCK: u16 = 0x0010;
pub const HEAP_COMBOCID: u16 = 0x0020;
pub const HEAP_XMAX_EXCL_LOCK: u16 = 0x0040;
pub const HEAP_XMAX_LOCK_ONLY: u16 = 0x0080;
pub const HEAP_XMIN_COMMITTED: u16 = 0x0100;
pub const HEAP_XMIN_INVALID: u16 = 0x0200;
pub const HEAP_XMAX_COMMITTED: u16 = 0x0400;
pub const HEAP_XMAX_INVALID: u16 = 0x0800;
pub const HEAP_XMAX_IS_MULTI: u16 = 0x1000;
pub const HEAP_UPDATED: u16 = 0x2000;
pub const HEAP_MOVED_OFF: u16 = 0x4000;
pub const HEAP_MOVED_IN: u16 = 0x8000;
/// Either of the legacy-vacuum move bits; selects t_xvac over t_cid.
pub const HEAP_MOVED: u16 = HEAP_MOVED_OFF | HEAP_MOVED_IN;

pub const HEAP_INFOMASK_NAMES: &[(u16, &str)] = &[
    (HEAP_HASNULL, "HEAP_HASNULL"),
    (HEAP_HASVARWIDTH, "HEAP_HASVARWIDTH"),
    (HEAP_HASEXTERNAL, "HEAP_HASEXTERNAL"),
    (HEAP_HASOID, "HEAP_HASOID"),
    (HEAP_XMAX_KEYSHR_LOCK, "HEAP_XMAX_KEYSHR_LOCK"),
    (HEAP_COMBOCID, "HEAP_COMBOCID"),
    (HEAP_XMAX_EXCL_LOCK, "HEAP_XMAX_EXCL_LOCK"),
    (HEAP_XMAX_LOCK_ONLY, "HEAP_XMAX_LOCK_ONLY"),
    (HEAP_XMIN_COMMITTED, "HEAP_XMIN_COMMITTED"),
    (HEAP_XMIN_INVALID, "HEAP_XMIN_INVALID"),
    (HEAP_XMAX_COMMITTED, "HEAP_XMAX_COMMITTED"),
    (HEAP_XMAX_INVALID, "HEAP_XMAX_INVALID"),
    (HEAP_XMAX_IS_MULTI, "HEAP_XMAX_IS_MULTI"),
    (HEAP_UPDATED, "HEAP_UPDATED"),
    (HEAP_MOVED_OFF, "HEAP_MOVED_OFF"),
    (HEAP_MOVED_IN, "HEAP_MOVED_IN"),
];

// t_infomask2 bits
pub const HEAP_NATTS_MASK: u16 = 0x07FF;
pub const HEAP_KEYS_UPDATED: u16 = 0x2000;
pub const HEAP_HOT_UPDATED: u16 = 0x4000;
pub const HEAP_ONLY_TUPLE: u16 = 0x8000;

pub const HEAP_INFOMASK2_NAMES: &[(u16, &str)] = &[
    (HEAP_KEYS_UPDATED, "HEAP_KEYS_UPDATED"),
    (HEAP_HOT_UPDATED, "HEAP_HOT_UPDATED"),
    (HEAP_ONLY_TUPLE, "HEAP_ONLY_TUPLE"),
];

// -------- Index tuple --------

/// t_tid (6 bytes) + t_info (u16).
pub const INDEX_TUPLE_HEADER_SIZE: usize = 8;

pub const IDX_OFF_TID_BI_HI: usize = 0;
pub const IDX_OFF_TID_BI_LO: usize = 2;
pub const IDX_OFF_TID_OFFNUM: usize = 4;
pub const IDX_OFF_INFO: usize = 6;

/// Low 13 bits of t_info hold the total tuple size.
pub const INDEX_SIZE_MASK: u16 = 0x1FFF;

// -------- Segments --------

/// Default relation segment size: 1 GiB.
pub const DEFAULT_SEGMENT_SIZE: u64 = 1024 * 1024 * 1024;

// -------- Alignment --------

pub const MAXIMUM_ALIGNOF: usize = 8;
