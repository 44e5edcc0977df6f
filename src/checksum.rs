//! Page checksum (FNV-1a derivative).
//!
//! The engine's page checksum runs 32 parallel FNV-1a-style lanes over the
//! page's u32 words, mixes in two rounds of zeroes, xor-folds the lanes,
//! adds the block number to catch transposed pages, and squeezes the result
//! into a non-zero u16. The checksum field itself is excluded by computing
//! over a copy of the page with pd_checksum zeroed.
//!
//! Only the pass/fail result feeds into decoding; verification runs only
//! when the full page was read.

use byteorder::{ByteOrder, LittleEndian};

use crate::consts::OFF_PD_CHECKSUM;

const N_SUMS: usize = 32;
const FNV_PRIME: u32 = 16777619;

/// Per-lane seeds; chosen once by the storage engine, fixed forever.
const BASE_OFFSETS: [u32; N_SUMS] = [
    0x5B1F36E9, 0xB8525960, 0x02AB50AA, 0x1DE66D2A, 0x79FF467A, 0x9BB9F8A3, 0x217E7CD2, 0x83E13D2C,
    0xF8D4474F, 0xE39EB970, 0x42C6AE16, 0x993216FA, 0x7B093B5D, 0x98DAFF3C, 0xF718902A, 0x0B1C9CDB,
    0xE58F764B, 0x187636BC, 0x5D7B3BB1, 0xE73DE7DE, 0x92BEC979, 0xCCA6C0B2, 0x304A0979, 0x85AA43D4,
    0x783125BB, 0x6CA8EAA2, 0xE407EAC6, 0x4B5CFC3E, 0x9FBF8C76, 0x15CA20BE, 0xF2CA9FD3, 0x959BD756,
];

#[inline]
fn mix(sum: u32, value: u32) -> u32 {
    let tmp = sum ^ value;
    tmp.wrapping_mul(FNV_PRIME) ^ (tmp >> 17)
}

fn checksum_block(data: &[u8]) -> u32 {
    let mut sums = BASE_OFFSETS;

    let words = data.len() / 4;
    let rounds = words / N_SUMS;
    for i in 0..rounds {
        for (j, sum) in sums.iter_mut().enumerate() {
            let off = (i * N_SUMS + j) * 4;
            *sum = mix(*sum, LittleEndian::read_u32(&data[off..off + 4]));
        }
    }

    // Two rounds of zeroes for extra mixing of the last data words.
    for _ in 0..2 {
        for sum in sums.iter_mut() {
            *sum = mix(*sum, 0);
        }
    }

    sums.iter().fold(0, |acc, s| acc ^ s)
}

/// Checksum of a full page as it would be stored in pd_checksum.
/// `blkno` is the block's position in the whole relation (segment-adjusted).
pub fn checksum_page(page: &[u8], blkno: u32) -> u16 {
    let mut copy = page.to_vec();
    copy[OFF_PD_CHECKSUM] = 0;
    copy[OFF_PD_CHECKSUM + 1] = 0;

    let mut checksum = checksum_block(&copy);
    checksum ^= blkno;

    // Never zero, so an unset checksum field is always a mismatch.
    ((checksum % 65535) + 1) as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::{ByteOrder, LittleEndian};

    fn sample_page() -> Vec<u8> {
        let mut page = vec![0u8; 8192];
        for (i, chunk) in page.chunks_mut(4).enumerate() {
            LittleEndian::write_u32(chunk, i as u32 ^ 0xDEADBEEF);
        }
        page
    }

    #[test]
    fn checksum_is_nonzero_and_stable() {
        let page = sample_page();
        let a = checksum_page(&page, 0);
        let b = checksum_page(&page, 0);
        assert_ne!(a, 0);
        assert_eq!(a, b);
    }

    #[test]
    fn checksum_field_itself_is_excluded() {
        let mut page = sample_page();
        let before = checksum_page(&page, 0);
        LittleEndian::write_u16(&mut page[OFF_PD_CHECKSUM..OFF_PD_CHECKSUM + 2], 0x1234);
        assert_eq!(checksum_page(&page, 0), before);
    }

    #[test]
    fn block_number_changes_checksum() {
        let page = sample_page();
        assert_ne!(checksum_page(&page, 0), checksum_page(&page, 1));
    }

    #[test]
    fn data_changes_checksum() {
        let mut page = sample_page();
        let before = checksum_page(&page, 0);
        page[4000] ^= 0x01;
        assert_ne!(checksum_page(&page, 0), before);
    }
}
