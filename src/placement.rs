//! Placement policy and find-fit.

use crate::codec::{get_size, write_footer, write_header};
use crate::config::{FIND_FIT_BOUND, MIN_BLOCK_SIZE};
use crate::freelist::FreeList;
use crate::navigator::next;

/// Searches the free index for a block able to satisfy `asize`.
///
/// Starts at `asize`'s own size class and walks buckets in ascending
/// order; within a bucket, tracks the best (smallest leftover) candidate
/// seen. Stops early once [`FIND_FIT_BOUND`] candidates have been
/// inspected, returning the best found so far. Returns `None` if no
/// bucket holds a block large enough.
///
/// # Safety
/// Every block reachable from `free_list`'s buckets must be a valid,
/// currently-free block.
pub unsafe fn find_fit(free_list: &FreeList, asize: u64) -> Option<*mut u8> {
    let start_class = crate::freelist::class_of(asize);
    let mut best: Option<*mut u8> = None;
    let mut best_diff = u64::MAX;
    let mut inspected = 0usize;

    for class in start_class..free_list.num_buckets() {
        let mut block = free_list.head(class);
        while !block.is_null() {
            let size = unsafe { get_size(block) };
            if size >= asize {
                let diff = size - asize;
                if diff < best_diff {
                    best = Some(block);
                    best_diff = diff;
                }
                inspected += 1;
                if inspected >= FIND_FIT_BOUND {
                    return best;
                }
            }
            block = unsafe { crate::freelist::next_of(block) };
        }
    }
    best
}

/// Converts a free `block` of size `csize` into an allocated block sized
/// `asize`, splitting off a free remainder when the leftover is at least
/// [`MIN_BLOCK_SIZE`].
///
/// `block` must already have been removed from `free_list`; on split, the
/// remainder is inserted back in.
///
/// # Safety
/// `block` must be a valid free block with `csize == get_size(block)` and
/// `csize >= asize`.
pub unsafe fn place(free_list: &mut FreeList, block: *mut u8, asize: u64) {
    let csize = unsafe { get_size(block) };
    debug_assert!(csize >= asize);

    if csize - asize >= MIN_BLOCK_SIZE as u64 {
        unsafe {
            write_header(block, asize, true);
            write_footer(block, asize, true);

            let remainder = next(block);
            let remaining_size = csize - asize;
            write_header(remainder, remaining_size, false);
            write_footer(remainder, remaining_size, false);
            free_list.insert(remainder);
        }
    } else {
        unsafe {
            write_header(block, csize, true);
            write_footer(block, csize, true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{get_alloc, write_header};

    #[test]
    fn find_fit_picks_best_of_candidates_in_one_bucket() {
        let mut bufs: Vec<[u8; 64]> = vec![[0u8; 64]; 3];
        let blocks: Vec<*mut u8> = bufs
            .iter_mut()
            .zip([48u64, 64, 32])
            .map(|(buf, size)| {
                let block = buf.as_mut_ptr();
                unsafe { write_header(block, size, false) };
                block
            })
            .collect();

        let mut list = FreeList::new();
        unsafe {
            for &b in &blocks {
                list.insert(b);
            }
            // Requesting 32 bytes, the 32-byte block is a perfect fit.
            let found = find_fit(&list, 32).unwrap();
            assert_eq!(get_size(found), 32);
        }
    }

    #[test]
    fn place_splits_when_remainder_is_large_enough() {
        let mut buf = [0u8; 128];
        let block = buf.as_mut_ptr();
        unsafe {
            write_header(block, 96, false);
        }
        let mut list = FreeList::new();
        unsafe {
            place(&mut list, block, 48);
            assert_eq!(get_size(block), 48);
            assert!(get_alloc(block));

            let remainder = next(block);
            assert_eq!(get_size(remainder), 48);
            assert!(!get_alloc(remainder));
        }
    }

    #[test]
    fn place_consumes_whole_block_when_remainder_too_small() {
        let mut buf = [0u8; 64];
        let block = buf.as_mut_ptr();
        unsafe {
            write_header(block, 48, false);
        }
        let mut list = FreeList::new();
        unsafe {
            // asize 32, leftover 16 < MIN_BLOCK_SIZE(32): no split.
            place(&mut list, block, 32);
            assert_eq!(get_size(block), 48);
            assert!(get_alloc(block));
        }
    }
}
