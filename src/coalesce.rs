//! Coalescer: fuses a freshly-freed block with adjacent free physical
//! neighbors via boundary tags.

use crate::codec::{get_alloc, get_size, write_footer, write_header};
use crate::freelist::FreeList;
use crate::navigator::{next, prev};

/// Coalesces `block` (already marked free, header/footer already written)
/// with whichever physical neighbors are themselves free, then inserts the
/// resulting block into `free_list`. Returns the resulting block's
/// address, which may differ from `block` if it fused with its left
/// neighbor.
///
/// Relies on there being no other free block adjacent to an allocated one
/// at any rest point: at entry, `block` is the only contiguous free span
/// whose identity is in flux, so each neighbor is either itself
/// free-and-in-the-index, or allocated.
///
/// # Safety
/// `block` must be a valid, currently-free block not yet present in
/// `free_list`. Its neighbors, if free, must already be present in
/// `free_list`.
pub unsafe fn coalesce(free_list: &mut FreeList, block: *mut u8) -> *mut u8 {
    let prev_block = unsafe { prev(block) };
    let next_block = unsafe { next(block) };

    let prev_alloc = prev_block == block || unsafe { get_alloc(prev_block) };
    let next_alloc = unsafe { get_alloc(next_block) };

    let mut size = unsafe { get_size(block) };
    let mut result = block;

    match (prev_alloc, next_alloc) {
        (true, true) => {}
        (true, false) => {
            size += unsafe { get_size(next_block) };
            unsafe { free_list.remove(next_block) };
        }
        (false, true) => {
            size += unsafe { get_size(prev_block) };
            unsafe { free_list.remove(prev_block) };
            result = prev_block;
        }
        (false, false) => {
            size += unsafe { get_size(prev_block) } + unsafe { get_size(next_block) };
            unsafe {
                free_list.remove(prev_block);
                free_list.remove(next_block);
            }
            result = prev_block;
        }
    }

    unsafe {
        write_header(result, size, false);
        write_footer(result, size, false);
        free_list.insert(result);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::write_header;
    use crate::config::WORD_SIZE;

    /// Lays out: prologue (2 words) | block A (free, 48) | block B (free, 48)
    /// | epilogue (1 word), then coalesces B and checks the fusion with A.
    #[test]
    fn coalesces_with_free_left_neighbor() {
        let mut buf = [0u8; 256];
        let base = buf.as_mut_ptr();
        unsafe {
            write_header(base, 0, true);
            write_header(base.add(WORD_SIZE), 0, true);

            let a = base.add(2 * WORD_SIZE);
            write_header(a, 48, false);
            write_footer_test(a, 48);

            let b = a.add(48);
            write_header(b, 48, false);
            write_footer_test(b, 48);

            let epilogue = b.add(48);
            write_header(epilogue, 0, true);

            let mut list = FreeList::new();
            list.insert(a);

            let result = coalesce(&mut list, b);
            assert_eq!(result, a);
            assert_eq!(get_size(result), 96);
            assert!(list.head(crate::freelist::class_of(96)) == a);
        }
    }

    #[test]
    fn no_coalesce_when_both_neighbors_allocated() {
        let mut buf = [0u8; 256];
        let base = buf.as_mut_ptr();
        unsafe {
            write_header(base, 0, true);
            write_header(base.add(WORD_SIZE), 0, true);

            let a = base.add(2 * WORD_SIZE);
            write_header(a, 48, true); // allocated neighbor

            let b = a.add(48);
            write_header(b, 48, false);
            write_footer_test(b, 48);

            let next_block = b.add(48);
            write_header(next_block, 0, true); // epilogue, allocated

            let mut list = FreeList::new();
            let result = coalesce(&mut list, b);
            assert_eq!(result, b);
            assert_eq!(get_size(result), 48);
        }
    }

    unsafe fn write_footer_test(block: *mut u8, size: u64) {
        unsafe { write_footer(block, size, false) };
    }
}
