//! Block navigator: computing physical neighbors in the heap.

use crate::codec::{get_size, read_header, size_of};
use crate::config::WORD_SIZE;

/// Returns the physically next block: `block + size_of(block)`.
///
/// # Safety
/// `block` must be a valid block header inside the heap, and the region
/// `[block, block + size)` must be mapped.
pub unsafe fn next(block: *mut u8) -> *mut u8 {
    unsafe { block.add(get_size(block) as usize) }
}

/// Returns a pointer to the word immediately preceding `block`'s header,
/// the previous block's footer, when one exists.
///
/// # Safety
/// `block - WORD_SIZE` must be a valid, readable word. This holds for every
/// block except one placed at the very start of the provider's region
/// (which never happens here: the prologue always precedes the first real
/// block).
pub unsafe fn prev_footer(block: *mut u8) -> *mut u8 {
    unsafe { block.sub(WORD_SIZE) }
}

/// Returns the physically previous block, by reading the size recorded in
/// its footer.
///
/// At the heap's low edge, the word read is the prologue's zero-size
/// footer, so `prev(block) == block`; callers use this self-loop as the
/// "no previous block" signal.
///
/// # Safety
/// Same as [`prev_footer`].
pub unsafe fn prev(block: *mut u8) -> *mut u8 {
    let footer = unsafe { prev_footer(block) };
    let size = size_of(unsafe { read_header(footer) });
    unsafe { block.sub(size as usize) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::write_header;

    #[test]
    fn next_steps_by_block_size() {
        let mut buf = [0u8; 128];
        let block = buf.as_mut_ptr();
        unsafe {
            write_header(block, 48, true);
            assert_eq!(next(block), block.add(48));
        }
    }

    #[test]
    fn prev_self_loop_at_zero_size_sentinel() {
        // Simulate a prologue: two words of pack(0, true), then a real block.
        let mut buf = [0u8; 128];
        let base = buf.as_mut_ptr();
        unsafe {
            write_header(base, 0, true); // prologue header
            write_header(base.add(WORD_SIZE), 0, true); // prologue footer
            let first_block = base.add(2 * WORD_SIZE);
            write_header(first_block, 48, false);
            assert_eq!(prev(first_block), first_block);
        }
    }
}
