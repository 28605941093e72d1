//! `#[global_allocator]` adapter. The core allocator is single-threaded by
//! design; concurrency is handled entirely at this seam.
//!
//! Wraps a [`Heap`] in a [`Mutex`] and implements [`GlobalAlloc`] over it,
//! the same shape as the sibling `emballoc` crate's
//! `unsafe impl<const N: usize> GlobalAlloc for Allocator<N>`.

use std::alloc::{GlobalAlloc, Layout};
use std::sync::Mutex;

use crate::heap::Heap;

/// A [`Heap`] usable as a process-wide `#[global_allocator]`.
///
/// ```rust,ignore
/// #[global_allocator]
/// static ALLOCATOR: GlobalHeap = GlobalHeap::new();
/// ```
pub struct GlobalHeap {
    inner: Mutex<Heap>,
}

impl GlobalHeap {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(Heap::new()),
        }
    }
}

impl Default for GlobalHeap {
    fn default() -> Self {
        Self::new()
    }
}

// SAFETY: every method takes the lock before touching the inner `Heap`, so
// the single-threaded core is never entered concurrently. `acquire` rounds
// requests up to block granularity, which already satisfies any `Layout`
// whose alignment is at most `config::ALIGNMENT`; larger alignment requests
// are not supported, matching the core's fixed 16-byte alignment.
unsafe impl GlobalAlloc for GlobalHeap {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        if layout.align() > crate::config::ALIGNMENT {
            return std::ptr::null_mut();
        }
        let mut heap = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        heap.acquire(layout.size())
    }

    unsafe fn dealloc(&self, ptr: *mut u8, _layout: Layout) {
        let mut heap = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        heap.release(ptr);
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        if layout.align() > crate::config::ALIGNMENT {
            return std::ptr::null_mut();
        }
        let mut heap = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        heap.grow_or_move(ptr, new_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_dealloc_round_trip() {
        let alloc = GlobalHeap::new();
        unsafe {
            let layout = Layout::array::<u64>(16).unwrap();
            let ptr = alloc.alloc(layout);
            assert!(!ptr.is_null());
            assert_eq!((ptr as usize) % crate::config::ALIGNMENT, 0);
            alloc.dealloc(ptr, layout);
        }
    }

    #[test]
    fn over_aligned_request_returns_null() {
        let alloc = GlobalHeap::new();
        let layout = Layout::from_size_align(64, 64).unwrap();
        unsafe {
            assert!(alloc.alloc(layout).is_null());
        }
    }

    #[test]
    fn realloc_grows_in_place_semantics() {
        let alloc = GlobalHeap::new();
        let layout = Layout::array::<u8>(8).unwrap();
        unsafe {
            let ptr = alloc.alloc(layout);
            assert!(!ptr.is_null());
            *ptr = 7;
            let grown = alloc.realloc(ptr, layout, 64);
            assert!(!grown.is_null());
            assert_eq!(*grown, 7);
            alloc.dealloc(grown, Layout::array::<u8>(64).unwrap());
        }
    }
}
