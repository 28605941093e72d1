//! # rallocator - A Segregated-Fit Memory Allocator Core
//!
//! This crate provides a **segregated free-list allocator** core: a
//! general-purpose `malloc`/`free`/`realloc`/`calloc`-style allocator
//! operating over a single, contiguous, monotonically growing heap region.
//!
//! ## Overview
//!
//! Free blocks are bucketed by size class into a segregated index. Requests
//! are satisfied by a bounded best-fit search within that index; freed
//! blocks are fused with free physical neighbors via boundary tags so the
//! heap never fragments into unusably small adjacent free spans:
//!
//! ```text
//!   Segregated-Fit Heap:
//!
//!   ┌──────────────────────────────────────────────────────────────────┐
//!   │ pro │ alloc │  free  │ alloc │     free      │ alloc │ epi       │
//!   └──────────────────────────────────────────────────────────────────┘
//!             ▲        │
//!             └────────┘  free blocks are also linked into one of
//!                         NUM_SIZE_CLASSES buckets by size, independent
//!                         of their physical position in the heap.
//!
//!   acquire(n):  bucket(n) -> best-fit scan (bounded) -> split-or-consume
//!   release(p):  mark free -> fuse with free physical neighbors -> re-bucket
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//!   rallocator
//!   ├── config     - compile-time tunables (alignment, chunk size, K, ...)
//!   ├── codec      - header/footer pack and unpack
//!   ├── navigator  - physical next/prev block computation
//!   ├── freelist   - segregated free index (bucket heads, intrusive links)
//!   ├── placement  - bounded best-fit search and split/consume
//!   ├── coalesce   - boundary-tag fusion of free physical neighbors
//!   ├── provider   - external, brk-style heap-region backing store
//!   ├── heap       - public surface: acquire/release/grow_or_move/...
//!   └── global     - `GlobalAlloc` adapter for `#[global_allocator]` use
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rallocator::Heap;
//!
//! fn main() {
//!     let mut heap = Heap::new();
//!
//!     unsafe {
//!         let p = heap.acquire(64);
//!         assert!(!p.is_null());
//!         *(p as *mut u64) = 42;
//!         heap.release(p);
//!     }
//! }
//! ```
//!
//! ## How It Works
//!
//! The heap region itself is provided by [`provider::Provider`], which
//! reserves one `mmap`'d span up front and simulates `sbrk` within it,
//! the same role the process break plays for a real `malloc`, without two
//! allocator instances colliding on global process state.
//!
//! Each block carries an 8-byte header and, while free, an 8-byte footer
//! with a matching size/alloc-bit word, so any block's physical neighbors
//! can be found in O(1) from either direction:
//!
//! ```text
//!   Allocated block:                Free block:
//!   ┌─────────────────┐             ┌─────────────────┐
//!   │ header (8 bytes)│             │ header (8 bytes)│
//!   ├─────────────────┤             ├─────────────────┤
//!   │                 │             │ next (8 bytes)  │
//!   │  payload        │             ├─────────────────┤
//!   │                 │             │ prev (8 bytes)  │
//!   │                 │             ├─ ─ ─ ─ ─ ─ ─ ─ ─┤
//!   │                 │             │      ...        │
//!   ├─────────────────┤             ├─────────────────┤
//!   │  (no footer)    │             │ footer (8 bytes)│
//!   └─────────────────┘             └─────────────────┘
//! ```
//!
//! ## Features
//!
//! - **Segregated free index**: O(1) bucket lookup by size class, bounded
//!   best-fit search within a bucket
//! - **Boundary-tag coalescing**: O(1) fusion with free physical neighbors
//!   on release
//! - **brk-style growth**: the heap only grows; a dedicated [`heap::Heap`]
//!   instance owns its own region via [`provider::Provider`]
//! - **Classic C-ABI surface**: `acquire`/`release`/`grow_or_move`/
//!   `zero_acquire` return raw pointers, null on failure, no panics
//!
//! ## Limitations
//!
//! - **Single-threaded core**: [`heap::Heap`] itself carries no
//!   synchronization; wrap it in [`global::GlobalHeap`] (or your own mutex)
//!   for concurrent or `#[global_allocator]` use
//! - **No shrinkage**: the heap only grows; freed space is reused in place
//!   but never returned to the OS
//! - **Unix-only**: [`provider::Provider`] uses `libc::mmap`/`munmap`
//!
//! ## Safety
//!
//! This crate is inherently unsafe as it deals with raw memory management.
//! Every function that reads or writes through a block pointer is `unsafe`;
//! callers are responsible for only ever operating on pointers this crate
//! itself produced.

pub mod coalesce;
pub mod codec;
pub mod config;
pub mod freelist;
pub mod global;
pub mod heap;
pub mod navigator;
pub mod placement;
pub mod provider;

pub use global::GlobalHeap;
pub use heap::Heap;
