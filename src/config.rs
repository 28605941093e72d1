//! Compile-time tunables for the allocator core.
//!
//! A handful of named constants rather than a runtime configuration struct,
//! since none of them need to vary per instance.

/// Width of a header/footer word, in bytes. Always 8 regardless of target
/// pointer width, since block metadata is a fixed-width `u64`, not `usize`.
pub const WORD_SIZE: usize = 8;

/// Payload alignment, in bytes. All block sizes are multiples of this.
pub const ALIGNMENT: usize = 16;

/// Smallest possible block: header + two free-list link words + footer.
pub const MIN_BLOCK_SIZE: usize = 32;

/// Bytes requested from the provider when `find_fit` misses and the
/// request itself is smaller than this.
pub const DEFAULT_CHUNK: usize = 4096;

/// Number of size-class buckets in the segregated free index.
pub const NUM_SIZE_CLASSES: usize = 10;

/// Upper bound (inclusive) for each size class, in ascending order. The
/// last entry catches everything larger.
pub const SIZE_CLASS_BOUNDS: [u64; NUM_SIZE_CLASSES] =
    [64, 128, 256, 512, 1024, 2048, 4096, 8192, 16384, u64::MAX];

/// Maximum number of free-list candidates `find_fit` inspects before
/// settling for the best one seen so far.
pub const FIND_FIT_BOUND: usize = 12;

/// Words reserved for the left sentinel at heap initialization. Only the
/// first survives as permanent overhead; the second is scratch that the
/// first call to `extend_heap` immediately reclaims as the header of the
/// first real block, giving `navigator::prev`'s self-loop convention a
/// footer-shaped zero-size word to read at the heap's low edge.
pub const PROLOGUE_WORDS: usize = 2;

/// Size, in words, of the right sentinel: a single zero-sized, allocated
/// header at the current break.
pub const EPILOGUE_WORDS: usize = 1;

/// Upper bound on how large the backing heap region may grow, reserved
/// up front via `mmap`.
pub const MAX_HEAP_BYTES: usize = 100 * 1024 * 1024;

/// Rounds `size` up to the next multiple of `n`.
pub const fn round_up(size: usize, n: usize) -> usize {
    n * ((size + (n - 1)) / n)
}
