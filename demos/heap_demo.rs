use std::{alloc::Layout, io::Read, ptr};

use libc::sbrk;
use rallocator::Heap;

/// Waits until the user presses ENTER.
/// Useful when you want to inspect memory state with tools like `pmap`,
/// `htop`, `gdb`, or just visually track allocator behavior step by step.
fn block_until_enter_pressed() {
    println!("\n>>> Press ENTER to continue...");
    let _ = std::io::stdin().bytes().next();
}

/// Prints the real process break via `sbrk(0)`, purely for comparison:
/// this heap lives in its own `mmap`'d region, so the two move
/// independently of one another.
unsafe fn print_program_break(label: &str) {
    println!(
        "[{}] PID = {}, process break (sbrk(0)) = {:?}",
        label,
        std::process::id(),
        unsafe { sbrk(0) },
    );
}

fn main() {
    // Our segregated-fit heap. Holds a lazily-initialized heap region, a
    // segregated free index, and the current prologue/epilogue bookkeeping.
    let mut heap = Heap::new();

    unsafe {
        print_program_break("start");
        block_until_enter_pressed();

        // --------------------------------------------------------------
        // 1) Acquire space for a u32.
        // --------------------------------------------------------------
        let layout_u32 = Layout::new::<u32>();
        let first_block = heap.acquire(layout_u32.size());
        println!("\n[1] Acquire u32 -> {:?}", first_block);

        let first_ptr = first_block as *mut u32;
        first_ptr.write(0xDEADBEEF);
        println!("[1] Value written = 0x{:X}", first_ptr.read());

        block_until_enter_pressed();

        // --------------------------------------------------------------
        // 2) Acquire 12 bytes (an "odd-sized" request).
        // --------------------------------------------------------------
        let layout_12_bytes = Layout::array::<u8>(12).unwrap();
        let second_block = heap.acquire(layout_12_bytes.size());
        println!("\n[2] Acquire [u8; 12] -> {:?}", second_block);
        ptr::write_bytes(second_block, 0xAB, layout_12_bytes.size());
        println!("[2] Initialized second block with 0xAB");

        block_until_enter_pressed();

        // --------------------------------------------------------------
        // 3) Acquire a u64, release it immediately, then acquire again at
        //    the same size: the segregated index should hand back the
        //    very same address instead of growing the heap further.
        // --------------------------------------------------------------
        let layout_u64 = Layout::new::<u64>();
        let third_block = heap.acquire(layout_u64.size());
        println!("\n[3] Acquire u64 -> {:?}", third_block);
        heap.release(third_block);
        println!("[3] Released third_block");

        let reused = heap.acquire(layout_u64.size());
        println!(
            "[3] Re-acquire same size -> {:?} (reused freed slot? {})",
            reused,
            reused == third_block
        );
        assert_eq!(reused, third_block);

        block_until_enter_pressed();

        // --------------------------------------------------------------
        // 4) Release the first two blocks out of order, then acquire a
        //    request exactly sized to show they coalesced into one span.
        // --------------------------------------------------------------
        heap.release(second_block);
        heap.release(first_block);
        println!("\n[4] Released blocks 1 and 2; they should now be one free span");
        assert!(heap.check_invariants(line!()));

        block_until_enter_pressed();

        // --------------------------------------------------------------
        // 5) grow_or_move: allocate small, write a prefix, then grow.
        // --------------------------------------------------------------
        let small = heap.acquire(10);
        ptr::write_bytes(small, 0xCD, 10);
        println!("\n[5] Acquire 10 bytes -> {:?}, filled with 0xCD", small);

        let grown = heap.grow_or_move(small, 200);
        println!("[5] grow_or_move(_, 200) -> {:?}", grown);
        let prefix = std::slice::from_raw_parts(grown, 10);
        println!(
            "[5] prefix preserved? {}",
            prefix.iter().all(|&b| b == 0xCD)
        );

        block_until_enter_pressed();

        // --------------------------------------------------------------
        // 6) Acquire a block large enough to force heap extension.
        // --------------------------------------------------------------
        print_program_break("before large acquire");
        let big = heap.acquire(64 * 1024);
        println!("\n[6] Acquire large 64 KiB block -> {:?}", big);
        print_program_break("after large acquire");
        assert!(heap.check_invariants(line!()));

        block_until_enter_pressed();

        println!("\n[7] End of demo. The heap's own mmap region is reclaimed on exit.");
    }
}
