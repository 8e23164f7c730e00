//! # Access and overhead kernels
//!
//! Both kernels are the same strided loop, instantiated twice through a `const TOUCH: bool`
//! parameter. The access kernel reads and writes back every touched word; the overhead kernel
//! runs the identical loop and counter bookkeeping without the memory operation, so subtracting
//! its time leaves only the cost of the accesses.
//!
//! The loop counter goes through [`black_box`] and the touch through volatile accesses, which keeps
//! the optimizer from collapsing either loop even in release builds.
use crate::clock::Clock;
use crate::format_size;
use log::info;
use std::hint::black_box;
use std::ptr;

/// Element type of the sweep buffer
pub type Word = u32;

/// Size in bytes of one [`Word`], used to report sizes and strides in bytes
pub const WORD_BYTES: usize = std::mem::size_of::<Word>();

/// Fixed buffer every kernel invocation strides through. Allocated once, never resized.
pub struct Buffer {
    words: Box<[Word]>,
}

impl Buffer {
    /// Allocate a zeroed buffer of `len` words
    pub fn new(len: usize) -> Self {
        let words = vec![0 as Word; len].into_boxed_slice();
        info!(
            "Allocated sweep buffer of {} words ({})",
            len,
            format_size((len * WORD_BYTES) as f32)
        );
        Buffer { words }
    }

    pub fn as_slice(&self) -> &[Word] {
        &self.words
    }

    /// Time `repeat` passes over the first `size` words, reading and writing back every
    /// `stride`-th word. Returns elapsed nanoseconds.
    pub fn access<C: Clock>(&mut self, clock: &C, size: usize, stride: usize, repeat: usize) -> u64 {
        strided_pass::<C, true>(clock, &mut self.words, size, stride, repeat)
    }

    /// Time the same loop as [`Buffer::access`] with the memory touch left out
    pub fn overhead<C: Clock>(
        &mut self,
        clock: &C,
        size: usize,
        stride: usize,
        repeat: usize,
    ) -> u64 {
        strided_pass::<C, false>(clock, &mut self.words, size, stride, repeat)
    }
}

/// Shared loop body of both kernels. `TOUCH` is the only difference between them.
#[inline(never)]
fn strided_pass<C: Clock, const TOUCH: bool>(
    clock: &C,
    words: &mut [Word],
    size: usize,
    stride: usize,
    repeat: usize,
) -> u64 {
    assert!(size <= words.len(), "working set exceeds buffer");
    assert!(stride > 0, "stride must be non-zero");
    let base = words.as_mut_ptr();
    let mut tmp: u32 = 0;

    let start = clock.now();
    for _ in 0..repeat {
        let mut i = 0;
        while i < size {
            tmp = black_box(tmp.wrapping_add(1));
            if TOUCH {
                // SAFETY: i < size <= words.len()
                unsafe {
                    let word = base.add(i);
                    ptr::write_volatile(word, ptr::read_volatile(word));
                }
            }
            i += stride;
        }
    }
    let stop = clock.now();

    black_box(tmp);
    stop.saturating_sub(start)
}
