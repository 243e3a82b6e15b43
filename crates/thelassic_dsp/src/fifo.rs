//! Spectrum FIFO
//!
//! A single-producer/single-consumer ring of fixed-size audio blocks.
//! The producer is the audio thread: `push` copies one callback's worth
//! of samples, never blocks, never allocates, and overwrites the oldest
//! unread slot when the consumer has fallen behind - bounded staleness is
//! preferred over backpressure on the audio thread, since a dropped
//! analyzer frame is harmless and a stalled callback is not.
//!
//! The two monotonic cursors are the only state shared between the
//! sides. Each slot additionally carries a sequence word (seqlock style)
//! so the consumer can detect a slot torn by a concurrent overwrite and
//! discard it instead of delivering garbage.

use std::cell::UnsafeCell;
use std::sync::atomic::{fence, AtomicU64, Ordering};
use std::sync::Arc;

struct Slot {
    /// `2 * seq + 1` while block `seq` is being written into this slot,
    /// `2 * seq + 2` once it is complete. Strictly increasing per slot.
    stamp: AtomicU64,
    data: UnsafeCell<Box<[f32]>>,
    /// Valid sample count for the current block; the final block of a
    /// stream may be shorter than `block_len`. Guarded by `stamp` like
    /// `data`.
    len: UnsafeCell<usize>,
}

struct Shared {
    slots: Box<[Slot]>,
    /// Sequence number of the next block to write. Producer-only store.
    write_pos: AtomicU64,
    /// Sequence number of the next block to read. Advanced by the
    /// consumer, or by the producer when it steals the oldest slot.
    read_pos: AtomicU64,
    block_len: usize,
}

// Slot data is only accessed under the stamp protocol above; a torn read
// is detected and discarded by the consumer.
unsafe impl Send for Shared {}
unsafe impl Sync for Shared {}

/// Constructor and sizing helpers for the block FIFO
pub struct SpectrumFifo;

impl SpectrumFifo {
    /// Allocate the ring and split it into its two endpoints.
    ///
    /// All allocation happens here, at stream start; both endpoints are
    /// allocation-free afterwards.
    ///
    /// # Panics
    /// Panics if `capacity < 2` or `block_len == 0`.
    pub fn channel(capacity: usize, block_len: usize) -> (FifoProducer, FifoConsumer) {
        assert!(capacity >= 2, "capacity must hold at least two blocks");
        assert!(block_len > 0, "block length must be non-zero");

        let slots = (0..capacity)
            .map(|_| Slot {
                stamp: AtomicU64::new(0),
                data: UnsafeCell::new(vec![0.0; block_len].into_boxed_slice()),
                len: UnsafeCell::new(0),
            })
            .collect();

        let shared = Arc::new(Shared {
            slots,
            write_pos: AtomicU64::new(0),
            read_pos: AtomicU64::new(0),
            block_len,
        });

        (
            FifoProducer {
                shared: Arc::clone(&shared),
            },
            FifoConsumer { shared },
        )
    }

    /// Slot count sized to absorb consumer scheduling jitter: a few
    /// display frames' worth of audio blocks, with a floor for streams
    /// whose blocks are longer than a display frame.
    pub fn capacity_for(sample_rate: f32, block_len: usize, refresh_hz: f32) -> usize {
        let blocks_per_frame = sample_rate / refresh_hz / block_len as f32;
        (blocks_per_frame * 4.0).ceil().max(4.0) as usize
    }
}

/// Audio-thread endpoint
pub struct FifoProducer {
    shared: Arc<Shared>,
}

/// Analysis-thread endpoint
pub struct FifoConsumer {
    shared: Arc<Shared>,
}

impl FifoProducer {
    pub fn block_len(&self) -> usize {
        self.shared.block_len
    }

    /// Copy one block into the ring. Returns `false` when the oldest
    /// unread block was overwritten to make room.
    ///
    /// Blocks may be shorter than the configured block length (a stream
    /// tail); the valid length travels with the slot. Longer blocks are
    /// truncated to the slot size.
    ///
    /// # Real-time Safety
    /// No allocation, no locks, bounded work. Producer-only.
    pub fn push(&mut self, block: &[f32]) -> bool {
        let shared = &*self.shared;
        debug_assert!(block.len() <= shared.block_len, "block exceeds slot size");

        let capacity = shared.slots.len() as u64;
        let w = shared.write_pos.load(Ordering::Relaxed);
        let r = shared.read_pos.load(Ordering::Acquire);

        let mut overwrote = false;
        if w.wrapping_sub(r) >= capacity {
            // Full: steal the oldest slot. A failed exchange means the
            // consumer advanced on its own, which also frees a slot.
            let _ = shared
                .read_pos
                .compare_exchange(r, r + 1, Ordering::AcqRel, Ordering::Relaxed);
            overwrote = true;
        }

        let slot = &shared.slots[(w % capacity) as usize];
        slot.stamp.store(2 * w + 1, Ordering::Relaxed);
        fence(Ordering::Release);

        let count = block.len().min(shared.block_len);
        // Safety: the producer is the only writer of slot data; a reader
        // racing with this copy sees the odd stamp and discards its copy.
        unsafe {
            let dst = (*slot.data.get()).as_mut_ptr();
            std::ptr::copy_nonoverlapping(block.as_ptr(), dst, count);
            *slot.len.get() = count;
        }

        slot.stamp.store(2 * w + 2, Ordering::Release);
        shared.write_pos.store(w + 1, Ordering::Release);
        !overwrote
    }
}

impl FifoConsumer {
    pub fn block_len(&self) -> usize {
        self.shared.block_len
    }

    /// Approximate number of blocks currently ready to pop
    pub fn len(&self) -> usize {
        let w = self.shared.write_pos.load(Ordering::Acquire);
        let r = self.shared.read_pos.load(Ordering::Acquire);
        w.saturating_sub(r) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy the oldest ready block into `out` and return its monotonic
    /// sequence number plus the number of valid samples, or `None` when
    /// the ring is empty. Never blocks.
    ///
    /// Only the first `len` samples of `out` belong to the popped block;
    /// anything past them is left over from earlier pops.
    ///
    /// Blocks overwritten by the producer are skipped, so consecutive
    /// calls yield strictly increasing, possibly gapped sequence numbers.
    pub fn pop(&mut self, out: &mut [f32]) -> Option<(u64, usize)> {
        let shared = &*self.shared;
        debug_assert_eq!(out.len(), shared.block_len);
        let capacity = shared.slots.len() as u64;

        loop {
            let r = shared.read_pos.load(Ordering::Relaxed);
            let w = shared.write_pos.load(Ordering::Acquire);
            if r == w {
                return None;
            }

            let slot = &shared.slots[(r % capacity) as usize];
            let expected = 2 * r + 2;

            if slot.stamp.load(Ordering::Acquire) != expected {
                // The producer has already begun recycling this slot; it
                // also advanced the read cursor, so reload and retry.
                continue;
            }

            // Safety: a concurrent overwrite is detected by the stamp
            // re-check below and the copy is discarded.
            let len = unsafe {
                let len = (*slot.len.get()).min(out.len());
                let src = (*slot.data.get()).as_ptr();
                std::ptr::copy_nonoverlapping(src, out.as_mut_ptr(), len);
                len
            };
            fence(Ordering::Acquire);

            if slot.stamp.load(Ordering::Relaxed) == expected
                && shared
                    .read_pos
                    .compare_exchange(r, r + 1, Ordering::AcqRel, Ordering::Relaxed)
                    .is_ok()
            {
                return Some((r, len));
            }
            // Torn copy or slot stolen mid-read: retry with a fresh cursor.
        }
    }
}
