//! Bounded single-producer single-consumer ring.
//!
//! Hand-off buffer between the pipeline stages. Pushes and pops are
//! lock-free and never block: a full ring rejects the item, an empty
//! ring returns `None`, and the caller decides what dropping means.
//!
//! Each slot carries a readiness flag in addition to the head/tail
//! indices. Publishing an index and making the payload visible are two
//! separate events; the consumer requires both before it reads a slot,
//! and the Release/Acquire pairing on the flag guarantees that a
//! successful pop observes every write that preceded the push.

use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

struct Slot<T> {
    ready: AtomicBool,
    value: UnsafeCell<MaybeUninit<T>>,
}

/// Fixed-capacity FIFO ring for exactly one producer and one consumer.
///
/// The type is `Sync` so both ends can share an `Arc`, but the safety
/// contract is that at most one thread pushes and at most one thread
/// pops at any time. The engine upholds this: `submit_tick` is the
/// sole producer of the market-data ring, the strategy thread its sole
/// consumer and the sole producer of the order ring, and the execution
/// thread the order ring's sole consumer.
pub struct BoundedRing<T> {
    slots: Box<[Slot<T>]>,
    /// Consumer cursor.
    head: AtomicUsize,
    /// Producer cursor.
    tail: AtomicUsize,
}

unsafe impl<T: Send> Send for BoundedRing<T> {}
unsafe impl<T: Send> Sync for BoundedRing<T> {}

impl<T> BoundedRing<T> {
    /// Create a ring that accepts exactly `capacity` unconsumed items.
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "ring capacity must be positive");
        // One pad slot distinguishes full from empty.
        let slots = (0..capacity + 1)
            .map(|_| Slot {
                ready: AtomicBool::new(false),
                value: UnsafeCell::new(MaybeUninit::uninit()),
            })
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Self {
            slots,
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
        }
    }

    /// Usable capacity.
    pub fn capacity(&self) -> usize {
        self.slots.len() - 1
    }

    /// Push without blocking. Returns the item back when the ring is
    /// full, leaving the ring unchanged.
    pub fn try_push(&self, item: T) -> Result<(), T> {
        let tail = self.tail.load(Ordering::Relaxed);
        let next = (tail + 1) % self.slots.len();

        if next == self.head.load(Ordering::Acquire) {
            return Err(item);
        }

        let slot = &self.slots[tail];
        // Safety: `tail` is owned by the single producer and the slot
        // between head and tail is unoccupied, so no other thread
        // touches this cell until `ready` is published below.
        unsafe {
            (*slot.value.get()).write(item);
        }
        slot.ready.store(true, Ordering::Release);
        self.tail.store(next, Ordering::Release);
        Ok(())
    }

    /// Pop without blocking. `None` when the ring is empty or the
    /// producer has published the index but not yet the payload.
    pub fn try_pop(&self) -> Option<T> {
        let head = self.head.load(Ordering::Relaxed);

        if head == self.tail.load(Ordering::Acquire) {
            return None;
        }

        let slot = &self.slots[head];
        if !slot.ready.load(Ordering::Acquire) {
            return None;
        }

        // Safety: the readiness flag was observed with Acquire, so the
        // payload write is visible, and the single consumer owns `head`.
        let item = unsafe { (*slot.value.get()).assume_init_read() };
        slot.ready.store(false, Ordering::Release);
        self.head
            .store((head + 1) % self.slots.len(), Ordering::Release);
        Some(item)
    }

    /// Approximate number of buffered items.
    pub fn len(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        if tail >= head {
            tail - head
        } else {
            self.slots.len() - head + tail
        }
    }

    pub fn is_empty(&self) -> bool {
        self.head.load(Ordering::Acquire) == self.tail.load(Ordering::Acquire)
    }
}

impl<T> Drop for BoundedRing<T> {
    fn drop(&mut self) {
        while self.try_pop().is_some() {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_fifo_order() {
        let ring = BoundedRing::with_capacity(8);
        for i in 0..5 {
            ring.try_push(i).unwrap();
        }
        for i in 0..5 {
            assert_eq!(ring.try_pop(), Some(i));
        }
        assert_eq!(ring.try_pop(), None);
    }

    #[test]
    fn test_drop_on_full_leaves_ring_unchanged() {
        let ring = BoundedRing::with_capacity(2);
        ring.try_push(1).unwrap();
        ring.try_push(2).unwrap();
        assert_eq!(ring.try_push(3), Err(3));
        assert_eq!(ring.len(), 2);
        assert_eq!(ring.try_pop(), Some(1));
        assert_eq!(ring.try_pop(), Some(2));
        assert_eq!(ring.try_pop(), None);
    }

    #[test]
    fn test_capacity_is_usable_capacity() {
        let ring = BoundedRing::with_capacity(3);
        assert_eq!(ring.capacity(), 3);
        assert!(ring.try_push(1).is_ok());
        assert!(ring.try_push(2).is_ok());
        assert!(ring.try_push(3).is_ok());
        assert!(ring.try_push(4).is_err());
    }

    #[test]
    fn test_interleaved_push_pop_wraps() {
        let ring = BoundedRing::with_capacity(2);
        for round in 0..100 {
            ring.try_push(round).unwrap();
            assert_eq!(ring.try_pop(), Some(round));
        }
        assert!(ring.is_empty());
    }

    #[test]
    fn test_pop_drains_owned_strings() {
        let ring = BoundedRing::with_capacity(4);
        ring.try_push("alpha".to_string()).unwrap();
        ring.try_push("beta".to_string()).unwrap();
        assert_eq!(ring.try_pop().as_deref(), Some("alpha"));
        assert_eq!(ring.try_pop().as_deref(), Some("beta"));
    }

    #[test]
    fn test_spsc_cross_thread_preserves_order() {
        const N: u64 = 100_000;
        let ring = Arc::new(BoundedRing::with_capacity(1024));

        let producer = {
            let ring = Arc::clone(&ring);
            std::thread::spawn(move || {
                let mut sent = 0u64;
                while sent < N {
                    if ring.try_push(sent).is_ok() {
                        sent += 1;
                    } else {
                        std::thread::yield_now();
                    }
                }
            })
        };

        let consumer = {
            let ring = Arc::clone(&ring);
            std::thread::spawn(move || {
                let mut expected = 0u64;
                while expected < N {
                    match ring.try_pop() {
                        Some(v) => {
                            assert_eq!(v, expected, "items reordered or duplicated");
                            expected += 1;
                        }
                        None => std::thread::yield_now(),
                    }
                }
            })
        };

        producer.join().unwrap();
        consumer.join().unwrap();
        assert!(ring.is_empty());
    }

    #[test]
    fn test_drop_releases_unconsumed_items() {
        let ring = BoundedRing::with_capacity(4);
        ring.try_push(Arc::new(42)).unwrap();
        let probe = Arc::new(7);
        ring.try_push(Arc::clone(&probe)).unwrap();
        drop(ring);
        assert_eq!(Arc::strong_count(&probe), 1);
    }
}
