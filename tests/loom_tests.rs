//! Loom-based concurrency model of the mutex/condvar push-pop handshake.
//!
//! Run with: `cargo test --features loom --test loom_tests --release`
//!
//! Loom exhaustively explores thread interleavings, so the model under test
//! has to be small. Rather than point loom at the real `Queue<T>` (which is
//! built on `std::sync` directly, not swappable), this mirrors the teacher
//! crate's own loom harness: a minimal, capacity-4 reimplementation of the
//! same protocol — one mutex, two condvars, two refcounts — using loom's
//! primitives, just large enough to exercise property 7 (no lost wakeup).

#![cfg(feature = "loom")]

use loom::sync::{Arc, Condvar, Mutex};
use loom::thread;

struct LoomQueueState {
    elem_count: usize,
    producer_refcount: usize,
    consumer_refcount: usize,
}

struct LoomQueue {
    state: Mutex<LoomQueueState>,
    just_pushed: Condvar,
    just_popped: Condvar,
    capacity: usize,
}

impl LoomQueue {
    fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(LoomQueueState {
                elem_count: 0,
                producer_refcount: 1,
                consumer_refcount: 1,
            }),
            just_pushed: Condvar::new(),
            just_popped: Condvar::new(),
            capacity,
        }
    }

    fn push_one(&self) -> bool {
        let mut guard = self.state.lock().unwrap();
        loop {
            if guard.elem_count < self.capacity {
                break;
            }
            if guard.consumer_refcount == 0 {
                return false;
            }
            guard = self.just_popped.wait(guard).unwrap();
        }
        if guard.consumer_refcount == 0 {
            return false;
        }
        guard.elem_count += 1;
        drop(guard);
        self.just_pushed.notify_all();
        true
    }

    fn pop_one(&self) -> bool {
        let mut guard = self.state.lock().unwrap();
        loop {
            if guard.elem_count > 0 {
                break;
            }
            if guard.producer_refcount == 0 {
                return false;
            }
            guard = self.just_pushed.wait(guard).unwrap();
        }
        guard.elem_count -= 1;
        drop(guard);
        self.just_popped.notify_all();
        true
    }

    fn drop_producer(&self) {
        let mut guard = self.state.lock().unwrap();
        guard.producer_refcount -= 1;
        drop(guard);
        self.just_pushed.notify_all();
    }

    fn drop_consumer(&self) {
        let mut guard = self.state.lock().unwrap();
        guard.consumer_refcount -= 1;
        drop(guard);
        self.just_popped.notify_all();
    }
}

/// Two elements pushed by one producer are both received by one consumer,
/// with no deadlock, regardless of interleaving.
#[test]
fn loom_spsc_no_lost_wakeup() {
    loom::model(|| {
        let queue = Arc::new(LoomQueue::new(1));
        let q_producer = Arc::clone(&queue);

        let producer = thread::spawn(move || {
            assert!(q_producer.push_one());
            assert!(q_producer.push_one());
            q_producer.drop_producer();
        });

        let mut received = 0;
        while queue.pop_one() {
            received += 1;
        }

        producer.join().unwrap();
        assert_eq!(received, 2);
    });
}

/// A push blocked on a full queue is woken by the matching pop, under every
/// interleaving loom can generate.
#[test]
fn loom_push_wakes_on_pop() {
    loom::model(|| {
        let queue = Arc::new(LoomQueue::new(1));
        assert!(queue.push_one()); // fills the single slot

        let q_producer = Arc::clone(&queue);
        let producer = thread::spawn(move || {
            assert!(q_producer.push_one());
        });

        assert!(queue.pop_one());
        producer.join().unwrap();
    });
}

/// Dropping the last producer while a pop is waiting releases it with a
/// `false` (end-of-stream) rather than hanging forever.
#[test]
fn loom_pop_wakes_on_last_producer_drop() {
    loom::model(|| {
        let queue = Arc::new(LoomQueue::new(1));

        let q_producer = Arc::clone(&queue);
        let producer = thread::spawn(move || {
            q_producer.drop_producer();
        });

        let popped = queue.pop_one();
        producer.join().unwrap();
        assert!(!popped);
    });
}
