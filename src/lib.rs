//! A thread-safe, dynamically-resizing MPMC ring queue, and a typed worker
//! pipeline built on top of it.
//!
//! Any number of producer threads may push fixed-layout elements while any
//! number of consumer threads pop them in insertion order. The queue grows
//! when a push would overflow its current storage and shrinks back down
//! once it is mostly empty, bounded by a configurable floor and ceiling.
//! Producers and consumers are tracked with independent reference counts,
//! so a queue with live producers but no consumers frees its storage
//! immediately, and a queue with live consumers but no producers drains to
//! completion instead of blocking forever.
//!
//! ```
//! use ringpipe::{Queue, QueueConfig};
//!
//! let queue = Queue::<u32>::new(QueueConfig::bounded(64));
//! let producer = queue.producer_handle();
//! let consumer = queue.consumer_handle();
//!
//! producer.push(&[1, 2, 3]);
//! let mut out = [0u32; 3];
//! assert_eq!(consumer.pop(&mut out), 3);
//! assert_eq!(out, [1, 2, 3]);
//! ```
//!
//! [`Pipeline`] chains several queues through worker-thread stages:
//!
//! ```
//! use ringpipe::{Pipeline, Producer};
//!
//! let (head, tail) = Pipeline::start::<i32>(16)
//!     .then(16, |batch: &[i32], out: &Producer<i32>| {
//!         let doubled: Vec<i32> = batch.iter().map(|x| x * 2).collect();
//!         out.push(&doubled);
//!     })
//!     .finish();
//!
//! head.push(&[1, 2, 3]);
//! drop(head);
//!
//! let mut buf = [0i32; 3];
//! assert_eq!(tail.pop(&mut buf), 3);
//! assert_eq!(buf, [2, 4, 6]);
//! ```

mod config;
mod error;
mod handle;
mod invariants;
mod metrics;
mod pipeline;
mod queue;
mod resize;
mod ring_buffer;

pub use config::{QueueConfig, BUILTIN_MIN_CAP, DEFAULT_MIN_CAP};
pub use error::QueueError;
pub use handle::{Consumer, Producer};
pub use metrics::MetricsSnapshot;
pub use pipeline::{Pipeline, PipelineBuilder};
pub use queue::Queue;
