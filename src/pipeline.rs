//! A typed builder chaining queues through worker-thread stages.
//!
//! The C source this crate reimplements built pipelines from a variadic
//! `(stage_fn, elem_size)*` argument list, checked only at runtime, with a
//! documented but unenforced rule that a stage taking elem_size `0` meant
//! "drain and discard" — a silent footgun if a stage accidentally forgot a
//! downstream consumer. `PipelineBuilder<Head, Cur>` replaces both: the
//! chain's element types are checked at compile time by `.then()`, and the
//! drain-and-discard case becomes the explicit `.sink()` operation instead
//! of an implicit, size-zero special case.

use std::thread;

use crate::config::QueueConfig;
use crate::handle::{Consumer, Producer};
use crate::queue::Queue;

/// Elements moved through a pipeline stage per pop, matching the source's
/// `BUFFER_SIZE`.
const BATCH_SIZE: usize = 32;

/// Entry point for building a pipeline.
pub struct Pipeline;

impl Pipeline {
    /// Creates the head queue of a new pipeline and returns a builder whose
    /// head and tail are both that queue's handles.
    #[must_use]
    pub fn start<T0>(limit: usize) -> PipelineBuilder<T0, T0>
    where
        T0: Copy + Send + 'static,
    {
        let queue = Queue::new(QueueConfig::bounded(limit));
        let head = queue.producer_handle();
        let tail = queue.consumer_handle();
        drop(queue);
        tracing::debug!(limit, "pipeline head stage created");
        PipelineBuilder { head, tail }
    }
}

/// A pipeline under construction: `Head` is the element type accepted at
/// the very first stage, `Cur` is the element type the current tail yields.
pub struct PipelineBuilder<Head, Cur> {
    head: Producer<Head>,
    tail: Consumer<Cur>,
}

impl<Head, Cur> PipelineBuilder<Head, Cur>
where
    Cur: Copy + Default + Send + 'static,
{
    /// Appends a stage: a new `Queue<Out>` is created with `limit`, and a
    /// worker thread is spawned that pops batches from the current tail,
    /// calls `stage_fn` with each batch and a producer into the new queue,
    /// and exits (dropping both its handles) once a pop returns zero.
    pub fn then<Out, F>(self, limit: usize, stage_fn: F) -> PipelineBuilder<Head, Out>
    where
        Out: Copy + Send + 'static,
        F: Fn(&[Cur], &Producer<Out>) + Send + 'static,
    {
        let queue = Queue::new(QueueConfig::bounded(limit));
        let producer_out = queue.producer_handle();
        let tail_out = queue.consumer_handle();
        drop(queue);

        let consumer_in = self.tail;
        thread::spawn(move || {
            let mut batch = [Cur::default(); BATCH_SIZE];
            loop {
                let n = consumer_in.pop(&mut batch);
                if n == 0 {
                    break;
                }
                stage_fn(&batch[..n], &producer_out);
            }
            tracing::debug!("pipeline stage exiting, no more upstream producers");
        });

        PipelineBuilder { head: self.head, tail: tail_out }
    }

    /// Terminates the pipeline without a consumer-visible tail: spawns a
    /// worker that drains and discards the current tail until end-of-stream,
    /// and returns only the head producer.
    ///
    /// This is the explicit replacement for the source's zero-`elem_size`
    /// stage: every element produced upstream is still popped (so no stage
    /// blocks forever pushing into a buffer nobody drains), it is simply not
    /// observable by the caller.
    #[must_use]
    pub fn sink(self) -> Producer<Head> {
        let consumer_in = self.tail;
        thread::spawn(move || {
            let mut batch = [Cur::default(); BATCH_SIZE];
            while consumer_in.pop(&mut batch) > 0 {}
            tracing::debug!("pipeline sink exiting, no more upstream producers");
        });
        self.head
    }
}

impl<Head, Cur> PipelineBuilder<Head, Cur> {
    /// Finishes the pipeline, returning the head producer and the current
    /// tail consumer.
    #[must_use]
    pub fn finish(self) -> (Producer<Head>, Consumer<Cur>) {
        (self.head, self.tail)
    }
}
