//! Bounded, non-blocking producer/consumer hand-off between the UI and raster threads.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Non-blocking counting semaphore.
#[derive(Debug)]
struct Semaphore {
    count: AtomicUsize,
    limit: usize,
}

impl Semaphore {
    fn new(initial: usize, limit: usize) -> Self {
        Self {
            count: AtomicUsize::new(initial),
            limit,
        }
    }

    fn try_wait(&self) -> bool {
        self.count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |c| c.checked_sub(1))
            .is_ok()
    }

    fn signal(&self) {
        let prev = self.count.fetch_add(1, Ordering::AcqRel);
        debug_assert!(prev < self.limit, "semaphore signalled past its limit");
    }
}

/// Outcome of completing a production.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PipelineProduceResult {
    /// The resource was enqueued.
    pub success: bool,
    /// The queue was empty before this resource was enqueued.
    pub is_first_item: bool,
}

/// Outcome of a consume attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineConsumeResult {
    /// Nothing was queued; the consumer was not called.
    NoneAvailable,
    /// One resource was consumed and the queue is now empty.
    Done,
    /// One resource was consumed and more are queued.
    MoreAvailable,
}

/// Bounded FIFO of resources with at most `depth` items queued or being produced.
///
/// Neither side ever blocks: a producer that finds no free slot drops its frame, and a
/// consumer that finds nothing queued returns [`PipelineConsumeResult::NoneAvailable`].
#[derive(Debug)]
pub struct Pipeline<R> {
    depth: usize,
    empty: Semaphore,
    available: Semaphore,
    queue: Mutex<VecDeque<(R, u64)>>,
    next_trace_id: AtomicU64,
}

impl<R> Pipeline<R> {
    /// Create a pipeline with `depth` slots. Panics when `depth` is zero.
    pub fn new(depth: usize) -> Self {
        assert!(depth > 0, "pipeline depth must be at least 1");
        Self {
            depth,
            empty: Semaphore::new(depth, depth),
            available: Semaphore::new(0, depth),
            queue: Mutex::new(VecDeque::with_capacity(depth)),
            next_trace_id: AtomicU64::new(1),
        }
    }

    /// Maximum number of queued plus in-flight resources.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of queued resources.
    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    /// Return `true` if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    /// Reserve a slot for a new resource, or `None` when the pipeline is full.
    ///
    /// Dropping the continuation without completing it returns the slot.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn produce(&self) -> Option<ProducerContinuation<'_, R>> {
        if !self.empty.try_wait() {
            tracing::trace!("pipeline full, producer dropped");
            return None;
        }
        Some(self.continuation(false))
    }

    /// Like [`Pipeline::produce`], but only when nothing is queued.
    ///
    /// Completion re-checks the queue and drops the resource if another producer got there
    /// first.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn produce_if_empty(&self) -> Option<ProducerContinuation<'_, R>> {
        if !self.is_empty() || !self.empty.try_wait() {
            return None;
        }
        Some(self.continuation(true))
    }

    /// Reserve a slot, run `producer` and enqueue its resource.
    ///
    /// Returns `false` when the pipeline is full or `producer` yields nothing; in both cases
    /// the slot is left free.
    pub fn produce_with(&self, producer: impl FnOnce() -> Option<R>) -> bool {
        let Some(continuation) = self.produce() else {
            return false;
        };
        match producer() {
            Some(resource) => continuation.complete(resource).success,
            None => false,
        }
    }

    /// Pop the oldest resource and hand it to `consumer`, outside the queue lock.
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn consume(&self, consumer: impl FnOnce(R)) -> PipelineConsumeResult {
        if !self.available.try_wait() {
            return PipelineConsumeResult::NoneAvailable;
        }
        let (front, remaining) = {
            let mut queue = self.queue.lock();
            let front = queue.pop_front();
            (front, queue.len())
        };
        let Some((resource, trace_id)) = front else {
            debug_assert!(false, "available count out of sync with queue");
            return PipelineConsumeResult::NoneAvailable;
        };

        tracing::trace!(trace_id, remaining, "pipeline consume");
        {
            let _release = SlotRelease(&self.empty);
            consumer(resource);
        }

        if remaining > 0 {
            PipelineConsumeResult::MoreAvailable
        } else {
            PipelineConsumeResult::Done
        }
    }

    fn continuation(&self, if_empty: bool) -> ProducerContinuation<'_, R> {
        let trace_id = self.next_trace_id.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(trace_id, if_empty, "pipeline slot reserved");
        ProducerContinuation {
            pipeline: self,
            trace_id,
            if_empty,
            completed: false,
        }
    }
}

/// Frees a consumed slot even if the consumer unwinds.
struct SlotRelease<'a>(&'a Semaphore);

impl Drop for SlotRelease<'_> {
    fn drop(&mut self) {
        self.0.signal();
    }
}

/// A reserved pipeline slot. Complete it with a resource or drop it to release the slot.
#[must_use = "dropping a continuation releases its slot without producing"]
#[derive(Debug)]
pub struct ProducerContinuation<'a, R> {
    pipeline: &'a Pipeline<R>,
    trace_id: u64,
    if_empty: bool,
    completed: bool,
}

impl<R> ProducerContinuation<'_, R> {
    /// Trace id attached to the resource once enqueued.
    pub fn trace_id(&self) -> u64 {
        self.trace_id
    }

    /// Enqueue `resource`.
    pub fn complete(mut self, resource: R) -> PipelineProduceResult {
        self.completed = true;
        let pipeline = self.pipeline;
        let result = {
            let mut queue = pipeline.queue.lock();
            if self.if_empty && !queue.is_empty() {
                PipelineProduceResult {
                    success: false,
                    is_first_item: false,
                }
            } else {
                let is_first_item = queue.is_empty();
                queue.push_back((resource, self.trace_id));
                PipelineProduceResult {
                    success: true,
                    is_first_item,
                }
            }
        };

        if result.success {
            pipeline.available.signal();
        } else {
            tracing::trace!(trace_id = self.trace_id, "pipeline not empty, resource dropped");
            pipeline.empty.signal();
        }
        result
    }
}

impl<R> Drop for ProducerContinuation<'_, R> {
    fn drop(&mut self) {
        if !self.completed {
            tracing::trace!(trace_id = self.trace_id, "pipeline slot released unused");
            self.pipeline.empty.signal();
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/pipeline.rs"]
mod tests;
