//! Progress-callback trait for workflow events.
//!
//! Inject an [`Arc<dyn WorkflowProgressCallback>`] via
//! [`crate::config::StudyAidConfigBuilder::progress_callback`] to observe a
//! request as it moves from the primary tool to the local fallback and
//! through each chunk.
//!
//! # Example
//!
//! ```rust
//! use studyaid::{StudyAidConfig, WorkflowProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct ChunkCounter {
//!     done: AtomicUsize,
//! }
//!
//! impl WorkflowProgressCallback for ChunkCounter {
//!     fn on_chunk_complete(&self, chunk: usize, total_chunks: usize) {
//!         self.done.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("chunk {}/{}", chunk + 1, total_chunks);
//!     }
//! }
//!
//! let config = StudyAidConfig::builder()
//!     .progress_callback(Arc::new(ChunkCounter { done: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use crate::output::{GenerationSource, Task};
use std::sync::Arc;

/// Called by the workflows as a request progresses.
///
/// All methods default to no-ops. Implementations must be `Send + Sync`:
/// one `StudyAid` can serve concurrent requests.
pub trait WorkflowProgressCallback: Send + Sync {
    /// The primary tool is about to be spawned.
    fn on_primary_start(&self, task: Task) {
        let _ = task;
    }

    /// The primary tool failed; `reason` is its rendered error.
    fn on_primary_failed(&self, task: Task, reason: &str) {
        let _ = (task, reason);
    }

    /// The local fallback is starting on `total_chunks` chunks.
    fn on_fallback_start(&self, task: Task, total_chunks: usize) {
        let _ = (task, total_chunks);
    }

    /// One chunk (0-indexed) was processed by the local model.
    fn on_chunk_complete(&self, chunk: usize, total_chunks: usize) {
        let _ = (chunk, total_chunks);
    }

    /// The local model output for a chunk could not be parsed.
    fn on_chunk_warning(&self, chunk: usize, detail: &str) {
        let _ = (chunk, detail);
    }

    /// The request finished successfully.
    fn on_workflow_complete(&self, task: Task, source: GenerationSource) {
        let _ = (task, source);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl WorkflowProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::StudyAidConfig`].
pub type ProgressCallback = Arc<dyn WorkflowProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        chunks: AtomicUsize,
        warnings: AtomicUsize,
        fallback_total: AtomicUsize,
    }

    impl WorkflowProgressCallback for TrackingCallback {
        fn on_fallback_start(&self, _task: Task, total_chunks: usize) {
            self.fallback_total.store(total_chunks, Ordering::SeqCst);
        }

        fn on_chunk_complete(&self, _chunk: usize, _total_chunks: usize) {
            self.chunks.fetch_add(1, Ordering::SeqCst);
        }

        fn on_chunk_warning(&self, _chunk: usize, _detail: &str) {
            self.warnings.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_primary_start(Task::Summary);
        cb.on_primary_failed(Task::Summary, "exit 1");
        cb.on_fallback_start(Task::Summary, 3);
        cb.on_chunk_complete(0, 3);
        cb.on_chunk_warning(1, "no marker");
        cb.on_workflow_complete(Task::Summary, GenerationSource::LocalFallback);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();
        tracker.on_fallback_start(Task::Flashcards, 2);
        tracker.on_chunk_complete(0, 2);
        tracker.on_chunk_warning(1, "no marker");
        tracker.on_chunk_complete(1, 2);

        assert_eq!(tracker.fallback_total.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.chunks.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.warnings.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_primary_start(Task::Flashcards);
    }
}
