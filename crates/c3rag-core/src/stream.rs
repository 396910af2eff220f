//! Lazy, finite, non-restartable sequence of generated text chunks.
//!
//! The consumer drives pacing by pulling chunks. Abandoning the stream is just
//! dropping it: the underlying source (an open HTTP response, say) is dropped
//! first, then the release hooks run. Hooks run exactly once, whether the
//! stream was exhausted, failed, or abandoned.

use std::fmt;
use std::iter::FusedIterator;

use tracing::warn;

use crate::errors::RagResult;

type ChunkSource = Box<dyn Iterator<Item = RagResult<String>> + Send>;
type ReleaseHook = Box<dyn FnOnce(StreamEnd) + Send>;

/// Why a stream stopped producing chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEnd {
    /// The source ran to completion.
    Exhausted,
    /// The source yielded an error; the stream stopped there.
    Failed,
    /// The consumer dropped the stream before it finished.
    Abandoned,
}

pub struct TextStream {
    source: Option<ChunkSource>,
    hooks: Vec<ReleaseHook>,
    emitted: usize,
    end: Option<StreamEnd>,
    interruption_notice: Option<String>,
}

impl TextStream {
    /// Wrap a fallible chunk source.
    pub fn new<I>(source: I) -> Self
    where
        I: Iterator<Item = RagResult<String>> + Send + 'static,
    {
        Self {
            source: Some(Box::new(source)),
            hooks: Vec::new(),
            emitted: 0,
            end: None,
            interruption_notice: None,
        }
    }

    /// A stream over chunks that are already in memory.
    pub fn from_chunks(chunks: Vec<String>) -> Self {
        Self::new(chunks.into_iter().map(Ok))
    }

    /// A single-chunk stream.
    pub fn once(text: impl Into<String>) -> Self {
        Self::from_chunks(vec![text.into()])
    }

    /// Text yielded as the final chunk if the source fails part way, so the
    /// consumer can tell a cut-off answer from a complete one.
    pub fn with_interruption_notice(mut self, notice: impl Into<String>) -> Self {
        self.interruption_notice = Some(notice.into());
        self
    }

    /// Register a hook that runs when the stream is released.
    /// Hooks run in registration order.
    pub fn on_release<F>(mut self, hook: F) -> Self
    where
        F: FnOnce(StreamEnd) + Send + 'static,
    {
        self.hooks.push(Box::new(hook));
        self
    }

    /// Chunks handed to the consumer so far.
    pub fn chunks_emitted(&self) -> usize {
        self.emitted
    }

    /// `Some` once the stream has been released.
    pub fn end(&self) -> Option<StreamEnd> {
        self.end
    }

    /// Drain the remaining chunks into one string.
    pub fn collect_text(self) -> String {
        self.collect()
    }

    fn release(&mut self, end: StreamEnd) {
        if self.end.is_some() {
            return;
        }
        // Drop the source before the hooks so held resources are gone when they run.
        self.source = None;
        self.end = Some(end);
        for hook in self.hooks.drain(..) {
            hook(end);
        }
    }
}

impl Iterator for TextStream {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let source = self.source.as_mut()?;
        match source.next() {
            Some(Ok(chunk)) => {
                self.emitted += 1;
                Some(chunk)
            }
            Some(Err(e)) => {
                warn!(error = %e, emitted = self.emitted, "text stream interrupted");
                self.release(StreamEnd::Failed);
                self.interruption_notice.take()
            }
            None => {
                self.release(StreamEnd::Exhausted);
                None
            }
        }
    }
}

impl FusedIterator for TextStream {}

impl Drop for TextStream {
    fn drop(&mut self) {
        self.release(StreamEnd::Abandoned);
    }
}

impl fmt::Debug for TextStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextStream")
            .field("emitted", &self.emitted)
            .field("end", &self.end)
            .field("hooks", &self.hooks.len())
            .finish()
    }
}
