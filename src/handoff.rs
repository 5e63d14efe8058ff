//! Resource handoff
//!
//! The external resource a tree is synchronized into (a posted message, say)
//! is created once, asynchronously, outside this crate. [`Handoff`] lets that
//! code hand the resource back while anything holding the session can read it
//! ([`Handoff::current`]) or wait for it ([`Handoff::wait`]).
//!
//! The first [`provide`](Handoff::provide) wins; later calls are ignored.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::OnceLock;
use std::task::{Context, Poll};

use futures_channel::oneshot;
use futures_util::FutureExt;
use futures_util::future::Shared;
use parking_lot::Mutex;

use crate::error::{RenderError, RenderResult};

/// One-shot slot for an externally created resource
pub struct Handoff<R: Clone> {
    resource: OnceLock<R>,
    sender: Mutex<Option<oneshot::Sender<R>>>,
    receiver: Shared<oneshot::Receiver<R>>,
}

impl<R: Clone> Handoff<R> {
    pub fn new() -> Self {
        let (sender, receiver) = oneshot::channel();
        Self {
            resource: OnceLock::new(),
            sender: Mutex::new(Some(sender)),
            receiver: receiver.shared(),
        }
    }

    /// Fix the resource and wake every waiter.
    ///
    /// Returns `false` (and drops `resource`) if a resource was already provided.
    pub fn provide(&self, resource: R) -> bool {
        let Some(sender) = self.sender.lock().take() else {
            return false;
        };
        // visible to `current` before any waiter wakes
        let _ = self.resource.set(resource.clone());
        // the receiver lives as long as `self`, so this cannot fail
        let _ = sender.send(resource);
        true
    }

    /// The resource, if provided. Never blocks.
    #[inline]
    pub fn current(&self) -> Option<&R> {
        self.resource.get()
    }

    /// Whether a resource has been provided
    #[inline]
    pub fn is_provided(&self) -> bool {
        self.resource.get().is_some()
    }

    /// Future resolving to the resource.
    ///
    /// Resolves immediately if already provided. Every waiter observes the
    /// same value.
    pub fn wait(&self) -> ResourceFuture<R> {
        ResourceFuture {
            inner: self.receiver.clone(),
        }
    }
}

impl<R: Clone> Default for Handoff<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Clone + fmt::Debug> fmt::Debug for Handoff<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handoff")
            .field("resource", &self.resource.get())
            .finish_non_exhaustive()
    }
}

/// Future returned by [`Handoff::wait`].
///
/// Fails with [`RenderError::Abandoned`] only if the handoff is dropped
/// before a resource is provided. There is no other cancellation: drop the
/// future to stop waiting.
#[must_use = "futures do nothing unless polled"]
pub struct ResourceFuture<R: Clone> {
    inner: Shared<oneshot::Receiver<R>>,
}

impl<R: Clone> Future for ResourceFuture<R> {
    type Output = RenderResult<R>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner
            .poll_unpin(cx)
            .map(|result| result.map_err(|_| RenderError::Abandoned))
    }
}
