//! Future returned by [`EventStream::pull`](crate::EventStream::pull)

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use crate::error::StreamError;
use crate::result::IterResult;
use crate::state::Outcome;

/// Pending or already-resolved outcome of a `pull()` call
///
/// The request is placed in the stream's queue when `pull()` is called, not
/// when the future is first polled, so several calls can be outstanding and
/// are matched to arrivals in call order. Dropping an unresolved `Next`
/// abandons its place in the queue without losing the event it would have
/// received.
#[must_use = "an event matched to this request is only observable by awaiting it"]
#[derive(Debug)]
pub struct Next {
    inner: NextInner,
}

#[derive(Debug)]
enum NextInner {
    Ready(Option<Outcome>),
    Waiting(oneshot::Receiver<Outcome>),
}

impl Next {
    pub(crate) fn ready(outcome: Outcome) -> Self {
        Self {
            inner: NextInner::Ready(Some(outcome)),
        }
    }

    pub(crate) fn waiting(rx: oneshot::Receiver<Outcome>) -> Self {
        Self {
            inner: NextInner::Waiting(rx),
        }
    }

    /// Whether the outcome was available when `pull()` was called
    pub fn is_ready(&self) -> bool {
        matches!(self.inner, NextInner::Ready(_))
    }
}

impl Future for Next {
    type Output = Result<IterResult, StreamError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.inner {
            NextInner::Ready(outcome) => {
                Poll::Ready(outcome.take().unwrap_or_else(|| Ok(IterResult::done())))
            }
            NextInner::Waiting(rx) => match Pin::new(rx).poll(cx) {
                Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
                // The stream went away with this request still queued
                Poll::Ready(Err(_)) => Poll::Ready(Ok(IterResult::done())),
                Poll::Pending => Poll::Pending,
            },
        }
    }
}
