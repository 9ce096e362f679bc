//! Push-to-pull state machine
//!
//! Two FIFO queues meet here: events pushed by the source and requests
//! pulled by the consumer. An arriving event is handed to the oldest live
//! request if one is waiting, otherwise it is buffered; a `next` call takes
//! the oldest buffered event if there is one, otherwise it queues a
//! request. So at most one of the two queues is ever non-empty.

use std::collections::VecDeque;

use event_source::Value;
use tokio::sync::oneshot;
use tracing::trace;

use crate::error::StreamError;
use crate::next::Next;
use crate::result::IterResult;

pub(crate) type Outcome = Result<IterResult, StreamError>;

type Request = oneshot::Sender<Outcome>;

/// Queues, error slot and finished flag of a single stream
#[derive(Default)]
pub(crate) struct StreamState {
    events: VecDeque<Vec<Value>>,
    requests: VecDeque<Request>,
    error: Option<StreamError>,
    finished: bool,
    stats: StreamStats,
}

impl StreamState {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Handle an arrival of the watched event
    pub(crate) fn push_event(&mut self, args: Vec<Value>) {
        if self.finished {
            trace!("Event arrived after the stream finished, dropping");
            return;
        }

        self.stats.events_received += 1;
        match self.resolve_oldest(Ok(IterResult::value(args))) {
            None => {
                self.stats.events_delivered += 1;
                trace!("Event matched a pending request");
            }
            Some(Ok(IterResult {
                value: Some(args), ..
            })) => self.events.push_back(args),
            Some(_) => {}
        }
    }

    /// Record a terminal failure
    ///
    /// The oldest live request is rejected with `error`; with no request
    /// waiting the error is kept for the next `next` caller. Returns `false`
    /// if the stream had already finished, in which case nothing changes.
    pub(crate) fn fail(&mut self, error: StreamError) -> bool {
        if self.finished {
            return false;
        }

        self.finished = true;
        match self.resolve_oldest(Err(error)) {
            None => self.stats.failures_delivered += 1,
            Some(Err(error)) => self.error = Some(error),
            Some(Ok(_)) => {}
        }
        true
    }

    /// Mark the stream finished and resolve every pending request as done
    ///
    /// Buffered events are kept for draining.
    pub(crate) fn close(&mut self) {
        self.finished = true;
        for request in self.requests.drain(..) {
            let _ = request.send(Ok(IterResult::done()));
        }
    }

    /// Produce the next outcome, queueing a request when none is available
    pub(crate) fn next(&mut self) -> Next {
        if let Some(args) = self.events.pop_front() {
            self.stats.events_delivered += 1;
            return Next::ready(Ok(IterResult::value(args)));
        }

        if let Some(error) = self.error.take() {
            self.stats.failures_delivered += 1;
            return Next::ready(Err(error));
        }

        if self.finished {
            return Next::ready(Ok(IterResult::done()));
        }

        // Requests whose `Next` was dropped before any arrival
        self.requests.retain(|request| !request.is_closed());

        let (tx, rx) = oneshot::channel();
        self.requests.push_back(tx);
        self.stats.requests_queued += 1;
        Next::waiting(rx)
    }

    /// Take a buffered event or the pending error without queueing a request
    pub(crate) fn try_next(&mut self) -> Result<Option<Vec<Value>>, StreamError> {
        if let Some(args) = self.events.pop_front() {
            self.stats.events_delivered += 1;
            return Ok(Some(args));
        }

        match self.error.take() {
            Some(error) => {
                self.stats.failures_delivered += 1;
                Err(error)
            }
            None => Ok(None),
        }
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.finished
    }

    /// Finished with nothing left to deliver
    pub(crate) fn is_exhausted(&self) -> bool {
        self.finished && self.events.is_empty() && self.error.is_none()
    }

    pub(crate) fn buffered_len(&self) -> usize {
        self.events.len()
    }

    /// Pending requests whose consumer is still waiting
    pub(crate) fn pending_requests(&self) -> usize {
        self.requests
            .iter()
            .filter(|request| !request.is_closed())
            .count()
    }

    pub(crate) fn stats(&self) -> StreamStats {
        self.stats.clone()
    }

    /// Hand `outcome` to the oldest request whose consumer is still waiting
    ///
    /// Requests abandoned by their consumer are discarded along the way.
    /// Returns the outcome back if no live request claimed it.
    fn resolve_oldest(&mut self, mut outcome: Outcome) -> Option<Outcome> {
        while let Some(request) = self.requests.pop_front() {
            match request.send(outcome) {
                Ok(()) => return None,
                Err(unclaimed) => outcome = unclaimed,
            }
        }
        Some(outcome)
    }
}

/// Statistics for stream usage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Watched events received from the source
    pub events_received: u64,

    /// Events delivered to the consumer
    pub events_delivered: u64,

    /// Failures delivered to the consumer
    pub failures_delivered: u64,

    /// Requests that had to wait for an arrival
    pub requests_queued: u64,
}

impl std::fmt::Display for StreamStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Event Stream Stats:")?;
        writeln!(f, "  Events received: {}", self.events_received)?;
        writeln!(f, "  Events delivered: {}", self.events_delivered)?;
        writeln!(f, "  Failures delivered: {}", self.failures_delivered)?;
        writeln!(f, "  Requests queued: {}", self.requests_queued)?;
        Ok(())
    }
}
