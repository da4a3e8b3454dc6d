//! Result-stream protocol: the outbound event sequence a run produces and
//! the inbound channel a bidirectional caller pushes late parameters through.

use crate::ParamMap;
use chrono::{DateTime, Utc};
use futures_util::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// One inbound frame: run input parameters pushed by the caller mid-run.
pub type InputFrame = ParamMap;

pub type InputSender = mpsc::Sender<InputFrame>;
pub type InputReceiver = mpsc::Receiver<InputFrame>;

/// Bounded channel for the bidirectional inbound side. Dropping the sender
/// signals inbound completion; a full buffer applies backpressure to the
/// caller.
pub fn input_channel(capacity: usize) -> (InputSender, InputReceiver) {
    mpsc::channel(capacity)
}

/// A single unit of the outbound stream: a node's output becoming available,
/// or a terminal signal. Events are emitted strictly in node-completion
/// order along the executed path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ResultEvent {
    NodeCompleted {
        node_id: String,
        outputs: ParamMap,
        timestamp: DateTime<Utc>,
    },
    Completed {
        timestamp: DateTime<Utc>,
    },
    Failed {
        node_id: Option<String>,
        error: String,
        timestamp: DateTime<Utc>,
    },
    Cancelled {
        timestamp: DateTime<Utc>,
    },
}

impl ResultEvent {
    pub fn node_completed(node_id: impl Into<String>, outputs: ParamMap) -> Self {
        ResultEvent::NodeCompleted {
            node_id: node_id.into(),
            outputs,
            timestamp: Utc::now(),
        }
    }

    pub fn completed() -> Self {
        ResultEvent::Completed {
            timestamp: Utc::now(),
        }
    }

    pub fn failed(node_id: Option<String>, error: impl ToString) -> Self {
        ResultEvent::Failed {
            node_id,
            error: error.to_string(),
            timestamp: Utc::now(),
        }
    }

    pub fn cancelled() -> Self {
        ResultEvent::Cancelled {
            timestamp: Utc::now(),
        }
    }

    /// Whether this event ends the stream.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ResultEvent::NodeCompleted { .. })
    }

    /// Node id for node-completion events.
    pub fn node_id(&self) -> Option<&str> {
        match self {
            ResultEvent::NodeCompleted { node_id, .. } => Some(node_id),
            ResultEvent::Failed { node_id, .. } => node_id.as_deref(),
            _ => None,
        }
    }
}

/// Ordered, possibly-infinite sequence of result events for one run.
///
/// Dropping the stream cancels the run: no further node execution starts
/// once the runner observes the cancellation, though an in-flight capability
/// call is not interrupted.
#[derive(Debug)]
pub struct ResultStream {
    rx: mpsc::UnboundedReceiver<ResultEvent>,
    cancel: CancellationToken,
}

impl ResultStream {
    pub fn new(rx: mpsc::UnboundedReceiver<ResultEvent>, cancel: CancellationToken) -> Self {
        Self { rx, cancel }
    }

    /// Next event, or `None` after the terminal event has been delivered.
    pub async fn recv(&mut self) -> Option<ResultEvent> {
        self.rx.recv().await
    }

    /// Stop the run without consuming the remaining events.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Drain the stream to completion.
    pub async fn collect(mut self) -> Vec<ResultEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.rx.recv().await {
            events.push(event);
        }
        events
    }
}

impl Stream for ResultStream {
    type Item = ResultEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

impl Drop for ResultStream {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
