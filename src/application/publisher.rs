use std::cell::RefCell;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use futures::Stream;
use futures::channel::mpsc::{UnboundedReceiver, UnboundedSender, unbounded};

use crate::domain::Publication;

struct PublisherInner {
    latest: Publication,
    subscribers: Vec<UnboundedSender<Publication>>,
    closed: bool,
}

/// Single-writer / multi-reader broadcast of dashboard versions.
///
/// Clones share the same channel set. Only the reconciler publishes; every
/// other holder reads `latest()` or subscribes.
#[derive(Clone)]
pub struct StatePublisher {
    inner: Rc<RefCell<PublisherInner>>,
}

impl Default for StatePublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl StatePublisher {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(PublisherInner {
                latest: Publication::default(),
                subscribers: Vec::new(),
                closed: false,
            })),
        }
    }

    pub fn latest(&self) -> Publication {
        self.inner.borrow().latest.clone()
    }

    /// The returned stream yields the current publication first.
    pub fn subscribe(&self) -> StateSubscription {
        let (tx, rx) = unbounded();
        let mut inner = self.inner.borrow_mut();
        // A fresh unbounded channel cannot be full or closed yet.
        let _ = tx.unbounded_send(inner.latest.clone());
        if inner.closed {
            tx.close_channel();
        } else {
            inner.subscribers.push(tx);
        }
        StateSubscription { rx }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    pub(crate) fn publish(&self, publication: Publication) {
        let mut inner = self.inner.borrow_mut();
        inner.subscribers.retain(|tx| tx.unbounded_send(publication.clone()).is_ok());
        inner.latest = publication;
    }

    /// Ends every subscription stream.
    pub(crate) fn close(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.closed = true;
        for tx in inner.subscribers.drain(..) {
            tx.close_channel();
        }
    }
}

/// Stream of publications for one reader
pub struct StateSubscription {
    rx: UnboundedReceiver<Publication>,
}

impl Stream for StateSubscription {
    type Item = Publication;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.rx).poll_next(cx)
    }
}
