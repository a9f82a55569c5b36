//! Per-collection fetch state with stale-result suppression
//!
//! Every load takes a [`Ticket`] from its slot. Only the most recently issued
//! ticket may write back, and nothing is written once the owning view has
//! been torn down.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::FetchResult;

/// Lifecycle of one collection
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "lowercase")]
pub enum FetchState<T> {
    Idle,
    Loading,
    Success(T),
    Error(String),
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        FetchState::Idle
    }
}

impl<T> FetchState<T> {
    pub fn is_idle(&self) -> bool {
        matches!(self, FetchState::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FetchState::Success(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, FetchState::Error(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            FetchState::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            FetchState::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FetchState::Idle => "idle",
            FetchState::Loading => "loading",
            FetchState::Success(_) => "success",
            FetchState::Error(_) => "error",
        }
    }
}

impl<E> FetchState<Vec<E>> {
    /// Items to display; empty unless the last load succeeded
    pub fn items(&self) -> &[E] {
        match self {
            FetchState::Success(items) => items,
            _ => &[],
        }
    }
}

/// Shared alive flag for one view instance
#[derive(Debug, Clone)]
pub struct Liveness(Arc<AtomicBool>);

impl Liveness {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_alive(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn teardown(&self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}

/// Proof that a load was started; compared against the slot's latest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    seq: u64,
}

/// What happened to a finished load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Completion {
    /// The result (or its error) is now the slot's state
    Applied,
    /// A newer load was started; the result was dropped
    Superseded,
    /// The view was torn down; the result was dropped
    Detached,
}

struct SlotInner<T> {
    state: FetchState<T>,
    issued: u64,
}

/// One collection's state plus its load sequence
pub struct FetchSlot<T> {
    name: &'static str,
    inner: Mutex<SlotInner<T>>,
}

impl<T: Clone> FetchSlot<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            inner: Mutex::new(SlotInner {
                state: FetchState::Idle,
                issued: 0,
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Enter Loading and invalidate any load still in flight
    pub fn begin(&self) -> Ticket {
        let mut inner = self.inner.lock();
        inner.issued += 1;
        inner.state = FetchState::Loading;
        debug!(slot = self.name, seq = inner.issued, "load started");
        Ticket { seq: inner.issued }
    }

    /// Back to Idle, invalidating any load still in flight
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.issued += 1;
        inner.state = FetchState::Idle;
    }

    /// Write a load's outcome back, unless it is stale or the view is gone
    pub fn complete(&self, ticket: Ticket, result: FetchResult<T>, liveness: &Liveness) -> Completion {
        let mut inner = self.inner.lock();

        if !liveness.is_alive() {
            debug!(slot = self.name, seq = ticket.seq, "view torn down, result discarded");
            return Completion::Detached;
        }
        if ticket.seq != inner.issued {
            debug!(
                slot = self.name,
                seq = ticket.seq,
                latest = inner.issued,
                "superseded result discarded"
            );
            return Completion::Superseded;
        }

        inner.state = match result {
            Ok(value) => FetchState::Success(value),
            Err(err) => {
                warn!(slot = self.name, kind = err.kind(), "load failed: {}", err);
                FetchState::Error(err.to_string())
            }
        };
        Completion::Applied
    }

    pub fn snapshot(&self) -> FetchState<T> {
        self.inner.lock().state.clone()
    }
}
