//! Typed queue events with observer delivery and ring-buffer history.
//!
//! Engine operations emit events after mutating state. Before the operation
//! returns, [`EventBus::deliver`] hands every pending event to its listeners
//! in emission order, then files it in a per-kind ring buffer that
//! presentation code can poll.
//!
//! # Suppression
//!
//! Event kinds can be suppressed via [`EventBus::suppress`]. Suppressed events
//! are neither delivered nor recorded.

use crate::engine::RejectReason;
use crate::fixed::Seconds;
use crate::id::{JobId, JobKindId, SlotId};
use crate::job::{CancelledJob, CompletedJob};

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// A queue event. `at` is the engine clock (sum of all advanced time) when
/// the event was emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueEvent {
    JobAccepted {
        job: JobId,
        kind: JobKindId,
        slot: SlotId,
        at: Seconds,
    },
    /// A job became the head of its slot and began accruing time.
    JobStarted {
        job: JobId,
        slot: SlotId,
        at: Seconds,
    },
    JobCompleted {
        completed: CompletedJob,
        at: Seconds,
    },
    JobCancelled {
        cancelled: CancelledJob,
        at: Seconds,
    },
    JobBoosted {
        job: JobId,
        slot: SlotId,
        /// Boost currency the caller is expected to have paid.
        cost: u64,
        at: Seconds,
    },
    QueueRejected {
        kind: JobKindId,
        reason: RejectReason,
        at: Seconds,
    },
}

/// Discriminant tag for event types, used for subscription and suppression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    JobAccepted,
    JobStarted,
    JobCompleted,
    JobCancelled,
    JobBoosted,
    QueueRejected,
}

const EVENT_KIND_COUNT: usize = 6;

impl QueueEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            QueueEvent::JobAccepted { .. } => EventKind::JobAccepted,
            QueueEvent::JobStarted { .. } => EventKind::JobStarted,
            QueueEvent::JobCompleted { .. } => EventKind::JobCompleted,
            QueueEvent::JobCancelled { .. } => EventKind::JobCancelled,
            QueueEvent::JobBoosted { .. } => EventKind::JobBoosted,
            QueueEvent::QueueRejected { .. } => EventKind::QueueRejected,
        }
    }
}

impl EventKind {
    fn index(self) -> usize {
        self as usize
    }
}

// ---------------------------------------------------------------------------
// EventBuffer: pre-allocated ring buffer
// ---------------------------------------------------------------------------

/// A pre-allocated ring buffer for events. Fixed capacity; when full, the
/// oldest events are dropped.
#[derive(Debug)]
pub struct EventBuffer {
    events: Vec<Option<QueueEvent>>,
    /// Write position (wraps around).
    head: usize,
    len: usize,
    /// Total events ever written (including dropped).
    total_written: u64,
}

impl EventBuffer {
    /// Create a new ring buffer with the given capacity.
    /// A capacity of 0 is clamped to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: (0..capacity).map(|_| None).collect(),
            head: 0,
            len: 0,
            total_written: 0,
        }
    }

    pub fn push(&mut self, event: QueueEvent) {
        self.events[self.head] = Some(event);
        self.head = (self.head + 1) % self.capacity();
        if self.len < self.capacity() {
            self.len += 1;
        }
        self.total_written += 1;
    }

    pub fn capacity(&self) -> usize {
        self.events.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn total_written(&self) -> u64 {
        self.total_written
    }

    pub fn dropped_count(&self) -> u64 {
        self.total_written.saturating_sub(self.capacity() as u64)
    }

    /// Iterate over events from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &QueueEvent> + '_ {
        let start = if self.len < self.capacity() {
            0
        } else {
            // head points at the next write position, which is the oldest entry
            self.head
        };
        let cap = self.capacity();
        (0..self.len).filter_map(move |i| self.events[(start + i) % cap].as_ref())
    }

    pub fn clear(&mut self) {
        for slot in &mut self.events {
            *slot = None;
        }
        self.head = 0;
        self.len = 0;
    }
}

// ---------------------------------------------------------------------------
// Listeners
// ---------------------------------------------------------------------------

/// A listener receives events read-only. Completion effects (troop count,
/// building level) are applied from a `JobCompleted` listener.
pub type Listener = Box<dyn FnMut(&QueueEvent)>;

/// Optional predicate that filters events for a listener.
pub type EventFilter = Box<dyn Fn(&QueueEvent) -> bool>;

/// Priority level for listeners. Lower priorities run first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ListenerPriority {
    Pre = 0,
    Normal = 1,
    Post = 2,
}

struct ListenerEntry {
    listener: Listener,
    priority: ListenerPriority,
    filter: Option<EventFilter>,
    insertion_order: u64,
}

impl std::fmt::Debug for ListenerEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerEntry")
            .field("priority", &self.priority)
            .field("filtered", &self.filter.is_some())
            .field("insertion_order", &self.insertion_order)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

pub struct EventBus {
    /// Emitted but not yet delivered, in emission order.
    pending: Vec<QueueEvent>,

    /// Delivered events, one ring buffer per kind. Allocated lazily.
    history: [Option<EventBuffer>; EVENT_KIND_COUNT],

    suppressed: [bool; EVENT_KIND_COUNT],

    /// Kept sorted by `(priority, insertion_order)`.
    listeners: [Vec<ListenerEntry>; EVENT_KIND_COUNT],

    history_capacity: usize,

    next_insertion_order: u64,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("pending", &self.pending)
            .field("history", &self.history)
            .field("suppressed", &self.suppressed)
            .field("listeners", &self.listeners)
            .finish_non_exhaustive()
    }
}

impl EventBus {
    /// Create a bus whose per-kind history holds `history_capacity` events.
    pub fn new(history_capacity: usize) -> Self {
        Self {
            pending: Vec::new(),
            history: Default::default(),
            suppressed: [false; EVENT_KIND_COUNT],
            listeners: Default::default(),
            history_capacity,
            next_insertion_order: 0,
        }
    }

    /// Suppress an event kind. Drops its history.
    pub fn suppress(&mut self, kind: EventKind) {
        self.suppressed[kind.index()] = true;
        self.history[kind.index()] = None;
    }

    pub fn is_suppressed(&self, kind: EventKind) -> bool {
        self.suppressed[kind.index()]
    }

    /// Queue an event for delivery. No-op if its kind is suppressed.
    pub fn emit(&mut self, event: QueueEvent) {
        if self.suppressed[event.kind().index()] {
            return;
        }
        self.pending.push(event);
    }

    /// Register a listener with Normal priority and no filter.
    pub fn on(&mut self, kind: EventKind, listener: Listener) {
        self.on_filtered(kind, ListenerPriority::Normal, None, listener);
    }

    /// Register a listener with explicit priority and optional filter.
    pub fn on_filtered(
        &mut self,
        kind: EventKind,
        priority: ListenerPriority,
        filter: Option<EventFilter>,
        listener: Listener,
    ) {
        let order = self.next_insertion_order;
        self.next_insertion_order += 1;
        let entries = &mut self.listeners[kind.index()];
        let pos = entries.partition_point(|e| (e.priority, e.insertion_order) <= (priority, order));
        entries.insert(
            pos,
            ListenerEntry {
                listener,
                priority,
                filter,
                insertion_order: order,
            },
        );
    }

    /// Deliver all pending events in emission order, then record them in
    /// the per-kind history.
    pub fn deliver(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let events = std::mem::take(&mut self.pending);
        for event in events {
            let idx = event.kind().index();
            for entry in &mut self.listeners[idx] {
                if let Some(ref filter) = entry.filter
                    && !filter(&event)
                {
                    continue;
                }
                (entry.listener)(&event);
            }
            let capacity = self.history_capacity;
            self.history[idx]
                .get_or_insert_with(|| EventBuffer::new(capacity))
                .push(event);
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Delivered events of a kind, oldest first.
    pub fn history(&self, kind: EventKind) -> Option<&EventBuffer> {
        self.history[kind.index()].as_ref()
    }

    /// Total events of a kind ever delivered (including ones the history dropped).
    pub fn total_delivered(&self, kind: EventKind) -> u64 {
        self.history[kind.index()]
            .as_ref()
            .map(|b| b.total_written())
            .unwrap_or(0)
    }

    /// Clear history and pending events. Listeners and suppression stay.
    pub fn clear_all(&mut self) {
        for buffer in self.history.iter_mut().flatten() {
            buffer.clear();
        }
        self.pending.clear();
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
