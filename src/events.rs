//! Event queue (C3): holds inbound events; coalesces within a time window
//! by type (spec.md §4.3).

use crate::config::{Kind, EVENT_PAYLOAD_MAX, EVT_QN};
use crate::ring::BoundedRing;

/// `{type, flags, len, t_ms, payload}` (spec.md §3).
#[derive(Debug, Clone, Copy)]
pub struct Event {
    pub kind: Kind,
    pub flags: u8,
    pub len: u8,
    pub t_ms: u32,
    pub payload: [u8; EVENT_PAYLOAD_MAX],
}

impl Event {
    pub fn new(kind: Kind, flags: u8, t_ms: u32, payload: &[u8]) -> Self {
        let len = payload.len().min(EVENT_PAYLOAD_MAX);
        let mut buf = [0u8; EVENT_PAYLOAD_MAX];
        buf[..len].copy_from_slice(&payload[..len]);
        Self { kind, flags, len: len as u8, t_ms, payload: buf }
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload[..self.len as usize]
    }
}

/// Event-in/out/merge/drop counters owned by the event queue. Folded into
/// the global `Stats` block by the caller rather than kept private, so the
/// invariant `ev_in = ev_out + ev_merge + ev_drop + evQ_current` (P1) can
/// be checked directly against it.
#[derive(Debug, Default, Clone, Copy)]
pub struct EventQueueCounters {
    pub ev_in: u32,
    pub ev_out: u32,
    pub ev_merge: u32,
    pub ev_drop: u32,
}

pub struct EventQueue {
    ring: BoundedRing<Event, EVT_QN>,
    pub counters: EventQueueCounters,
}

impl EventQueue {
    pub fn new() -> Self {
        Self { ring: BoundedRing::new(), counters: EventQueueCounters::default() }
    }

    pub fn depth(&self) -> usize {
        self.ring.count()
    }

    /// Coalescing push (spec.md §4.3). `Kind::event_coalesces() == true`
    /// kinds merge with a same-kind predecessor within
    /// `coalesce_window_ms` (unsigned wraparound difference); `Cmd`
    /// instances are always preserved until the queue is full.
    pub fn push_coalesce(&mut self, e: Event, coalesce_window_ms: u32) {
        self.counters.ev_in += 1;

        if e.kind.event_coalesces() {
            for i in 0..self.ring.count() {
                let slot = self.ring.at_mut(i).expect("index within count");
                if slot.kind == e.kind
                    && e.t_ms.wrapping_sub(slot.t_ms) <= coalesce_window_ms
                {
                    *slot = e;
                    self.counters.ev_merge += 1;
                    return;
                }
            }
        }

        if self.ring.push(e) {
            // pushed
        } else {
            self.counters.ev_drop += 1;
        }
    }

    pub fn pop(&mut self) -> Option<Event> {
        let v = self.ring.pop();
        if v.is_some() {
            self.counters.ev_out += 1;
        }
        v
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}
