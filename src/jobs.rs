//! Job queue (C4): holds lowered work items; coalesces by type, always
//! keep-last (spec.md §4.4).

use crate::config::{Kind, JOB_PAYLOAD_MAX, JOB_QN};
use crate::ring::BoundedRing;

/// `{type, flags, len, t_ms, payload}`; `payload[0..2]` is `[tag,
/// original_event_len]`, the rest is the (possibly truncated) event
/// payload (spec.md §3).
#[derive(Debug, Clone, Copy)]
pub struct Job {
    pub kind: Kind,
    pub flags: u8,
    pub len: u8,
    pub t_ms: u32,
    pub payload: [u8; JOB_PAYLOAD_MAX],
}

impl Job {
    pub fn new(kind: Kind, flags: u8, t_ms: u32, payload: &[u8]) -> Self {
        let len = payload.len().min(JOB_PAYLOAD_MAX);
        let mut buf = [0u8; JOB_PAYLOAD_MAX];
        buf[..len].copy_from_slice(&payload[..len]);
        Self { kind, flags, len: len as u8, t_ms, payload: buf }
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload[..self.len as usize]
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct JobQueueCounters {
    pub job_in: u32,
    pub job_out: u32,
    pub job_merge: u32,
    pub job_drop: u32,
}

pub struct JobQueue {
    ring: BoundedRing<Job, JOB_QN>,
    pub counters: JobQueueCounters,
}

impl JobQueue {
    pub fn new() -> Self {
        Self { ring: BoundedRing::new(), counters: JobQueueCounters::default() }
    }

    pub fn depth(&self) -> usize {
        self.ring.count()
    }

    /// 64-bit dirty mask: bit `k` set iff a job of wire type `k` is
    /// currently queued (spec.md §4.8).
    pub fn dirty_mask(&self) -> u64 {
        let mut mask = 0u64;
        for i in 0..self.ring.count() {
            if let Some(j) = self.ring.at(i) {
                mask |= 1u64 << j.kind.wire_type();
            }
        }
        mask
    }

    /// Always keep-last by type, no time window (spec.md §4.4). Unlike the
    /// event queue, this applies uniformly to every kind, including `Cmd`
    /// (spec.md §9's documented asymmetry).
    pub fn push_coalesce(&mut self, j: Job) {
        self.counters.job_in += 1;

        for i in 0..self.ring.count() {
            let slot = self.ring.at_mut(i).expect("index within count");
            if slot.kind == j.kind {
                *slot = j;
                self.counters.job_merge += 1;
                return;
            }
        }

        if !self.ring.push(j) {
            self.counters.job_drop += 1;
        }
    }

    pub fn pop(&mut self) -> Option<Job> {
        let v = self.ring.pop();
        if v.is_some() {
            self.counters.job_out += 1;
        }
        v
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }
}

impl Default for JobQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(kind: Kind, t_ms: u32) -> Job {
        Job::new(kind, 0, t_ms, &[kind.tag(), 0])
    }

    #[test]
    fn s5_job_layer_coalesces_cmd_keep_last() {
        let mut q = JobQueue::new();
        q.push_coalesce(job(Kind::Cmd, 0));
        q.push_coalesce(job(Kind::Cmd, 1));
        assert_eq!(q.counters.job_in, 2);
        assert_eq!(q.counters.job_merge, 1);
        assert_eq!(q.depth(), 1);
        assert_eq!(q.pop().unwrap().t_ms, 1);
    }

    #[test]
    fn at_most_one_job_per_kind_p3() {
        let mut q = JobQueue::new();
        for t in 0..10u32 {
            q.push_coalesce(job(Kind::Sensor, t));
        }
        assert_eq!(q.depth(), 1);
    }

    #[test]
    fn four_distinct_kinds_fit_without_drop() {
        let mut q = JobQueue::new();
        for k in Kind::all() {
            q.push_coalesce(job(k, 0));
        }
        assert_eq!(q.depth(), 4);
        assert_eq!(q.counters.job_drop, 0);
    }

    #[test]
    fn dirty_mask_reflects_queued_kinds() {
        let mut q = JobQueue::new();
        q.push_coalesce(job(Kind::Sensor, 0));
        q.push_coalesce(job(Kind::Hb, 0));
        let mask = q.dirty_mask();
        assert_ne!(mask & (1u64 << Kind::Sensor.wire_type()), 0);
        assert_ne!(mask & (1u64 << Kind::Hb.wire_type()), 0);
        assert_eq!(mask & (1u64 << Kind::Telem.wire_type()), 0);
    }
}
