//! Lowering stage (C6): drains the event queue exhaustively each tick,
//! marks "aged," emits jobs (spec.md §4.6).
//!
//! Aging is close to a no-op for the three periodic sources (C5), since
//! they stamp events with the same `now_ms` the lowering stage observes
//! moments later in the same tick — so `now_ms - e.t_ms` is always `0`.
//! It becomes meaningful for externally-submitted events (CMD, primarily
//! — see `Bpu::submit_event`), whose producer may have timestamped them
//! earlier than the tick that finally drains them.

use crate::config::{Kind, JOB_EVENT_PAYLOAD_MAX};
use crate::events::{Event, EventQueue};
use crate::jobs::{Job, JobQueue};
use crate::stats::Stats;

fn is_aged(now_ms: u32, t_ms: u32, aged_ms: u32) -> bool {
    now_ms.wrapping_sub(t_ms) >= aged_ms
}

fn bump_aged_hit(stats: &mut Stats, kind: Kind) {
    match kind {
        Kind::Sensor => stats.aged_hit_sensor += 1,
        Kind::Hb => stats.aged_hit_hb += 1,
        Kind::Telem => stats.aged_hit_telem += 1,
        Kind::Cmd => {}
    }
}

fn lower_one(e: &Event, now_ms: u32) -> Job {
    let copy_len = (e.len as usize).min(JOB_EVENT_PAYLOAD_MAX);
    let mut payload = [0u8; 2 + JOB_EVENT_PAYLOAD_MAX];
    payload[0] = e.kind.tag();
    payload[1] = e.len;
    payload[2..2 + copy_len].copy_from_slice(&e.payload()[..copy_len]);

    Job::new(e.kind, e.flags, now_ms, &payload[..2 + copy_len])
}

/// Drains `evq` exhaustively, lowering each event into a job on `jobq`.
/// Pops one at a time rather than collecting into a `Vec` first — no
/// allocation on this hot path (spec.md §4.6, §9).
pub fn lower_all(evq: &mut EventQueue, jobq: &mut JobQueue, now_ms: u32, aged_ms: u32, stats: &mut Stats) {
    while let Some(e) = evq.pop() {
        if is_aged(now_ms, e.t_ms, aged_ms) {
            stats.pick_aged += 1;
            bump_aged_hit(stats, e.kind);
        }

        let job = lower_one(&e, now_ms);
        jobq.push_coalesce(job);
    }
}
