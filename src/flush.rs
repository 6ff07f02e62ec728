//! Flush / shaping loop (C7): enforces the byte budget, observes sink
//! free-space, frames and writes, applies priority-based degradation
//! (spec.md §4.7).

use crate::config::{Config, Kind};
use crate::framer::Framer;
use crate::interfaces::ByteSink;
use crate::jobs::JobQueue;
use crate::stats::Stats;

/// Conservative upper bound on on-wire bytes for a job of payload length
/// `job_len` (spec.md §4.7 step 2): `decoded_len = 4 + len + 2`,
/// `overhead = floor(decoded_len/254) + 2`, `worst = decoded_len +
/// overhead + 1`.
pub fn worst_case_wire_bytes(job_len: u8) -> u32 {
    let decoded_len = 4 + job_len as u32 + 2;
    let overhead = decoded_len / 254 + 2;
    decoded_len + overhead + 1
}

/// One state-machine pass (spec.md §4.7). Returns whether a frame was
/// sent. `budget_left` is mutated in place.
fn flush_one(
    jobq: &mut JobQueue,
    framer: &mut Framer,
    sink: &mut dyn ByteSink,
    stats: &mut Stats,
    cfg: &Config,
    budget_left: &mut u32,
) -> bool {
    stats.flush_try += 1;

    let job = match jobq.pop() {
        Some(j) => j,
        None => return false,
    };

    let worst = worst_case_wire_bytes(job.len);

    if worst > *budget_left {
        stats.uart_skip_budget += 1;
        if cfg.enable_degrade && job.kind == Kind::Telem {
            stats.degrade_drop += 1;
        } else {
            jobq.push_coalesce(job);
            stats.degrade_requeue += 1;
        }
        return false;
    }

    if sink.available_for_write() < cfg.out_min_free {
        stats.uart_skip_txbuf += 1;
        jobq.push_coalesce(job);
        stats.degrade_requeue += 1;
        return false;
    }

    let wire_len = (job.len as usize).min(255);
    match framer.send_frame(sink, job.kind, &job.payload, wire_len) {
        None => {
            jobq.push_coalesce(job);
            stats.degrade_requeue += 1;
            false
        }
        Some(written) => {
            let written = written as u32;
            *budget_left = budget_left.saturating_sub(written);
            stats.uart_sent += 1;
            stats.uart_bytes += written;
            stats.out_bytes_total += written;
            stats.flush_ok += 1;
            true
        }
    }
}

/// Runs the shaping loop for one tick: resets the byte budget, drains
/// jobs while budget and queue allow, classifies the tick's outcome.
/// Returns the remaining budget (always `>= 0` and `<= tx_budget_bytes`,
/// spec.md §8 P6).
pub fn flush_tick(
    jobq: &mut JobQueue,
    framer: &mut Framer,
    sink: &mut dyn ByteSink,
    stats: &mut Stats,
    cfg: &Config,
) -> u32 {
    let mut budget_left = cfg.tx_budget_bytes;
    let mut sent_any = false;

    loop {
        if budget_left == 0 || jobq.is_empty() {
            break;
        }

        let budget_before = budget_left;
        let sent = flush_one(jobq, framer, sink, stats, cfg, &mut budget_left);

        if sent {
            sent_any = true;
        } else if budget_left == budget_before {
            // anti-spin guard (spec.md §9): neither sent nor reduced the budget.
            break;
        }
    }

    if sent_any {
        if jobq.is_empty() {
            stats.flush_full += 1;
        } else {
            stats.flush_partial += 1;
        }
    }

    budget_left
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interfaces::{CannedSink, VecSink};
    use crate::jobs::Job;

    fn job(kind: Kind, payload: &[u8]) -> Job {
        Job::new(kind, 0, 0, payload)
    }

    #[test]
    fn idempotent_on_empty_queue() {
        let cfg = Config::default();
        let mut jobq = JobQueue::new();
        let mut framer = Framer::new();
        let mut sink = VecSink::new();
        let mut stats = Stats::new();

        let left = flush_tick(&mut jobq, &mut framer, &mut sink, &mut stats, &cfg);

        assert_eq!(left, cfg.tx_budget_bytes);
        assert_eq!(stats.flush_try, 0);
        assert_eq!(stats.flush_ok, 0);
    }

    #[test]
    fn sends_all_jobs_when_sink_ready_and_budget_generous() {
        let cfg = Config::default();
        let mut jobq = JobQueue::new();
        let mut framer = Framer::new();
        let mut sink = VecSink::new();
        let mut stats = Stats::new();

        jobq.push_coalesce(job(Kind::Sensor, &[0x01, 2, 1, 2]));
        jobq.push_coalesce(job(Kind::Hb, &[0x02, 1, 1]));

        flush_tick(&mut jobq, &mut framer, &mut sink, &mut stats, &cfg);

        assert_eq!(stats.flush_ok, 2);
        assert_eq!(stats.uart_sent, 2);
        assert!(jobq.is_empty());
        assert_eq!(stats.flush_full, 1);
        assert_eq!(stats.flush_partial, 0);
    }

    #[test]
    fn p7_flush_try_ge_flush_ok_and_uart_sent_eq_flush_ok() {
        let cfg = Config::default();
        let mut jobq = JobQueue::new();
        let mut framer = Framer::new();
        let mut sink = VecSink::new();
        let mut stats = Stats::new();

        jobq.push_coalesce(job(Kind::Sensor, &[0x01, 2, 1, 2]));
        flush_tick(&mut jobq, &mut framer, &mut sink, &mut stats, &cfg);

        assert!(stats.flush_try >= stats.flush_ok);
        assert_eq!(stats.uart_sent, stats.flush_ok);
    }

    #[test]
    fn s3_tight_budget_drops_telem_but_preserves_others() {
        let mut cfg = Config::default();
        cfg.tx_budget_bytes = 10;
        let mut jobq = JobQueue::new();
        let mut framer = Framer::new();
        let mut sink = VecSink::new();
        let mut stats = Stats::new();

        jobq.push_coalesce(job(Kind::Telem, &[0x03, 4, 1, 2, 3, 4]));
        flush_tick(&mut jobq, &mut framer, &mut sink, &mut stats, &cfg);

        assert!(stats.uart_skip_budget >= 1);
        assert_eq!(stats.degrade_drop, 1);
        assert_eq!(stats.degrade_requeue, 0);
        assert!(jobq.is_empty()); // dropped, not requeued
    }

    #[test]
    fn s3_sensor_is_requeued_not_dropped_under_tight_budget() {
        let mut cfg = Config::default();
        cfg.tx_budget_bytes = 5; // smaller than any worst-case frame
        let mut jobq = JobQueue::new();
        let mut framer = Framer::new();
        let mut sink = VecSink::new();
        let mut stats = Stats::new();

        jobq.push_coalesce(job(Kind::Sensor, &[0x01, 2, 1, 2]));
        flush_tick(&mut jobq, &mut framer, &mut sink, &mut stats, &cfg);

        assert_eq!(stats.degrade_requeue, 1);
        assert_eq!(stats.degrade_drop, 0);
        assert_eq!(jobq.depth(), 1); // requeued, still present
    }

    #[test]
    fn s2_sink_unavailable_requeues_and_merges_newer_arrivals() {
        let cfg = Config::default();
        let mut jobq = JobQueue::new();
        let mut framer = Framer::new();
        let mut sink = CannedSink::new(0); // never enough free space
        let mut stats = Stats::new();

        jobq.push_coalesce(job(Kind::Sensor, &[0x01, 2, 1, 2]));
        flush_tick(&mut jobq, &mut framer, &mut sink, &mut stats, &cfg);

        assert_eq!(stats.uart_sent, 0);
        assert!(stats.uart_skip_txbuf >= 1);
        assert_eq!(jobq.depth(), 1);

        // a fresher sensor job arrives and coalesces with the requeued one
        jobq.push_coalesce(job(Kind::Sensor, &[0x01, 2, 9, 9]));
        assert_eq!(jobq.counters.job_merge, 1);
        assert_eq!(jobq.depth(), 1);
    }

    #[test]
    fn budget_never_goes_negative_or_above_ceiling() {
        let cfg = Config::default();
        let mut jobq = JobQueue::new();
        let mut framer = Framer::new();
        let mut sink = VecSink::new();
        let mut stats = Stats::new();

        for _ in 0..10 {
            jobq.push_coalesce(job(Kind::Cmd, &[0x04, 4, 1, 2, 3, 4]));
        }

        let left = flush_tick(&mut jobq, &mut framer, &mut sink, &mut stats, &cfg);
        assert!(left <= cfg.tx_budget_bytes);
    }

    #[test]
    fn budget_smaller_than_minimum_frame_sends_nothing() {
        let mut cfg = Config::default();
        cfg.tx_budget_bytes = 0;
        let mut jobq = JobQueue::new();
        let mut framer = Framer::new();
        let mut sink = VecSink::new();
        let mut stats = Stats::new();

        jobq.push_coalesce(job(Kind::Sensor, &[0x01, 2, 1, 2]));
        let left = flush_tick(&mut jobq, &mut framer, &mut sink, &mut stats, &cfg);

        assert_eq!(left, 0);
        assert_eq!(stats.uart_sent, 0);
        assert_eq!(stats.flush_try, 0); // loop never entered: budget_left == 0
    }
}
