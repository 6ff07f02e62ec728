//! The batch-processing unit (C1): owns the two queues, the scheduler, the
//! framer, and the stats block, and sequences one tick through sources →
//! lowering → flush → snapshot (spec.md §4).
//!
//! `Bpu` owns no thread, socket, or clock. Every external effect — writing
//! bytes, writing a log line, reading the time — crosses one of the traits
//! in [`crate::interfaces`], supplied by the caller on each call.

use crate::config::Config;
use crate::events::{Event, EventQueue};
use crate::flush;
use crate::framer::Framer;
use crate::interfaces::{ByteSink, LogSink};
use crate::jobs::JobQueue;
use crate::lowering;
use crate::sources::SourceScheduler;
use crate::stats::Stats;

pub struct Bpu {
    cfg: Config,
    evq: EventQueue,
    jobq: JobQueue,
    framer: Framer,
    sources: SourceScheduler,
    stats: Stats,
}

impl Bpu {
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            evq: EventQueue::new(),
            jobq: JobQueue::new(),
            framer: Framer::new(),
            sources: SourceScheduler::new(),
            stats: Stats::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Folds a tick pass's wall-clock cost, as timed by the caller (the tick
    /// driver, C9), into `work_us_last`/`work_us_max`. `tick()` itself never
    /// touches the clock — only the driver around it does.
    pub fn record_tick_timing(&mut self, elapsed_us: u32) {
        self.stats.record_work_us(elapsed_us);
    }

    /// Injects an externally-produced event (CMD, chiefly — spec.md treats
    /// producers as opaque, §1) directly into the event queue, bypassing the
    /// periodic source scheduler. `e.t_ms` should be the producer's own
    /// timestamp; if it predates the tick that drains it, the lowering stage
    /// (C6) will observe it as aged.
    pub fn submit_event(&mut self, e: Event) {
        self.evq.push_coalesce(e, self.cfg.coalesce_window_ms);
    }

    /// Runs one full tick pass at `now_ms`: fires due sources, lowers
    /// whatever is queued into jobs, flushes jobs onto `sink` under the byte
    /// budget, and emits a stats snapshot onto `log` if the interval has
    /// elapsed (spec.md §4).
    pub fn tick(&mut self, now_ms: u32, sink: &mut dyn ByteSink, log: &mut dyn LogSink) {
        self.stats.tick += 1;

        self.sources.tick(now_ms, &self.cfg, &mut self.evq, &mut self.stats);
        lowering::lower_all(&mut self.evq, &mut self.jobq, now_ms, self.cfg.aged_ms, &mut self.stats);
        flush::flush_tick(&mut self.jobq, &mut self.framer, sink, &mut self.stats, &self.cfg);

        // The event/job queues keep their own in/out/merge/drop counters so
        // their internal invariants (P1, spec.md §8) can be checked in
        // isolation; fold them into the flat snapshot record here.
        self.stats.ev_in = self.evq.counters.ev_in;
        self.stats.ev_out = self.evq.counters.ev_out;
        self.stats.ev_merge = self.evq.counters.ev_merge;
        self.stats.ev_drop = self.evq.counters.ev_drop;
        self.stats.job_in = self.jobq.counters.job_in;
        self.stats.job_out = self.jobq.counters.job_out;
        self.stats.job_merge = self.jobq.counters.job_merge;
        self.stats.job_drop = self.jobq.counters.job_drop;

        let dirty = self.jobq.dirty_mask();
        self.stats.maybe_snapshot(
            now_ms,
            self.cfg.stats_snapshot_interval_ms,
            self.evq.depth(),
            self.jobq.depth(),
            dirty,
            log,
        );
    }
}
