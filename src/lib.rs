//! A tick-driven batch-processing and egress-shaping core for a
//! byte-oriented link (spec.md §1): fixed-capacity event/job queues,
//! COBS+CRC16 framing, and a priority-aware flush loop that favors
//! freshness over completeness under budget pressure.
//!
//! The crate owns no thread, socket, or file: every effect crosses the
//! [`interfaces::ByteSink`], [`interfaces::LogSink`], or
//! [`interfaces::Clock`] trait, supplied by the caller. See `src/bin/demo.rs`
//! for a minimal host loop.

pub mod bpu;
pub mod config;
pub mod events;
pub mod flush;
pub mod framer;
pub mod interfaces;
pub mod jobs;
pub mod lowering;
pub mod ring;
pub mod sources;
pub mod stats;
pub mod tick;

pub use bpu::Bpu;
pub use config::{Config, Kind};
pub use events::Event;
pub use interfaces::{ByteSink, Clock, LogSink, StdoutLogSink, SystemClock, VecSink};
pub use tick::TickDriver;
