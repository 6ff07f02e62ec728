//! External collaborator traits: byte sink, log sink, monotonic clock.
//!
//! The core never owns a thread, a socket, or a file handle. Everything it
//! touches outside its own queues and stats block comes in through one of
//! these three traits, kept deliberately narrow (spec.md §6, §5).

use std::time::Instant;

/// Non-blocking, externally-buffered byte sink (the link driver).
pub trait ByteSink {
    /// Appends `bytes` to the outbound stream. Must not block.
    fn write(&mut self, bytes: &[u8]);

    /// Bytes that may be written right now without blocking.
    fn available_for_write(&self) -> usize;
}

/// Human-readable diagnostic sink. Byte-counted for `log_bytes_total`.
pub trait LogSink {
    fn write(&mut self, text: &str);
}

/// Monotonic, wraparound-tolerant millisecond/microsecond clock.
pub trait Clock {
    fn now_ms(&self) -> u32;
    fn now_us(&self) -> u32;
}

/// `Instant`-backed clock for hosted (non-embedded) use.
///
/// Truncates to `u32` intentionally (spec.md §9): the core's comparisons
/// are all signed-difference wraparound, so a 64-bit instant would break
/// the rollover semantics the design depends on.
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self { start: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u32 {
        self.start.elapsed().as_millis() as u32
    }

    fn now_us(&self) -> u32 {
        self.start.elapsed().as_micros() as u32
    }
}

/// Unbounded in-memory sink. `available_for_write` always reports room.
///
/// Used by the demo harness and by tests that don't exercise backpressure.
#[derive(Default)]
pub struct VecSink {
    pub bytes: Vec<u8>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ByteSink for VecSink {
    fn write(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    fn available_for_write(&self) -> usize {
        usize::MAX
    }
}

/// Fixed-capacity sink for exercising backpressure in tests: reports a
/// caller-controlled `available_for_write` regardless of how much has
/// actually been written.
#[derive(Default)]
pub struct CannedSink {
    pub bytes: Vec<u8>,
    pub free: usize,
}

impl CannedSink {
    pub fn new(free: usize) -> Self {
        Self { bytes: Vec::new(), free }
    }
}

impl ByteSink for CannedSink {
    fn write(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    fn available_for_write(&self) -> usize {
        self.free
    }
}

/// Logs through the `log` crate at info level, counting UTF-8 bytes.
#[derive(Default)]
pub struct StdoutLogSink {
    pub bytes_written: u64,
}

impl LogSink for StdoutLogSink {
    fn write(&mut self, text: &str) {
        self.bytes_written += text.len() as u64;
        log::info!("{text}");
    }
}
