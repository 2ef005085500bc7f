//! Diagnostic emission with per-agent rate limiting.
//!
//! Diagnostics are pure side effects: the core keeps working identically
//! whether a sink is attached, sampling, or disabled. The rate limiter is
//! keyed by (agent, message key) so one noisy agent cannot flood the log,
//! and a disabled sink is checked before any formatting happens.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use agent_context::{AgentId, DiagnosticEvent};

use crate::config::TelemetryConfig;

/// Destination for diagnostic events.
pub trait TelemetrySink {
    /// Cheap check consulted before any event is built or formatted.
    fn enabled(&self) -> bool {
        true
    }

    /// Receives one event.
    fn send(&mut self, event: &DiagnosticEvent);
}

/// Sink that forwards to `tracing`.
#[derive(Debug, Default)]
pub struct TracingSink;

impl TelemetrySink for TracingSink {
    fn enabled(&self) -> bool {
        tracing::enabled!(tracing::Level::INFO)
    }

    fn send(&mut self, event: &DiagnosticEvent) {
        match event {
            DiagnosticEvent::GoalCommitted {
                agent_id,
                category,
                score,
                tick,
            } => {
                tracing::info!(agent = %agent_id, %category, score, tick, "goal committed");
            }
            DiagnosticEvent::ThrashWarning {
                agent_id,
                switch_count,
                window_ms,
                tick,
            } => {
                tracing::warn!(
                    agent = %agent_id,
                    switch_count,
                    window_ms,
                    tick,
                    "goal thrashing detected"
                );
            }
            DiagnosticEvent::ArbitrationFault {
                agent_id,
                detail,
                consecutive_failures,
                tick,
            } => {
                tracing::warn!(
                    agent = %agent_id,
                    detail = %detail,
                    consecutive_failures,
                    tick,
                    "arbitration fault"
                );
            }
            DiagnosticEvent::RecoveryPerformed {
                agent_id,
                fallback,
                tick,
            } => {
                tracing::warn!(agent = %agent_id, %fallback, tick, "arbitration recovery");
            }
        }
    }
}

/// Sink that collects events in memory (for tests and replay capture).
#[derive(Debug, Default)]
pub struct MemorySink {
    pub events: Vec<DiagnosticEvent>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts collected events with the given message key.
    pub fn count_key(&self, key: &str) -> usize {
        self.events.iter().filter(|e| e.key() == key).count()
    }
}

impl TelemetrySink for MemorySink {
    fn send(&mut self, event: &DiagnosticEvent) {
        self.events.push(event.clone());
    }
}

/// Sink that appends one JSON object per event (JSONL), for replay
/// capture and offline analysis. Pair it with a file in tools and a
/// `Vec<u8>` in tests.
pub struct JsonLinesSink<W: Write> {
    writer: BufWriter<W>,
    event_count: u64,
}

impl JsonLinesSink<File> {
    /// Creates a sink that truncates and writes the given path.
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        Ok(Self::new(file))
    }
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
            event_count: 0,
        }
    }

    /// Number of events written so far.
    pub fn event_count(&self) -> u64 {
        self.event_count
    }

    /// Flushes buffered lines to the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    /// Flushes and returns the underlying writer.
    pub fn into_inner(self) -> io::Result<W> {
        self.writer.into_inner().map_err(|e| e.into_error())
    }
}

impl<W: Write> TelemetrySink for JsonLinesSink<W> {
    fn send(&mut self, event: &DiagnosticEvent) {
        match serde_json::to_string(event) {
            Ok(json) => {
                if let Err(e) = writeln!(self.writer, "{json}") {
                    tracing::warn!(error = %e, "diagnostic sink write failed");
                    return;
                }
                self.event_count += 1;
            }
            Err(e) => tracing::warn!(error = %e, "diagnostic event serialization failed"),
        }
    }
}

/// Rate-limited diagnostic channel wrapping a sink.
pub struct TelemetryLog<S: TelemetrySink> {
    sink: S,
    config: TelemetryConfig,
    last_emit: HashMap<(AgentId, &'static str), u64>,
}

impl<S: TelemetrySink> TelemetryLog<S> {
    pub fn new(sink: S, config: TelemetryConfig) -> Self {
        Self {
            sink,
            config,
            last_emit: HashMap::new(),
        }
    }

    /// Emits an event unless the same (agent, key) fired too recently.
    /// Returns true if the event reached the sink.
    pub fn emit(&mut self, now_ms: u64, event: DiagnosticEvent) -> bool {
        self.emit_with(now_ms, || event)
    }

    /// Like [`emit`](Self::emit), but the event is only built once the
    /// sink is known to be enabled. Use this when constructing the
    /// event allocates (error strings, formatted details).
    pub fn emit_with(&mut self, now_ms: u64, build: impl FnOnce() -> DiagnosticEvent) -> bool {
        if !self.sink.enabled() {
            return false;
        }
        let event = build();
        let key = (event.agent_id(), event.key());
        if let Some(&last) = self.last_emit.get(&key) {
            if now_ms.saturating_sub(last) < self.config.min_interval_ms {
                return false;
            }
        }
        self.last_emit.insert(key, now_ms);
        self.sink.send(&event);
        true
    }

    /// Drops rate-limiter state for a destroyed agent.
    pub fn forget_agent(&mut self, agent_id: AgentId) {
        self.last_emit.retain(|(id, _), _| *id != agent_id);
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }
}
