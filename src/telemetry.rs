//! Operational telemetry events and sinks.
//!
//! Alongside ordinary `tracing` logs, the service emits a small set of
//! structured events (schema version after migrations, one event per
//! completed check) through a [`TelemetrySink`] so callers can route or
//! capture them independently of the log filter.

use serde::{Deserialize, Serialize};

use crate::cooldown::Verdict;

/// A structured telemetry event emitted by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TelemetryEvent {
    /// Records the current database schema version after migrations apply.
    SchemaVersionRecorded {
        /// Diesel migration version string (e.g. `20251101000000`).
        schema_version: String,
    },
    /// A check produced a verdict.
    CheckCompleted {
        /// Author that was evaluated.
        login: String,
        /// Outcome of the check.
        verdict: Verdict,
        /// Escalation level in force, when the verdict is a cooldown.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cooldown_level: Option<usize>,
    },
}

/// A sink that can record telemetry events.
pub trait TelemetrySink: Send + Sync {
    /// Records a telemetry event.
    fn record(&self, event: TelemetryEvent);
}

/// Telemetry sink that drops all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTelemetrySink;

impl TelemetrySink for NoopTelemetrySink {
    fn record(&self, _event: TelemetryEvent) {}
}

/// Forwards events to `tracing` as a JSON payload on the `telemetry` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTelemetrySink;

impl TelemetrySink for TracingTelemetrySink {
    fn record(&self, event: TelemetryEvent) {
        let Ok(serialised) = serde_json::to_string(&event) else {
            return;
        };

        tracing::info!(target: "telemetry", event = %serialised);
    }
}

/// Sinks for asserting on emitted events.
#[cfg(any(test, feature = "test-support"))]
pub mod test_support {
    use std::sync::{Mutex, PoisonError};

    use super::{TelemetryEvent, TelemetrySink};

    /// Keeps every recorded event in memory.
    #[derive(Debug, Default)]
    pub struct RecordingSink {
        events: Mutex<Vec<TelemetryEvent>>,
    }

    impl RecordingSink {
        /// Drains and returns the events recorded so far.
        pub fn take(&self) -> Vec<TelemetryEvent> {
            self.events
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .drain(..)
                .collect()
        }
    }

    impl TelemetrySink for RecordingSink {
        fn record(&self, event: TelemetryEvent) {
            self.events
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(event);
        }
    }
}
