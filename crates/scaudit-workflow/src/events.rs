//! # Audit Event Stream
//!
//! Everything a run reports flows through one ordered stream of
//! [`AuditEvent`]s. Consumers (terminal output, HTTP session state, tests)
//! subscribe to the receiving end; the engine never knows who listens.
//!
//! Log events are mirrored into `tracing` as they are emitted.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use scaudit_core::{AuditResultSet, DecisionToken, Disposition, LogEvent, RunId, Severity, SupplierId};

use crate::engine::RunStatus;
use crate::gate::PendingDecision;
use crate::providers::GeneratedReport;

/// One item of the run's event stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum AuditEvent {
    /// A domain log line.
    Log(LogEvent),
    /// The finalized records so far, published after each supplier.
    Snapshot(AuditResultSet),
    /// The run is suspended until a reviewer decides.
    AwaitingDecision(PendingDecision),
    /// A pending decision was resolved.
    DecisionResolved {
        token: DecisionToken,
        supplier_id: SupplierId,
        disposition: Disposition,
    },
    /// The narrative report.
    Report(GeneratedReport),
    /// Last event of every run.
    Finished { run_id: RunId, status: RunStatus },
}

impl AuditEvent {
    /// The log event, if this is one.
    pub fn as_log(&self) -> Option<&LogEvent> {
        match self {
            Self::Log(log) => Some(log),
            _ => None,
        }
    }
}

/// Sending half of the event stream.
///
/// Emission never fails. If the receiver is gone the event is dropped and
/// the run continues.
#[derive(Debug, Clone)]
pub struct EventSink {
    run_id: RunId,
    tx: Option<mpsc::UnboundedSender<AuditEvent>>,
}

impl EventSink {
    /// A sink for `run_id` and its receiving end.
    pub fn channel(run_id: RunId) -> (Self, mpsc::UnboundedReceiver<AuditEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(run_id, tx), rx)
    }

    pub fn new(run_id: RunId, tx: mpsc::UnboundedSender<AuditEvent>) -> Self {
        Self { run_id, tx: Some(tx) }
    }

    /// A sink that only mirrors logs into `tracing`.
    pub fn tracing_only(run_id: RunId) -> Self {
        Self { run_id, tx: None }
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    pub fn emit(&self, event: AuditEvent) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(event);
        }
    }

    /// Emit a log event and mirror it into `tracing`.
    pub fn log(&self, event: LogEvent) {
        let run_id = self.run_id;
        let source = event.source.as_str();
        match event.severity {
            Severity::Info | Severity::Success => {
                tracing::info!(run_id = %run_id, source, severity = %event.severity, "{}", event.message)
            }
            Severity::Warning => tracing::warn!(run_id = %run_id, source, "{}", event.message),
            Severity::Error => tracing::error!(run_id = %run_id, source, "{}", event.message),
        }
        self.emit(AuditEvent::Log(event));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn events_arrive_in_order() {
        let run = RunId::new();
        let (sink, mut rx) = EventSink::channel(run);
        sink.log(LogEvent::info("Orchestrator", "one"));
        sink.log(LogEvent::success("Orchestrator", "two"));
        assert_eq!(rx.recv().await.unwrap().as_log().unwrap().message, "one");
        assert_eq!(rx.recv().await.unwrap().as_log().unwrap().message, "two");
    }

    #[test]
    fn emitting_after_receiver_drop_is_silent() {
        let (sink, rx) = EventSink::channel(RunId::new());
        drop(rx);
        sink.log(LogEvent::error("Orchestrator", "nobody listening"));
    }

    #[test]
    fn tracing_only_sink_accepts_events() {
        let sink = EventSink::tracing_only(RunId::new());
        sink.emit(AuditEvent::Report(GeneratedReport::fallback()));
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let run_id = RunId::new();
        let json = serde_json::to_value(AuditEvent::Finished {
            run_id,
            status: RunStatus::Completed,
        })
        .unwrap();
        assert_eq!(json["type"], "finished");
        assert_eq!(json["data"]["status"], "completed");
    }
}
