//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor.
//!
//! AppState holds:
//! - **Engine**: the single [`AuditEngine`]. Runs are serialized by the
//!   engine, so a second run stays `running` until the first finishes.
//! - **Discovery**: used when a request carries no supplier list.
//! - **Sessions**: the client-visible view of every run, updated from the
//!   run's event stream.
//! - **Controls**: the decision and cancel handles of every run.
//!
//! Nothing is persisted. Sessions live until the process exits.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use scaudit_core::{AuditRecord, DispositionSummary, LogEvent, RunId};
use scaudit_workflow::{
    AuditEngine, AuditEvent, AuditRun, DecisionView, DiscoveryProvider, GeneratedReport,
    RunControl, RunStatus,
};

// -- Generic In-Memory Store --------------------------------------------------

/// Thread-safe, cloneable in-memory key-value store.
///
/// The lock is `parking_lot` and is never held across `.await` points.
#[derive(Debug)]
pub struct Store<T: Clone + Send + Sync> {
    data: Arc<RwLock<HashMap<Uuid, T>>>,
}

impl<T: Clone + Send + Sync> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

impl<T: Clone + Send + Sync> Store<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert a record, returning the previous value if the key existed.
    pub fn insert(&self, id: Uuid, value: T) -> Option<T> {
        self.data.write().insert(id, value)
    }

    /// Retrieve a record by ID.
    pub fn get(&self, id: &Uuid) -> Option<T> {
        self.data.read().get(id).cloned()
    }

    /// Update a record in place. Returns the updated record, or `None` if not found.
    pub fn update(&self, id: &Uuid, f: impl FnOnce(&mut T)) -> Option<T> {
        let mut guard = self.data.write();
        let entry = guard.get_mut(id)?;
        f(entry);
        Some(entry.clone())
    }

    /// Remove a record, returning it if it existed.
    pub fn remove(&self, id: &Uuid) -> Option<T> {
        self.data.write().remove(id)
    }

    /// Return the number of records.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone + Send + Sync> Default for Store<T> {
    fn default() -> Self {
        Self::new()
    }
}

// -- Configuration ------------------------------------------------------------

/// Process configuration read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Listen port (`PORT`, default 8080).
    pub port: u16,
    /// Optional YAML audit configuration (`SCAUDIT_CONFIG`).
    pub audit_config: Option<PathBuf>,
    /// Emit JSON logs (`LOG_FORMAT=json`).
    pub json_logs: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            audit_config: None,
            json_logs: false,
        }
    }
}

impl AppConfig {
    /// Read `PORT`, `SCAUDIT_CONFIG` and `LOG_FORMAT`. Unparseable ports
    /// fall back to the default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            audit_config: lookup("SCAUDIT_CONFIG")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            json_logs: lookup("LOG_FORMAT").is_some_and(|f| f.eq_ignore_ascii_case("json")),
        }
    }
}

// -- Audit Sessions -----------------------------------------------------------

/// Client-visible lifecycle of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Running,
    AwaitingDecision,
    Completed,
    Failed,
    Cancelled,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::AwaitingDecision => "awaiting_decision",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether the run has finished.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

impl From<RunStatus> for SessionStatus {
    fn from(status: RunStatus) -> Self {
        match status {
            RunStatus::Completed => Self::Completed,
            RunStatus::Failed => Self::Failed,
            RunStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a client sees about one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditSession {
    pub run_id: RunId,
    pub company_id: String,
    pub status: SessionStatus,
    pub logs: Vec<LogEvent>,
    pub records: Vec<AuditRecord>,
    pub summary: DispositionSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending: Option<DecisionView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<GeneratedReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AuditSession {
    /// A fresh session in the `running` state.
    pub fn new(run_id: RunId, company_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            run_id,
            company_id: company_id.into(),
            status: SessionStatus::Running,
            logs: Vec::new(),
            records: Vec::new(),
            summary: DispositionSummary::default(),
            pending: None,
            report: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Fold one engine event into the session.
    pub fn apply(&mut self, event: AuditEvent) {
        self.updated_at = Utc::now();
        match event {
            AuditEvent::Log(log) => self.logs.push(log),
            AuditEvent::Snapshot(results) => {
                self.summary = results.summary();
                self.records = results.records;
            }
            AuditEvent::AwaitingDecision(pending) => {
                self.pending = Some(pending.view());
                self.status = SessionStatus::AwaitingDecision;
            }
            AuditEvent::DecisionResolved { token, .. } => {
                if self.pending.as_ref().is_some_and(|p| p.token == token) {
                    self.pending = None;
                }
                if !self.status.is_terminal() {
                    self.status = SessionStatus::Running;
                }
            }
            AuditEvent::Report(report) => self.report = Some(report),
            AuditEvent::Finished { status, .. } => {
                self.pending = None;
                self.status = status.into();
            }
        }
    }
}

// -- Application State ----------------------------------------------------------

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub engine: AuditEngine,
    pub discovery: Arc<dyn DiscoveryProvider>,
    pub sessions: Store<AuditSession>,
    pub controls: Store<RunControl>,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(engine: AuditEngine, discovery: Arc<dyn DiscoveryProvider>) -> Self {
        Self {
            engine,
            discovery,
            sessions: Store::new(),
            controls: Store::new(),
            metrics: None,
        }
    }

    /// Serve `/metrics` from this Prometheus recorder.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Register a started run and follow its event stream in the background.
    ///
    /// The run's control is dropped once the run ends; its session stays.
    pub fn track(&self, company_id: &str, run: AuditRun) -> RunId {
        let AuditRun {
            control,
            mut events,
            join,
        } = run;
        let run_id = control.run_id();
        let key = *run_id.as_uuid();
        self.sessions.insert(key, AuditSession::new(run_id, company_id));
        self.controls.insert(key, control);

        let sessions = self.sessions.clone();
        let controls = self.controls.clone();
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                sessions.update(&key, |s| s.apply(event));
            }
            // The stream ends after `Finished`; a panicked run never sends it.
            if let Err(e) = join.await {
                tracing::error!(run_id = %run_id, error = %e, "audit task aborted");
                sessions.update(&key, |s| {
                    s.status = SessionStatus::Failed;
                    s.pending = None;
                    s.error = Some("audit task aborted".to_string());
                });
            }
            controls.remove(&key);
        });
        run_id
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("engine", &self.engine)
            .field("sessions", &self.sessions.len())
            .field("metrics", &self.metrics.is_some())
            .finish_non_exhaustive()
    }
}
