//! # Audit Runs API
//!
//! Start an audit, follow it, resolve its human-in-the-loop decisions and
//! cancel it.
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | POST | `/v1/audits` | [`start_audit`] |
//! | GET | `/v1/audits/{run_id}` | [`get_audit`] |
//! | POST | `/v1/audits/{run_id}/decision` | [`submit_decision`] |
//! | POST | `/v1/audits/{run_id}/cancel` | [`cancel_audit`] |

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use scaudit_core::supplier::MAX_FIELD_LEN;
use scaudit_core::{DecisionToken, RunId, Supplier, SupplierId, Timestamp};
use scaudit_providers::discover_or_fallback;
use scaudit_workflow::{RunControl, SubmitOutcome};

use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::state::{AppState, AuditSession};

/// Upper bound on suppliers accepted in one request.
const MAX_SUPPLIERS: usize = 1000;

/// One supplier in a start request. The id is optional and assigned by
/// position when absent.
#[derive(Debug, Clone, Deserialize)]
pub struct SupplierInput {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub location: String,
    #[serde(alias = "estimated_emissions", alias = "estimatedEmissions")]
    pub emissions: f64,
    #[serde(default, alias = "complianceFlags")]
    pub compliance_flags: u32,
}

/// Request to start an audit.
#[derive(Debug, Deserialize)]
pub struct StartAuditRequest {
    pub company_id: String,
    /// Suppliers to audit. Discovery is used when absent.
    #[serde(default)]
    pub suppliers: Option<Vec<SupplierInput>>,
}

impl Validate for StartAuditRequest {
    fn validate(&self) -> Result<(), String> {
        if self.company_id.trim().is_empty() {
            return Err("company_id must not be empty".to_string());
        }
        if self.company_id.chars().count() > MAX_FIELD_LEN {
            return Err(format!("company_id must not exceed {MAX_FIELD_LEN} characters"));
        }
        if let Some(suppliers) = &self.suppliers {
            if suppliers.len() > MAX_SUPPLIERS {
                return Err(format!("suppliers must not exceed {MAX_SUPPLIERS} entries"));
            }
            if let Some(index) = suppliers.iter().position(|s| s.name.trim().is_empty()) {
                return Err(format!("suppliers[{index}].name must not be empty"));
            }
        }
        Ok(())
    }
}

impl StartAuditRequest {
    fn into_suppliers(inputs: Vec<SupplierInput>) -> Result<Vec<Supplier>, AppError> {
        let millis = Timestamp::now().epoch_millis();
        inputs
            .into_iter()
            .enumerate()
            .map(|(index, input)| {
                let id = match input.id {
                    Some(id) => SupplierId::new(id)?,
                    None => SupplierId::indexed(index, millis),
                };
                Supplier::new(
                    id,
                    input.name,
                    input.industry,
                    input.location,
                    input.emissions,
                    input.compliance_flags,
                )
                .map_err(|e| AppError::Validation(format!("suppliers[{index}]: {e}")))
            })
            .collect()
    }
}

/// Response to a start request.
#[derive(Debug, Serialize, Deserialize)]
pub struct StartAuditResponse {
    pub run_id: RunId,
    pub suppliers: usize,
}

/// A reviewer's decision. Without a token the run's current decision is
/// resolved; with one, only the decision that token was issued for.
#[derive(Debug, Deserialize)]
pub struct DecisionRequest {
    pub approved: bool,
    #[serde(default)]
    pub token: Option<DecisionToken>,
}

impl Validate for DecisionRequest {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Result of a decision submission.
#[derive(Debug, Serialize, Deserialize)]
pub struct DecisionResponse {
    pub outcome: SubmitOutcome,
}

/// Acknowledgement of a cancel request.
#[derive(Debug, Serialize, Deserialize)]
pub struct CancelResponse {
    pub run_id: RunId,
    pub cancelled: bool,
}

/// Build the audits router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/audits", post(start_audit))
        .route("/v1/audits/{run_id}", get(get_audit))
        .route("/v1/audits/{run_id}/decision", post(submit_decision))
        .route("/v1/audits/{run_id}/cancel", post(cancel_audit))
}

/// The control of a live run, `None` for a run that has already ended.
fn control_for(state: &AppState, run_id: &Uuid) -> Result<Option<RunControl>, AppError> {
    match state.controls.get(run_id) {
        Some(control) => Ok(Some(control)),
        None if state.sessions.get(run_id).is_some() => Ok(None),
        None => Err(AppError::NotFound(format!("audit run {run_id}"))),
    }
}

/// POST /v1/audits: Start an audit run.
pub async fn start_audit(
    State(state): State<AppState>,
    body: Result<Json<StartAuditRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<StartAuditResponse>), AppError> {
    let req = extract_validated_json(body)?;
    let company_id = req.company_id.trim().to_string();

    let suppliers = match req.suppliers {
        Some(inputs) => StartAuditRequest::into_suppliers(inputs)?,
        None => discover_or_fallback(state.discovery.as_ref(), &company_id).await,
    };
    let count = suppliers.len();

    let run = state.engine.start_audit(company_id.clone(), suppliers);
    let run_id = state.track(&company_id, run);
    tracing::info!(run_id = %run_id, company_id = %company_id, suppliers = count, "audit accepted");

    Ok((
        StatusCode::ACCEPTED,
        Json(StartAuditResponse {
            run_id,
            suppliers: count,
        }),
    ))
}

/// GET /v1/audits/{run_id}: Current state of a run.
pub async fn get_audit(
    State(state): State<AppState>,
    Path(run_id): Path<Uuid>,
) -> Result<Json<AuditSession>, AppError> {
    state
        .sessions
        .get(&run_id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("audit run {run_id}")))
}

/// POST /v1/audits/{run_id}/decision: Resolve the run's pending decision.
pub async fn submit_decision(
    State(state): State<AppState>,
    Path(run_id): Path<Uuid>,
    body: Result<Json<DecisionRequest>, JsonRejection>,
) -> Result<Json<DecisionResponse>, AppError> {
    let req = extract_validated_json(body)?;
    let control = control_for(&state, &run_id)?;

    let outcome = match (control, &req.token) {
        (None, _) => SubmitOutcome::NoPendingDecision,
        (Some(control), Some(token)) => control.submit_decision_for(token, req.approved),
        (Some(control), None) => control.submit_decision(req.approved),
    };
    tracing::info!(
        run_id = %run_id,
        approved = req.approved,
        outcome = outcome.as_str(),
        "decision submitted"
    );
    Ok(Json(DecisionResponse { outcome }))
}

/// POST /v1/audits/{run_id}/cancel: Request cancellation.
///
/// Returns 202; the run reaches `cancelled` at its next suspension point.
/// A run that has already ended is left as it is (`cancelled: false`).
pub async fn cancel_audit(
    State(state): State<AppState>,
    Path(run_id): Path<Uuid>,
) -> Result<(StatusCode, Json<CancelResponse>), AppError> {
    let cancelled = match control_for(&state, &run_id)? {
        Some(control) => {
            control.cancel();
            tracing::info!(run_id = %run_id, "cancellation requested");
            control.is_cancelled()
        }
        None => false,
    };
    Ok((
        StatusCode::ACCEPTED,
        Json(CancelResponse {
            run_id: RunId(run_id),
            cancelled,
        }),
    ))
}
