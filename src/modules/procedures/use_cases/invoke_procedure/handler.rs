// Typed wrappers over the gateway's procedure calls.
//
// Failures reach the operator verbatim and are never retried automatically.

use crate::modules::orders::core::order::Order;
use crate::modules::procedures::core::reports::{
    AI_CHAT_TEST, ChatReply, EMERGENCY_WORKFLOW_TEST, EmergencyTestReport, HEALTH_CHECK,
    HealthReport, PERFORMANCE_TEST, PerformanceReport, RECONCILE_STRIPE, REVENUE_REPORT,
    ReconcileReport, RevenueReport, SEND_FAMILY_INVITE,
};
use crate::modules::sync::use_cases::mutate_entity::handler::{
    MutationCoordinator, MutationError,
};
use crate::shared::context::AppContext;
use crate::shared::core::row::RecordId;
use crate::shared::infrastructure::gateway::policy::{CallPolicy, run_with_policy};
use crate::shared::infrastructure::gateway::{RemoteError, RemoteGateway};
use crate::shared::infrastructure::notifier::{Notification, Notifier};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProcedureError {
    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("{procedure} returned an unexpected answer: {message}")]
    Decode { procedure: String, message: String },

    #[error(transparent)]
    Mutation(#[from] MutationError),
}

pub struct ProcedureRunner {
    gateway: Arc<dyn RemoteGateway>,
    notifier: Arc<dyn Notifier>,
    policy: CallPolicy,
}

fn decode<T: DeserializeOwned>(procedure: &str, value: Value) -> Result<T, ProcedureError> {
    serde_json::from_value(value).map_err(|error| ProcedureError::Decode {
        procedure: procedure.to_string(),
        message: error.to_string(),
    })
}

impl ProcedureRunner {
    pub fn new(ctx: &AppContext) -> Self {
        Self {
            gateway: ctx.gateway.clone(),
            notifier: ctx.notifier.clone(),
            policy: ctx.config.mutation_policy(),
        }
    }

    async fn call<T: DeserializeOwned>(
        &self,
        procedure: &str,
        payload: Value,
    ) -> Result<T, ProcedureError> {
        let result = run_with_policy(&self.policy, || {
            self.gateway.invoke(procedure, payload.clone())
        })
        .await
        .map_err(ProcedureError::from)
        .and_then(|value| decode(procedure, value));
        if let Err(error) = &result {
            warn!(procedure, %error, "procedure failed");
            self.notifier.notify(Notification::error(
                format!("{procedure} failed"),
                error.to_string(),
            ));
        }
        result
    }

    pub async fn health_check(&self) -> Result<HealthReport, ProcedureError> {
        let report: HealthReport = self.call(HEALTH_CHECK, json!({})).await?;
        if !report.is_healthy() {
            self.notifier.notify(Notification::warning(
                "Backend reports degraded health",
                report.status.clone(),
            ));
        }
        Ok(report)
    }

    pub async fn performance_test(&self) -> Result<PerformanceReport, ProcedureError> {
        self.call(PERFORMANCE_TEST, json!({})).await
    }

    pub async fn revenue_report(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<RevenueReport, ProcedureError> {
        self.call(REVENUE_REPORT, json!({ "from": from, "to": to }))
            .await
    }

    /// Reconciles payments, then reloads the orders view. A failed reload is a partial failure.
    pub async fn reconcile_stripe(
        &self,
        orders: &MutationCoordinator<Order>,
    ) -> Result<ReconcileReport, ProcedureError> {
        let response = orders.invoke_then_reload(RECONCILE_STRIPE, json!({})).await?;
        let report: ReconcileReport = decode(RECONCILE_STRIPE, response)?;
        info!(checked = report.checked, updated = report.updated, "payments reconciled");
        Ok(report)
    }

    /// Pass/fail plus duration; the duration is measured here when the procedure omits it.
    pub async fn run_emergency_test(
        &self,
        scenario: &str,
    ) -> Result<EmergencyTestReport, ProcedureError> {
        let started = Instant::now();
        let mut report: EmergencyTestReport = self
            .call(EMERGENCY_WORKFLOW_TEST, json!({ "scenario": scenario }))
            .await?;
        let duration_ms = *report
            .duration_ms
            .get_or_insert(u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX));

        let notification = if report.passed {
            Notification::success(format!("Emergency test passed in {duration_ms} ms"))
        } else {
            let failed: Vec<&str> = report.failed_steps().map(|step| step.name.as_str()).collect();
            Notification::error(
                format!("Emergency test failed after {duration_ms} ms"),
                if failed.is_empty() {
                    "no step details reported".to_string()
                } else {
                    format!("failed steps: {}", failed.join(", "))
                },
            )
        };
        self.notifier.notify(notification);
        Ok(report)
    }

    pub async fn ai_chat_test(&self, message: &str) -> Result<ChatReply, ProcedureError> {
        self.call(AI_CHAT_TEST, json!({ "message": message, "test": true }))
            .await
    }

    /// Re-sends the invite email for an existing invite.
    pub async fn send_family_invite(
        &self,
        invite_id: &RecordId,
        email: &str,
    ) -> Result<Value, ProcedureError> {
        let response: Value = self
            .call(
                SEND_FAMILY_INVITE,
                json!({ "invite_id": invite_id, "email": email }),
            )
            .await?;
        self.notifier
            .notify(Notification::success(format!("Invite sent to {email}")));
        Ok(response)
    }
}
