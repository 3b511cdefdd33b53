// Named server procedures and the shapes of their answers.
//
// Answers are decoded leniently: procedures evolve server-side, so every field the
// dashboard does not strictly need has a default.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const HEALTH_CHECK: &str = "health-check";
pub const PERFORMANCE_TEST: &str = "performance-test";
pub const REVENUE_REPORT: &str = "revenue-report";
pub const RECONCILE_STRIPE: &str = "reconcile-stripe";
pub const EMERGENCY_WORKFLOW_TEST: &str = "emergency-workflow-test";
pub const AI_CHAT_TEST: &str = "ai-chat-test";
pub const SEND_FAMILY_INVITE: &str = "send-family-invite";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    #[serde(default)]
    pub services: BTreeMap<String, String>,
    #[serde(default)]
    pub checked_at: Option<String>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        matches!(self.status.as_str(), "ok" | "healthy")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceReport {
    pub requests: u64,
    pub errors: u64,
    pub avg_response_ms: f64,
    pub p95_response_ms: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevenueReport {
    pub total_revenue: f64,
    pub order_count: u64,
    pub average_order_value: f64,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileReport {
    pub checked: u64,
    pub updated: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencyTestStep {
    pub name: String,
    pub passed: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencyTestReport {
    pub passed: bool,
    /// Measured around the call when the procedure does not report it.
    #[serde(default)]
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub steps: Vec<EmergencyTestStep>,
}

impl EmergencyTestReport {
    pub fn failed_steps(&self) -> impl Iterator<Item = &EmergencyTestStep> {
        self.steps.iter().filter(|step| !step.passed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub tokens_used: Option<u32>,
}
