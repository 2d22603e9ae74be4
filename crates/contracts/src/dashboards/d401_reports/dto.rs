use crate::domain::a003_policy::aggregate::Policy;
use crate::domain::a003_policy::status::PolicyStatus;
use crate::domain::a006_commission::aggregate::CommissionReportRow;
use crate::shared::form::{non_empty, optional_date, required};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    NewPolicies,
    ActivePolicies,
    LapsedPolicies,
    AgentCommissions,
}

impl ReportType {
    pub const ALL: [ReportType; 4] = [
        ReportType::NewPolicies,
        ReportType::ActivePolicies,
        ReportType::LapsedPolicies,
        ReportType::AgentCommissions,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::NewPolicies => "new_policies",
            ReportType::ActivePolicies => "active_policies",
            ReportType::LapsedPolicies => "lapsed_policies",
            ReportType::AgentCommissions => "agent_commissions",
        }
    }

    /// Status filter for the status-based reports
    pub fn status(&self) -> Option<PolicyStatus> {
        match self {
            ReportType::ActivePolicies => Some(PolicyStatus::Active),
            ReportType::LapsedPolicies => Some(PolicyStatus::Lapsed),
            _ => None,
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s.trim())
            .ok_or_else(|| format!("Unknown report type '{}'", s))
    }
}

/// Query string (GET) or form body (POST) of `/reports`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportForm {
    pub report_type: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Validated report parameters; both dates are inclusive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRequest {
    pub report_type: ReportType,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl TryFrom<ReportForm> for ReportRequest {
    type Error = String;

    fn try_from(form: ReportForm) -> Result<Self, Self::Error> {
        let report_type = required("report_type", &form.report_type)?.parse()?;
        let start_date = optional_date("start_date", &form.start_date)?;
        let end_date = optional_date("end_date", &form.end_date)?;
        if let (Some(start), Some(end)) = (start_date, end_date) {
            if start > end {
                return Err("start_date must not be after end_date".to_string());
            }
        }
        Ok(Self {
            report_type,
            start_date,
            end_date,
        })
    }
}

impl ReportForm {
    /// A bare `GET /reports` has nothing to run yet
    pub fn is_empty(&self) -> bool {
        non_empty(&self.report_type).is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "rows", rename_all = "snake_case")]
pub enum ReportRows {
    Policies(Vec<Policy>),
    Commissions(Vec<CommissionReportRow>),
}

impl ReportRows {
    pub fn len(&self) -> usize {
        match self {
            ReportRows::Policies(rows) => rows.len(),
            ReportRows::Commissions(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub request: ReportRequest,
    pub data: ReportRows,
    /// Sum of commission amounts; only set for `agent_commissions`
    pub total_amount: Option<f64>,
}

/// Response of `GET /reports`: the available types plus, when requested, a report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportsPage {
    pub report_types: Vec<ReportType>,
    pub report: Option<Report>,
}
