use crate::domain::a003_policy::aggregate::Policy;
use crate::domain::a006_commission::aggregate::Commission;
use crate::domain::common::{short_code, AggregateRoot, BaseAggregate, EntityMetadata};
use crate::shared::form::{non_empty, optional_f64, required};
use serde::{Deserialize, Serialize};

/// Commission rate applied when the form leaves it blank (10%)
pub const DEFAULT_COMMISSION_RATE: f64 = 0.10;

// ============================================================================
// ID Type
// ============================================================================

crate::uuid_aggregate_id!(
    /// Уникальный идентификатор агента
    AgentId
);

// ============================================================================
// Aggregate Root
// ============================================================================

/// Sales agent who brings in policies and earns commission on their payments.
///
/// `base.description` holds the agent's name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    #[serde(flatten)]
    pub base: BaseAggregate<AgentId>,

    pub email: Option<String>,
    pub phone: Option<String>,
    /// Fraction of each payment paid out as commission; [0, 1] expected but not enforced
    pub commission_rate: f64,
}

impl Agent {
    /// Создать нового агента для вставки в БД
    pub fn new_for_insert(dto: AgentDto) -> Self {
        let id = AgentId::new_v4();
        let base = BaseAggregate::new(id, short_code("AGT", id.value()), dto.name);

        Self {
            base,
            email: dto.email,
            phone: dto.phone,
            commission_rate: dto.commission_rate,
        }
    }

    pub fn name(&self) -> &str {
        &self.base.description
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.base.description.trim().is_empty() {
            return Err("Agent name cannot be empty".into());
        }
        if !self.commission_rate.is_finite() {
            return Err("Commission rate must be a finite number".into());
        }
        Ok(())
    }

    /// Хук перед записью
    pub fn before_write(&mut self) {
        self.base.before_write();
    }
}

impl AggregateRoot for Agent {
    fn code(&self) -> &str {
        &self.base.code
    }

    fn description(&self) -> &str {
        &self.base.description
    }

    fn metadata(&self) -> &EntityMetadata {
        &self.base.metadata
    }

    fn element_name() -> &'static str {
        "Agent"
    }
}

// ============================================================================
// Forms / DTOs
// ============================================================================

/// Raw `POST /agents` form
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AgentForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub commission_rate: Option<String>,
}

/// Validated input for creating an agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentDto {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub commission_rate: f64,
}

impl TryFrom<AgentForm> for AgentDto {
    type Error = String;

    fn try_from(form: AgentForm) -> Result<Self, Self::Error> {
        Ok(Self {
            name: required("name", &form.name)?,
            email: non_empty(&form.email),
            phone: non_empty(&form.phone),
            commission_rate: optional_f64("commission_rate", &form.commission_rate)?
                .unwrap_or(DEFAULT_COMMISSION_RATE),
        })
    }
}

/// `GET /agents/:id`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentDetail {
    pub agent: Agent,
    pub policies: Vec<Policy>,
    pub commissions: Vec<Commission>,
    /// Sum of all commission amounts, 0 when there are none
    pub total_commission: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, rate: Option<&str>) -> AgentForm {
        AgentForm {
            name: Some(name.into()),
            email: Some("".into()),
            phone: Some("+1 555 0100".into()),
            commission_rate: rate.map(Into::into),
        }
    }

    #[test]
    fn test_blank_rate_defaults_to_ten_percent() {
        let dto = AgentDto::try_from(form("Ann Lee", Some(""))).unwrap();
        assert_eq!(dto.commission_rate, DEFAULT_COMMISSION_RATE);
        assert_eq!(dto.email, None);
        assert_eq!(dto.phone.as_deref(), Some("+1 555 0100"));
    }

    #[test]
    fn test_explicit_rate_is_kept() {
        let dto = AgentDto::try_from(form("Ann Lee", Some("0.15"))).unwrap();
        assert_eq!(dto.commission_rate, 0.15);
    }

    #[test]
    fn test_rate_out_of_range_is_accepted() {
        let dto = AgentDto::try_from(form("Ann Lee", Some("1.5"))).unwrap();
        let agent = Agent::new_for_insert(dto);
        assert!(agent.validate().is_ok());
    }

    #[test]
    fn test_missing_name_rejected() {
        assert!(AgentDto::try_from(form("  ", None)).is_err());
    }

    #[test]
    fn test_new_agent_code_and_name() {
        let agent = Agent::new_for_insert(AgentDto::try_from(form("Ann Lee", None)).unwrap());
        assert!(agent.code().starts_with("AGT-"));
        assert_eq!(agent.name(), "Ann Lee");
        assert_eq!(Agent::element_name(), "Agent");
    }
}
