//! Pickup agents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    ActionKind, ActionTable, EntityKind, Field, FieldKind, FieldValue, Money, Record, Status,
    SummarySpec, Transition, record::status_enum,
};

status_enum! {
    pub enum AgentStatus {
        Active => "active",
        Idle => "idle",
        EnRoute => "en_route",
        Offline => "offline",
        Suspended => "suspended",
        Flagged => "flagged",
    }
}

/// A field agent collecting recyclables.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub zone: String,
    pub status: AgentStatus,
    pub completed_pickups: u32,
    /// Percent of assigned pickups completed, `0..=100`.
    pub completion_rate: f64,
    pub rating: f64,
    pub earnings: Money,
    pub last_active: DateTime<Utc>,
}

type F = Field<Agent>;

static FIELDS: &[F] = &[
    F::new("id", FieldKind::Id, |a| FieldValue::Text(&a.id)),
    F::new("name", FieldKind::Text, |a| FieldValue::Text(&a.name)),
    F::new("phone", FieldKind::Text, |a| FieldValue::Text(&a.phone)),
    F::new("zone", FieldKind::Text, |a| FieldValue::Text(&a.zone)),
    F::new("status", FieldKind::Status, |a| {
        FieldValue::Status(a.status.as_str())
    }),
    F::new("completed_pickups", FieldKind::Number, |a| {
        FieldValue::Number(f64::from(a.completed_pickups))
    }),
    F::new("completion_rate", FieldKind::Number, |a| {
        FieldValue::Number(a.completion_rate)
    }),
    F::new("rating", FieldKind::Number, |a| FieldValue::Number(a.rating)),
    F::new("earnings", FieldKind::Money, |a| FieldValue::Money(a.earnings)),
    F::new("last_active", FieldKind::Timestamp, |a| {
        FieldValue::Timestamp(a.last_active)
    }),
];

static ACTIONS: ActionTable<AgentStatus> = ActionTable::new(&[
    Transition {
        action: ActionKind::Flag,
        from: &[AgentStatus::Active, AgentStatus::Idle],
        to: AgentStatus::Flagged,
        requires_reason: false,
    },
    Transition {
        action: ActionKind::Suspend,
        from: &[AgentStatus::Active, AgentStatus::Idle],
        to: AgentStatus::Suspended,
        requires_reason: true,
    },
    Transition {
        action: ActionKind::Reinstate,
        from: &[AgentStatus::Suspended, AgentStatus::Flagged],
        to: AgentStatus::Active,
        requires_reason: false,
    },
]);

impl Record for Agent {
    type Status = AgentStatus;

    const ENTITY: EntityKind = EntityKind::Agent;

    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> AgentStatus {
        self.status
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn fields() -> &'static [Field<Self>] {
        FIELDS
    }

    fn actions() -> &'static ActionTable<AgentStatus> {
        &ACTIONS
    }

    fn search_fields() -> &'static [&'static str] {
        &["name", "phone", "id"]
    }

    fn summary_spec() -> SummarySpec {
        SummarySpec::new()
            .count("total")
            .count_by_status("status")
            .mean("avg_completion_rate", "completion_rate")
            .mean("avg_rating", "rating")
            .sum("total_earnings", "earnings")
    }
}
