//! Pickup requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    ActionKind, ActionTable, EntityKind, Field, FieldKind, FieldValue, Money, Record, Status,
    SummarySpec, Transition, record::status_enum,
};

status_enum! {
    pub enum PickupStatus {
        Pending => "pending",
        Assigned => "assigned",
        InProgress => "in_progress",
        Completed => "completed",
        Cancelled => "cancelled",
        Flagged => "flagged",
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pickup {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    /// Unset until an agent accepts the request.
    #[serde(default)]
    pub agent_id: Option<String>,
    pub material: String,
    pub address: String,
    pub weight_kg: f64,
    pub amount: Money,
    pub status: PickupStatus,
    pub scheduled_for: DateTime<Utc>,
}

type F = Field<Pickup>;

static FIELDS: &[F] = &[
    F::new("id", FieldKind::Id, |p| FieldValue::Text(&p.id)),
    F::new("user_id", FieldKind::Id, |p| FieldValue::Text(&p.user_id)),
    F::new("user_name", FieldKind::Text, |p| FieldValue::Text(&p.user_name)),
    F::new("agent_id", FieldKind::Id, |p| {
        p.agent_id.as_deref().map_or(FieldValue::Missing, FieldValue::Text)
    }),
    F::new("material", FieldKind::Text, |p| FieldValue::Text(&p.material)),
    F::new("address", FieldKind::Text, |p| FieldValue::Text(&p.address)),
    F::new("weight_kg", FieldKind::Number, |p| FieldValue::Number(p.weight_kg)),
    F::new("amount", FieldKind::Money, |p| FieldValue::Money(p.amount)),
    F::new("status", FieldKind::Status, |p| {
        FieldValue::Status(p.status.as_str())
    }),
    F::new("scheduled_for", FieldKind::Timestamp, |p| {
        FieldValue::Timestamp(p.scheduled_for)
    }),
];

static ACTIONS: ActionTable<PickupStatus> = ActionTable::new(&[
    Transition {
        action: ActionKind::Cancel,
        from: &[PickupStatus::Pending, PickupStatus::Assigned],
        to: PickupStatus::Cancelled,
        requires_reason: true,
    },
    Transition {
        action: ActionKind::Flag,
        from: &[
            PickupStatus::Pending,
            PickupStatus::Assigned,
            PickupStatus::InProgress,
        ],
        to: PickupStatus::Flagged,
        requires_reason: false,
    },
    Transition {
        action: ActionKind::Reinstate,
        from: &[PickupStatus::Flagged],
        to: PickupStatus::Pending,
        requires_reason: false,
    },
]);

impl Record for Pickup {
    type Status = PickupStatus;

    const ENTITY: EntityKind = EntityKind::Pickup;

    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> PickupStatus {
        self.status
    }

    fn fields() -> &'static [Field<Self>] {
        FIELDS
    }

    fn actions() -> &'static ActionTable<PickupStatus> {
        &ACTIONS
    }

    fn search_fields() -> &'static [&'static str] {
        &["id", "user_name", "address", "material"]
    }

    fn summary_spec() -> SummarySpec {
        SummarySpec::new()
            .count("total")
            .count_by_status("status")
            .share("completion_rate", "completed")
            .sum("total_weight_kg", "weight_kg")
            .sum("total_paid", "amount")
    }
}
