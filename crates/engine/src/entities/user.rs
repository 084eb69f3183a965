//! Marketplace users (households and businesses requesting pickups).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    ActionKind, ActionTable, EntityKind, Field, FieldKind, FieldValue, Money, Record, Status,
    SummarySpec, Transition, record::status_enum,
};

status_enum! {
    pub enum UserStatus {
        Active => "active",
        Inactive => "inactive",
        Suspended => "suspended",
        Flagged => "flagged",
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    pub location: String,
    pub status: UserStatus,
    pub total_pickups: u32,
    pub recycled_kg: f64,
    pub wallet_balance: Money,
    pub verified: bool,
    pub joined_at: DateTime<Utc>,
}

type F = Field<User>;

static FIELDS: &[F] = &[
    F::new("id", FieldKind::Id, |u| FieldValue::Text(&u.id)),
    F::new("name", FieldKind::Text, |u| FieldValue::Text(&u.name)),
    F::new("phone", FieldKind::Text, |u| FieldValue::Text(&u.phone)),
    F::new("email", FieldKind::Text, |u| {
        u.email.as_deref().map_or(FieldValue::Missing, FieldValue::Text)
    }),
    F::new("location", FieldKind::Text, |u| FieldValue::Text(&u.location)),
    F::new("status", FieldKind::Status, |u| {
        FieldValue::Status(u.status.as_str())
    }),
    F::new("total_pickups", FieldKind::Number, |u| {
        FieldValue::Number(f64::from(u.total_pickups))
    }),
    F::new("recycled_kg", FieldKind::Number, |u| {
        FieldValue::Number(u.recycled_kg)
    }),
    F::new("wallet_balance", FieldKind::Money, |u| {
        FieldValue::Money(u.wallet_balance)
    }),
    F::new("verified", FieldKind::Flag, |u| FieldValue::Flag(u.verified)),
    F::new("joined_at", FieldKind::Timestamp, |u| {
        FieldValue::Timestamp(u.joined_at)
    }),
];

static ACTIONS: ActionTable<UserStatus> = ActionTable::new(&[
    Transition {
        action: ActionKind::Flag,
        from: &[UserStatus::Active, UserStatus::Inactive],
        to: UserStatus::Flagged,
        requires_reason: false,
    },
    Transition {
        action: ActionKind::Suspend,
        from: &[UserStatus::Active, UserStatus::Inactive],
        to: UserStatus::Suspended,
        requires_reason: true,
    },
    Transition {
        action: ActionKind::Reinstate,
        from: &[UserStatus::Suspended, UserStatus::Flagged],
        to: UserStatus::Active,
        requires_reason: false,
    },
]);

impl Record for User {
    type Status = UserStatus;

    const ENTITY: EntityKind = EntityKind::User;

    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> UserStatus {
        self.status
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn fields() -> &'static [Field<Self>] {
        FIELDS
    }

    fn actions() -> &'static ActionTable<UserStatus> {
        &ACTIONS
    }

    fn search_fields() -> &'static [&'static str] {
        &["name", "phone", "email", "id"]
    }

    fn summary_spec() -> SummarySpec {
        SummarySpec::new()
            .count("total")
            .count_by_status("status")
            .sum("recycled_kg", "recycled_kg")
            .sum("wallet_balances", "wallet_balance")
    }
}
