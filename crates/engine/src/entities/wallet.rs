//! Payout wallets of users and agents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    ActionKind, ActionTable, EntityKind, Field, FieldKind, FieldValue, Money, Record, Status,
    SummarySpec, Transition, record::status_enum,
};

status_enum! {
    pub enum WalletStatus {
        Active => "active",
        Frozen => "frozen",
        Flagged => "flagged",
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    pub id: String,
    pub owner_id: String,
    pub owner_name: String,
    /// `user` or `agent`.
    pub owner_kind: String,
    pub balance: Money,
    pub pending_payout: Money,
    pub status: WalletStatus,
    pub updated_at: DateTime<Utc>,
}

type F = Field<Wallet>;

static FIELDS: &[F] = &[
    F::new("id", FieldKind::Id, |w| FieldValue::Text(&w.id)),
    F::new("owner_id", FieldKind::Id, |w| FieldValue::Text(&w.owner_id)),
    F::new("owner_name", FieldKind::Text, |w| FieldValue::Text(&w.owner_name)),
    F::new("owner_kind", FieldKind::Text, |w| FieldValue::Text(&w.owner_kind)),
    F::new("balance", FieldKind::Money, |w| FieldValue::Money(w.balance)),
    F::new("pending_payout", FieldKind::Money, |w| {
        FieldValue::Money(w.pending_payout)
    }),
    F::new("status", FieldKind::Status, |w| {
        FieldValue::Status(w.status.as_str())
    }),
    F::new("updated_at", FieldKind::Timestamp, |w| {
        FieldValue::Timestamp(w.updated_at)
    }),
];

static ACTIONS: ActionTable<WalletStatus> = ActionTable::new(&[
    Transition {
        action: ActionKind::FreezePayouts,
        from: &[WalletStatus::Active, WalletStatus::Flagged],
        to: WalletStatus::Frozen,
        requires_reason: true,
    },
    Transition {
        action: ActionKind::UnfreezePayouts,
        from: &[WalletStatus::Frozen],
        to: WalletStatus::Active,
        requires_reason: false,
    },
    Transition {
        action: ActionKind::Flag,
        from: &[WalletStatus::Active],
        to: WalletStatus::Flagged,
        requires_reason: false,
    },
    Transition {
        action: ActionKind::Reinstate,
        from: &[WalletStatus::Flagged],
        to: WalletStatus::Active,
        requires_reason: false,
    },
]);

impl Record for Wallet {
    type Status = WalletStatus;

    const ENTITY: EntityKind = EntityKind::Wallet;

    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> WalletStatus {
        self.status
    }

    fn display_name(&self) -> &str {
        &self.owner_name
    }

    fn fields() -> &'static [Field<Self>] {
        FIELDS
    }

    fn actions() -> &'static ActionTable<WalletStatus> {
        &ACTIONS
    }

    fn search_fields() -> &'static [&'static str] {
        &["owner_name", "owner_id", "id"]
    }

    fn summary_spec() -> SummarySpec {
        SummarySpec::new()
            .count("total")
            .count_by_status("status")
            .sum("total_balance", "balance")
            .sum("pending_payouts", "pending_payout")
            .mean("avg_balance", "balance")
    }
}
