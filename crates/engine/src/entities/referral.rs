//! Referral rewards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    ActionKind, ActionTable, EntityKind, Field, FieldKind, FieldValue, Money, Record, Status,
    SummarySpec, Transition, record::status_enum,
};

status_enum! {
    pub enum ReferralStatus {
        Pending => "pending",
        Completed => "completed",
        Rewarded => "rewarded",
        Rejected => "rejected",
    }
}

/// A referral: `referee` signed up with `referrer`'s code.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Referral {
    pub id: String,
    pub referrer_id: String,
    pub referrer_name: String,
    pub referee_name: String,
    pub code: String,
    pub status: ReferralStatus,
    pub reward: Money,
    pub created_at: DateTime<Utc>,
}

type F = Field<Referral>;

static FIELDS: &[F] = &[
    F::new("id", FieldKind::Id, |r| FieldValue::Text(&r.id)),
    F::new("referrer_id", FieldKind::Id, |r| FieldValue::Text(&r.referrer_id)),
    F::new("referrer_name", FieldKind::Text, |r| {
        FieldValue::Text(&r.referrer_name)
    }),
    F::new("referee_name", FieldKind::Text, |r| {
        FieldValue::Text(&r.referee_name)
    }),
    F::new("code", FieldKind::Text, |r| FieldValue::Text(&r.code)),
    F::new("status", FieldKind::Status, |r| {
        FieldValue::Status(r.status.as_str())
    }),
    F::new("reward", FieldKind::Money, |r| FieldValue::Money(r.reward)),
    F::new("created_at", FieldKind::Timestamp, |r| {
        FieldValue::Timestamp(r.created_at)
    }),
];

static ACTIONS: ActionTable<ReferralStatus> = ActionTable::new(&[
    Transition {
        action: ActionKind::ApproveReward,
        from: &[ReferralStatus::Completed],
        to: ReferralStatus::Rewarded,
        requires_reason: false,
    },
    Transition {
        action: ActionKind::Reject,
        from: &[ReferralStatus::Pending, ReferralStatus::Completed],
        to: ReferralStatus::Rejected,
        requires_reason: true,
    },
]);

impl Record for Referral {
    type Status = ReferralStatus;

    const ENTITY: EntityKind = EntityKind::Referral;

    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> ReferralStatus {
        self.status
    }

    fn fields() -> &'static [Field<Self>] {
        FIELDS
    }

    fn actions() -> &'static ActionTable<ReferralStatus> {
        &ACTIONS
    }

    fn search_fields() -> &'static [&'static str] {
        &["referrer_name", "referee_name", "code"]
    }

    fn summary_spec() -> SummarySpec {
        SummarySpec::new()
            .count("total")
            .count_by_status("status")
            .share("conversion_rate", "rewarded")
            .sum("total_rewards", "reward")
    }
}
