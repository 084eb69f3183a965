//! Audit trail of operator activity. Entries are immutable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    ActionTable, EntityKind, Field, FieldKind, FieldValue, Record, Status, SummarySpec,
    record::status_enum,
};

status_enum! {
    pub enum Severity {
        Info => "info",
        Warning => "warning",
        Critical => "critical",
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuditLog {
    pub id: String,
    pub actor: String,
    pub action: String,
    pub target: String,
    #[serde(default)]
    pub ip_address: Option<String>,
    pub severity: Severity,
    pub at: DateTime<Utc>,
}

type F = Field<AuditLog>;

static FIELDS: &[F] = &[
    F::new("id", FieldKind::Id, |l| FieldValue::Text(&l.id)),
    F::new("actor", FieldKind::Text, |l| FieldValue::Text(&l.actor)),
    F::new("action", FieldKind::Text, |l| FieldValue::Text(&l.action)),
    F::new("target", FieldKind::Text, |l| FieldValue::Text(&l.target)),
    F::new("ip_address", FieldKind::Text, |l| {
        l.ip_address.as_deref().map_or(FieldValue::Missing, FieldValue::Text)
    }),
    F::new("severity", FieldKind::Status, |l| {
        FieldValue::Status(l.severity.as_str())
    }),
    F::new("at", FieldKind::Timestamp, |l| FieldValue::Timestamp(l.at)),
];

static ACTIONS: ActionTable<Severity> = ActionTable::new(&[]);

impl Record for AuditLog {
    type Status = Severity;

    const ENTITY: EntityKind = EntityKind::AuditLog;
    const STATUS_FIELD: &'static str = "severity";

    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> Severity {
        self.severity
    }

    fn fields() -> &'static [Field<Self>] {
        FIELDS
    }

    fn actions() -> &'static ActionTable<Severity> {
        &ACTIONS
    }

    fn search_fields() -> &'static [&'static str] {
        &["actor", "action", "target"]
    }

    fn summary_spec() -> SummarySpec {
        SummarySpec::new().count("total").count_by_status("severity")
    }
}
