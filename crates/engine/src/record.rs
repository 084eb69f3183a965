//! Record primitives.
//!
//! A `Record` is one row of a dashboard listing (an agent, a pickup, a wallet,
//! ...). Instead of looking fields up by name at runtime, every entity
//! declares a static accessor table of [`Field`]s that the matcher, sorter and
//! aggregator resolve once and then call through plain function pointers.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ActionTable, EngineError, Money, SummarySpec};

/// Kind of a declared field. Decides which constraints and metrics apply.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Id,
    Text,
    Status,
    Number,
    Money,
    Timestamp,
    Flag,
}

impl FieldKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Text => "text",
            Self::Status => "status",
            Self::Number => "number",
            Self::Money => "money",
            Self::Timestamp => "timestamp",
            Self::Flag => "flag",
        }
    }

    /// Free-text kinds accept substring constraints.
    pub fn is_textual(self) -> bool {
        matches!(self, Self::Id | Self::Text)
    }

    /// Ordered kinds accept range constraints and numeric metrics.
    pub fn is_ordered(self) -> bool {
        matches!(self, Self::Number | Self::Money | Self::Timestamp)
    }
}

/// Value read from a record through its accessor table.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Status(&'static str),
    Number(f64),
    Money(Money),
    Timestamp(DateTime<Utc>),
    Flag(bool),
    /// Optional field without a value.
    Missing,
}

impl FieldValue<'_> {
    /// Renders the value for a table cell.
    pub fn display(&self) -> String {
        match self {
            Self::Text(text) => (*text).to_string(),
            Self::Status(status) => (*status).to_string(),
            Self::Number(n) if n.fract() == 0.0 => format!("{n:.0}"),
            Self::Number(n) => format!("{n:.2}"),
            Self::Money(money) => money.to_string(),
            Self::Timestamp(at) => at.format("%Y-%m-%d %H:%M").to_string(),
            Self::Flag(flag) => flag.to_string(),
            Self::Missing => "-".to_string(),
        }
    }
}

/// One entry of an entity's accessor table.
pub struct Field<R> {
    pub name: &'static str,
    pub kind: FieldKind,
    pub get: for<'a> fn(&'a R) -> FieldValue<'a>,
}

impl<R> Field<R> {
    pub const fn new(
        name: &'static str,
        kind: FieldKind,
        get: for<'a> fn(&'a R) -> FieldValue<'a>,
    ) -> Self {
        Self { name, kind, get }
    }

    pub fn read<'a>(&self, record: &'a R) -> FieldValue<'a> {
        (self.get)(record)
    }
}

impl<R> Clone for Field<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for Field<R> {}

impl<R> fmt::Debug for Field<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish()
    }
}

/// A closed status enum of an entity.
pub trait Status: Copy + Eq + fmt::Debug + 'static {
    /// Every member, in declaration order.
    const ALL: &'static [Self];

    fn as_str(self) -> &'static str;

    fn parse(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.as_str() == value)
    }
}

/// Declares a snake_case status enum together with its [`Status`] impl.
macro_rules! status_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident { $($variant:ident => $label:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(rename_all = "snake_case")]
        $vis enum $name {
            $($variant),+
        }

        impl $crate::Status for $name {
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str($crate::Status::as_str(*self))
            }
        }
    };
}

pub(crate) use status_enum;

/// The entities shown on the dashboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Agent,
    User,
    Pickup,
    Referral,
    AuditLog,
    Wallet,
}

impl EntityKind {
    pub const ALL: &'static [EntityKind] = &[
        Self::Agent,
        Self::User,
        Self::Pickup,
        Self::Referral,
        Self::AuditLog,
        Self::Wallet,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Agent => "agent",
            Self::User => "user",
            Self::Pickup => "pickup",
            Self::Referral => "referral",
            Self::AuditLog => "audit_log",
            Self::Wallet => "wallet",
        }
    }

    /// Capitalized label used in notifications.
    pub fn label(self) -> &'static str {
        match self {
            Self::Agent => "Agent",
            Self::User => "User",
            Self::Pickup => "Pickup",
            Self::Referral => "Referral",
            Self::AuditLog => "Audit log",
            Self::Wallet => "Wallet",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for EntityKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "agent" | "agents" => Ok(Self::Agent),
            "user" | "users" => Ok(Self::User),
            "pickup" | "pickups" => Ok(Self::Pickup),
            "referral" | "referrals" => Ok(Self::Referral),
            "audit_log" | "audit_logs" => Ok(Self::AuditLog),
            "wallet" | "wallets" => Ok(Self::Wallet),
            other => Err(EngineError::UnknownEntity(other.to_string())),
        }
    }
}

/// A row that can flow through the listing engine and the action dispatcher.
pub trait Record: Sized + 'static {
    type Status: Status;

    const ENTITY: EntityKind;

    /// Name of the field holding [`Record::status`].
    const STATUS_FIELD: &'static str = "status";

    /// Stable identifier, unique within a collection.
    fn id(&self) -> &str;

    fn status(&self) -> Self::Status;

    /// Human-readable name used in notifications. Defaults to the id.
    fn display_name(&self) -> &str {
        self.id()
    }

    /// Accessor table. Names are unique.
    fn fields() -> &'static [Field<Self>];

    /// Legal status transitions.
    fn actions() -> &'static ActionTable<Self::Status>;

    /// Fields covered by the free-text search box.
    fn search_fields() -> &'static [&'static str];

    /// Cards shown above the listing.
    fn summary_spec() -> SummarySpec;

    fn field(name: &str) -> Option<&'static Field<Self>> {
        Self::fields().iter().find(|field| field.name == name)
    }

    fn require_field(name: &str) -> Result<&'static Field<Self>, EngineError> {
        Self::field(name).ok_or_else(|| EngineError::UnknownField(name.to_string()))
    }
}
