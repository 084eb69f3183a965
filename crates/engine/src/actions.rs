//! Action dispatching.
//!
//! The dispatcher never touches a record. It checks a requested action
//! against the entity's transition table and, when legal, emits an
//! [`ActionRequest`] for whoever owns the data to apply, plus a
//! [`Notification`] for the operator.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{EntityKind, Record, Status};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Opens the detail drawer. Always allowed, never transitions.
    View,
    Flag,
    Suspend,
    Reinstate,
    FreezePayouts,
    UnfreezePayouts,
    Cancel,
    ApproveReward,
    Reject,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Flag => "flag",
            Self::Suspend => "suspend",
            Self::Reinstate => "reinstate",
            Self::FreezePayouts => "freeze_payouts",
            Self::UnfreezePayouts => "unfreeze_payouts",
            Self::Cancel => "cancel",
            Self::ApproveReward => "approve_reward",
            Self::Reject => "reject",
        }
    }

    /// Phrase used in notifications, e.g. "Agent A1 suspended".
    fn past_tense(self) -> &'static str {
        match self {
            Self::View => "opened",
            Self::Flag => "flagged for review",
            Self::Suspend => "suspended",
            Self::Reinstate => "reinstated",
            Self::FreezePayouts => "payouts frozen",
            Self::UnfreezePayouts => "payouts unfrozen",
            Self::Cancel => "cancelled",
            Self::ApproveReward => "reward approved",
            Self::Reject => "rejected",
        }
    }

    fn is_restrictive(self) -> bool {
        matches!(
            self,
            Self::Flag | Self::Suspend | Self::FreezePayouts | Self::Cancel | Self::Reject
        )
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ActionKind {
    type Error = Rejection;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "view" => Ok(Self::View),
            "flag" => Ok(Self::Flag),
            "suspend" => Ok(Self::Suspend),
            "reinstate" => Ok(Self::Reinstate),
            "freeze_payouts" => Ok(Self::FreezePayouts),
            "unfreeze_payouts" => Ok(Self::UnfreezePayouts),
            "cancel" => Ok(Self::Cancel),
            "approve_reward" => Ok(Self::ApproveReward),
            "reject" => Ok(Self::Reject),
            other => Err(Rejection::invalid_action(format!(
                "unknown action: {other}"
            ))),
        }
    }
}

/// One legal edge of a status machine.
#[derive(Debug)]
pub struct Transition<S: 'static> {
    pub action: ActionKind,
    pub from: &'static [S],
    pub to: S,
    pub requires_reason: bool,
}

/// Legal transitions of an entity, keyed by current status.
///
/// Any (status, action) pair not listed is illegal.
#[derive(Debug)]
pub struct ActionTable<S: 'static> {
    transitions: &'static [Transition<S>],
}

impl<S: Status> ActionTable<S> {
    pub const fn new(transitions: &'static [Transition<S>]) -> Self {
        Self { transitions }
    }

    pub fn transitions(&self) -> &'static [Transition<S>] {
        self.transitions
    }

    pub fn find(&self, action: ActionKind, from: S) -> Option<&'static Transition<S>> {
        self.transitions
            .iter()
            .find(|t| t.action == action && t.from.contains(&from))
    }

    /// True when any transition for `action` needs a reason.
    pub fn requires_reason(&self, action: ActionKind) -> bool {
        self.transitions
            .iter()
            .any(|t| t.action == action && t.requires_reason)
    }

    /// Actions legal from `from`, in table order.
    pub fn available(&self, from: S) -> Vec<ActionKind> {
        let mut out: Vec<ActionKind> = Vec::new();
        for t in self.transitions.iter().filter(|t| t.from.contains(&from)) {
            if !out.contains(&t.action) {
                out.push(t.action);
            }
        }
        out
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionCode {
    InvalidAction,
    MissingReason,
}

impl RejectionCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidAction => "invalid_action",
            Self::MissingReason => "missing_reason",
        }
    }
}

impl fmt::Display for RejectionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an action was not proposed.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct Rejection {
    pub code: RejectionCode,
    pub message: String,
}

impl Rejection {
    fn invalid_action(message: String) -> Self {
        Self {
            code: RejectionCode::InvalidAction,
            message,
        }
    }

    fn missing_reason(message: String) -> Self {
        Self {
            code: RejectionCode::MissingReason,
            message,
        }
    }
}

/// Status change to be applied by the data owner.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRequest {
    /// Idempotency key for the receiver.
    pub id: Uuid,
    pub entity: EntityKind,
    pub record_id: String,
    pub action: ActionKind,
    pub from_status: String,
    pub to_status: String,
    pub reason: Option<String>,
    pub requested_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Success,
    Warning,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

/// Outcome of an accepted proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "dispatch", rename_all = "snake_case")]
pub enum Dispatch {
    /// `view`: open the detail drawer; nothing to apply, nothing to notify.
    Open { record_id: String },
    Transition {
        request: ActionRequest,
        notification: Notification,
    },
}

impl Dispatch {
    pub fn request(&self) -> Option<&ActionRequest> {
        match self {
            Self::Open { .. } => None,
            Self::Transition { request, .. } => Some(request),
        }
    }
}

/// Validates `action_name` for `record` against `table`.
///
/// Checks, in order: the action exists, a non-blank reason is present
/// when the action requires one, and it is legal from the record's
/// current status.
pub fn propose_action<R: Record>(
    record: &R,
    action_name: &str,
    table: &ActionTable<R::Status>,
    reason: Option<&str>,
    at: DateTime<Utc>,
) -> Result<Dispatch, Rejection> {
    let result = dispatch(record, action_name, table, reason, at);
    if let Err(rejection) = &result {
        tracing::debug!(
            entity = %R::ENTITY,
            record_id = record.id(),
            action = action_name,
            code = %rejection.code,
            "action rejected"
        );
    }
    result
}

fn dispatch<R: Record>(
    record: &R,
    action_name: &str,
    table: &ActionTable<R::Status>,
    reason: Option<&str>,
    at: DateTime<Utc>,
) -> Result<Dispatch, Rejection> {
    let action = ActionKind::try_from(action_name)?;
    if action == ActionKind::View {
        return Ok(Dispatch::Open {
            record_id: record.id().to_string(),
        });
    }

    let reason = reason.map(str::trim).filter(|r| !r.is_empty());
    if table.requires_reason(action) && reason.is_none() {
        return Err(Rejection::missing_reason(format!(
            "{action} requires a reason"
        )));
    }

    let from = record.status();
    let transition = table.find(action, from).ok_or_else(|| {
        Rejection::invalid_action(format!(
            "cannot {action} {} {} while {}",
            R::ENTITY,
            record.id(),
            from.as_str()
        ))
    })?;

    let level = if action.is_restrictive() {
        NotificationLevel::Warning
    } else {
        NotificationLevel::Success
    };
    let message = format!(
        "{} {} {}",
        R::ENTITY.label(),
        record.display_name(),
        action.past_tense()
    );

    Ok(Dispatch::Transition {
        request: ActionRequest {
            id: Uuid::new_v4(),
            entity: R::ENTITY,
            record_id: record.id().to_string(),
            action,
            from_status: from.as_str().to_string(),
            to_status: transition.to.as_str().to_string(),
            reason: reason.map(ToString::to_string),
            requested_at: at,
        },
        notification: Notification { level, message },
    })
}

/// Actions offered for `record` in its current status, `view` first.
pub fn available_actions<R: Record>(record: &R) -> Vec<ActionKind> {
    let mut actions = vec![ActionKind::View];
    actions.extend(R::actions().available(record.status()));
    actions
}
