//! The dashboard entities and their accessor and transition tables.

mod agent;
mod audit_log;
mod pickup;
mod referral;
mod user;
mod wallet;

pub use agent::{Agent, AgentStatus};
pub use audit_log::{AuditLog, Severity};
pub use pickup::{Pickup, PickupStatus};
pub use referral::{Referral, ReferralStatus};
pub use user::{User, UserStatus};
pub use wallet::{Wallet, WalletStatus};
