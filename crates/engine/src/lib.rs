//! Listing engine for the Ecopick operations dashboard.
//!
//! Every "All X" page of the dashboard (agents, users, pickups, referrals,
//! audit logs, wallets) does the same work: filter a collection by the
//! active criteria, compute the summary cards, slice the current page, and
//! offer status actions gated by the entity's transition table. This crate
//! implements that work once, generically over [`Record`].
//!
//! The engine is synchronous and side-effect free. It never mutates a record:
//! accepted actions come back as [`ActionRequest`]s for the data owner.
//!
//! ```rust
//! use engine::{Constraint, ListingEngine, SummaryScope, ViewState, entities::Agent};
//!
//! # fn main() -> Result<(), engine::EngineError> {
//! let agents: Vec<Agent> = Vec::new();
//! let engine = ListingEngine::<Agent>::builder().build()?;
//! let view = ViewState::new(SummaryScope::Unfiltered)
//!     .with_filter("status", Constraint::equals("active"));
//! let listing = engine.list(&agents, &view)?;
//! assert_eq!(listing.page.total_pages, 1);
//! # Ok(())
//! # }
//! ```

pub use actions::{
    ActionKind, ActionRequest, ActionTable, Dispatch, Notification, NotificationLevel, Rejection,
    RejectionCode, Transition, available_actions, propose_action,
};
pub use criteria::{ALL_SENTINEL, Bound, Constraint, FilterCriteria, Matcher, filter, matches};
pub use currency::Currency;
pub use dataset::Dataset;
pub use error::EngineError;
pub use listing::{Listing, ListingEngine, ListingEngineBuilder, sort_rows};
pub use money::{Money, format_percent};
pub use paginate::{DEFAULT_PAGE_SIZE, Page, PageInfo, paginate, total_pages};
pub use record::{EntityKind, Field, FieldKind, FieldValue, Record, Status};
pub use summary::{
    Aggregator, MetricKind, MetricSpec, MetricValue, Summary, SummarySpec, summarize,
};
pub use view::{SortDirection, SortSpec, SummaryScope, ViewState};

mod actions;
mod criteria;
mod currency;
mod dataset;
pub mod entities;
mod error;
mod listing;
mod money;
mod paginate;
mod record;
mod summary;
mod view;

pub type ResultEngine<T> = Result<T, EngineError>;
