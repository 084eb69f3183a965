use std::error::Error;

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use engine::{
    ALL_SENTINEL, Bound, Constraint, Currency, Dataset, EntityKind, FieldKind, ListingEngine, Money,
    Record, SortSpec, SummaryScope, ViewState,
    entities::{Agent, AuditLog, Pickup, Referral, User, Wallet},
    propose_action,
};
use serde::Serialize;

use crate::{
    error::{AppError, Result},
    settings::{GlobalArgs, Settings},
};

mod error;
mod render;
mod settings;

/// Exit status of a rejected action.
const EXIT_REJECTED: i32 = 3;

#[derive(Parser, Debug)]
#[command(name = "ecopick_admin")]
#[command(about = "Browse and act on Ecopick dashboard collections")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Filter, sort, paginate and summarize a collection.
    List(ListArgs),
    /// Propose a status action on one record.
    Act(ActArgs),
    /// Show fields, statuses and actions of an entity.
    Schema(SchemaArgs),
}

#[derive(Args, Debug)]
struct ListArgs {
    entity: String,
    /// Status equality; `all` disables it.
    #[arg(long)]
    status: Option<String>,
    /// Free-text search over the entity's search fields.
    #[arg(long)]
    search: Option<String>,
    /// Equality constraint, `field=value`. Money in major units.
    #[arg(long = "filter", value_parser = parse_pair)]
    filters: Vec<(String, String)>,
    /// Substring constraint, `field=pattern`.
    #[arg(long = "contains", value_parser = parse_pair)]
    contains: Vec<(String, String)>,
    /// Inclusive range, `field=min..max`; either side may be empty.
    #[arg(long = "range", value_parser = parse_pair)]
    ranges: Vec<(String, String)>,
    /// Sort key, `field` or `field:desc`.
    #[arg(long)]
    sort: Option<String>,
    #[arg(long, default_value_t = 1)]
    page: u32,
    #[arg(long)]
    page_size: Option<u32>,
    /// `filtered` or `unfiltered`.
    #[arg(long)]
    scope: Option<String>,
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct ActArgs {
    entity: String,
    id: String,
    action: String,
    #[arg(long)]
    reason: Option<String>,
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct SchemaArgs {
    entity: String,
}

fn parse_pair(raw: &str) -> std::result::Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected field=value, got `{raw}`")),
    }
}

fn parse_sort(raw: &str) -> Result<SortSpec> {
    match raw.split_once(':') {
        None => Ok(SortSpec::asc(raw)),
        Some((field, "asc")) => Ok(SortSpec::asc(field)),
        Some((field, "desc")) => Ok(SortSpec::desc(field)),
        Some((_, other)) => Err(AppError::Usage(format!("invalid sort direction: {other}"))),
    }
}

/// Parses one side of `min..max` according to the field's kind. Money is
/// given in major units on the command line.
fn parse_bound(kind: FieldKind, raw: &str) -> Result<Option<Bound>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let bound = match kind {
        FieldKind::Money => Bound::from(raw.parse::<Money>()?),
        FieldKind::Timestamp => DateTime::parse_from_rfc3339(raw)
            .map(|at| Bound::from(at.with_timezone(&Utc)))
            .map_err(|err| AppError::Usage(format!("invalid timestamp `{raw}`: {err}")))?,
        _ => raw
            .parse::<f64>()
            .map(Bound::from)
            .map_err(|_| AppError::Usage(format!("invalid number: {raw}")))?,
    };
    Ok(Some(bound))
}

/// Money equality is typed in major units on the command line; the engine
/// compares minor units.
fn equality<R: Record>(field: &str, value: &str) -> Result<Constraint> {
    let trimmed = value.trim();
    if R::require_field(field)?.kind == FieldKind::Money
        && !trimmed.is_empty()
        && trimmed != ALL_SENTINEL
    {
        let money: Money = trimmed.parse()?;
        return Ok(Constraint::equals(money.minor().to_string()));
    }
    Ok(Constraint::equals(value))
}

fn build_view<R: Record>(args: &ListArgs, settings: &Settings) -> Result<ViewState> {
    let scope = match &args.scope {
        Some(scope) => SummaryScope::try_from(scope.as_str())?,
        None => settings.summary_scope()?,
    };
    let mut view =
        ViewState::new(scope).with_page_size(args.page_size.unwrap_or(settings.page_size))?;

    if let Some(status) = &args.status {
        view.set_filter(R::STATUS_FIELD, Constraint::equals(status.as_str()));
    }
    if let Some(query) = &args.search {
        view.set_filter(
            "search",
            Constraint::any_contains(R::search_fields().iter().copied(), query.as_str()),
        );
    }
    for (field, value) in &args.filters {
        view.set_filter(field.as_str(), equality::<R>(field, value)?);
    }
    for (field, pattern) in &args.contains {
        view.set_filter(field.as_str(), Constraint::contains(pattern.as_str()));
    }
    for (field, raw) in &args.ranges {
        let kind = R::require_field(field)?.kind;
        let (min, max) = raw
            .split_once("..")
            .ok_or_else(|| AppError::Usage(format!("expected min..max, got `{raw}`")))?;
        view.set_filter(
            field.as_str(),
            Constraint::range(parse_bound(kind, min)?, parse_bound(kind, max)?),
        );
    }
    if let Some(sort) = &args.sort {
        view.set_sort(Some(parse_sort(sort)?));
    }
    view.set_page(args.page);
    Ok(view)
}

fn list<R: Collection>(records: &[R], args: &ListArgs, settings: &Settings) -> Result<()> {
    let view = build_view::<R>(args, settings)?;
    let engine = ListingEngine::<R>::builder().build()?;
    let listing = engine.list(records, &view)?;
    tracing::info!(
        entity = %R::ENTITY,
        rows = listing.page.total_rows,
        page = listing.page.page,
        "listed"
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&listing)?);
    } else {
        println!("{}", render::listing(&listing, settings.currency()?));
    }
    Ok(())
}

/// Returns `false` when the action was rejected.
fn act<R: Collection>(records: &[R], args: &ActArgs) -> Result<bool> {
    let record = records
        .iter()
        .find(|r| r.id() == args.id)
        .ok_or_else(|| AppError::NotFound {
            entity: R::ENTITY,
            id: args.id.clone(),
        })?;

    match propose_action(
        record,
        &args.action,
        R::actions(),
        args.reason.as_deref(),
        Utc::now(),
    ) {
        Ok(dispatch) => {
            if let Some(request) = dispatch.request() {
                tracing::info!(
                    entity = %R::ENTITY,
                    record_id = %request.record_id,
                    action = %request.action,
                    request_id = %request.id,
                    "action proposed"
                );
            }
            if args.json {
                println!("{}", serde_json::to_string_pretty(&dispatch)?);
            } else {
                println!("{}", render::dispatch(&dispatch));
            }
            Ok(true)
        }
        Err(rejection) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&rejection)?);
            } else {
                eprintln!("rejected: {rejection}");
            }
            Ok(false)
        }
    }
}

/// Records the CLI can read out of a [`Dataset`].
trait Collection: Record + Serialize {
    fn collection(dataset: &Dataset) -> &[Self];
}

impl Collection for Agent {
    fn collection(dataset: &Dataset) -> &[Self] {
        &dataset.agents
    }
}

impl Collection for User {
    fn collection(dataset: &Dataset) -> &[Self] {
        &dataset.users
    }
}

impl Collection for Pickup {
    fn collection(dataset: &Dataset) -> &[Self] {
        &dataset.pickups
    }
}

impl Collection for Referral {
    fn collection(dataset: &Dataset) -> &[Self] {
        &dataset.referrals
    }
}

impl Collection for AuditLog {
    fn collection(dataset: &Dataset) -> &[Self] {
        &dataset.audit_logs
    }
}

impl Collection for Wallet {
    fn collection(dataset: &Dataset) -> &[Self] {
        &dataset.wallets
    }
}

/// Evaluates `$body` with `$ty` aliased to the record type of `$kind`.
macro_rules! with_entity {
    ($kind:expr, |$ty:ident| $body:expr) => {
        match $kind {
            EntityKind::Agent => {
                type $ty = Agent;
                $body
            }
            EntityKind::User => {
                type $ty = User;
                $body
            }
            EntityKind::Pickup => {
                type $ty = Pickup;
                $body
            }
            EntityKind::Referral => {
                type $ty = Referral;
                $body
            }
            EntityKind::AuditLog => {
                type $ty = AuditLog;
                $body
            }
            EntityKind::Wallet => {
                type $ty = Wallet;
                $body
            }
        }
    };
}

fn load_dataset(settings: &Settings) -> Result<Dataset> {
    let raw = std::fs::read_to_string(&settings.dataset)?;
    let dataset = Dataset::from_json(&raw)?;
    tracing::debug!(path = %settings.dataset.display(), "dataset loaded");
    Ok(dataset)
}

fn main() -> std::result::Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();
    let settings = settings::load(&cli.global)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "ecopick_admin={level},engine={level}",
            level = settings.log_level
        ))
        .with_writer(std::io::stderr)
        .init();

    // Reject an unsupported currency before reading the dataset.
    let _: Currency = settings.currency()?;

    match &cli.command {
        Command::List(args) => {
            let dataset = load_dataset(&settings)?;
            let kind = EntityKind::try_from(args.entity.as_str())?;
            with_entity!(kind, |R| list(R::collection(&dataset), args, &settings))?;
        }
        Command::Act(args) => {
            let dataset = load_dataset(&settings)?;
            let kind = EntityKind::try_from(args.entity.as_str())?;
            let accepted = with_entity!(kind, |R| act(R::collection(&dataset), args))?;
            if !accepted {
                std::process::exit(EXIT_REJECTED);
            }
        }
        Command::Schema(args) => {
            let kind = EntityKind::try_from(args.entity.as_str())?;
            let text = with_entity!(kind, |R| render::schema::<R>());
            println!("{text}");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_args(entity: &str) -> ListArgs {
        ListArgs {
            entity: entity.to_string(),
            status: None,
            search: None,
            filters: Vec::new(),
            contains: Vec::new(),
            ranges: Vec::new(),
            sort: None,
            page: 1,
            page_size: None,
            scope: None,
            json: false,
        }
    }

    #[test]
    fn cli_parses_list_flags() {
        let cli = Cli::try_parse_from([
            "ecopick_admin",
            "list",
            "agents",
            "--status",
            "active",
            "--range",
            "earnings=1000..",
            "--sort",
            "rating:desc",
            "--page-size",
            "5",
        ])
        .unwrap();
        let Command::List(args) = cli.command else {
            panic!("expected list");
        };
        assert_eq!(args.status.as_deref(), Some("active"));
        assert_eq!(
            args.ranges,
            vec![("earnings".to_string(), "1000..".to_string())]
        );
        assert_eq!(args.page_size, Some(5));
    }

    #[test]
    fn pairs_need_a_key() {
        assert_eq!(
            parse_pair("zone=Ikeja").unwrap(),
            ("zone".to_string(), "Ikeja".to_string())
        );
        assert!(parse_pair("=Ikeja").is_err());
        assert!(parse_pair("Ikeja").is_err());
    }

    #[test]
    fn money_bounds_are_major_units() {
        assert!(parse_bound(FieldKind::Money, "1,500.25").is_err());
        assert_eq!(
            parse_bound(FieldKind::Money, "1500.25").unwrap(),
            Some(Bound::Number(150_025.0))
        );
        assert_eq!(parse_bound(FieldKind::Number, " ").unwrap(), None);
        assert!(parse_bound(FieldKind::Timestamp, "yesterday").is_err());
    }

    #[test]
    fn view_from_flags() {
        let mut args = list_args("agents");
        args.status = Some("active".to_string());
        args.search = Some("tunde".to_string());
        args.ranges = vec![("earnings".to_string(), "..2500".to_string())];
        args.sort = Some("name:desc".to_string());
        args.page = 2;

        let view = build_view::<Agent>(&args, &Settings::default()).unwrap();
        assert_eq!(view.page, 2);
        assert_eq!(view.page_size, 10);
        assert_eq!(view.summary_scope, SummaryScope::Filtered);
        assert_eq!(view.sort, Some(SortSpec::desc("name")));
        assert_eq!(
            view.criteria.get("earnings"),
            Some(&Constraint::range(None, Some(Bound::Number(250_000.0))))
        );
        assert!(view.criteria.get("search").is_some());
    }

    #[test]
    fn money_filter_is_converted_to_minor_units() {
        let mut args = list_args("agents");
        args.filters = vec![
            ("earnings".to_string(), "1500.25".to_string()),
            ("zone".to_string(), "Ikeja".to_string()),
        ];
        let view = build_view::<Agent>(&args, &Settings::default()).unwrap();
        assert_eq!(
            view.criteria.get("earnings"),
            Some(&Constraint::equals("150025"))
        );
        assert_eq!(view.criteria.get("zone"), Some(&Constraint::equals("Ikeja")));
        assert_eq!(
            equality::<Agent>("earnings", "all").unwrap(),
            Constraint::equals("all")
        );
    }

    #[test]
    fn range_on_unknown_field_is_rejected() {
        let mut args = list_args("agents");
        args.ranges = vec![("nickname".to_string(), "1..2".to_string())];
        assert!(build_view::<Agent>(&args, &Settings::default()).is_err());
    }

    #[test]
    fn bad_sort_direction() {
        assert!(parse_sort("name:up").is_err());
        assert_eq!(parse_sort("name").unwrap(), SortSpec::asc("name"));
    }
}
