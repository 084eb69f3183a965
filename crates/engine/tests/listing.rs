use chrono::{DateTime, TimeZone, Utc};

use engine::{
    Bound, Constraint, EngineError, FilterCriteria, ListingEngine, Matcher, MetricValue, Money,
    SortSpec, SummaryScope, SummarySpec, ViewState,
    entities::{Agent, AgentStatus, AuditLog, Pickup, PickupStatus, Severity, Wallet, WalletStatus},
    filter, matches, paginate, summarize,
};

fn at(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, day, 9, 0, 0).unwrap()
}

fn agent(id: &str, status: AgentStatus) -> Agent {
    Agent {
        id: id.to_string(),
        name: format!("Agent {id}"),
        phone: "+2348000000000".to_string(),
        zone: "Ikeja".to_string(),
        status,
        completed_pickups: 10,
        completion_rate: 80.0,
        rating: 4.5,
        earnings: Money::new(10_000),
        last_active: at(1),
    }
}

fn roster() -> Vec<Agent> {
    vec![
        Agent {
            name: "Tunde Bello".to_string(),
            phone: "+2348031112222".to_string(),
            zone: "Ikeja".to_string(),
            completion_rate: 92.0,
            earnings: Money::new(4_500_000),
            ..agent("AG-001", AgentStatus::Active)
        },
        Agent {
            name: "Chiamaka Obi".to_string(),
            phone: "+2348093334444".to_string(),
            zone: "Lekki".to_string(),
            completion_rate: 78.0,
            earnings: Money::new(3_100_000),
            last_active: at(3),
            ..agent("AG-002", AgentStatus::Idle)
        },
        Agent {
            name: "José Adeyemi".to_string(),
            phone: "+2348075556666".to_string(),
            zone: "Yaba".to_string(),
            completion_rate: 40.0,
            earnings: Money::new(900_000),
            last_active: at(5),
            ..agent("AG-003", AgentStatus::Suspended)
        },
        Agent {
            name: "Ngozi Eze".to_string(),
            phone: "+2348057778888".to_string(),
            zone: "Ikeja".to_string(),
            completion_rate: 88.0,
            earnings: Money::new(2_750_050),
            last_active: at(7),
            ..agent("AG-004", AgentStatus::EnRoute)
        },
    ]
}

fn ids<'a>(rows: impl IntoIterator<Item = &'a Agent>) -> Vec<&'a str> {
    rows.into_iter().map(|a| a.id.as_str()).collect()
}

#[test]
fn equality_on_status_keeps_matching_records() {
    let records = vec![
        agent("A1", AgentStatus::Active),
        agent("A2", AgentStatus::Suspended),
    ];
    let criteria = FilterCriteria::new().with("status", Constraint::equals("active"));
    let matcher = Matcher::<Agent>::new(&criteria).unwrap();

    assert_eq!(ids(matcher.filter(&records)), vec!["A1"]);
    assert_eq!(ids(filter(&records, &criteria).unwrap()), vec!["A1"]);
    assert!(matches(&records[0], &criteria).unwrap());
    assert!(!matches(&records[1], &criteria).unwrap());
}

#[test]
fn all_sentinel_and_empty_value_disable_equality() {
    let records = roster();
    for value in ["all", ""] {
        let criteria = FilterCriteria::new().with("status", Constraint::equals(value));
        let matcher = Matcher::<Agent>::new(&criteria).unwrap();
        assert!(matcher.is_unconstrained());
        assert_eq!(matcher.filter(&records).len(), records.len());
    }
}

#[test]
fn empty_criteria_match_everything() {
    let records = roster();
    let matcher = Matcher::<Agent>::new(&FilterCriteria::default()).unwrap();
    assert_eq!(ids(matcher.filter(&records)), ids(&records));
}

#[test]
fn substring_is_case_and_accent_insensitive() {
    let records = roster();
    let criteria = FilterCriteria::new().with("name", Constraint::contains("JOSE"));
    let matcher = Matcher::<Agent>::new(&criteria).unwrap();
    assert_eq!(ids(matcher.filter(&records)), vec!["AG-003"]);
}

#[test]
fn search_matches_any_listed_field() {
    let records = roster();
    let criteria = FilterCriteria::new().with(
        "search",
        Constraint::any_contains(["name", "phone", "id"], "7778"),
    );
    let matcher = Matcher::<Agent>::new(&criteria).unwrap();
    assert_eq!(ids(matcher.filter(&records)), vec!["AG-004"]);

    let criteria =
        FilterCriteria::new().with("search", Constraint::any_contains(["name", "id"], "ag-00"));
    let matcher = Matcher::<Agent>::new(&criteria).unwrap();
    assert_eq!(matcher.filter(&records).len(), 4);
}

#[test]
fn constraints_combine_with_and() {
    let records = roster();
    let criteria = FilterCriteria::new()
        .with("zone", Constraint::equals("Ikeja"))
        .with(
            "completion_rate",
            Constraint::range(Some(Bound::Number(90.0)), None),
        );
    let matcher = Matcher::<Agent>::new(&criteria).unwrap();
    assert_eq!(ids(matcher.filter(&records)), vec!["AG-001"]);
}

#[test]
fn range_bounds_are_inclusive_and_optional() {
    let records = roster();
    let criteria = FilterCriteria::new().with(
        "completion_rate",
        Constraint::range(Some(Bound::Number(78.0)), Some(Bound::Number(88.0))),
    );
    let matcher = Matcher::<Agent>::new(&criteria).unwrap();
    assert_eq!(ids(matcher.filter(&records)), vec!["AG-002", "AG-004"]);

    let criteria = FilterCriteria::new().with(
        "last_active",
        Constraint::range(None, Some(Bound::Time(at(3)))),
    );
    let matcher = Matcher::<Agent>::new(&criteria).unwrap();
    assert_eq!(ids(matcher.filter(&records)), vec!["AG-001", "AG-002"]);
}

#[test]
fn money_ranges_use_minor_units() {
    let records = roster();
    let criteria = FilterCriteria::new().with(
        "earnings",
        Constraint::range(Some(Money::new(2_750_050).into()), None),
    );
    let matcher = Matcher::<Agent>::new(&criteria).unwrap();
    assert_eq!(ids(matcher.filter(&records)), vec!["AG-001", "AG-002", "AG-004"]);
}

#[test]
fn money_equality_agrees_with_degenerate_range() {
    let records = vec![Agent {
        earnings: Money::new(1000),
        ..agent("A1", AgentStatus::Active)
    }];
    let equals = FilterCriteria::new().with("earnings", Constraint::equals("1000"));
    let range = FilterCriteria::new().with(
        "earnings",
        Constraint::range(Some(Bound::Number(1000.0)), Some(Bound::Number(1000.0))),
    );
    assert_eq!(ids(filter(&records, &equals).unwrap()), vec!["A1"]);
    assert_eq!(ids(filter(&records, &range).unwrap()), vec!["A1"]);

    let major_units = FilterCriteria::new().with("earnings", Constraint::equals("10.00"));
    assert!(matches!(
        Matcher::<Agent>::new(&major_units),
        Err(EngineError::InvalidCriteria(_))
    ));
}

#[test]
fn text_equality_is_exact() {
    let records = vec![Agent {
        zone: " Ikeja ".to_string(),
        ..agent("A1", AgentStatus::Active)
    }];
    let padded = FilterCriteria::new().with("zone", Constraint::equals(" Ikeja "));
    let bare = FilterCriteria::new().with("zone", Constraint::equals("Ikeja"));
    assert!(matches(&records[0], &padded).unwrap());
    assert!(!matches(&records[0], &bare).unwrap());

    let blank = FilterCriteria::new().with("zone", Constraint::equals("   "));
    assert!(Matcher::<Agent>::new(&blank).unwrap().is_unconstrained());
}

#[test]
fn invalid_criteria_are_reported() {
    let unknown = FilterCriteria::new().with("nickname", Constraint::equals("x"));
    assert_eq!(
        Matcher::<Agent>::new(&unknown).unwrap_err(),
        EngineError::UnknownField("nickname".to_string())
    );

    let bad_status = FilterCriteria::new().with("status", Constraint::equals("retired"));
    assert_eq!(
        Matcher::<Agent>::new(&bad_status).unwrap_err(),
        EngineError::UnknownStatus("agent: retired".to_string())
    );

    let substring_on_number =
        FilterCriteria::new().with("rating", Constraint::contains("4"));
    assert!(matches!(
        Matcher::<Agent>::new(&substring_on_number),
        Err(EngineError::InvalidCriteria(_))
    ));

    let inverted = FilterCriteria::new().with(
        "rating",
        Constraint::range(Some(Bound::Number(5.0)), Some(Bound::Number(1.0))),
    );
    assert!(matches!(
        Matcher::<Agent>::new(&inverted),
        Err(EngineError::InvalidCriteria(_))
    ));

    let time_bound_on_number = FilterCriteria::new().with(
        "rating",
        Constraint::range(Some(Bound::Time(at(1))), None),
    );
    assert!(matches!(
        Matcher::<Agent>::new(&time_bound_on_number),
        Err(EngineError::InvalidCriteria(_))
    ));
}

#[test]
fn missing_optional_values_never_match() {
    let pickup = Pickup {
        id: "PK-1".to_string(),
        user_id: "U1".to_string(),
        user_name: "Ada".to_string(),
        agent_id: None,
        material: "plastic".to_string(),
        address: "12 Allen Ave".to_string(),
        weight_kg: 4.0,
        amount: Money::new(120_000),
        status: PickupStatus::Pending,
        scheduled_for: at(2),
    };
    let criteria = FilterCriteria::new().with("agent_id", Constraint::contains("AG"));
    let matcher = Matcher::<Pickup>::new(&criteria).unwrap();
    assert!(!matcher.matches(&pickup));
}

#[test]
fn criteria_deserialize_from_json() {
    let criteria: FilterCriteria = serde_json::from_str(
        r#"{
            "status": {"op": "equals", "value": "active"},
            "completion_rate": {"op": "range", "min": 50},
            "last_active": {"op": "range", "max": "2026-03-04T00:00:00Z"}
        }"#,
    )
    .unwrap();
    let matcher = Matcher::<Agent>::new(&criteria).unwrap();
    assert_eq!(ids(matcher.filter(&roster())), vec!["AG-001"]);
}

#[test]
fn paginate_second_page_of_twenty_five() {
    let records: Vec<Agent> = (1..=25)
        .map(|n| agent(&format!("A{n:02}"), AgentStatus::Active))
        .collect();
    let page = paginate(&records, 2, 10).unwrap();
    assert_eq!(page.info.total_pages, 3);
    assert_eq!(page.rows.first().unwrap().id, "A11");
    assert_eq!(page.rows.last().unwrap().id, "A20");
}

#[test]
fn mean_over_empty_collection_is_zero() {
    let spec = SummarySpec::new().mean("avg_rate", "completion_rate");
    let summary = summarize::<Agent>(&[], &spec).unwrap();
    assert_eq!(summary.get("avg_rate"), Some(MetricValue::Number(0.0)));
}

#[test]
fn default_agent_summary() {
    let summary = summarize(&roster(), &<Agent as engine::Record>::summary_spec()).unwrap();
    assert_eq!(summary.get("total"), Some(MetricValue::Count(4)));
    assert_eq!(summary.get("status.active"), Some(MetricValue::Count(1)));
    assert_eq!(summary.get("status.en_route"), Some(MetricValue::Count(1)));
    assert_eq!(summary.get("status.offline"), Some(MetricValue::Count(0)));
    assert_eq!(
        summary.get("avg_completion_rate"),
        Some(MetricValue::Number(74.5))
    );
    assert_eq!(
        summary.get("total_earnings"),
        Some(MetricValue::Money(Money::new(11_250_050)))
    );
}

#[test]
fn money_mean_rounds_half_away_from_zero() {
    let wallets: Vec<Wallet> = [101, 100]
        .into_iter()
        .enumerate()
        .map(|(idx, balance)| Wallet {
            id: format!("W{idx}"),
            owner_id: format!("U{idx}"),
            owner_name: "Owner".to_string(),
            owner_kind: "user".to_string(),
            balance: Money::new(balance),
            pending_payout: Money::ZERO,
            status: WalletStatus::Active,
            updated_at: at(1),
        })
        .collect();
    let spec = SummarySpec::new().mean("avg", "balance");
    let summary = summarize(&wallets, &spec).unwrap();
    assert_eq!(summary.get("avg"), Some(MetricValue::Money(Money::new(101))));
}

#[test]
fn share_over_empty_collection_is_zero() {
    let spec = SummarySpec::new().share("done", "completed");
    let summary = summarize::<Pickup>(&[], &spec).unwrap();
    assert_eq!(summary.get("done"), Some(MetricValue::Percent(0.0)));
}

#[test]
fn status_breakdown_keys_cannot_collide() {
    for spec in [
        SummarySpec::new().count("status.active").count_by_status("status"),
        SummarySpec::new().count_by_status("status").share("status.idle", "idle"),
    ] {
        assert!(matches!(
            summarize::<Agent>(&[], &spec),
            Err(EngineError::InvalidMetric(_))
        ));
    }

    let distinct = SummarySpec::new().count("status").count_by_status("status");
    let summary = summarize::<Agent>(&[], &distinct).unwrap();
    assert_eq!(summary.get("status"), Some(MetricValue::Count(0)));
    assert_eq!(summary.get("status.active"), Some(MetricValue::Count(0)));
}

#[test]
fn invalid_metrics_are_rejected() {
    let text_sum = SummarySpec::new().sum("names", "name");
    assert!(matches!(
        summarize::<Agent>(&[], &text_sum),
        Err(EngineError::InvalidMetric(_))
    ));
    let duplicate = SummarySpec::new().count("n").count("n");
    assert!(matches!(
        summarize::<Agent>(&[], &duplicate),
        Err(EngineError::InvalidMetric(_))
    ));
    let bad_share = SummarySpec::new().share("x", "retired");
    assert!(matches!(
        summarize::<Agent>(&[], &bad_share),
        Err(EngineError::UnknownStatus(_))
    ));
}

#[test]
fn listing_summary_scope_is_explicit() {
    let records = roster();
    let engine = ListingEngine::<Agent>::builder().build().unwrap();

    let filtered = ViewState::new(SummaryScope::Filtered)
        .with_filter("zone", Constraint::equals("Ikeja"));
    let listing = engine.list(&records, &filtered).unwrap();
    assert_eq!(ids(listing.rows.iter().copied()), vec!["AG-001", "AG-004"]);
    assert_eq!(listing.summary.get("total"), Some(MetricValue::Count(2)));

    let unfiltered = ViewState {
        summary_scope: SummaryScope::Unfiltered,
        ..filtered
    };
    let listing = engine.list(&records, &unfiltered).unwrap();
    assert_eq!(listing.rows.len(), 2);
    assert_eq!(listing.summary.get("total"), Some(MetricValue::Count(4)));
}

#[test]
fn listing_sorts_then_paginates() {
    let records = roster();
    let engine = ListingEngine::<Agent>::builder()
        .summary(SummarySpec::new().count("total"))
        .build()
        .unwrap();
    let view = ViewState::new(SummaryScope::Filtered)
        .with_sort(SortSpec::desc("earnings"))
        .with_page_size(3)
        .unwrap()
        .with_page(2);
    let listing = engine.list(&records, &view).unwrap();
    assert_eq!(ids(listing.rows.iter().copied()), vec!["AG-003"]);
    assert_eq!(listing.page.page, 2);
    assert_eq!(listing.page.total_pages, 2);
    assert_eq!(listing.page.total_rows, 4);
}

#[test]
fn listing_clamps_page_past_the_end() {
    let records = roster();
    let engine = ListingEngine::<Agent>::builder().build().unwrap();
    let view = ViewState::new(SummaryScope::Filtered)
        .with_sort(SortSpec::asc("name"))
        .with_page(40);
    let listing = engine.list(&records, &view).unwrap();
    assert_eq!(listing.page.page, 1);
    assert_eq!(
        ids(listing.rows.iter().copied()),
        vec!["AG-002", "AG-003", "AG-004", "AG-001"]
    );
}

#[test]
fn listing_with_no_matches_has_one_empty_page() {
    let records = roster();
    let engine = ListingEngine::<Agent>::builder().build().unwrap();
    let view = ViewState::new(SummaryScope::Filtered)
        .with_filter("status", Constraint::equals("offline"));
    let listing = engine.list(&records, &view).unwrap();
    assert!(listing.rows.is_empty());
    assert_eq!(listing.page.total_pages, 1);
    assert_eq!(
        listing.summary.get("avg_completion_rate"),
        Some(MetricValue::Number(0.0))
    );
}

#[test]
fn sort_puts_missing_values_last() {
    let logs: Vec<AuditLog> = [("L1", Some("10.0.0.9")), ("L2", None), ("L3", Some("10.0.0.1"))]
        .into_iter()
        .map(|(id, ip)| AuditLog {
            id: id.to_string(),
            actor: "ops@ecopick".to_string(),
            action: "login".to_string(),
            target: "dashboard".to_string(),
            ip_address: ip.map(ToString::to_string),
            severity: Severity::Info,
            at: at(1),
        })
        .collect();
    let engine = ListingEngine::<AuditLog>::builder().build().unwrap();
    for sort in [SortSpec::asc("ip_address"), SortSpec::desc("ip_address")] {
        let view = ViewState::new(SummaryScope::Filtered).with_sort(sort);
        let listing = engine.list(&logs, &view).unwrap();
        assert_eq!(listing.rows.last().unwrap().id, "L2");
    }
}
