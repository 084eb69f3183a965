use engine::{
    Constraint, Dataset, ListingEngine, MetricValue, Money, SummaryScope, ViewState,
    entities::{Pickup, Wallet},
};

const FIXTURE: &str = include_str!("../../../fixtures/dashboard.json");

#[test]
fn demo_dataset_loads() {
    let dataset = Dataset::from_json(FIXTURE).unwrap();
    assert_eq!(dataset.agents.len(), 6);
    assert_eq!(dataset.users.len(), 5);
    assert_eq!(dataset.pickups.len(), 6);
    assert_eq!(dataset.referrals.len(), 4);
    assert_eq!(dataset.audit_logs.len(), 4);
    assert_eq!(dataset.wallets.len(), 4);
    assert_eq!(dataset.users[1].email, None);
}

#[test]
fn pickup_cards_over_demo_data() {
    let dataset = Dataset::from_json(FIXTURE).unwrap();
    let engine = ListingEngine::<Pickup>::builder().build().unwrap();
    let view = ViewState::new(SummaryScope::Unfiltered);
    let listing = engine.list(&dataset.pickups, &view).unwrap();

    assert_eq!(listing.summary.get("total"), Some(MetricValue::Count(6)));
    assert_eq!(
        listing.summary.get("status.completed"),
        Some(MetricValue::Count(1))
    );
}

#[test]
fn frozen_wallets_hold_their_payouts() {
    let dataset = Dataset::from_json(FIXTURE).unwrap();
    let engine = ListingEngine::<Wallet>::builder().build().unwrap();
    let view =
        ViewState::new(SummaryScope::Filtered).with_filter("status", Constraint::equals("frozen"));
    let listing = engine.list(&dataset.wallets, &view).unwrap();

    assert_eq!(listing.rows.len(), 1);
    assert_eq!(listing.rows[0].id, "W-004");
    assert_eq!(listing.rows[0].pending_payout, Money::new(310_000));
}
