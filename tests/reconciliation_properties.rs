#![cfg(not(target_arch = "wasm32"))]

mod common;

use common::{engine_with_clock, event, recent_ids, snapshot};
use fraud_dashboard_wasm::domain::dashboard::{Probability, RiskTier, classify_risk};
use quickcheck_macros::quickcheck;

/// (is_fraud, probability in thousandths)
type Arrival = (bool, u16);

fn probability(raw: u16) -> f64 {
    f64::from(raw % 1_001) / 1_000.0
}

#[quickcheck]
fn counters_grow_by_one_per_event(total: u32, fraud: u32, arrivals: Vec<Arrival>) -> bool {
    let total = u64::from(total);
    let fraud = u64::from(fraud).min(total);
    let (mut engine, _) = engine_with_clock();
    engine.apply_snapshot(snapshot(total, fraud));

    for (i, (is_fraud, p)) in arrivals.iter().enumerate() {
        engine.apply_event(event(&format!("t{i}"), *is_fraud, probability(*p)));
    }

    let state = engine.state().unwrap();
    let frauds = arrivals.iter().filter(|(is_fraud, _)| *is_fraud).count() as u64;
    state.total_transactions == total + arrivals.len() as u64
        && state.fraud_detected == fraud + frauds
        && state.fraud_detected <= state.total_transactions
}

#[quickcheck]
fn feed_is_bounded_and_newest_first(arrivals: Vec<Arrival>, queued_before_snapshot: u8) -> bool {
    let (mut engine, _) = engine_with_clock();
    let split = usize::from(queued_before_snapshot).min(arrivals.len());

    for (i, (is_fraud, p)) in arrivals.iter().enumerate() {
        if i == split {
            engine.apply_snapshot(snapshot(0, 0));
        }
        engine.apply_event(event(&format!("t{i}"), *is_fraud, probability(*p)));
    }
    if split == arrivals.len() {
        engine.apply_snapshot(snapshot(0, 0));
    }

    let ids = recent_ids(&engine);
    let expected: Vec<String> =
        (0..arrivals.len()).rev().take(5).map(|i| format!("t{i}")).collect();
    ids.len() <= 5 && ids == expected
}

#[quickcheck]
fn fraud_never_exceeds_total_even_from_bad_baselines(total: u16, fraud: u16, frauds: u8) -> bool {
    let (mut engine, _) = engine_with_clock();
    engine.apply_snapshot(snapshot(u64::from(total), u64::from(fraud)));
    for i in 0..frauds {
        engine.apply_event(event(&format!("f{i}"), true, 0.9));
    }
    let state = engine.state().unwrap();
    state.fraud_detected <= state.total_transactions
}

fn rank(tier: RiskTier) -> u8 {
    match tier {
        RiskTier::Low => 0,
        RiskTier::Medium => 1,
        RiskTier::High => 2,
    }
}

#[quickcheck]
fn risk_tier_is_monotonic_in_probability(a: u16, b: u16) -> bool {
    let (low, high) = if probability(a) <= probability(b) { (a, b) } else { (b, a) };
    let tier = |raw| classify_risk(Probability::new(probability(raw)).unwrap());
    rank(tier(low)) <= rank(tier(high))
}
