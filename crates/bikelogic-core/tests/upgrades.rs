use bikelogic_core::{
    build_summary, evaluate_candidate, normalize, quick_win_score, rank_upgrades,
    recommend_quick_wins, Build, Catalog, Category, Component, QuickWinConfig, RawComponent,
    ValueTier,
};
use serde_json::{json, Value};

fn part(record: Value) -> Component {
    let raw: RawComponent = serde_json::from_value(record).expect("fixture record");
    normalize(&raw)
}

fn priced(id: &str, category: &str, weight: f64, price: f64) -> Component {
    part(json!({
        "id": id,
        "category": category,
        "name": id,
        "attributes": { "weight": weight, "price": price }
    }))
}

fn wheelset(id: &str, axle: &str, weight: f64, price: f64) -> Component {
    part(json!({
        "id": id,
        "category": "Wheelset",
        "name": id,
        "interfaces": { "rear_axle": axle },
        "attributes": { "weight": weight, "price": price }
    }))
}

// ── Single baseline ──────────────────────────────────────────────────────

#[test]
fn fifty_grams_for_fifty_dollars_is_reasonable() {
    let cfg = QuickWinConfig::default();
    let base = priced("saddle-a", "Saddle", 300.0, 100.0);
    let cand = priced("saddle-b", "Saddle", 250.0, 150.0);
    let opt = evaluate_candidate(&base, &cand, &cfg).unwrap();
    assert_eq!(opt.weight_saved, 50.0);
    assert_eq!(opt.cost_added, 50.0);
    assert_eq!(opt.cost_per_gram, 1.0);
    assert_eq!(opt.value_tier, ValueTier::Reasonable);
}

#[test]
fn rotating_unicorn_scores_with_both_multipliers() {
    let cfg = QuickWinConfig::default();
    let base = priced("tire-a", "Tire", 280.0, 60.0);
    let cand = priced("tire-b", "Tire", 200.0, 100.0);
    let opt = evaluate_candidate(&base, &cand, &cfg).unwrap();
    assert_eq!(opt.value_tier, ValueTier::Unicorn);
    assert_eq!(quick_win_score(&opt, &cfg), 240.0);
}

#[test]
fn ranking_is_cheapest_per_gram_first_with_stable_ties() {
    let cfg = QuickWinConfig::default();
    let base = priced("bar-0", "Handlebar", 300.0, 100.0);
    let catalog = [
        priced("bar-z", "Handlebar", 250.0, 150.0),
        priced("bar-a", "Handlebar", 200.0, 200.0),
        priced("bar-free", "Handlebar", 290.0, 90.0),
        priced("bar-heavy", "Handlebar", 320.0, 50.0),
        priced("stem-x", "Stem", 100.0, 10.0),
    ];
    let ranked = rank_upgrades(&base, &catalog, &cfg);
    let ids: Vec<&str> = ranked.iter().map(|o| o.candidate.id.as_str()).collect();
    assert_eq!(ids, vec!["bar-free", "bar-a", "bar-z"]);
    assert!(ranked.windows(2).all(|w| w[0].cost_per_gram <= w[1].cost_per_gram));
}

#[test]
fn baseline_without_price_yields_nothing() {
    let cfg = QuickWinConfig::default();
    let base = part(json!({
        "id": "saddle-a", "category": "Saddle", "name": "A",
        "attributes": { "weight": 300 }
    }));
    let cand = priced("saddle-b", "Saddle", 200.0, 50.0);
    assert!(rank_upgrades(&base, [&cand], &cfg).is_empty());
}

// ── Whole build ──────────────────────────────────────────────────────────

fn road_catalog() -> Catalog {
    let frame = part(json!({
        "id": "frame",
        "category": "Frame",
        "name": "Frame",
        "interfaces": { "rear_axle": "TA_12x142mm" },
        "attributes": { "weight": 1000, "price": 1500 }
    }));
    Catalog::from_components(vec![
        frame,
        wheelset("wheels-stock", "TA_12x142mm", 1800.0, 400.0),
        wheelset("wheels-light", "TA_12x142mm", 1500.0, 700.0),
        wheelset("wheels-boost", "TA_12x148mm", 1300.0, 500.0),
        priced("saddle-stock", "Saddle", 280.0, 40.0),
        priced("saddle-carbon", "Saddle", 160.0, 400.0),
    ])
    .unwrap()
}

#[test]
fn quick_wins_skip_candidates_that_break_the_build() {
    let catalog = road_catalog();
    let build = Build::from_ids(&catalog, &["frame", "wheels-stock", "saddle-stock"]).unwrap();
    let wins = recommend_quick_wins(&build, &catalog, &QuickWinConfig::default());

    let ids: Vec<&str> = wins.iter().map(|w| w.option.candidate.id.as_str()).collect();
    assert!(!ids.contains(&"wheels-boost"));
    assert_eq!(ids, vec!["wheels-light", "saddle-carbon"]);

    let wheels = &wins[0];
    assert_eq!(wheels.slot, Category::Wheelset);
    assert_eq!(wheels.baseline_id, "wheels-stock");
    // 300 g × 2.0 rotating × 1.0 reasonable
    assert_eq!(wheels.score, 600.0);
    assert!(wins.windows(2).all(|w| w[0].score >= w[1].score));
}

#[test]
fn incompatible_candidates_return_when_not_required() {
    let catalog = road_catalog();
    let build = Build::from_ids(&catalog, &["frame", "wheels-stock"]).unwrap();
    let cfg = QuickWinConfig::default().with_require_compatible(false);
    let wins = recommend_quick_wins(&build, &catalog, &cfg);
    assert_eq!(wins[0].option.candidate.id, "wheels-boost");
}

#[test]
fn lighter_wheel_is_offered_against_a_wheelset() {
    let pair = part(json!({
        "id": "wheel-pair",
        "category": "Wheel",
        "name": "wheel-pair",
        "interfaces": { "rear_axle": "TA_12x142mm" },
        "attributes": { "weight": 1400, "price": 800 }
    }));
    let frame = part(json!({
        "id": "frame",
        "category": "Frame",
        "name": "Frame",
        "interfaces": { "rear_axle": "TA_12x142mm" }
    }));
    let catalog = Catalog::from_components(vec![
        frame,
        wheelset("wheels-stock", "TA_12x142mm", 1800.0, 400.0),
        pair,
    ])
    .unwrap();
    let build = Build::from_ids(&catalog, &["frame", "wheels-stock"]).unwrap();
    let wins = recommend_quick_wins(&build, &catalog, &QuickWinConfig::default());

    assert_eq!(wins.len(), 1);
    assert_eq!(wins[0].option.candidate.id, "wheel-pair");
    assert_eq!(wins[0].baseline_id, "wheels-stock");
    assert_eq!(wins[0].option.weight_saved, 400.0);
}

#[test]
fn max_results_truncates_after_sorting() {
    let catalog = road_catalog();
    let build = Build::from_ids(&catalog, &["frame", "wheels-stock", "saddle-stock"]).unwrap();
    let cfg = QuickWinConfig::from_toml_str("max_results = 1").unwrap();
    let wins = recommend_quick_wins(&build, &catalog, &cfg);
    assert_eq!(wins.len(), 1);
    assert_eq!(wins[0].option.candidate.id, "wheels-light");
}

#[test]
fn quick_wins_are_deterministic() {
    let catalog = road_catalog();
    let build = Build::from_ids(&catalog, &["frame", "wheels-stock", "saddle-stock"]).unwrap();
    let cfg = QuickWinConfig::default();
    let a = serde_json::to_string(&recommend_quick_wins(&build, &catalog, &cfg)).unwrap();
    let b = serde_json::to_string(&recommend_quick_wins(&build, &catalog, &cfg)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn summary_totals_the_build() {
    let catalog = road_catalog();
    let build = Build::from_ids(&catalog, &["frame", "wheels-stock", "saddle-stock"]).unwrap();
    let summary = build_summary(&build);
    assert_eq!(summary.parts, 3);
    assert_eq!(summary.total_weight, 3080.0);
    assert_eq!(summary.total_price, 1940.0);
    assert!(summary.unknown_weight.is_empty());
}
