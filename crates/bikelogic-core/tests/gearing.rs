use bikelogic_core::{
    all_gear_combinations, analyze_drivetrain, expand_cassette_range, expand_cassette_range_with,
    gear_ratio, normalize, speed_kmh, speed_range, speed_range_over, wheel_circumference,
    Component, EngineError, RawComponent,
};
use proptest::prelude::*;
use serde_json::json;

const ROAD_WHEEL_MM: f64 = 672.0;

fn part(record: serde_json::Value) -> Component {
    let raw: RawComponent = serde_json::from_value(record).expect("fixture record");
    normalize(&raw)
}

// ── Scalar formulas ──────────────────────────────────────────────────────

#[test]
fn ratio_is_exact_division() {
    assert_eq!(gear_ratio(50, 25), 2.0);
    assert_eq!(gear_ratio(34, 34), 1.0);
    assert_eq!(gear_ratio(53, 11), 53.0 / 11.0);
}

#[test]
fn one_to_one_at_sixty_rpm_covers_one_circumference_per_second() {
    let circumference = wheel_circumference(ROAD_WHEEL_MM);
    let kmh = speed_kmh(1.0, circumference, 60.0);
    // circumference mm/s → km/h
    let expected = circumference * 3600.0 / 1_000_000.0;
    assert!((kmh - expected).abs() < 1e-9);
}

// ── Combinations and range ───────────────────────────────────────────────

#[test]
fn combinations_cover_every_pairing_in_ratio_order() {
    let combos = all_gear_combinations(&[50, 34], &[11, 28, 34], ROAD_WHEEL_MM).unwrap();
    assert_eq!(combos.len(), 6);
    assert_eq!((combos[0].chainring, combos[0].cog), (34, 34));
    assert_eq!((combos[5].chainring, combos[5].cog), (50, 11));
}

#[test]
fn empty_lists_are_rejected() {
    assert!(matches!(
        all_gear_combinations(&[], &[11], ROAD_WHEEL_MM),
        Err(EngineError::InvalidGearing(_))
    ));
    assert!(matches!(
        speed_range(&[50], &[], 90.0, ROAD_WHEEL_MM),
        Err(EngineError::InvalidGearing(_))
    ));
}

#[test]
fn zero_tooth_cog_is_rejected() {
    assert!(all_gear_combinations(&[50], &[0, 11], ROAD_WHEEL_MM).is_err());
}

#[test]
fn range_over_displayed_combinations_uses_their_extremes() {
    let combos = all_gear_combinations(&[50, 34], &[11, 28, 34], ROAD_WHEEL_MM).unwrap();
    let range = speed_range_over(&combos, 90.0, ROAD_WHEEL_MM).unwrap();
    assert_eq!(range.slowest, combos[0]);
    assert_eq!(range.fastest, combos[combos.len() - 1]);
    assert!(speed_range_over(&[], 90.0, ROAD_WHEEL_MM).is_err());
}

#[test]
fn speed_range_endpoints_match_extreme_gears() {
    let range = speed_range(&[50, 34], &[11, 34], 90.0, ROAD_WHEEL_MM).unwrap();
    assert_eq!(range.slowest.ratio, 1.0);
    assert_eq!(range.fastest.ratio, 50.0 / 11.0);
    assert!(range.min_kmh < range.max_kmh);
}

// ── Cassette expansion ───────────────────────────────────────────────────

#[test]
fn known_cassette_expands_exactly() {
    let e = expand_cassette_range(33, 10).unwrap();
    assert_eq!(e.cogs, vec![10, 11, 12, 13, 14, 15, 17, 19, 21, 24, 28, 33]);
    assert!(!e.approximate);
}

#[test]
fn speed_count_selects_between_same_range_cassettes() {
    let twelve = expand_cassette_range_with(34, 11, Some(12)).unwrap();
    assert_eq!(twelve.cogs.len(), 12);
    let eleven = expand_cassette_range_with(34, 11, Some(11)).unwrap();
    assert_eq!(eleven.cogs, vec![11, 13, 15, 17, 19, 21, 23, 25, 27, 30, 34]);
    assert!(!eleven.approximate);
}

#[test]
fn unknown_range_is_interpolated_and_flagged() {
    let e = expand_cassette_range(100, 10).unwrap();
    assert!(e.approximate);
    assert_eq!(e.cogs.len(), 12);
    assert_eq!(e.cogs.first(), Some(&10));
    assert_eq!(e.cogs.last(), Some(&100));
    assert!(e.cogs.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn inverted_or_toothless_range_is_rejected() {
    assert!(expand_cassette_range(10, 33).is_err());
    assert!(expand_cassette_range(33, 0).is_err());
    assert!(expand_cassette_range_with(40, 11, Some(1)).is_err());
}

#[test]
fn absurd_speed_count_is_rejected_before_expanding() {
    assert!(matches!(
        expand_cassette_range_with(50, 10, Some(4_000_000_000)),
        Err(EngineError::InvalidGearing(_))
    ));
    assert!(expand_cassette_range_with(50, 10, Some(16)).is_err());
    assert_eq!(expand_cassette_range_with(50, 10, Some(15)).unwrap().cogs.len(), 15);
}

// ── Whole drivetrain ─────────────────────────────────────────────────────

#[test]
fn drivetrain_from_records_uses_tire_width() {
    let crank = part(json!({
        "id": "crank", "category": "Crankset", "name": "Crank",
        "attributes": { "chainrings": "50/34" }
    }));
    let cassette = part(json!({
        "id": "cassette", "category": "Cassette", "name": "Cassette",
        "attributes": { "min_cog": 11, "max_cog": 30, "speeds": 12 }
    }));
    let wheel = part(json!({
        "id": "wheel", "category": "Wheelset", "name": "Wheels",
        "interfaces": { "diameter": "700c" }
    }));
    let tire = part(json!({
        "id": "tire", "category": "Tire", "name": "Tire",
        "attributes": { "width": "28mm" }
    }));

    let perf = analyze_drivetrain(&crank, &cassette, &wheel, Some(&tire), 90.0).unwrap();
    assert_eq!(perf.wheel_diameter_mm, 678.0);
    assert_eq!(perf.chainrings, vec![50, 34]);
    assert_eq!(perf.cogs.len(), 12);
    assert!(!perf.cogs_approximate);
    assert_eq!(perf.combinations.len(), 24);
    assert!((perf.climbing_index - 30.0 / 34.0).abs() < 1e-12);
}

#[test]
fn drivetrain_without_chainrings_names_the_field() {
    let crank = part(json!({ "id": "crank", "category": "Crankset", "name": "Crank" }));
    let cassette = part(json!({
        "id": "cassette", "category": "Cassette", "name": "Cassette",
        "attributes": { "cog_list": [11, 13, 15] }
    }));
    let wheel = part(json!({
        "id": "wheel", "category": "Wheel", "name": "Wheel",
        "attributes": { "diameter_mm": 670 }
    }));
    let err = analyze_drivetrain(&crank, &cassette, &wheel, None, 90.0).unwrap_err();
    assert!(matches!(
        err,
        EngineError::MissingAttribute { field: "chainrings", .. }
    ));
}

// ── Properties ───────────────────────────────────────────────────────────

fn teeth(max: usize) -> impl Strategy<Value = Vec<u32>> {
    prop::collection::vec(1u32..=60, 1..=max)
}

proptest! {
    #[test]
    fn ratio_matches_division(chainring in 1u32..=60, cog in 1u32..=60) {
        prop_assert_eq!(gear_ratio(chainring, cog), chainring as f64 / cog as f64);
    }

    #[test]
    fn speed_grows_with_cadence(ratio in 0.1f64..6.0, low in 0.0f64..150.0, delta in 0.1f64..50.0) {
        let c = wheel_circumference(ROAD_WHEEL_MM);
        prop_assert!(speed_kmh(ratio, c, low) < speed_kmh(ratio, c, low + delta));
    }

    #[test]
    fn speed_grows_with_ratio(ratio in 0.1f64..6.0, delta in 0.01f64..2.0, cadence in 1.0f64..150.0) {
        let c = wheel_circumference(ROAD_WHEEL_MM);
        prop_assert!(speed_kmh(ratio, c, cadence) < speed_kmh(ratio + delta, c, cadence));
    }

    #[test]
    fn combinations_are_complete_and_sorted(chainrings in teeth(3), cogs in teeth(12)) {
        let combos = all_gear_combinations(&chainrings, &cogs, ROAD_WHEEL_MM).unwrap();
        prop_assert_eq!(combos.len(), chainrings.len() * cogs.len());
        prop_assert!(combos.windows(2).all(|w| w[0].ratio <= w[1].ratio));
    }

    #[test]
    fn range_brackets_every_combination(chainrings in teeth(3), cogs in teeth(12)) {
        let range = speed_range(&chainrings, &cogs, 90.0, ROAD_WHEEL_MM).unwrap();
        let combos = all_gear_combinations(&chainrings, &cogs, ROAD_WHEEL_MM).unwrap();
        for combo in combos {
            prop_assert!(range.slowest.ratio <= combo.ratio);
            prop_assert!(combo.ratio <= range.fastest.ratio);
        }
    }

    #[test]
    fn interpolated_cassette_spans_the_range(smallest in 9u32..=13, extra in 0u32..=50) {
        let largest = smallest + extra;
        let e = expand_cassette_range(largest, smallest).unwrap();
        prop_assert_eq!(e.cogs.first().copied(), Some(smallest));
        prop_assert_eq!(e.cogs.last().copied(), Some(largest));
    }
}
