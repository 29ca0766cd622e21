//! Gear performance calculator.
//!
//! Pure numeric functions over tooth counts and wheel geometry. Units are
//! fixed throughout: wheel diameter and circumference in millimeters, cadence
//! in revolutions per minute, speed in km/h.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::compat::expect_role;
use crate::domain::{AttributeKey, Category, Component, EngineError, InterfaceKey, Result};
use crate::normalize::standard_key;

pub const MM_PER_INCH: f64 = 25.4;

/// Millimeters per kilometer.
const MM_PER_KM: f64 = 1_000_000.0;

/// Positions used when a cassette range has to be interpolated.
pub const DEFAULT_CASSETTE_POSITIONS: usize = 12;

/// Most cogs any cassette carries.
pub const MAX_CASSETTE_SPEEDS: u32 = 15;

/// Known cassettes as `(speeds, cogs)`. Lookup is by smallest and largest
/// cog; 12-speed entries come first so they win when speeds are not given.
const KNOWN_CASSETTES: &[(u32, &[u32])] = &[
    (12, &[10, 11, 12, 13, 14, 15, 16, 17, 19, 21, 24, 28]),
    (12, &[10, 11, 12, 13, 14, 15, 17, 19, 21, 24, 28, 33]),
    (12, &[10, 11, 12, 13, 15, 17, 19, 21, 24, 28, 32, 36]),
    (12, &[10, 12, 14, 16, 18, 21, 24, 28, 32, 36, 42, 50]),
    (12, &[10, 12, 14, 16, 18, 21, 24, 28, 33, 39, 45, 51]),
    (12, &[10, 12, 14, 16, 18, 21, 24, 28, 32, 36, 42, 52]),
    (12, &[11, 12, 13, 14, 15, 16, 17, 19, 21, 24, 27, 30]),
    (12, &[11, 12, 13, 14, 15, 17, 19, 21, 24, 27, 30, 34]),
    (11, &[11, 12, 13, 14, 15, 16, 17, 19, 21, 23, 25]),
    (11, &[11, 12, 13, 14, 15, 17, 19, 21, 23, 25, 28]),
    (11, &[11, 12, 13, 14, 15, 17, 19, 21, 24, 27, 30]),
    (11, &[11, 12, 13, 14, 16, 18, 20, 22, 25, 28, 32]),
    (11, &[11, 13, 15, 17, 19, 21, 23, 25, 27, 30, 34]),
    (11, &[11, 13, 15, 17, 19, 21, 24, 28, 32, 37, 42]),
];

/// Bead-seat diameters in millimeters by wheel size token.
const BEAD_SEAT_MM: &[(&str, f64)] = &[
    ("700c", 622.0),
    ("700", 622.0),
    ("29", 622.0),
    ("29er", 622.0),
    ("650b", 584.0),
    ("27.5", 584.0),
    ("26", 559.0),
];

/// One chainring/cog pairing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GearCombination {
    pub chainring: u32,
    pub cog: u32,
    pub ratio: f64,
    pub gear_inches: f64,
}

/// Slowest and fastest gear at a fixed cadence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedRange {
    pub min_kmh: f64,
    pub max_kmh: f64,
    pub slowest: GearCombination,
    pub fastest: GearCombination,
}

/// Full cog list for a cassette range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CassetteExpansion {
    pub cogs: Vec<u32>,
    /// True when the list was linearly interpolated rather than looked up.
    /// An interpolated list will not match a real cassette's progression.
    pub approximate: bool,
}

/// Derived performance figures for a crankset/cassette/wheel combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrivetrainPerformance {
    pub chainrings: Vec<u32>,
    pub cogs: Vec<u32>,
    pub cogs_approximate: bool,
    pub wheel_diameter_mm: f64,
    pub cadence_rpm: f64,
    pub combinations: Vec<GearCombination>,
    pub speed_range: SpeedRange,
    pub climbing_index: f64,
}

pub fn gear_ratio(chainring: u32, cog: u32) -> f64 {
    debug_assert!(cog > 0, "cog must have teeth");
    f64::from(chainring) / f64::from(cog)
}

pub fn gear_inches(chainring: u32, cog: u32, wheel_diameter_mm: f64) -> f64 {
    gear_ratio(chainring, cog) * (wheel_diameter_mm / MM_PER_INCH)
}

pub fn wheel_circumference(diameter_mm: f64) -> f64 {
    PI * diameter_mm
}

/// Road speed in km/h for a ratio, wheel circumference (mm) and cadence (rpm).
///
/// mm per crank turn × turns per minute gives mm/min; ÷ 1e6 gives km/min;
/// × 60 gives km/h.
pub fn speed_kmh(ratio: f64, circumference_mm: f64, cadence_rpm: f64) -> f64 {
    (ratio * circumference_mm * cadence_rpm) / MM_PER_KM * 60.0
}

/// Relative climbing ease of the lowest gear. Higher is easier.
pub fn climbing_index(lowest_ratio: f64) -> f64 {
    1.0 / lowest_ratio
}

/// Every chainring × cog pairing, sorted ascending by ratio (ties by
/// chainring, then cog).
pub fn all_gear_combinations(
    chainrings: &[u32],
    cogs: &[u32],
    wheel_diameter_mm: f64,
) -> Result<Vec<GearCombination>> {
    check_teeth("chainrings", chainrings)?;
    check_teeth("cogs", cogs)?;
    check_positive("wheel diameter", wheel_diameter_mm)?;

    let mut combos: Vec<GearCombination> = chainrings
        .iter()
        .flat_map(|&chainring| {
            cogs.iter().map(move |&cog| GearCombination {
                chainring,
                cog,
                ratio: gear_ratio(chainring, cog),
                gear_inches: gear_inches(chainring, cog, wheel_diameter_mm),
            })
        })
        .collect();
    combos.sort_by(|a, b| {
        a.ratio
            .total_cmp(&b.ratio)
            .then(a.chainring.cmp(&b.chainring))
            .then(a.cog.cmp(&b.cog))
    });
    Ok(combos)
}

/// Slowest and fastest speeds across [`all_gear_combinations`] at `cadence_rpm`.
pub fn speed_range(
    chainrings: &[u32],
    cogs: &[u32],
    cadence_rpm: f64,
    wheel_diameter_mm: f64,
) -> Result<SpeedRange> {
    let combos = all_gear_combinations(chainrings, cogs, wheel_diameter_mm)?;
    speed_range_over(&combos, cadence_rpm, wheel_diameter_mm)
}

/// Speed range over an already computed combination set, so displayed
/// ratios and displayed speeds can never disagree.
pub fn speed_range_over(
    combos: &[GearCombination],
    cadence_rpm: f64,
    wheel_diameter_mm: f64,
) -> Result<SpeedRange> {
    if !(cadence_rpm.is_finite() && cadence_rpm >= 0.0) {
        return Err(EngineError::InvalidGearing(format!(
            "cadence must be a non-negative number, got {cadence_rpm}"
        )));
    }
    let (Some(slowest), Some(fastest)) = (combos.first(), combos.last()) else {
        return Err(EngineError::InvalidGearing("no gear combinations".to_string()));
    };
    let circumference = wheel_circumference(wheel_diameter_mm);
    Ok(SpeedRange {
        min_kmh: speed_kmh(slowest.ratio, circumference, cadence_rpm),
        max_kmh: speed_kmh(fastest.ratio, circumference, cadence_rpm),
        slowest: *slowest,
        fastest: *fastest,
    })
}

/// Full cog list for a cassette from its largest and smallest cog.
pub fn expand_cassette_range(largest_cog: u32, smallest_cog: u32) -> Result<CassetteExpansion> {
    expand_cassette_range_with(largest_cog, smallest_cog, None)
}

/// Like [`expand_cassette_range`], restricted to cassettes with `speeds`
/// cogs. Unknown ranges are interpolated over `speeds` positions, or
/// [`DEFAULT_CASSETTE_POSITIONS`] when not given.
pub fn expand_cassette_range_with(
    largest_cog: u32,
    smallest_cog: u32,
    speeds: Option<u32>,
) -> Result<CassetteExpansion> {
    if smallest_cog == 0 {
        return Err(EngineError::InvalidGearing(
            "smallest cog must have teeth".to_string(),
        ));
    }
    if largest_cog < smallest_cog {
        return Err(EngineError::InvalidGearing(format!(
            "largest cog {largest_cog} is smaller than smallest cog {smallest_cog}"
        )));
    }

    if let Some(s) = speeds.filter(|s| *s > MAX_CASSETTE_SPEEDS) {
        return Err(EngineError::InvalidGearing(format!(
            "{s}-speed exceeds the {MAX_CASSETTE_SPEEDS}-speed maximum"
        )));
    }

    let known = KNOWN_CASSETTES.iter().find(|(s, cogs)| {
        speeds.map_or(true, |wanted| wanted == *s)
            && cogs.first() == Some(&smallest_cog)
            && cogs.last() == Some(&largest_cog)
    });
    if let Some((_, cogs)) = known {
        return Ok(CassetteExpansion {
            cogs: cogs.to_vec(),
            approximate: false,
        });
    }

    let positions = speeds
        .map(|s| s as usize)
        .unwrap_or(DEFAULT_CASSETTE_POSITIONS);
    if positions < 2 {
        return Err(EngineError::InvalidGearing(format!(
            "cannot interpolate a cassette over {positions} positions"
        )));
    }
    let span = f64::from(largest_cog - smallest_cog);
    let step = span / (positions - 1) as f64;
    let cogs = (0..positions)
        .map(|i| (f64::from(smallest_cog) + step * i as f64).round() as u32)
        .collect();
    Ok(CassetteExpansion {
        cogs,
        approximate: true,
    })
}

/// Outer wheel diameter: the wheel's declared `diameter_mm`, or its bead-seat
/// diameter plus twice the tire width.
pub fn effective_wheel_diameter_mm(wheel: &Component, tire: Option<&Component>) -> Result<f64> {
    if let Some(d) = wheel.attributes.num(AttributeKey::DiameterMm) {
        check_positive("wheel diameter", d)?;
        return Ok(d);
    }

    let size = wheel
        .interfaces
        .str(InterfaceKey::Diameter)
        .ok_or_else(|| EngineError::MissingAttribute {
            id: wheel.id.clone(),
            field: "diameter_mm",
        })?;
    let bead_seat = bead_seat_mm(size).ok_or_else(|| EngineError::MissingAttribute {
        id: wheel.id.clone(),
        field: "diameter_mm",
    })?;

    let width = tire
        .and_then(|t| t.attributes.num(AttributeKey::Width))
        .ok_or_else(|| EngineError::MissingAttribute {
            id: tire.map_or_else(|| wheel.id.clone(), |t| t.id.clone()),
            field: "width",
        })?;
    Ok(bead_seat + 2.0 * width)
}

fn bead_seat_mm(size: &str) -> Option<f64> {
    let key = standard_key(size);
    BEAD_SEAT_MM
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, mm)| *mm)
}

/// Gear table, speed range and climbing index for a selected drivetrain.
///
/// The cassette's `cog_list` is used when present; otherwise its `min_cog`
/// and `max_cog` are expanded, which may be approximate.
pub fn analyze_drivetrain(
    crankset: &Component,
    cassette: &Component,
    wheel: &Component,
    tire: Option<&Component>,
    cadence_rpm: f64,
) -> Result<DrivetrainPerformance> {
    expect_role(Some(crankset), "crankset", &[Category::Crankset])?;
    expect_role(Some(cassette), "cassette", &[Category::Cassette])?;
    expect_role(Some(wheel), "wheel", &[Category::Wheel, Category::Wheelset])?;
    expect_role(tire, "tire", &[Category::Tire])?;

    let chainrings =
        crankset
            .teeth(AttributeKey::Chainrings)
            .ok_or_else(|| EngineError::MissingAttribute {
                id: crankset.id.clone(),
                field: "chainrings",
            })?;
    let (cogs, cogs_approximate) = cassette_cogs(cassette)?;
    let wheel_diameter_mm = effective_wheel_diameter_mm(wheel, tire)?;

    let combinations = all_gear_combinations(&chainrings, &cogs, wheel_diameter_mm)?;
    let speed_range = speed_range_over(&combinations, cadence_rpm, wheel_diameter_mm)?;
    let climbing_index = climbing_index(speed_range.slowest.ratio);

    Ok(DrivetrainPerformance {
        chainrings,
        cogs,
        cogs_approximate,
        wheel_diameter_mm,
        cadence_rpm,
        combinations,
        speed_range,
        climbing_index,
    })
}

fn cassette_cogs(cassette: &Component) -> Result<(Vec<u32>, bool)> {
    if let Some(cogs) = cassette.teeth(AttributeKey::CogList) {
        return Ok((cogs, false));
    }
    let bound = |key: AttributeKey, field: &'static str| {
        cassette
            .attributes
            .num(key)
            .filter(|n| *n >= 1.0)
            .map(|n| n.round() as u32)
            .ok_or_else(|| EngineError::MissingAttribute {
                id: cassette.id.clone(),
                field,
            })
    };
    let largest = bound(AttributeKey::MaxCog, "cog_list")?;
    let smallest = bound(AttributeKey::MinCog, "cog_list")?;
    let expansion = expand_cassette_range_with(largest, smallest, cassette.speeds())?;
    Ok((expansion.cogs, expansion.approximate))
}

fn check_teeth(what: &str, teeth: &[u32]) -> Result<()> {
    if teeth.is_empty() {
        return Err(EngineError::InvalidGearing(format!("{what} must not be empty")));
    }
    if teeth.contains(&0) {
        return Err(EngineError::InvalidGearing(format!(
            "{what} must not contain a zero-tooth entry"
        )));
    }
    Ok(())
}

fn check_positive(what: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(EngineError::InvalidGearing(format!(
            "{what} must be positive, got {value}"
        )))
    }
}
