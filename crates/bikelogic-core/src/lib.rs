//! Bikelogic Core Library
//!
//! Decides whether bicycle components can be assembled, derives gearing
//! performance numbers, and ranks lighter substitutes by value. Every entry
//! point is a pure function over in-memory records; the catalog is passed in
//! explicitly as a read-only snapshot.

pub mod compat;
pub mod config;
pub mod domain;
pub mod gearing;
pub mod normalize;
pub mod obs;
pub mod telemetry;
pub mod upgrade;

pub use domain::{
    AttributeKey, Attributes, Build, Catalog, Category, Component, EngineError, FieldKey,
    FieldMap, FieldValue, InterfaceKey, Interfaces, Result, ValueKind,
};

pub use normalize::{canonical_token, normalize, standard_key, RawComponent};

pub use compat::{
    freehub_compatible, validate_bottom_bracket, validate_brakes, validate_build,
    validate_cockpit, validate_drivetrain, validate_wheel_fit, BottomBracketContext,
    BrakeContext, CockpitContext, DrivetrainContext, FreehubMatch, Outcome, RuleId, Severity,
    ValidationReport, ValidationResult, WheelContext,
};

pub use gearing::{
    all_gear_combinations, analyze_drivetrain, climbing_index, effective_wheel_diameter_mm,
    expand_cassette_range, expand_cassette_range_with, gear_inches, gear_ratio, speed_kmh,
    speed_range, speed_range_over, wheel_circumference, CassetteExpansion,
    DrivetrainPerformance, GearCombination, SpeedRange,
};

pub use config::{QuickWinConfig, TierMultipliers, ValueTier, ValueTierThresholds};
pub use upgrade::{
    build_summary, evaluate_candidate, quick_win_score, rank_upgrades, recommend_quick_wins,
    BuildSummary, QuickWin, UpgradeOption,
};

pub use obs::{emit_build_validated, emit_quick_wins, emit_upgrades_ranked, RequestSpan};
pub use telemetry::init_tracing;

/// Bikelogic version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
